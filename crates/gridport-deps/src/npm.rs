//! npm `package.json` rewrite
//!
//! Source-library packages are dropped from both dependency sections and the
//! target packages are added to `dependencies`. Key order is preserved
//! (`serde_json` is built with `preserve_order`), so the rewritten manifest
//! diffs cleanly against the original.

use crate::update::FileUpdater;
use crate::{Error, Result};
use gridport_core::{ManifestChange, MappingRegistry};
use gridport_fs::FileSystem;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// File name of the npm manifest at the project root.
pub const PACKAGE_JSON: &str = "package.json";

/// Sections source packages are removed from.
const DEPENDENCY_SECTIONS: &[&str] = &["dependencies", "devDependencies"];

/// Outcome of rewriting one manifest.
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestRewrite {
    pub change: ManifestChange,
    /// Serialized manifest, ending in a newline when the input did.
    pub contents: String,
}

impl ManifestRewrite {
    pub fn is_noop(&self) -> bool {
        self.change.removed.is_empty() && self.change.added.is_empty()
    }
}

/// Rewrite manifest text in memory.
///
/// `is_source` decides which dependency names belong to the source library.
/// A target package already listed in `dependencies` keeps its version and is
/// not reported as added.
pub fn rewrite_manifest(
    path: &Path,
    contents: &str,
    is_source: impl Fn(&str) -> bool,
    targets: &BTreeMap<String, String>,
) -> Result<ManifestRewrite> {
    let mut json: Value = serde_json::from_str(contents).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })?;
    let root = json
        .as_object_mut()
        .ok_or_else(|| Error::InvalidFormat(path.to_path_buf(), "expected a JSON object".into()))?;

    let mut change = ManifestChange::default();
    for section in DEPENDENCY_SECTIONS {
        let Some(value) = root.get_mut(*section) else {
            continue;
        };
        let deps = value.as_object_mut().ok_or_else(|| {
            Error::InvalidFormat(path.to_path_buf(), format!("'{}' is not an object", section))
        })?;
        let doomed: Vec<String> = deps
            .keys()
            .filter(|name| is_source(name.as_str()))
            .cloned()
            .collect();
        for name in doomed {
            deps.shift_remove(&name);
            debug!("Removed {} from {}", name, section);
            if !change.removed.contains(&name) {
                change.removed.push(name);
            }
        }
    }

    if !targets.is_empty() {
        let deps = root
            .entry("dependencies")
            .or_insert_with(|| Value::Object(Map::new()))
            .as_object_mut()
            .ok_or_else(|| {
                Error::InvalidFormat(path.to_path_buf(), "'dependencies' is not an object".into())
            })?;
        for (name, version) in targets {
            if deps.contains_key(name) {
                continue;
            }
            deps.insert(name.clone(), Value::String(version.clone()));
            change.added.push(name.clone());
        }
    }

    let mut formatted = serde_json::to_string_pretty(&json).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })?;
    if contents.ends_with('\n') {
        formatted.push('\n');
    }

    Ok(ManifestRewrite {
        change,
        contents: formatted,
    })
}

/// Rewrite the project's `package.json` for the target library.
///
/// Returns `None` when the project has no manifest. With `dry_run` set the
/// change is computed but nothing is written.
pub async fn update_package_json<F: FileSystem + ?Sized>(
    fs: &Arc<F>,
    registry: &MappingRegistry,
    targets: &BTreeMap<String, String>,
    dry_run: bool,
) -> Result<Option<ManifestChange>> {
    let path = Path::new(PACKAGE_JSON);
    if !fs.exists(path).await? {
        debug!("No {} at project root, skipping manifest update", PACKAGE_JSON);
        return Ok(None);
    }

    let contents = fs.read_to_string(path).await?;
    let rewrite = rewrite_manifest(
        path,
        &contents,
        |name| registry.is_source_package(name),
        targets,
    )?;

    if rewrite.is_noop() {
        debug!("{} already up to date", PACKAGE_JSON);
        return Ok(Some(rewrite.change));
    }

    let written = FileUpdater::new(dry_run)
        .update_file(fs, path, &contents, &rewrite.contents)
        .await?;
    if written {
        info!(
            "Updated {}: removed {:?}, added {:?}",
            PACKAGE_JSON, rewrite.change.removed, rewrite.change.added
        );
    }
    Ok(Some(rewrite.change))
}
