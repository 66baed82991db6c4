//! Line-local application of transformations.
//!
//! Edits are applied to one file's text in descending `(line, col)` order so
//! an edit never shifts the position of one still waiting. Each edit is
//! anchored at its column; when the text there differs, the first
//! occurrence of `old_text` on the line is used instead. An edit whose text
//! is not on its line at all is reported as a mismatch and skipped.

use gridport_core::{Error, Transformation};
use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::{Path, PathBuf};

/// Result of applying one file's edits in memory.
#[derive(Debug)]
pub struct AppliedFile {
    pub contents: String,
    pub applied: usize,
    /// One `TransformationMismatch` per skipped edit.
    pub mismatches: Vec<Error>,
}

impl AppliedFile {
    pub fn changed(&self, original: &str) -> bool {
        self.contents != original
    }
}

/// Groups transformations by file, keeping generation order within a file.
pub fn group_by_file(
    transformations: &[Transformation],
) -> BTreeMap<PathBuf, Vec<Transformation>> {
    let mut groups: BTreeMap<PathBuf, Vec<Transformation>> = BTreeMap::new();
    for transformation in transformations {
        groups
            .entry(transformation.file_path.clone())
            .or_default()
            .push(transformation.clone());
    }
    groups
}

/// Applies `edits` to `source`. Line terminators are preserved.
pub fn apply_transformations(path: &Path, source: &str, edits: &[Transformation]) -> AppliedFile {
    let mut lines = split_lines(source);
    let mut ordered: Vec<&Transformation> = edits.iter().collect();
    ordered.sort_by(|a, b| b.location.cmp(&a.location));

    let mut applied = 0;
    let mut mismatches = Vec::new();
    for edit in ordered {
        let target = (edit.location.line as usize)
            .checked_sub(1)
            .and_then(|index| lines.get_mut(index));
        let position = target
            .as_deref()
            .and_then(|(body, _)| locate(body, edit));

        match (target, position) {
            (Some((body, _)), Some(at)) => {
                body.replace_range(at..at + edit.old_text.len(), &edit.new_text);
                applied += 1;
            }
            _ => {
                tracing::debug!(
                    "{}:{}: `{}` not found",
                    path.display(),
                    edit.location,
                    edit.old_text
                );
                mismatches.push(Error::TransformationMismatch {
                    path: path.to_path_buf(),
                    line: edit.location.line,
                    expected: edit.old_text.clone(),
                });
            }
        }
    }

    let mut contents = String::with_capacity(source.len());
    for (body, terminator) in &lines {
        contents.push_str(body);
        contents.push_str(terminator);
    }
    AppliedFile {
        contents,
        applied,
        mismatches,
    }
}

/// Byte offset of `edit.old_text` on `line`: at the edit's column when it
/// matches there, else the first occurrence.
fn locate(line: &str, edit: &Transformation) -> Option<usize> {
    if edit.old_text.is_empty() {
        return None;
    }
    let anchor = (edit.location.col as usize).saturating_sub(1);
    let anchored = line
        .get(anchor..)
        .is_some_and(|rest| rest.starts_with(edit.old_text.as_str()));
    if anchored {
        Some(anchor)
    } else {
        line.find(edit.old_text.as_str())
    }
}

/// Splits text into `(body, terminator)` pairs.
fn split_lines(source: &str) -> Vec<(String, &str)> {
    source
        .split_inclusive('\n')
        .map(|line| {
            let body = line.trim_end_matches(['\n', '\r']);
            (body.to_string(), &line[body.len()..])
        })
        .collect()
}

/// Renders a unified-diff style preview of a line-local rewrite.
///
/// Edits never add or remove lines, so lines are compared pairwise.
pub fn render_diff(path: &Path, before: &str, after: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "--- a/{}", path.display());
    let _ = writeln!(out, "+++ b/{}", path.display());

    let mut old_lines = before.lines();
    let mut new_lines = after.lines();
    let mut number = 0;
    loop {
        number += 1;
        match (old_lines.next(), new_lines.next()) {
            (None, None) => break,
            (Some(old), Some(new)) if old == new => {}
            (old, new) => {
                let _ = writeln!(out, "@@ -{number},1 +{number},1 @@");
                if let Some(old) = old {
                    let _ = writeln!(out, "-{}", old);
                }
                if let Some(new) = new {
                    let _ = writeln!(out, "+{}", new);
                }
            }
        }
    }
    out
}
