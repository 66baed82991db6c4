//! # gridport-deps
//!
//! Dependency manifest handling for gridport migrations.
//!
//! After a migration is applied, [`update_package_json`] drops every
//! source-library package from `package.json` and adds the target packages.
//! Writes go through [`FileUpdater`], which replaces the file atomically.
//!
//! ## Example
//!
//! ```rust,no_run
//! use gridport_core::MappingRegistry;
//! use gridport_deps::update_package_json;
//! use gridport_fs::NativeFileSystem;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let fs = Arc::new(NativeFileSystem::new(".")?);
//! let registry = MappingRegistry::builtin()?;
//! let change = update_package_json(&fs, &registry, registry.target_packages(), false).await?;
//! if let Some(change) = change {
//!     println!("removed {:?}, added {:?}", change.removed, change.added);
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod npm;
pub mod update;

pub use error::{Error, Result};
pub use npm::{rewrite_manifest, update_package_json, ManifestRewrite, PACKAGE_JSON};
pub use update::FileUpdater;
