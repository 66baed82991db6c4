//! # gridport-engine
//!
//! The migration runner and everything around it:
//!
//! - [`MigrationRunner`]: `analyze`, `migrate`, `validate` and `rollback`
//!   for one project
//! - [`apply`]: line-local, column-anchored application of transformations
//! - [`backup`]: checksummed full-tree backups and rollback
//! - [`validate`]: external typecheck/build plus residual pattern checks
//!
//! ## Example
//!
//! ```rust,no_run
//! use gridport_engine::{MigrateOptions, MigrationRunner};
//! use std::path::Path;
//!
//! # async fn example() -> gridport_engine::Result<()> {
//! let runner = MigrationRunner::open(Path::new("my-app")).await?;
//! let result = runner
//!     .migrate(&MigrateOptions {
//!         dry_run: true,
//!         ..Default::default()
//!     })
//!     .await?;
//! for preview in &result.previews {
//!     println!("{}", preview.diff);
//! }
//! # Ok(())
//! # }
//! ```

pub mod apply;
pub mod backup;
pub mod error;
pub mod runner;
pub mod validate;

pub use apply::{apply_transformations, group_by_file, render_diff, AppliedFile};
pub use backup::{BackupManifest, BackupStore, RestoreSummary, BACKUP_MANIFEST};
pub use error::{EngineError, Result};
pub use runner::{AnalyzeOptions, Analysis, MigrateOptions, MigrationRunner};
pub use validate::Validator;
