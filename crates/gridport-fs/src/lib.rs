//! Project-scoped filesystem abstraction for gridport.
//!
//! Every read and write a migration performs goes through a [`FileSystem`]
//! scoped to the project root, so a run can never touch files outside it.
//!
//! # Example
//!
//! ```no_run
//! use gridport_fs::{FileSystem, NativeFileSystem};
//! use std::path::Path;
//!
//! # #[tokio::main]
//! # async fn main() -> std::io::Result<()> {
//! let fs = NativeFileSystem::new(".")?;
//! let contents = fs.read_to_string(Path::new("package.json")).await?;
//! println!("{}", contents);
//! # Ok(())
//! # }
//! ```

mod file_system;
pub mod native;

pub use file_system::{DiscoveryOptions, FileMetadata, FileSystem};
pub use native::NativeFileSystem;
