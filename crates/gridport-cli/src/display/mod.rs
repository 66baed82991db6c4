//! Terminal output and prompts for the `gridport` commands.

mod prompt;
mod summary;

pub use prompt::Prompter;
pub use summary::{
    format_migration, format_previews, format_scan_summary, format_scan_warnings,
    format_validation,
};
