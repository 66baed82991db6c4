//! Diagnostic logging to stderr via `tracing-subscriber`.
//!
//! Reports, diffs and prompts go to stdout and never through here.

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Level for a `-v` count: none is `warn`, `-v` is `info`, `-vv` and up `debug`.
pub fn level_for(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    }
}

/// Installs the global subscriber. `RUST_LOG` overrides the `-v` level.
pub fn init_logging(verbosity: u8) {
    let level = level_for(verbosity).as_str().to_lowercase();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        // Dependencies stay at warn.
        EnvFilter::new(format!(
            "warn,gridport_cli={level},gridport_core={level},gridport_scanner={level},\
             gridport_transform={level},gridport_compat={level},gridport_deps={level},\
             gridport_engine={level},gridport_config={level},gridport_fs={level}"
        ))
    });

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbosity > 1)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(level_for(0), Level::WARN);
        assert_eq!(level_for(1), Level::INFO);
        assert_eq!(level_for(2), Level::DEBUG);
        assert_eq!(level_for(5), Level::DEBUG);
    }
}
