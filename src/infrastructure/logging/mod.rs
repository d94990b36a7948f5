// Logging module - Logging infrastructure
use crate::domain::config::GlobalConfig;
use crate::domain::error::{QuadbotError, QuadbotResult};
use std::io;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize logging system.
///
/// `RUST_LOG` wins over the configured level; `verbose` forces debug for
/// this crate. Output goes to stderr so stdout carries only status text.
pub fn init_logging(config: &GlobalConfig, verbose: bool) -> QuadbotResult<()> {
    let level = if verbose {
        "debug"
    } else {
        match config.log_level.as_str() {
            level @ ("error" | "warn" | "info" | "debug" | "trace") => level,
            _ => "info",
        }
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("quadbot={},warn", level)));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(verbose)
                .with_level(true)
                .with_thread_ids(verbose)
                .with_file(false)
                .with_line_number(false),
        )
        .try_init()
        .map_err(|e| QuadbotError::config(format!("Failed to initialize logging: {}", e)))?;

    tracing::debug!("Quadbot logging initialized at {}", level);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_init_only_once() {
        let config = GlobalConfig::default();
        // another test may have installed a subscriber first
        let first = init_logging(&config, false);
        let second = init_logging(&config, true);
        assert!(first.is_err() || second.is_err());
    }
}
