//! The crate's own diagnostics, routed through `tracing`.
//!
//! The facade reports internal events (sink construction, teardown failures)
//! with `tracing` macros. Binaries that want to see them call [`init`] once
//! with the `[diagnostics] level` from the config file; libraries embedding the
//! facade can install their own subscriber instead.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::error::FacadeError;

/// Parse the `[diagnostics] level` config value.
///
/// Accepts `off`, `error`, `warn`, `info`, `debug` and `trace` in any case.
pub fn parse_level(level: &str) -> Result<LevelFilter, FacadeError> {
    let trimmed = level.trim();
    if trimmed.is_empty() {
        return Err(FacadeError::Configuration("diagnostics level must not be empty".into()));
    }
    trimmed
        .parse::<LevelFilter>()
        .map_err(|_| FacadeError::Configuration(format!("unrecognised diagnostics level: '{level}'")))
}

/// Build the filter: `RUST_LOG` directives when set, otherwise `default` for
/// every target.
pub fn filter(default: LevelFilter) -> Result<EnvFilter, FacadeError> {
    EnvFilter::builder()
        .with_default_directive(default.into())
        .from_env()
        .map_err(|e| FacadeError::Diagnostics(format!("invalid RUST_LOG: {e}")))
}

/// Install a stderr subscriber for the crate's diagnostics.
///
/// Fails if `RUST_LOG` is malformed or a global subscriber is already set.
pub fn init(default: LevelFilter) -> Result<(), FacadeError> {
    tracing_subscriber::fmt()
        .with_env_filter(filter(default)?)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| FacadeError::Diagnostics(format!("subscriber already installed: {e}")))
}
