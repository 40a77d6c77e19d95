//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` relative to the current working directory,
//! then applies `LOGFACADE_DESTINATION` and `LOGFACADE_LEVEL` env overrides.
//! A `.env` file can seed those variables first via [`load_env_file`].

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;

use crate::diagnostics;
use crate::error::FacadeError;
use crate::facade::{ConsoleTarget, Level, LogFormat};

/// Options for [`Registry::acquire`](crate::facade::Registry::acquire).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerOptions {
    /// Log file path. Required by `acquire`; `~` is expanded.
    pub destination: Option<PathBuf>,
    /// Events below this level are dropped.
    pub level: Level,
    pub format: LogFormat,
    pub console: ConsoleTarget,
    /// Color the level label on the console sink.
    pub color: bool,
}

impl Default for LoggerOptions {
    fn default() -> Self {
        Self {
            destination: None,
            level: Level::Info,
            format: LogFormat::default(),
            console: ConsoleTarget::Stderr,
            color: true,
        }
    }
}

impl LoggerOptions {
    pub fn new(destination: impl Into<PathBuf>) -> Self {
        Self {
            destination: Some(destination.into()),
            ..Self::default()
        }
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_console(mut self, console: ConsoleTarget) -> Self {
        self.console = console;
        self
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// The destination with `~` expanded, or a configuration error when it is
    /// missing or blank.
    pub fn resolved_destination(&self) -> Result<PathBuf, FacadeError> {
        let raw = self
            .destination
            .as_deref()
            .ok_or_else(|| FacadeError::Configuration("missing destination in logger options".into()))?;
        let text = raw.to_string_lossy();
        if text.trim().is_empty() {
            return Err(FacadeError::Configuration("destination must not be empty".into()));
        }
        Ok(expand_home(&text))
    }
}

/// Fully-resolved configuration file.
#[derive(Debug, Clone)]
pub struct Config {
    pub logger: LoggerOptions,
    /// Default filter for the crate's own `tracing` diagnostics (see
    /// [`crate::diagnostics`]).
    pub diagnostics_level: LevelFilter,
}

/// Raw TOML shape, deserialised before resolution.
#[derive(Deserialize, Default)]
struct RawConfig {
    #[serde(default)]
    logger: LoggerOptions,
    #[serde(default)]
    diagnostics: RawDiagnostics,
}

#[derive(Deserialize)]
struct RawDiagnostics {
    #[serde(default = "default_diagnostics_level")]
    level: String,
}

impl Default for RawDiagnostics {
    fn default() -> Self {
        Self { level: default_diagnostics_level() }
    }
}

fn default_diagnostics_level() -> String {
    "warn".to_string()
}

/// Load config from `config/default.toml`, then apply env-var overrides.
pub fn load() -> Result<Config, FacadeError> {
    let destination_override = env::var("LOGFACADE_DESTINATION").ok();
    let level_override = env::var("LOGFACADE_LEVEL").ok();
    load_from(
        Path::new("config/default.toml"),
        destination_override.as_deref(),
        level_override.as_deref(),
    )
}

/// Load from an explicit path with optional overrides.
/// Tests pass overrides directly instead of mutating env vars.
pub fn load_from(
    path: &Path,
    destination_override: Option<&str>,
    level_override: Option<&str>,
) -> Result<Config, FacadeError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| FacadeError::Configuration(format!("cannot read {}: {e}", path.display())))?;
    parse(&raw, destination_override, level_override)
        .map_err(|e| match e {
            FacadeError::Configuration(msg) => {
                FacadeError::Configuration(format!("{}: {msg}", path.display()))
            }
            other => other,
        })
}

fn parse(
    raw: &str,
    destination_override: Option<&str>,
    level_override: Option<&str>,
) -> Result<Config, FacadeError> {
    let parsed: RawConfig = toml::from_str(raw)
        .map_err(|e| FacadeError::Configuration(format!("parse error: {e}")))?;

    let mut logger = parsed.logger;
    if let Some(destination) = destination_override {
        logger.destination = Some(PathBuf::from(destination));
    }
    if let Some(level) = level_override {
        logger.level = level.parse()?;
    }

    Ok(Config {
        logger,
        diagnostics_level: diagnostics::parse_level(&parsed.diagnostics.level)?,
    })
}

/// Load `KEY=value` pairs from `path` (or `.env` searched upward from the
/// working directory) into the process environment. Variables that are
/// already set are left alone.
///
/// Returns the file that was read, or `None` if there was none.
pub fn load_env_file(path: Option<&Path>) -> Result<Option<PathBuf>, FacadeError> {
    let result = match path {
        Some(p) => dotenvy::from_path(p).map(|()| p.to_path_buf()),
        None => dotenvy::dotenv(),
    };
    match result {
        Ok(found) => Ok(Some(found)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(FacadeError::Configuration(format!("cannot load env file: {e}"))),
    }
}

/// Expand a leading `~` to the user's home directory.
/// Absolute or relative paths without `~` are returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}
