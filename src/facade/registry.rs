//! Destination-keyed registry of logger handles.
//!
//! The map lock only covers get-or-insert and removal; building sinks and
//! writing the banner happen under the handle's own lock, so two destinations
//! never wait on each other while one of them opens its file. Lock order is
//! handle, then map.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tracing::debug;

use super::format::{Formatter, LogFormat};
use super::handle::{HandleState, LoggerHandle, TeardownReport};
use super::level::Level;
use super::sink::{ConsoleSink, ConsoleTarget, FileSink};
use crate::config::LoggerOptions;
use crate::error::FacadeError;

const BANNER_WIDTH: usize = 60;

#[derive(Default)]
pub struct Registry {
    handles: Mutex<HashMap<PathBuf, LoggerHandle>>,
}

/// Configuration echoed into the log right after construction.
#[derive(Serialize)]
struct EffectiveOptions<'a> {
    destination: String,
    level: Level,
    format: &'a LogFormat,
    console: ConsoleTarget,
    color: bool,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the handle for `options.destination`, building its sinks if it
    /// has none.
    ///
    /// A handle that already has sinks is returned as is; the level and format
    /// in `options` are then ignored. If the first construction for a
    /// destination fails, nothing stays registered for it.
    pub fn acquire(&self, options: &LoggerOptions) -> Result<LoggerHandle, FacadeError> {
        let destination = options.resolved_destination()?;
        let formatter = Formatter::compile(&options.format)?;

        loop {
            let handle = self.entry(&destination);
            let mut state = handle.lock()?;
            if state.retired {
                // Lost a race with a failed first construction; take a fresh entry.
                continue;
            }
            if !state.sinks.is_empty() {
                debug!(destination = %destination.display(), "reusing active logger");
                return Ok(handle.clone());
            }

            state.minimum_level = options.level;
            state.formatter = formatter.clone();
            if let Err(e) = construct(&mut state, &destination, options) {
                state.close_sinks(&destination);
                if !state.constructed {
                    state.retired = true;
                    self.forget(&destination, &handle);
                }
                debug!(destination = %destination.display(), "logger construction failed: {e}");
                return Err(e);
            }
            state.constructed = true;
            drop(state);

            debug!(
                destination = %destination.display(),
                level = %options.level,
                "logger constructed"
            );
            return Ok(handle);
        }
    }

    fn handles(&self) -> MutexGuard<'_, HashMap<PathBuf, LoggerHandle>> {
        // Every map update is a single insert or remove, so a poisoned map is
        // still consistent.
        self.handles.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn entry(&self, destination: &Path) -> LoggerHandle {
        self.handles()
            .entry(destination.to_path_buf())
            .or_insert_with(|| LoggerHandle::unconstructed(destination.to_path_buf()))
            .clone()
    }

    /// Drop `handle` from the map if it is still the entry for `destination`.
    fn forget(&self, destination: &Path, handle: &LoggerHandle) {
        let mut handles = self.handles();
        if handles.get(destination).is_some_and(|h| h.ptr_eq(handle)) {
            handles.remove(destination);
        }
    }

    pub fn get(&self, destination: &Path) -> Option<LoggerHandle> {
        self.handles().get(destination).cloned()
    }

    pub fn contains(&self, destination: &Path) -> bool {
        self.handles().contains_key(destination)
    }

    pub fn len(&self) -> usize {
        self.handles().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registered destinations, sorted.
    pub fn destinations(&self) -> Vec<PathBuf> {
        let mut out: Vec<PathBuf> = self.handles().keys().cloned().collect();
        out.sort();
        out
    }

    /// Tear down the handle registered for `destination`.
    pub fn release(&self, destination: &Path) -> Result<TeardownReport, FacadeError> {
        let handle = self.get(destination).ok_or_else(|| {
            FacadeError::InvalidHandle(format!("{} was never acquired", destination.display()))
        })?;
        handle.release()
    }

    /// Tear down every registered handle, keyed by destination.
    pub fn release_all(&self) -> Result<Vec<(PathBuf, TeardownReport)>, FacadeError> {
        let handles: Vec<LoggerHandle> = self.handles().values().cloned().collect();

        let mut reports = Vec::with_capacity(handles.len());
        for handle in handles {
            let report = handle.release()?;
            reports.push((handle.destination().to_path_buf(), report));
        }
        reports.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(reports)
    }
}

/// Open the sinks for `destination` and write the banner and the
/// effective-options line, all under the caller's handle lock.
fn construct(
    state: &mut HandleState,
    destination: &Path,
    options: &LoggerOptions,
) -> Result<(), FacadeError> {
    if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    state.sinks.push(Box::new(FileSink::open(destination)?));
    if let Some(console) = ConsoleSink::new(options.console, options.color) {
        state.sinks.push(Box::new(console));
    }

    let effective = EffectiveOptions {
        destination: destination.display().to_string(),
        level: options.level,
        format: &options.format,
        console: options.console,
        color: options.color,
    };
    let json = serde_json::to_string(&effective)
        .map_err(|e| FacadeError::Configuration(format!("cannot serialise options: {e}")))?;

    state.emit(Level::Info, "=".repeat(BANNER_WIDTH))?;
    state.emit(Level::Info, format!("Starting logger with options: {json}"))?;
    Ok(())
}
