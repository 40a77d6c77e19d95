//! `LoggerHandle`: a cloneable reference to one destination's sinks.
//!
//! Clones share state: dispatching through any clone writes to the same
//! sinks, and releasing through any clone detaches them for all.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, warn};

use super::event::LogEvent;
use super::format::Formatter;
use super::level::Level;
use super::sink::Sink;
use crate::error::FacadeError;

pub(super) struct HandleState {
    pub(super) minimum_level: Level,
    pub(super) formatter: Formatter,
    pub(super) sinks: Vec<Box<dyn Sink>>,
    /// Sinks were built at least once.
    pub(super) constructed: bool,
    /// Dropped from the registry after its first construction failed.
    pub(super) retired: bool,
}

impl HandleState {
    fn empty() -> Self {
        Self {
            minimum_level: Level::Info,
            formatter: Formatter::default(),
            sinks: Vec::new(),
            constructed: false,
            retired: false,
        }
    }

    /// Write one event to every sink, filtered by the minimum level.
    /// Every sink is tried; the first failure is returned.
    pub(super) fn emit(&mut self, level: Level, message: impl Into<String>) -> io::Result<()> {
        if level < self.minimum_level {
            return Ok(());
        }
        let event = LogEvent::new(level, message);
        let mut first_error = None;
        for sink in self.sinks.iter_mut() {
            if let Err(e) = sink.write_event(&event, &self.formatter) {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Close and detach every sink, collecting one outcome per sink.
    pub(super) fn close_sinks(&mut self, destination: &Path) -> TeardownReport {
        let mut report = TeardownReport::default();
        for mut sink in self.sinks.drain(..) {
            let name = sink.name().to_string();
            let error = sink.close().err();
            if let Some(e) = &error {
                warn!(destination = %destination.display(), sink = %name, "failed to close sink: {e}");
            }
            report.outcomes.push(SinkOutcome { sink: name, error });
        }
        report
    }
}

#[derive(Clone)]
pub struct LoggerHandle {
    destination: Arc<PathBuf>,
    state: Arc<Mutex<HandleState>>,
}

/// Outcome of closing one sink during [`LoggerHandle::release`].
#[derive(Debug)]
pub struct SinkOutcome {
    pub sink: String,
    pub error: Option<io::Error>,
}

impl SinkOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Per-sink results of a teardown, in attachment order.
#[derive(Debug, Default)]
pub struct TeardownReport {
    pub outcomes: Vec<SinkOutcome>,
}

impl TeardownReport {
    /// `true` when every sink closed cleanly (vacuously true for no sinks).
    pub fn is_clean(&self) -> bool {
        self.outcomes.iter().all(SinkOutcome::is_ok)
    }

    pub fn failures(&self) -> impl Iterator<Item = &SinkOutcome> {
        self.outcomes.iter().filter(|o| !o.is_ok())
    }
}

impl LoggerHandle {
    pub(super) fn unconstructed(destination: PathBuf) -> Self {
        Self {
            destination: Arc::new(destination),
            state: Arc::new(Mutex::new(HandleState::empty())),
        }
    }

    pub(super) fn lock(&self) -> Result<MutexGuard<'_, HandleState>, FacadeError> {
        self.state.lock().map_err(|_| {
            FacadeError::InvalidHandle(format!(
                "lock poisoned for {}",
                self.destination.display()
            ))
        })
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn minimum_level(&self) -> Result<Level, FacadeError> {
        Ok(self.lock()?.minimum_level)
    }

    pub fn sink_count(&self) -> Result<usize, FacadeError> {
        Ok(self.lock()?.sinks.len())
    }

    /// A handle is active while it has at least one sink attached.
    pub fn is_active(&self) -> bool {
        self.sink_count().map(|n| n > 0).unwrap_or(false)
    }

    /// `true` if both handles refer to the same registry entry.
    pub fn ptr_eq(&self, other: &LoggerHandle) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }

    /// Write `message` at a level given by name. Unknown names are logged as
    /// `INFO`; only an inactive handle is an error.
    pub fn dispatch(&self, message: impl Into<String>, level: &str) -> Result<(), FacadeError> {
        self.log(Level::lenient(level), message)
    }

    pub fn log(&self, level: Level, message: impl Into<String>) -> Result<(), FacadeError> {
        let mut state = self.lock()?;
        if state.sinks.is_empty() {
            return Err(FacadeError::InvalidHandle(format!(
                "{} has no attached sinks; acquire it first",
                self.destination.display()
            )));
        }
        state.emit(level, message)?;
        Ok(())
    }

    pub fn debug(&self, message: impl Into<String>) -> Result<(), FacadeError> {
        self.log(Level::Debug, message)
    }

    pub fn info(&self, message: impl Into<String>) -> Result<(), FacadeError> {
        self.log(Level::Info, message)
    }

    pub fn warning(&self, message: impl Into<String>) -> Result<(), FacadeError> {
        self.log(Level::Warning, message)
    }

    pub fn error(&self, message: impl Into<String>) -> Result<(), FacadeError> {
        self.log(Level::Error, message)
    }

    pub fn critical(&self, message: impl Into<String>) -> Result<(), FacadeError> {
        self.log(Level::Critical, message)
    }

    /// Attach an extra sink. It receives events from the next dispatch on.
    pub fn attach(&self, sink: Box<dyn Sink>) -> Result<(), FacadeError> {
        let mut state = self.lock()?;
        debug!(destination = %self.destination.display(), sink = sink.name(), "attaching sink");
        state.sinks.push(sink);
        Ok(())
    }

    /// Close and detach every sink, continuing past individual failures.
    ///
    /// The handle stays registered; the next `acquire` of its destination
    /// rebuilds the sinks.
    pub fn release(&self) -> Result<TeardownReport, FacadeError> {
        let report = self.lock()?.close_sinks(&self.destination);

        debug!(
            destination = %self.destination.display(),
            closed = report.outcomes.len(),
            clean = report.is_clean(),
            "released logger"
        );
        Ok(report)
    }
}

impl std::fmt::Debug for LoggerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggerHandle")
            .field("destination", &self.destination)
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;

    use super::*;

    /// Captures rendered lines in memory; optionally fails on close.
    struct MemorySink {
        lines: Arc<StdMutex<Vec<String>>>,
        fail_close: bool,
    }

    impl Sink for MemorySink {
        fn name(&self) -> &str {
            if self.fail_close { "memory:broken" } else { "memory" }
        }

        fn write_event(&mut self, event: &LogEvent, formatter: &Formatter) -> io::Result<()> {
            self.lines.lock().unwrap().push(formatter.render(event, false));
            Ok(())
        }

        fn close(&mut self) -> io::Result<()> {
            if self.fail_close {
                Err(io::Error::other("disk vanished"))
            } else {
                Ok(())
            }
        }
    }

    fn handle_with_memory(fail_close: bool) -> (LoggerHandle, Arc<StdMutex<Vec<String>>>) {
        let handle = LoggerHandle::unconstructed(PathBuf::from("memory.log"));
        let lines = Arc::new(StdMutex::new(Vec::new()));
        handle
            .attach(Box::new(MemorySink { lines: lines.clone(), fail_close }))
            .unwrap();
        (handle, lines)
    }

    #[test]
    fn unconstructed_handle_rejects_dispatch() {
        let handle = LoggerHandle::unconstructed(PathBuf::from("never.log"));
        assert!(!handle.is_active());
        let err = handle.info("nobody listens").unwrap_err();
        assert!(matches!(err, FacadeError::InvalidHandle(_)));
    }

    #[test]
    fn unknown_level_is_written_as_info() {
        let (handle, lines) = handle_with_memory(false);
        handle.dispatch("msg", "bogus-level").unwrap();
        let lines = lines.lock().unwrap();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with("    INFO  msg"));
    }

    #[test]
    fn events_below_minimum_are_dropped() {
        let (handle, lines) = handle_with_memory(false);
        handle.debug("hidden").unwrap();
        handle.warning("shown").unwrap();
        let lines = lines.lock().unwrap();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with("shown"));
    }

    #[test]
    fn aliases_fix_the_level() {
        let (handle, lines) = handle_with_memory(false);
        handle.info("i").unwrap();
        handle.warning("w").unwrap();
        handle.error("e").unwrap();
        handle.critical("c").unwrap();
        let lines = lines.lock().unwrap();
        let labels: Vec<&str> = lines
            .iter()
            .map(|l| l.split_whitespace().nth(2).unwrap())
            .collect();
        assert_eq!(labels, ["INFO", "WARNING", "ERROR", "CRITICAL"]);
    }

    #[test]
    fn release_continues_past_failing_sink() {
        let (handle, _) = handle_with_memory(true);
        let healthy = Arc::new(StdMutex::new(Vec::new()));
        handle
            .attach(Box::new(MemorySink { lines: healthy, fail_close: false }))
            .unwrap();

        let report = handle.release().unwrap();
        assert_eq!(report.outcomes.len(), 2);
        assert!(!report.is_clean());
        let failed: Vec<&str> = report.failures().map(|o| o.sink.as_str()).collect();
        assert_eq!(failed, ["memory:broken"]);
        assert!(report.outcomes[1].is_ok());
        assert_eq!(handle.sink_count().unwrap(), 0);
    }

    #[test]
    fn release_twice_is_harmless() {
        let (handle, _) = handle_with_memory(false);
        assert!(handle.release().unwrap().is_clean());
        let second = handle.release().unwrap();
        assert!(second.outcomes.is_empty());
        assert!(second.is_clean());
    }

    #[test]
    fn clones_share_sinks() {
        let (handle, lines) = handle_with_memory(false);
        let clone = handle.clone();
        assert!(clone.ptr_eq(&handle));
        clone.info("from clone").unwrap();
        assert_eq!(lines.lock().unwrap().len(), 1);
        handle.release().unwrap();
        assert!(!clone.is_active());
    }
}
