//! Output sinks: where rendered lines end up.
//!
//! Writes are direct and unbuffered: a line is on its way to the OS before
//! `write_event` returns.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::event::LogEvent;
use super::format::Formatter;

/// A destination that accepts formatted log lines.
///
/// Sinks are owned by a [`LoggerHandle`](super::handle::LoggerHandle) and only
/// touched while its lock is held, so they need `Send` but not `Sync`.
pub trait Sink: Send {
    /// Short description used in teardown reports (e.g. `"file:logs/app.log"`).
    fn name(&self) -> &str;

    fn write_event(&mut self, event: &LogEvent, formatter: &Formatter) -> io::Result<()>;

    /// Flush and release the underlying resource. Called once, during teardown.
    fn close(&mut self) -> io::Result<()>;
}

/// Append-mode, UTF-8 log file.
pub struct FileSink {
    name: String,
    file: Option<File>,
}

impl FileSink {
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            name: format!("file:{}", path.display()),
            file: Some(file),
        })
    }
}

impl Sink for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn write_event(&mut self, event: &LogEvent, formatter: &Formatter) -> io::Result<()> {
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| io::Error::other(format!("{} is closed", self.name)))?;
        writeln!(file, "{}", formatter.render(event, false))
    }

    fn close(&mut self) -> io::Result<()> {
        match self.file.take() {
            Some(mut file) => file.flush(),
            None => Ok(()),
        }
    }
}

/// Which terminal stream the console sink writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleTarget {
    #[default]
    Stderr,
    Stdout,
    /// No console sink.
    Off,
}

pub struct ConsoleSink {
    name: &'static str,
    target: ConsoleTarget,
    colored: bool,
}

impl ConsoleSink {
    /// Returns `None` for [`ConsoleTarget::Off`].
    pub fn new(target: ConsoleTarget, colored: bool) -> Option<Self> {
        let name = match target {
            ConsoleTarget::Stderr => "console:stderr",
            ConsoleTarget::Stdout => "console:stdout",
            ConsoleTarget::Off => return None,
        };
        Some(Self { name, target, colored })
    }
}

impl Sink for ConsoleSink {
    fn name(&self) -> &str {
        self.name
    }

    fn write_event(&mut self, event: &LogEvent, formatter: &Formatter) -> io::Result<()> {
        let line = formatter.render(event, self.colored);
        match self.target {
            ConsoleTarget::Stderr => writeln!(io::stderr().lock(), "{line}"),
            ConsoleTarget::Stdout => writeln!(io::stdout().lock(), "{line}"),
            ConsoleTarget::Off => Ok(()),
        }
    }

    fn close(&mut self) -> io::Result<()> {
        match self.target {
            ConsoleTarget::Stderr => io::stderr().flush(),
            ConsoleTarget::Stdout => io::stdout().flush(),
            ConsoleTarget::Off => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::facade::level::Level;

    #[test]
    fn file_sink_appends_plain_lines() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("sink.log");
        fs::write(&path, "existing\n").unwrap();

        let mut sink = FileSink::open(&path).unwrap();
        let formatter = Formatter::default();
        sink.write_event(&LogEvent::new(Level::Warning, "careful"), &formatter)
            .unwrap();
        sink.close().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "existing");
        assert!(lines[1].ends_with(" WARNING  careful"));
        assert!(!content.contains('\x1b'));
    }

    #[test]
    fn file_sink_rejects_writes_after_close() {
        let tmp = TempDir::new().unwrap();
        let mut sink = FileSink::open(&tmp.path().join("closed.log")).unwrap();
        sink.close().unwrap();
        sink.close().unwrap();
        let err = sink
            .write_event(&LogEvent::new(Level::Info, "late"), &Formatter::default())
            .unwrap_err();
        assert!(err.to_string().contains("is closed"));
    }

    #[test]
    fn file_sink_open_fails_for_directory() {
        let tmp = TempDir::new().unwrap();
        assert!(FileSink::open(tmp.path()).is_err());
    }

    #[test]
    fn console_off_builds_nothing() {
        assert!(ConsoleSink::new(ConsoleTarget::Off, true).is_none());
        assert_eq!(
            ConsoleSink::new(ConsoleTarget::Stdout, false).unwrap().name(),
            "console:stdout"
        );
    }
}
