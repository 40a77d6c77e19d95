//! Logging facade: per-destination handles with file and console sinks.
//!
//! ```no_run
//! use logfacade::config::LoggerOptions;
//! use logfacade::facade::{Level, Registry};
//!
//! # fn main() -> Result<(), logfacade::error::FacadeError> {
//! let registry = Registry::new();
//! let log = registry.acquire(&LoggerOptions::new("logs/app.log").with_level(Level::Debug))?;
//! log.dispatch("hello", "debug")?;
//! log.warning("disk almost full")?;
//! log.release()?;
//! # Ok(())
//! # }
//! ```

mod event;
mod format;
mod handle;
mod level;
mod registry;
mod sink;

pub use event::LogEvent;
pub use format::{DEFAULT_LAYOUT, DEFAULT_TIMESTAMP, Formatter, LogFormat};
pub use handle::{LoggerHandle, SinkOutcome, TeardownReport};
pub use level::{Level, RESET};
pub use registry::Registry;
pub use sink::{ConsoleSink, ConsoleTarget, FileSink, Sink};
