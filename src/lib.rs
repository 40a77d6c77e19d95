// Library root. The demo binary lives in src/main.rs.

pub mod capture;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod facade;
pub mod process;

pub use config::LoggerOptions;
pub use error::FacadeError;
pub use facade::{Level, LoggerHandle, Registry};
