//! logfacade demo.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Load config
//!   3. Init diagnostics at the configured level
//!   4. Print the time and a sum
//!   5. Acquire the configured logger, write one line per level
//!   6. Release, reacquire, release again

use chrono::{DateTime, Local};
use tracing::info;

use logfacade::{FacadeError, Registry, config, diagnostics};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// Sum two integers.
///
/// ```text
/// sum(1, 2) == 3
/// ```
fn sum(a: i64, b: i64) -> i64 {
    a + b
}

fn get_time() -> DateTime<Local> {
    Local::now()
}

fn run() -> Result<(), FacadeError> {
    config::load_env_file(None)?;

    let config = config::load()?;
    diagnostics::init(config.diagnostics_level)?;

    info!(
        destination = ?config.logger.destination,
        level = %config.logger.level,
        "config loaded"
    );

    println!("Time is {}", get_time());
    println!("Sum of {} and {} is {}", 1, 2, sum(1, 2));

    let registry = Registry::new();
    let logger = registry.acquire(&config.logger)?;
    logger.info("INFO message 1")?;
    logger.debug("DEBUG message 1")?;
    logger.warning("WARNING message 1")?;
    logger.error("ERROR message 1")?;
    logger.dispatch("CRITICAL message 1", "critical")?;
    logger.release()?;

    // Same destination, fresh sinks.
    let logger = registry.acquire(&config.logger)?;
    logger.info("All done!")?;
    let report = logger.release()?;
    if !report.is_clean() {
        for failure in report.failures() {
            eprintln!("sink {} did not close cleanly", failure.sink);
        }
    }

    Ok(())
}
