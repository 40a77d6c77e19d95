//! Turn any failure of a closure, including a panic, into an explicit `Result`.
//!
//! ```
//! use logfacade::capture::{capture, Captured};
//!
//! let ok = capture(|| "42".parse::<u8>());
//! assert_eq!(ok.unwrap(), 42);
//!
//! let failed = capture(|| "x".parse::<u8>());
//! assert!(matches!(failed, Err(Captured::Failed(_))));
//! ```

use std::any::Any;
use std::convert::Infallible;
use std::panic::{self, AssertUnwindSafe};

use thiserror::Error;

/// Why a captured call produced no value.
#[derive(Debug, Error)]
pub enum Captured<E> {
    /// The closure returned `Err`.
    #[error("{0}")]
    Failed(E),
    /// The closure panicked; holds the panic message.
    #[error("panicked: {0}")]
    Panicked(String),
}

impl<E> Captured<E> {
    pub fn is_panic(&self) -> bool {
        matches!(self, Captured::Panicked(_))
    }
}

/// Run a fallible closure, returning its value or the reason it had none.
pub fn capture<T, E, F>(f: F) -> Result<T, Captured<E>>
where
    F: FnOnce() -> Result<T, E>,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(Captured::Failed(e)),
        Err(payload) => Err(Captured::Panicked(panic_message(payload.as_ref()))),
    }
}

/// [`capture`] for closures that can only fail by panicking.
pub fn capture_value<T, F>(f: F) -> Result<T, Captured<Infallible>>
where
    F: FnOnce() -> T,
{
    capture(|| Ok::<T, Infallible>(f()))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
