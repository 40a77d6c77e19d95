//! Crate-wide error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FacadeError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("invalid handle: {0}")]
    InvalidHandle(String),

    #[error("diagnostics error: {0}")]
    Diagnostics(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn configuration_error_display() {
        let e = FacadeError::Configuration("missing destination".into());
        assert!(e.to_string().starts_with("configuration error"));
        assert!(e.to_string().contains("missing destination"));
    }

    #[test]
    fn invalid_handle_display() {
        let e = FacadeError::InvalidHandle("logs/app.log has no sinks".into());
        assert!(e.to_string().contains("logs/app.log has no sinks"));
    }

    #[test]
    fn diagnostics_error_display() {
        let e = FacadeError::Diagnostics("already initialized".into());
        assert!(e.to_string().contains("already initialized"));
    }

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let e: FacadeError = io_err.into();
        assert!(e.to_string().contains("io error"));
        assert!(e.source().is_some());
    }
}
