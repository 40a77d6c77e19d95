//! Severity levels and their terminal colors.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FacadeError;

/// ANSI sequence that ends a colored label.
pub const RESET: &str = "\x1b[0m";

const CYAN: &str = "\x1b[96m";
const YELLOW: &str = "\x1b[93m";
const RED: &str = "\x1b[91m";
const MAGENTA: &str = "\x1b[95m";

/// Severity of a log event, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Level {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
    Critical,
}

impl Level {
    pub const ALL: [Level; 5] = [
        Level::Debug,
        Level::Info,
        Level::Warning,
        Level::Error,
        Level::Critical,
    ];

    /// Canonical upper-case name, as written into log lines.
    pub fn label(self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
            Level::Critical => "CRITICAL",
        }
    }

    /// Escape sequence used when the label is shown on a color terminal.
    pub fn color(self) -> &'static str {
        match self {
            Level::Debug => CYAN,
            Level::Info => RESET,
            Level::Warning => YELLOW,
            Level::Error => RED,
            Level::Critical => MAGENTA,
        }
    }

    /// Case-insensitive lookup that never fails: unknown names map to `Info`.
    pub fn lenient(name: &str) -> Level {
        name.parse().unwrap_or(Level::Info)
    }
}

impl FromStr for Level {
    type Err = FacadeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(Level::Debug),
            "INFO" => Ok(Level::Info),
            "WARNING" | "WARN" => Ok(Level::Warning),
            "ERROR" => Ok(Level::Error),
            "CRITICAL" | "FATAL" => Ok(Level::Critical),
            _ => Err(FacadeError::Configuration(format!("unrecognised log level: '{s}'"))),
        }
    }
}

impl TryFrom<String> for Level {
    type Error = FacadeError;

    fn try_from(value: String) -> Result<Self, FacadeError> {
        value.parse()
    }
}

impl From<Level> for String {
    fn from(level: Level) -> Self {
        level.label().to_string()
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_are_ordered_by_severity() {
        assert!(Level::Debug < Level::Info);
        assert!(Level::Info < Level::Warning);
        assert!(Level::Warning < Level::Error);
        assert!(Level::Error < Level::Critical);
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("debug".parse::<Level>().unwrap(), Level::Debug);
        assert_eq!("Warning".parse::<Level>().unwrap(), Level::Warning);
        assert_eq!(" CRITICAL ".parse::<Level>().unwrap(), Level::Critical);
    }

    #[test]
    fn aliases_resolve() {
        assert_eq!("warn".parse::<Level>().unwrap(), Level::Warning);
        assert_eq!("fatal".parse::<Level>().unwrap(), Level::Critical);
    }

    #[test]
    fn strict_parse_rejects_unknown() {
        let err = "verbose".parse::<Level>().unwrap_err();
        assert!(matches!(err, FacadeError::Configuration(_)));
        assert!("".parse::<Level>().is_err());
    }

    #[test]
    fn lenient_falls_back_to_info() {
        assert_eq!(Level::lenient("bogus-level"), Level::Info);
        assert_eq!(Level::lenient(""), Level::Info);
        assert_eq!(Level::lenient("error"), Level::Error);
    }

    #[test]
    fn every_level_has_a_color_and_a_label_that_fits() {
        for level in Level::ALL {
            assert!(level.color().starts_with("\x1b["));
            assert!(level.label().len() <= 8);
        }
        assert_eq!(Level::Info.color(), RESET);
    }

    #[test]
    fn display_honours_padding() {
        assert_eq!(format!("{:>8}", Level::Debug), "   DEBUG");
        assert_eq!(format!("{:>8}", Level::Critical), "CRITICAL");
    }

    #[test]
    fn serde_uses_upper_case_names() {
        let json = serde_json::to_string(&Level::Warning).unwrap();
        assert_eq!(json, "\"WARNING\"");
        let back: Level = serde_json::from_str("\"error\"").unwrap();
        assert_eq!(back, Level::Error);
        assert!(serde_json::from_str::<Level>("\"loud\"").is_err());
    }

    #[test]
    fn try_from_string_is_strict() {
        assert_eq!(Level::try_from(String::from("warn")).unwrap(), Level::Warning);
        let err = Level::try_from(String::from("loud")).unwrap_err();
        assert!(matches!(err, FacadeError::Configuration(_)));
    }
}
