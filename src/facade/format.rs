//! Line layout for sinks.
//!
//! A [`LogFormat`] is the user-facing description (two strings, loadable from
//! TOML). [`Formatter::compile`] validates it once; rendering afterwards
//! cannot fail.
//!
//! Layout placeholders:
//! - `{timestamp}`: the event time, rendered with the strftime `timestamp` pattern
//! - `{level}`: the level label, right-justified to 8 characters
//! - `{message}`: the message body (required)
//!
//! `{{` and `}}` produce literal braces.

use std::fmt::Write as _;

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

use super::event::LogEvent;
use super::level::RESET;
use crate::error::FacadeError;

pub const DEFAULT_TIMESTAMP: &str = "%Y-%m-%d %H:%M:%S%.3f";
pub const DEFAULT_LAYOUT: &str = "{timestamp} {level}  {message}";

/// Width the level label is right-justified to.
const LABEL_WIDTH: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogFormat {
    /// strftime pattern for `{timestamp}`.
    pub timestamp: String,
    /// Line template.
    pub layout: String,
}

impl Default for LogFormat {
    fn default() -> Self {
        Self {
            timestamp: DEFAULT_TIMESTAMP.to_string(),
            layout: DEFAULT_LAYOUT.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Timestamp,
    Level,
    Message,
}

/// A validated [`LogFormat`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formatter {
    timestamp: String,
    segments: Vec<Segment>,
}

impl Default for Formatter {
    fn default() -> Self {
        Self {
            timestamp: DEFAULT_TIMESTAMP.to_string(),
            segments: vec![
                Segment::Timestamp,
                Segment::Literal(" ".into()),
                Segment::Level,
                Segment::Literal("  ".into()),
                Segment::Message,
            ],
        }
    }
}

impl Formatter {
    pub fn compile(format: &LogFormat) -> Result<Self, FacadeError> {
        if StrftimeItems::new(&format.timestamp).any(|item| matches!(item, Item::Error)) {
            return Err(FacadeError::Configuration(format!(
                "invalid timestamp pattern '{}'",
                format.timestamp
            )));
        }

        let segments = parse_layout(&format.layout)?;
        if !segments.contains(&Segment::Message) {
            return Err(FacadeError::Configuration(format!(
                "layout '{}' has no {{message}} placeholder",
                format.layout
            )));
        }

        Ok(Self {
            timestamp: format.timestamp.clone(),
            segments,
        })
    }

    /// Render one line (no trailing newline). With `colored`, the level label
    /// is wrapped in the level's color and the reset sequence.
    pub fn render(&self, event: &LogEvent, colored: bool) -> String {
        let mut line = String::with_capacity(event.message.len() + 48);
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => line.push_str(text),
                Segment::Timestamp => {
                    let _ = write!(line, "{}", event.timestamp.format(&self.timestamp));
                }
                Segment::Level => {
                    if colored {
                        line.push_str(event.level.color());
                    }
                    let _ = write!(line, "{:>width$}", event.level, width = LABEL_WIDTH);
                    if colored {
                        line.push_str(RESET);
                    }
                }
                Segment::Message => line.push_str(&event.message),
            }
        }
        line
    }
}

fn parse_layout(layout: &str) -> Result<Vec<Segment>, FacadeError> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = layout.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                literal.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                literal.push('}');
            }
            '{' => {
                let mut name = String::new();
                let mut closed = false;
                for n in chars.by_ref() {
                    if n == '}' {
                        closed = true;
                        break;
                    }
                    name.push(n);
                }
                if !closed {
                    return Err(FacadeError::Configuration(format!(
                        "unterminated placeholder in layout '{layout}'"
                    )));
                }
                let segment = match name.as_str() {
                    "timestamp" => Segment::Timestamp,
                    "level" => Segment::Level,
                    "message" => Segment::Message,
                    other => {
                        return Err(FacadeError::Configuration(format!(
                            "unknown placeholder '{{{other}}}' in layout '{layout}'"
                        )));
                    }
                };
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(segment);
            }
            '}' => {
                return Err(FacadeError::Configuration(format!(
                    "unmatched '}}' in layout '{layout}'"
                )));
            }
            _ => literal.push(c),
        }
    }
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

#[cfg(test)]
mod tests {
    use chrono::{Local, TimeZone};

    use super::*;
    use crate::facade::level::Level;

    fn event_at(level: Level, message: &str) -> LogEvent {
        LogEvent {
            level,
            message: message.into(),
            timestamp: Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap(),
        }
    }

    #[test]
    fn default_format_matches_default_formatter() {
        let compiled = Formatter::compile(&LogFormat::default()).unwrap();
        assert_eq!(compiled, Formatter::default());
    }

    #[test]
    fn renders_default_line_shape() {
        let line = Formatter::default().render(&event_at(Level::Debug, "hello"), false);
        assert_eq!(line, "2024-03-09 07:05:01.000    DEBUG  hello");
    }

    #[test]
    fn colored_render_wraps_only_the_label() {
        let line = Formatter::default().render(&event_at(Level::Error, "boom"), true);
        assert!(line.contains("\x1b[91m   ERROR\x1b[0m"));
        assert!(line.ends_with("  boom"));
    }

    #[test]
    fn custom_layout_and_escaped_braces() {
        let format = LogFormat {
            timestamp: "%H:%M".into(),
            layout: "[{timestamp}] {{{level}}} {message}".into(),
        };
        let line = Formatter::compile(&format)
            .unwrap()
            .render(&event_at(Level::Info, "ok"), false);
        assert_eq!(line, "[07:05] {    INFO} ok");
    }

    #[test]
    fn message_braces_are_not_reinterpreted() {
        let line = Formatter::default().render(&event_at(Level::Info, "{level} {timestamp}"), false);
        assert!(line.ends_with("  {level} {timestamp}"));
    }

    #[test]
    fn layout_without_message_rejected() {
        let format = LogFormat {
            layout: "{timestamp} {level}".into(),
            ..LogFormat::default()
        };
        assert!(matches!(
            Formatter::compile(&format),
            Err(FacadeError::Configuration(_))
        ));
    }

    #[test]
    fn unknown_placeholder_rejected() {
        let format = LogFormat {
            layout: "{asctime} {message}".into(),
            ..LogFormat::default()
        };
        let err = Formatter::compile(&format).unwrap_err();
        assert!(err.to_string().contains("asctime"));
    }

    #[test]
    fn unterminated_and_unmatched_braces_rejected() {
        for layout in ["{message", "{message} }"] {
            let format = LogFormat {
                layout: layout.into(),
                ..LogFormat::default()
            };
            assert!(Formatter::compile(&format).is_err(), "accepted '{layout}'");
        }
    }

    #[test]
    fn invalid_timestamp_pattern_rejected() {
        let format = LogFormat {
            timestamp: "%Y-%Q".into(),
            ..LogFormat::default()
        };
        let err = Formatter::compile(&format).unwrap_err();
        assert!(err.to_string().contains("timestamp pattern"));
    }
}
