//! crates/logging/src/format.rs
//! Rendering of [`LogRecord`]s through `%(field)s` templates.
//!
//! A [`Formatter`] is compiled once from a template and a date pattern; both
//! are checked at construction so that configuration mistakes surface as
//! [`ConfigurationError`]s before any channel exists. Per-record problems,
//! such as a template naming a field the record does not carry, surface as
//! [`FormattingError`]s.

mod datefmt;
mod template;

use std::fmt::Write as _;

use crate::config::ConfigurationError;
use crate::record::{FieldValue, LogRecord};

use self::datefmt::DateFormat;
use self::template::{Conversion, Segment, Template};

/// Errors raised while rendering a single record.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum FormattingError {
    /// The template names a field the record does not carry.
    #[error("formatter '{formatter}' requires field '{field}' which the record does not carry")]
    MissingField {
        /// Formatter that was rendering.
        formatter: String,
        /// Missing field name.
        field: String,
    },

    /// A `%(...)d` placeholder received a non-integer value.
    #[error("field '{field}' is rendered with %d but holds non-integer value {value:?}")]
    NotAnInteger {
        /// Field name.
        field: String,
        /// Offending value.
        value: String,
    },
}

/// What a channel does when a record cannot be rendered.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum FormatPolicy {
    /// Write `LEVEL:name:message` instead of the templated line.
    #[default]
    Fallback,
    /// Return the [`FormattingError`] to the caller and write nothing.
    Strict,
}

/// Compiled template plus timestamp pattern.
///
/// # Examples
///
/// ```
/// use logging::{ChannelKind, Formatter, LogRecord, Severity};
///
/// let formatter = Formatter::new("plain", "%(levelname)s %(message)s", "%H:%M").unwrap();
/// let record = LogRecord::new(ChannelKind::General, Severity::Warning, "disk almost full");
/// assert_eq!(
///     formatter.format(&record, "sanic.root").unwrap(),
///     "WARNING disk almost full"
/// );
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Formatter {
    name: String,
    template: Template,
    datefmt: DateFormat,
}

impl Formatter {
    /// Compiles `format` and `datefmt` into a formatter called `name`.
    pub fn new(name: &str, format: &str, datefmt: &str) -> Result<Self, ConfigurationError> {
        Ok(Self {
            name: name.to_owned(),
            template: Template::parse(format)?,
            datefmt: DateFormat::parse(datefmt)?,
        })
    }

    /// Returns the formatter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Reports whether the template renders the field `name`.
    #[must_use]
    pub fn uses_field(&self, name: &str) -> bool {
        self.template.uses(name)
    }

    /// Renders `record` as emitted by the logger called `logger_name`.
    pub fn format(&self, record: &LogRecord, logger_name: &str) -> Result<String, FormattingError> {
        let mut line = String::with_capacity(128);
        for segment in self.template.segments() {
            match segment {
                Segment::Literal(text) => line.push_str(text),
                Segment::Field { name, conversion } => {
                    let value = self.resolve(record, logger_name, name)?;
                    match conversion {
                        Conversion::Text => {
                            let _ = write!(line, "{value}");
                        }
                        Conversion::Integer => match value.as_int() {
                            Some(number) => {
                                let _ = write!(line, "{number}");
                            }
                            None => {
                                return Err(FormattingError::NotAnInteger {
                                    field: name.clone(),
                                    value: value.to_string(),
                                });
                            }
                        },
                    }
                }
            }
        }
        Ok(line)
    }

    fn resolve(
        &self,
        record: &LogRecord,
        logger_name: &str,
        field: &str,
    ) -> Result<FieldValue, FormattingError> {
        let value = match field {
            "asctime" => FieldValue::Text(self.datefmt.render(record.created())),
            "name" => FieldValue::from(logger_name),
            "levelname" => FieldValue::from(record.severity().as_str()),
            "levelno" => FieldValue::Int(record.severity().value()),
            "message" => FieldValue::from(record.message()),
            "process" => FieldValue::from(record.process()),
            other => record
                .field(other)
                .cloned()
                .ok_or_else(|| FormattingError::MissingField {
                    formatter: self.name.clone(),
                    field: other.to_owned(),
                })?,
        };
        Ok(value)
    }
}

/// Renders the minimal `LEVEL:name:message` line used when a template fails.
#[must_use]
pub fn fallback_line(record: &LogRecord, logger_name: &str) -> String {
    format!("{}:{logger_name}:{}", record.severity(), record.message())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ACCESS_FORMAT, DEFAULT_DATE_FORMAT, GENERIC_FORMAT};
    use crate::{ChannelKind, Severity};
    use time::macros::datetime;

    fn generic() -> Formatter {
        Formatter::new("generic", GENERIC_FORMAT, DEFAULT_DATE_FORMAT).unwrap()
    }

    fn access() -> Formatter {
        Formatter::new("access", ACCESS_FORMAT, DEFAULT_DATE_FORMAT).unwrap()
    }

    #[test]
    fn generic_line_layout() {
        let message = "Goin' Fast @ http://127.0.0.1:8000";
        let record = LogRecord::new(ChannelKind::General, Severity::Info, message)
            .with_created(datetime!(2021-12-05 10:00:00 UTC))
            .with_process(4242);
        assert_eq!(
            generic().format(&record, "sanic.root").unwrap(),
            "[2021-12-05 10:00:00 +0000] [4242] [INFO] Goin' Fast @ http://127.0.0.1:8000"
        );
    }

    #[test]
    fn access_line_layout() {
        let record = LogRecord::access("", "127.0.0.1:50514", "GET http://localhost/", 200, 13)
            .with_created(datetime!(2021-12-05 10:00:00 +01:00));
        assert_eq!(
            access().format(&record, "sanic.access").unwrap(),
            concat!(
                "[2021-12-05 10:00:00 +0100] - (sanic.access)[INFO][127.0.0.1:50514]: ",
                "GET http://localhost/  200 13"
            )
        );
    }

    #[test]
    fn missing_access_field_is_reported() {
        let record = LogRecord::new(ChannelKind::Access, Severity::Info, "")
            .with_field("host", "h")
            .with_field("request", "GET /")
            .with_field("status", 200);
        assert_eq!(
            access().format(&record, "sanic.access"),
            Err(FormattingError::MissingField {
                formatter: "access".to_owned(),
                field: "byte".to_owned(),
            })
        );
    }

    #[test]
    fn text_value_in_integer_placeholder_is_rejected() {
        let record = LogRecord::access("", "h", "GET /", 200, 0).with_field("byte", "lots");
        let err = access().format(&record, "sanic.access").unwrap_err();
        assert!(matches!(err, FormattingError::NotAnInteger { ref field, .. } if field == "byte"));
    }

    #[test]
    fn integer_values_render_through_text_placeholders() {
        let formatter = Formatter::new("f", "%(levelno)s/%(levelno)d %(status)s", "").unwrap();
        let record =
            LogRecord::new(ChannelKind::Access, Severity::Error, "").with_field("status", 500);
        assert_eq!(formatter.format(&record, "x").unwrap(), "40/40 500");
    }

    #[test]
    fn builtin_attributes_shadow_record_fields() {
        let formatter = Formatter::new("f", "%(message)s", "").unwrap();
        let record = LogRecord::new(ChannelKind::General, Severity::Info, "real")
            .with_field("message", "fake");
        assert_eq!(formatter.format(&record, "x").unwrap(), "real");
    }

    #[test]
    fn construction_rejects_bad_templates_and_dates() {
        assert!(matches!(
            Formatter::new("f", "%(message", "%H"),
            Err(ConfigurationError::Template { .. })
        ));
        assert!(matches!(
            Formatter::new("f", "%(message)s", "%a"),
            Err(ConfigurationError::DateFormat { .. })
        ));
    }

    #[test]
    fn fallback_line_shape() {
        let record = LogRecord::new(ChannelKind::Error, Severity::Error, "boom");
        assert_eq!(fallback_line(&record, "sanic.error"), "ERROR:sanic.error:boom");
    }

    #[test]
    fn uses_field_reports_template_fields() {
        assert!(access().uses_field("byte"));
        assert!(!generic().uses_field("byte"));
        assert_eq!(access().name(), "access");
    }
}
