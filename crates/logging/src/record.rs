//! crates/logging/src/record.rs
//! Log records and their structured fields.

use std::collections::BTreeMap;
use std::fmt;

use time::OffsetDateTime;

use crate::channel::ChannelKind;
use crate::severity::Severity;
use crate::verbosity::Verbosity;

/// Value of a structured record field.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FieldValue {
    /// Text value, rendered as-is by `%(...)s`.
    Text(String),
    /// Integer value, accepted by both `%(...)s` and `%(...)d`.
    Int(i64),
}

impl FieldValue {
    /// Returns the integer payload, if any.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            Self::Text(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Int(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

macro_rules! int_field_value {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for FieldValue {
                fn from(value: $ty) -> Self {
                    Self::Int(i64::from(value))
                }
            }
        )*
    };
}

int_field_value!(i8, i16, i32, i64, u8, u16, u32);

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        i64::try_from(value).map_or_else(|_| Self::Text(value.to_string()), Self::Int)
    }
}

impl From<usize> for FieldValue {
    fn from(value: usize) -> Self {
        i64::try_from(value).map_or_else(|_| Self::Text(value.to_string()), Self::Int)
    }
}

/// A single log event, built by the caller at the point of logging.
///
/// Records are immutable once built: the `with_*` builders consume and
/// return the record.
///
/// # Examples
///
/// ```
/// use logging::{ChannelKind, LogRecord, Severity, Verbosity};
///
/// let record = LogRecord::new(ChannelKind::Access, Severity::Info, "")
///     .with_field("host", "127.0.0.1:8000")
///     .with_field("request", "GET /")
///     .with_field("status", 200)
///     .with_field("byte", 13)
///     .with_verbosity(1);
///
/// assert_eq!(record.verbosity(), Verbosity::new(1));
/// assert_eq!(record.field("status").and_then(|v| v.as_int()), Some(200));
/// ```
#[derive(Clone, Debug)]
pub struct LogRecord {
    channel: ChannelKind,
    severity: Severity,
    verbosity: Option<Verbosity>,
    message: String,
    fields: BTreeMap<String, FieldValue>,
    created: OffsetDateTime,
    process: u32,
}

impl LogRecord {
    /// Creates a record stamped with the current local time and process id.
    #[must_use]
    pub fn new(channel: ChannelKind, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            channel,
            severity,
            verbosity: None,
            message: message.into(),
            fields: BTreeMap::new(),
            created: now(),
            process: std::process::id(),
        }
    }

    /// Creates an access-channel record carrying every field the access
    /// formatter needs.
    #[must_use]
    pub fn access(
        message: impl Into<String>,
        host: impl Into<String>,
        request: impl Into<String>,
        status: u16,
        byte: u64,
    ) -> Self {
        Self::new(ChannelKind::Access, Severity::Info, message)
            .with_field("host", host.into())
            .with_field("request", request.into())
            .with_field("status", status)
            .with_field("byte", byte)
    }

    /// Tags the record with a verbosity.
    #[must_use]
    pub fn with_verbosity(mut self, verbosity: impl Into<Verbosity>) -> Self {
        self.verbosity = Some(verbosity.into());
        self
    }

    /// Adds or replaces a structured field.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Overrides the creation timestamp.
    #[must_use]
    pub fn with_created(mut self, created: OffsetDateTime) -> Self {
        self.created = created;
        self
    }

    /// Overrides the process id rendered by `%(process)d`.
    #[must_use]
    pub fn with_process(mut self, process: u32) -> Self {
        self.process = process;
        self
    }

    /// Returns the channel the record targets.
    #[must_use]
    pub const fn channel(&self) -> ChannelKind {
        self.channel
    }

    /// Returns the record severity.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        self.severity
    }

    /// Returns the effective verbosity; untagged records report 0.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        self.verbosity.unwrap_or_default()
    }

    /// Reports whether the caller tagged the record with a verbosity.
    #[must_use]
    pub const fn has_verbosity(&self) -> bool {
        self.verbosity.is_some()
    }

    /// Returns the message text.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Looks up a structured field.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Iterates over the structured fields in name order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created(&self) -> OffsetDateTime {
        self.created
    }

    /// Returns the process id recorded at creation.
    #[must_use]
    pub const fn process(&self) -> u32 {
        self.process
    }
}

fn now() -> OffsetDateTime {
    // The local offset is unavailable once other threads exist on some
    // platforms; UTC keeps the timestamp well-formed.
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}
