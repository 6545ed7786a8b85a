//! crates/logging/src/tracing_bridge.rs
//! Bridge from `tracing` events into the server channels.
//!
//! [`ChannelLayer`] is a `tracing-subscriber` layer that turns events whose
//! target names a channel into [`LogRecord`]s and hands them to a shared
//! [`Logging`] context. The usual severity and verbosity gates apply.
//!
//! | target                           | channel  |
//! |----------------------------------|----------|
//! | `sanic::root`, `sanic::general`  | general  |
//! | `sanic::error`                   | error    |
//! | `sanic::access`                  | access   |
//!
//! Events on any other target, including this crate's own `sanic::internal`
//! and `sanic::deprecation` diagnostics, are ignored.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use logging::{Logging, init_tracing};
//!
//! let logging = Arc::new(Logging::from_defaults()?);
//! init_tracing(Arc::clone(&logging))?;
//!
//! tracing::info!(target: "sanic::root", "Goin' Fast");
//! tracing::debug!(target: "sanic::root", verbosity = 2, "SEND HEADERS");
//! ```

use std::fmt;
use std::sync::Arc;

use tracing::field::{Field, Visit};
use tracing::{Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::TryInitError;

use crate::channel::ChannelKind;
use crate::record::{FieldValue, LogRecord};
use crate::registry::Logging;
use crate::severity::Severity;

/// Layer routing channel-targeted `tracing` events into a [`Logging`] context.
#[derive(Clone, Debug)]
pub struct ChannelLayer {
    logging: Arc<Logging>,
}

impl ChannelLayer {
    /// Creates a layer writing through `logging`.
    #[must_use]
    pub fn new(logging: Arc<Logging>) -> Self {
        Self { logging }
    }

    /// Maps an event target to a channel.
    fn target_to_channel(target: &str) -> Option<ChannelKind> {
        match target {
            "sanic::root" | "sanic::general" => Some(ChannelKind::General),
            "sanic::error" => Some(ChannelKind::Error),
            "sanic::access" => Some(ChannelKind::Access),
            _ => None,
        }
    }

    const fn level_to_severity(level: &Level) -> Severity {
        match *level {
            Level::ERROR => Severity::Error,
            Level::WARN => Severity::Warning,
            Level::INFO => Severity::Info,
            Level::DEBUG | Level::TRACE => Severity::Debug,
        }
    }
}

impl<S> Layer<S> for ChannelLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let Some(channel) = Self::target_to_channel(metadata.target()) else {
            return;
        };
        let severity = Self::level_to_severity(metadata.level());
        if !self.logging.channel(channel).is_enabled_for(severity) {
            return;
        }

        let mut visitor = RecordVisitor::default();
        event.record(&mut visitor);

        let mut record = LogRecord::new(channel, severity, visitor.message.unwrap_or_default());
        if let Some(verbosity) = visitor.verbosity {
            record = record.with_verbosity(verbosity);
        }
        for (name, value) in visitor.fields {
            record = record.with_field(name, value);
        }
        // A subscriber has no caller to report rendering failures to.
        let _ = self.logging.log(&record);
    }
}

/// Collects the message, verbosity and remaining fields of an event.
#[derive(Default)]
struct RecordVisitor {
    message: Option<String>,
    verbosity: Option<i32>,
    fields: Vec<(&'static str, FieldValue)>,
}

impl RecordVisitor {
    fn record_value(&mut self, field: &Field, value: FieldValue) {
        match field.name() {
            "message" => self.message = Some(value.to_string()),
            // Values that cannot be read as a number are treated as the
            // chattiest verbosity so they stay hidden.
            "verbosity" => self.verbosity = Some(i32::MAX),
            name => self.fields.push((name, value)),
        }
    }
}

/// Clamps a wide integer into the verbosity range.
fn saturate(value: i64) -> i32 {
    i32::try_from(value).unwrap_or(if value < 0 { i32::MIN } else { i32::MAX })
}

/// Rounds a fractional verbosity up so that `v <= threshold` is preserved.
fn saturate_float(value: f64) -> i32 {
    if value.is_nan() {
        i32::MAX
    } else {
        // Float to int casts saturate at the bounds.
        value.ceil() as i32
    }
}

impl Visit for RecordVisitor {
    fn record_i64(&mut self, field: &Field, value: i64) {
        if field.name() == "verbosity" {
            self.verbosity = Some(saturate(value));
        } else {
            self.record_value(field, FieldValue::Int(value));
        }
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        if field.name() == "verbosity" {
            self.verbosity = Some(i32::try_from(value).unwrap_or(i32::MAX));
        } else {
            self.record_value(field, FieldValue::from(value));
        }
    }

    fn record_i128(&mut self, field: &Field, value: i128) {
        if field.name() == "verbosity" {
            let clamped = value.clamp(i128::from(i32::MIN), i128::from(i32::MAX));
            self.verbosity = Some(clamped as i32);
        } else {
            self.record_value(field, FieldValue::Text(value.to_string()));
        }
    }

    fn record_u128(&mut self, field: &Field, value: u128) {
        if field.name() == "verbosity" {
            self.verbosity = Some(i32::try_from(value).unwrap_or(i32::MAX));
        } else {
            self.record_value(field, FieldValue::Text(value.to_string()));
        }
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        if field.name() == "verbosity" {
            self.verbosity = Some(saturate_float(value));
        } else {
            self.record_value(field, FieldValue::Text(value.to_string()));
        }
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.record_value(field, FieldValue::Text(value.to_string()));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "verbosity" {
            let parsed = value.trim().parse::<i64>().map(saturate);
            let parsed = parsed.or_else(|_| value.trim().parse::<f64>().map(saturate_float));
            self.verbosity = Some(parsed.unwrap_or(i32::MAX));
        } else {
            self.record_value(field, FieldValue::from(value));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.record_value(field, FieldValue::Text(format!("{value:?}")));
    }
}

/// Installs a global subscriber that routes channel events into `logging`.
pub fn init_tracing(logging: Arc<Logging>) -> Result<(), TryInitError> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::registry()
        .with(ChannelLayer::new(logging))
        .try_init()
}

/// Installs a global subscriber combining `filter` with the channel layer.
///
/// ```rust,ignore
/// use tracing_subscriber::EnvFilter;
///
/// init_tracing_with_filter(logging, EnvFilter::from_default_env())?;
/// ```
pub fn init_tracing_with_filter<F>(logging: Arc<Logging>, filter: F) -> Result<(), TryInitError>
where
    F: Layer<tracing_subscriber::Registry> + Send + Sync + 'static,
{
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::registry()
        .with(filter)
        .with(ChannelLayer::new(logging))
        .try_init()
}
