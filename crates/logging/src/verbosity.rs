//! crates/logging/src/verbosity.rs
//! Verbosity annotations and the shared threshold filter.
//!
//! Verbosity is a second filtering dimension next to [`Severity`](crate::Severity):
//! a record tagged with verbosity `v` is only written while the shared
//! threshold is at least `v`. Untagged records count as verbosity 0 and so
//! pass at every threshold.

use std::fmt;
use std::sync::atomic::{AtomicI32, Ordering};

use crate::record::LogRecord;

/// Verbosity annotation carried by a [`LogRecord`].
///
/// Higher values are chattier. Negative values are accepted and pass every
/// non-negative threshold.
#[derive(Copy, Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Verbosity(i32);

impl Verbosity {
    /// The implicit verbosity of an untagged record.
    pub const QUIET: Self = Self(0);

    /// Wraps a raw verbosity value.
    #[must_use]
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl From<i32> for Verbosity {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

impl From<u8> for Verbosity {
    fn from(value: u8) -> Self {
        Self(i32::from(value))
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Error raised when the filter threshold would become invalid.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum FilterStateError {
    /// Thresholds must be zero or greater.
    #[error("verbosity threshold must not be negative (got {0})")]
    Negative(i32),
}

/// Threshold gate shared by every channel of a [`Logging`](crate::Logging) context.
///
/// The filter is created once, wrapped in an [`Arc`](std::sync::Arc) and
/// handed to each channel. Updating the threshold through any handle is
/// observed by all channels on their next decision.
///
/// # Examples
///
/// ```
/// use logging::{ChannelKind, LogRecord, Severity, VerbosityFilter};
///
/// let filter = VerbosityFilter::new();
/// let chatty = LogRecord::new(ChannelKind::General, Severity::Debug, "SEND HEADERS")
///     .with_verbosity(2);
///
/// assert!(!filter.should_emit(&chatty));
/// filter.set_threshold(2).unwrap();
/// assert!(filter.should_emit(&chatty));
/// ```
#[derive(Debug, Default)]
pub struct VerbosityFilter {
    threshold: AtomicI32,
}

impl VerbosityFilter {
    /// Creates a filter with threshold 0.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            threshold: AtomicI32::new(0),
        }
    }

    /// Creates a filter with the given starting threshold.
    pub fn with_threshold(threshold: i32) -> Result<Self, FilterStateError> {
        let filter = Self::new();
        filter.set_threshold(threshold)?;
        Ok(filter)
    }

    /// Returns the current threshold.
    #[must_use]
    pub fn threshold(&self) -> Verbosity {
        Verbosity(self.threshold.load(Ordering::Acquire))
    }

    /// Replaces the threshold. Negative values are rejected and leave the
    /// current threshold untouched.
    pub fn set_threshold(&self, threshold: i32) -> Result<(), FilterStateError> {
        if threshold < 0 {
            return Err(FilterStateError::Negative(threshold));
        }
        self.threshold.store(threshold, Ordering::Release);
        tracing::debug!(target: "sanic::internal", threshold, "verbosity threshold updated");
        Ok(())
    }

    /// Replaces the threshold, clamping negative values to 0.
    ///
    /// Returns the threshold that was stored.
    pub fn set_threshold_saturating(&self, threshold: i32) -> Verbosity {
        let clamped = threshold.max(0);
        if clamped != threshold {
            tracing::warn!(
                target: "sanic::internal",
                requested = threshold,
                "negative verbosity threshold clamped to 0"
            );
        }
        self.threshold.store(clamped, Ordering::Release);
        Verbosity(clamped)
    }

    /// Reports whether a record tagged with `verbosity` passes the gate.
    #[must_use]
    pub fn allows(&self, verbosity: Verbosity) -> bool {
        verbosity <= self.threshold()
    }

    /// Reports whether `record` passes the gate. Records without a verbosity
    /// annotation are treated as verbosity 0.
    #[must_use]
    pub fn should_emit(&self, record: &LogRecord) -> bool {
        self.allows(record.verbosity())
    }
}
