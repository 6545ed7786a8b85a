#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `logging` is the process-wide logging facility of the server: three named
//! channels (`sanic.root`, `sanic.error`, `sanic.access`) with configurable
//! formatters and output streams, a shared verbosity gate that works
//! independently of severity, and a one-shot deprecation emitter.
//!
//! # Design
//!
//! - [`LoggingConfig`] is the typed form of the nested logging mapping. Its
//!   default value is the exported configuration; it is validated before any
//!   channel is built, so a bad template or a dangling handler reference is a
//!   [`ConfigurationError`] rather than a broken log line.
//! - [`Logging`] owns the three [`Channel`]s and exactly one
//!   [`VerbosityFilter`], shared through an [`Arc`](std::sync::Arc). Raising the
//!   threshold with [`Logging::set_verbosity`] reveals tagged records on every
//!   channel at once.
//! - Lines are written through [`logging_sink::Destination`] so tests and
//!   embedders can capture output without touching the process streams.
//! - [`deprecation()`] bypasses the channels and reports through a
//!   [`WarningSink`].
//!
//! # Invariants
//!
//! - A record is written iff its severity is at least the channel level and
//!   its verbosity (0 when untagged) is at most the shared threshold.
//! - The threshold is never negative.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use logging::{LogRecord, Logging, LoggingConfig};
//! use logging_sink::{CaptureBuffer, SharedSink, StreamTarget};
//!
//! let stdout = CaptureBuffer::new();
//! let logging = Logging::builder(LoggingConfig::default())
//!     .destination(StreamTarget::Stdout, Arc::new(SharedSink::new(stdout.clone())))
//!     .destination(StreamTarget::Stderr, Arc::new(SharedSink::new(Vec::new())))
//!     .build()
//!     .unwrap();
//!
//! logging
//!     .log(&LogRecord::access("", "127.0.0.1:50514", "GET http://localhost/", 200, 13))
//!     .unwrap();
//! assert!(stdout
//!     .contents()
//!     .contains("(sanic.access)[INFO][127.0.0.1:50514]: GET http://localhost/  200 13"));
//! ```
//!
//! # See also
//!
//! - `logging-sink` for the line-oriented destinations.

mod channel;
mod color;
mod config;
mod deprecation;
mod format;
mod record;
mod registry;
mod severity;
mod verbosity;

#[cfg(feature = "tracing")]
mod tracing_bridge;
#[cfg(feature = "tracing")]
mod tracing_macros;

pub use channel::{Channel, ChannelKind, Handler, ParseChannelError};
pub use color::Color;
pub use config::{
    ACCESS_FORMAT, CONFIG_VERSION, ConfigurationError, DEFAULT_DATE_FORMAT, FORMATTER_CLASS,
    FormatterConfig, GENERIC_FORMAT, HandlerConfig, LoggerConfig, LoggingConfig,
    STREAM_HANDLER_CLASS,
};
pub use deprecation::{
    CollectedWarnings, DeprecationEmitter, DeprecationWarning, Interactivity, StderrWarnings,
    WarningSink, deprecation, format_deprecation, stdout_is_interactive,
};
pub use format::{FormatPolicy, Formatter, FormattingError, fallback_line};
pub use record::{FieldValue, LogRecord};
pub use registry::{Logging, LoggingBuilder};
pub use severity::{ParseSeverityError, Severity};
pub use verbosity::{FilterStateError, Verbosity, VerbosityFilter};

#[cfg(feature = "tracing")]
pub use tracing_bridge::{ChannelLayer, init_tracing, init_tracing_with_filter};
