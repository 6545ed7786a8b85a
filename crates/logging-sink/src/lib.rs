#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! crates/logging-sink/src/lib.rs
//!
//! # Overview
//!
//! `logging-sink` provides the output side of the srvlog channels: a
//! [`Destination`] seam that accepts fully rendered lines, the
//! [`MessageSink`] wrapper that writes those lines into any
//! [`std::io::Write`] implementor, and ready-made destinations for the
//! process streams and for in-memory capture.
//!
//! # Design
//!
//! Channels never touch writers directly. Each handler holds an
//! `Arc<dyn Destination>`; the destination decides how to serialise
//! concurrent writers. [`SharedSink`] guards a [`MessageSink`] with a mutex,
//! [`StdStream`] holds the standard handle lock for the duration of a line.
//!
//! # Invariants
//!
//! - A line is written with a single `write_all` followed by its terminator
//!   under one lock, so concurrent callers never interleave partial lines.
//! - `LineMode::WithNewline` is the default and the only mode used by
//!   destinations.
//!
//! # Errors
//!
//! All operations surface [`std::io::Error`] values originating from the
//! underlying writer. Callers decide whether a failed write is fatal; the
//! logging channels treat it as a dropped line.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use logging_sink::{CaptureBuffer, Destination, SharedSink};
//!
//! let buffer = CaptureBuffer::new();
//! let destination: Arc<dyn Destination> = Arc::new(SharedSink::new(buffer.clone()));
//!
//! destination.write_line("[INFO] Starting worker").unwrap();
//! assert_eq!(buffer.contents(), "[INFO] Starting worker\n");
//! ```

mod destination;
mod line_mode;
mod sink;

pub use destination::{
    CaptureBuffer, Destination, SharedSink, StdStream, StreamTarget, UnknownStreamTarget,
};
pub use line_mode::LineMode;
pub use sink::MessageSink;
