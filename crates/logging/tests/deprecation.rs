//! Integration tests for deprecation notices.

use std::sync::Arc;

use logging::{
    CollectedWarnings, Color, DeprecationEmitter, Interactivity, Logging, LoggingConfig,
    format_deprecation,
};
use logging_sink::{CaptureBuffer, SharedSink, StreamTarget};

/// Non-interactive output is exactly the plain notice.
#[test]
fn plain_notice_text() {
    assert_eq!(
        format_deprecation("X is removed", 21.12, false),
        "[DEPRECATION v21.12] X is removed"
    );
}

/// Interactive output colours the prefix red and the message yellow.
#[test]
fn coloured_notice_markers() {
    let text = format_deprecation("X is removed", 21.12, true);
    let red = format!("{}[DEPRECATION", Color::Red);
    let yellow = format!("{}X is removed{}", Color::Yellow, Color::End);
    assert!(text.starts_with(&red));
    assert!(text.contains(&yellow));
}

/// Notices never pass through the channels or the verbosity filter.
#[test]
fn notices_bypass_channels() {
    let stdout = CaptureBuffer::new();
    let stderr = CaptureBuffer::new();
    let logging = Logging::builder(LoggingConfig::default())
        .destination(StreamTarget::Stdout, Arc::new(SharedSink::new(stdout.clone())))
        .destination(StreamTarget::Stderr, Arc::new(SharedSink::new(stderr.clone())))
        .build()
        .unwrap();

    let collected = CollectedWarnings::new();
    let emitter = DeprecationEmitter::new(Interactivity::Never, Arc::new(collected.clone()));
    emitter.emit("old API", 23.0);
    emitter.emit("old API", 23.0);

    assert_eq!(logging.verbosity().get(), 0);
    assert!(stdout.contents().is_empty());
    assert!(stderr.contents().is_empty());

    let warnings = collected.warnings();
    assert_eq!(warnings.len(), 2);
    assert!(warnings.iter().all(|w| w.text() == "[DEPRECATION v23.0] old API"));
}
