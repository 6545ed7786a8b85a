//! Integration tests for the default templates and the format policies.

use std::sync::Arc;

use logging::{
    ChannelKind, FormatPolicy, FormattingError, LogRecord, Logging, LoggingConfig, Severity,
};
use logging_sink::{CaptureBuffer, SharedSink, StreamTarget};
use time::macros::datetime;

fn capture(policy: FormatPolicy) -> (Logging, CaptureBuffer) {
    let stdout = CaptureBuffer::new();
    let logging = Logging::builder(LoggingConfig::default())
        .destination(StreamTarget::Stdout, Arc::new(SharedSink::new(stdout.clone())))
        .destination(StreamTarget::Stderr, Arc::new(SharedSink::new(Vec::new())))
        .format_policy(policy)
        .build()
        .unwrap();
    (logging, stdout)
}

// ============================================================================
// Default Template Tests
// ============================================================================

/// The access line renders its fields in template order.
#[test]
fn access_line_field_order() {
    let (logging, stdout) = capture(FormatPolicy::Strict);
    let record = LogRecord::access("", "127.0.0.1:50514", "GET http://localhost:8000/", 404, 731)
        .with_created(datetime!(2021-12-05 13:45:01 -05:00));

    assert!(logging.log(&record).unwrap());
    assert_eq!(
        stdout.lines(),
        vec![
            concat!(
                "[2021-12-05 13:45:01 -0500] - (sanic.access)[INFO][127.0.0.1:50514]: ",
                "GET http://localhost:8000/  404 731"
            )
            .to_owned()
        ]
    );
}

/// The generic line carries timestamp, process id and level.
#[test]
fn generic_line_layout() {
    let (logging, stdout) = capture(FormatPolicy::Strict);
    let record = LogRecord::new(ChannelKind::General, Severity::Warning, "slow request")
        .with_created(datetime!(2022-01-02 03:04:05 UTC))
        .with_process(31337);

    logging.log(&record).unwrap();
    assert_eq!(
        stdout.contents(),
        "[2022-01-02 03:04:05 +0000] [31337] [WARNING] slow request\n"
    );
}

// ============================================================================
// Format Policy Tests
// ============================================================================

/// Strict mode reports the first missing access field and writes nothing.
#[test]
fn strict_policy_reports_missing_field() {
    let (logging, stdout) = capture(FormatPolicy::Strict);
    let record = LogRecord::new(ChannelKind::Access, Severity::Info, "")
        .with_field("request", "GET /")
        .with_field("status", 200)
        .with_field("byte", 0);

    let err = logging.log(&record).unwrap_err();
    assert_eq!(
        err,
        FormattingError::MissingField {
            formatter: "access".to_owned(),
            field: "host".to_owned(),
        }
    );
    assert!(stdout.contents().is_empty());
}

/// Fallback mode writes the minimal layout instead.
#[test]
fn fallback_policy_writes_minimal_layout() {
    let (logging, stdout) = capture(FormatPolicy::default());
    assert!(logging.access().emit(Severity::Info, "bare access").unwrap());
    assert_eq!(stdout.lines(), vec!["INFO:sanic.access:bare access".to_owned()]);
}

/// A non-integer status is a formatting error, not a panic.
#[test]
fn non_integer_status_is_reported() {
    let (logging, _) = capture(FormatPolicy::Strict);
    let record = LogRecord::access("", "h", "GET /", 200, 1).with_field("status", "OK");
    assert!(matches!(
        logging.log(&record),
        Err(FormattingError::NotAnInteger { ref field, .. }) if field == "status"
    ));
}
