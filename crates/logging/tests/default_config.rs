//! Integration tests for the exported default configuration.

use logging::{ChannelKind, LoggingConfig, Severity};
use serde_json::{Value, json};

/// The JSON form carries the exact keys and values consumers merge into.
#[test]
fn default_json_shape() {
    let json = LoggingConfig::default().to_json_pretty().unwrap();
    let value: Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["version"], json!(1));
    assert_eq!(value["disable_existing_loggers"], json!(false));
    assert_eq!(
        value["loggers"]["sanic.root"],
        json!({"level": "INFO", "handlers": ["console"]})
    );
    assert_eq!(
        value["loggers"]["sanic.error"],
        json!({
            "level": "INFO",
            "handlers": ["error_console"],
            "propagate": true,
            "qualname": "sanic.error"
        })
    );
    assert_eq!(
        value["handlers"]["error_console"],
        json!({
            "class": "logging.StreamHandler",
            "formatter": "generic",
            "stream": "ext://sys.stderr"
        })
    );
    assert_eq!(
        value["formatters"]["access"],
        json!({
            "format": concat!(
                "%(asctime)s - (%(name)s)[%(levelname)s][%(host)s]: ",
                "%(request)s %(message)s %(status)d %(byte)d"
            ),
            "datefmt": "[%Y-%m-%d %H:%M:%S %z]",
            "class": "logging.Formatter"
        })
    );
}

/// Serialising and parsing preserves overrides.
#[test]
fn json_round_trip_keeps_overrides() {
    let config = LoggingConfig::default()
        .with_debug()
        .with_level(ChannelKind::Access, Severity::Error);
    let parsed = LoggingConfig::from_json(&config.to_json_pretty().unwrap()).unwrap();
    assert_eq!(parsed, config);
    assert_eq!(parsed.logger(ChannelKind::General).unwrap().level, Severity::Debug);
}

/// Loading rejects a document that parses but does not validate.
#[test]
fn from_json_validates() {
    let mut value: Value = serde_json::to_value(LoggingConfig::default()).unwrap();
    value["formatters"]["generic"]["format"] = json!("%(asctime");
    let err = LoggingConfig::from_json(&value.to_string()).unwrap_err();
    assert!(err.to_string().contains("invalid format template"));
}
