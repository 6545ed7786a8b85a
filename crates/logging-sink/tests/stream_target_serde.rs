//! Serialization of stream targets as `ext://` references.

#![cfg(feature = "serde")]

use logging_sink::StreamTarget;

#[test]
fn stream_targets_serialize_as_ext_references() {
    let json = serde_json::to_string(&[StreamTarget::Stdout, StreamTarget::Stderr])
        .expect("serialize");
    assert_eq!(json, r#"["ext://sys.stdout","ext://sys.stderr"]"#);
}

#[test]
fn stream_targets_deserialize_from_ext_references() {
    let target: StreamTarget = serde_json::from_str(r#""ext://sys.stderr""#).expect("parse");
    assert_eq!(target, StreamTarget::Stderr);

    assert!(serde_json::from_str::<StreamTarget>(r#""ext://sys.stdin""#).is_err());
}
