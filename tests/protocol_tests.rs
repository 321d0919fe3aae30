// tests/protocol_tests.rs

use rlang_core::protocol::{self, EncodeError, MalformedData, MalformedKind, Message};
use serde_json::json;

fn header(id: u64, request_id: u64) -> Vec<u8> {
    let mut bytes = id.to_le_bytes().to_vec();
    bytes.extend_from_slice(&request_id.to_le_bytes());
    bytes
}

fn frame(parts: &[&[u8]]) -> Vec<u8> {
    let mut bytes = header(1, 0);
    for part in parts {
        bytes.extend_from_slice(part);
    }
    bytes
}

// ============================================================================
// Round Trips
// ============================================================================

#[test]
fn test_eval_scenario() {
    let message = Message::new(1, "eval", vec![json!(1), json!(2), json!(3)]);
    let message = Message {
        request_id: 2,
        ..message.with_blob(vec![0xAA, 0xBB])
    };

    let bytes = message.encode().unwrap();
    let mut expected = header(1, 2);
    expected.extend_from_slice(b"eval\0[1,2,3]\0");
    expected.extend_from_slice(&[0xAA, 0xBB]);
    assert_eq!(bytes, expected);

    assert_eq!(Message::decode(&bytes).unwrap(), message);
}

#[test]
fn test_argument_values_round_trip() {
    let args = vec![
        json!(null),
        json!(true),
        json!(-42),
        json!(u64::MAX),
        json!(1.5),
        json!("line\nbreak, \u{0} and ünïcödé"),
        json!([1, [2, [3]]]),
        json!({"code": "x <- 1", "echo": false}),
    ];
    let message = Message::new(9, "evaluate", args);
    let decoded = protocol::decode(&protocol::encode(&message).unwrap()).unwrap();
    assert_eq!(decoded, message);
}

#[test]
fn test_empty_args_and_blob() {
    let message = Message::new(3, "ping", vec![]);
    let bytes = message.encode().unwrap();
    assert_eq!(&bytes[16..], b"ping\0[]\0");

    let decoded = Message::decode(&bytes).unwrap();
    assert!(decoded.args.is_empty());
    assert!(decoded.blob.is_empty());
}

#[test]
fn test_blob_is_everything_after_the_args() {
    // A blob holding a complete frame stays opaque: one decode call, one message.
    let inner = Message::new(2, "inner", vec![json!("x")]).encode().unwrap();
    let outer = Message::new(1, "outer", vec![]).with_blob(inner.clone());

    let decoded = Message::decode(&outer.encode().unwrap()).unwrap();
    assert_eq!(decoded.name, "outer");
    assert_eq!(decoded.blob, inner);
}

#[test]
fn test_request_response_correlation() {
    let request = Message::new(41, "eval", vec![json!("1 + 1")]);
    let response = Message::response_to(&request, 42, "result", vec![json!(2)]);

    assert!(!request.is_response());
    assert!(response.is_response());
    assert_eq!(response.request_id, 41);

    let decoded = Message::decode(&response.encode().unwrap()).unwrap();
    assert_eq!(decoded.request_id, request.id);
}

#[test]
fn test_decode_from_many_threads() {
    let bytes = Message::new(5, "eval", vec![json!("x")]).encode().unwrap();
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| Message::decode(&bytes)))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap().unwrap().id, 5);
        }
    });
}

// ============================================================================
// Malformed Frames
// ============================================================================

#[test]
fn test_malformed_frames() {
    let test_cases: Vec<(Vec<u8>, MalformedKind, usize)> = vec![
        (vec![], MalformedKind::TruncatedHeader, 0),
        (vec![0; 12], MalformedKind::TruncatedHeader, 8),
        (frame(&[]), MalformedKind::MissingNameTerminator, 16),
        (frame(&[b"eval"]), MalformedKind::MissingNameTerminator, 20),
        (frame(&[b"\0[]\0"]), MalformedKind::EmptyName, 16),
        (frame(&["é".as_bytes(), b"\0[]\0"]), MalformedKind::NonAsciiName, 16),
        (frame(&[b"eval\0[1]"]), MalformedKind::MissingArgsTerminator, 24),
        (frame(&[b"eval\0", &[0xFF], b"\0"]), MalformedKind::InvalidUtf8Args, 21),
        (frame(&[b"eval\0{}\0"]), MalformedKind::ArgsNotArray, 21),
        (frame(&[b"eval\0\"x\"\0"]), MalformedKind::ArgsNotArray, 21),
    ];

    for (bytes, kind, offset) in test_cases {
        assert_eq!(
            Message::decode(&bytes),
            Err(MalformedData::new(kind.clone(), offset)),
            "Failed for kind: {}",
            kind
        );
    }
}

#[test]
fn test_invalid_json_args() {
    let cases: [&[u8]; 4] = [b"[1,", b"", b"[1] [2]", b"nope"];
    for args in cases {
        let bytes = frame(&[b"eval\0", args, b"\0"]);
        let error = Message::decode(&bytes).unwrap_err();
        assert!(
            matches!(error.kind, MalformedKind::InvalidJson(_)),
            "Failed for args: {:?}",
            String::from_utf8_lossy(args)
        );
        assert_eq!(error.offset, 21);
    }
}

#[test]
fn test_malformed_display() {
    let error = Message::decode(&[1, 2, 3]).unwrap_err();
    assert_eq!(error.to_string(), "malformed message at byte 0: truncated header");
}

#[test]
fn test_encode_rejects_invalid_names() {
    for name in ["", "évaluer", "a\0b"] {
        let result = Message::new(1, name, vec![]).encode();
        assert!(
            matches!(result, Err(EncodeError::InvalidName(_))),
            "Failed for name: {:?}",
            name
        );
    }
}

// ============================================================================
// Typed Arguments
// ============================================================================

#[test]
fn test_typed_argument_access() {
    let message = Message::new(
        1,
        "plot",
        vec![json!("png"), json!(640), json!(-1), json!(1.5), json!(true)],
    );

    assert_eq!(message.arg_str(0).unwrap(), "png");
    assert_eq!(message.arg_u64(1).unwrap(), 640);
    assert_eq!(message.arg_i64(2).unwrap(), -1);
    assert_eq!(message.arg_f64(3).unwrap(), 1.5);
    assert_eq!(message.arg_f64(1).unwrap(), 640.0);
    assert!(message.arg_bool(4).unwrap());
}

#[test]
fn test_typed_argument_errors() {
    let message = Message::new(1, "plot", vec![json!("png"), json!(-1)]);

    // Offsets point at the arguments: 16 header bytes, "plot", NUL.
    assert_eq!(
        message.arg_u64(0),
        Err(MalformedData::new(
            MalformedKind::ArgumentType {
                index: 0,
                expected: "an unsigned integer"
            },
            21
        ))
    );
    assert!(matches!(
        message.arg_u64(1).unwrap_err().kind,
        MalformedKind::ArgumentType { index: 1, .. }
    ));
    assert_eq!(
        message.arg(2).unwrap_err().kind,
        MalformedKind::ArgumentMissing { index: 2 }
    );
}

#[test]
fn test_message_display() {
    let request = Message::new(1, "eval", vec![json!(1)]);
    assert_eq!(request.to_string(), "#1 eval [1 args]");

    let response = Message::response_to(&request, 2, "result", vec![]).with_blob(vec![0; 4]);
    assert_eq!(response.to_string(), "#2 (re #1) result [0 args] +4 bytes");
}
