//! JSON and hex conversions for protocol messages

use serde_json::{Value, json};

use super::CliError;
use crate::protocol::Message;

/// Convert a message to a JSON object. The blob is written as hex.
pub fn message_to_json(message: &Message) -> Value {
    json!({
        "id": message.id,
        "request_id": message.request_id,
        "name": message.name,
        "args": message.args,
        "blob": encode_hex(&message.blob),
    })
}

/// Build a message from a JSON object with `name` and optional `id`, `request_id`, `args` and
/// hex `blob` fields
pub fn message_from_json(value: &Value) -> Result<Message, CliError> {
    let field_u64 = |field: &'static str| match value.get(field) {
        None => Ok(0),
        Some(v) => v.as_u64().ok_or(CliError::MessageField(field)),
    };

    let name = value
        .get("name")
        .and_then(Value::as_str)
        .ok_or(CliError::MessageField("name"))?;
    let args = match value.get("args") {
        None => Vec::new(),
        Some(Value::Array(args)) => args.clone(),
        Some(_) => return Err(CliError::MessageField("args")),
    };
    let blob = match value.get("blob") {
        None => Vec::new(),
        Some(Value::String(hex)) => decode_hex(hex)?,
        Some(_) => return Err(CliError::MessageField("blob")),
    };

    Ok(Message {
        id: field_u64("id")?,
        request_id: field_u64("request_id")?,
        name: name.to_string(),
        args,
        blob,
    })
}

/// Decode a hex dump of a frame. Whitespace between bytes is allowed.
pub fn hex_to_message(hex: &str) -> Result<Message, CliError> {
    let bytes = decode_hex(hex)?;
    Ok(Message::decode(&bytes)?)
}

pub fn encode_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

pub fn decode_hex(hex: &str) -> Result<Vec<u8>, CliError> {
    let digits: Vec<(usize, char)> = hex
        .char_indices()
        .filter(|(_, c)| !c.is_whitespace())
        .collect();

    digits
        .chunks(2)
        .map(|pair| match pair {
            [(_, high), (i, low)] => {
                let high = high.to_digit(16).ok_or(CliError::Hex(pair[0].0))?;
                let low = low.to_digit(16).ok_or(CliError::Hex(*i))?;
                Ok((high * 16 + low) as u8)
            }
            [(i, _)] => Err(CliError::Hex(*i)),
            _ => Err(CliError::Hex(hex.len())),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex() {
        assert_eq!(encode_hex(&[0x00, 0xAA, 0x0f]), "00aa0f");
        assert_eq!(decode_hex("00 aa\n0F").unwrap(), vec![0x00, 0xAA, 0x0F]);
        assert!(matches!(decode_hex("abc"), Err(CliError::Hex(2))));
        assert!(matches!(decode_hex("zz"), Err(CliError::Hex(0))));
    }

    #[test]
    fn test_json_round_trip() {
        let value = json!({
            "id": 1,
            "request_id": 2,
            "name": "eval",
            "args": [1, 2, 3],
            "blob": "aabb",
        });
        let message = message_from_json(&value).unwrap();
        assert_eq!(message.blob, vec![0xAA, 0xBB]);
        assert_eq!(message_to_json(&message), value);
    }

    #[test]
    fn test_missing_name() {
        let result = message_from_json(&json!({"id": 1}));
        assert!(matches!(result, Err(CliError::MessageField("name"))));
    }

    #[test]
    fn test_hex_to_message() {
        let message = Message::new(5, "ping", vec![]);
        let hex = encode_hex(&message.encode().unwrap());
        assert_eq!(hex_to_message(&hex).unwrap(), message);
        assert!(matches!(hex_to_message("0102"), Err(CliError::Malformed(_))));
    }
}
