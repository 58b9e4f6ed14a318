//! Envelope codec: raw channel payloads to and from structured requests.
//!
//! When the channel flags a payload as binary, the JSON text is wrapped in
//! standard base64 on the wire; text payloads carry the JSON directly. The
//! same rule applies symmetrically to outbound responses.

use base64::{engine::general_purpose, Engine as _};
use http::Method;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::dispatcher::Request;
use crate::error::DecodeError;

/// Wire shape of one inbound message. Only `url` is expected in practice;
/// everything else defaults.
#[derive(Debug, Deserialize)]
struct RequestEnvelope {
    url: Option<String>,
    method: Option<String>,
    #[serde(default)]
    args: Map<String, Value>,
}

/// Decode a raw inbound payload into a [`Request`].
///
/// With `is_binary` set the payload is base64-decoded first, then parsed as a
/// UTF-8 JSON envelope. A missing `url` is *not* a decode error - the
/// dispatcher owns that failure and answers it over the still-open
/// connection.
pub fn decode_message(payload: &[u8], is_binary: bool) -> Result<Request, DecodeError> {
    let decoded;
    let text: &[u8] = if is_binary {
        decoded = general_purpose::STANDARD.decode(payload)?;
        &decoded
    } else {
        payload
    };

    let envelope: RequestEnvelope = serde_json::from_slice(text)?;
    let method = envelope
        .method
        .map(|token| {
            Method::from_bytes(token.to_ascii_uppercase().as_bytes())
                .map_err(|_| DecodeError::Method { token })
        })
        .transpose()?;

    Ok(Request::from_parts(envelope.url, method, envelope.args))
}

/// Encode a serialized response for sending, base64-wrapping it when the
/// inbound payload was binary-framed.
#[must_use]
pub fn encode_message(payload: Vec<u8>, is_binary: bool) -> Vec<u8> {
    if is_binary {
        general_purpose::STANDARD.encode(&payload).into_bytes()
    } else {
        payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_text_envelope() {
        let payload = br#"{"url": "user/info", "method": "get", "args": {"limit": 5}}"#;
        let request = decode_message(payload, false).unwrap();
        assert_eq!(request.url(), Some("user/info"));
        assert_eq!(request.method(), Some(&Method::GET));
        assert_eq!(request.get_argument("limit"), Some(&json!(5)));
    }

    #[test]
    fn test_decode_binary_envelope() {
        let wire = general_purpose::STANDARD.encode(br#"{"url": "health"}"#);
        let request = decode_message(wire.as_bytes(), true).unwrap();
        assert_eq!(request.url(), Some("health"));
        assert!(request.method().is_none());
    }

    #[test]
    fn test_decode_rejects_bad_base64() {
        assert!(matches!(
            decode_message(b"%%%not-base64%%%", true),
            Err(DecodeError::Base64(_))
        ));
    }

    #[test]
    fn test_decode_rejects_bad_method_token() {
        let payload = br#"{"url": "x", "method": "NOT A METHOD"}"#;
        assert!(matches!(
            decode_message(payload, false),
            Err(DecodeError::Method { .. })
        ));
    }

    #[test]
    fn test_encode_passthrough_and_base64() {
        let body = br#"{"ok":true}"#.to_vec();
        assert_eq!(encode_message(body.clone(), false), body);
        let wrapped = encode_message(body.clone(), true);
        assert_eq!(general_purpose::STANDARD.decode(wrapped).unwrap(), body);
    }
}
