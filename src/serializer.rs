//! Response content serialization.
//!
//! Handlers negotiate *which* serializer encodes their response (driven by the
//! request's `format` argument); the dispatcher owns the fallback rule: error
//! bodies always go through the compact [`JsonSerializer`], never a
//! handler-specific one, so a failing serializer cannot cascade on a path that
//! is already failing.

use std::sync::Arc;

use serde_json::Value;

use crate::error::ApiError;

/// Converts response content into transmittable bytes in a negotiated format.
pub trait Serializer: Send + Sync {
    /// Serialize `content` into its wire representation.
    fn serialize(&self, content: &Value) -> Result<Vec<u8>, ApiError>;

    /// Short format token, used for negotiation and logging.
    fn format(&self) -> &'static str;
}

/// Compact JSON, the default wire format.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonSerializer;

impl Serializer for JsonSerializer {
    fn serialize(&self, content: &Value) -> Result<Vec<u8>, ApiError> {
        serde_json::to_vec(content).map_err(|err| ApiError::Serialization {
            detail: err.to_string(),
        })
    }

    fn format(&self) -> &'static str {
        "json"
    }
}

/// Indented JSON, negotiated via the `format=pretty` hint.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrettyJsonSerializer;

impl Serializer for PrettyJsonSerializer {
    fn serialize(&self, content: &Value) -> Result<Vec<u8>, ApiError> {
        serde_json::to_vec_pretty(content).map_err(|err| ApiError::Serialization {
            detail: err.to_string(),
        })
    }

    fn format(&self) -> &'static str {
        "pretty"
    }
}

/// Select a serializer for the given format hint.
///
/// Unknown or absent hints fall back to compact JSON; a format request is a
/// hint, not a contract.
#[must_use]
pub fn negotiate(format: Option<&str>) -> Arc<dyn Serializer> {
    match format {
        Some("pretty") => Arc::new(PrettyJsonSerializer),
        _ => Arc::new(JsonSerializer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_compact_output() {
        let bytes = JsonSerializer.serialize(&json!({"a": 1})).unwrap();
        assert_eq!(bytes, br#"{"a":1}"#);
    }

    #[test]
    fn test_negotiate_defaults_to_json() {
        assert_eq!(negotiate(None).format(), "json");
        assert_eq!(negotiate(Some("xml")).format(), "json");
        assert_eq!(negotiate(Some("pretty")).format(), "pretty");
    }
}
