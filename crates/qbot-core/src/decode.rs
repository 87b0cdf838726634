//! Staged payload decoding.
//!
//! The outer frame is uniform but the value under `d` changes shape with the
//! event tag. Decoding therefore happens in two passes:
//!
//! 1. the named field is pulled out as a borrowed [`RawValue`], without
//!    looking inside it;
//! 2. that region alone is decoded strictly into the caller's type.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde_json::value::RawValue;

use crate::error::{DecodeError, DecodeResult};

/// Name of the frame field that wraps every event payload.
pub const PAYLOAD_FIELD: &str = "d";

/// Decodes the event payload (`d`) of a frame into `T`.
///
/// ```rust
/// use qbot_core::decode::decode_payload;
/// use qbot_core::model::Message;
///
/// let frame = br#"{"op":0,"t":"MESSAGE_CREATE","d":{"id":"m1","content":"hi"}}"#;
/// let msg: Message = decode_payload(frame).unwrap();
/// assert_eq!(msg.content, "hi");
/// ```
pub fn decode_payload<T: DeserializeOwned>(raw: &[u8]) -> DecodeResult<T> {
    decode_field(raw, PAYLOAD_FIELD)
}

/// Decodes the top-level `field` of a JSON document into `T`.
///
/// A missing field and an explicit `null` are both reported as
/// [`DecodeError::MissingField`].
pub fn decode_field<T: DeserializeOwned>(raw: &[u8], field: &'static str) -> DecodeResult<T> {
    let region = extract_field(raw, field)?;
    Ok(serde_json::from_str(region.get())?)
}

/// Borrows the raw sub-document stored under `field`.
fn extract_field<'a>(raw: &'a [u8], field: &'static str) -> DecodeResult<&'a RawValue> {
    let mut fields: HashMap<String, &'a RawValue> = serde_json::from_slice(raw)?;
    fields
        .remove(field)
        .filter(|value| value.get() != "null")
        .ok_or(DecodeError::MissingField(field))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Sample {
        id: String,
        #[serde(default)]
        count: u32,
    }

    #[test]
    fn test_decode_payload() {
        let raw = br#"{"op":0,"s":1,"t":"X","d":{"id":"a","count":3}}"#;
        let sample: Sample = decode_payload(raw).unwrap();
        assert_eq!(
            sample,
            Sample {
                id: "a".to_string(),
                count: 3
            }
        );
    }

    #[test]
    fn test_decode_payload_ignores_sibling_fields() {
        // Siblings of `d` are never interpreted, whatever their shape.
        let raw = br#"{"op":"weird","extra":[1,{"x":null}],"d":{"id":"b"}}"#;
        let sample: Sample = decode_payload(raw).unwrap();
        assert_eq!(sample.id, "b");
    }

    #[test]
    fn test_missing_payload() {
        let err = decode_payload::<Sample>(br#"{"op":0}"#).unwrap_err();
        assert!(matches!(err, DecodeError::MissingField("d")));

        let err = decode_payload::<Sample>(br#"{"op":0,"d":null}"#).unwrap_err();
        assert!(matches!(err, DecodeError::MissingField("d")));
    }

    #[test]
    fn test_type_mismatch() {
        let err = decode_payload::<Sample>(br#"{"d":{"id":7}}"#).unwrap_err();
        assert!(matches!(err, DecodeError::Json(_)));

        let err = decode_payload::<Sample>(br#"{"d":"just a string"}"#).unwrap_err();
        assert!(matches!(err, DecodeError::Json(_)));
    }

    #[test]
    fn test_malformed_frame() {
        assert!(matches!(
            decode_payload::<Sample>(b"{\"d\": {"),
            Err(DecodeError::Json(_))
        ));
        assert!(matches!(
            decode_payload::<Sample>(b"[1,2,3]"),
            Err(DecodeError::Json(_))
        ));
    }

    #[test]
    fn test_decode_other_field() {
        let raw = br#"{"id":"","message":{"id":"c","count":1}}"#;
        let sample: Sample = decode_field(raw, "message").unwrap();
        assert_eq!(sample.id, "c");
    }
}
