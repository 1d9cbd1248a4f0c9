//! LLSD XML implementation of the payload codec port.

use llsd::{LlsdMap, LlsdValue};

use crate::domain::ports::{PayloadCodec, PayloadCodecError};

/// Payload codec speaking LLSD XML.
#[derive(Debug, Clone, Copy, Default)]
pub struct LlsdXmlCodec;

impl PayloadCodec for LlsdXmlCodec {
    fn content_type(&self) -> &'static str {
        llsd::CONTENT_TYPE
    }

    fn encode(&self, payload: &LlsdMap) -> Result<Vec<u8>, PayloadCodecError> {
        llsd::to_xml_bytes(&LlsdValue::Map(payload.clone()))
            .map_err(|error| PayloadCodecError::encode(error.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> Result<LlsdValue, PayloadCodecError> {
        llsd::from_xml_slice(bytes).map_err(|error| PayloadCodecError::decode(error.to_string()))
    }
}

#[cfg(test)]
mod tests {
    //! Codec adapter behaviour on registration payloads.

    use super::*;

    #[test]
    fn encodes_check_name_payload() {
        let payload: LlsdMap = [("username", "benny4821"), ("last_name_id", "7")]
            .into_iter()
            .collect();

        let bytes = LlsdXmlCodec.encode(&payload).expect("payload encodes");
        assert_eq!(
            String::from_utf8(bytes).expect("utf-8"),
            "<llsd><map><key>username</key><string>benny4821</string>\
             <key>last_name_id</key><string>7</string></map></llsd>"
        );
    }

    #[test]
    fn decodes_availability_answer() {
        let value = LlsdXmlCodec
            .decode(b"<?xml version=\"1.0\" ?><llsd><boolean>true</boolean></llsd>")
            .expect("body decodes");
        assert_eq!(value, LlsdValue::Boolean(true));
    }

    #[test]
    fn decode_errors_map_to_decode_variant() {
        let error = LlsdXmlCodec
            .decode(b"Service Unavailable")
            .expect_err("plain text must fail");
        assert!(matches!(error, PayloadCodecError::Decode { .. }));
    }

    #[test]
    fn hostile_nesting_is_a_decode_error() {
        let body = format!(
            "<llsd>{}{}</llsd>",
            "<map><key>k</key>".repeat(100_000),
            "</map>".repeat(100_000)
        );

        let error = LlsdXmlCodec
            .decode(body.as_bytes())
            .expect_err("nesting must be bounded");
        assert!(error.to_string().contains("nested deeper than"));
    }
}
