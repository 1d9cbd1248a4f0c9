//! Driven port for the wire encoding of request and response payloads.

use llsd::{LlsdMap, LlsdValue};

use super::define_port_error;

define_port_error! {
    /// Errors raised while encoding or decoding payloads.
    pub enum PayloadCodecError {
        /// A request payload could not be encoded.
        Encode { message: String } => "payload encoding failed: {message}",
        /// A response body could not be decoded.
        Decode { message: String } => "payload decoding failed: {message}",
    }
}

/// Port converting between structured values and wire bytes.
#[cfg_attr(test, mockall::automock)]
pub trait PayloadCodec: Send + Sync {
    /// MIME type of encoded payloads.
    fn content_type(&self) -> &'static str;

    /// Encode a mapping into wire bytes.
    fn encode(&self, payload: &LlsdMap) -> Result<Vec<u8>, PayloadCodecError>;

    /// Decode wire bytes into a structured value.
    fn decode(&self, bytes: &[u8]) -> Result<LlsdValue, PayloadCodecError>;
}
