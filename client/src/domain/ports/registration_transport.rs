//! Driven port for the request/response exchanges of a registration run.
//!
//! The workflow hands the transport fully built bodies and receives raw
//! response bytes. Decoding stays with the payload codec.

use std::fmt;

use async_trait::async_trait;
use zeroize::Zeroizing;

use super::define_port_error;

/// Request body for a POST exchange.
#[derive(Clone, PartialEq, Eq)]
pub enum OutboundBody {
    /// URL-encoded form fields. Used for capability discovery, so the text may
    /// carry a password and is wiped on drop.
    Form(Zeroizing<String>),
    /// Codec-encoded payload with its content type.
    Payload {
        /// MIME type sent as `Content-Type`.
        content_type: &'static str,
        /// Encoded body bytes.
        bytes: Vec<u8>,
    },
}

impl OutboundBody {
    /// Encode `fields` as an `application/x-www-form-urlencoded` body.
    ///
    /// # Examples
    /// ```
    /// use registration_client::domain::ports::OutboundBody;
    ///
    /// let body = OutboundBody::form([("first_name", "Ada"), ("last_name", "Linden Lab")]);
    /// assert_eq!(body.as_bytes(), b"first_name=Ada&last_name=Linden+Lab");
    /// ```
    pub fn form<'a>(fields: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (name, value) in fields {
            serializer.append_pair(name, value);
        }
        Self::Form(Zeroizing::new(serializer.finish()))
    }

    /// Borrow the body bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Form(text) => text.as_bytes(),
            Self::Payload { bytes, .. } => bytes,
        }
    }

    /// Content type sent with the body.
    #[must_use]
    pub const fn content_type(&self) -> &'static str {
        match self {
            Self::Form(_) => "application/x-www-form-urlencoded",
            Self::Payload { content_type, .. } => *content_type,
        }
    }
}

impl fmt::Debug for OutboundBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Form(text) => f
                .debug_struct("Form")
                .field("len", &text.len())
                .finish_non_exhaustive(),
            Self::Payload {
                content_type,
                bytes,
            } => f
                .debug_struct("Payload")
                .field("content_type", content_type)
                .field("len", &bytes.len())
                .finish(),
        }
    }
}

define_port_error! {
    /// Errors surfaced by the registration transport.
    pub enum RegistrationTransportError {
        /// The target URL could not be parsed.
        InvalidUrl { url: String, message: String } =>
            "invalid capability url '{url}': {message}",
        /// The request failed before a response arrived.
        Transport { message: String } =>
            "registration transport failed: {message}",
        /// The request exceeded the configured timeout.
        Timeout { message: String } =>
            "registration request timed out: {message}",
        /// The service answered with a non-success status.
        Status { status: u16, message: String } =>
            "registration service returned status {status}: {message}",
    }
}

/// Port performing blocking-style request/response exchanges.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistrationTransport: Send + Sync {
    /// Fetch `url` without a body and return the response bytes.
    async fn get(&self, url: &str) -> Result<Vec<u8>, RegistrationTransportError>;

    /// Submit `body` to `url` and return the response bytes.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// use registration_client::domain::ports::{OutboundBody, RegistrationTransport};
    ///
    /// let body = OutboundBody::form([("first_name", "Ada")]);
    /// let bytes = transport.post("https://cap.example/discover", &body).await?;
    /// ```
    async fn post(
        &self,
        url: &str,
        body: &OutboundBody,
    ) -> Result<Vec<u8>, RegistrationTransportError>;
}
