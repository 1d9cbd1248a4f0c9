//! Reqwest-backed registration transport.
//!
//! This adapter owns transport details only: URL validation, content
//! negotiation headers, timeouts, and mapping HTTP failures onto the port
//! error. Payload decoding stays with the codec.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use tracing::debug;

use crate::domain::ports::{OutboundBody, RegistrationTransport, RegistrationTransportError};

const DEFAULT_USER_AGENT: &str = concat!("registration-client/", env!("CARGO_PKG_VERSION"));

/// Outbound identity sent with every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpTransportIdentity {
    /// HTTP user agent.
    pub user_agent: String,
    /// MIME type advertised in `Accept`.
    pub accept: &'static str,
}

impl Default for HttpTransportIdentity {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            accept: llsd::CONTENT_TYPE,
        }
    }
}

/// Registration transport performing real HTTP exchanges.
pub struct ReqwestRegistrationTransport {
    client: Client,
    user_agent: String,
    accept: &'static str,
}

impl ReqwestRegistrationTransport {
    /// Build a transport with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        Self::with_identity(timeout, HttpTransportIdentity::default())
    }

    /// Build a transport with an explicit outbound identity.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn with_identity(
        timeout: Duration,
        identity: HttpTransportIdentity,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            user_agent: identity.user_agent,
            accept: identity.accept,
        })
    }

    fn decorate(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header(USER_AGENT, self.user_agent.as_str())
            .header(ACCEPT, self.accept)
    }

    async fn exchange(
        &self,
        request: RequestBuilder,
    ) -> Result<Vec<u8>, RegistrationTransportError> {
        let response = self
            .decorate(request)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        debug!(
            status = status.as_u16(),
            bytes = body.len(),
            "registration response received"
        );
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        Ok(body.to_vec())
    }
}

#[async_trait]
impl RegistrationTransport for ReqwestRegistrationTransport {
    async fn get(&self, url: &str) -> Result<Vec<u8>, RegistrationTransportError> {
        let target = parse_url(url)?;
        debug!(url = %target, "GET capability");
        self.exchange(self.client.get(target)).await
    }

    async fn post(
        &self,
        url: &str,
        body: &OutboundBody,
    ) -> Result<Vec<u8>, RegistrationTransportError> {
        let target = parse_url(url)?;
        debug!(url = %target, content_type = body.content_type(), "POST capability");
        let request = self
            .client
            .post(target)
            .header(CONTENT_TYPE, body.content_type())
            .body(body.as_bytes().to_vec());
        self.exchange(request).await
    }
}

fn parse_url(raw: &str) -> Result<Url, RegistrationTransportError> {
    Url::parse(raw).map_err(|error| RegistrationTransportError::invalid_url(raw, error.to_string()))
}

fn map_transport_error(error: reqwest::Error) -> RegistrationTransportError {
    if error.is_timeout() {
        RegistrationTransportError::timeout(error.to_string())
    } else {
        RegistrationTransportError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> RegistrationTransportError {
    let preview = body_preview(body);
    let message = if preview.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("no response body")
            .to_owned()
    } else {
        preview
    };
    RegistrationTransportError::status(status.as_u16(), message)
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
