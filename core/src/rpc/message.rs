// core/src/rpc/message.rs
use thiserror::Error;

/// What came back from a scheduler endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub text: String,
}

impl Response {
    pub fn new(status: u16, text: impl Into<String>) -> Self {
        Response { status, text: text.into() }
    }

    /// The body as JSON, if it is JSON.
    pub fn json(&self) -> Option<serde_json::Value> {
        serde_json::from_str(&self.text).ok()
    }
}

/// Ways a request can fail without producing a [`Response`].
#[derive(Debug, Error)]
pub enum TransportError {
    /// Sent, but no reply within the read timeout.
    #[error("read timed out: {0}")]
    ReadTimeout(String),

    /// Never reached the endpoint.
    #[error("connection failed: {0}")]
    Connect(String),

    /// Sent, but the reply broke off before it could be read.
    #[error("reply interrupted: {0}")]
    Interrupted(String),
}
