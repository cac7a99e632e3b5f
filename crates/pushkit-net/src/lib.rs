//! pushkit Networking
//!
//! HTTP requests from the page to the application server.

mod recording;
mod request;
mod transport;

pub use recording::RecordingTransport;
pub use request::{Method, Request};
pub use transport::{HttpTransport, ReqwestTransport};
pub use url::Url;

/// Resolve `path` against the page origin
pub fn resolve(origin: &str, path: &str) -> Result<Url, NetError> {
    Url::parse(origin)
        .and_then(|base| base.join(path))
        .map_err(|e| NetError::InvalidUrl(format!("{}{}: {}", origin, path, e)))
}

/// HTTP Response
#[derive(Debug, Clone, Default)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// `response.ok`
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// `response.json()`
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, NetError> {
        serde_json::from_slice(&self.body).map_err(|e| NetError::Decode(e.to_string()))
    }
}

/// Network error
#[derive(Debug, thiserror::Error)]
pub enum NetError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid response body: {0}")]
    Decode(String),
}
