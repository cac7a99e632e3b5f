//! Subscription manager configuration

/// Worker script served by the application
pub const WORKER_SCRIPT: &str = "/static/authentication/service-worker.js";
/// Endpoint receiving subscribe / unsubscribe notices
pub const SAVE_ENDPOINT: &str = "/webpush/save_information";
/// Cookie carrying the CSRF token
pub const CSRF_COOKIE: &str = "csrftoken";

/// Subscription manager configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerConfig {
    /// VAPID public key, base64url encoded
    pub public_key: Option<String>,
    /// Page origin the server paths resolve against
    pub origin: String,
    pub worker_script: String,
    pub save_endpoint: String,
    pub csrf_cookie: String,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            public_key: None,
            origin: "http://localhost:8000".into(),
            worker_script: WORKER_SCRIPT.into(),
            save_endpoint: SAVE_ENDPOINT.into(),
            csrf_cookie: CSRF_COOKIE.into(),
        }
    }
}

impl ManagerConfig {
    pub fn new(public_key: &str) -> Self {
        Self {
            public_key: Some(public_key.to_string()),
            ..Default::default()
        }
    }

    pub fn with_origin(mut self, origin: &str) -> Self {
        self.origin = origin.to_string();
        self
    }

    /// Configured key, treating an empty string as unset
    pub fn public_key(&self) -> Option<&str> {
        self.public_key.as_deref().filter(|key| !key.is_empty())
    }
}
