//! pushkit Configuration

use std::env;

use pushkit_client::ManagerConfig;
use pushkit_platform::NotificationPermission;
use pushkit_worker::WorkerConfig;

pub const ORIGIN_VAR: &str = "PUSHKIT_ORIGIN";
pub const VAPID_PUBLIC_KEY_VAR: &str = "PUSHKIT_VAPID_PUBLIC_KEY";
pub const CSRF_TOKEN_VAR: &str = "PUSHKIT_CSRF_TOKEN";

/// Session configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Origin of the application server
    pub origin: String,

    /// VAPID public key handed to the page, base64url encoded
    pub vapid_public_key: Option<String>,

    /// Value of the CSRF cookie the page holds
    pub csrf_token: Option<String>,

    /// Answer the permission prompt gives
    pub permission: NotificationPermission,

    /// Notification defaults for the worker
    pub worker: WorkerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            origin: ManagerConfig::default().origin,
            vapid_public_key: None,
            csrf_token: None,
            permission: NotificationPermission::Granted,
            worker: WorkerConfig::default(),
        }
    }
}

impl Config {
    /// Defaults overridden by `PUSHKIT_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(origin) = lookup(ORIGIN_VAR).filter(|v| !v.is_empty()) {
            config.origin = origin;
        }
        config.vapid_public_key = lookup(VAPID_PUBLIC_KEY_VAR);
        config.csrf_token = lookup(CSRF_TOKEN_VAR);
        config
    }

    /// Settings for the page-side manager
    pub fn manager_config(&self) -> ManagerConfig {
        ManagerConfig {
            public_key: self.vapid_public_key.clone(),
            ..ManagerConfig::default().with_origin(&self.origin)
        }
    }
}
