//! pushkit Client
//!
//! Page-side subscription manager: registers the notification worker,
//! asks for permission, subscribes and unsubscribes through the Push API and
//! reports subscription changes to the application server.
//!
//! # Example
//! ```rust,ignore
//! use pushkit_client::{ManagerConfig, SubscriptionManager};
//!
//! let manager = SubscriptionManager::new(config, container, prompt, transport)?;
//! manager.init().await;
//! manager.request_permission().await?;
//! ```

mod config;
pub mod key;
mod manager;
pub mod sync;
pub mod view;

pub use config::ManagerConfig;
pub use key::url_base64_to_bytes;
pub use manager::SubscriptionManager;
pub use sync::{SaveInformation, ServerSync, StatusType};
pub use view::{DomStatusView, NoopView, StatusView};

use pushkit_net::NetError;
use pushkit_platform::PlatformError;

/// Subscription error
#[derive(Debug, thiserror::Error)]
pub enum PushError {
    #[error("Public key not set")]
    MissingPublicKey,

    #[error("Invalid public key: {0}")]
    InvalidKey(String),

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Failed to {} subscription (HTTP {status})", .status_type.verb())]
    Sync { status_type: StatusType, status: u16 },

    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error(transparent)]
    Net(#[from] NetError),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
