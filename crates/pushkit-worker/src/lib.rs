//! pushkit Worker
//!
//! The notification worker runs apart from any page. It sees only the
//! events the platform delivers to it:
//! - `push`: show a notification built from the message payload
//! - `notificationclick`: close the notification and open the page it links to
//! - `notificationclose`: logged
//!
//! # Example
//! ```rust,ignore
//! use pushkit_worker::{NotificationWorker, WorkerHost, event_channel};
//!
//! let (events, receiver) = event_channel();
//! let host = WorkerHost::new(NotificationWorker::new(registration, clients), receiver);
//! smol::block_on(host.run());
//! ```

mod config;
mod host;
pub mod payload;
mod worker;

pub use config::WorkerConfig;
pub use host::{WorkerHost, event_channel};
pub use payload::{NotificationPayload, click_url};
pub use worker::{NotificationWorker, WorkerOutcome};

use pushkit_platform::PlatformError;

/// Worker error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkerError {
    #[error("Failed to display notification: {0}")]
    Display(PlatformError),

    #[error("Failed to open {url}: {source}")]
    OpenWindow { url: String, source: PlatformError },
}
