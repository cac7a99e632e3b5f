//! pushkit
//!
//! Web push for a server-rendered application: a page-side subscription
//! manager that registers a notification worker and keeps the application
//! server informed, and the worker that turns push messages into
//! notifications.
//!
//! # Example
//! ```rust,ignore
//! use pushkit::{Config, Session};
//! use pushkit::net::ReqwestTransport;
//!
//! let session = Session::new(&Config::from_env(), ReqwestTransport::new()?)?;
//! session.init().await;
//! session.manager().request_permission().await?;
//! ```

mod config;
mod session;

pub use config::{CSRF_TOKEN_VAR, Config, ORIGIN_VAR, VAPID_PUBLIC_KEY_VAR};
pub use session::{Session, SessionError, SessionManager};

pub use pushkit_client as client;
pub use pushkit_net as net;
pub use pushkit_platform as platform;
pub use pushkit_worker as worker;

/// pushkit version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
