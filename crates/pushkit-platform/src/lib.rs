//! pushkit Platform
//!
//! The browser capabilities the push helper is written against:
//! - Push API (`PushManager`, subscriptions, push events)
//! - Service Worker API (container, registration, lifecycle, window clients)
//! - Notifications API (display, permission prompt)
//! - `document.cookie` and a minimal element store for status updates
//!
//! Each capability is a trait so the page and worker logic can run against
//! a real embedding or the in-memory implementations shipped here.

pub mod cookies;
pub mod dom;
pub mod notifications;
pub mod permissions;
pub mod push;
pub mod service_worker;

pub use cookies::{CookieJar, CookieSource, get_cookie};
pub use dom::{Document, Element, Elements};
pub use notifications::{
    MemoryNotificationCenter, Notification, NotificationAction, NotificationDisplay,
    NotificationOptions,
};
pub use permissions::{
    CallbackPermissionApi, CallbackPrompt, MemoryPermissionPrompt, NotificationPermission,
    PermissionPrompt,
};
pub use push::{
    MemoryPushManager, PushEvent, PushManager, PushMessageData, PushSubscription,
    PushSubscriptionKeys, PushSubscriptionOptions,
};
pub use service_worker::{
    MemoryClients, MemoryRegistration, MemoryServiceWorkerContainer, NotificationEvent,
    ServiceWorker, ServiceWorkerContainer, ServiceWorkerRegistration, ServiceWorkerState,
    WindowClients, WorkerEvent,
};

/// Platform error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlatformError {
    #[error("Service workers are not supported")]
    Unsupported,

    #[error("Service worker registration failed: {0}")]
    Registration(String),

    #[error("Push subscription failed: {0}")]
    Subscribe(String),

    #[error("Push unsubscribe failed: {0}")]
    Unsubscribe(String),

    #[error("Permission request failed: {0}")]
    Permission(String),

    #[error("Notification error: {0}")]
    Notification(String),

    #[error("Unable to open window: {0}")]
    OpenWindow(String),
}
