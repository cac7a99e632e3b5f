//! Notification permission
//!
//! `Notification.requestPermission()` exists in two shapes: the current
//! promise-returning form and the legacy callback form. Both are exposed
//! through [`PermissionPrompt`].

use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::PlatformError;

/// Notification permission state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NotificationPermission {
    #[default]
    Default,
    Granted,
    Denied,
}

impl NotificationPermission {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationPermission::Default => "default",
            NotificationPermission::Granted => "granted",
            NotificationPermission::Denied => "denied",
        }
    }

    pub fn is_granted(&self) -> bool {
        matches!(self, NotificationPermission::Granted)
    }
}

impl FromStr for NotificationPermission {
    type Err = PlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(NotificationPermission::Default),
            "granted" => Ok(NotificationPermission::Granted),
            "denied" => Ok(NotificationPermission::Denied),
            other => Err(PlatformError::Permission(format!(
                "unknown permission state: {}",
                other
            ))),
        }
    }
}

impl std::fmt::Display for NotificationPermission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Promise-style permission request
#[allow(async_fn_in_trait)]
pub trait PermissionPrompt {
    async fn request_permission(&self) -> Result<NotificationPermission, PlatformError>;
}

/// Callback-style permission request
pub trait CallbackPermissionApi {
    fn request_permission_with(&self, callback: Box<dyn FnOnce(NotificationPermission) + Send>);
}

/// Adapts a callback-style API into a [`PermissionPrompt`]
#[derive(Debug)]
pub struct CallbackPrompt<A> {
    api: A,
}

impl<A: CallbackPermissionApi> CallbackPrompt<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }
}

impl<A: CallbackPermissionApi> PermissionPrompt for CallbackPrompt<A> {
    async fn request_permission(&self) -> Result<NotificationPermission, PlatformError> {
        let (tx, rx) = smol::channel::bounded(1);
        self.api.request_permission_with(Box::new(move |permission| {
            // First answer wins
            let _ = tx.try_send(permission);
        }));

        rx.recv()
            .await
            .map_err(|_| PlatformError::Permission("permission callback was dropped".into()))
    }
}

/// In-memory prompt that answers every request the same way
#[derive(Debug)]
pub struct MemoryPermissionPrompt {
    answer: NotificationPermission,
    current: Mutex<NotificationPermission>,
    requests: AtomicUsize,
}

impl MemoryPermissionPrompt {
    pub fn new(answer: NotificationPermission) -> Self {
        Self {
            answer,
            current: Mutex::new(NotificationPermission::Default),
            requests: AtomicUsize::new(0),
        }
    }

    pub fn granting() -> Self {
        Self::new(NotificationPermission::Granted)
    }

    pub fn denying() -> Self {
        Self::new(NotificationPermission::Denied)
    }

    /// `Notification.permission`
    pub fn permission(&self) -> NotificationPermission {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    fn answer(&self) -> NotificationPermission {
        self.requests.fetch_add(1, Ordering::SeqCst);
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = self.answer;
        tracing::debug!("Permission prompt answered {}", self.answer);
        self.answer
    }
}

impl PermissionPrompt for MemoryPermissionPrompt {
    async fn request_permission(&self) -> Result<NotificationPermission, PlatformError> {
        Ok(self.answer())
    }
}

impl CallbackPermissionApi for MemoryPermissionPrompt {
    fn request_permission_with(&self, callback: Box<dyn FnOnce(NotificationPermission) + Send>) {
        callback(self.answer());
    }
}
