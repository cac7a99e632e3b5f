//! Notifications API
//!
//! System notifications shown from a service worker.

use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::PlatformError;

/// Notification
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: u64,
    pub title: String,
    pub options: NotificationOptions,
}

impl Notification {
    /// Data attached by whoever showed the notification
    pub fn data(&self) -> &serde_json::Value {
        &self.options.data
    }
}

/// Notification options
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationOptions {
    pub body: Option<String>,
    pub icon: Option<String>,
    pub badge: Option<String>,
    pub tag: Option<String>,
    pub data: serde_json::Value,
    pub require_interaction: bool,
    pub silent: bool,
    pub vibrate: Vec<u32>,
    pub actions: Vec<NotificationAction>,
}

/// Notification action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// `registration.showNotification()` and `notification.close()`
#[allow(async_fn_in_trait)]
pub trait NotificationDisplay {
    async fn show_notification(
        &self,
        title: &str,
        options: NotificationOptions,
    ) -> Result<Notification, PlatformError>;

    fn close(&self, notification: &Notification);
}

impl<T: NotificationDisplay + ?Sized> NotificationDisplay for Arc<T> {
    async fn show_notification(
        &self,
        title: &str,
        options: NotificationOptions,
    ) -> Result<Notification, PlatformError> {
        (**self).show_notification(title, options).await
    }

    fn close(&self, notification: &Notification) {
        (**self).close(notification)
    }
}

/// In-memory notification tray
#[derive(Debug, Default)]
pub struct MemoryNotificationCenter {
    state: Mutex<CenterState>,
}

#[derive(Debug, Default)]
struct CenterState {
    next_id: u64,
    shown: Vec<Notification>,
    open: Vec<u64>,
    blocked: bool,
}

impl MemoryNotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tray that refuses to display anything
    pub fn blocked() -> Self {
        let center = Self::default();
        center.lock().blocked = true;
        center
    }

    /// Every notification displayed so far, oldest first
    pub fn shown(&self) -> Vec<Notification> {
        self.lock().shown.clone()
    }

    /// Notifications still on screen
    pub fn open(&self) -> Vec<Notification> {
        let state = self.lock();
        state
            .shown
            .iter()
            .filter(|n| state.open.contains(&n.id))
            .cloned()
            .collect()
    }

    pub fn is_open(&self, id: u64) -> bool {
        self.lock().open.contains(&id)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CenterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl NotificationDisplay for MemoryNotificationCenter {
    async fn show_notification(
        &self,
        title: &str,
        options: NotificationOptions,
    ) -> Result<Notification, PlatformError> {
        let mut state = self.lock();
        if state.blocked {
            return Err(PlatformError::Notification(
                "notifications are blocked".into(),
            ));
        }

        state.next_id += 1;
        let notification = Notification {
            id: state.next_id,
            title: title.to_string(),
            options,
        };
        state.open.push(notification.id);
        state.shown.push(notification.clone());
        Ok(notification)
    }

    fn close(&self, notification: &Notification) {
        self.lock().open.retain(|id| *id != notification.id);
    }
}
