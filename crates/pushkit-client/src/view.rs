//! Subscription status view
//!
//! Pages opt into status updates by providing a [`StatusView`]; without one
//! the manager updates nothing.

use std::sync::Arc;

use pushkit_platform::Document;

pub const ENABLE_BUTTON: &str = "enable-notifications-btn";
pub const DISABLE_BUTTON: &str = "disable-notifications-btn";
pub const STATUS: &str = "notification-status";

/// Sink for subscription state changes
pub trait StatusView {
    fn update(&self, subscribed: bool);
}

impl<T: StatusView + ?Sized> StatusView for Arc<T> {
    fn update(&self, subscribed: bool) {
        (**self).update(subscribed)
    }
}

/// View that ignores updates
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopView;

impl StatusView for NoopView {
    fn update(&self, _subscribed: bool) {}
}

/// Enable / disable buttons plus a status line
#[derive(Debug, Clone)]
pub struct DomStatusView {
    document: Arc<Document>,
}

impl DomStatusView {
    pub fn new(document: Arc<Document>) -> Self {
        Self { document }
    }

    /// Apply the state; returns false when any element is missing
    pub fn apply(&self, subscribed: bool) -> bool {
        let (enable_display, disable_display, text, class) = if subscribed {
            (
                "none",
                "inline-block",
                "✓ Notifications Enabled",
                "notification-status enabled",
            )
        } else {
            (
                "inline-block",
                "none",
                "✗ Notifications Disabled",
                "notification-status disabled",
            )
        };

        self.document.update(|elements| {
            if ![ENABLE_BUTTON, DISABLE_BUTTON, STATUS]
                .iter()
                .all(|id| elements.contains(id))
            {
                return false;
            }

            if let Some(enable) = elements.get_mut(ENABLE_BUTTON) {
                enable.set_display(enable_display);
            }
            if let Some(disable) = elements.get_mut(DISABLE_BUTTON) {
                disable.set_display(disable_display);
            }
            if let Some(status) = elements.get_mut(STATUS) {
                status.text_content = text.to_string();
                status.class_name = class.to_string();
            }
            true
        })
    }
}

impl StatusView for DomStatusView {
    fn update(&self, subscribed: bool) {
        if !self.apply(subscribed) {
            tracing::debug!("Status elements not on page, skipping update");
        }
    }
}
