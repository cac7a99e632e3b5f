//! Push API
//!
//! Push subscriptions and the messages the push service delivers.

use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::PlatformError;

/// Push Subscription
///
/// Serializes to the same record `PushSubscription.toJSON()` produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushSubscription {
    pub endpoint: String,
    pub expiration_time: Option<u64>,
    pub keys: PushSubscriptionKeys,
}

/// Push Subscription Keys
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushSubscriptionKeys {
    pub p256dh: String,
    pub auth: String,
}

/// Push Subscription Options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushSubscriptionOptions {
    pub user_visible_only: bool,
    pub application_server_key: Option<Vec<u8>>,
}

/// Push Event
#[derive(Debug, Clone, Default)]
pub struct PushEvent {
    pub data: Option<PushMessageData>,
}

impl PushEvent {
    pub fn new(data: Option<Vec<u8>>) -> Self {
        Self {
            data: data.map(PushMessageData::new),
        }
    }

    /// Event carrying a UTF-8 payload
    pub fn with_text(text: &str) -> Self {
        Self::new(Some(text.as_bytes().to_vec()))
    }
}

/// Push Message Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushMessageData {
    data: Vec<u8>,
}

impl PushMessageData {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.data).to_string()
    }

    /// Parse the payload as JSON
    pub fn json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_slice(&self.data)
    }

    pub fn array_buffer(&self) -> &[u8] {
        &self.data
    }
}

/// Push Manager (`registration.pushManager`)
#[allow(async_fn_in_trait)]
pub trait PushManager {
    /// Currently active subscription, if any
    async fn get_subscription(&self) -> Option<PushSubscription>;

    /// Subscribe to push messages
    async fn subscribe(
        &self,
        options: PushSubscriptionOptions,
    ) -> Result<PushSubscription, PlatformError>;

    /// Cancel a subscription at the push service
    async fn unsubscribe(&self, subscription: &PushSubscription) -> Result<bool, PlatformError>;
}

impl<T: PushManager + ?Sized> PushManager for Arc<T> {
    async fn get_subscription(&self) -> Option<PushSubscription> {
        (**self).get_subscription().await
    }

    async fn subscribe(
        &self,
        options: PushSubscriptionOptions,
    ) -> Result<PushSubscription, PlatformError> {
        (**self).subscribe(options).await
    }

    async fn unsubscribe(&self, subscription: &PushSubscription) -> Result<bool, PlatformError> {
        (**self).unsubscribe(subscription).await
    }
}

/// In-memory push manager
///
/// Hands out one subscription at a time, like a browser profile does for a
/// single service worker registration.
#[derive(Debug, Default)]
pub struct MemoryPushManager {
    state: Mutex<PushState>,
}

#[derive(Debug, Default)]
struct PushState {
    subscription: Option<PushSubscription>,
    next_id: u64,
    subscribe_calls: usize,
    unsubscribe_calls: usize,
    last_options: Option<PushSubscriptionOptions>,
    reject_subscribe: Option<String>,
}

impl MemoryPushManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push manager whose `subscribe` always fails
    pub fn rejecting(reason: &str) -> Self {
        let manager = Self::default();
        manager.lock().reject_subscribe = Some(reason.to_string());
        manager
    }

    /// Push manager that already holds a subscription
    pub fn with_subscription(subscription: PushSubscription) -> Self {
        let manager = Self::default();
        manager.lock().subscription = Some(subscription);
        manager
    }

    /// Active subscription, without going through the async API
    pub fn current(&self) -> Option<PushSubscription> {
        self.lock().subscription.clone()
    }

    /// Number of `subscribe` invocations, including rejected ones
    pub fn subscribe_calls(&self) -> usize {
        self.lock().subscribe_calls
    }

    pub fn unsubscribe_calls(&self) -> usize {
        self.lock().unsubscribe_calls
    }

    /// Options passed to the most recent `subscribe`
    pub fn last_options(&self) -> Option<PushSubscriptionOptions> {
        self.lock().last_options.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PushState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PushManager for MemoryPushManager {
    async fn get_subscription(&self) -> Option<PushSubscription> {
        self.current()
    }

    async fn subscribe(
        &self,
        options: PushSubscriptionOptions,
    ) -> Result<PushSubscription, PlatformError> {
        let mut state = self.lock();
        state.subscribe_calls += 1;
        state.last_options = Some(options.clone());

        if let Some(reason) = &state.reject_subscribe {
            return Err(PlatformError::Subscribe(reason.clone()));
        }
        if !options.user_visible_only {
            return Err(PlatformError::Subscribe(
                "push subscriptions must be user visible".into(),
            ));
        }
        match &options.application_server_key {
            Some(key) if !key.is_empty() => {}
            _ => {
                return Err(PlatformError::Subscribe(
                    "missing application server key".into(),
                ));
            }
        }

        // Re-subscribing returns the live subscription
        if let Some(existing) = &state.subscription {
            return Ok(existing.clone());
        }

        let id = state.next_id;
        state.next_id += 1;
        let subscription = PushSubscription {
            endpoint: format!("https://push.example.com/{}", id),
            expiration_time: None,
            keys: PushSubscriptionKeys {
                p256dh: format!("mock_p256dh_key_{}", id),
                auth: format!("mock_auth_key_{}", id),
            },
        };
        tracing::debug!("Push service issued {}", subscription.endpoint);
        state.subscription = Some(subscription.clone());
        Ok(subscription)
    }

    async fn unsubscribe(&self, subscription: &PushSubscription) -> Result<bool, PlatformError> {
        let mut state = self.lock();
        state.unsubscribe_calls += 1;
        match &state.subscription {
            Some(current) if current.endpoint == subscription.endpoint => {
                state.subscription = None;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
