//! Subscription manager
//!
//! Every flow is a single sequential chain: each step starts only after the
//! previous one resolved, and the first failure ends the flow. Nothing
//! serializes separate flows against each other.

use std::sync::Arc;

use pushkit_net::HttpTransport;
use pushkit_platform::{
    CookieSource, PermissionPrompt, PlatformError, PushManager, PushSubscription,
    PushSubscriptionOptions, ServiceWorkerContainer, ServiceWorkerRegistration,
};

use crate::config::ManagerConfig;
use crate::key::url_base64_to_bytes;
use crate::sync::ServerSync;
use crate::view::{NoopView, StatusView};
use crate::PushError;

/// Page-side push subscription manager
pub struct SubscriptionManager<C, P, T> {
    config: ManagerConfig,
    container: C,
    permissions: P,
    sync: ServerSync<T>,
    view: Box<dyn StatusView>,
}

impl<C, P, T> SubscriptionManager<C, P, T>
where
    C: ServiceWorkerContainer,
    P: PermissionPrompt,
    T: HttpTransport,
{
    /// Create a manager; nothing is registered until [`init`](Self::init)
    pub fn new(
        config: ManagerConfig,
        container: C,
        permissions: P,
        transport: T,
    ) -> Result<Self, PushError> {
        let endpoint = pushkit_net::resolve(&config.origin, &config.save_endpoint)?;
        let sync = ServerSync::new(transport, endpoint, &config.csrf_cookie);

        Ok(Self {
            config,
            container,
            permissions,
            sync,
            view: Box::new(NoopView),
        })
    }

    /// Create a manager and register the worker in one step
    pub async fn start(
        config: ManagerConfig,
        container: C,
        permissions: P,
        transport: T,
    ) -> Result<(Self, Option<C::Registration>), PushError> {
        let manager = Self::new(config, container, permissions, transport)?;
        let registration = manager.init().await;
        Ok((manager, registration))
    }

    pub fn with_view(mut self, view: impl StatusView + 'static) -> Self {
        self.view = Box::new(view);
        self
    }

    pub fn with_cookies(mut self, cookies: Arc<dyn CookieSource>) -> Self {
        self.sync = self.sync.with_cookies(cookies);
        self
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn container(&self) -> &C {
        &self.container
    }

    pub fn permissions(&self) -> &P {
        &self.permissions
    }

    pub fn transport(&self) -> &T {
        self.sync.transport()
    }

    /// Register the notification worker
    pub async fn init(&self) -> Option<C::Registration> {
        self.register_service_worker().await
    }

    /// Register the worker and reflect any existing subscription
    ///
    /// Failures are logged and leave the view untouched.
    pub async fn register_service_worker(&self) -> Option<C::Registration> {
        if !self.container.is_supported() {
            tracing::warn!("Service Workers are not supported on this platform");
            return None;
        }

        match self.container.register(&self.config.worker_script).await {
            Ok(registration) => {
                tracing::info!("Service Worker registered (scope {})", registration.scope());
                self.check_subscription(&registration).await;
                Some(registration)
            }
            Err(err) => {
                tracing::error!("Service Worker registration failed: {}", err);
                None
            }
        }
    }

    /// Reflect whether `registration` already holds a subscription
    pub async fn check_subscription(&self, registration: &C::Registration) -> bool {
        match registration.push_manager().get_subscription().await {
            Some(subscription) => {
                tracing::info!("Already subscribed: {}", subscription.endpoint);
                self.update_ui(true);
                true
            }
            None => {
                tracing::info!("Not subscribed yet");
                self.update_ui(false);
                false
            }
        }
    }

    /// Subscribe and report the subscription to the server
    pub async fn subscribe(&self) -> Result<PushSubscription, PushError> {
        let Some(public_key) = self.config.public_key() else {
            tracing::error!("Public key not set");
            return Err(PushError::MissingPublicKey);
        };

        self.try_subscribe(public_key).await.inspect_err(|err| {
            tracing::error!("Subscription failed: {}", err);
        })
    }

    async fn try_subscribe(&self, public_key: &str) -> Result<PushSubscription, PushError> {
        self.ensure_supported()?;
        let registration = self.container.ready().await;
        let application_server_key = url_base64_to_bytes(public_key)?;

        let subscription = registration
            .push_manager()
            .subscribe(PushSubscriptionOptions {
                user_visible_only: true,
                application_server_key: Some(application_server_key),
            })
            .await?;
        tracing::info!("Subscribed: {}", subscription.endpoint);

        self.sync.send_subscription_to_server(&subscription).await?;
        self.update_ui(true);
        Ok(subscription)
    }

    /// Cancel the active subscription, if any, and tell the server
    ///
    /// Returns whether a subscription was cancelled.
    pub async fn unsubscribe(&self) -> Result<bool, PushError> {
        self.try_unsubscribe().await.inspect_err(|err| {
            tracing::error!("Unsubscribe failed: {}", err);
        })
    }

    async fn try_unsubscribe(&self) -> Result<bool, PushError> {
        self.ensure_supported()?;
        let registration = self.container.ready().await;
        let push_manager = registration.push_manager();

        let cancelled = match push_manager.get_subscription().await {
            Some(subscription) => {
                push_manager.unsubscribe(&subscription).await?;
                self.sync.delete_subscription_from_server(&subscription).await?;
                true
            }
            None => false,
        };

        self.update_ui(false);
        tracing::info!("Unsubscribed successfully");
        Ok(cancelled)
    }

    // `ready` never resolves without service workers
    fn ensure_supported(&self) -> Result<(), PushError> {
        if self.container.is_supported() {
            Ok(())
        } else {
            Err(PlatformError::Unsupported.into())
        }
    }

    /// Ask for notification permission, subscribing once granted
    pub async fn request_permission(&self) -> Result<PushSubscription, PushError> {
        let permission = self.permissions.request_permission().await?;
        if permission.is_granted() {
            tracing::info!("Notification permission granted");
            self.subscribe().await
        } else {
            tracing::info!("Notification permission {}", permission);
            Err(PushError::PermissionDenied)
        }
    }

    pub fn update_ui(&self, is_subscribed: bool) {
        self.view.update(is_subscribed);
    }
}
