//! Notification worker
//!
//! Handles one platform event at a time. Each handler finishes its extended
//! work (displaying, opening a window) before returning, and nothing is kept
//! between events.

use pushkit_platform::{
    Notification, NotificationDisplay, NotificationEvent, PushEvent, WindowClients, WorkerEvent,
};

use crate::config::WorkerConfig;
use crate::payload::{NotificationPayload, click_url};
use crate::WorkerError;

/// What handling an event produced
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerOutcome {
    /// A push was shown as a notification
    Displayed(Notification),
    /// A click opened or focused a window at this url
    OpenedWindow(String),
    /// The user dismissed the notification with this id
    Closed(u64),
    Failed {
        event: &'static str,
        error: WorkerError,
    },
}

/// Notification worker
pub struct NotificationWorker<N, W> {
    config: WorkerConfig,
    registration: N,
    clients: W,
}

impl<N: NotificationDisplay, W: WindowClients> NotificationWorker<N, W> {
    pub fn new(registration: N, clients: W) -> Self {
        Self {
            config: WorkerConfig::default(),
            registration,
            clients,
        }
    }

    pub fn with_config(mut self, config: WorkerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Dispatch an event to its handler
    pub async fn handle_event(&self, event: WorkerEvent) -> WorkerOutcome {
        let name = event.name();
        let result = match event {
            WorkerEvent::Push(event) => self.on_push(event).await.map(WorkerOutcome::Displayed),
            WorkerEvent::NotificationClick(event) => self
                .on_notification_click(event)
                .await
                .map(WorkerOutcome::OpenedWindow),
            WorkerEvent::NotificationClose(event) => {
                self.on_notification_close(&event);
                Ok(WorkerOutcome::Closed(event.notification.id))
            }
        };

        result.unwrap_or_else(|error| {
            tracing::error!("Handling {} failed: {}", name, error);
            WorkerOutcome::Failed { event: name, error }
        })
    }

    /// Show a notification for a push message
    pub async fn on_push(&self, event: PushEvent) -> Result<Notification, WorkerError> {
        tracing::info!(
            "Push received ({} bytes)",
            event.data.as_ref().map_or(0, |data| data.array_buffer().len())
        );

        let payload = NotificationPayload::parse(event.data.as_ref(), &self.config);
        let options = payload.options(&self.config);
        let notification = self
            .registration
            .show_notification(&payload.title, options)
            .await
            .map_err(WorkerError::Display)?;

        tracing::debug!("Displayed notification {}: {}", notification.id, notification.title);
        Ok(notification)
    }

    /// Close the clicked notification and open the page it points at
    ///
    /// Returns the url that was opened.
    pub async fn on_notification_click(
        &self,
        event: NotificationEvent,
    ) -> Result<String, WorkerError> {
        tracing::info!(
            "Notification clicked: {} (action {})",
            event.notification.id,
            event.action.as_deref().unwrap_or("none")
        );

        self.registration.close(&event.notification);

        let url = click_url(event.notification.data(), &self.config).to_string();
        match self.clients.open_window(&url).await {
            Ok(()) => Ok(url),
            Err(source) => Err(WorkerError::OpenWindow { url, source }),
        }
    }

    pub fn on_notification_close(&self, event: &NotificationEvent) {
        tracing::info!("Notification closed: {}", event.notification.id);
    }
}
