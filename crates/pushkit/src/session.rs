//! Session
//!
//! One page plus its notification worker on an in-memory platform. The page
//! side runs on the caller's task; the worker gets its own thread and
//! executor and is reached only through its event channel.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use pushkit_client::view::{DISABLE_BUTTON, ENABLE_BUTTON, STATUS};
use pushkit_client::{DomStatusView, PushError, SubscriptionManager};
use pushkit_net::HttpTransport;
use pushkit_platform::{
    CookieJar, Document, Element, MemoryClients, MemoryNotificationCenter,
    MemoryPermissionPrompt, MemoryPushManager, MemoryServiceWorkerContainer, Notification,
    NotificationDisplay, NotificationEvent, PushEvent, PushManager, PushSubscription, WorkerEvent,
};
use pushkit_worker::{NotificationWorker, WorkerHost, WorkerOutcome, event_channel};
use smol::channel::{Receiver, Sender};

use crate::config::Config;

/// Manager type a session drives
pub type SessionManager<T> =
    SubscriptionManager<MemoryServiceWorkerContainer, MemoryPermissionPrompt, T>;

/// Session error
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Push(#[from] PushError),

    #[error("Failed to start notification worker: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("Notification worker stopped")]
    WorkerStopped,
}

/// Page, manager and notification worker wired together
pub struct Session<T> {
    manager: SessionManager<T>,
    push: Arc<MemoryPushManager>,
    document: Arc<Document>,
    cookies: Arc<CookieJar>,
    center: Arc<MemoryNotificationCenter>,
    clients: Arc<MemoryClients>,
    events: Sender<WorkerEvent>,
    outcomes: Receiver<WorkerOutcome>,
    // Held from send to reply so each caller gets its own outcome
    exchange: smol::lock::Mutex<()>,
    worker: Option<JoinHandle<usize>>,
}

impl<T: HttpTransport> Session<T> {
    /// Build the platform, start the worker and construct the manager
    ///
    /// Nothing is registered until [`init`](Self::init).
    pub fn new(config: &Config, transport: T) -> Result<Self, SessionError> {
        let push = Arc::new(MemoryPushManager::new());
        let document = Arc::new(Document::with_elements([
            Element::new(ENABLE_BUTTON),
            Element::new(DISABLE_BUTTON),
            Element::new(STATUS),
        ]));
        let cookies = Arc::new(CookieJar::new());
        if let Some(token) = &config.csrf_token {
            cookies.set(&config.manager_config().csrf_cookie, token);
        }

        let manager = SubscriptionManager::new(
            config.manager_config(),
            MemoryServiceWorkerContainer::new(push.clone()),
            MemoryPermissionPrompt::new(config.permission),
            transport,
        )?
        .with_view(DomStatusView::new(document.clone()))
        .with_cookies(cookies.clone());

        let center = Arc::new(MemoryNotificationCenter::new());
        let clients = Arc::new(MemoryClients::new());
        let (events, events_rx) = event_channel();
        let (outcomes_tx, outcomes) = smol::channel::unbounded();

        let worker = NotificationWorker::new(center.clone(), clients.clone())
            .with_config(config.worker.clone());
        let host = WorkerHost::new(worker, events_rx).with_outcomes(outcomes_tx);
        let handle = thread::Builder::new()
            .name("pushkit-worker".into())
            .spawn(move || smol::block_on(host.run()))?;

        Ok(Self {
            manager,
            push,
            document,
            cookies,
            center,
            clients,
            events,
            outcomes,
            exchange: smol::lock::Mutex::new(()),
            worker: Some(handle),
        })
    }

    /// Register the worker from the page
    pub async fn init(&self) -> bool {
        self.manager.init().await.is_some()
    }

    pub fn manager(&self) -> &SessionManager<T> {
        &self.manager
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn cookies(&self) -> &CookieJar {
        &self.cookies
    }

    pub fn notifications(&self) -> &MemoryNotificationCenter {
        &self.center
    }

    pub fn clients(&self) -> &MemoryClients {
        &self.clients
    }

    /// Push service view of the current subscription
    pub async fn subscription(&self) -> Option<PushSubscription> {
        self.push.get_subscription().await
    }

    /// Deliver a push message the way the push service would
    ///
    /// Only delivered while subscribed; returns `None` otherwise.
    pub async fn deliver_push(
        &self,
        payload: Option<Vec<u8>>,
    ) -> Result<Option<WorkerOutcome>, SessionError> {
        let Some(subscription) = self.subscription().await else {
            tracing::warn!("No active subscription, push dropped");
            return Ok(None);
        };
        tracing::debug!("Delivering push to {}", subscription.endpoint);

        self.dispatch(WorkerEvent::Push(PushEvent::new(payload)))
            .await
            .map(Some)
    }

    /// User clicked `notification`
    pub async fn click(&self, notification: &Notification) -> Result<WorkerOutcome, SessionError> {
        self.dispatch(WorkerEvent::NotificationClick(NotificationEvent::new(
            notification.clone(),
        )))
        .await
    }

    /// User dismissed `notification`
    pub async fn dismiss(&self, notification: &Notification) -> Result<WorkerOutcome, SessionError> {
        self.center.close(notification);
        self.dispatch(WorkerEvent::NotificationClose(NotificationEvent::new(
            notification.clone(),
        )))
        .await
    }

    async fn dispatch(&self, event: WorkerEvent) -> Result<WorkerOutcome, SessionError> {
        let _exchange = self.exchange.lock().await;
        self.events
            .send(event)
            .await
            .map_err(|_| SessionError::WorkerStopped)?;
        self.outcomes
            .recv()
            .await
            .map_err(|_| SessionError::WorkerStopped)
    }

    /// Stop the worker and wait for it to drain
    ///
    /// Returns the number of events the worker handled.
    pub fn shutdown(mut self) -> usize {
        self.events.close();
        self.join_worker()
    }

    fn join_worker(&mut self) -> usize {
        match self.worker.take().map(JoinHandle::join) {
            Some(Ok(handled)) => handled,
            Some(Err(_)) => {
                tracing::error!("Notification worker panicked");
                0
            }
            None => 0,
        }
    }
}

impl<T> Drop for Session<T> {
    fn drop(&mut self) {
        self.events.close();
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }
}
