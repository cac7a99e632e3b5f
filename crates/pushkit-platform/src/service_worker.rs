//! Service Worker API
//!
//! Registration and lifecycle on the page side, window clients and the
//! events the platform dispatches into the worker on the other side.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use smol::lock::OnceCell;

use crate::PlatformError;
use crate::notifications::Notification;
use crate::push::{MemoryPushManager, PushEvent, PushManager};

/// Service Worker state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceWorkerState {
    Parsed,
    Installing,
    Installed,
    Activating,
    Activated,
    Redundant,
}

impl std::fmt::Display for ServiceWorkerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ServiceWorkerState::Parsed => "parsed",
            ServiceWorkerState::Installing => "installing",
            ServiceWorkerState::Installed => "installed",
            ServiceWorkerState::Activating => "activating",
            ServiceWorkerState::Activated => "activated",
            ServiceWorkerState::Redundant => "redundant",
        };
        f.write_str(name)
    }
}

/// Service Worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceWorker {
    pub id: u64,
    pub script_url: String,
    pub state: ServiceWorkerState,
}

/// Service Worker registration
pub trait ServiceWorkerRegistration {
    type Push: PushManager;

    fn scope(&self) -> &str;

    fn push_manager(&self) -> &Self::Push;
}

/// Service Worker container (`navigator.serviceWorker`)
#[allow(async_fn_in_trait)]
pub trait ServiceWorkerContainer {
    type Registration: ServiceWorkerRegistration;

    /// Whether the platform exposes service workers at all
    fn is_supported(&self) -> bool {
        true
    }

    /// Register the worker script
    async fn register(&self, script_url: &str) -> Result<Self::Registration, PlatformError>;

    /// Resolves once a registration has an active worker
    async fn ready(&self) -> Self::Registration;
}

/// Window clients (`clients` inside the worker)
#[allow(async_fn_in_trait)]
pub trait WindowClients {
    /// Open a window at `url`, or focus one already showing it
    async fn open_window(&self, url: &str) -> Result<(), PlatformError>;
}

impl<T: WindowClients + ?Sized> WindowClients for Arc<T> {
    async fn open_window(&self, url: &str) -> Result<(), PlatformError> {
        (**self).open_window(url).await
    }
}

/// Events the platform dispatches into a service worker
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    Push(PushEvent),
    NotificationClick(NotificationEvent),
    NotificationClose(NotificationEvent),
}

impl WorkerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            WorkerEvent::Push(_) => "push",
            WorkerEvent::NotificationClick(_) => "notificationclick",
            WorkerEvent::NotificationClose(_) => "notificationclose",
        }
    }
}

/// Notification click / close event
#[derive(Debug, Clone)]
pub struct NotificationEvent {
    pub notification: Notification,
    pub action: Option<String>,
}

impl NotificationEvent {
    pub fn new(notification: Notification) -> Self {
        Self {
            notification,
            action: None,
        }
    }
}

/// In-memory registration
#[derive(Debug, Clone)]
pub struct MemoryRegistration {
    pub scope: String,
    pub installing: Option<ServiceWorker>,
    pub waiting: Option<ServiceWorker>,
    pub active: Option<ServiceWorker>,
    push_manager: Arc<MemoryPushManager>,
}

impl MemoryRegistration {
    fn new(worker: ServiceWorker, scope: String, push_manager: Arc<MemoryPushManager>) -> Self {
        Self {
            scope,
            installing: Some(worker),
            waiting: None,
            active: None,
            push_manager,
        }
    }

    /// Installing worker finished its install step
    pub fn install(&mut self) {
        if let Some(mut worker) = self.installing.take() {
            worker.state = ServiceWorkerState::Installed;
            self.waiting = Some(worker);
        }
    }

    /// Promote the waiting worker to active
    pub fn activate(&mut self) {
        if let Some(mut worker) = self.waiting.take() {
            worker.state = ServiceWorkerState::Activating;
            tracing::debug!("Service worker {} {}", worker.id, worker.state);
            worker.state = ServiceWorkerState::Activated;
            if let Some(mut previous) = self.active.replace(worker) {
                previous.state = ServiceWorkerState::Redundant;
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|w| w.state == ServiceWorkerState::Activated)
    }

    pub fn script_url(&self) -> Option<&str> {
        self.active
            .as_ref()
            .or(self.waiting.as_ref())
            .or(self.installing.as_ref())
            .map(|w| w.script_url.as_str())
    }
}

impl ServiceWorkerRegistration for MemoryRegistration {
    type Push = MemoryPushManager;

    fn scope(&self) -> &str {
        &self.scope
    }

    fn push_manager(&self) -> &MemoryPushManager {
        &self.push_manager
    }
}

/// In-memory service worker container
#[derive(Debug)]
pub struct MemoryServiceWorkerContainer {
    push_manager: Arc<MemoryPushManager>,
    supported: bool,
    reject_with: Option<String>,
    auto_activate: bool,
    pending: Mutex<Option<MemoryRegistration>>,
    active: OnceCell<MemoryRegistration>,
    next_id: AtomicU64,
    registrations: AtomicU64,
}

impl MemoryServiceWorkerContainer {
    /// Container whose registrations activate immediately
    pub fn new(push_manager: Arc<MemoryPushManager>) -> Self {
        Self {
            push_manager,
            supported: true,
            reject_with: None,
            auto_activate: true,
            pending: Mutex::new(None),
            active: OnceCell::new(),
            next_id: AtomicU64::new(0),
            registrations: AtomicU64::new(0),
        }
    }

    /// Platform without service worker support
    pub fn unsupported() -> Self {
        Self {
            supported: false,
            ..Self::new(Arc::default())
        }
    }

    /// Container that rejects every registration
    pub fn rejecting(push_manager: Arc<MemoryPushManager>, reason: &str) -> Self {
        Self {
            reject_with: Some(reason.to_string()),
            ..Self::new(push_manager)
        }
    }

    /// Registrations stay installed until [`activate_pending`](Self::activate_pending)
    pub fn manual_activation(mut self) -> Self {
        self.auto_activate = false;
        self
    }

    /// Activate the registration waiting on manual activation
    pub async fn activate_pending(&self) -> bool {
        let pending = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match pending {
            Some(registration) => {
                self.publish(registration).await;
                true
            }
            None => false,
        }
    }

    /// Number of successful `register` calls
    pub fn registrations(&self) -> u64 {
        self.registrations.load(Ordering::SeqCst)
    }

    pub fn push_manager(&self) -> &Arc<MemoryPushManager> {
        &self.push_manager
    }

    async fn publish(&self, mut registration: MemoryRegistration) -> MemoryRegistration {
        registration.activate();
        // The first activation resolves `ready`; later ones share it
        match self.active.set(registration).await {
            Ok(active) => active.clone(),
            Err(_) => self.active.wait().await.clone(),
        }
    }

    fn default_scope(script_url: &str) -> String {
        // Default scope is the directory containing the script
        match script_url.rfind('/') {
            Some(pos) => script_url[..=pos].to_string(),
            None => "/".to_string(),
        }
    }
}

impl ServiceWorkerContainer for MemoryServiceWorkerContainer {
    type Registration = MemoryRegistration;

    fn is_supported(&self) -> bool {
        self.supported
    }

    async fn register(&self, script_url: &str) -> Result<MemoryRegistration, PlatformError> {
        if !self.supported {
            return Err(PlatformError::Unsupported);
        }
        if let Some(reason) = &self.reject_with {
            return Err(PlatformError::Registration(reason.clone()));
        }
        self.registrations.fetch_add(1, Ordering::SeqCst);

        if let Some(active) = self.active.get() {
            if active.script_url() == Some(script_url) {
                return Ok(active.clone());
            }
        }

        let worker = ServiceWorker {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            script_url: script_url.to_string(),
            state: ServiceWorkerState::Installing,
        };
        tracing::debug!("Installing service worker {} from {}", worker.id, script_url);

        let mut registration = MemoryRegistration::new(
            worker,
            Self::default_scope(script_url),
            self.push_manager.clone(),
        );
        registration.install();

        if self.auto_activate {
            Ok(self.publish(registration).await)
        } else {
            *self.pending.lock().unwrap_or_else(PoisonError::into_inner) =
                Some(registration.clone());
            Ok(registration)
        }
    }

    async fn ready(&self) -> MemoryRegistration {
        self.active.wait().await.clone()
    }
}

/// In-memory window clients
#[derive(Debug, Default)]
pub struct MemoryClients {
    opened: Mutex<Vec<String>>,
}

impl MemoryClients {
    pub fn new() -> Self {
        Self::default()
    }

    /// URLs opened so far, oldest first
    pub fn opened(&self) -> Vec<String> {
        self.opened
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl WindowClients for MemoryClients {
    async fn open_window(&self, url: &str) -> Result<(), PlatformError> {
        if url.is_empty() {
            return Err(PlatformError::OpenWindow("empty url".into()));
        }
        self.opened
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(url.to_string());
        Ok(())
    }
}
