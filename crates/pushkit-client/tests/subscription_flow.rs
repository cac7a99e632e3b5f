//! Subscription flow tests for pushkit-client
//!
//! Drives the manager against the in-memory platform and a recording
//! transport.

use std::sync::Arc;

use pushkit_client::view::{DISABLE_BUTTON, ENABLE_BUTTON, STATUS};
use pushkit_client::*;
use pushkit_net::RecordingTransport;
use pushkit_platform::*;

const VAPID_KEY: &str =
    "BEl62iUYgUivxIkv69yViEuiBIa-Ib9-SkvMeAtA3LFgDzkrxZJjSgSnfckjBJuBkr3qBUYIHBQFLXYp5Nksh8U";

type Manager<P = MemoryPermissionPrompt> =
    SubscriptionManager<MemoryServiceWorkerContainer, P, RecordingTransport>;

struct Page {
    push: Arc<MemoryPushManager>,
    document: Arc<Document>,
}

impl Page {
    fn new() -> Self {
        Self {
            push: Arc::new(MemoryPushManager::new()),
            document: Arc::new(Document::with_elements([
                Element::new(ENABLE_BUTTON),
                Element::new(DISABLE_BUTTON),
                Element::new(STATUS),
            ])),
        }
    }

    fn manager(&self, config: ManagerConfig, transport: RecordingTransport) -> Manager {
        self.manager_with(config, MemoryPermissionPrompt::granting(), transport)
    }

    fn manager_with<P: PermissionPrompt>(
        &self,
        config: ManagerConfig,
        prompt: P,
        transport: RecordingTransport,
    ) -> Manager<P> {
        SubscriptionManager::new(
            config,
            MemoryServiceWorkerContainer::new(self.push.clone()),
            prompt,
            transport,
        )
        .unwrap()
        .with_view(DomStatusView::new(self.document.clone()))
        .with_cookies(Arc::new(CookieJar::with_cookie("csrftoken", "csrf-abc")))
    }

    fn status(&self) -> Element {
        self.document.get_element_by_id(STATUS).unwrap()
    }

    fn snapshot(&self) -> (Element, Element, Element) {
        (
            self.document.get_element_by_id(ENABLE_BUTTON).unwrap(),
            self.document.get_element_by_id(DISABLE_BUTTON).unwrap(),
            self.status(),
        )
    }
}

// ============================================================================
// REGISTRATION
// ============================================================================

#[test]
fn test_init_registers_fixed_worker_path() {
    let page = Page::new();
    let manager = page.manager(ManagerConfig::new(VAPID_KEY), RecordingTransport::ok());

    let registration = smol::block_on(manager.init()).unwrap();
    assert_eq!(
        registration.script_url(),
        Some("/static/authentication/service-worker.js")
    );
    assert_eq!(manager.container().registrations(), 1);
    assert_eq!(page.status().text_content, "✗ Notifications Disabled");
}

#[test]
fn test_init_reflects_existing_subscription() {
    let page = Page::new();
    let manager = page.manager(ManagerConfig::new(VAPID_KEY), RecordingTransport::ok());
    smol::block_on(async {
        manager.init().await.unwrap();
        manager.subscribe().await.unwrap();
    });

    // A fresh page load sharing the same push manager
    let reloaded = page.manager(ManagerConfig::new(VAPID_KEY), RecordingTransport::ok());
    page.document.update(|elements| {
        if let Some(status) = elements.get_mut(STATUS) {
            status.text_content.clear();
        }
    });
    smol::block_on(reloaded.init()).unwrap();
    assert_eq!(page.status().text_content, "✓ Notifications Enabled");
}

#[test]
fn test_unsupported_platform_is_not_fatal() {
    let page = Page::new();
    let manager = SubscriptionManager::new(
        ManagerConfig::new(VAPID_KEY),
        MemoryServiceWorkerContainer::unsupported(),
        MemoryPermissionPrompt::granting(),
        RecordingTransport::ok(),
    )
    .unwrap()
    .with_view(DomStatusView::new(page.document.clone()));

    assert!(smol::block_on(manager.init()).is_none());
    assert_eq!(page.status().text_content, "");
}

#[test]
fn test_flows_fail_fast_without_service_workers() {
    let page = Page::new();
    let manager = SubscriptionManager::new(
        ManagerConfig::new(VAPID_KEY),
        MemoryServiceWorkerContainer::unsupported(),
        MemoryPermissionPrompt::granting(),
        RecordingTransport::ok(),
    )
    .unwrap()
    .with_view(DomStatusView::new(page.document.clone()));

    smol::block_on(async {
        assert!(manager.init().await.is_none());

        let err = manager.subscribe().await.unwrap_err();
        assert!(matches!(err, PushError::Platform(PlatformError::Unsupported)));
        let err = manager.unsubscribe().await.unwrap_err();
        assert!(matches!(err, PushError::Platform(PlatformError::Unsupported)));
        let err = manager.request_permission().await.unwrap_err();
        assert!(matches!(err, PushError::Platform(PlatformError::Unsupported)));
    });

    assert_eq!(manager.container().push_manager().subscribe_calls(), 0);
    assert_eq!(manager.container().push_manager().unsubscribe_calls(), 0);
    assert!(manager.transport().requests().is_empty());
    assert_eq!(page.status().text_content, "");
}

#[test]
fn test_rejected_registration_leaves_view_untouched() {
    let page = Page::new();
    let manager = SubscriptionManager::new(
        ManagerConfig::new(VAPID_KEY),
        MemoryServiceWorkerContainer::rejecting(page.push.clone(), "script failed to parse"),
        MemoryPermissionPrompt::granting(),
        RecordingTransport::ok(),
    )
    .unwrap()
    .with_view(DomStatusView::new(page.document.clone()));

    assert!(smol::block_on(manager.init()).is_none());
    assert_eq!(page.status().class_name, "");
}

// ============================================================================
// SUBSCRIBE
// ============================================================================

#[test]
fn test_subscribe_without_key_never_reaches_platform() {
    let page = Page::new();
    let manager = page.manager(ManagerConfig::default(), RecordingTransport::ok());

    smol::block_on(async {
        manager.init().await.unwrap();
        let err = manager.subscribe().await.unwrap_err();
        assert!(matches!(err, PushError::MissingPublicKey));
    });

    assert_eq!(page.push.subscribe_calls(), 0);
    assert!(manager.transport().requests().is_empty());
    assert_eq!(page.status().text_content, "✗ Notifications Disabled");
}

#[test]
fn test_empty_key_counts_as_missing() {
    let page = Page::new();
    let manager = page.manager(ManagerConfig::new(""), RecordingTransport::ok());
    let err = smol::block_on(manager.subscribe()).unwrap_err();
    assert!(matches!(err, PushError::MissingPublicKey));
    assert_eq!(page.push.subscribe_calls(), 0);
}

#[test]
fn test_subscribe_posts_descriptor_once() {
    let page = Page::new();
    let manager = page.manager(
        ManagerConfig::new(VAPID_KEY).with_origin("https://pharmacy.example.com"),
        RecordingTransport::ok(),
    );

    let subscription = smol::block_on(async {
        manager.init().await.unwrap();
        manager.subscribe().await.unwrap()
    });

    let requests = manager.transport().requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.method, pushkit_net::Method::Post);
    assert_eq!(
        request.url,
        "https://pharmacy.example.com/webpush/save_information"
    );
    assert_eq!(request.headers.get("X-CSRFToken").unwrap(), "csrf-abc");

    let body = request.json_body().unwrap();
    assert_eq!(body["status_type"], "subscribe");
    assert_eq!(
        body["subscription"],
        serde_json::to_value(&subscription).unwrap()
    );
}

#[test]
fn test_subscribe_requests_user_visible_pushes_with_raw_key() {
    let page = Page::new();
    let manager = page.manager(ManagerConfig::new(VAPID_KEY), RecordingTransport::ok());
    smol::block_on(async {
        manager.init().await.unwrap();
        manager.subscribe().await.unwrap();
    });

    let options = page.push.last_options().unwrap();
    assert!(options.user_visible_only);
    assert_eq!(
        options.application_server_key,
        Some(url_base64_to_bytes(VAPID_KEY).unwrap())
    );
    assert_eq!(options.application_server_key.unwrap().len(), 65);
}

#[test]
fn test_subscribe_updates_view() {
    let page = Page::new();
    let manager = page.manager(ManagerConfig::new(VAPID_KEY), RecordingTransport::ok());
    smol::block_on(async {
        manager.init().await.unwrap();
        manager.subscribe().await.unwrap();
    });

    let (enable, disable, status) = page.snapshot();
    assert!(!enable.is_visible());
    assert!(disable.is_visible());
    assert_eq!(status.class_name, "notification-status enabled");
}

#[test]
fn test_platform_rejection_propagates() {
    let page = Page {
        push: Arc::new(MemoryPushManager::rejecting("push service unavailable")),
        ..Page::new()
    };
    let manager = page.manager(ManagerConfig::new(VAPID_KEY), RecordingTransport::ok());

    let err = smol::block_on(async {
        manager.init().await.unwrap();
        manager.subscribe().await.unwrap_err()
    });
    assert!(matches!(err, PushError::Platform(PlatformError::Subscribe(_))));
    assert!(manager.transport().requests().is_empty());
    assert_eq!(page.status().text_content, "✗ Notifications Disabled");
}

#[test]
fn test_server_failure_leaves_view_unchanged() {
    let page = Page::new();
    let manager = page.manager(
        ManagerConfig::new(VAPID_KEY),
        RecordingTransport::respond(500, "{}"),
    );

    let before = smol::block_on(async {
        manager.init().await.unwrap();
        page.snapshot()
    });
    let err = smol::block_on(manager.subscribe()).unwrap_err();

    assert!(matches!(err, PushError::Sync { status: 500, .. }));
    assert_eq!(page.snapshot(), before);
}

#[test]
fn test_network_failure_propagates() {
    let page = Page::new();
    let manager = page.manager(
        ManagerConfig::new(VAPID_KEY),
        RecordingTransport::unreachable("connection reset"),
    );
    let err = smol::block_on(async {
        manager.init().await.unwrap();
        manager.subscribe().await.unwrap_err()
    });
    assert!(matches!(err, PushError::Net(_)));
}

#[test]
fn test_subscribe_waits_for_activation() {
    let push = Arc::new(MemoryPushManager::new());
    let manager = SubscriptionManager::new(
        ManagerConfig::new(VAPID_KEY),
        MemoryServiceWorkerContainer::new(push.clone()).manual_activation(),
        MemoryPermissionPrompt::granting(),
        RecordingTransport::ok(),
    )
    .unwrap();

    smol::block_on(async {
        manager.init().await.unwrap();
        let subscribing = manager.subscribe();
        let activating = async {
            assert_eq!(push.subscribe_calls(), 0);
            manager.container().activate_pending().await
        };
        let (subscribed, activated) = smol::future::zip(subscribing, activating).await;
        assert!(activated);
        assert!(subscribed.is_ok());
    });
    assert_eq!(push.subscribe_calls(), 1);
}

// ============================================================================
// UNSUBSCRIBE
// ============================================================================

#[test]
fn test_unsubscribe_cancels_and_notifies_server() {
    let page = Page::new();
    let manager = page.manager(ManagerConfig::new(VAPID_KEY), RecordingTransport::ok());

    let cancelled = smol::block_on(async {
        manager.init().await.unwrap();
        let subscription = manager.subscribe().await.unwrap();
        let cancelled = manager.unsubscribe().await.unwrap();

        let requests = manager.transport().requests();
        assert_eq!(requests.len(), 2);
        let body = requests[1].json_body().unwrap();
        assert_eq!(body["status_type"], "unsubscribe");
        assert_eq!(body["subscription"]["endpoint"], subscription.endpoint.as_str());
        cancelled
    });

    assert!(cancelled);
    assert!(page.push.current().is_none());
    assert_eq!(page.status().text_content, "✗ Notifications Disabled");
}

#[test]
fn test_unsubscribe_without_subscription_is_a_no_op() {
    let page = Page::new();
    let manager = page.manager(ManagerConfig::new(VAPID_KEY), RecordingTransport::ok());

    let cancelled = smol::block_on(async {
        manager.init().await.unwrap();
        manager.unsubscribe().await.unwrap()
    });

    assert!(!cancelled);
    assert_eq!(page.push.unsubscribe_calls(), 0);
    assert!(manager.transport().requests().is_empty());
    assert_eq!(page.status().class_name, "notification-status disabled");
}

#[test]
fn test_unsubscribe_server_failure_propagates() {
    let page = Page::new();
    let subscriber = page.manager(ManagerConfig::new(VAPID_KEY), RecordingTransport::ok());
    smol::block_on(async {
        subscriber.init().await.unwrap();
        subscriber.subscribe().await.unwrap();
    });

    let manager = page.manager(
        ManagerConfig::new(VAPID_KEY),
        RecordingTransport::respond(403, "{}"),
    );
    let err = smol::block_on(async {
        manager.init().await.unwrap();
        manager.unsubscribe().await.unwrap_err()
    });

    assert!(matches!(
        err,
        PushError::Sync {
            status_type: StatusType::Unsubscribe,
            status: 403
        }
    ));
    // Cancelled at the push service before the server refused
    assert!(page.push.current().is_none());
    assert_eq!(page.status().text_content, "✓ Notifications Enabled");
}

// ============================================================================
// PERMISSION
// ============================================================================

#[test]
fn test_granted_permission_subscribes() {
    let page = Page::new();
    let manager = page.manager(ManagerConfig::new(VAPID_KEY), RecordingTransport::ok());
    let subscription = smol::block_on(async {
        manager.init().await.unwrap();
        manager.request_permission().await.unwrap()
    });

    assert_eq!(page.push.current(), Some(subscription));
    assert_eq!(manager.permissions().requests(), 1);
}

#[test]
fn test_denied_permission() {
    let page = Page::new();
    let manager = page.manager_with(
        ManagerConfig::new(VAPID_KEY),
        MemoryPermissionPrompt::denying(),
        RecordingTransport::ok(),
    );
    let err = smol::block_on(async {
        manager.init().await.unwrap();
        manager.request_permission().await.unwrap_err()
    });

    assert!(matches!(err, PushError::PermissionDenied));
    assert_eq!(page.push.subscribe_calls(), 0);
}

#[test]
fn test_dismissed_prompt_is_denied() {
    let page = Page::new();
    let manager = page.manager_with(
        ManagerConfig::new(VAPID_KEY),
        MemoryPermissionPrompt::new(NotificationPermission::Default),
        RecordingTransport::ok(),
    );
    let err = smol::block_on(manager.request_permission()).unwrap_err();
    assert!(matches!(err, PushError::PermissionDenied));
}

#[test]
fn test_callback_style_permission() {
    let page = Page::new();
    let manager = page.manager_with(
        ManagerConfig::new(VAPID_KEY),
        CallbackPrompt::new(MemoryPermissionPrompt::granting()),
        RecordingTransport::ok(),
    );
    smol::block_on(async {
        manager.init().await.unwrap();
        manager.request_permission().await.unwrap();
    });
    assert_eq!(page.push.subscribe_calls(), 1);
}

// ============================================================================
// VIEW
// ============================================================================

#[test]
fn test_update_ui_states_are_inverse_and_idempotent() {
    let page = Page::new();
    let manager = page.manager(ManagerConfig::new(VAPID_KEY), RecordingTransport::ok());

    manager.update_ui(true);
    let (enable_on, disable_on, status_on) = page.snapshot();
    manager.update_ui(true);
    assert_eq!(page.snapshot(), (enable_on.clone(), disable_on.clone(), status_on.clone()));

    manager.update_ui(false);
    let (enable_off, disable_off, status_off) = page.snapshot();
    assert_eq!(enable_off.display, disable_on.display);
    assert_eq!(disable_off.display, enable_on.display);
    assert_ne!(status_off.text_content, status_on.text_content);
    assert_ne!(status_off.class_name, status_on.class_name);

    manager.update_ui(false);
    assert_eq!(page.snapshot(), (enable_off, disable_off, status_off));
}

#[test]
fn test_manager_without_view() {
    let push = Arc::new(MemoryPushManager::new());
    let manager = SubscriptionManager::new(
        ManagerConfig::new(VAPID_KEY),
        MemoryServiceWorkerContainer::new(push.clone()),
        MemoryPermissionPrompt::granting(),
        RecordingTransport::ok(),
    )
    .unwrap();

    smol::block_on(async {
        manager.init().await.unwrap();
        manager.subscribe().await.unwrap();
    });
    assert!(push.current().is_some());
}
