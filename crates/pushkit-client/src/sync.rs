//! Server sync
//!
//! Reports subscription changes to the application server, which is the
//! source of truth for who receives pushes.

use std::sync::Arc;

use pushkit_net::{HttpTransport, Request, Url};
use pushkit_platform::{CookieJar, CookieSource, PushSubscription};
use serde::Serialize;

use crate::PushError;

/// Kind of change being reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusType {
    Subscribe,
    Unsubscribe,
}

impl StatusType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusType::Subscribe => "subscribe",
            StatusType::Unsubscribe => "unsubscribe",
        }
    }

    pub(crate) fn verb(&self) -> &'static str {
        match self {
            StatusType::Subscribe => "save",
            StatusType::Unsubscribe => "delete",
        }
    }
}

/// Body of `POST /webpush/save_information`
#[derive(Debug, Serialize)]
pub struct SaveInformation<'a> {
    pub subscription: &'a PushSubscription,
    pub status_type: StatusType,
}

/// Client for the save-information endpoint
pub struct ServerSync<T> {
    transport: T,
    endpoint: Url,
    csrf_cookie: String,
    cookies: Arc<dyn CookieSource>,
}

impl<T: HttpTransport> ServerSync<T> {
    pub fn new(transport: T, endpoint: Url, csrf_cookie: &str) -> Self {
        Self {
            transport,
            endpoint,
            csrf_cookie: csrf_cookie.to_string(),
            cookies: Arc::new(CookieJar::new()),
        }
    }

    pub fn with_cookies(mut self, cookies: Arc<dyn CookieSource>) -> Self {
        self.cookies = cookies;
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn send_subscription_to_server(
        &self,
        subscription: &PushSubscription,
    ) -> Result<serde_json::Value, PushError> {
        self.post(subscription, StatusType::Subscribe).await
    }

    pub async fn delete_subscription_from_server(
        &self,
        subscription: &PushSubscription,
    ) -> Result<serde_json::Value, PushError> {
        self.post(subscription, StatusType::Unsubscribe).await
    }

    async fn post(
        &self,
        subscription: &PushSubscription,
        status_type: StatusType,
    ) -> Result<serde_json::Value, PushError> {
        let body = serde_json::to_string(&SaveInformation {
            subscription,
            status_type,
        })?;
        // Missing cookie still sends the header, empty
        let csrf_token = self.cookies.get_cookie(&self.csrf_cookie).unwrap_or_default();

        let request = Request::post(self.endpoint.as_str())
            .with_header("X-CSRFToken", &csrf_token)
            .with_json(&body);
        let response = self.transport.send(request).await?;

        if !response.is_success() {
            return Err(PushError::Sync {
                status_type,
                status: response.status,
            });
        }
        tracing::debug!("Server accepted {} for {}", status_type.as_str(), subscription.endpoint);
        Ok(response.json()?)
    }
}
