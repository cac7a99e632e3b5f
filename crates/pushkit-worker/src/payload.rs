//! Push payload handling
//!
//! Payloads are expected to be a JSON object with optional `title`, `body`,
//! `icon`, `badge`, `data` and `actions`. Anything else still produces a
//! notification: a payload that is not JSON becomes the body of a default
//! notification, and every missing or empty field takes its default.

use pushkit_platform::{NotificationAction, NotificationOptions, PushMessageData};
use serde_json::{Map, Value};

use crate::config::WorkerConfig;

/// Notification content extracted from a push message
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationPayload {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub data: Value,
    pub actions: Vec<NotificationAction>,
}

impl NotificationPayload {
    /// Build the payload for a push message
    ///
    /// `data` is `None` when the push carried no payload; every field then
    /// takes its default.
    pub fn parse(data: Option<&PushMessageData>, config: &WorkerConfig) -> Self {
        let fields = match data {
            None => Map::new(),
            Some(data) => match data.json() {
                Ok(Value::Object(fields)) => fields,
                Ok(other) => {
                    tracing::debug!("Push payload is not an object ({}), using defaults", other);
                    Map::new()
                }
                Err(err) => {
                    tracing::debug!("Push payload is not JSON: {}", err);
                    Self::fallback(&data.text(), config)
                }
            },
        };

        Self {
            title: text_field(&fields, "title").unwrap_or_else(|| config.title.clone()),
            body: text_field(&fields, "body").unwrap_or_else(|| config.body.clone()),
            icon: text_field(&fields, "icon").unwrap_or_else(|| config.icon.clone()),
            badge: text_field(&fields, "badge").unwrap_or_else(|| config.badge.clone()),
            data: fields
                .get("data")
                .filter(|data| is_truthy(data))
                .cloned()
                .unwrap_or_else(|| Value::Object(Map::new())),
            actions: fields.get("actions").map(parse_actions).unwrap_or_default(),
        }
    }

    /// Payload text shown as-is under the default title
    fn fallback(text: &str, config: &WorkerConfig) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert("title".into(), config.title.clone().into());
        fields.insert("body".into(), text.into());
        fields.insert("icon".into(), config.icon.clone().into());
        fields.insert("badge".into(), config.badge.clone().into());
        fields
    }

    /// Display options for `show_notification`
    pub fn options(&self, config: &WorkerConfig) -> NotificationOptions {
        NotificationOptions {
            body: Some(self.body.clone()),
            icon: Some(self.icon.clone()),
            badge: Some(self.badge.clone()),
            vibrate: config.vibrate.clone(),
            data: self.data.clone(),
            actions: self.actions.clone(),
            ..Default::default()
        }
    }
}

/// Where a click on a notification carrying `data` should navigate
pub fn click_url<'a>(data: &'a Value, config: &'a WorkerConfig) -> &'a str {
    data.get("url")
        .and_then(Value::as_str)
        .filter(|url| !url.is_empty())
        .unwrap_or(config.click_url.as_str())
}

/// Non-empty strings as-is; non-zero numbers and `true` as their text
fn text_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    match fields.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        value @ (Value::Number(_) | Value::Bool(true)) if is_truthy(value) => {
            Some(value.to_string())
        }
        _ => None,
    }
}

fn parse_actions(actions: &Value) -> Vec<NotificationAction> {
    let Some(actions) = actions.as_array() else {
        return Vec::new();
    };
    actions
        .iter()
        .filter_map(|action| serde_json::from_value(action.clone()).ok())
        .collect()
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(text: &str) -> NotificationPayload {
        let data = PushMessageData::new(text.as_bytes().to_vec());
        NotificationPayload::parse(Some(&data), &WorkerConfig::default())
    }

    #[test]
    fn test_partial_payload_gets_defaults() {
        let payload = parse(r#"{"title":"T","body":"B"}"#);
        assert_eq!(payload.title, "T");
        assert_eq!(payload.body, "B");
        assert_eq!(payload.icon, "/static/authentication/icon.png");
        assert_eq!(payload.badge, "/static/authentication/badge.png");
        assert_eq!(payload.data, json!({}));
        assert!(payload.actions.is_empty());
    }

    #[test]
    fn test_full_payload() {
        let payload = parse(
            r#"{
                "title": "Order ready",
                "body": "Pick up at counter 2",
                "icon": "/i.png",
                "badge": "/b.png",
                "data": {"url": "/orders/42"},
                "actions": [{"action": "view", "title": "View"}]
            }"#,
        );
        assert_eq!(payload.title, "Order ready");
        assert_eq!(payload.icon, "/i.png");
        assert_eq!(payload.data["url"], "/orders/42");
        assert_eq!(payload.actions.len(), 1);
        assert_eq!(payload.actions[0].action, "view");
    }

    #[test]
    fn test_undecodable_payload() {
        let payload = parse("Your prescription is ready");
        assert_eq!(payload.title, "Pharmacy App");
        assert_eq!(payload.body, "Your prescription is ready");
        assert_eq!(payload.icon, "/static/authentication/icon.png");
        assert_eq!(payload.data, json!({}));
    }

    #[test]
    fn test_empty_payload_text_uses_default_body() {
        let payload = parse("");
        assert_eq!(payload.title, "Pharmacy App");
        assert_eq!(payload.body, "You have a new notification");
    }

    #[test]
    fn test_absent_payload() {
        let payload = NotificationPayload::parse(None, &WorkerConfig::default());
        assert_eq!(payload.title, "Pharmacy App");
        assert_eq!(payload.body, "You have a new notification");
    }

    #[test]
    fn test_empty_strings_count_as_missing() {
        let payload = parse(r#"{"title":"","body":"","data":null}"#);
        assert_eq!(payload.title, "Pharmacy App");
        assert_eq!(payload.body, "You have a new notification");
        assert_eq!(payload.data, json!({}));
    }

    #[test]
    fn test_scalar_fields_use_their_text() {
        let payload = parse(r#"{"title":5,"body":true,"icon":0,"badge":false}"#);
        assert_eq!(payload.title, "5");
        assert_eq!(payload.body, "true");
        assert_eq!(payload.icon, "/static/authentication/icon.png");
        assert_eq!(payload.badge, "/static/authentication/badge.png");
        assert_eq!(parse(r#"{"title":{"x":1}}"#).title, "Pharmacy App");
    }

    #[test]
    fn test_non_object_json() {
        assert_eq!(parse("42").title, "Pharmacy App");
        assert_eq!(parse(r#"["a"]"#).body, "You have a new notification");
    }

    #[test]
    fn test_malformed_actions_are_skipped() {
        let payload = parse(r#"{"actions":[{"action":"a","title":"A"},{"nope":1},"x"]}"#);
        assert_eq!(payload.actions.len(), 1);
        assert!(parse(r#"{"actions":"view"}"#).actions.is_empty());
    }

    #[test]
    fn test_options_carry_vibration() {
        let config = WorkerConfig::default();
        let options = parse(r#"{"title":"T"}"#).options(&config);
        assert_eq!(options.vibrate, vec![200, 100, 200]);
        assert_eq!(options.body.as_deref(), Some("You have a new notification"));
        assert!(!options.require_interaction);
    }

    #[test]
    fn test_click_url() {
        let config = WorkerConfig::default();
        assert_eq!(click_url(&json!({"url": "/orders"}), &config), "/orders");
        assert_eq!(click_url(&json!({}), &config), "/");
        assert_eq!(click_url(&json!({"url": ""}), &config), "/");
        assert_eq!(click_url(&Value::Null, &config), "/");
    }
}
