//! Worker configuration

pub const DEFAULT_TITLE: &str = "Pharmacy App";
pub const DEFAULT_BODY: &str = "You have a new notification";
pub const DEFAULT_ICON: &str = "/static/authentication/icon.png";
pub const DEFAULT_BADGE: &str = "/static/authentication/badge.png";
/// Page opened when a clicked notification carries no url
pub const DEFAULT_CLICK_URL: &str = "/";

/// Notification metadata used wherever a push payload leaves a gap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerConfig {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    /// Vibration pattern in milliseconds, applied to every notification
    pub vibrate: Vec<u32>,
    pub click_url: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.into(),
            body: DEFAULT_BODY.into(),
            icon: DEFAULT_ICON.into(),
            badge: DEFAULT_BADGE.into(),
            vibrate: vec![200, 100, 200],
            click_url: DEFAULT_CLICK_URL.into(),
        }
    }
}
