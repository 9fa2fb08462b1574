//! Side channels that do not touch the cache: push notifications and the
//! background sync hook.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::api_defaults::{CONTACT_FORM_SYNC_TAG, NOTIFICATION_VIBRATE_PATTERN};

#[derive(Deserialize)]
struct PushPayload {
    title: String,
    #[serde(default)]
    body: String,
    url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub vibrate: Vec<u32>,
    pub data: NotificationData,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NotificationData {
    pub url: String,
}

pub struct Notifier {
    origin: Url,
    icon: String,
}

impl Notifier {
    pub fn new(origin: Url, icon: &str) -> Self {
        Notifier {
            origin,
            icon: icon.to_string(),
        }
    }

    /// Builds the notification to display for a push message. No payload is
    /// a silent no-op; an unreadable one is logged and dropped.
    pub fn on_push(&self, payload: Option<&[u8]>) -> Option<Notification> {
        let payload = payload?;
        let payload: PushPayload = match serde_json::from_slice(payload) {
            Ok(payload) => payload,
            Err(err) => {
                warn!("Ignoring push message with malformed payload: {err}");
                return None;
            }
        };
        let url = payload
            .url
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| "/".to_string());
        Some(Notification {
            title: payload.title,
            body: payload.body,
            icon: self.icon.clone(),
            badge: self.icon.clone(),
            vibrate: NOTIFICATION_VIBRATE_PATTERN.to_vec(),
            data: NotificationData { url },
        })
    }

    /// The page to open when the notification is clicked. Falls back to the
    /// site root.
    pub fn on_notification_click(&self, notification: &Notification) -> Url {
        match self.origin.join(&notification.data.url) {
            Ok(url) => url,
            Err(err) => {
                warn!(
                    "Notification url {} is invalid, opening site root: {err}",
                    notification.data.url
                );
                self.origin.join("/").unwrap_or_else(|_| self.origin.clone())
            }
        }
    }

    /// Returns whether the tag names a known sync job.
    pub fn on_sync(&self, tag: &str) -> bool {
        if tag != CONTACT_FORM_SYNC_TAG {
            debug!("Ignoring unknown sync tag {tag}");
            return false;
        }
        sync_contact_form();
        true
    }
}

// Offline booking submissions are not queued yet, so there is nothing to
// replay.
fn sync_contact_form() {
    info!("Syncing contact form submissions");
}
