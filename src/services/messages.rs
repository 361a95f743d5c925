//! Messages relayed from the background context to content scripts.

use serde::{Deserialize, Serialize};
use tracing::trace;
use url::Url;

use crate::constants::SHORTS_PATH_SEGMENT;

pub const URL_UPDATE_TYPE: &str = "url update";

/// "The tab navigated" notice, sent fire-and-forget to the tab's content
/// script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationNotice {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "newUrl")]
    pub new_url: String,
}

impl NavigationNotice {
    pub fn url_update(new_url: impl Into<String>) -> Self {
        Self {
            kind: URL_UPDATE_TYPE.to_string(),
            new_url: new_url.into(),
        }
    }

    /// Parse an incoming runtime message; anything that is not a URL update
    /// is ignored.
    pub fn from_message(message: serde_json::Value) -> Option<Self> {
        match serde_json::from_value::<Self>(message) {
            Ok(notice) if notice.kind == URL_UPDATE_TYPE => Some(notice),
            Ok(notice) => {
                trace!("Ignoring runtime message of type {}", notice.kind);
                None
            }
            Err(_) => None,
        }
    }

    pub fn is_shorts(&self) -> bool {
        is_shorts_url(&self.new_url)
    }
}

/// Relay decision for a tab update: only updates carrying a new URL produce
/// a notice.
pub fn notice_for_tab_update(changed_url: Option<&str>) -> Option<NavigationNotice> {
    changed_url.map(NavigationNotice::url_update)
}

/// Whether `location` points at a Shorts item.
pub fn is_shorts_url(location: &str) -> bool {
    let Ok(url) = Url::parse(location) else {
        return false;
    };
    url.path_segments()
        .and_then(|mut segments| segments.next())
        .is_some_and(|first| first == SHORTS_PATH_SEGMENT)
}
