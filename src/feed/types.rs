use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::layout::{LayoutItem, Media};
use crate::seen::{SeenEntry, Timestamp};

// ============================================================================
// Domain Types
// ============================================================================

/// A post shown in the feed grid.
///
/// Cloning is cheap: every string is an `Arc<str>`.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    /// Stable URI-like identifier.
    pub uri: Arc<str>,
    /// Author handle, without the leading `@`.
    pub author: Arc<str>,
    pub text: Arc<str>,
    pub indexed_at: Timestamp,
    pub media: Option<Media>,
    pub like_count: u32,
}

impl LayoutItem for Item {
    fn media(&self) -> Option<Media> {
        self.media
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationReason {
    Like,
    Repost,
    Follow,
    Mention,
    Reply,
    Quote,
}

impl NotificationReason {
    /// Verb phrase for "<author> ... ".
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Like => "liked your post",
            Self::Repost => "reposted your post",
            Self::Follow => "followed you",
            Self::Mention => "mentioned you",
            Self::Reply => "replied to you",
            Self::Quote => "quoted your post",
        }
    }
}

impl fmt::Display for NotificationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Like => "like",
            Self::Repost => "repost",
            Self::Follow => "follow",
            Self::Mention => "mention",
            Self::Reply => "reply",
            Self::Quote => "quote",
        };
        f.write_str(name)
    }
}

/// An entry in the notifications list.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub uri: Arc<str>,
    pub reason: NotificationReason,
    pub author: Arc<str>,
    /// Text of the post the notification is about, if any.
    pub subject: Option<Arc<str>>,
    pub indexed_at: Timestamp,
    /// Server-side read flag at fetch time.
    pub is_read: bool,
}

impl Notification {
    pub fn seen_entry(&self) -> SeenEntry {
        SeenEntry {
            id: Arc::clone(&self.uri),
            timestamp: self.indexed_at.clone(),
            read: self.is_read,
        }
    }
}

// Notifications never carry media and always estimate as text-only.
impl LayoutItem for Notification {
    fn media(&self) -> Option<Media> {
        None
    }
}

/// One page of results from a [`super::PageSource`].
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Cursor for the following page. `None` at the end of the list.
    pub next_cursor: Option<String>,
}

impl<T> Page<T> {
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_cursor: None,
        }
    }
}

// ============================================================================
// Wire Records
// ============================================================================

/// Serialized form of [`Item`]. Converts via [`ItemRecord::into_item`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ItemRecord {
    pub uri: String,
    pub author: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub indexed_at: String,
    #[serde(default)]
    pub media: Option<Media>,
    #[serde(default)]
    pub like_count: u32,
}

impl ItemRecord {
    pub(crate) fn into_item(self) -> Item {
        Item {
            uri: Arc::from(self.uri),
            author: Arc::from(self.author),
            text: Arc::from(self.text),
            indexed_at: Timestamp::new(self.indexed_at),
            media: self.media,
            like_count: self.like_count,
        }
    }
}

/// Serialized form of [`Notification`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NotificationRecord {
    pub uri: String,
    pub reason: NotificationReason,
    pub author: String,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub indexed_at: String,
    #[serde(default)]
    pub is_read: bool,
}

impl NotificationRecord {
    pub(crate) fn into_notification(self) -> Notification {
        Notification {
            uri: Arc::from(self.uri),
            reason: self.reason,
            author: Arc::from(self.author),
            subject: self.subject.map(Arc::from),
            indexed_at: Timestamp::new(self.indexed_at),
            is_read: self.is_read,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_record_camel_case() {
        let record: ItemRecord = serde_json::from_str(
            r#"{"uri":"at://p/1","author":"alice","text":"hi",
                "indexedAt":"2024-01-01T00:00:00Z","media":{"aspectRatio":1.5},"likeCount":3}"#,
        )
        .unwrap();
        let item = record.into_item();
        assert_eq!(&*item.author, "alice");
        assert_eq!(item.media, Some(Media::with_aspect_ratio(1.5)));
        assert_eq!(item.like_count, 3);
        assert_eq!(item.indexed_at.as_str(), "2024-01-01T00:00:00Z");
    }

    #[test]
    fn test_notification_defaults() {
        let record: NotificationRecord =
            serde_json::from_str(r#"{"uri":"at://n/1","reason":"follow","author":"bob"}"#).unwrap();
        let n = record.into_notification();
        assert_eq!(n.reason, NotificationReason::Follow);
        assert!(!n.is_read);
        assert!(n.subject.is_none());
        assert!(n.media().is_none());
        assert!(n.seen_entry().timestamp.is_empty());
    }

    #[test]
    fn test_reason_verb() {
        assert_eq!(NotificationReason::Quote.verb(), "quoted your post");
        assert_eq!(NotificationReason::Repost.to_string(), "repost");
    }
}
