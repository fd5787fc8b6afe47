//! Shared records consumed by the feed and songbook pipelines.
//!
//! These are the already-loaded, host-owned inputs. Field names follow the
//! JSON the host app stores (`_id`, camelCase keys), so a record read from disk
//! deserializes directly into these types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A feed post as stored by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord {
    #[serde(rename = "_id")]
    pub id: String,
    /// Raw markup text (`*bold*`, `_italic_`, bare URLs and emails).
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub attachments: Vec<RawAttachment>,
    pub published_at: DateTime<Utc>,
    /// Channel id the post was published to.
    pub channel: String,
    /// Whether the post was also sent as a push notification.
    #[serde(default)]
    pub push: bool,
}

/// An attachment exactly as it appears on a post.
///
/// Which of `related_id` / `data` is meaningful depends on the tag; see
/// [`crate::attachments::AttachmentRef`] for the typed form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAttachment {
    pub attachment_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

/// A named list of social handles targeted by a mass-tweet attachment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub handles: Vec<String>,
}

/// Canonical song row. Owned by the song collection; never stamped with
/// per-view data such as page numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capo_signal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_music_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lyrics: Option<String>,
}

/// A songbook chapter: a title and the ordered songs it references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    #[serde(rename = "chapter_title")]
    pub title: String,
    #[serde(default)]
    pub songs: Vec<SongRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongRef {
    #[serde(rename = "_id")]
    pub id: String,
}

impl SongRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Read-only, id-indexed collections an attachment can point into.
///
/// Lookups are exact id matches; when a collection holds duplicate ids the
/// first one wins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Collections {
    pub players: Vec<Player>,
    pub songs: Vec<SongRecord>,
    pub rosters: Vec<Roster>,
}

impl Collections {
    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn song(&self, id: &str) -> Option<&SongRecord> {
        self.songs.iter().find(|s| s.id == id)
    }

    pub fn roster(&self, id: &str) -> Option<&Roster> {
        self.rosters.iter().find(|r| r.id == id)
    }
}
