//! Shared test utilities for the chantbook test suite.
//!
//! Provides record builders with sensible defaults, a small sample collection,
//! and recording mocks for the host collaborators in [`crate::services`].
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let collections = sample_collections();
//! let sinks = RecordingSinks::default();
//!
//! let mut record = post("p1", "see www.club.com");
//! record.attachments = vec![player_ref("p1")];
//!
//! // ... run the code under test with `&sinks` ...
//! assert_eq!(sinks.events(), vec![SinkEvent::OpenLink("www.club.com".into())]);
//! ```

use chrono::{TimeZone, Utc};
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::layout::BorderStyle;
use crate::post::AssemblySettings;
use crate::services::{
    AppStateFlag, ChannelDirectory, ChannelInfo, ChannelPermissions, HostSinks,
    PermissionService, PostStore, StoreError,
};
use crate::types::{
    Chapter, Collections, Player, PostRecord, RawAttachment, Roster, SongRecord, SongRef,
};

// =========================================================================
// Record builders
// =========================================================================

/// A post on channel `c1`, published 2024-03-07 12:00 UTC, no images or attachments.
pub fn post(id: &str, text: &str) -> PostRecord {
    PostRecord {
        id: id.to_string(),
        text: text.to_string(),
        images: Vec::new(),
        attachments: Vec::new(),
        published_at: Utc.with_ymd_and_hms(2024, 3, 7, 12, 0, 0).unwrap(),
        channel: "c1".to_string(),
        push: false,
    }
}

pub fn player(id: &str, name: &str) -> Player {
    Player {
        id: id.to_string(),
        name: name.to_string(),
        number: None,
        position: None,
        thumbnail: None,
    }
}

pub fn song(id: &str, title: &str) -> SongRecord {
    SongRecord {
        id: id.to_string(),
        title: title.to_string(),
        capo_signal: None,
        reference_link: None,
        sheet_music_link: None,
        lyrics: None,
    }
}

pub fn roster(id: &str, name: &str) -> Roster {
    Roster {
        id: id.to_string(),
        name: name.to_string(),
        handles: Vec::new(),
    }
}

pub fn chapter(title: &str, song_ids: &[&str]) -> Chapter {
    Chapter {
        title: title.to_string(),
        songs: song_ids.iter().map(|id| SongRef::new(*id)).collect(),
    }
}

pub fn channel(id: &str, name: &str, avatar: Option<&str>) -> ChannelInfo {
    ChannelInfo {
        id: id.to_string(),
        name: name.to_string(),
        avatar_url: avatar.map(str::to_string),
    }
}

pub fn player_ref(id: &str) -> RawAttachment {
    RawAttachment {
        attachment_type: "player".to_string(),
        related_id: Some(id.to_string()),
        data: None,
    }
}

pub fn song_ref(id: &str) -> RawAttachment {
    RawAttachment {
        attachment_type: "song".to_string(),
        related_id: Some(id.to_string()),
        data: None,
    }
}

pub fn masstweet_ref(roster_id: &str) -> RawAttachment {
    RawAttachment {
        attachment_type: "masstweet".to_string(),
        related_id: None,
        data: Some(json!({ "rosterId": roster_id })),
    }
}

/// Players `p1` "Ana Keeper", songs `s1`/`s2`, roster `r1` "Front Office".
pub fn sample_collections() -> Collections {
    Collections {
        players: vec![player("p1", "Ana Keeper"), player("p2", "Bo Striker")],
        songs: vec![song("s1", "Forever Blue"), song("s2", "Stand Up")],
        rosters: vec![roster("r1", "Front Office")],
    }
}

pub fn sample_settings(window_width: f64) -> AssemblySettings {
    AssemblySettings {
        window_width,
        margin_horizontal: 5.0,
        default_avatar: "channel-default.png".to_string(),
        border: BorderStyle::default(),
    }
}

// =========================================================================
// Collaborator mocks
// =========================================================================

/// Channel directory backed by a fixed map.
#[derive(Debug, Default)]
pub struct StaticDirectory {
    channels: HashMap<String, ChannelInfo>,
}

impl StaticDirectory {
    pub fn with(info: ChannelInfo) -> Self {
        let mut channels = HashMap::new();
        channels.insert(info.id.clone(), info);
        Self { channels }
    }
}

impl ChannelDirectory for StaticDirectory {
    fn basic_info(&self, channel_id: &str) -> Option<ChannelInfo> {
        self.channels.get(channel_id).cloned()
    }
}

/// Grants delete permission for listed `(channel, user)` pairs only.
#[derive(Debug, Default)]
pub struct StaticPermissions {
    deleters: HashSet<(String, String)>,
}

impl StaticPermissions {
    pub fn granting(channel_id: &str, user_id: &str) -> Self {
        let mut deleters = HashSet::new();
        deleters.insert((channel_id.to_string(), user_id.to_string()));
        Self { deleters }
    }
}

impl PermissionService for StaticPermissions {
    fn channel_permissions(&self, channel_id: &str, user_id: &str) -> ChannelPermissions {
        let granted = self
            .deleters
            .contains(&(channel_id.to_string(), user_id.to_string()));
        ChannelPermissions {
            can_edit: granted,
            can_delete: granted,
        }
    }
}

/// Post store that records hidden ids, or rejects everything.
#[derive(Debug, Default)]
pub struct MockStore {
    reject: bool,
    hidden: Mutex<Vec<String>>,
}

impl MockStore {
    pub fn rejecting() -> Self {
        Self {
            reject: true,
            hidden: Mutex::new(Vec::new()),
        }
    }

    pub fn hidden(&self) -> Vec<String> {
        self.hidden.lock().unwrap().clone()
    }
}

impl PostStore for MockStore {
    fn hide(&self, post_id: &str) -> Result<(), StoreError> {
        if self.reject {
            return Err(StoreError::Rejected(post_id.to_string()));
        }
        self.hidden.lock().unwrap().push(post_id.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    Clipboard(String),
    OpenLink(String),
    Toast(String),
}

/// Host sinks that record every effect in order.
#[derive(Debug, Default)]
pub struct RecordingSinks {
    events: Mutex<Vec<SinkEvent>>,
}

impl RecordingSinks {
    pub fn events(&self) -> Vec<SinkEvent> {
        self.events.lock().unwrap().clone()
    }

    fn record(&self, event: SinkEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl HostSinks for RecordingSinks {
    fn write_clipboard(&self, text: &str) {
        self.record(SinkEvent::Clipboard(text.to_string()));
    }

    fn open_link(&self, target: &str) {
        self.record(SinkEvent::OpenLink(target.to_string()));
    }

    fn toast(&self, message: &str) {
        self.record(SinkEvent::Toast(message.to_string()));
    }
}

/// App-state flag that starts unseen and records every write.
#[derive(Debug, Default)]
pub struct RecordingFlag {
    seen: bool,
    writes: Mutex<Vec<bool>>,
}

impl RecordingFlag {
    pub fn writes(&self) -> Vec<bool> {
        self.writes.lock().unwrap().clone()
    }
}

impl AppStateFlag for RecordingFlag {
    fn cover_seen(&self) -> bool {
        self.seen
    }

    fn set_cover_seen(&mut self, seen: bool) {
        self.seen = seen;
        self.writes.lock().unwrap().push(seen);
    }
}
