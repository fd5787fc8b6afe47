//! Host-provided collaborators.
//!
//! The core never reaches into app-global state. Everything it needs from the
//! host comes in through these traits, passed explicitly at each call:
//!
//! | Trait | Used by |
//! |---|---|
//! | [`ChannelDirectory`] | post header (channel name and avatar) |
//! | [`PermissionService`] | post actions (may the user hide this post?) |
//! | [`PostStore`] | hiding a post |
//! | [`AppStateFlag`] | songbook cover reveal ("cover already seen") |
//! | [`HostSinks`] | clipboard, link opening, toasts |
//!
//! The data-reading traits take `&self` and require `Sync`, so one snapshot
//! can serve several posts being assembled in parallel.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Post not found: {0}")]
    NotFound(String),
    #[error("Store rejected the request: {0}")]
    Rejected(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelInfo {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChannelPermissions {
    pub can_edit: bool,
    pub can_delete: bool,
}

/// The signed-in user, as far as the feed cares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: String,
    #[serde(default)]
    pub feed_allowed: bool,
}

pub trait ChannelDirectory: Sync {
    /// Name and avatar of a channel, if the directory knows it.
    fn basic_info(&self, channel_id: &str) -> Option<ChannelInfo>;
}

pub trait PermissionService: Sync {
    fn channel_permissions(&self, channel_id: &str, user_id: &str) -> ChannelPermissions;
}

pub trait PostStore {
    fn hide(&self, post_id: &str) -> Result<(), StoreError>;
}

/// Persisted app-state flags.
pub trait AppStateFlag {
    fn cover_seen(&self) -> bool;
    fn set_cover_seen(&mut self, seen: bool);
}

/// Fire-and-forget platform effects.
pub trait HostSinks {
    fn write_clipboard(&self, text: &str);
    fn open_link(&self, target: &str);
    fn toast(&self, message: &str);
}
