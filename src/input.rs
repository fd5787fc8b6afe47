//! JSON inputs for the command-line host.
//!
//! The library itself never reads files; this module turns on-disk JSON into
//! the records and collaborator implementations the pipelines expect.
//!
//! | File | Shape | Loaded by |
//! |---|---|---|
//! | data bundle | `{channels, permissions, players, songs, rosters, session}` | [`load_bundle`] |
//! | post | one [`PostRecord`] | [`load_post`] |
//! | feed directory | `*.json` posts, any depth | [`load_posts`] |
//! | songbook | `{chapters, songs}` | [`load_songbook`] |
//! | session state | [`Session`] | [`load_session`], [`save_session`] |
//!
//! Every key of the data bundle is optional, so an empty `{}` is a valid
//! bundle with no channels, no grants, empty collections and no user.

use crate::context::Session;
use crate::services::{ChannelDirectory, ChannelInfo, ChannelPermissions, PermissionService};
use crate::songbook::SongIndex;
use crate::types::{Chapter, Collections, PostRecord, SongRecord};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum InputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
}

/// A per-user permission grant on a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionGrant {
    pub channel: String,
    pub user: String,
    #[serde(flatten)]
    pub permissions: ChannelPermissions,
}

/// Host data snapshot: channel directory, permission grants, collections and
/// the session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataBundle {
    pub channels: Vec<ChannelInfo>,
    pub permissions: Vec<PermissionGrant>,
    #[serde(flatten)]
    pub collections: Collections,
    pub session: Session,
}

impl ChannelDirectory for DataBundle {
    fn basic_info(&self, channel_id: &str) -> Option<ChannelInfo> {
        self.channels.iter().find(|c| c.id == channel_id).cloned()
    }
}

impl PermissionService for DataBundle {
    fn channel_permissions(&self, channel_id: &str, user_id: &str) -> ChannelPermissions {
        self.permissions
            .iter()
            .find(|g| g.channel == channel_id && g.user == user_id)
            .map(|g| g.permissions)
            .unwrap_or_default()
    }
}

/// A songbook file: chapters plus the song collection they refer to.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SongbookFile {
    pub chapters: Vec<Chapter>,
    pub songs: Vec<SongRecord>,
}

impl SongbookFile {
    pub fn index(&self) -> SongIndex {
        SongIndex::new(self.songs.clone())
    }
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, InputError> {
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|source| InputError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the data bundle, or an empty one when no path is given.
pub fn load_bundle(path: Option<&Path>) -> Result<DataBundle, InputError> {
    match path {
        Some(path) => read_json(path),
        None => Ok(DataBundle::default()),
    }
}

pub fn load_post(path: &Path) -> Result<PostRecord, InputError> {
    read_json(path)
}

pub fn load_songbook(path: &Path) -> Result<SongbookFile, InputError> {
    read_json(path)
}

/// Load saved session state, if the file exists.
pub fn load_session(path: &Path) -> Result<Option<Session>, InputError> {
    if !path.exists() {
        return Ok(None);
    }
    read_json(path).map(Some)
}

pub fn save_session(path: &Path, session: &Session) -> Result<(), InputError> {
    let json = serde_json::to_string_pretty(session).map_err(|source| InputError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json)?;
    Ok(())
}

/// Load every `*.json` post under `dir`, newest first.
///
/// Files are parsed in parallel. Posts published at the same instant keep
/// file-name order.
pub fn load_posts(dir: &Path) -> Result<Vec<PostRecord>, InputError> {
    let mut paths = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        let is_json = entry.path().extension().and_then(|e| e.to_str()) == Some("json");
        if entry.file_type().is_file() && is_json {
            paths.push(entry.into_path());
        }
    }
    debug!(dir = %dir.display(), files = paths.len(), "found post files");

    let mut posts = paths
        .par_iter()
        .map(|path| load_post(path))
        .collect::<Result<Vec<_>, _>>()?;
    posts.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    Ok(posts)
}
