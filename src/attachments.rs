//! Attachment reference resolution.
//!
//! A post carries a list of attachments, each a type tag plus either the id of
//! a related entity or an inline payload. Resolution happens in two steps:
//!
//! 1. [`AttachmentRef::from_raw`] classifies a [`RawAttachment`] into a closed
//!    set of typed references. The tag (matched case-insensitively) fixes the
//!    resolution strategy; a tag we don't know, or a known tag missing the
//!    field its strategy needs, becomes [`AttachmentRef::Unrecognized`].
//! 2. [`resolve`] turns a typed reference into a [`ResolvedAttachment`] by
//!    looking ids up in the read-only [`Collections`] or passing inline data
//!    through.
//!
//! | Tag | Strategy |
//! |-----|----------|
//! | `player` | `relatedId` → `players` |
//! | `song` | `relatedId` → `songs`, else inline `data` as the song |
//! | `gknickname` | inline `data` |
//! | `masstweet` | `data.rosterId` → `rosters` |
//! | `juanstagram` | inline `data.juanstagramPost` |
//!
//! Nothing here fails. A reference that cannot be resolved comes back as
//! [`ResolvedAttachment::Unknown`] carrying the original reference and the
//! reason, and a warning is logged. Siblings in the same post are unaffected.

use crate::types::{Collections, Player, RawAttachment, Roster, SongRecord};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use tracing::warn;

/// The attachment kinds this crate knows how to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentTag {
    Player,
    Song,
    GkNickname,
    MassTweet,
    Juanstagram,
}

impl AttachmentTag {
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "player" => Some(Self::Player),
            "song" => Some(Self::Song),
            "gknickname" => Some(Self::GkNickname),
            "masstweet" => Some(Self::MassTweet),
            "juanstagram" => Some(Self::Juanstagram),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Player => "player",
            Self::Song => "song",
            Self::GkNickname => "gknickname",
            Self::MassTweet => "masstweet",
            Self::Juanstagram => "juanstagram",
        }
    }
}

impl fmt::Display for AttachmentTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a song attachment gets its song from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "source", content = "value", rename_all = "lowercase")]
pub enum SongSource {
    Related(String),
    Inline(SongRecord),
}

/// Why a raw attachment could not be classified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "problem", content = "detail", rename_all = "snake_case")]
pub enum RefProblem {
    UnsupportedTag,
    MissingField(&'static str),
    InvalidPayload(String),
}

/// A typed attachment reference. One variant per tag, plus the catch-all.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum AttachmentRef {
    Player { player_id: String },
    Song(SongSource),
    GkNickname(Value),
    MassTweet { roster_id: String },
    Juanstagram(Value),
    Unrecognized { raw: RawAttachment, problem: RefProblem },
}

impl AttachmentRef {
    /// Classify a raw attachment. Total: every input maps to some variant.
    pub fn from_raw(raw: &RawAttachment) -> Self {
        let unrecognized = |problem| Self::Unrecognized {
            raw: raw.clone(),
            problem,
        };
        let Some(tag) = AttachmentTag::parse(&raw.attachment_type) else {
            return unrecognized(RefProblem::UnsupportedTag);
        };

        match tag {
            AttachmentTag::Player => match &raw.related_id {
                Some(id) => Self::Player {
                    player_id: id.clone(),
                },
                None => unrecognized(RefProblem::MissingField("relatedId")),
            },
            AttachmentTag::Song => match (&raw.related_id, &raw.data) {
                (Some(id), _) => Self::Song(SongSource::Related(id.clone())),
                (None, Some(data)) => match serde_json::from_value::<SongRecord>(data.clone()) {
                    Ok(song) => Self::Song(SongSource::Inline(song)),
                    Err(e) => unrecognized(RefProblem::InvalidPayload(e.to_string())),
                },
                (None, None) => unrecognized(RefProblem::MissingField("relatedId")),
            },
            AttachmentTag::GkNickname => match &raw.data {
                Some(data) => Self::GkNickname(data.clone()),
                None => unrecognized(RefProblem::MissingField("data")),
            },
            AttachmentTag::MassTweet => {
                match raw.data.as_ref().and_then(|d| d.get("rosterId")) {
                    Some(Value::String(id)) => Self::MassTweet {
                        roster_id: id.clone(),
                    },
                    _ => unrecognized(RefProblem::MissingField("data.rosterId")),
                }
            }
            AttachmentTag::Juanstagram => {
                match raw.data.as_ref().and_then(|d| d.get("juanstagramPost")) {
                    Some(post) => Self::Juanstagram(post.clone()),
                    None => unrecognized(RefProblem::MissingField("data.juanstagramPost")),
                }
            }
        }
    }

    /// The tag as written on the wire (original casing for unrecognized refs).
    pub fn tag(&self) -> String {
        match self {
            Self::Player { .. } => AttachmentTag::Player.to_string(),
            Self::Song(_) => AttachmentTag::Song.to_string(),
            Self::GkNickname(_) => AttachmentTag::GkNickname.to_string(),
            Self::MassTweet { .. } => AttachmentTag::MassTweet.to_string(),
            Self::Juanstagram(_) => AttachmentTag::Juanstagram.to_string(),
            Self::Unrecognized { raw, .. } => raw.attachment_type.clone(),
        }
    }
}

/// Why a reference resolved to [`ResolvedAttachment::Unknown`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum UnresolvedReason {
    /// The tag or payload shape was not understood.
    Unrecognized { problem: RefProblem },
    /// The referenced id is not in its collection. Whether it never existed or
    /// was removed later is not distinguished.
    NotFound {
        collection: &'static str,
        id: String,
    },
}

/// A render-ready attachment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum ResolvedAttachment {
    Player(Player),
    Song(SongRecord),
    GkNickname(Value),
    MassTweet(Roster),
    Juanstagram(Value),
    Unknown {
        tag: String,
        reference: AttachmentRef,
        reason: UnresolvedReason,
    },
}

/// A destination the host may navigate to when an attachment is tapped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum Route {
    Player { player_id: String },
    SingleSong { song_id: String },
    RosterList { roster_id: String },
}

impl ResolvedAttachment {
    /// Destination for a tap on this attachment. Navigating is up to the caller.
    pub fn route(&self) -> Option<Route> {
        match self {
            Self::Player(player) => Some(Route::Player {
                player_id: player.id.clone(),
            }),
            Self::Song(song) => Some(Route::SingleSong {
                song_id: song.id.clone(),
            }),
            Self::MassTweet(roster) => Some(Route::RosterList {
                roster_id: roster.id.clone(),
            }),
            Self::GkNickname(_) | Self::Juanstagram(_) | Self::Unknown { .. } => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown { .. })
    }
}

/// Resolve one typed reference against the collections.
pub fn resolve(reference: &AttachmentRef, collections: &Collections) -> ResolvedAttachment {
    let not_found = |collection: &'static str, id: &str| {
        warn!(
            tag = %reference.tag(),
            collection,
            id,
            "attachment target not found"
        );
        ResolvedAttachment::Unknown {
            tag: reference.tag(),
            reference: reference.clone(),
            reason: UnresolvedReason::NotFound {
                collection,
                id: id.to_string(),
            },
        }
    };

    match reference {
        AttachmentRef::Player { player_id } => collections
            .player(player_id)
            .cloned()
            .map(ResolvedAttachment::Player)
            .unwrap_or_else(|| not_found("players", player_id)),
        AttachmentRef::Song(SongSource::Related(song_id)) => collections
            .song(song_id)
            .cloned()
            .map(ResolvedAttachment::Song)
            .unwrap_or_else(|| not_found("songs", song_id)),
        AttachmentRef::Song(SongSource::Inline(song)) => ResolvedAttachment::Song(song.clone()),
        AttachmentRef::GkNickname(data) => ResolvedAttachment::GkNickname(data.clone()),
        AttachmentRef::MassTweet { roster_id } => collections
            .roster(roster_id)
            .cloned()
            .map(ResolvedAttachment::MassTweet)
            .unwrap_or_else(|| not_found("rosters", roster_id)),
        AttachmentRef::Juanstagram(post) => ResolvedAttachment::Juanstagram(post.clone()),
        AttachmentRef::Unrecognized { raw, problem } => {
            warn!(
                tag = %raw.attachment_type,
                ?problem,
                "cannot render attachment"
            );
            ResolvedAttachment::Unknown {
                tag: raw.attachment_type.clone(),
                reference: reference.clone(),
                reason: UnresolvedReason::Unrecognized {
                    problem: problem.clone(),
                },
            }
        }
    }
}

/// Classify and resolve every attachment of a post, positionally one-to-one.
pub fn resolve_all(raw: &[RawAttachment], collections: &Collections) -> Vec<ResolvedAttachment> {
    raw.iter()
        .map(|r| resolve(&AttachmentRef::from_raw(r), collections))
        .collect()
}
