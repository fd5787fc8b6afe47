//! CLI output formatting for posts and songbooks.
//!
//! # Entity Display Contract
//!
//! Every entity follows the same two-level pattern:
//!
//! 1. **Header line**: positional index + title (+ optional detail)
//! 2. **Context lines**: indented details, one fact per line
//!
//! # Output Format
//!
//! ## Post
//!
//! ```text
//! 001 Club News · 5 minutes ago [push]
//!     Avatar: club.png
//!     Text: Welcome Ana to the squad
//!     Link: www.club.com
//!     Images: pair (2)
//!         001 a.jpg (195.0px square)
//!         002 b.jpg (195.0px square)
//!     Attachments
//!         001 player Ana Keeper → player p1
//!         002 Can't render attachment {"kind":"player","value":{"player_id":"ghost"}}
//!     Actions: hide
//! ```
//!
//! ## Table of contents
//!
//! ```text
//! Anthems
//!     001 Forever Blue
//!         📢: two claps
//!         Reference recording
//!     002 Stand Up
//!
//! Missing songs
//!     Anthems: s9
//! ```
//!
//! ## Song
//!
//! ```text
//! Forever Blue (page 1)
//!     📢: two claps
//!     Reference: https://audio.example/1
//!
//!     Blue is the colour...
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure.

use crate::attachments::{ResolvedAttachment, Route};
use crate::layout::{ImageLayoutPlan, TileGeometry};
use crate::markup::{self, SpanKind};
use crate::post::{PostAction, PostContent};
use crate::songbook::{CurrentSong, SongIndex};
use crate::toc::{self, TableOfContents};
use serde_json::Value;

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Format an entity header: positional index + title, with optional detail.
///
/// ```text
/// 001 Forever Blue
/// 001 Club News · 5 minutes ago
/// ```
fn entity_header(index: usize, title: &str, detail: Option<&str>) -> String {
    match detail {
        Some(d) => format!("{} {} · {}", format_index(index), title, d),
        None => format!("{} {}", format_index(index), title),
    }
}

fn compact_json(value: &impl serde::Serialize) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

fn route_label(route: &Route) -> String {
    match route {
        Route::Player { player_id } => format!("player {player_id}"),
        Route::SingleSong { song_id } => format!("song {song_id}"),
        Route::RosterList { roster_id } => format!("roster {roster_id}"),
    }
}

/// Best human label for an inline payload: a known title-ish field, else JSON.
fn payload_label(value: &Value) -> String {
    ["nickname", "caption", "title", "name"]
        .iter()
        .find_map(|key| value.get(key).and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| compact_json(value))
}

// ============================================================================
// Post output
// ============================================================================

/// Format one attachment line (without index).
///
/// Unresolved attachments render as the fallback line with the original
/// reference as JSON.
pub fn attachment_line(attachment: &ResolvedAttachment) -> String {
    let body = match attachment {
        ResolvedAttachment::Player(player) => match player.number {
            Some(n) => format!("player {} #{}", player.name, n),
            None => format!("player {}", player.name),
        },
        ResolvedAttachment::Song(song) => format!("song {}", song.title),
        ResolvedAttachment::GkNickname(data) => format!("gknickname {}", payload_label(data)),
        ResolvedAttachment::MassTweet(roster) => {
            format!("masstweet {} ({} handles)", roster.name, roster.handles.len())
        }
        ResolvedAttachment::Juanstagram(data) => format!("juanstagram {}", payload_label(data)),
        ResolvedAttachment::Unknown { reference, .. } => {
            return format!("Can't render attachment {}", compact_json(reference));
        }
    };
    match attachment.route() {
        Some(route) => format!("{body} → {}", route_label(&route)),
        None => body,
    }
}

fn image_lines(plan: &ImageLayoutPlan) -> Vec<String> {
    let mode = compact_json(&plan.mode).trim_matches('"').to_string();
    let mut lines = vec![format!(
        "{}Images: {} ({}{})",
        indent(1),
        mode,
        plan.tiles.len(),
        if plan.scrollable { ", scrollable" } else { "" }
    )];
    for tile in &plan.tiles {
        let fit = match &tile.geometry {
            TileGeometry::FullWidth { width } => format!("{width:.1}px wide"),
            TileGeometry::Square { size, .. } => format!("{size:.1}px square"),
        };
        lines.push(format!(
            "{}{} {} ({})",
            indent(2),
            format_index(tile.index + 1),
            tile.url,
            fit
        ));
    }
    lines
}

/// Format an assembled post as it appears at `index` (1-based) in a feed.
pub fn format_post(index: usize, post: &PostContent) -> Vec<String> {
    let header = &post.header;
    let title = if header.channel_name.is_empty() {
        header.channel_id.as_str()
    } else {
        header.channel_name.as_str()
    };
    let mut first = entity_header(index, title, Some(header.published.text()));
    if header.push {
        first.push_str(" [push]");
    }

    let mut lines = vec![first, format!("{}Avatar: {}", indent(1), header.avatar)];

    let text = markup::visible_text(&post.spans);
    if !text.is_empty() {
        lines.push(format!("{}Text: {}", indent(1), text));
    }
    for span in &post.spans {
        if matches!(span.kind, SpanKind::Url | SpanKind::Email)
            && let Some(target) = span.link_target()
        {
            lines.push(format!("{}Link: {}", indent(1), target));
        }
    }

    if let Some(plan) = &post.images {
        lines.extend(image_lines(plan));
    }

    if !post.attachments.is_empty() {
        lines.push(format!("{}Attachments", indent(1)));
        for (i, attachment) in post.attachments.iter().enumerate() {
            lines.push(format!(
                "{}{} {}",
                indent(2),
                format_index(i + 1),
                attachment_line(attachment)
            ));
        }
    }

    if !post.actions.is_empty() {
        let actions: Vec<&str> = post
            .actions
            .iter()
            .map(|a| match a {
                PostAction::Hide => "hide",
            })
            .collect();
        lines.push(format!("{}Actions: {}", indent(1), actions.join(", ")));
    }

    lines
}

/// Format a whole feed, posts separated by blank lines.
pub fn format_feed(posts: &[PostContent]) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, post) in posts.iter().enumerate() {
        if i > 0 {
            lines.push(String::new());
        }
        lines.extend(format_post(i + 1, post));
    }
    lines
}

pub fn print_feed(posts: &[PostContent]) {
    for line in format_feed(posts) {
        println!("{}", line);
    }
}

// ============================================================================
// Songbook output
// ============================================================================

/// Format the table of contents, one block per section, then any songs the
/// chapters referenced but the collection lacks.
pub fn format_toc(
    contents: &TableOfContents,
    songs: &SongIndex,
    capo_prefix: &str,
) -> Vec<String> {
    let mut lines = Vec::new();

    for (i, section) in contents.sections.iter().enumerate() {
        if i > 0 {
            lines.push(String::new());
        }
        lines.push(section.title.clone());
        for row in toc::section_rows(section, songs, capo_prefix) {
            lines.push(format!(
                "{}{}",
                indent(1),
                entity_header(row.page as usize, &row.title, None)
            ));
            if let Some(capo) = &row.capo_label {
                lines.push(format!("{}{}", indent(2), capo));
            }
            if row.playable {
                lines.push(format!("{}Reference recording", indent(2)));
            }
            if row.has_sheet_music {
                lines.push(format!("{}Sheet music", indent(2)));
            }
        }
    }

    if !contents.warnings.is_empty() {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push("Missing songs".to_string());
        for warning in &contents.warnings {
            lines.push(format!(
                "{}{}: {}",
                indent(1),
                warning.chapter_title,
                warning.song_id
            ));
        }
    }

    lines
}

pub fn print_toc(contents: &TableOfContents, songs: &SongIndex, capo_prefix: &str) {
    for line in format_toc(contents, songs, capo_prefix) {
        println!("{}", line);
    }
}

/// Format the song view for the current song.
pub fn format_song(current: &CurrentSong, capo_prefix: &str) -> Vec<String> {
    let song = &current.song;
    let mut lines = vec![match current.page {
        Some(page) => format!("{} (page {})", song.title, page),
        None => song.title.clone(),
    }];
    if let Some(capo) = song.capo_signal.as_deref().filter(|c| !c.is_empty()) {
        lines.push(format!("{}{}{}", indent(1), capo_prefix, capo));
    }
    if let Some(link) = &song.reference_link {
        lines.push(format!("{}Reference: {}", indent(1), link));
    }
    if let Some(link) = &song.sheet_music_link {
        lines.push(format!("{}Sheet music: {}", indent(1), link));
    }
    if let Some(lyrics) = song.lyrics.as_deref().filter(|l| !l.trim().is_empty()) {
        lines.push(String::new());
        lines.extend(lyrics.lines().map(|l| format!("{}{}", indent(1), l)));
    }
    lines
}

pub fn print_song(current: &CurrentSong, capo_prefix: &str) {
    for line in format_song(current, capo_prefix) {
        println!("{}", line);
    }
}
