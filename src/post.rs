//! Feed post assembly.
//!
//! Combines the three feed stages into one render-ready [`PostContent`]:
//!
//! ```text
//! PostRecord ─┬─ text ────────► markup::parse ─────────► spans
//!             ├─ images ──────► ImageLayoutPlanner ─────► image plan
//!             ├─ attachments ─► attachments::resolve_all ► attachments
//!             └─ channel ─────► ChannelDirectory ───────► header
//!                               PermissionService ──────► actions
//! ```
//!
//! Assembly reads from an [`AssemblyContext`] and never writes to it, so
//! [`assemble_feed`] can hand one context to every rayon worker.
//!
//! Effects (opening links, copying, hiding) are separate functions that take
//! the host collaborator they need, so assembling a post has no side effects.

use crate::attachments::{self, ResolvedAttachment};
use crate::config::AppConfig;
use crate::context::Session;
use crate::layout::{self, BorderStyle, ImageLayoutPlan, ImageLayoutPlanner};
use crate::markup::{self, TextSpan};
use crate::services::{
    ChannelDirectory, ChannelInfo, HostSinks, PermissionService, PostStore, StoreError,
};
use crate::types::{Collections, PostRecord};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

/// Presentation settings that don't change between posts.
#[derive(Debug, Clone, PartialEq)]
pub struct AssemblySettings {
    pub window_width: f64,
    pub margin_horizontal: f64,
    pub default_avatar: String,
    pub border: BorderStyle,
}

impl AssemblySettings {
    pub fn from_config(config: &AppConfig, window_width: f64) -> Self {
        Self {
            window_width,
            margin_horizontal: config.feed.margin_horizontal,
            default_avatar: config.feed.default_avatar.clone(),
            border: config.images.border(),
        }
    }

    pub fn container_width(&self) -> f64 {
        layout::container_width(self.window_width, self.margin_horizontal)
    }
}

/// Everything a post needs from outside itself.
#[derive(Clone, Copy)]
pub struct AssemblyContext<'a> {
    pub collections: &'a Collections,
    pub directory: &'a dyn ChannelDirectory,
    pub permissions: &'a dyn PermissionService,
    pub session: &'a Session,
    pub settings: &'a AssemblySettings,
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostHeader {
    pub channel_id: String,
    pub channel_name: String,
    /// Channel avatar, or the configured default when the channel has none.
    pub avatar: String,
    /// The post was also sent as a push notification.
    pub push: bool,
    pub published: PublishedLabel,
}

/// When a post was published, phrased for the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "style", content = "text", rename_all = "lowercase")]
pub enum PublishedLabel {
    /// Same calendar day as now, e.g. `"5 minutes ago"`.
    Relative(String),
    /// Any other day, e.g. `"3/7/24 9:05pm"`.
    Absolute(String),
}

impl PublishedLabel {
    pub fn text(&self) -> &str {
        match self {
            Self::Relative(text) | Self::Absolute(text) => text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PostAction {
    Hide,
}

/// A fully assembled feed post.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostContent {
    pub id: String,
    pub header: PostHeader,
    pub spans: Vec<TextSpan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<ImageLayoutPlan>,
    pub attachments: Vec<ResolvedAttachment>,
    pub actions: Vec<PostAction>,
}

/// Assemble one post.
pub fn assemble(post: &PostRecord, ctx: &AssemblyContext<'_>) -> PostContent {
    let planner = ImageLayoutPlanner::new(ctx.settings.border.clone());
    let content = PostContent {
        id: post.id.clone(),
        header: header(post, ctx),
        spans: markup::parse(&post.text),
        images: planner.plan(&post.images, ctx.settings.container_width()),
        attachments: attachments::resolve_all(&post.attachments, ctx.collections),
        actions: actions(post, ctx.session, ctx.permissions),
    };
    debug!(
        post_id = %content.id,
        spans = content.spans.len(),
        images = post.images.len(),
        attachments = content.attachments.len(),
        "assembled post"
    );
    content
}

/// Assemble many posts in parallel, keeping input order.
pub fn assemble_feed(posts: &[PostRecord], ctx: &AssemblyContext<'_>) -> Vec<PostContent> {
    let ctx = *ctx;
    posts.par_iter().map(|post| assemble(post, &ctx)).collect()
}

fn header(post: &PostRecord, ctx: &AssemblyContext<'_>) -> PostHeader {
    let channel = ctx.directory.basic_info(&post.channel).unwrap_or_else(|| {
        debug!(channel_id = %post.channel, "channel not in directory");
        ChannelInfo {
            id: post.channel.clone(),
            name: String::new(),
            avatar_url: None,
        }
    });
    let avatar = channel
        .avatar_url
        .filter(|url| !url.is_empty())
        .unwrap_or_else(|| ctx.settings.default_avatar.clone());

    PostHeader {
        channel_id: channel.id,
        channel_name: channel.name,
        avatar,
        push: post.push,
        published: published_label(post.published_at, ctx.now),
    }
}

/// Label a publish time relative to `now`.
///
/// Same UTC calendar day gives a relative phrase; anything else gives
/// `M/D/YY h:mma`.
pub fn published_label(published_at: DateTime<Utc>, now: DateTime<Utc>) -> PublishedLabel {
    if published_at.date_naive() == now.date_naive() {
        PublishedLabel::Relative(relative_phrase(now - published_at))
    } else {
        PublishedLabel::Absolute(published_at.format("%-m/%-d/%y %-I:%M%P").to_string())
    }
}

fn relative_phrase(elapsed: chrono::TimeDelta) -> String {
    let seconds = elapsed.num_seconds();
    if seconds < 0 {
        return "in a few seconds".to_string();
    }
    let minutes = (seconds as f64 / 60.0).round() as i64;
    let hours = (seconds as f64 / 3600.0).round() as i64;
    match seconds {
        0..45 => "a few seconds ago".to_string(),
        45..90 => "a minute ago".to_string(),
        90..2700 => format!("{minutes} minutes ago"),
        2700..5400 => "an hour ago".to_string(),
        5400..79200 => format!("{hours} hours ago"),
        _ => "a day ago".to_string(),
    }
}

/// Actions the session user may take on a post.
///
/// `Hide` needs a signed-in, feed-allowed user with delete permission on the
/// post's channel.
pub fn actions(
    post: &PostRecord,
    session: &Session,
    permissions: &dyn PermissionService,
) -> Vec<PostAction> {
    let Some(user) = session.user.as_ref().filter(|u| u.feed_allowed) else {
        return Vec::new();
    };
    if permissions
        .channel_permissions(&post.channel, &user.id)
        .can_delete
    {
        vec![PostAction::Hide]
    } else {
        Vec::new()
    }
}

/// Hide a post through the store.
pub fn hide(store: &dyn PostStore, post_id: &str) -> Result<(), StoreError> {
    store.hide(post_id)?;
    info!(post_id, "post hidden");
    Ok(())
}

/// Follow a tapped span. Returns whether the span was a link.
pub fn activate_span(span: &TextSpan, sinks: &dyn HostSinks) -> bool {
    match span.link_target() {
        Some(target) => {
            sinks.open_link(&target);
            true
        }
        None => false,
    }
}

/// Copy a post's raw text to the clipboard and confirm with a toast.
pub fn copy_text(post: &PostRecord, sinks: &dyn HostSinks, toast: &str) {
    sinks.write_clipboard(&post.text);
    sinks.toast(toast);
}
