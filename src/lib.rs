//! # Chantbook
//!
//! Content assembly for a supporter-club app: the feed, where the club posts
//! text, photos and attachments, and the songbook, a chaptered collection of
//! chants with a table of contents.
//!
//! # Architecture: Two Pipelines
//!
//! ```text
//! Feed      PostRecord ──► markup + layout + attachments ──► PostContent
//! Songbook  chapters   ──► toc::build ──► TableOfContents ──► Navigator
//! ```
//!
//! Both pipelines are pure functions over read-only inputs. Everything that
//! would otherwise be app-global (who is signed in, may they hide a post, has
//! the songbook cover been seen) is passed in explicitly through the traits in
//! [`services`] and the per-session [`context::Session`].
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`markup`] | Splits post text into plain, bold, italic, URL and email spans |
//! | [`attachments`] | Classifies attachment tags and resolves them against [`types::Collections`] |
//! | [`layout`] | Image layout plans (full width, pair, scrollable strip) and cover scaling |
//! | [`post`] | Assembles a post from the stages above; hide, link and copy effects |
//! | [`toc`] | Page-numbered table of contents and its display rows |
//! | [`songbook`] | Song index, current-song navigation, cover reveal timer |
//! | [`services`] | Host collaborator traits |
//! | [`context`] | Per-session state |
//! | [`types`] | Shared host records (`PostRecord`, `SongRecord`, ...) |
//! | [`config`] | `config.toml` loading, environment overlays, validation |
//! | [`telemetry`] | `tracing` subscriber setup |
//! | [`input`] | JSON loading for the command-line host |
//! | [`output`] | CLI text formatting |
//!
//! # Design Decisions
//!
//! ## Misses Are Values, Not Errors
//!
//! An attachment pointing at a deleted player, or a chapter listing a song the
//! collection no longer has, is ordinary data drift. Resolution records the
//! miss ([`attachments::ResolvedAttachment::Unknown`], [`toc::TocWarning`]),
//! logs a warning and carries on. Only a direct by-id song lookup returns an
//! error.
//!
//! ## Pages Live Beside Songs
//!
//! Page numbers belong to a table of contents, not to a song. The collection
//! is never written to; [`toc::TocEntry`] pairs an id with its page.
//!
//! ## The Cover Timer Is Polled
//!
//! The songbook cover reveal is a deadline the host checks from its own loop
//! ([`songbook::CoverReveal::tick`]). Tearing the view down cancels it, and a
//! tick after that is a no-op.

pub mod attachments;
pub mod config;
pub mod context;
pub mod input;
pub mod layout;
pub mod markup;
pub mod output;
pub mod post;
pub mod services;
pub mod songbook;
pub mod telemetry;
pub mod toc;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
