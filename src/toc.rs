//! Songbook table of contents.
//!
//! A songbook is a list of chapters, each listing songs by id. The table of
//! contents flattens that hierarchy into page-numbered entries grouped by
//! chapter:
//!
//! ```text
//! chapters                      songs {1, 3}          table of contents
//! A: [1, 2]              →                       →    A: 1 (p1)
//! B: [3]                                              B: 3 (p2)
//!                                                     warning: A / 2
//! ```
//!
//! ## Rules
//!
//! - One page counter runs across the whole book, starting at 1.
//! - Only songs found in the collection consume a page. A missing id is
//!   recorded as a [`TocWarning`] and numbering continues without a gap.
//! - A chapter with no resolvable songs is left out entirely.
//!
//! Entries pair a song id with its page. The canonical [`SongRecord`] is never
//! written to, so building twice over one collection gives identical results.

use crate::songbook::SongIndex;
use crate::types::{Chapter, SongRecord};
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    pub song_id: String,
    pub page: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocSection {
    pub title: String,
    pub entries: Vec<TocEntry>,
}

/// A chapter referenced a song the collection doesn't have.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocWarning {
    pub chapter_title: String,
    pub song_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableOfContents {
    pub sections: Vec<TocSection>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<TocWarning>,
}

impl TableOfContents {
    /// All entries in page order.
    pub fn entries(&self) -> impl Iterator<Item = &TocEntry> {
        self.sections.iter().flat_map(|s| s.entries.iter())
    }

    /// Number of numbered pages (resolved songs).
    pub fn page_count(&self) -> usize {
        self.entries().count()
    }

    /// First page a song appears on.
    pub fn page_of(&self, song_id: &str) -> Option<u32> {
        self.entries().find(|e| e.song_id == song_id).map(|e| e.page)
    }
}

/// Build the table of contents for `chapters` against the song collection.
pub fn build(chapters: &[Chapter], songs: &SongIndex) -> TableOfContents {
    let mut toc = TableOfContents::default();
    let mut page = 1u32;

    for chapter in chapters {
        let mut entries = Vec::new();

        for song_ref in &chapter.songs {
            if songs.get(&song_ref.id).is_some() {
                entries.push(TocEntry {
                    song_id: song_ref.id.clone(),
                    page,
                });
                page += 1;
            } else {
                warn!(
                    chapter = %chapter.title,
                    song_id = %song_ref.id,
                    "song not found in songs collection"
                );
                toc.warnings.push(TocWarning {
                    chapter_title: chapter.title.clone(),
                    song_id: song_ref.id.clone(),
                });
            }
        }

        if !entries.is_empty() {
            toc.sections.push(TocSection {
                title: chapter.title.clone(),
                entries,
            });
        }
    }

    toc
}

/// Display data for one table-of-contents row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SongRow {
    pub song_id: String,
    pub title: String,
    /// Capo signal with its prefix, e.g. `"📢: clap twice"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capo_label: Option<String>,
    /// A reference recording exists (play marker).
    pub playable: bool,
    /// Sheet music exists (score marker).
    pub has_sheet_music: bool,
    pub page: u32,
}

impl SongRow {
    /// Compose a row from an entry and its canonical song.
    pub fn compose(entry: &TocEntry, song: &SongRecord, capo_prefix: &str) -> Self {
        Self {
            song_id: entry.song_id.clone(),
            title: song.title.clone(),
            capo_label: song
                .capo_signal
                .as_deref()
                .filter(|s| !s.is_empty())
                .map(|s| format!("{capo_prefix}{s}")),
            playable: song.reference_link.as_deref().is_some_and(|l| !l.is_empty()),
            has_sheet_music: song
                .sheet_music_link
                .as_deref()
                .is_some_and(|l| !l.is_empty()),
            page: entry.page,
        }
    }
}

/// Rows for one section, skipping entries whose song has since disappeared.
pub fn section_rows(section: &TocSection, songs: &SongIndex, capo_prefix: &str) -> Vec<SongRow> {
    section
        .entries
        .iter()
        .filter_map(|entry| {
            songs
                .get(&entry.song_id)
                .map(|song| SongRow::compose(entry, song, capo_prefix))
        })
        .collect()
}
