//! Song lookup, current-song navigation and the songbook cover reveal.
//!
//! ## Lookup
//!
//! [`SongIndex`] owns the canonical song collection and indexes it by id
//! (first occurrence wins). It offers two lookups with different contracts:
//!
//! - [`SongIndex::get`] is the soft lookup used while building a table of
//!   contents; a miss is an ordinary `None`.
//! - [`SongIndex::lookup`] is for navigation callers, who should already hold
//!   a valid id; a miss is a [`NavigationError::NotFound`].
//!
//! ## Cover reveal
//!
//! The songbook opens on a cover the first time it is shown:
//!
//! ```text
//! mount ──(cover seen)──────────────────────────→ ShowingContents
//!   └──(not seen)→ ShowingCover ──(delay fires)──→ ShowingContents + persist seen
//!                        └──(teardown)→ timer cancelled, nothing else happens
//! ```
//!
//! The delay is a [`OneShot`] the host's event loop polls through
//! [`CoverReveal::tick`]. Ticking after [`CoverReveal::teardown`] does nothing.

use crate::services::AppStateFlag;
use crate::toc::TocEntry;
use crate::types::SongRecord;
use serde::Serialize;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    #[error("Song not found: {0}")]
    NotFound(String),
}

/// Canonical song collection indexed by id.
#[derive(Debug, Clone, Default)]
pub struct SongIndex {
    songs: Vec<SongRecord>,
    by_id: HashMap<String, usize>,
}

impl SongIndex {
    pub fn new(songs: Vec<SongRecord>) -> Self {
        let mut by_id = HashMap::with_capacity(songs.len());
        for (i, song) in songs.iter().enumerate() {
            by_id.entry(song.id.clone()).or_insert(i);
        }
        Self { songs, by_id }
    }

    pub fn get(&self, id: &str) -> Option<&SongRecord> {
        self.by_id.get(id).map(|&i| &self.songs[i])
    }

    pub fn lookup(&self, id: &str) -> Result<&SongRecord, NavigationError> {
        self.get(id)
            .ok_or_else(|| NavigationError::NotFound(id.to_string()))
    }

    pub fn songs(&self) -> &[SongRecord] {
        &self.songs
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }
}

/// The song open in the song view, with the page it was opened from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentSong {
    pub song: SongRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

/// Holds the single "current song" slot.
#[derive(Debug, Default)]
pub struct Navigator {
    current: Option<CurrentSong>,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&CurrentSong> {
        self.current.as_ref()
    }

    /// Replace the current song, then call `on_committed` once with the new value.
    pub fn set_current<F>(&mut self, song: CurrentSong, on_committed: F)
    where
        F: FnOnce(&CurrentSong),
    {
        let committed = self.current.insert(song);
        on_committed(committed);
    }

    /// Open the song behind a table-of-contents entry.
    pub fn select_entry<F>(
        &mut self,
        songs: &SongIndex,
        entry: &TocEntry,
        on_committed: F,
    ) -> Result<(), NavigationError>
    where
        F: FnOnce(&CurrentSong),
    {
        let song = songs.lookup(&entry.song_id)?.clone();
        self.set_current(
            CurrentSong {
                song,
                page: Some(entry.page),
            },
            on_committed,
        );
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TaskState {
    Pending,
    Fired,
    Cancelled,
}

/// A cancellable task that fires once, the first time it is polled at or
/// after its deadline.
#[derive(Debug, Clone)]
pub struct OneShot {
    deadline: Instant,
    state: TaskState,
}

impl OneShot {
    pub fn start(now: Instant, delay: Duration) -> Self {
        Self {
            deadline: now + delay,
            state: TaskState::Pending,
        }
    }

    /// Returns `true` exactly once: on the first poll past the deadline.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.state == TaskState::Pending && now >= self.deadline {
            self.state = TaskState::Fired;
            true
        } else {
            false
        }
    }

    /// Cancel a pending task. No effect once fired.
    pub fn cancel(&mut self) {
        if self.state == TaskState::Pending {
            self.state = TaskState::Cancelled;
        }
    }

    pub fn state(&self) -> TaskState {
        self.state
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CoverState {
    ShowingCover,
    ShowingContents,
}

/// Cover reveal state machine, owned by the songbook view.
#[derive(Debug)]
pub struct CoverReveal {
    state: CoverState,
    timer: Option<OneShot>,
}

impl CoverReveal {
    /// Mount the view. Starts the reveal timer unless the cover was already seen.
    pub fn mount(flag: &impl AppStateFlag, delay: Duration, now: Instant) -> Self {
        if flag.cover_seen() {
            Self {
                state: CoverState::ShowingContents,
                timer: None,
            }
        } else {
            debug!(delay_ms = delay.as_millis() as u64, "showing songbook cover");
            Self {
                state: CoverState::ShowingCover,
                timer: Some(OneShot::start(now, delay)),
            }
        }
    }

    pub fn state(&self) -> CoverState {
        self.state
    }

    /// Advance the timer. On fire, reveal the contents and persist the flag.
    pub fn tick(&mut self, flag: &mut impl AppStateFlag, now: Instant) -> CoverState {
        if let Some(timer) = self.timer.as_mut()
            && timer.poll(now)
        {
            self.state = CoverState::ShowingContents;
            flag.set_cover_seen(true);
            debug!("songbook cover dismissed");
        }
        self.state
    }

    /// The owning view is going away: cancel any pending reveal.
    pub fn teardown(&mut self) {
        if let Some(timer) = self.timer.as_mut() {
            timer.cancel();
        }
    }

    pub fn timer_state(&self) -> Option<TaskState> {
        self.timer.as_ref().map(OneShot::state)
    }
}
