//! Per-session state passed explicitly to the pipelines.
//!
//! A [`Session`] is built once when the user's session starts and dropped when
//! it ends. It replaces reads from a shared global store: the feed assembler
//! takes the signed-in user from here, and the songbook cover reveal reads and
//! writes the "cover seen" flag through it.

use crate::services::{AppStateFlag, SessionUser};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Session {
    pub user: Option<SessionUser>,
    pub cover_seen: bool,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn signed_in(user: SessionUser) -> Self {
        Self {
            user: Some(user),
            cover_seen: false,
        }
    }

    pub fn with_cover_seen(cover_seen: bool) -> Self {
        Self {
            user: None,
            cover_seen,
        }
    }
}

impl AppStateFlag for Session {
    fn cover_seen(&self) -> bool {
        self.cover_seen
    }

    fn set_cover_seen(&mut self, seen: bool) {
        self.cover_seen = seen;
    }
}
