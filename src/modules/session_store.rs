// Session snapshots: the deck serialized to disk so a restart reopens the
// same frames with the same selection.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::modules::deck::Deck;
use crate::modules::storage::{self, StoreError};
use crate::state::Frame;

pub const SESSION_FILE: &str = "session.json";

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// RFC 3339 save time, informational only.
    pub saved_at: String,
    pub frames: Vec<Frame>,
    pub selected_id: Option<String>,
}

pub fn path_in(data_dir: &Path) -> PathBuf {
    data_dir.join(SESSION_FILE)
}

pub fn save(data_dir: &Path, deck: &Deck) -> Result<(), StoreError> {
    let snapshot = SessionSnapshot {
        saved_at: chrono::Utc::now().to_rfc3339(),
        frames: deck.frames().to_vec(),
        selected_id: deck.selected_id().map(|id| id.to_string()),
    };
    storage::write_json(&path_in(data_dir), &snapshot)
}

/// Load the last snapshot. `None` when there is none or it is unreadable,
/// which both mean a fresh session.
pub fn load(data_dir: &Path) -> Option<SessionSnapshot> {
    match storage::read_json(&path_in(data_dir)) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            log::warn!("[Session] Ignoring unreadable snapshot: {}", e);
            None
        }
    }
}
