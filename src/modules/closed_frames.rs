// Closed-frame archive: a capped LIFO stack of recently closed frames so
// they can be reopened, persisted as a JSON snapshot.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::modules::storage::{self, StoreError};
use crate::state::Frame;

pub const MAX_CLOSED_FRAMES: usize = 25;
pub const CLOSED_FRAMES_FILE: &str = "closed_frames.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClosedFrame {
    pub url: String,
    pub title: String,
    pub favicon: Option<String>,
    /// Unix timestamp in seconds.
    pub closed_at: u64,
}

impl From<&Frame> for ClosedFrame {
    fn from(frame: &Frame) -> Self {
        ClosedFrame {
            url: frame.url.clone(),
            title: frame.title.clone(),
            favicon: frame.favicon.clone(),
            closed_at: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ClosedFrames {
    frames: VecDeque<ClosedFrame>,
}

impl ClosedFrames {
    pub fn path_in(data_dir: &Path) -> PathBuf {
        data_dir.join(CLOSED_FRAMES_FILE)
    }

    /// Load the archive from `data_dir`, empty when missing or broken.
    pub fn load(data_dir: &Path) -> Self {
        match storage::read_json(&Self::path_in(data_dir)) {
            Ok(Some(archive)) => archive,
            Ok(None) => Self::default(),
            Err(e) => {
                log::warn!("[ClosedFrames] Starting empty: {}", e);
                Self::default()
            }
        }
    }

    pub fn save(&self, data_dir: &Path) -> Result<(), StoreError> {
        storage::write_json(&Self::path_in(data_dir), self)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Push a closed frame. The oldest entry is evicted past the cap.
    pub fn archive(&mut self, frame: &Frame) {
        self.frames.push_back(ClosedFrame::from(frame));
        if self.frames.len() > MAX_CLOSED_FRAMES {
            self.frames.pop_front();
        }
        log::info!("[ClosedFrames] Archived {:?} at {}", frame.title, frame.url);
    }

    /// Pop the most recently closed frame.
    pub fn pop(&mut self) -> Option<ClosedFrame> {
        self.frames.pop_back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClosedFrame> {
        self.frames.iter()
    }
}
