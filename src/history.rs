// Visit history: an in-memory index over an append-only JSON-lines log,
// plus the frecency scoring that ranks awesomebar candidates.
//
// The log stores full entry snapshots in chronological order, so loading
// merges by overwrite and the newest snapshot of a url wins. compact()
// rewrites the log to one line per url.

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

pub const HISTORY_LOG_FILE: &str = "history.log";

// Scoring weights. Prefix matches dominate everything else, typed urls
// beat merely visited ones, and staleness bleeds score away day by day.
const PREFIX_SCORE: u64 = 5_000;
const SUBSTRING_SCORE: u64 = 100;
const TYPED_WEIGHT: u64 = 500;
const VISIT_WEIGHT: u64 = 10;
const RECENCY_BASE: u64 = 1_000;
const RECENCY_DAILY_PENALTY: u64 = 10;
const SECONDS_PER_DAY: u64 = 86_400;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history log i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("history entry serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct HistoryEntry {
    pub url: String,
    pub title: String,
    /// Unix timestamp in seconds.
    pub last_visit: u64,
    pub visit_count: u64,
    pub typed_count: u64,
}

/// A history entry ranked against a query.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ScoredEntry {
    pub url: String,
    pub title: String,
    pub score: u64,
    /// Strong prefix matches qualify for inline (ghost text) completion.
    pub is_ghost_candidate: bool,
}

pub struct HistoryStore {
    index: Mutex<HashMap<String, HistoryEntry>>,
    log_path: PathBuf,
}

impl HistoryStore {
    /// Open the store in `data_dir`, replaying any existing log.
    pub fn open(data_dir: PathBuf) -> Self {
        fs::create_dir_all(&data_dir).ok();
        let store = HistoryStore {
            index: Mutex::new(HashMap::new()),
            log_path: data_dir.join(HISTORY_LOG_FILE),
        };
        if let Err(e) = store.replay_log() {
            log::warn!("[History] Starting empty, log replay failed: {}", e);
        }
        store
    }

    fn replay_log(&self) -> Result<(), HistoryError> {
        if !self.log_path.exists() {
            return Ok(());
        }
        let reader = BufReader::new(fs::File::open(&self.log_path)?);
        let mut index = self.index.lock().unwrap();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<HistoryEntry>(&line) {
                Ok(entry) => {
                    index.insert(entry.url.clone(), entry);
                }
                Err(e) => log::warn!("[History] Skipping malformed log line: {}", e),
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.index.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Record a visit. `typed` marks navigations committed through the
    /// location bar, which weigh much more than link-following.
    pub fn add_visit(&self, url: &str, title: Option<&str>, typed: bool) {
        let normalized = normalize_url(url);
        let now = now_secs();

        let snapshot = {
            let mut index = self.index.lock().unwrap();
            let entry = index.entry(normalized.clone()).or_insert(HistoryEntry {
                url: normalized,
                title: String::new(),
                last_visit: 0,
                visit_count: 0,
                typed_count: 0,
            });
            entry.last_visit = now;
            entry.visit_count += 1;
            if typed {
                entry.typed_count += 1;
            }
            if let Some(title) = title {
                if !title.is_empty() {
                    entry.title = title.to_string();
                }
            }
            entry.clone()
        };

        // Appended outside the lock, one JSON line per visit.
        if let Err(e) = self.append_to_log(&snapshot) {
            log::error!("[History] Failed to append visit: {}", e);
        }
    }

    fn append_to_log(&self, entry: &HistoryEntry) -> Result<(), HistoryError> {
        let json = serde_json::to_string(entry)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)?;
        writeln!(file, "{}", json)?;
        Ok(())
    }

    /// Rank entries against `query`, best first, at most `limit` results.
    pub fn search(&self, query: &str, limit: usize) -> Vec<ScoredEntry> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }
        let now = now_secs();
        let index = self.index.lock().unwrap();

        let mut results: Vec<ScoredEntry> = index
            .values()
            .filter_map(|entry| score_entry(entry, &query, now))
            .collect();
        results.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.url.cmp(&b.url)));
        results.truncate(limit);
        results
    }

    /// Rewrite the log with one line per url. The log otherwise grows by
    /// one snapshot per visit forever.
    pub fn compact(&self) -> Result<(), HistoryError> {
        let index = self.index.lock().unwrap();
        let tmp_path = self.log_path.with_extension("log.tmp");
        {
            let mut file = fs::File::create(&tmp_path)?;
            for entry in index.values() {
                writeln!(file, "{}", serde_json::to_string(entry)?)?;
            }
            file.sync_all()?;
        }
        fs::rename(&tmp_path, &self.log_path)?;
        log::info!("[History] Compacted log to {} entries", index.len());
        Ok(())
    }
}

fn score_entry(entry: &HistoryEntry, query: &str, now: u64) -> Option<ScoredEntry> {
    let url_lower = entry.url.to_lowercase();
    let schemeless = url_lower
        .trim_start_matches("https://")
        .trim_start_matches("http://");
    let host = Url::parse(&entry.url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
        .unwrap_or_default();

    let is_prefix =
        schemeless.starts_with(query) || (!host.is_empty() && host.starts_with(query));

    let mut score = if is_prefix {
        PREFIX_SCORE
    } else if url_lower.contains(query) || entry.title.to_lowercase().contains(query) {
        SUBSTRING_SCORE
    } else {
        return None;
    };

    score += entry.typed_count * TYPED_WEIGHT;

    let age_days = now.saturating_sub(entry.last_visit) / SECONDS_PER_DAY;
    score += RECENCY_BASE.saturating_sub(age_days * RECENCY_DAILY_PENALTY);

    score += entry.visit_count * VISIT_WEIGHT;

    Some(ScoredEntry {
        url: entry.url.clone(),
        title: entry.title.clone(),
        score,
        is_ghost_candidate: is_prefix,
    })
}

fn normalize_url(url: &str) -> String {
    // Keep scheme, query and fragment; the parser's normalization (default
    // ports, trailing slash on roots) is enough to merge obvious duplicates.
    match Url::parse(url) {
        Ok(parsed) => parsed.to_string(),
        Err(_) => url.to_string(),
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, HistoryStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::open(dir.path().to_path_buf());
        (dir, store)
    }

    #[test]
    fn visits_accumulate() {
        let (_dir, store) = store();
        store.add_visit("https://example.com/", Some("Example"), false);
        store.add_visit("https://example.com/", None, true);
        assert_eq!(store.len(), 1);

        let results = store.search("example", 10);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Example");
    }

    #[test]
    fn prefix_match_beats_substring_match() {
        let (_dir, store) = store();
        store.add_visit("https://rust-lang.org/", Some("Rust"), false);
        store.add_visit("https://example.com/about-rust", Some("About"), false);

        let results = store.search("rust", 10);
        assert_eq!(results[0].url, "https://rust-lang.org/");
        assert!(results[0].is_ghost_candidate);
        assert!(!results[1].is_ghost_candidate);
        assert!(results[0].score > results[1].score);
    }

    #[test]
    fn typed_visits_outrank_plain_visits() {
        let (_dir, store) = store();
        store.add_visit("https://docs.rs/", Some("Docs"), false);
        store.add_visit("https://docs.rs/serde", Some("Serde"), true);

        let results = store.search("docs.rs", 10);
        assert_eq!(results[0].url, "https://docs.rs/serde");
    }

    #[test]
    fn title_substring_matches() {
        let (_dir, store) = store();
        store.add_visit("https://news.ycombinator.com/", Some("Hacker News"), false);
        let results = store.search("hacker", 10);
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn unrelated_entries_are_filtered() {
        let (_dir, store) = store();
        store.add_visit("https://example.com/", Some("Example"), false);
        assert!(store.search("zebra", 10).is_empty());
    }

    #[test]
    fn search_respects_limit() {
        let (_dir, store) = store();
        for i in 0..10 {
            store.add_visit(&format!("https://site-{}.test/", i), None, false);
        }
        assert_eq!(store.search("site", 3).len(), 3);
    }

    #[test]
    fn log_replays_across_restarts() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = HistoryStore::open(dir.path().to_path_buf());
            store.add_visit("https://example.com/", Some("Example"), true);
            store.add_visit("https://docs.rs/", Some("Docs"), false);
        }
        let reopened = HistoryStore::open(dir.path().to_path_buf());
        assert_eq!(reopened.len(), 2);
        let results = reopened.search("example", 10);
        assert_eq!(results[0].title, "Example");
    }

    #[test]
    fn compact_shrinks_log_and_preserves_entries() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::open(dir.path().to_path_buf());
        for _ in 0..5 {
            store.add_visit("https://example.com/", Some("Example"), false);
        }
        let before = std::fs::read_to_string(dir.path().join(HISTORY_LOG_FILE)).unwrap();
        assert_eq!(before.lines().count(), 5);

        store.compact().unwrap();
        let after = std::fs::read_to_string(dir.path().join(HISTORY_LOG_FILE)).unwrap();
        assert_eq!(after.lines().count(), 1);

        let reopened = HistoryStore::open(dir.path().to_path_buf());
        assert_eq!(reopened.search("example", 10)[0].title, "Example");
    }

    #[test]
    fn malformed_log_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = HistoryStore::open(dir.path().to_path_buf());
            store.add_visit("https://example.com/", None, false);
        }
        let path = dir.path().join(HISTORY_LOG_FILE);
        let mut content = std::fs::read_to_string(&path).unwrap();
        content.push_str("this is not json\n");
        std::fs::write(&path, content).unwrap();

        let reopened = HistoryStore::open(dir.path().to_path_buf());
        assert_eq!(reopened.len(), 1);
    }

    #[test]
    fn urls_are_normalized_before_merging() {
        let (_dir, store) = store();
        store.add_visit("https://example.com", None, false);
        store.add_visit("https://example.com/", None, false);
        assert_eq!(store.len(), 1);
    }
}
