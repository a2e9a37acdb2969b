// Search engines: query urls, completion endpoints, and the background
// completion fetcher feeding the awesomebar.
//
// Completion fetches run on short-lived worker threads. Results are
// published through an ArcSwap so the UI thread reads the latest snapshot
// lock-free, and a result whose query has been superseded by further typing
// is dropped instead of flashing stale suggestions.

use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SearchEngine {
    DuckDuckGo,
    Google,
    Bing,
    Brave,
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::DuckDuckGo
    }
}

impl SearchEngine {
    /// Url that submits `query` as a search.
    pub fn query_url(&self, query: &str) -> String {
        let q = urlencoding::encode(query);
        match self {
            Self::DuckDuckGo => format!("https://duckduckgo.com/?q={}", q),
            Self::Google => format!("https://google.com/search?q={}", q),
            Self::Bing => format!("https://bing.com/search?q={}", q),
            Self::Brave => format!("https://search.brave.com/search?q={}", q),
        }
    }

    /// Completion endpoint returning the `["query", ["a", "b", ...]]` wire
    /// shape every mainstream engine speaks.
    pub fn completions_url(&self, query: &str) -> String {
        let q = urlencoding::encode(query);
        match self {
            Self::DuckDuckGo => format!("https://duckduckgo.com/ac/?q={}&type=list", q),
            Self::Google => {
                format!("https://suggestqueries.google.com/complete/search?client=firefox&q={}", q)
            }
            Self::Bing => format!("https://api.bing.com/osjson.aspx?query={}", q),
            Self::Brave => format!("https://search.brave.com/api/suggest?q={}", q),
        }
    }
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("completion request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("malformed completion payload: {0}")]
    Payload(String),
}

/// Parse a completion payload: a two-element JSON array of the echoed query
/// and the suggestion list. Non-string entries are skipped.
pub fn parse_completion_payload(body: &str) -> Result<Vec<String>, SearchError> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| SearchError::Payload(e.to_string()))?;
    let list = value
        .get(1)
        .and_then(|v| v.as_array())
        .ok_or_else(|| SearchError::Payload("missing suggestion list".to_string()))?;
    Ok(list
        .iter()
        .filter_map(|entry| entry.as_str())
        .map(|s| s.to_string())
        .collect())
}

#[derive(Debug, Default, Clone)]
pub struct CompletionSnapshot {
    pub query: String,
    pub completions: Vec<String>,
}

pub struct CompletionService {
    latest: Arc<ArcSwap<CompletionSnapshot>>,
    current_query: Arc<Mutex<String>>,
}

impl Default for CompletionService {
    fn default() -> Self {
        Self::new()
    }
}

impl CompletionService {
    pub fn new() -> Self {
        CompletionService {
            latest: Arc::new(ArcSwap::from_pointee(CompletionSnapshot::default())),
            current_query: Arc::new(Mutex::new(String::new())),
        }
    }

    /// Latest published snapshot. Lock-free.
    pub fn snapshot(&self) -> Arc<CompletionSnapshot> {
        self.latest.load_full()
    }

    /// Drop any pending result and clear the published snapshot.
    pub fn reset(&self) {
        self.current_query.lock().unwrap().clear();
        self.latest.store(Arc::new(CompletionSnapshot::default()));
    }

    /// Kick off a background fetch for `query`. A previously requested
    /// query that has not landed yet is superseded and its result will be
    /// dropped on arrival.
    pub fn request(&self, engine: SearchEngine, query: &str) {
        *self.current_query.lock().unwrap() = query.to_string();

        let latest = Arc::clone(&self.latest);
        let current = Arc::clone(&self.current_query);
        let query = query.to_string();
        let url = engine.completions_url(&query);

        std::thread::spawn(move || {
            let completions = match fetch(&url) {
                Ok(completions) => completions,
                Err(e) => {
                    log::warn!("[Search] Completion fetch failed for {:?}: {}", query, e);
                    return;
                }
            };
            publish_if_current(&latest, &current, &query, completions);
        });
    }

    /// Record the query as current without spawning a network fetch.
    #[cfg(test)]
    pub(crate) fn request_marker(&self, query: &str) {
        *self.current_query.lock().unwrap() = query.to_string();
    }

    #[cfg(test)]
    pub(crate) fn publish(&self, query: &str, completions: Vec<String>) -> bool {
        publish_if_current(&self.latest, &self.current_query, query, completions)
    }
}

fn fetch(url: &str) -> Result<Vec<String>, SearchError> {
    let body = reqwest::blocking::get(url)?.error_for_status()?.text()?;
    parse_completion_payload(&body)
}

fn publish_if_current(
    latest: &ArcSwap<CompletionSnapshot>,
    current: &Mutex<String>,
    query: &str,
    completions: Vec<String>,
) -> bool {
    let current = current.lock().unwrap();
    if *current != query {
        log::debug!("[Search] Dropping stale completions for {:?}", query);
        return false;
    }
    latest.store(Arc::new(CompletionSnapshot {
        query: query.to_string(),
        completions,
    }));
    true
}
