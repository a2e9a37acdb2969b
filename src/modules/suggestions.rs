// Awesomebar suggestion box: merges search-engine completions and history
// matches into one ranked dropdown, tracks the keyboard selection, and
// offers an inline completion for strong history prefix matches.
//
// At most MAX_RESULTS entries are visible. Neither source may starve the
// other: each is capped at half the box, but may spill into slots the
// other side left unused.

use crate::history::ScoredEntry;
use crate::search::SearchEngine;

pub const MAX_RESULTS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionKind {
    Search,
    History,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub kind: SuggestionKind,
    pub text: String,
    pub href: String,
}

/// Inline (ghost text) completion: the typed part plus the remainder of
/// the best matching history url.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    pub hint: String,
}

#[derive(Debug)]
pub struct SuggestionBox {
    query: String,
    entries: Vec<Suggestion>,
    /// Index into `entries`, or -1 while the input text itself is active.
    selected: isize,
    completion: Option<Completion>,
}

impl Default for SuggestionBox {
    fn default() -> Self {
        Self::new()
    }
}

impl SuggestionBox {
    pub fn new() -> Self {
        SuggestionBox {
            query: String::new(),
            entries: Vec::new(),
            selected: -1,
            completion: None,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn entries(&self) -> &[Suggestion] {
        &self.entries
    }

    pub fn completion(&self) -> Option<&Completion> {
        self.completion.as_ref()
    }

    pub fn is_open(&self) -> bool {
        !self.entries.is_empty()
    }

    /// Start a new query. An empty query closes the box entirely; a changed
    /// one drops entries computed for the previous text.
    pub fn set_query(&mut self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            self.reset();
            return;
        }
        if query != self.query {
            self.entries.clear();
        }
        self.query = query.to_string();
        self.selected = -1;
        self.completion = None;
    }

    pub fn reset(&mut self) {
        self.query.clear();
        self.entries.clear();
        self.selected = -1;
        self.completion = None;
    }

    fn kept(&self, kind: SuggestionKind) -> Vec<Suggestion> {
        self.entries
            .iter()
            .filter(|e| e.kind == kind)
            .cloned()
            .collect()
    }

    /// Rebuild the box: history matches on top, search completions below,
    /// each side capped so the other keeps at least half the slots it can
    /// fill.
    fn rebalance(&mut self, mut history: Vec<Suggestion>, mut search: Vec<Suggestion>) {
        let history_count = history
            .len()
            .min(MAX_RESULTS - search.len().min(MAX_RESULTS / 2));
        let search_count = search.len().min(MAX_RESULTS - history_count);
        history.truncate(history_count);
        search.truncate(search_count);
        history.extend(search);
        self.entries = history;
        self.clamp_selection();
    }

    /// Replace the search half of the box with fresh engine completions.
    pub fn update_search_completions(&mut self, completions: &[String], engine: SearchEngine) {
        let search: Vec<Suggestion> = completions
            .iter()
            .map(|text| Suggestion {
                kind: SuggestionKind::Search,
                text: text.clone(),
                href: engine.query_url(text),
            })
            .collect();
        let history = self.kept(SuggestionKind::History);
        self.rebalance(history, search);
    }

    /// Replace the history half of the box with scored store matches, and
    /// derive the inline completion from the best ghost candidate.
    pub fn update_history(&mut self, scored: &[ScoredEntry]) {
        let history: Vec<Suggestion> = scored
            .iter()
            .map(|entry| Suggestion {
                kind: SuggestionKind::History,
                text: if entry.title.is_empty() {
                    entry.url.clone()
                } else {
                    entry.title.clone()
                },
                href: entry.url.clone(),
            })
            .collect();
        let search = self.kept(SuggestionKind::Search);
        self.rebalance(history, search);

        self.completion = scored
            .iter()
            .filter(|entry| entry.is_ghost_candidate)
            .find_map(|entry| ghost_completion(&self.query, &entry.url));
    }

    fn clamp_selection(&mut self) {
        if self.selected >= self.entries.len() as isize {
            self.selected = -1;
        }
    }

    // --- Keyboard selection ---

    pub fn selected_index(&self) -> Option<usize> {
        usize::try_from(self.selected).ok()
    }

    pub fn selected(&self) -> Option<&Suggestion> {
        self.selected_index().and_then(|i| self.entries.get(i))
    }

    /// Step down through the list; past the end returns to the input text.
    pub fn select_next(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        self.selected += 1;
        if self.selected >= self.entries.len() as isize {
            self.selected = -1;
        }
    }

    /// Step up through the list; above the input text wraps to the bottom.
    pub fn select_previous(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        self.selected -= 1;
        if self.selected < -1 {
            self.selected = self.entries.len() as isize - 1;
        }
    }
}

/// Inline completion for a typed prefix of a remembered url. Matches on
/// the schemeless form so "goo" completes against "https://google.com/".
fn ghost_completion(query: &str, url: &str) -> Option<Completion> {
    let schemeless = url
        .trim_start_matches("https://")
        .trim_start_matches("http://");
    let lowered = schemeless.to_lowercase();
    let query_lower = query.to_lowercase();
    if query_lower.is_empty() || !lowered.starts_with(&query_lower) {
        return None;
    }
    let hint = schemeless.get(query.len()..)?.trim_end_matches('/');
    Some(Completion {
        text: query.to_string(),
        hint: hint.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(url: &str, title: &str, ghost: bool) -> ScoredEntry {
        ScoredEntry {
            url: url.to_string(),
            title: title.to_string(),
            score: 0,
            is_ghost_candidate: ghost,
        }
    }

    fn completions(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("query {}", i)).collect()
    }

    #[test]
    fn search_fills_empty_box_up_to_max() {
        let mut sbox = SuggestionBox::new();
        sbox.set_query("query");
        sbox.update_search_completions(&completions(10), SearchEngine::DuckDuckGo);
        assert_eq!(sbox.entries().len(), MAX_RESULTS);
        assert!(sbox.entries().iter().all(|e| e.kind == SuggestionKind::Search));
    }

    #[test]
    fn each_source_is_capped_at_half_when_both_are_full() {
        let mut sbox = SuggestionBox::new();
        sbox.set_query("site");
        sbox.update_search_completions(&completions(10), SearchEngine::DuckDuckGo);
        let history: Vec<ScoredEntry> = (0..10)
            .map(|i| scored(&format!("https://site-{}.test/", i), "", false))
            .collect();
        sbox.update_history(&history);

        let history_count = sbox
            .entries()
            .iter()
            .filter(|e| e.kind == SuggestionKind::History)
            .count();
        assert_eq!(sbox.entries().len(), MAX_RESULTS);
        assert_eq!(history_count, MAX_RESULTS / 2);
    }

    #[test]
    fn sparse_side_yields_slots_to_the_other() {
        let mut sbox = SuggestionBox::new();
        sbox.set_query("site");
        sbox.update_search_completions(&completions(1), SearchEngine::DuckDuckGo);
        let history: Vec<ScoredEntry> = (0..10)
            .map(|i| scored(&format!("https://site-{}.test/", i), "", false))
            .collect();
        sbox.update_history(&history);

        let history_count = sbox
            .entries()
            .iter()
            .filter(|e| e.kind == SuggestionKind::History)
            .count();
        assert_eq!(history_count, MAX_RESULTS - 1);
    }

    #[test]
    fn search_href_uses_engine_query_url() {
        let mut sbox = SuggestionBox::new();
        sbox.set_query("rust");
        sbox.update_search_completions(&["rust lang".to_string()], SearchEngine::DuckDuckGo);
        assert_eq!(
            sbox.entries()[0].href,
            "https://duckduckgo.com/?q=rust%20lang"
        );
    }

    #[test]
    fn history_text_prefers_title() {
        let mut sbox = SuggestionBox::new();
        sbox.set_query("docs");
        sbox.update_history(&[
            scored("https://docs.rs/", "Docs.rs", false),
            scored("https://docs.example.test/", "", false),
        ]);
        assert_eq!(sbox.entries()[0].text, "Docs.rs");
        assert_eq!(sbox.entries()[1].text, "https://docs.example.test/");
    }

    #[test]
    fn selection_cycles_through_entries_and_input() {
        let mut sbox = SuggestionBox::new();
        sbox.set_query("q");
        sbox.update_search_completions(&completions(2), SearchEngine::DuckDuckGo);

        assert_eq!(sbox.selected_index(), None);
        sbox.select_next();
        assert_eq!(sbox.selected_index(), Some(0));
        sbox.select_next();
        assert_eq!(sbox.selected_index(), Some(1));
        sbox.select_next();
        assert_eq!(sbox.selected_index(), None);
        sbox.select_previous();
        assert_eq!(sbox.selected_index(), Some(1));
    }

    #[test]
    fn selection_is_clamped_when_entries_shrink() {
        let mut sbox = SuggestionBox::new();
        sbox.set_query("q");
        sbox.update_search_completions(&completions(4), SearchEngine::DuckDuckGo);
        for _ in 0..4 {
            sbox.select_next();
        }
        assert_eq!(sbox.selected_index(), Some(3));
        sbox.update_search_completions(&completions(1), SearchEngine::DuckDuckGo);
        assert_eq!(sbox.selected_index(), None);
    }

    #[test]
    fn ghost_completion_from_prefix_match() {
        let mut sbox = SuggestionBox::new();
        sbox.set_query("goo");
        sbox.update_history(&[scored("https://google.com/", "Google", true)]);
        let completion = sbox.completion().unwrap();
        assert_eq!(completion.text, "goo");
        assert_eq!(completion.hint, "gle.com");
    }

    #[test]
    fn no_ghost_completion_without_candidates() {
        let mut sbox = SuggestionBox::new();
        sbox.set_query("example");
        sbox.update_history(&[scored("https://other.test/example", "", false)]);
        assert!(sbox.completion().is_none());
    }

    #[test]
    fn empty_query_resets_the_box() {
        let mut sbox = SuggestionBox::new();
        sbox.set_query("q");
        sbox.update_search_completions(&completions(3), SearchEngine::DuckDuckGo);
        sbox.select_next();
        sbox.set_query("   ");
        assert!(!sbox.is_open());
        assert_eq!(sbox.selected_index(), None);
        assert!(sbox.entries().is_empty());
    }
}
