// Frame deck: the ordered collection of open frames plus the selection and
// preview pointers. Pure logic, no engine or I/O imports.
//
// Selection recency drives frame cycling (control-tab walks frames in
// most-recently-selected order) and the choice of a successor when the
// selected frame is closed. Recency stamps come from a monotonic counter
// owned by the deck.

use crate::state::Frame;

pub struct Deck {
    frames: Vec<Frame>,
    selected_id: Option<String>,
    previewed_id: Option<String>,
    next_id: u64,
    clock: u64,
}

impl Default for Deck {
    fn default() -> Self {
        Self::new()
    }
}

impl Deck {
    pub fn new() -> Self {
        Deck {
            frames: Vec::new(),
            selected_id: None,
            previewed_id: None,
            next_id: 0,
            clock: 0,
        }
    }

    fn mint_id(&mut self) -> String {
        self.next_id += 1;
        format!("frame-{}", self.next_id)
    }

    fn bump_clock(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn index_of(&self, id: &str) -> Option<usize> {
        self.frames.iter().position(|f| f.id == id)
    }

    // --- Accessors ---

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn frames_mut(&mut self) -> impl Iterator<Item = &mut Frame> {
        self.frames.iter_mut()
    }

    pub fn get(&self, id: &str) -> Option<&Frame> {
        self.frames.iter().find(|f| f.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Frame> {
        self.frames.iter_mut().find(|f| f.id == id)
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected_id.as_deref()
    }

    pub fn previewed_id(&self) -> Option<&str> {
        self.previewed_id.as_deref()
    }

    pub fn selected(&self) -> Option<&Frame> {
        self.selected_id.as_deref().and_then(|id| self.get(id))
    }

    pub fn selected_mut(&mut self) -> Option<&mut Frame> {
        let id = self.selected_id.clone()?;
        self.get_mut(&id)
    }

    /// Frame ids in most-recently-selected order. Never-selected frames keep
    /// their deck order at the tail.
    pub fn recency_order(&self) -> Vec<String> {
        let mut ordered: Vec<&Frame> = self.frames.iter().collect();
        ordered.sort_by(|a, b| b.last_selected.cmp(&a.last_selected));
        ordered.into_iter().map(|f| f.id.clone()).collect()
    }

    /// The id `offset` positions away from `from` in recency order, with
    /// wraparound in both directions.
    fn relative_of(&self, from: &str, offset: i64) -> Option<String> {
        let ordered = self.recency_order();
        let len = ordered.len() as i64;
        if len == 0 {
            return None;
        }
        let position = ordered.iter().position(|id| id == from)? as i64;
        let index = (position + offset).rem_euclid(len);
        Some(ordered[index as usize].clone())
    }

    // --- Opening ---

    /// Open a frame and select it. The preview pointer follows the new
    /// selection only when it previously coincided with it.
    pub fn open(&mut self, url: String) -> String {
        let id = self.mint_id();
        let preview_follows = self.previewed_id == self.selected_id;
        let stamp = self.bump_clock();
        let mut frame = Frame::new(id.clone(), url);
        frame.last_selected = stamp;
        self.frames.push(frame);
        self.selected_id = Some(id.clone());
        if preview_follows {
            self.previewed_id = Some(id.clone());
        }
        id
    }

    /// Open a frame without selecting it. An empty deck still selects the
    /// new frame since selection is none only while the deck is empty.
    pub fn open_in_background(&mut self, url: String) -> String {
        if self.is_empty() {
            return self.open(url);
        }
        let id = self.mint_id();
        self.frames.push(Frame::new(id.clone(), url));
        id
    }

    // --- Selection ---

    /// Select a frame by id, stamping its recency. Returns true when the
    /// selection changed.
    pub fn select(&mut self, id: &str) -> bool {
        if self.index_of(id).is_none() || self.selected_id.as_deref() == Some(id) {
            return false;
        }
        let stamp = self.bump_clock();
        if let Some(frame) = self.get_mut(id) {
            frame.last_selected = stamp;
        }
        self.selected_id = Some(id.to_string());
        self.previewed_id = Some(id.to_string());
        true
    }

    pub fn select_by_index(&mut self, index: usize) -> bool {
        match self.frames.get(index) {
            Some(frame) => {
                let id = frame.id.clone();
                self.select(&id)
            }
            None => false,
        }
    }

    /// Move the selection `offset` steps through the recency order, with
    /// wraparound. Positive offsets walk toward less recently used frames.
    pub fn select_by_offset(&mut self, offset: i64) -> bool {
        let from = match self.selected_id.clone() {
            Some(id) => id,
            None => return false,
        };
        match self.relative_of(&from, offset) {
            Some(target) => self.select(&target),
            None => false,
        }
    }

    // --- Preview ---

    pub fn preview(&mut self, id: &str) -> bool {
        if self.index_of(id).is_none() {
            return false;
        }
        self.previewed_id = Some(id.to_string());
        true
    }

    pub fn preview_by_index(&mut self, index: usize) -> bool {
        match self.frames.get(index) {
            Some(frame) => {
                let id = frame.id.clone();
                self.preview(&id)
            }
            None => false,
        }
    }

    pub fn preview_by_offset(&mut self, offset: i64) -> bool {
        let from = match self.previewed_id.clone().or_else(|| self.selected_id.clone()) {
            Some(id) => id,
            None => return false,
        };
        match self.relative_of(&from, offset) {
            Some(target) => self.preview(&target),
            None => false,
        }
    }

    /// Commit the previewed frame as the selection.
    pub fn commit_preview(&mut self) -> bool {
        match self.previewed_id.clone() {
            Some(id) => self.select(&id),
            None => false,
        }
    }

    // --- Closing ---

    /// Remove a frame and return it. When the selected frame is closed the
    /// selection moves to its recency sibling: the next less recently used
    /// frame, or the next more recently used one when the closed frame was
    /// already the least recent.
    pub fn close(&mut self, id: &str) -> Option<Frame> {
        let index = self.index_of(id)?;

        let successor = if self.selected_id.as_deref() == Some(id) {
            let ordered = self.recency_order();
            if ordered.last().map(String::as_str) == Some(id) {
                self.relative_of(id, -1)
            } else {
                self.relative_of(id, 1)
            }
        } else {
            self.selected_id.clone()
        };

        let removed = self.frames.remove(index);

        // A single-frame deck yields itself as sibling, which is now gone.
        let successor = successor.filter(|s| s.as_str() != id && self.index_of(s).is_some());

        if self.frames.is_empty() {
            self.selected_id = None;
            self.previewed_id = None;
        } else {
            self.selected_id = successor.or_else(|| self.frames.first().map(|f| f.id.clone()));
            if self.previewed_id.as_deref() == Some(id) {
                self.previewed_id = self.selected_id.clone();
            }
        }

        Some(removed)
    }

    // --- Reordering ---

    /// Rebuild the deck order from a list of ids. Ids missing from the list
    /// keep their frames, appended at the tail so nothing is lost. Returns
    /// whether the order actually changed.
    pub fn reorder(&mut self, new_order: &[String]) -> bool {
        if self.frames.is_empty() || new_order.is_empty() {
            return false;
        }

        let old_order: Vec<&str> = self.frames.iter().map(|f| f.id.as_str()).collect();
        let changed = {
            let known: Vec<&str> = new_order
                .iter()
                .map(String::as_str)
                .filter(|id| old_order.contains(id))
                .collect();
            let rest: Vec<&str> = old_order
                .iter()
                .copied()
                .filter(|id| !known.contains(id))
                .collect();
            let target: Vec<&str> = known.into_iter().chain(rest).collect();
            target != old_order
        };
        if !changed {
            return false;
        }

        let mut pool: Vec<Frame> = self.frames.drain(..).collect();
        let mut reordered = Vec::with_capacity(pool.len());
        for id in new_order {
            if let Some(position) = pool.iter().position(|f| &f.id == id) {
                reordered.push(pool.remove(position));
            }
        }
        reordered.extend(pool);
        self.frames = reordered;
        true
    }

    // --- Session restore ---

    /// Rebuild the deck from persisted frames. Recency starts fresh, the
    /// id counter resumes past the highest restored id.
    pub fn restore(&mut self, frames: Vec<Frame>, selected: Option<String>) {
        self.frames = frames;
        self.next_id = self
            .frames
            .iter()
            .filter_map(|f| f.id.strip_prefix("frame-"))
            .filter_map(|n| n.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        self.selected_id = None;
        self.previewed_id = None;
        let target = selected
            .filter(|id| self.index_of(id).is_some())
            .or_else(|| self.frames.first().map(|f| f.id.clone()));
        if let Some(id) = target {
            self.select(&id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deck_of(urls: &[&str]) -> Deck {
        let mut deck = Deck::new();
        for url in urls {
            deck.open((*url).to_string());
        }
        deck
    }

    #[test]
    fn open_selects_and_stamps() {
        let mut deck = Deck::new();
        let a = deck.open("https://a.test/".to_string());
        let b = deck.open("https://b.test/".to_string());
        assert_eq!(deck.selected_id(), Some(b.as_str()));
        assert_eq!(deck.previewed_id(), Some(b.as_str()));
        assert!(deck.get(&a).unwrap().last_selected < deck.get(&b).unwrap().last_selected);
    }

    #[test]
    fn open_in_background_keeps_selection() {
        let mut deck = deck_of(&["https://a.test/"]);
        let selected = deck.selected_id().unwrap().to_string();
        let bg = deck.open_in_background("https://b.test/".to_string());
        assert_eq!(deck.selected_id(), Some(selected.as_str()));
        assert_eq!(deck.get(&bg).unwrap().last_selected, 0);
    }

    #[test]
    fn background_open_on_empty_deck_selects() {
        let mut deck = Deck::new();
        let id = deck.open_in_background("https://a.test/".to_string());
        assert_eq!(deck.selected_id(), Some(id.as_str()));
    }

    #[test]
    fn recency_order_is_most_recent_first() {
        let mut deck = deck_of(&["https://a.test/", "https://b.test/", "https://c.test/"]);
        deck.select("frame-1");
        assert_eq!(
            deck.recency_order(),
            vec!["frame-1".to_string(), "frame-3".to_string(), "frame-2".to_string()]
        );
    }

    #[test]
    fn select_by_offset_wraps_through_recency_order() {
        let mut deck = deck_of(&["https://a.test/", "https://b.test/", "https://c.test/"]);
        // Recency: frame-3 (selected), frame-2, frame-1.
        assert!(deck.select_by_offset(1));
        assert_eq!(deck.selected_id(), Some("frame-2"));
        // frame-2 is now most recent; two steps forward wraps around.
        assert!(deck.select_by_offset(2));
        assert_eq!(deck.selected_id(), Some("frame-1"));
        // Negative offsets wrap to the least recently used end.
        assert!(deck.select_by_offset(-1));
        assert_eq!(deck.selected_id(), Some("frame-3"));
    }

    #[test]
    fn closing_selected_picks_next_in_recency_order() {
        let mut deck = deck_of(&["https://a.test/", "https://b.test/", "https://c.test/"]);
        deck.select("frame-2");
        // Recency: frame-2, frame-3, frame-1. Closing frame-2 moves the
        // selection to frame-3, the next less recently used.
        deck.close("frame-2");
        assert_eq!(deck.selected_id(), Some("frame-3"));
    }

    #[test]
    fn closing_selected_in_two_frame_deck_picks_the_other() {
        let mut deck = deck_of(&["https://a.test/", "https://b.test/"]);
        deck.select("frame-1");
        // Recency: frame-1, frame-2.
        deck.close("frame-1");
        assert_eq!(deck.selected_id(), Some("frame-2"));
        assert_eq!(deck.previewed_id(), Some("frame-2"));
    }

    #[test]
    fn closing_unselected_keeps_selection() {
        let mut deck = deck_of(&["https://a.test/", "https://b.test/", "https://c.test/"]);
        deck.close("frame-1");
        assert_eq!(deck.selected_id(), Some("frame-3"));
        assert_eq!(deck.len(), 2);
    }

    #[test]
    fn closing_last_frame_empties_the_deck() {
        let mut deck = deck_of(&["https://a.test/"]);
        let removed = deck.close("frame-1").unwrap();
        assert_eq!(removed.url, "https://a.test/");
        assert!(deck.is_empty());
        assert_eq!(deck.selected_id(), None);
        assert_eq!(deck.previewed_id(), None);
    }

    #[test]
    fn close_unknown_id_is_a_noop() {
        let mut deck = deck_of(&["https://a.test/"]);
        assert!(deck.close("frame-99").is_none());
        assert_eq!(deck.len(), 1);
    }

    #[test]
    fn preview_does_not_stamp_until_committed() {
        let mut deck = deck_of(&["https://a.test/", "https://b.test/", "https://c.test/"]);
        assert!(deck.preview_by_offset(1));
        assert_eq!(deck.previewed_id(), Some("frame-2"));
        assert_eq!(deck.selected_id(), Some("frame-3"));

        assert!(deck.preview_by_offset(1));
        assert_eq!(deck.previewed_id(), Some("frame-1"));

        assert!(deck.commit_preview());
        assert_eq!(deck.selected_id(), Some("frame-1"));
        assert_eq!(deck.recency_order()[0], "frame-1");
    }

    #[test]
    fn reorder_moves_frames() {
        let mut deck = deck_of(&["https://a.test/", "https://b.test/", "https://c.test/"]);
        let order = vec![
            "frame-3".to_string(),
            "frame-1".to_string(),
            "frame-2".to_string(),
        ];
        assert!(deck.reorder(&order));
        let ids: Vec<&str> = deck.frames().iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["frame-3", "frame-1", "frame-2"]);
        // Selection tracks ids, not positions.
        assert_eq!(deck.selected_id(), Some("frame-3"));
    }

    #[test]
    fn reorder_appends_missing_ids() {
        let mut deck = deck_of(&["https://a.test/", "https://b.test/", "https://c.test/"]);
        let order = vec!["frame-3".to_string(), "frame-1".to_string()];
        assert!(deck.reorder(&order));
        let ids: Vec<&str> = deck.frames().iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["frame-3", "frame-1", "frame-2"]);
        assert_eq!(deck.len(), 3);
    }

    #[test]
    fn reorder_same_order_reports_no_change() {
        let mut deck = deck_of(&["https://a.test/", "https://b.test/"]);
        let order = vec!["frame-1".to_string(), "frame-2".to_string()];
        assert!(!deck.reorder(&order));
    }

    #[test]
    fn reorder_ignores_unknown_ids() {
        let mut deck = deck_of(&["https://a.test/", "https://b.test/"]);
        let order = vec![
            "frame-2".to_string(),
            "frame-77".to_string(),
            "frame-1".to_string(),
        ];
        assert!(deck.reorder(&order));
        let ids: Vec<&str> = deck.frames().iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["frame-2", "frame-1"]);
    }

    #[test]
    fn restore_resumes_id_counter() {
        let mut deck = Deck::new();
        let frames = vec![
            Frame::new("frame-4".to_string(), "https://a.test/".to_string()),
            Frame::new("frame-7".to_string(), "https://b.test/".to_string()),
        ];
        deck.restore(frames, Some("frame-7".to_string()));
        assert_eq!(deck.selected_id(), Some("frame-7"));
        let fresh = deck.open("https://c.test/".to_string());
        assert_eq!(fresh, "frame-8");
    }

    #[test]
    fn restore_with_stale_selection_falls_back_to_first() {
        let mut deck = Deck::new();
        let frames = vec![Frame::new("frame-2".to_string(), "https://a.test/".to_string())];
        deck.restore(frames, Some("frame-9".to_string()));
        assert_eq!(deck.selected_id(), Some("frame-2"));
    }
}
