// Shell session controller: owns the deck and the per-session services and
// mediates between UI intent (commands, location-bar input) on one side and
// the engine (navigation commands out, load events in) on the other.
//
// The embedder forwards every engine event into `handle_event` and every
// resolved keybinding into `handle_command`; everything else is plumbing
// the embedder reads back out to render.

use std::path::PathBuf;

use dashmap::DashMap;

use crate::engine::{Engine, EngineEvent};
use crate::history::HistoryStore;
use crate::modules::closed_frames::ClosedFrames;
use crate::modules::deck::Deck;
use crate::modules::keyboard::Command;
use crate::modules::location_bar::LocationBar;
use crate::modules::navigation;
use crate::modules::session_store;
use crate::modules::suggestions::SuggestionBox;
use crate::search::CompletionService;
use crate::settings::Settings;

const SUGGESTION_HISTORY_LIMIT: usize = 6;
const ZOOM_EPSILON: f64 = 1e-6;

pub struct Shell<E: Engine> {
    engine: E,
    deck: Deck,
    settings: Settings,
    history: HistoryStore,
    location_bar: LocationBar,
    suggestions: SuggestionBox,
    completions: CompletionService,
    closed_frames: ClosedFrames,
    /// Remembered zoom per host, re-applied whenever a frame lands there.
    site_zoom: DashMap<String, f64>,
    /// The frame currently shown by the engine: the previewed frame while
    /// cycling, the selected one otherwise.
    visible_id: Option<String>,
    data_dir: PathBuf,
}

impl<E: Engine> Shell<E> {
    /// Open a session rooted at `data_dir`, loading whatever settings,
    /// history and closed-frame state a previous session left there.
    pub fn new(engine: E, data_dir: PathBuf) -> Self {
        let settings = Settings::load(&data_dir);
        let history = HistoryStore::open(data_dir.clone());
        let closed_frames = ClosedFrames::load(&data_dir);
        Shell {
            engine,
            deck: Deck::new(),
            settings,
            history,
            location_bar: LocationBar::new(),
            suggestions: SuggestionBox::new(),
            completions: CompletionService::new(),
            closed_frames,
            site_zoom: DashMap::new(),
            visible_id: None,
            data_dir,
        }
    }

    // --- Accessors ---

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn location_bar(&self) -> &LocationBar {
        &self.location_bar
    }

    pub fn suggestions(&self) -> &SuggestionBox {
        &self.suggestions
    }

    pub fn closed_frames(&self) -> &ClosedFrames {
        &self.closed_frames
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn update_settings(&mut self, settings: Settings) {
        self.settings = settings;
        if let Err(e) = self.settings.save(&self.data_dir) {
            log::error!("[Shell] Failed to save settings: {}", e);
        }
    }

    // --- Visibility ---

    fn show_frame(&mut self, id: Option<String>) {
        if self.visible_id == id {
            return;
        }
        if let Some(old) = self.visible_id.take() {
            self.engine.set_visible(&old, false);
        }
        if let Some(new) = &id {
            self.engine.set_visible(new, true);
        }
        self.visible_id = id;
    }

    fn sync_chrome_to_selection(&mut self) {
        let url = self.deck.selected().map(|f| f.url.clone());
        self.location_bar.sync(url.as_deref().unwrap_or(""));
        let selected = self.deck.selected_id().map(|id| id.to_string());
        self.show_frame(selected);
    }

    // --- Opening and closing frames ---

    /// Open a frame from user input and select it.
    pub fn open_frame(&mut self, input: &str) -> String {
        let url = navigation::resolve_input(input, &self.settings);
        let id = self.deck.open(url.clone());
        if let Some(frame) = self.deck.get_mut(&id) {
            frame.pending_typed = true;
        }
        self.engine.create_frame(&id, &url);
        self.apply_site_zoom(&id);
        self.sync_chrome_to_selection();
        id
    }

    /// Open the configured homepage in a new selected frame.
    pub fn new_frame(&mut self) -> String {
        let url = self.settings.homepage.clone();
        let id = self.deck.open(url.clone());
        self.engine.create_frame(&id, &url);
        self.sync_chrome_to_selection();
        id
    }

    /// Open a frame without taking the selection, as for pages the content
    /// requested itself.
    pub fn open_background_frame(&mut self, url: &str) -> String {
        let was_empty = self.deck.is_empty();
        let id = self.deck.open_in_background(url.to_string());
        self.engine.create_frame(&id, url);
        if was_empty {
            self.sync_chrome_to_selection();
        }
        id
    }

    pub fn close_selected(&mut self) {
        if let Some(id) = self.deck.selected_id().map(|id| id.to_string()) {
            self.close_frame(&id, true);
        }
    }

    fn close_frame(&mut self, id: &str, destroy: bool) {
        let Some(frame) = self.deck.close(id) else {
            return;
        };
        self.closed_frames.archive(&frame);
        if let Err(e) = self.closed_frames.save(&self.data_dir) {
            log::error!("[ClosedFrames] Failed to persist archive: {}", e);
        }
        if destroy {
            self.engine.destroy_frame(id);
        }
        if self.visible_id.as_deref() == Some(id) {
            self.visible_id = None;
        }
        self.sync_chrome_to_selection();
    }

    /// Reopen the most recently closed frame and select it.
    pub fn restore_closed_frame(&mut self) -> Option<String> {
        let archived = self.closed_frames.pop()?;
        if let Err(e) = self.closed_frames.save(&self.data_dir) {
            log::error!("[ClosedFrames] Failed to persist archive: {}", e);
        }
        let id = self.deck.open(archived.url.clone());
        self.engine.create_frame(&id, &archived.url);
        self.sync_chrome_to_selection();
        Some(id)
    }

    // --- Selection ---

    pub fn select_frame(&mut self, id: &str) {
        if self.deck.select(id) {
            self.sync_chrome_to_selection();
        }
    }

    /// Preview the next frame in recency order. The selection commits when
    /// the cycling modifier is released.
    pub fn select_next(&mut self) {
        self.cycle(1);
    }

    pub fn select_previous(&mut self) {
        self.cycle(-1);
    }

    fn cycle(&mut self, offset: i64) {
        if self.deck.preview_by_offset(offset) {
            let previewed = self.deck.previewed_id().map(|id| id.to_string());
            if let Some(id) = &previewed {
                if let Some(frame) = self.deck.get(id) {
                    let url = frame.url.clone();
                    self.location_bar.sync(&url);
                }
            }
            self.show_frame(previewed);
        }
    }

    pub fn commit_selection(&mut self) {
        if self.deck.commit_preview() {
            self.sync_chrome_to_selection();
        }
    }

    // --- Navigation on the selected frame ---

    pub fn reload(&mut self, hard: bool) {
        if let Some(id) = self.deck.selected_id() {
            self.engine.reload(id, hard);
        }
    }

    pub fn stop_loading(&mut self) {
        if let Some(frame) = self.deck.selected() {
            if frame.is_loading {
                self.engine.stop(&frame.id);
            }
        }
    }

    pub fn go_back(&mut self) {
        if let Some(frame) = self.deck.selected() {
            if frame.can_go_back {
                self.engine.go_back(&frame.id);
            }
        }
    }

    pub fn go_forward(&mut self) {
        if let Some(frame) = self.deck.selected() {
            if frame.can_go_forward {
                self.engine.go_forward(&frame.id);
            }
        }
    }

    // --- Zoom ---

    pub fn zoom_in(&mut self) {
        self.change_zoom(|frame| frame.zoom_in());
    }

    pub fn zoom_out(&mut self) {
        self.change_zoom(|frame| frame.zoom_out());
    }

    pub fn reset_zoom(&mut self) {
        let host = self.selected_host();
        if let Some(host) = host {
            self.site_zoom.remove(&host);
        }
        if let Some(frame) = self.deck.selected_mut() {
            let zoom = frame.reset_zoom();
            let id = frame.id.clone();
            self.engine.set_zoom(&id, zoom);
        }
    }

    fn change_zoom(&mut self, apply: impl FnOnce(&mut crate::state::Frame) -> f64) {
        let Some(frame) = self.deck.selected_mut() else {
            return;
        };
        let zoom = apply(&mut *frame);
        let id = frame.id.clone();
        let host = navigation::host_of(&frame.url);
        self.engine.set_zoom(&id, zoom);
        if let Some(host) = host {
            self.site_zoom.insert(host, zoom);
        }
    }

    fn selected_host(&self) -> Option<String> {
        self.deck.selected().and_then(|f| navigation::host_of(&f.url))
    }

    /// Re-apply a remembered host zoom to a frame after it moved.
    fn apply_site_zoom(&mut self, id: &str) {
        let Some(frame) = self.deck.get_mut(id) else {
            return;
        };
        let Some(host) = navigation::host_of(&frame.url) else {
            return;
        };
        let Some(zoom) = self.site_zoom.get(&host).map(|z| *z) else {
            return;
        };
        if (frame.zoom - zoom).abs() > ZOOM_EPSILON {
            frame.zoom = zoom;
            self.engine.set_zoom(id, zoom);
        }
    }

    // --- Location bar and awesomebar ---

    /// Focus the location bar for editing, seeded with the current url.
    pub fn edit_location(&mut self) {
        let url = self
            .deck
            .selected()
            .map(|f| f.url.clone())
            .unwrap_or_default();
        self.location_bar.begin_edit(&url);
    }

    /// Apply typed input: updates the field and refreshes history
    /// suggestions. Engine completions are requested separately through
    /// `request_completions` so embedders control network traffic.
    pub fn input_location(&mut self, text: &str) {
        self.location_bar.input(text);
        self.suggestions.set_query(text);
        let query = self.suggestions.query().to_string();
        if query.is_empty() {
            self.completions.reset();
            return;
        }
        let scored = self.history.search(&query, SUGGESTION_HISTORY_LIMIT);
        self.suggestions.update_history(&scored);
    }

    /// Kick off a background completion fetch for the current query.
    pub fn request_completions(&self) {
        let query = self.suggestions.query();
        if !query.is_empty() {
            self.completions.request(self.settings.search_engine, query);
        }
    }

    /// Merge any completions that arrived since the last poll. Snapshots
    /// for superseded queries are ignored.
    pub fn poll_completions(&mut self) {
        let snapshot = self.completions.snapshot();
        if !snapshot.query.is_empty() && snapshot.query == self.suggestions.query() {
            self.suggestions
                .update_search_completions(&snapshot.completions, self.settings.search_engine);
        }
    }

    /// Commit the location bar: a highlighted suggestion wins over the
    /// typed text. Navigates the selected frame, or opens one if the deck
    /// is empty.
    pub fn submit_location(&mut self) {
        let url = match self.suggestions.selected() {
            Some(suggestion) => {
                let href = suggestion.href.clone();
                self.location_bar.cancel(&href);
                href
            }
            None => self.location_bar.submit(&self.settings),
        };
        self.suggestions.reset();
        self.completions.reset();

        match self.deck.selected_id().map(|id| id.to_string()) {
            Some(id) => {
                if let Some(frame) = self.deck.get_mut(&id) {
                    frame.pending_typed = true;
                }
                self.engine.navigate(&id, &url);
            }
            None => {
                self.open_frame(&url);
            }
        }
    }

    /// Escape: dismiss an edit in progress, otherwise stop the load.
    pub fn cancel(&mut self) {
        if self.location_bar.is_editing() {
            let url = self
                .deck
                .selected()
                .map(|f| f.url.clone())
                .unwrap_or_default();
            self.location_bar.cancel(&url);
            self.suggestions.reset();
            self.completions.reset();
        } else {
            self.stop_loading();
        }
    }

    // --- Commands ---

    pub fn handle_command(&mut self, command: Command) {
        match command {
            Command::OpenLocation => self.edit_location(),
            Command::NewFrame => {
                self.new_frame();
            }
            Command::CloseFrame => self.close_selected(),
            Command::RestoreFrame => {
                self.restore_closed_frame();
            }
            Command::SelectNext => self.select_next(),
            Command::SelectPrevious => self.select_previous(),
            Command::CommitSelection => self.commit_selection(),
            Command::Reload => self.reload(false),
            Command::HardReload => self.reload(true),
            Command::GoBack => self.go_back(),
            Command::GoForward => self.go_forward(),
            Command::ZoomIn => self.zoom_in(),
            Command::ZoomOut => self.zoom_out(),
            Command::ResetZoom => self.reset_zoom(),
            Command::Cancel => self.cancel(),
        }
    }

    // --- Engine events ---

    /// Apply one engine event to the frame it addresses. `now_ms` is the
    /// embedder's animation clock, consumed by the progress timeline.
    pub fn handle_event(&mut self, id: &str, event: EngineEvent, now_ms: u64) {
        match event {
            EngineEvent::LoadStart => {
                if let Some(frame) = self.deck.get_mut(id) {
                    frame.on_load_start(now_ms);
                }
            }
            EngineEvent::Connected => {
                if let Some(frame) = self.deck.get_mut(id) {
                    frame.on_connected(now_ms);
                }
            }
            EngineEvent::LoadEnd { success } => {
                let visit = match self.deck.get_mut(id) {
                    Some(frame) => {
                        frame.on_load_end(now_ms);
                        let typed = frame.pending_typed;
                        frame.pending_typed = false;
                        if success {
                            Some((frame.url.clone(), frame.title.clone(), typed))
                        } else {
                            None
                        }
                    }
                    None => None,
                };
                if let Some((url, title, typed)) = visit {
                    let title = (!title.is_empty()).then_some(title);
                    self.history.add_visit(&url, title.as_deref(), typed);
                }
            }
            EngineEvent::LocationChanged {
                url,
                can_go_back,
                can_go_forward,
            } => {
                let is_selected = self.deck.selected_id() == Some(id);
                if let Some(frame) = self.deck.get_mut(id) {
                    frame.on_location_changed(url.clone(), can_go_back, can_go_forward);
                }
                if is_selected {
                    self.location_bar.sync(&url);
                }
                self.apply_site_zoom(id);
            }
            EngineEvent::TitleChanged { title } => {
                if let Some(frame) = self.deck.get_mut(id) {
                    frame.on_title_changed(title);
                }
            }
            EngineEvent::IconChanged { href } => {
                if let Some(frame) = self.deck.get_mut(id) {
                    frame.on_icon_changed(href);
                }
            }
            EngineEvent::MetaChanged { name, content } => {
                if let Some(frame) = self.deck.get_mut(id) {
                    frame.on_meta_changed(&name, content);
                }
            }
            EngineEvent::SecurityChanged {
                state,
                extended_validation,
            } => {
                if let Some(frame) = self.deck.get_mut(id) {
                    frame.on_security_changed(state, extended_validation);
                }
            }
            EngineEvent::FirstPaint => {
                log::debug!("[Shell] First paint in {}", id);
            }
            EngineEvent::OpenWindow { url } => {
                self.open_background_frame(&url);
            }
            EngineEvent::Closed => {
                // The engine side is already gone, only the deck needs
                // cleaning up.
                self.close_frame(id, false);
            }
        }
    }

    /// Advance progress animations. Returns true while any frame still
    /// needs animation ticks.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        let mut animating = false;
        for frame in self.deck.frames_mut() {
            if frame.progress.is_animating() {
                frame.progress.tick(now_ms);
                animating |= frame.progress.is_animating();
            }
        }
        animating
    }

    // --- Session persistence ---

    pub fn persist_session(&self) {
        if let Err(e) = session_store::save(&self.data_dir, &self.deck) {
            log::error!("[Session] Failed to save snapshot: {}", e);
        }
    }

    /// Restore the previous session's frames, if enabled and present.
    /// Returns the number of frames restored.
    pub fn restore_session(&mut self) -> usize {
        if !self.settings.restore_session {
            return 0;
        }
        let Some(snapshot) = session_store::load(&self.data_dir) else {
            return 0;
        };
        let count = snapshot.frames.len();
        for frame in &snapshot.frames {
            self.engine.create_frame(&frame.id, &frame.url);
        }
        self.deck.restore(snapshot.frames, snapshot.selected_id);
        self.sync_chrome_to_selection();
        log::info!("[Session] Restored {} frames", count);
        count
    }
}
