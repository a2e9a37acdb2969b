// Frame state: the shell's model of one browser tab.
// Pure data plus the patch methods applied in response to engine events.
// No engine or I/O imports here so everything is unit testable.

use serde::{Deserialize, Serialize};

use crate::modules::progress::LoadProgress;

pub const ZOOM_MIN: f64 = 0.5;
pub const ZOOM_MAX: f64 = 2.0;
pub const ZOOM_STEP: f64 = 0.1;

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SecurityState {
    Insecure,
    Secure,
    Broken,
}

impl Default for SecurityState {
    fn default() -> Self {
        Self::Insecure
    }
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, Default, PartialEq, Eq)]
pub struct SecurityInfo {
    pub state: SecurityState,
    pub extended_validation: bool,
}

impl SecurityInfo {
    pub fn is_secure(&self) -> bool {
        self.state == SecurityState::Secure
    }
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct Frame {
    pub id: String,
    pub url: String,
    pub title: String,
    pub favicon: Option<String>,
    pub theme_color: Option<String>,
    pub is_loading: bool,
    pub security: SecurityInfo,
    pub zoom: f64,
    pub can_go_back: bool,
    pub can_go_forward: bool,
    pub thumbnail: Option<String>,
    /// Recency stamp minted by the deck on selection. Not persisted, a
    /// restored session starts with a fresh recency order.
    #[serde(skip)]
    pub last_selected: u64,
    #[serde(skip)]
    pub progress: LoadProgress,
    /// Set when the pending load was typed into the location bar, so the
    /// visit can be recorded with a typed boost once it lands.
    #[serde(skip)]
    pub pending_typed: bool,
}

impl Frame {
    pub fn new(id: String, url: String) -> Self {
        Frame {
            id,
            url,
            title: String::new(),
            favicon: None,
            theme_color: None,
            is_loading: false,
            security: SecurityInfo::default(),
            zoom: 1.0,
            can_go_back: false,
            can_go_forward: false,
            thumbnail: None,
            last_selected: 0,
            progress: LoadProgress::default(),
            pending_typed: false,
        }
    }

    /// A new document started loading. Page state from the previous document
    /// is stale at this point: title, favicon, theme color and security all
    /// reset until the new document reports its own.
    pub fn on_load_start(&mut self, now_ms: u64) {
        self.is_loading = true;
        self.title.clear();
        self.favicon = None;
        self.theme_color = None;
        self.thumbnail = None;
        self.security = SecurityInfo::default();
        self.progress.start(now_ms);
    }

    /// First response data arrived (the connection phase is over).
    pub fn on_connected(&mut self, now_ms: u64) {
        self.progress.connect(now_ms);
    }

    pub fn on_load_end(&mut self, now_ms: u64) {
        self.is_loading = false;
        self.progress.finish(now_ms);
    }

    pub fn on_location_changed(&mut self, url: String, can_go_back: bool, can_go_forward: bool) {
        self.url = url;
        self.can_go_back = can_go_back;
        self.can_go_forward = can_go_forward;
    }

    pub fn on_title_changed(&mut self, title: String) {
        self.title = title;
    }

    /// First icon reported after a load start wins. Engines fire the icon
    /// event once per icon link and the first one is the page's preferred
    /// icon.
    pub fn on_icon_changed(&mut self, href: String) {
        if self.favicon.is_none() {
            self.favicon = Some(href);
        }
    }

    pub fn on_meta_changed(&mut self, name: &str, content: String) {
        if name == "theme-color" {
            self.theme_color = Some(content);
        }
    }

    pub fn on_security_changed(&mut self, state: SecurityState, extended_validation: bool) {
        self.security = SecurityInfo {
            state,
            extended_validation,
        };
    }

    /// Displayed title: falls back to the url when the page has none.
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            &self.url
        } else {
            &self.title
        }
    }

    pub fn zoom_in(&mut self) -> f64 {
        self.zoom = (self.zoom + ZOOM_STEP).min(ZOOM_MAX);
        self.zoom
    }

    pub fn zoom_out(&mut self) -> f64 {
        self.zoom = (self.zoom - ZOOM_STEP).max(ZOOM_MIN);
        self.zoom
    }

    pub fn reset_zoom(&mut self) -> f64 {
        self.zoom = 1.0;
        self.zoom
    }
}
