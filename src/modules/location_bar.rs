// Location bar: the editable field that mirrors the selected frame's url
// until the user starts editing, then holds their input until it is
// submitted or cancelled.

use crate::modules::navigation;
use crate::settings::Settings;

#[derive(Debug, Default)]
pub struct LocationBar {
    value: String,
    is_editing: bool,
    /// Set once the user has typed. A dirty field is never overwritten by
    /// engine location updates.
    is_dirty: bool,
    /// Whether the whole value is selected, as after focusing the field.
    select_all: bool,
}

impl LocationBar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_editing(&self) -> bool {
        self.is_editing
    }

    pub fn has_selection(&self) -> bool {
        self.select_all
    }

    /// Mirror a frame url into the field. Ignored while the user is
    /// editing so their input survives page-driven location changes.
    pub fn sync(&mut self, frame_url: &str) {
        if self.is_editing && self.is_dirty {
            return;
        }
        self.value = frame_url.to_string();
    }

    /// Enter edit mode seeded with the frame url, fully selected so typing
    /// replaces it.
    pub fn begin_edit(&mut self, frame_url: &str) {
        self.value = frame_url.to_string();
        self.is_editing = true;
        self.is_dirty = false;
        self.select_all = true;
    }

    /// Apply user input.
    pub fn input(&mut self, text: &str) {
        self.value = text.to_string();
        self.is_editing = true;
        self.is_dirty = true;
        self.select_all = false;
    }

    /// Commit the field: resolve the text to a navigable url and leave
    /// edit mode.
    pub fn submit(&mut self, settings: &Settings) -> String {
        let resolved = navigation::resolve_input(&self.value, settings);
        self.is_editing = false;
        self.is_dirty = false;
        self.select_all = false;
        self.value = resolved.clone();
        resolved
    }

    /// Abandon the edit and fall back to the frame url.
    pub fn cancel(&mut self, frame_url: &str) {
        self.value = frame_url.to_string();
        self.is_editing = false;
        self.is_dirty = false;
        self.select_all = false;
    }
}
