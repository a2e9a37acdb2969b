// Shell settings: a JSON file with defaults for every missing or broken
// field source. The embedder decides where the file lives.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::modules::storage::{self, StoreError};
use crate::search::SearchEngine;

pub const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub homepage: String,
    pub search_engine: SearchEngine,
    pub https_only: bool,
    pub restore_session: bool,
    pub theme: String, // "dark", "light", "system"
    pub compact_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            homepage: "https://duckduckgo.com".to_string(),
            search_engine: SearchEngine::default(),
            https_only: true,
            restore_session: true,
            theme: "dark".to_string(),
            compact_mode: false,
        }
    }
}

impl Settings {
    pub fn path_in(data_dir: &Path) -> PathBuf {
        data_dir.join(SETTINGS_FILE)
    }

    /// Load settings from `data_dir`, falling back to defaults when the
    /// file is missing or unreadable.
    pub fn load(data_dir: &Path) -> Self {
        match storage::read_json(&Self::path_in(data_dir)) {
            Ok(Some(settings)) => settings,
            Ok(None) => Self::default(),
            Err(e) => {
                log::warn!("[Settings] Falling back to defaults: {}", e);
                Self::default()
            }
        }
    }

    pub fn save(&self, data_dir: &Path) -> Result<(), StoreError> {
        storage::write_json(&Self::path_in(data_dir), self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let settings = Settings::default();
        assert_eq!(settings.search_engine, SearchEngine::DuckDuckGo);
        assert!(settings.https_only);
        assert!(settings.restore_session);
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            homepage: "https://example.com".to_string(),
            search_engine: SearchEngine::Brave,
            https_only: false,
            restore_session: false,
            theme: "light".to_string(),
            compact_mode: true,
        };
        settings.save(dir.path()).unwrap();

        let loaded = Settings::load(dir.path());
        assert_eq!(loaded.homepage, "https://example.com");
        assert_eq!(loaded.search_engine, SearchEngine::Brave);
        assert!(!loaded.https_only);
        assert!(loaded.compact_mode);
    }

    #[test]
    fn broken_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(Settings::path_in(dir.path()), "}{").unwrap();
        let loaded = Settings::load(dir.path());
        assert_eq!(loaded.homepage, Settings::default().homepage);
    }
}
