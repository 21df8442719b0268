// SPDX-License-Identifier: MIT OR Apache-2.0
//! Import settings.
//!
//! Settings are stored as RON next to the exports being imported:
//! - Game name used to rewrite `<GameName>/Content` paths
//! - Host engine version, from which the host capabilities are resolved
//! - Batch behaviour (notifications, package saving)
//! - Property names that are never assigned

use crate::error::{ImportError, ImportResult};
use crate::host::HostCapabilities;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Current settings format version
pub const SETTINGS_FORMAT_VERSION: u32 = 1;

/// Settings file name
pub const SETTINGS_FILE_NAME: &str = "jsonport.ron";

/// Host engine version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineVersion {
    /// Major version
    pub major: u32,
    /// Minor version
    pub minor: u32,
}

impl EngineVersion {
    /// Create an engine version
    pub fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

impl Default for EngineVersion {
    fn default() -> Self {
        Self { major: 5, minor: 3 }
    }
}

impl std::fmt::Display for EngineVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Settings for one import session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    /// Format version
    pub version: u32,
    /// Game name; `<GameName>/Content` in object paths becomes `/Game`
    pub game_name: String,
    /// Host engine version
    pub engine: EngineVersion,
    /// Mark imported packages as saved
    pub save_packages_on_import: bool,
    /// Import only the first importable export of a batch and return its result
    pub hide_notifications: bool,
    /// Field names the deserializer never assigns
    pub property_blacklist: Vec<String>,
    /// Extra class redirects (old class name to new class name)
    pub class_redirects: IndexMap<String, String>,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_FORMAT_VERSION,
            game_name: String::new(),
            engine: EngineVersion::default(),
            save_packages_on_import: false,
            hide_notifications: false,
            property_blacklist: Vec::new(),
            class_redirects: IndexMap::new(),
        }
    }
}

impl ImportSettings {
    /// Create settings for a host engine version
    pub fn for_engine(major: u32, minor: u32) -> Self {
        Self {
            engine: EngineVersion::new(major, minor),
            ..Self::default()
        }
    }

    /// Load settings from a file
    pub fn load(path: &Path) -> ImportResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: ImportSettings =
            ron::from_str(&content).map_err(|e| ImportError::Settings(e.to_string()))?;

        if settings.version > SETTINGS_FORMAT_VERSION {
            return Err(ImportError::Settings(format!(
                "Settings version {} is newer than supported version {}",
                settings.version, SETTINGS_FORMAT_VERSION
            )));
        }

        Ok(settings)
    }

    /// Load settings, falling back to defaults when the file is absent
    pub fn load_or_default(path: &Path) -> ImportResult<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!("No settings at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Save settings to a file
    pub fn save(&self, path: &Path) -> ImportResult<()> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);

        let content = ron::ser::to_string_pretty(self, config)
            .map_err(|e| ImportError::Settings(e.to_string()))?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Settings file path for a directory
    pub fn settings_file_path(dir: &Path) -> PathBuf {
        dir.join(SETTINGS_FILE_NAME)
    }

    /// Host capabilities implied by the engine version
    pub fn capabilities(&self) -> HostCapabilities {
        HostCapabilities::from_engine(self.engine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = ImportSettings::default();
        assert_eq!(settings.version, SETTINGS_FORMAT_VERSION);
        assert_eq!(settings.engine, EngineVersion::new(5, 3));
        assert!(settings.capabilities().subgraphs);
    }

    #[test]
    fn test_serialization() {
        let mut settings = ImportSettings::for_engine(4, 27);
        settings.game_name = "Fortnite".to_string();
        settings.property_blacklist.push("LinkID".to_string());

        let ron_str = ron::ser::to_string_pretty(&settings, ron::ser::PrettyConfig::default()).unwrap();
        let loaded: ImportSettings = ron::from_str(&ron_str).unwrap();
        assert_eq!(loaded.game_name, "Fortnite");
        assert_eq!(loaded.engine.major, 4);
        assert!(!loaded.capabilities().subgraphs);
        assert_eq!(loaded.property_blacklist, vec!["LinkID".to_string()]);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let loaded: ImportSettings = ron::from_str("(game_name: \"Game\")").unwrap();
        assert_eq!(loaded.game_name, "Game");
        assert_eq!(loaded.engine, EngineVersion::default());
        assert!(!loaded.hide_notifications);
    }

    #[test]
    fn test_newer_version_rejected() {
        let dir = std::env::temp_dir().join(format!("jsonport-settings-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = ImportSettings::settings_file_path(&dir);

        let settings = ImportSettings {
            version: SETTINGS_FORMAT_VERSION + 1,
            ..ImportSettings::default()
        };
        settings.save(&path).unwrap();

        assert!(matches!(ImportSettings::load(&path), Err(ImportError::Settings(_))));
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
