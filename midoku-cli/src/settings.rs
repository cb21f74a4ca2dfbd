//! CLI settings (library database location).
//!
//! The settings file is `~/.config/midoku/settings.toml`:
//!
//! ```toml
//! [library]
//! database = "/home/me/audiobooks/library.db"
//! ```

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct Settings {
    #[serde(default)]
    pub library: LibrarySettings,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct LibrarySettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<PathBuf>,
}

/// Canonical path to the settings file: `~/.config/midoku/settings.toml`.
pub(crate) fn settings_path() -> PathBuf {
    let config = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config.join("midoku").join("settings.toml")
}

/// Default library database: `<data dir>/midoku/library.db`.
pub(crate) fn default_database_path() -> PathBuf {
    let data = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    data.join("midoku").join("library.db")
}

impl Settings {
    /// Read settings from `path`. A missing file yields the defaults.
    pub(crate) fn load_from(path: &Path) -> io::Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e),
        };
        toml::from_str(&contents).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    pub(crate) fn load() -> io::Result<Self> {
        Self::load_from(&settings_path())
    }

    /// Write settings to `path` atomically.
    pub(crate) fn save_to(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let serialized = toml::to_string_pretty(self).map_err(io::Error::other)?;
        let tmp = path.with_extension("toml.tmp");
        std::fs::write(&tmp, &serialized)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    pub(crate) fn save(&self) -> io::Result<()> {
        self.save_to(&settings_path())
    }

    /// Resolve the library database using a priority chain:
    ///
    /// 1. CLI override (if `Some`)
    /// 2. Saved `library.database`
    /// 3. [`default_database_path`]
    pub(crate) fn resolve_database(&self, cli_override: Option<PathBuf>) -> PathBuf {
        cli_override
            .or_else(|| self.library.database.clone())
            .unwrap_or_else(default_database_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("settings.toml")).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.resolve_database(None), default_database_path());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.toml");

        let mut settings = Settings::default();
        settings.library.database = Some(PathBuf::from("/srv/books/library.db"));
        settings.save_to(&path).unwrap();

        assert!(!path.with_extension("toml.tmp").exists());
        let loaded = Settings::load_from(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn parses_library_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[library]\ndatabase = \"/tmp/books.db\"\n").unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(
            settings.resolve_database(None),
            PathBuf::from("/tmp/books.db")
        );
    }

    #[test]
    fn cli_override_wins() {
        let mut settings = Settings::default();
        settings.library.database = Some(PathBuf::from("saved.db"));
        assert_eq!(
            settings.resolve_database(Some(PathBuf::from("flag.db"))),
            PathBuf::from("flag.db")
        );
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[library\n").unwrap();
        assert!(Settings::load_from(&path).is_err());
    }
}
