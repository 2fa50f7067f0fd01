// Local UI preferences, persisted as a small TOML file.
//
// Values are re-applied at start-up. Anything that cannot be read falls back
// to the compiled-in defaults; there is no versioning or migration.

use std::{
    fs,
    path::PathBuf,
};

use anyhow::Context;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

/// Number of selectable background images.
pub const BACKGROUND_COUNT: usize = 4;

/// File names of the background images, indexed by `background_index`.
pub const BACKGROUND_IMAGES: [&str; BACKGROUND_COUNT] =
    ["Bg_pic.png", "Bg_pic2.png", "Bg_pic3.png", "Bg_pic4.png"];

// ── Voice mode ───────────────────────────────────────────────────────────────

/// TTS speaker preset, sent to the backend as 0, 1 or 2.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VoiceMode {
    #[default]
    Female,
    Male,
    Recitation,
}

impl VoiceMode {
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::Female),
            1 => Some(Self::Male),
            2 => Some(Self::Recitation),
            _ => None,
        }
    }

    pub fn index(self) -> u8 {
        match self {
            Self::Female => 0,
            Self::Male => 1,
            Self::Recitation => 2,
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Female => Self::Male,
            Self::Male => Self::Recitation,
            Self::Recitation => Self::Female,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Female => "female voice",
            Self::Male => "male voice",
            Self::Recitation => "recitation",
        }
    }
}

// ── Preferences ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preferences {
    pub sidebar_visible: bool,
    pub background_index: usize,
    pub voice_mode: VoiceMode,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            sidebar_visible: true,
            background_index: 0,
            voice_mode: VoiceMode::Female,
        }
    }
}

impl Preferences {
    pub fn background_image(&self) -> &'static str {
        BACKGROUND_IMAGES[self.background_index % BACKGROUND_COUNT]
    }

    pub fn next_background(&mut self) {
        self.background_index = (self.background_index + 1) % BACKGROUND_COUNT;
    }
}

/// On-disk shape.
#[derive(Debug, Serialize)]
struct StoredPreferences {
    sidebar_visible: bool,
    background_index: usize,
    voice_mode: u8,
}

impl From<Preferences> for StoredPreferences {
    fn from(p: Preferences) -> Self {
        Self {
            sidebar_visible: p.sidebar_visible,
            background_index: p.background_index,
            voice_mode: p.voice_mode.index(),
        }
    }
}

impl From<&toml::Table> for Preferences {
    /// Each key is read on its own. Missing, mistyped or out-of-range keys
    /// keep their default.
    fn from(table: &toml::Table) -> Self {
        let defaults = Preferences::default();
        Self {
            sidebar_visible: stored_key(table, "sidebar_visible", toml::Value::as_bool)
                .unwrap_or(defaults.sidebar_visible),
            background_index: stored_key(table, "background_index", |v| {
                v.as_integer()
                    .and_then(|i| usize::try_from(i).ok())
                    .filter(|i| *i < BACKGROUND_COUNT)
            })
            .unwrap_or(defaults.background_index),
            voice_mode: stored_key(table, "voice_mode", |v| {
                v.as_integer()
                    .and_then(|i| u8::try_from(i).ok())
                    .and_then(VoiceMode::from_index)
            })
            .unwrap_or(defaults.voice_mode),
        }
    }
}

fn stored_key<T>(
    table: &toml::Table,
    name: &str,
    read: impl FnOnce(&toml::Value) -> Option<T>,
) -> Option<T> {
    let value = table.get(name)?;
    let parsed = read(value);
    if parsed.is_none() {
        warn!("preferences: ignoring {name} = {value}");
    }
    parsed
}

// ── Store ────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum PrefsError {
    #[error("no config directory on this platform")]
    NoConfigDir,

    #[error("preferences i/o: {0}")]
    Io(#[from] std::io::Error),

    #[error("preferences encode: {0}")]
    Encode(#[from] toml::ser::Error),
}

/// Reads and writes `Preferences` at a fixed path.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/fay-panel/preferences.toml`.
    pub fn default_location() -> Result<Self, PrefsError> {
        let dir = dirs::config_dir().ok_or(PrefsError::NoConfigDir)?;
        Ok(Self::new(dir.join("fay-panel").join("preferences.toml")))
    }

    /// Never fails: an absent or unreadable file yields the defaults.
    pub fn load(&self) -> Preferences {
        if !self.path.exists() {
            debug!("no preferences at {}, using defaults", self.path.display());
            return Preferences::default();
        }
        match self.read() {
            Ok(prefs) => prefs,
            Err(e) => {
                warn!("preferences: {e:#}");
                Preferences::default()
            }
        }
    }

    fn read(&self) -> anyhow::Result<Preferences> {
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("reading {}", self.path.display()))?;
        let table: toml::Table = toml::from_str(&raw)
            .with_context(|| format!("parsing {}", self.path.display()))?;
        Ok(Preferences::from(&table))
    }

    pub fn save(&self, prefs: &Preferences) -> Result<(), PrefsError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let body = toml::to_string(&StoredPreferences::from(*prefs))?;
        fs::write(&self.path, body)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferenceStore::new(dir.path().join("nope.toml"));
        assert_eq!(store.load(), Preferences::default());
    }

    #[test]
    fn saved_values_are_reapplied() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferenceStore::new(dir.path().join("nested/preferences.toml"));
        let prefs = Preferences {
            sidebar_visible: false,
            background_index: 3,
            voice_mode: VoiceMode::Recitation,
        };
        store.save(&prefs).unwrap();
        assert_eq!(store.load(), prefs);
    }

    #[test]
    fn garbage_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.toml");
        fs::write(&path, "sidebar_visible = \"maybe\"\n[[[").unwrap();
        assert_eq!(PreferenceStore::new(path).load(), Preferences::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.toml");
        fs::write(&path, "background_index = 2\n").unwrap();
        let prefs = PreferenceStore::new(path).load();
        assert_eq!(prefs.background_index, 2);
        assert!(prefs.sidebar_visible);
        assert_eq!(prefs.voice_mode, VoiceMode::Female);
    }

    #[test]
    fn a_mistyped_key_only_resets_itself() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.toml");
        fs::write(&path, "sidebar_visible = \"maybe\"\nbackground_index = 2\nvoice_mode = 1\n")
            .unwrap();
        let prefs = PreferenceStore::new(path).load();
        assert!(prefs.sidebar_visible);
        assert_eq!(prefs.background_index, 2);
        assert_eq!(prefs.voice_mode, VoiceMode::Male);
    }

    #[test]
    fn out_of_range_values_are_clamped_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.toml");
        fs::write(&path, "background_index = 9\nvoice_mode = 7\n").unwrap();
        let prefs = PreferenceStore::new(path).load();
        assert_eq!(prefs.background_index, 0);
        assert_eq!(prefs.voice_mode, VoiceMode::Female);
    }

    #[test]
    fn cycles_wrap_around() {
        let mut prefs = Preferences { background_index: 3, ..Preferences::default() };
        prefs.next_background();
        assert_eq!(prefs.background_index, 0);
        assert_eq!(VoiceMode::Recitation.next(), VoiceMode::Female);
    }
}
