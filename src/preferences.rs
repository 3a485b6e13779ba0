use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FontFamily {
    Serif,
    Sans,
}

/// Five-step font size tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSize {
    Xs,
    Sm,
    Base,
    Lg,
    Xl,
}

impl FontSize {
    pub fn larger(self) -> Self {
        match self {
            FontSize::Xs => FontSize::Sm,
            FontSize::Sm => FontSize::Base,
            FontSize::Base => FontSize::Lg,
            FontSize::Lg | FontSize::Xl => FontSize::Xl,
        }
    }

    pub fn smaller(self) -> Self {
        match self {
            FontSize::Xs | FontSize::Sm => FontSize::Xs,
            FontSize::Base => FontSize::Sm,
            FontSize::Lg => FontSize::Base,
            FontSize::Xl => FontSize::Lg,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineHeight {
    Tight,
    Snug,
    Normal,
    Relaxed,
    Loose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ReadingTheme {
    Light,
    Dark,
    Sepia,
}

impl ReadingTheme {
    pub fn next(self) -> Self {
        match self {
            ReadingTheme::Light => ReadingTheme::Dark,
            ReadingTheme::Dark => ReadingTheme::Sepia,
            ReadingTheme::Sepia => ReadingTheme::Light,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarginSize {
    Small,
    Medium,
    Large,
}

/// Typographic preferences for the reader view. Global to the tracker,
/// not per book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingPreferences {
    pub font_family: FontFamily,
    pub font_size: FontSize,
    pub line_height: LineHeight,
    pub theme: ReadingTheme,
    pub margins: MarginSize,
}

impl Default for ReadingPreferences {
    fn default() -> Self {
        Self {
            font_family: FontFamily::Serif,
            font_size: FontSize::Base,
            line_height: LineHeight::Relaxed,
            theme: ReadingTheme::Light,
            margins: MarginSize::Medium,
        }
    }
}

/// Partial-merge patch; only `Some` fields are applied.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreferencesPatch {
    pub font_family: Option<FontFamily>,
    pub font_size: Option<FontSize>,
    pub line_height: Option<LineHeight>,
    pub theme: Option<ReadingTheme>,
    pub margins: Option<MarginSize>,
}

impl PreferencesPatch {
    pub fn apply(&self, prefs: &mut ReadingPreferences) {
        if let Some(font_family) = self.font_family {
            prefs.font_family = font_family;
        }
        if let Some(font_size) = self.font_size {
            prefs.font_size = font_size;
        }
        if let Some(line_height) = self.line_height {
            prefs.line_height = line_height;
        }
        if let Some(theme) = self.theme {
            prefs.theme = theme;
        }
        if let Some(margins) = self.margins {
            prefs.margins = margins;
        }
    }
}

pub trait PrefsStore {
    fn load(&self) -> ReadingPreferences;
    fn save(&self, prefs: &ReadingPreferences) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FilePrefsStore {
    path: PathBuf,
}

impl FilePrefsStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(dir) = AppDirs::config_dir() {
            dir.join("preferences.json")
        } else {
            PathBuf::from("quire_preferences.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FilePrefsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PrefsStore for FilePrefsStore {
    fn load(&self) -> ReadingPreferences {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(prefs) = serde_json::from_slice::<ReadingPreferences>(&bytes) {
                return prefs;
            }
        }
        ReadingPreferences::default()
    }

    fn save(&self, prefs: &ReadingPreferences) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(prefs).unwrap_or_default();
        fs::write(&self.path, data)
    }
}
