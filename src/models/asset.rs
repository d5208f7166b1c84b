//! Asset addressing within an emoji set directory.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

use super::ToneLevel;

/// One emoji image within a set: a canonical name plus an optional tone.
///
/// Base assets live at `<set>/<name>.png`, toned assets at
/// `<set>/<name>/<level>.png`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Asset {
    /// Canonical name (e.g. "grinning")
    pub name: String,
    /// Skin tone, `None` for the base image
    pub tone: Option<ToneLevel>,
}

impl Asset {
    /// Creates a base (untoned) asset.
    #[must_use]
    pub fn base(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tone: None,
        }
    }

    /// Creates a toned asset.
    #[must_use]
    pub fn toned(name: impl Into<String>, tone: ToneLevel) -> Self {
        Self {
            name: name.into(),
            tone: Some(tone),
        }
    }

    /// Creates an asset with an optional tone.
    #[must_use]
    pub fn new(name: impl Into<String>, tone: Option<ToneLevel>) -> Self {
        Self {
            name: name.into(),
            tone,
        }
    }

    /// Path of this asset relative to its set directory.
    ///
    /// # Examples
    ///
    /// ```
    /// use emoji_canon::models::{Asset, ToneLevel};
    /// use std::path::PathBuf;
    ///
    /// assert_eq!(Asset::base("wave").relative_path(), PathBuf::from("wave.png"));
    /// let toned = Asset::toned("wave", ToneLevel::new(3).unwrap());
    /// assert_eq!(toned.relative_path(), PathBuf::from("wave/3.png"));
    /// ```
    #[must_use]
    pub fn relative_path(&self) -> PathBuf {
        match self.tone {
            None => PathBuf::from(format!("{}.png", self.name)),
            Some(level) => Path::new(&self.name).join(level.file_name()),
        }
    }

    /// Absolute path of this asset inside `set_dir`.
    #[must_use]
    pub fn path_in(&self, set_dir: &Path) -> PathBuf {
        set_dir.join(self.relative_path())
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tone {
            None => write!(f, "{}", self.name),
            Some(level) => write!(f, "{}:t{}", self.name, level),
        }
    }
}
