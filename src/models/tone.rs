//! Skin-tone level handling.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Skin-tone level of a toned emoji asset.
///
/// Levels run from 1 (lightest, Fitzpatrick type 1-2) to 5 (darkest,
/// Fitzpatrick type 6). A base asset has no level at all, which is modeled
/// as `Option<ToneLevel>::None` by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ToneLevel(u8);

impl ToneLevel {
    /// Lowest valid level.
    pub const MIN: u8 = 1;
    /// Highest valid level.
    pub const MAX: u8 = 5;

    /// Creates a level, returning `None` outside `1..=5`.
    #[must_use]
    pub const fn new(level: u8) -> Option<Self> {
        if level >= Self::MIN && level <= Self::MAX {
            Some(Self(level))
        } else {
            None
        }
    }

    /// Returns the numeric level.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Iterates over all five levels in ascending order.
    pub fn all() -> impl Iterator<Item = Self> {
        (Self::MIN..=Self::MAX).map(Self)
    }

    /// File name of a tone asset inside its name directory (e.g. `"3.png"`).
    #[must_use]
    pub fn file_name(self) -> String {
        format!("{}.png", self.0)
    }

    /// Parses a tone asset file name such as `"3.png"`.
    ///
    /// # Examples
    ///
    /// ```
    /// use emoji_canon::models::ToneLevel;
    ///
    /// assert_eq!(ToneLevel::from_file_name("2.png"), ToneLevel::new(2));
    /// assert_eq!(ToneLevel::from_file_name("6.png"), None);
    /// assert_eq!(ToneLevel::from_file_name("grinning.png"), None);
    /// ```
    #[must_use]
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let stem = file_name.strip_suffix(".png")?;
        stem.parse::<u8>().ok().and_then(Self::new)
    }

    /// Parses a level from a table value, rejecting anything outside `1..=5`.
    pub fn parse(value: u64) -> Result<Self> {
        u8::try_from(value)
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Invalid tone level {value}. Expected {}..={}",
                    Self::MIN,
                    Self::MAX
                )
            })
    }
}

impl TryFrom<u8> for ToneLevel {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("tone level {value} out of range 1..=5"))
    }
}

impl From<ToneLevel> for u8 {
    fn from(level: ToneLevel) -> Self {
        level.0
    }
}

impl fmt::Display for ToneLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_bounds() {
        assert!(ToneLevel::new(0).is_none());
        assert_eq!(ToneLevel::new(1).map(ToneLevel::get), Some(1));
        assert_eq!(ToneLevel::new(5).map(ToneLevel::get), Some(5));
        assert!(ToneLevel::new(6).is_none());
    }

    #[test]
    fn test_all_levels_in_order() {
        let levels: Vec<u8> = ToneLevel::all().map(ToneLevel::get).collect();
        assert_eq!(levels, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_file_name_round_trip() {
        for level in ToneLevel::all() {
            assert_eq!(ToneLevel::from_file_name(&level.file_name()), Some(level));
        }
        assert_eq!(ToneLevel::from_file_name("1.svg"), None);
    }

    #[test]
    fn test_parse_rejects_out_of_range() {
        assert!(ToneLevel::parse(3).is_ok());
        assert!(ToneLevel::parse(0).is_err());
        assert!(ToneLevel::parse(300).is_err());
    }

    #[test]
    fn test_serde_validates() {
        let level: ToneLevel = serde_json::from_str("4").unwrap();
        assert_eq!(level.get(), 4);
        assert!(serde_json::from_str::<ToneLevel>("9").is_err());
    }
}
