//! Read-only lookup tables loaded once per run.
//!
//! The tables are plain JSON files produced upstream:
//!
//! - `emoji_to_name.json`: `{ "😀": "grinning", ... }`
//! - `tonable_emojis.json`: `["wave", "runner", ...]`
//! - `emoji_aliases.json`: `{ "grinning": ["grinning_face"], ... }`
//! - optional Fitzpatrick scale: `{ "1f3fb": 1, ..., "1f3ff": 5 }`
//!
//! Everything is loaded into an immutable [`Tables`] value that callers pass
//! by reference; there is no global state.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::config::PathConfig;
use crate::grapheme;
use crate::models::ToneLevel;

/// Maximum number of entries accepted in a Fitzpatrick table.
const MAX_FITZPATRICK_ENTRIES: usize = 6;

/// Maps lower-case hex codepoint tokens of skin tone modifiers to levels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FitzpatrickScale {
    levels: HashMap<String, ToneLevel>,
}

impl FitzpatrickScale {
    /// The standard mapping `1f3fb`..`1f3ff` to levels 1..5.
    #[must_use]
    pub fn standard() -> Self {
        let levels = (0x1F3FB_u32..=0x1F3FF)
            .zip(ToneLevel::all())
            .map(|(codepoint, level)| (format!("{codepoint:x}"), level))
            .collect();
        Self { levels }
    }

    /// Builds a scale from raw table entries.
    ///
    /// Tokens are lower-cased. At most six entries are accepted and every
    /// level must lie in `1..=5`.
    pub fn from_entries(entries: HashMap<String, u64>) -> Result<Self> {
        if entries.is_empty() || entries.len() > MAX_FITZPATRICK_ENTRIES {
            anyhow::bail!(
                "Fitzpatrick table must have 1..={MAX_FITZPATRICK_ENTRIES} entries, got {}",
                entries.len()
            );
        }

        let levels = entries
            .into_iter()
            .map(|(token, level)| {
                let level = ToneLevel::parse(level)
                    .with_context(|| format!("Invalid level for Fitzpatrick token '{token}'"))?;
                Ok((token.to_ascii_lowercase(), level))
            })
            .collect::<Result<HashMap<_, _>>>()?;

        Ok(Self { levels })
    }

    /// Level of a hex token, case-insensitive.
    #[must_use]
    pub fn level(&self, token: &str) -> Option<ToneLevel> {
        self.levels.get(&token.to_ascii_lowercase()).copied()
    }

    /// Returns true if `token` is a skin tone modifier token.
    #[must_use]
    pub fn contains(&self, token: &str) -> bool {
        self.level(token).is_some()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Returns true if the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

impl Default for FitzpatrickScale {
    fn default() -> Self {
        Self::standard()
    }
}

/// All lookup tables for one run.
#[derive(Debug, Clone, Default)]
pub struct Tables {
    identities: HashMap<String, String>,
    tonable: HashSet<String>,
    aliases: HashMap<String, Vec<String>>,
    fitzpatrick: FitzpatrickScale,
}

impl Tables {
    /// Creates tables from already-loaded values.
    ///
    /// Alias lists are de-duplicated keeping their first-seen order.
    #[must_use]
    pub fn new(
        identities: HashMap<String, String>,
        tonable: HashSet<String>,
        aliases: HashMap<String, Vec<String>>,
        fitzpatrick: FitzpatrickScale,
    ) -> Self {
        let aliases = aliases
            .into_iter()
            .map(|(name, list)| {
                let mut seen = HashSet::new();
                let ordered: Vec<String> = list
                    .into_iter()
                    .filter(|alias| *alias != name && seen.insert(alias.clone()))
                    .collect();
                (name, ordered)
            })
            .collect();

        Self {
            identities,
            tonable,
            aliases,
            fitzpatrick,
        }
    }

    /// Loads every table named in `paths`.
    ///
    /// When no tonable table is configured, the tone-eligible set is derived
    /// from the identity map with [`grapheme::can_be_toned`]. A missing alias
    /// table means no aliases.
    pub fn load(paths: &PathConfig) -> Result<Self> {
        let identities: HashMap<String, String> = read_json(&paths.emoji_to_name)?;

        let tonable: HashSet<String> = match &paths.tonable_emojis {
            Some(path) => read_json::<Vec<String>>(path)?.into_iter().collect(),
            None => {
                debug!("No tonable table configured, deriving from identity map");
                derive_tonable(&identities).into_iter().collect()
            }
        };

        let aliases: HashMap<String, Vec<String>> = match &paths.aliases {
            Some(path) => read_json(path)?,
            None => HashMap::new(),
        };

        let fitzpatrick = match &paths.fitzpatrick_scale {
            Some(path) => FitzpatrickScale::from_entries(read_json(path)?)
                .with_context(|| format!("Invalid Fitzpatrick table {}", path.display()))?,
            None => FitzpatrickScale::standard(),
        };

        info!(
            identities = identities.len(),
            tonable = tonable.len(),
            aliases = aliases.len(),
            "Loaded lookup tables"
        );

        Ok(Self::new(identities, tonable, aliases, fitzpatrick))
    }

    /// Canonical name for an exact identity key.
    #[must_use]
    pub fn name_for(&self, identity: &str) -> Option<&str> {
        self.identities.get(identity).map(String::as_str)
    }

    /// Returns true if `name` may carry skin tones.
    #[must_use]
    pub fn is_tonable(&self, name: &str) -> bool {
        self.tonable.contains(name)
    }

    /// Aliases of `name`, empty when none are defined.
    #[must_use]
    pub fn aliases_for(&self, name: &str) -> &[String] {
        self.aliases.get(name).map_or(&[], Vec::as_slice)
    }

    /// The full alias table.
    #[must_use]
    pub fn aliases(&self) -> &HashMap<String, Vec<String>> {
        &self.aliases
    }

    /// The Fitzpatrick token table.
    #[must_use]
    pub fn fitzpatrick(&self) -> &FitzpatrickScale {
        &self.fitzpatrick
    }

    /// Iterates over (identity, name) pairs.
    pub fn identities(&self) -> impl Iterator<Item = (&str, &str)> {
        self.identities
            .iter()
            .map(|(identity, name)| (identity.as_str(), name.as_str()))
    }
}

/// Derives the tone-eligible names from an identity map.
///
/// A name is tonable when any of its identities passes
/// [`grapheme::can_be_toned`]. The result is sorted.
#[must_use]
pub fn derive_tonable(identities: &HashMap<String, String>) -> BTreeSet<String> {
    identities
        .iter()
        .filter(|(identity, _)| grapheme::can_be_toned(identity))
        .map(|(_, name)| name.clone())
        .collect()
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read lookup table {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse lookup table {}", path.display()))
}
