//! Configuration management for the application.
//!
//! This module handles loading, validating, and saving the build
//! configuration in TOML format. The config names the lookup tables, the
//! output tree, network and rasterizer settings, and the list of vendor sets
//! to build.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{
    CONFIG_DIR_NAME, DEFAULT_IMAGE_SIZE, LOCAL_CONFIG_FILE, REFERENCE_SET,
};

/// File system locations of the lookup tables and the output tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    /// Root of the produced tree, one directory per set
    pub output_dir: PathBuf,
    /// JSON object mapping emoji text to canonical names
    pub emoji_to_name: PathBuf,
    /// JSON array of tone-eligible names; derived from `emoji_to_name` when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tonable_emojis: Option<PathBuf>,
    /// JSON object mapping canonical names to alias names
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aliases: Option<PathBuf>,
    /// JSON object mapping Fitzpatrick hex tokens to levels; built-in when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fitzpatrick_scale: Option<PathBuf>,
    /// Base directory for relative vendor document paths
    pub vendor_dir: PathBuf,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("dist/emoji"),
            emoji_to_name: PathBuf::from("dist/emoji_to_name.json"),
            tonable_emojis: Some(PathBuf::from("dist/tonable_emojis.json")),
            aliases: Some(PathBuf::from("dist/emoji_aliases.json")),
            fitzpatrick_scale: None,
            vendor_dir: PathBuf::from("vendor"),
        }
    }
}

/// Settings for remote archive downloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Maximum number of redirect hops to follow
    pub max_redirects: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 300,
            max_redirects: 10,
        }
    }
}

/// Settings for the external SVG rasterizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterConfig {
    /// SVG renderer executable (rsvg-convert compatible)
    pub program: String,
    /// Resize executable used in supersample mode (ImageMagick compatible)
    pub resize_program: String,
    /// Edge length of produced PNGs in pixels
    pub size: u32,
    /// Render large then downscale for smoother edges
    pub supersample: bool,
    /// Maximum number of concurrent rasterizer processes
    pub max_jobs: usize,
}

/// Default parallelism for per-asset work.
pub fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(std::num::NonZeroUsize::get)
        .unwrap_or(1)
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            program: "rsvg-convert".to_string(),
            resize_program: "magick".to_string(),
            size: DEFAULT_IMAGE_SIZE,
            supersample: false,
            max_jobs: default_jobs(),
        }
    }
}

/// How a vendor set encodes its assets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetKind {
    /// PNG files named by hex codepoints (Twemoji, Noto)
    Codepoints,
    /// Unicode consortium HTML charts with inline images
    UnicodeHtml,
    /// FluentUI per-emoji directories with metadata and SVGs
    Fluentui,
}

impl std::fmt::Display for SetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Codepoints => write!(f, "codepoints"),
            Self::UnicodeHtml => write!(f, "unicode_html"),
            Self::Fluentui => write!(f, "fluentui"),
        }
    }
}

fn default_separator() -> String {
    "-".to_string()
}

/// One vendor set to build.
///
/// Which fields are required depends on `kind`:
///
/// - `codepoints`: `source`, `asset_subdir`, optionally `separator`,
///   `strip_prefix`, `implicit_selector`
/// - `fluentui`: `source`, `asset_subdir`
/// - `unicode_html`: `emoji_list`, `modifier_sequences`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetConfig {
    /// Set name, also the output directory name
    pub name: String,
    /// Asset encoding
    pub kind: SetKind,
    /// Zip archive URL or local path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Directory inside the extracted archive holding the assets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_subdir: Option<PathBuf>,
    /// Codepoint separator used in file names
    #[serde(default = "default_separator")]
    pub separator: String,
    /// Prefix stripped from file names before decoding (e.g. "emoji_u")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strip_prefix: Option<String>,
    /// Insert U+FE0F after keycap bases and symbol/dingbat codepoints
    #[serde(default)]
    pub implicit_selector: bool,
    /// Unicode emoji-list.html document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji_list: Option<PathBuf>,
    /// Unicode emoji-modifier-sequences.html document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifier_sequences: Option<PathBuf>,
}

impl SetConfig {
    /// Creates a codepoint-filename set.
    #[must_use]
    pub fn codepoints(
        name: impl Into<String>,
        source: impl Into<String>,
        asset_subdir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: SetKind::Codepoints,
            source: Some(source.into()),
            asset_subdir: Some(asset_subdir.into()),
            separator: default_separator(),
            strip_prefix: None,
            implicit_selector: false,
            emoji_list: None,
            modifier_sequences: None,
        }
    }

    /// Creates a FluentUI set.
    #[must_use]
    pub fn fluentui(
        name: impl Into<String>,
        source: impl Into<String>,
        asset_subdir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            kind: SetKind::Fluentui,
            ..Self::codepoints(name, source, asset_subdir)
        }
    }

    /// Creates a Unicode HTML chart set.
    #[must_use]
    pub fn unicode_html(
        name: impl Into<String>,
        emoji_list: impl Into<PathBuf>,
        modifier_sequences: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: SetKind::UnicodeHtml,
            source: None,
            asset_subdir: None,
            separator: default_separator(),
            strip_prefix: None,
            implicit_selector: false,
            emoji_list: Some(emoji_list.into()),
            modifier_sequences: Some(modifier_sequences.into()),
        }
    }

    /// Sets the file name separator.
    #[must_use]
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Sets the file name prefix to strip.
    #[must_use]
    pub fn with_strip_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.strip_prefix = Some(prefix.into());
        self
    }

    /// Returns true if this is the reference set.
    #[must_use]
    pub fn is_reference(&self) -> bool {
        self.name == REFERENCE_SET
    }

    fn validate(&self) -> Result<()> {
        if self.name.is_empty()
            || self.name == "."
            || self.name == ".."
            || self.name.contains(['/', '\\'])
        {
            anyhow::bail!("Invalid set name '{}'. Names become directory names", self.name);
        }

        match self.kind {
            SetKind::Codepoints | SetKind::Fluentui => {
                if self.source.as_deref().map_or(true, str::is_empty) {
                    anyhow::bail!("Set '{}' ({}) requires a source", self.name, self.kind);
                }
                if self.asset_subdir.is_none() {
                    anyhow::bail!("Set '{}' ({}) requires asset_subdir", self.name, self.kind);
                }
                if self.kind == SetKind::Codepoints && self.separator.chars().count() != 1 {
                    anyhow::bail!(
                        "Set '{}' separator must be a single character, got '{}'",
                        self.name,
                        self.separator
                    );
                }
            }
            SetKind::UnicodeHtml => {
                if self.emoji_list.is_none() || self.modifier_sequences.is_none() {
                    anyhow::bail!(
                        "Set '{}' (unicode_html) requires emoji_list and modifier_sequences",
                        self.name
                    );
                }
            }
        }

        Ok(())
    }
}

/// The sets built when no config file lists any.
pub fn default_sets() -> Vec<SetConfig> {
    vec![
        SetConfig::unicode_html(
            REFERENCE_SET,
            "emoji-list.html",
            "emoji-modifier-sequences.html",
        ),
        SetConfig::codepoints(
            "twemoji",
            "https://github.com/jdecked/twemoji/archive/refs/heads/main.zip",
            "twemoji-main/assets/72x72",
        ),
        SetConfig::codepoints(
            "noto",
            "https://github.com/googlefonts/noto-emoji/archive/refs/heads/main.zip",
            "noto-emoji-main/png/72",
        )
        .with_separator("_")
        .with_strip_prefix("emoji_u"),
        SetConfig::fluentui(
            "fluentui",
            "https://github.com/microsoft/fluentui-emoji/archive/refs/heads/main.zip",
            "fluentui-emoji-main/assets",
        ),
    ]
}

/// Application configuration.
///
/// # File Location
///
/// 1. `--config <FILE>` when given
/// 2. `./emoji-canon.toml`
/// 3. Linux: `~/.config/EmojiCanon/config.toml`, macOS:
///    `~/Library/Application Support/EmojiCanon/config.toml`, Windows:
///    `%APPDATA%\EmojiCanon\config.toml`
///
/// # Validation
///
/// - set names are unique, non-empty and usable as directory names
/// - exactly one set is named `unicode` (the reference set)
/// - each set carries the fields its kind needs
/// - `raster.size`, `raster.max_jobs` and `network.max_redirects` are non-zero
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// File system paths
    #[serde(default)]
    pub paths: PathConfig,
    /// Download settings
    #[serde(default)]
    pub network: NetworkConfig,
    /// Rasterizer settings
    #[serde(default)]
    pub raster: RasterConfig,
    /// Vendor sets, processed in order
    #[serde(default = "default_sets")]
    pub sets: Vec<SetConfig>,
}

impl Config {
    /// Creates a new Config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            paths: PathConfig::default(),
            network: NetworkConfig::default(),
            raster: RasterConfig::default(),
            sets: default_sets(),
        }
    }

    /// Gets the platform-specific config directory path.
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to determine config directory")?
            .join(CONFIG_DIR_NAME);

        Ok(config_dir)
    }

    /// Resolves which config file to use when none is given explicitly.
    ///
    /// Prefers `./emoji-canon.toml`, then the platform config file.
    pub fn default_path() -> Result<PathBuf> {
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            return Ok(local);
        }
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Loads configuration.
    ///
    /// An explicit `path` must exist. Without one, the default location is
    /// used and a missing file yields the default configuration.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!("Config file not found: {}", path.display());
                }
                path.to_path_buf()
            }
            None => {
                let default_path = Self::default_path()?;
                if !default_path.exists() {
                    return Ok(Self::new());
                }
                default_path
            }
        };

        let content = fs::read_to_string(&config_path).context(format!(
            "Failed to read config file: {}",
            config_path.display()
        ))?;

        Self::from_toml_str(&content).context(format!(
            "Failed to parse config file: {}",
            config_path.display()
        ))
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Saves configuration to `path` using atomic write.
    ///
    /// Uses temp file + rename pattern for atomic writes.
    pub fn save(&self, path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).context(format!(
                "Failed to create config directory: {}",
                parent.display()
            ))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;
        let temp_path = path.with_extension("toml.tmp");

        fs::write(&temp_path, content).context(format!(
            "Failed to write temp config file: {}",
            temp_path.display()
        ))?;

        fs::rename(&temp_path, path).context(format!(
            "Failed to rename temp config file to: {}",
            path.display()
        ))?;

        Ok(())
    }

    /// Validates configuration values.
    pub fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        for set in &self.sets {
            set.validate()?;
            if !names.insert(set.name.as_str()) {
                anyhow::bail!("Duplicate set name '{}'", set.name);
            }
        }

        if !names.contains(REFERENCE_SET) {
            anyhow::bail!("No reference set named '{REFERENCE_SET}' configured");
        }

        if self.raster.size == 0 {
            anyhow::bail!("raster.size must be greater than zero");
        }
        if self.raster.max_jobs == 0 {
            anyhow::bail!("raster.max_jobs must be greater than zero");
        }
        if self.network.max_redirects == 0 {
            anyhow::bail!("network.max_redirects must be greater than zero");
        }

        Ok(())
    }

    /// Looks up a set by name.
    #[must_use]
    pub fn set(&self, name: &str) -> Option<&SetConfig> {
        self.sets.iter().find(|set| set.name == name)
    }

    /// Output directory of the named set.
    #[must_use]
    pub fn set_dir(&self, name: &str) -> PathBuf {
        self.paths.output_dir.join(name)
    }

    /// Output directory of the reference set.
    #[must_use]
    pub fn reference_dir(&self) -> PathBuf {
        self.set_dir(REFERENCE_SET)
    }

    /// Resolves a vendor document path against `paths.vendor_dir`.
    #[must_use]
    pub fn vendor_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.paths.vendor_dir.join(path)
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::new();
        assert!(config.validate().is_ok());
        assert_eq!(config.sets.len(), 4);
        assert!(config.set(REFERENCE_SET).is_some_and(SetConfig::is_reference));
    }

    #[test]
    fn test_parse_minimal_toml_uses_defaults() {
        let config = Config::from_toml_str("[paths]\noutput_dir = \"out\"\n").unwrap();
        assert_eq!(config.paths.output_dir, PathBuf::from("out"));
        assert_eq!(config.network.max_redirects, 10);
        assert_eq!(config.raster.size, 72);
        assert_eq!(config.sets, default_sets());
    }

    #[test]
    fn test_parse_sets() {
        let toml = r#"
[[sets]]
name = "unicode"
kind = "unicode_html"
emoji_list = "list.html"
modifier_sequences = "mods.html"

[[sets]]
name = "noto"
kind = "codepoints"
source = "/tmp/noto.zip"
asset_subdir = "png/72"
separator = "_"
strip_prefix = "emoji_u"
"#;
        let config = Config::from_toml_str(toml).unwrap();
        assert_eq!(config.sets.len(), 2);
        let noto = config.set("noto").unwrap();
        assert_eq!(noto.kind, SetKind::Codepoints);
        assert_eq!(noto.separator, "_");
        assert_eq!(noto.strip_prefix.as_deref(), Some("emoji_u"));
        assert!(!noto.implicit_selector);
    }

    #[test]
    fn test_missing_reference_set_rejected() {
        let toml = r#"
[[sets]]
name = "twemoji"
kind = "codepoints"
source = "twemoji.zip"
asset_subdir = "assets"
"#;
        let err = Config::from_toml_str(toml).unwrap_err();
        assert!(err.to_string().contains("reference set"));
    }

    #[test]
    fn test_duplicate_and_unsafe_names_rejected() {
        let mut config = Config::new();
        config.sets.push(config.sets[1].clone());
        assert!(config.validate().is_err());

        let mut config = Config::new();
        config.sets[1].name = "../escape".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_kind_specific_fields_required() {
        let mut config = Config::new();
        config.sets[1].source = None;
        assert!(config.validate().is_err());

        let mut config = Config::new();
        config.sets[0].emoji_list = None;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_limits_rejected() {
        let mut config = Config::new();
        config.network.max_redirects = 0;
        assert!(config.validate().is_err());

        let mut config = Config::new();
        config.raster.size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.toml");

        let mut config = Config::new();
        config.paths.output_dir = PathBuf::from("/srv/emoji");
        config.save(&path).unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_explicit_missing_file_errors() {
        let temp = TempDir::new().unwrap();
        assert!(Config::load(Some(&temp.path().join("nope.toml"))).is_err());
    }

    #[test]
    fn test_vendor_path_resolution() {
        let config = Config::new();
        assert_eq!(
            config.vendor_path(Path::new("emoji-list.html")),
            PathBuf::from("vendor/emoji-list.html")
        );
        assert_eq!(
            config.vendor_path(Path::new("/abs/list.html")),
            PathBuf::from("/abs/list.html")
        );
    }
}
