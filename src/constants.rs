//! Application-wide constants.
//!
//! This module defines constants used throughout the application,
//! including the application name and the fixed names of the output tree.

/// The display name of the application.
pub const APP_NAME: &str = "Emoji Canon";

/// The binary name of the application (used in command examples).
pub const APP_BINARY_NAME: &str = "emoji-canon";

/// Directory name under the platform config dir.
pub const CONFIG_DIR_NAME: &str = "EmojiCanon";

/// Config file looked up in the working directory before the platform dir.
pub const LOCAL_CONFIG_FILE: &str = "emoji-canon.toml";

/// Name of the reference set every other set is synchronized against.
pub const REFERENCE_SET: &str = "unicode";

/// FluentUI tone directories and the levels they map to.
pub const FLUENTUI_SKIN_TONES: [(&str, u8); 5] = [
    ("Light", 1),
    ("Medium-Light", 2),
    ("Medium", 3),
    ("Medium-Dark", 4),
    ("Dark", 5),
];

/// FluentUI directory holding the untoned artwork of a tonable emoji.
pub const FLUENTUI_DEFAULT_DIR: &str = "Default";

/// FluentUI artwork style directory used for rendering.
pub const FLUENTUI_STYLE_DIR: &str = "Color";

/// Per-emoji FluentUI metadata file.
pub const FLUENTUI_METADATA_FILE: &str = "metadata.json";

/// Default edge length of rendered PNGs, in pixels.
pub const DEFAULT_IMAGE_SIZE: u32 = 72;

/// Factor applied to the target size when supersampling.
pub const SUPERSAMPLE_FACTOR: u32 = 4;
