//! Decoding of vendor file names into candidate emoji identities.
//!
//! Vendors name image files after the hex codepoints of the emoji they
//! depict, with slightly different conventions:
//!
//! - Twemoji: `1f3c3-1f3fb.png`
//! - Noto: `emoji_u1f3c3_1f3fb.png`
//!
//! [`CodepointDecoder`] strips the vendor prefix, splits the codepoint
//! tokens, pulls out the skin tone modifier and rebuilds the emoji text.

use std::path::Path;
use thiserror::Error;

use crate::grapheme::{is_keycap_base, PRESENTATION_SELECTOR};
use crate::models::ToneLevel;
use crate::tables::FitzpatrickScale;

/// Separator all accepted separators are normalized to.
const CANONICAL_SEPARATOR: char = '_';

/// Errors produced while decoding a single file name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The path has no usable file stem.
    #[error("file name '{0}' has no stem")]
    MissingStem(String),
    /// Nothing left to decode after stripping prefix and tone tokens.
    #[error("file name '{0}' contains no codepoints")]
    Empty(String),
    /// A token is not a hex number.
    #[error("invalid codepoint token '{0}'")]
    InvalidToken(String),
    /// A token is above U+10FFFF or a surrogate.
    #[error("codepoint {0:#x} is not a Unicode scalar value")]
    NotScalar(u32),
}

/// Vendor-specific naming conventions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Separator between codepoint tokens
    pub separator: char,
    /// Prefix removed from the lower-cased stem (e.g. "emoji_u")
    pub strip_prefix: Option<String>,
    /// Insert U+FE0F after a leading keycap base or symbol/dingbat codepoint
    pub implicit_selector: bool,
}

impl DecodeOptions {
    /// Twemoji style: `1f3c3-1f3fb.png`.
    #[must_use]
    pub fn twemoji() -> Self {
        Self::default()
    }

    /// Noto style: `emoji_u1f3c3_1f3fb.png`.
    #[must_use]
    pub fn noto() -> Self {
        Self {
            separator: '_',
            strip_prefix: Some("emoji_u".to_string()),
            implicit_selector: false,
        }
    }
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            separator: '-',
            strip_prefix: None,
            implicit_selector: false,
        }
    }
}

/// Result of decoding one file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    /// Candidate identity text, tone modifiers removed
    pub identity: String,
    /// Codepoints making up `identity`
    pub codepoints: Vec<u32>,
    /// Skin tone encoded in the name, if any
    pub tone: Option<ToneLevel>,
}

/// Turns vendor file names into candidate identities.
#[derive(Debug, Clone)]
pub struct CodepointDecoder<'a> {
    scale: &'a FitzpatrickScale,
    options: DecodeOptions,
}

impl<'a> CodepointDecoder<'a> {
    /// Creates a decoder for one vendor convention.
    #[must_use]
    pub fn new(scale: &'a FitzpatrickScale, options: DecodeOptions) -> Self {
        Self { scale, options }
    }

    /// The naming convention this decoder applies.
    #[must_use]
    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Decodes a file name (or path) into a candidate identity and tone.
    ///
    /// When several skin tone tokens appear, the last one wins.
    ///
    /// # Examples
    ///
    /// ```
    /// use emoji_canon::codepoints::{CodepointDecoder, DecodeOptions};
    /// use emoji_canon::tables::FitzpatrickScale;
    ///
    /// let scale = FitzpatrickScale::standard();
    /// let decoder = CodepointDecoder::new(&scale, DecodeOptions::twemoji());
    ///
    /// let runner = decoder.decode("1f3c3-1f3fb.png").unwrap();
    /// assert_eq!(runner.identity, "\u{1F3C3}");
    /// assert_eq!(runner.tone.map(|t| t.get()), Some(1));
    /// ```
    pub fn decode(&self, file_name: &str) -> Result<Decoded, DecodeError> {
        let lowered = Path::new(file_name)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .filter(|stem| !stem.is_empty())
            .ok_or_else(|| DecodeError::MissingStem(file_name.to_string()))?
            .to_lowercase();

        let stem: &str = match &self.options.strip_prefix {
            Some(prefix) => lowered
                .strip_prefix(prefix.to_lowercase().as_str())
                .unwrap_or(lowered.as_str()),
            None => lowered.as_str(),
        };

        let normalized: String = stem
            .chars()
            .map(|c| {
                if c == self.options.separator || c == '-' || c == '_' {
                    CANONICAL_SEPARATOR
                } else {
                    c
                }
            })
            .collect();

        let mut tone = None;
        let mut codepoints = Vec::new();
        for token in normalized
            .split(CANONICAL_SEPARATOR)
            .filter(|token| !token.is_empty())
        {
            if let Some(level) = self.scale.level(token) {
                tone = Some(level);
                continue;
            }
            codepoints.push(parse_codepoint(token)?);
        }

        if codepoints.is_empty() {
            return Err(DecodeError::Empty(file_name.to_string()));
        }

        if self.options.implicit_selector
            && needs_implicit_selector(codepoints[0])
            && codepoints.get(1) != Some(&u32::from(PRESENTATION_SELECTOR))
        {
            codepoints.insert(1, u32::from(PRESENTATION_SELECTOR));
        }

        let identity = codepoints
            .iter()
            .map(|&cp| char::from_u32(cp).ok_or(DecodeError::NotScalar(cp)))
            .collect::<Result<String, _>>()?;

        Ok(Decoded {
            identity,
            codepoints,
            tone,
        })
    }
}

fn parse_codepoint(token: &str) -> Result<u32, DecodeError> {
    if !token.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(DecodeError::InvalidToken(token.to_string()));
    }
    let value = u32::from_str_radix(token, 16)
        .map_err(|_| DecodeError::InvalidToken(token.to_string()))?;
    if char::from_u32(value).is_none() {
        return Err(DecodeError::NotScalar(value));
    }
    Ok(value)
}

/// Keycap bases and Miscellaneous Symbols / Dingbats codepoints, which
/// several vendors encode without their presentation selector.
fn needs_implicit_selector(codepoint: u32) -> bool {
    let keycap = char::from_u32(codepoint).is_some_and(is_keycap_base);
    keycap || (0x2600..=0x27BF).contains(&codepoint)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_with(options: DecodeOptions, name: &str) -> Result<Decoded, DecodeError> {
        let scale = FitzpatrickScale::standard();
        CodepointDecoder::new(&scale, options).decode(name)
    }

    #[test]
    fn test_decode_single_codepoint() {
        let decoded = decode_with(DecodeOptions::twemoji(), "1f600.png").unwrap();
        assert_eq!(decoded.identity, "\u{1F600}");
        assert_eq!(decoded.codepoints, vec![0x1F600]);
        assert_eq!(decoded.tone, None);
    }

    #[test]
    fn test_decode_toned_runner() {
        let decoded = decode_with(DecodeOptions::twemoji(), "1f3c3-1f3fb.png").unwrap();
        assert_eq!(decoded.identity, "\u{1F3C3}");
        assert_eq!(decoded.tone, ToneLevel::new(1));
    }

    #[test]
    fn test_decode_noto_prefix_and_case() {
        let decoded = decode_with(DecodeOptions::noto(), "EMOJI_U1F44B_1F3FD.png").unwrap();
        assert_eq!(decoded.identity, "\u{1F44B}");
        assert_eq!(decoded.tone, ToneLevel::new(3));
    }

    #[test]
    fn test_decode_zwj_sequence_from_path() {
        let decoded =
            decode_with(DecodeOptions::twemoji(), "/tmp/assets/1f9d1-200d-1f4bb.png").unwrap();
        assert_eq!(decoded.identity, "\u{1F9D1}\u{200D}\u{1F4BB}");
    }

    #[test]
    fn test_decode_last_tone_token_wins() {
        let decoded =
            decode_with(DecodeOptions::twemoji(), "1f9d1-1f3fb-200d-1f91d-200d-1f9d1-1f3ff.png")
                .unwrap();
        assert_eq!(decoded.tone, ToneLevel::new(5));
        assert_eq!(
            decoded.identity,
            "\u{1F9D1}\u{200D}\u{1F91D}\u{200D}\u{1F9D1}"
        );
    }

    #[test]
    fn test_decode_is_deterministic() {
        let a = decode_with(DecodeOptions::noto(), "emoji_u1f468_200d_1f469.png").unwrap();
        let b = decode_with(DecodeOptions::noto(), "emoji_u1f468_200d_1f469.png").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_decode_rejects_out_of_range() {
        let err = decode_with(DecodeOptions::twemoji(), "110000.png").unwrap_err();
        assert_eq!(err, DecodeError::NotScalar(0x0011_0000));

        let err = decode_with(DecodeOptions::twemoji(), "1f600-d800.png").unwrap_err();
        assert_eq!(err, DecodeError::NotScalar(0xD800));
    }

    #[test]
    fn test_decode_rejects_non_hex() {
        let err = decode_with(DecodeOptions::twemoji(), "smile.png").unwrap_err();
        assert_eq!(err, DecodeError::InvalidToken("smile".to_string()));

        let err = decode_with(DecodeOptions::twemoji(), "1f600-ffffffffff.png").unwrap_err();
        assert!(matches!(err, DecodeError::InvalidToken(_)));
    }

    #[test]
    fn test_decode_tone_only_is_empty() {
        let err = decode_with(DecodeOptions::twemoji(), "1f3fb.png").unwrap_err();
        assert!(matches!(err, DecodeError::Empty(_)));
    }

    #[test]
    fn test_implicit_selector_for_keycap_and_symbols() {
        let options = DecodeOptions {
            implicit_selector: true,
            ..DecodeOptions::twemoji()
        };

        let keycap = decode_with(options.clone(), "23-20e3.png").unwrap();
        assert_eq!(keycap.identity, "#\u{FE0F}\u{20E3}");

        let heart = decode_with(options.clone(), "2764.png").unwrap();
        assert_eq!(heart.identity, "\u{2764}\u{FE0F}");

        let already = decode_with(options.clone(), "2764-fe0f.png").unwrap();
        assert_eq!(already.identity, "\u{2764}\u{FE0F}");

        let face = decode_with(options, "1f600.png").unwrap();
        assert_eq!(face.identity, "\u{1F600}");
    }

    #[test]
    fn test_implicit_selector_off_by_default() {
        let heart = decode_with(DecodeOptions::twemoji(), "2764.png").unwrap();
        assert_eq!(heart.identity, "\u{2764}");
    }
}
