//! Processor for the Unicode consortium emoji charts.
//!
//! Two HTML documents are read:
//!
//! - `emoji-list.html`: one row per emoji. Cell 2 holds an anchor whose
//!   `name` is the codepoint token (`1f600`, `1f468_200d_1f469`), cell 3
//!   the literal character and cell 4 an inline
//!   `data:image/png;base64,...` image.
//! - `emoji-modifier-sequences.html`: same layout, with tokens combining a
//!   base token and a Fitzpatrick token (`1f44b_1f3fd`).
//!
//! Rows are located with a handful of tolerant patterns rather than a full
//! HTML parser; the charts are generated and regular.

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, info, warn};

use super::{Outcome, ProcessReport};
use crate::library::fsops::write_replacing;
use crate::models::{Asset, ToneLevel};
use crate::resolver::IdentityResolver;
use crate::tables::{FitzpatrickScale, Tables};

const DATA_URL_PREFIX: &str = "data:image/png;base64,";

static ROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<tr\b[^>]*>(.*?)</tr>").expect("row pattern is valid"));
static CELL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<td\b[^>]*>(.*?)</td>").expect("cell pattern is valid"));
static ANCHOR_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<a\b[^>]*?\bname\s*=\s*["']([^"']+)["']"#).expect("anchor pattern is valid")
});
static IMG_SRC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<img\b[^>]*?\bsrc\s*=\s*["']([^"']+)["']"#).expect("img pattern is valid")
});
static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("tag pattern is valid"));
static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|amp|lt|gt|quot|apos|nbsp);").expect("entity pattern is valid")
});

/// One table row of a chart, with the fields that were present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartRow {
    /// Codepoint token from the anchor name, lower-cased
    pub token: String,
    /// Literal character text, if the row has one
    pub character: Option<String>,
    /// Decoded PNG bytes
    pub image: Vec<u8>,
}

/// One toned image from the modifier-sequences chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variation {
    /// Token of the untoned emoji
    pub base: String,
    /// Skin tone of the image
    pub level: ToneLevel,
    /// Decoded PNG bytes
    pub image: Vec<u8>,
}

/// Extracts every row with a codepoint token and an inline PNG.
///
/// Rows missing either are skipped.
#[must_use]
pub fn parse_chart(html: &str) -> Vec<ChartRow> {
    ROW.captures_iter(html)
        .filter_map(|row| parse_row(&row[1]))
        .collect()
}

fn parse_row(row: &str) -> Option<ChartRow> {
    let cells: Vec<&str> = CELL
        .captures_iter(row)
        .filter_map(|cell| cell.get(1).map(|m| m.as_str()))
        .collect();

    let token = ANCHOR_NAME.captures(cells.get(1)?)?[1].trim().to_lowercase();
    if token.is_empty() {
        return None;
    }

    let character = cells
        .get(2)
        .map(|cell| decode_entities(&TAG.replace_all(cell, "")).trim().to_string())
        .filter(|text| !text.is_empty());

    let src = IMG_SRC.captures(cells.get(3)?)?[1].to_string();
    let image = decode_data_url(&src)?;

    Some(ChartRow {
        token,
        character,
        image,
    })
}

fn decode_data_url(src: &str) -> Option<Vec<u8>> {
    let payload = src.trim().strip_prefix(DATA_URL_PREFIX)?;
    let cleaned: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    match STANDARD.decode(cleaned) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            debug!("Skipping row with undecodable image: {e}");
            None
        }
    }
}

fn decode_entities(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let entity = &caps[1];
            let decoded = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{A0}'),
                _ => {
                    let value = if let Some(hex) = entity
                        .strip_prefix("#x")
                        .or_else(|| entity.strip_prefix("#X"))
                    {
                        u32::from_str_radix(hex, 16).ok()
                    } else {
                        entity.strip_prefix('#').and_then(|dec| dec.parse().ok())
                    };
                    value.and_then(char::from_u32)
                }
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}

/// Splits modifier-sequence rows into (base token, level, image).
///
/// The first token part found in `scale` is the modifier; every occurrence
/// of it is removed and the remaining parts form the base token. Rows whose
/// token has no `_` or no modifier part are skipped.
#[must_use]
pub fn parse_variations(rows: Vec<ChartRow>, scale: &FitzpatrickScale) -> Vec<Variation> {
    rows.into_iter()
        .filter_map(|row| {
            if !row.token.contains('_') {
                return None;
            }
            let parts: Vec<&str> = row.token.split('_').collect();
            let modifier = parts.iter().copied().find(|part| scale.contains(part))?;
            let level = scale.level(modifier)?;
            let base = parts
                .iter()
                .copied()
                .filter(|part| *part != modifier)
                .collect::<Vec<_>>()
                .join("_");
            Some(Variation {
                base,
                level,
                image: row.image,
            })
        })
        .collect()
}

/// Writes the reference set from the Unicode charts.
#[derive(Debug, Clone, Copy)]
pub struct UnicodeHtmlProcessor<'a> {
    resolver: IdentityResolver<'a>,
}

impl<'a> UnicodeHtmlProcessor<'a> {
    /// Creates a processor resolving characters through `tables`.
    #[must_use]
    pub const fn new(tables: &'a Tables) -> Self {
        Self {
            resolver: IdentityResolver::new(tables),
        }
    }

    /// Reads both chart files and processes them.
    pub fn process_files(
        &self,
        emoji_list: &Path,
        modifier_sequences: &Path,
        output_dir: &Path,
    ) -> Result<ProcessReport> {
        let list = fs::read_to_string(emoji_list)
            .with_context(|| format!("Failed to read emoji list {}", emoji_list.display()))?;
        let modifiers = fs::read_to_string(modifier_sequences).with_context(|| {
            format!(
                "Failed to read modifier sequences {}",
                modifier_sequences.display()
            )
        })?;
        self.process_documents(&list, &modifiers, output_dir)
    }

    /// Processes chart documents already in memory.
    ///
    /// For every base row whose character resolves, writes `<name>.png` and
    /// one `<name>/<level>.png` per variation of that row's token.
    pub fn process_documents(
        &self,
        emoji_list: &str,
        modifier_sequences: &str,
        output_dir: &Path,
    ) -> Result<ProcessReport> {
        let mut bases = BTreeMap::new();
        for row in parse_chart(emoji_list) {
            if let Some(character) = row.character {
                bases.insert(row.token, (character, row.image));
            }
        }

        let scale = self.resolver.tables().fitzpatrick();
        let mut variations: BTreeMap<String, Vec<Variation>> = BTreeMap::new();
        for variation in parse_variations(parse_chart(modifier_sequences), scale) {
            variations
                .entry(variation.base.clone())
                .or_default()
                .push(variation);
        }

        debug!(
            bases = bases.len(),
            toned = variations.len(),
            "Parsed Unicode charts"
        );

        let mut report = ProcessReport::default();
        for (token, (character, image)) in &bases {
            let Some(name) = self.resolver.resolve(character, None) else {
                debug!(token, "No canonical name for chart row");
                report.record(Outcome::Skipped);
                continue;
            };

            report.record(write_asset(&Asset::base(name), output_dir, image));
            for variation in variations.get(token).into_iter().flatten() {
                let asset = Asset::toned(name, variation.level);
                report.record(write_asset(&asset, output_dir, &variation.image));
            }
        }

        info!(
            output = %output_dir.display(),
            written = report.written,
            skipped = report.skipped,
            failed = report.failed,
            "Processed Unicode charts"
        );
        Ok(report)
    }
}

fn write_asset(asset: &Asset, output_dir: &Path, image: &[u8]) -> Outcome {
    let path = asset.path_in(output_dir);
    match write_replacing(&path, image) {
        Ok(()) => Outcome::Written,
        Err(e) => {
            warn!(%asset, path = %path.display(), "Failed to write image: {e}");
            Outcome::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use tempfile::TempDir;

    fn row(token: &str, character: &str, image: &[u8]) -> String {
        format!(
            "<tr><td class='rchars'>1</td><td class='code'><a href='#{token}' name='{token}'>U+X</a></td>\
             <td class='chars'>{character}</td><td class='andr'><img alt='x' class='imga' src='data:image/png;base64,{}'></td></tr>",
            STANDARD.encode(image)
        )
    }

    fn tables() -> Tables {
        Tables::new(
            HashMap::from([
                ("\u{1F44B}\u{FE0F}".to_string(), "wave".to_string()),
                ("\u{1F600}\u{FE0F}".to_string(), "grinning".to_string()),
            ]),
            HashSet::from(["wave".to_string()]),
            HashMap::new(),
            FitzpatrickScale::standard(),
        )
    }

    #[test]
    fn test_parse_chart_rows() {
        let html = format!(
            "<table><tr><th>№</th><th>Code</th></tr>{}{}</table>",
            row("1f600", "\u{1F600}", b"face"),
            "<tr><td>2</td><td><a name='1f601'>U+1F601</a></td><td>x</td><td>no image</td></tr>"
        );

        let rows = parse_chart(&html);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].token, "1f600");
        assert_eq!(rows[0].character.as_deref(), Some("\u{1F600}"));
        assert_eq!(rows[0].image, b"face");
    }

    #[test]
    fn test_character_entities_decoded() {
        let html = row("1f600", "&#x1F600;", b"face");
        let rows = parse_chart(&html);
        assert_eq!(rows[0].character.as_deref(), Some("\u{1F600}"));
    }

    #[test]
    fn test_parse_variations() {
        let rows = vec![
            ChartRow {
                token: "1f44b_1f3fd".to_string(),
                character: None,
                image: b"t3".to_vec(),
            },
            ChartRow {
                token: "1f44b".to_string(),
                character: None,
                image: b"base".to_vec(),
            },
            ChartRow {
                token: "1f468_200d_1f469".to_string(),
                character: None,
                image: b"none".to_vec(),
            },
        ];

        let variations = parse_variations(rows, &FitzpatrickScale::standard());
        assert_eq!(
            variations,
            vec![Variation {
                base: "1f44b".to_string(),
                level: ToneLevel::new(3).unwrap(),
                image: b"t3".to_vec(),
            }]
        );
    }

    #[test]
    fn test_process_documents() {
        let output = TempDir::new().unwrap();
        let list = format!(
            "{}{}{}",
            row("1f44b", "\u{1F44B}", b"wave"),
            row("1f600", "\u{1F600}", b"face"),
            row("1f914", "\u{1F914}", b"think"),
        );
        let modifiers = format!(
            "{}{}",
            row("1f44b_1f3fb", "x", b"wave1"),
            row("1f44b_1f3ff", "x", b"wave5"),
        );

        let tables = tables();
        let report = UnicodeHtmlProcessor::new(&tables)
            .process_documents(&list, &modifiers, output.path())
            .unwrap();

        assert_eq!(report.written, 4);
        assert_eq!(report.skipped, 1);
        assert_eq!(fs::read(output.path().join("wave.png")).unwrap(), b"wave");
        assert_eq!(fs::read(output.path().join("wave/1.png")).unwrap(), b"wave1");
        assert_eq!(fs::read(output.path().join("wave/5.png")).unwrap(), b"wave5");
        assert_eq!(fs::read(output.path().join("grinning.png")).unwrap(), b"face");
    }
}
