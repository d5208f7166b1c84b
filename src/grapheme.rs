//! Presentation normalization and tone eligibility for emoji text.
//!
//! Vendors disagree on whether a sequence carries U+FE0F (emoji presentation
//! selector) after each component. Lookup keys are therefore always built
//! from [`force_presentation`], which adds the selector wherever a
//! component could otherwise render as text.
//!
//! Unicode properties come from the `regex` crate's property classes and
//! grapheme clusters from `unicode-segmentation`, so both track the Unicode
//! version of those crates.

use regex::Regex;
use std::sync::LazyLock;
use unicode_segmentation::UnicodeSegmentation;

/// U+FE0F VARIATION SELECTOR-16.
pub const PRESENTATION_SELECTOR: char = '\u{FE0F}';
/// U+200D ZERO WIDTH JOINER.
pub const ZWJ: char = '\u{200D}';
/// U+20E3 COMBINING ENCLOSING KEYCAP.
pub const COMBINING_KEYCAP: char = '\u{20E3}';

const MALE_SIGN: char = '\u{2642}';
const FEMALE_SIGN: char = '\u{2640}';

/// Skin tone modifiers U+1F3FB..=U+1F3FF.
const FITZPATRICK_MODIFIERS: std::ops::RangeInclusive<char> = '\u{1F3FB}'..='\u{1F3FF}';

/// Two-person families and not-yet-supported sequences that contain
/// modifier bases but have no toned artwork in any vendor set.
const TONE_DENYLIST: &[&str] = &[
    "\u{1F469}\u{200D}\u{1F466}",
    "\u{1F469}\u{200D}\u{1F467}",
    "\u{1F468}\u{200D}\u{1F467}",
    "\u{1F468}\u{200D}\u{1F466}",
    "\u{1F9D1}\u{200D}\u{1F9D2}",
];

static EMOJI: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\p{Emoji}$").expect("Emoji property class is valid"));

static MODIFIER_BASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\p{Emoji_Modifier_Base}$").expect("Emoji_Modifier_Base property class is valid")
});

fn char_matches(class: &Regex, c: char) -> bool {
    let mut buf = [0u8; 4];
    class.is_match(c.encode_utf8(&mut buf))
}

/// Returns true if `c` has the Unicode `Emoji` property.
#[must_use]
pub fn is_emoji(c: char) -> bool {
    char_matches(&EMOJI, c)
}

/// Returns true if `c` has the Unicode `Emoji_Modifier_Base` property.
#[must_use]
pub fn is_modifier_base(c: char) -> bool {
    char_matches(&MODIFIER_BASE, c)
}

/// Returns true if `c` is one of the five Fitzpatrick skin tone modifiers.
#[must_use]
pub fn is_fitzpatrick_modifier(c: char) -> bool {
    FITZPATRICK_MODIFIERS.contains(&c)
}

/// Returns true for the characters that start a keycap sequence.
#[must_use]
pub const fn is_keycap_base(c: char) -> bool {
    c.is_ascii_digit() || c == '#' || c == '*'
}

/// Forces emoji presentation on every component of `text`.
///
/// Each grapheme cluster is split on ZWJ and every component is rewritten:
///
/// - a keycap base directly followed by U+20E3 gets U+FE0F inserted between
///   the two;
/// - a lone codepoint with the `Emoji` property (including the gender
///   signs) gets U+FE0F appended;
/// - anything else is left as is.
///
/// The function is idempotent.
///
/// # Examples
///
/// ```
/// use emoji_canon::grapheme::force_presentation;
///
/// assert_eq!(force_presentation("\u{2714}"), "\u{2714}\u{FE0F}");
/// assert_eq!(force_presentation("1\u{20E3}"), "1\u{FE0F}\u{20E3}");
/// assert_eq!(
///     force_presentation("\u{1F9D1}\u{200D}\u{1F4BB}"),
///     "\u{1F9D1}\u{FE0F}\u{200D}\u{1F4BB}\u{FE0F}"
/// );
/// ```
#[must_use]
pub fn force_presentation(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);

    for cluster in text.graphemes(true) {
        for (index, component) in cluster.split(ZWJ).enumerate() {
            if index > 0 {
                out.push(ZWJ);
            }
            push_component(&mut out, component);
        }
    }

    out
}

fn push_component(out: &mut String, component: &str) {
    let mut chars = component.chars();
    let first = chars.next();
    let second = chars.next();
    let third = chars.next();

    match (first, second, third) {
        (Some(base), Some(COMBINING_KEYCAP), None) if is_keycap_base(base) => {
            out.push(base);
            out.push(PRESENTATION_SELECTOR);
            out.push(COMBINING_KEYCAP);
        }
        (Some(single), None, None) if is_emoji(single) => {
            out.push(single);
            out.push(PRESENTATION_SELECTOR);
        }
        (Some(sign @ (MALE_SIGN | FEMALE_SIGN)), None, None) => {
            out.push(sign);
            out.push(PRESENTATION_SELECTOR);
        }
        _ => out.push_str(component),
    }
}

/// Decides whether `emoji` can carry a skin tone.
///
/// Skin tone modifiers are stripped first. The emoji is tonable when at
/// least one `Emoji_Modifier_Base` codepoint remains, at most two remain,
/// and the stripped sequence is not on the denylist.
///
/// # Examples
///
/// ```
/// use emoji_canon::grapheme::can_be_toned;
///
/// assert!(can_be_toned("\u{1F3C3}"));          // runner
/// assert!(can_be_toned("\u{1F44B}\u{1F3FD}")); // waving hand, medium
/// assert!(!can_be_toned("\u{1F600}"));         // grinning face
/// ```
#[must_use]
pub fn can_be_toned(emoji: &str) -> bool {
    let stripped: String = emoji
        .chars()
        .filter(|c| !is_fitzpatrick_modifier(*c))
        .collect();

    let modifier_bases = stripped.chars().filter(|c| is_modifier_base(*c)).count();
    if modifier_bases > 2 || is_denylisted(&stripped) {
        return false;
    }

    modifier_bases > 0
}

fn is_denylisted(stripped: &str) -> bool {
    let bare: String = stripped
        .chars()
        .filter(|c| *c != PRESENTATION_SELECTOR)
        .collect();
    TONE_DENYLIST.contains(&bare.as_str())
}
