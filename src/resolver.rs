//! Resolution of candidate identities to canonical names.

use tracing::trace;

use crate::grapheme::force_presentation;
use crate::models::ToneLevel;
use crate::tables::Tables;

/// Maps candidate identities to canonical names.
///
/// Lookup tries the identity exactly as given and then its
/// presentation-forced form. A toned request for a name that cannot carry
/// tones resolves to nothing.
#[derive(Debug, Clone, Copy)]
pub struct IdentityResolver<'a> {
    tables: &'a Tables,
}

impl<'a> IdentityResolver<'a> {
    /// Creates a resolver over the run's tables.
    #[must_use]
    pub const fn new(tables: &'a Tables) -> Self {
        Self { tables }
    }

    /// The tables backing this resolver.
    #[must_use]
    pub const fn tables(&self) -> &'a Tables {
        self.tables
    }

    /// Resolves `candidate` (optionally toned) to its canonical name.
    ///
    /// # Examples
    ///
    /// ```
    /// use emoji_canon::resolver::IdentityResolver;
    /// use emoji_canon::tables::{FitzpatrickScale, Tables};
    /// use std::collections::{HashMap, HashSet};
    ///
    /// let tables = Tables::new(
    ///     HashMap::from([("\u{2714}\u{FE0F}".to_string(), "check".to_string())]),
    ///     HashSet::new(),
    ///     HashMap::new(),
    ///     FitzpatrickScale::standard(),
    /// );
    /// let resolver = IdentityResolver::new(&tables);
    ///
    /// assert_eq!(resolver.resolve("\u{2714}", None), Some("check"));
    /// ```
    #[must_use]
    pub fn resolve(&self, candidate: &str, tone: Option<ToneLevel>) -> Option<&'a str> {
        let name = self.tables.name_for(candidate).or_else(|| {
            let forced = force_presentation(candidate);
            self.tables.name_for(&forced)
        });

        let Some(name) = name else {
            trace!(candidate = %candidate.escape_unicode(), "No canonical name");
            return None;
        };

        if tone.is_some() && !self.tables.is_tonable(name) {
            trace!(name, "Toned asset for a name without tones");
            return None;
        }

        Some(name)
    }
}
