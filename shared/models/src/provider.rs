//! Provider identity.

use std::fmt;

/// Providers this system knows how to attribute observations to. The
/// `source` field of an observation is an open string so future providers
/// can be added without touching the data model; these are the two the
/// comparator and deduplicator reason about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnownProvider {
    PubChem,
    Wikidata,
}

impl KnownProvider {
    /// Stable identifier used in source attribution and tie-breaks. The
    /// Wikidata provider attributes to "Wikipedia", the name users see.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PubChem => "PubChem",
            Self::Wikidata => "Wikipedia",
        }
    }
}

impl fmt::Display for KnownProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The provider whose observations win ties: it tends to deliver
/// pre-parsed, well-structured values.
pub const PREFERRED_PROVIDER: KnownProvider = KnownProvider::Wikidata;
