//! Red List status vocabulary
//!
//! Closed set of the nine canonical IUCN categories, with the free-text
//! synonyms editors use in fact boxes and the Dutch category phrase used
//! for the classification marker.
//!
//! # Matching
//! All lookups ignore case and whitespace: `Uitgestorven in het Wild`,
//! `uitgestorveninhetwild` and `UITGESTORVEN IN HET WILD` are the same
//! synonym.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Prefix of every classification marker category
pub const CATEGORY_PREFIX: &str = "Categorie:IUCN-status";

/// Informal extinct synonyms accepted only by the extinction guard
const FOSSIL_SYNONYMS: &[&str] = &["fossil", "fossiel"];

/// Canonical Red List status code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StatusCode {
    /// Extinct
    EX,
    /// Extinct in the wild
    EW,
    /// Critically endangered
    CR,
    /// Endangered
    EN,
    /// Vulnerable
    VU,
    /// Conservation dependent (deprecated lower-risk subcategory)
    CD,
    /// Near threatened
    NT,
    /// Least concern
    LC,
    /// Data deficient
    DD,
}

/// Error returned by the strict `FromStr` parse
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown status code: {0}")]
pub struct UnknownStatus(pub String);

impl StatusCode {
    /// All codes, ordered from extinct to data deficient
    pub const ALL: [StatusCode; 9] = [
        StatusCode::EX,
        StatusCode::EW,
        StatusCode::CR,
        StatusCode::EN,
        StatusCode::VU,
        StatusCode::CD,
        StatusCode::NT,
        StatusCode::LC,
        StatusCode::DD,
    ];

    /// Canonical display code, as written into the fact box
    pub fn display_code(self) -> &'static str {
        match self {
            StatusCode::EX => "EX",
            StatusCode::EW => "EW",
            StatusCode::CR => "CR",
            StatusCode::EN => "EN",
            StatusCode::VU => "VU",
            StatusCode::CD => "CD",
            StatusCode::NT => "NT",
            StatusCode::LC => "LC",
            StatusCode::DD => "DD",
        }
    }

    /// Dutch phrase used in the classification marker category
    pub fn category_phrase(self) -> &'static str {
        match self {
            StatusCode::EX => "uitgestorven",
            StatusCode::EW => "uitgestorven in het wild",
            StatusCode::CR => "kritiek",
            StatusCode::EN => "bedreigd",
            StatusCode::VU => "kwetsbaar",
            StatusCode::CD => "van bescherming afhankelijk",
            StatusCode::NT => "gevoelig",
            StatusCode::LC => "niet bedreigd",
            StatusCode::DD => "onzeker",
        }
    }

    /// Free-text strings accepted as denoting this code
    ///
    /// Stored lowercase; the slash forms are the deprecated 1994
    /// lower-risk notation.
    pub fn synonyms(self) -> &'static [&'static str] {
        match self {
            StatusCode::EX => &["ex", "extinct", "uitgestorven"],
            StatusCode::EW => &[
                "ew",
                "extinct in the wild",
                "uitgestorven in het wild",
                "uihw",
            ],
            StatusCode::CR => &["cr", "critically endangered", "kritiek"],
            StatusCode::EN => &["en", "endangered", "bedreigd"],
            StatusCode::VU => &["vu", "vulnerable", "kwetsbaar"],
            StatusCode::CD => &[
                "cd",
                "lr/cd",
                "conservation dependent",
                "van bescherming afhankelijk",
                "vba",
            ],
            StatusCode::NT => &["nt", "lr/nt", "near threatened", "gevoelig"],
            StatusCode::LC => &[
                "lc",
                "lr/lc",
                "least concern",
                "niet bedreigd",
                "veilig",
                "secure",
            ],
            StatusCode::DD => &["dd", "data deficient", "onzeker"],
        }
    }

    /// Parse free text against the union of all synonym tables
    pub fn parse(text: &str) -> Option<StatusCode> {
        let needle = normalize(text);
        if needle.is_empty() {
            return None;
        }

        StatusCode::ALL
            .into_iter()
            .find(|code| code.synonyms().iter().any(|s| normalize(s) == needle))
    }

    /// Strict parse: only the exact display code is accepted
    pub fn from_code(code: &str) -> Option<StatusCode> {
        StatusCode::ALL
            .into_iter()
            .find(|candidate| candidate.display_code() == code)
    }

    /// True iff `text` is one of this code's synonyms
    pub fn matches(self, text: &str) -> bool {
        let needle = normalize(text);
        self.synonyms().iter().any(|s| normalize(s) == needle)
    }

    /// Category name for the classification marker
    pub fn category(self) -> String {
        format!("{} {}", CATEGORY_PREFIX, self.category_phrase())
    }

    /// Classification marker link, e.g. `[[Categorie:IUCN-status kwetsbaar]]`
    pub fn category_link(self) -> String {
        format!("[[{}]]", self.category())
    }
}

/// Extinct match used only by the extinction guard
///
/// Accepts EX's synonyms plus the informal "fossil" spellings, which are
/// not part of the official vocabulary and never returned by `parse`.
pub fn extended_extinct_match(text: &str) -> bool {
    if StatusCode::EX.matches(text) {
        return true;
    }

    let needle = normalize(text);
    FOSSIL_SYNONYMS.iter().any(|s| *s == needle)
}

fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_code())
    }
}

impl FromStr for StatusCode {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StatusCode::from_code(s).ok_or_else(|| UnknownStatus(s.to_string()))
    }
}
