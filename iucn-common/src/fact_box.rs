//! Fact box view
//!
//! Typed, read-only accessors over the cleaned parameters of a `Taxobox`
//! template. Malformed numeric values read as absent rather than failing,
//! which makes the fact box look outdated and gets it rewritten.

use crate::assessment::Assessment;
use crate::fields::{CleanedFieldMap, RawFieldMap};
use crate::outdated;
use crate::status::{self, StatusCode};

/// Red List taxon id parameter
pub const FIELD_RED_LIST_ID: &str = "rl-id";
/// Status parameter (free text, see `StatusCode::parse`)
pub const FIELD_STATUS: &str = "status";
/// Assessment year parameter ("status source")
pub const FIELD_YEAR_ASSESSED: &str = "statusbron";
/// Scientific name parameter
pub const FIELD_SCIENTIFIC_NAME: &str = "w-naam";
/// Common (Dutch) name parameter
pub const FIELD_COMMON_NAME: &str = "naam";

/// Key used to look up the assessment of the species described by a fact box
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupKey {
    RedListId(u64),
    Name(String),
}

/// Read-only projection of one fact box
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactBox {
    fields: CleanedFieldMap,
}

impl FactBox {
    /// Sanitize the raw fields and wrap them
    pub fn new(raw: &RawFieldMap) -> Self {
        Self { fields: raw.clean() }
    }

    pub fn fields(&self) -> &CleanedFieldMap {
        &self.fields
    }

    /// Red List id, if present and all digits
    pub fn red_list_id(&self) -> Option<u64> {
        self.digits(FIELD_RED_LIST_ID)
    }

    /// Stored status text after sanitizing
    pub fn status_text(&self) -> Option<&str> {
        self.fields.get(FIELD_STATUS)
    }

    /// Stored status parsed with the vocabulary
    pub fn status(&self) -> Option<StatusCode> {
        self.status_text().and_then(StatusCode::parse)
    }

    pub fn scientific_name(&self) -> Option<&str> {
        self.fields.get(FIELD_SCIENTIFIC_NAME)
    }

    pub fn common_name(&self) -> Option<&str> {
        self.fields.get(FIELD_COMMON_NAME)
    }

    /// Scientific name, falling back to the common name
    pub fn preferred_name(&self) -> Option<&str> {
        self.scientific_name().or_else(|| self.common_name())
    }

    /// Assessment year, if present and all digits
    pub fn year_assessed(&self) -> Option<i32> {
        self.digits(FIELD_YEAR_ASSESSED)
    }

    /// True if the stored status says extinct (fossil spellings included)
    pub fn is_extinct(&self) -> bool {
        self.status_text()
            .is_some_and(status::extended_extinct_match)
    }

    /// See [`outdated::is_outdated`]
    pub fn is_outdated(&self, assessment: &Assessment) -> bool {
        outdated::is_outdated(self, assessment)
    }

    /// Lookup key for the Red List service
    ///
    /// Priority: stored id, scientific name, common name, then the page
    /// title. Empty names are skipped.
    pub fn lookup_key(&self, page_title: &str) -> LookupKey {
        if let Some(id) = self.red_list_id() {
            return LookupKey::RedListId(id);
        }

        let name = [self.scientific_name(), self.common_name()]
            .into_iter()
            .flatten()
            .find(|name| !name.is_empty())
            .unwrap_or(page_title);

        LookupKey::Name(name.to_string())
    }

    fn digits<T: std::str::FromStr>(&self, field: &str) -> Option<T> {
        self.fields
            .get(field)
            .filter(|value| !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|value| value.parse().ok())
    }
}
