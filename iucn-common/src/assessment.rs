//! Red List assessments
//!
//! `AssessmentRecord` is what the lookup service hands over; it becomes an
//! `Assessment` only after validation against the status vocabulary and
//! the date bounds.

use crate::fact_box::{FIELD_RED_LIST_ID, FIELD_STATUS, FIELD_YEAR_ASSESSED};
use crate::status::StatusCode;
use crate::{Error, Result};
use chrono::{Datelike, NaiveDate};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Date format of `assessment_date_text`
pub const ASSESSMENT_DATE_FORMAT: &str = "%Y-%m-%d";

/// First year of the Red List categories; earlier assessment years are invalid
pub const VOCABULARY_INCEPTION_YEAR: i32 = 1964;

/// Unvalidated assessment as returned by the lookup service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentRecord {
    pub subject_id: i64,
    pub category_text: String,
    pub assessment_date_text: Option<String>,
}

/// Validated assessment of one taxon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assessment {
    /// Red List taxon id (always positive)
    pub subject_id: u64,
    pub status: StatusCode,
    pub year_assessed: Option<i32>,
}

impl Assessment {
    pub fn new(subject_id: u64, status: StatusCode, year_assessed: Option<i32>) -> Self {
        Self {
            subject_id,
            status,
            year_assessed,
        }
    }

    /// Fields to write into the fact box for this assessment
    pub fn field_update(&self) -> FieldUpdate {
        FieldUpdate {
            red_list_id: self.subject_id.to_string(),
            status: self.status.display_code().to_string(),
            year_assessed: self
                .year_assessed
                .map(|year| year.to_string())
                .unwrap_or_default(),
        }
    }
}

impl AssessmentRecord {
    /// Validate into an `Assessment`
    ///
    /// # Errors
    /// `Error::Validation` when the id is not positive, the category is not
    /// in the vocabulary, or the date does not parse or falls outside
    /// `VOCABULARY_INCEPTION_YEAR..=current_year`.
    pub fn validate(&self, current_year: i32) -> Result<Assessment> {
        let subject_id = u64::try_from(self.subject_id)
            .ok()
            .filter(|id| *id > 0)
            .ok_or_else(|| {
                Error::Validation(format!("Invalid subject id: {}", self.subject_id))
            })?;

        let status = StatusCode::parse(&self.category_text).ok_or_else(|| {
            Error::Validation(format!("Unknown category: '{}'", self.category_text))
        })?;

        let year_assessed = match self.assessment_date_text.as_deref() {
            Some(text) => Some(parse_assessment_year(text, current_year)?),
            None => None,
        };

        Ok(Assessment {
            subject_id,
            status,
            year_assessed,
        })
    }
}

/// Parse the year out of an assessment date
///
/// Only the leading `YYYY-MM-DD` is read, so a trailing time part is
/// ignored.
pub fn parse_assessment_year(text: &str, current_year: i32) -> Result<i32> {
    let text = text.trim();
    let date_part = text.get(..10).unwrap_or(text);

    let date = NaiveDate::parse_from_str(date_part, ASSESSMENT_DATE_FORMAT).map_err(|e| {
        Error::Validation(format!("Invalid assessment date '{}': {}", text, e))
    })?;

    let year = date.year();
    if !(VOCABULARY_INCEPTION_YEAR..=current_year).contains(&year) {
        return Err(Error::Validation(format!(
            "Assessment year {} outside {}..={}",
            year, VOCABULARY_INCEPTION_YEAR, current_year
        )));
    }

    Ok(year)
}

/// Exactly the fact box fields set by a reconciliation, in write order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldUpdate {
    pub red_list_id: String,
    pub status: String,
    /// Empty when the assessment carries no year
    pub year_assessed: String,
}

impl FieldUpdate {
    /// `(field, value)` pairs in write order
    pub fn entries(&self) -> [(&'static str, &str); 3] {
        [
            (FIELD_RED_LIST_ID, self.red_list_id.as_str()),
            (FIELD_STATUS, self.status.as_str()),
            (FIELD_YEAR_ASSESSED, self.year_assessed.as_str()),
        ]
    }
}

impl Serialize for FieldUpdate {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        for (key, value) in self.entries() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
