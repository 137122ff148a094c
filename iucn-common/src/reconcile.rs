//! Per-document reconciliation driver
//!
//! Runs one page through: field extraction → fact box view → edit guard →
//! outdated decision → field merge → marker rewrite.
//!
//! # Stages
//! Fetching the assessment needs the fact box (its id or names) and
//! happens outside this crate, so the driver is split in two:
//! [`Reconciler::begin`] yields a [`Pending`] reconciliation holding the
//! fact box, and [`Pending::complete`] finishes it once the caller has the
//! assessment record. [`Reconciler::reconcile`] chains both for callers with
//! a synchronous lookup.
//!
//! Parsing and writing the template markup is delegated to a
//! [`TemplateEngine`]; only its map-in/text-out contract is relied upon.

use crate::assessment::{AssessmentRecord, FieldUpdate};
use crate::editability::is_edit_allowed;
use crate::fact_box::{FactBox, LookupKey};
use crate::fields::RawFieldMap;
use crate::marker::rewrite_marker;
use crate::{Error, Result};
use chrono::{Datelike, Utc};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;
use tracing::debug;

/// External fact box parser/writer
pub trait TemplateEngine {
    /// Parameters of the page's fact box, unsanitized
    fn extract_fields(&self, document: &str) -> Result<RawFieldMap>;

    /// Full page text with `update`'s fields set (added or overwritten) in
    /// the fact box; other parameters stay as they are
    fn merge_fields(&self, document: &str, update: &FieldUpdate) -> Result<String>;
}

impl<T: TemplateEngine + ?Sized> TemplateEngine for &T {
    fn extract_fields(&self, document: &str) -> Result<RawFieldMap> {
        (**self).extract_fields(document)
    }

    fn merge_fields(&self, document: &str, update: &FieldUpdate) -> Result<String> {
        (**self).merge_fields(document, update)
    }
}

/// Why a page was left untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Page opts out of bot edits or is being worked on
    EditDenied,
    /// Fact box already agrees with the assessment
    UpToDate,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::EditDenied => f.write_str("edit denied"),
            SkipReason::UpToDate => f.write_str("up to date"),
        }
    }
}

/// Result of reconciling one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Rewritten page text, ready to be saved
    Updated { text: String },
    Skipped(SkipReason),
    Failed { reason: String },
}

impl Outcome {
    pub fn failed(error: &Error) -> Self {
        Outcome::Failed {
            reason: error.to_string(),
        }
    }

    /// Short label for run reports: `updated`, `skipped` or `failed`
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Updated { .. } => "updated",
            Outcome::Skipped(_) => "skipped",
            Outcome::Failed { .. } => "failed",
        }
    }
}

/// First stage result
pub enum Stage<'a, E> {
    Skipped(SkipReason),
    Ready(Pending<'a, E>),
}

/// Reconciliation driver bound to a template engine
pub struct Reconciler<E> {
    engine: E,
    current_year: i32,
}

impl<E: TemplateEngine> Reconciler<E> {
    /// Driver validating assessment years against the current UTC year
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            current_year: Utc::now().year(),
        }
    }

    /// Pin the year used as the upper bound for assessment dates
    pub fn with_current_year(mut self, year: i32) -> Self {
        self.current_year = year;
        self
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Extract the fact box and apply the edit guard
    ///
    /// # Errors
    /// Template engine errors and malformed field maps.
    pub fn begin<'a>(&'a self, document: &'a str) -> Result<Stage<'a, E>> {
        let raw = self.engine.extract_fields(document)?;
        let fact_box = FactBox::new(&raw);

        debug!(
            fields = fact_box.fields().len(),
            red_list_id = ?fact_box.red_list_id(),
            status = ?fact_box.status_text(),
            "Extracted fact box"
        );

        if !is_edit_allowed(document) {
            return Ok(Stage::Skipped(SkipReason::EditDenied));
        }

        Ok(Stage::Ready(Pending {
            reconciler: self,
            document,
            fact_box,
        }))
    }

    /// Reconcile `document` using a synchronous assessment lookup
    ///
    /// Never fails: every error becomes `Outcome::Failed`.
    pub fn reconcile<F>(&self, document: &str, lookup: F) -> Outcome
    where
        F: FnOnce(&FactBox) -> Result<AssessmentRecord>,
    {
        let result = self.begin(document).and_then(|stage| match stage {
            Stage::Skipped(reason) => Ok(Outcome::Skipped(reason)),
            Stage::Ready(pending) => {
                let record = lookup(pending.fact_box())?;
                pending.complete(&record)
            }
        });

        result.unwrap_or_else(|e| Outcome::failed(&e))
    }
}

/// Reconciliation waiting for its assessment
pub struct Pending<'a, E> {
    reconciler: &'a Reconciler<E>,
    document: &'a str,
    fact_box: FactBox,
}

impl<'a, E: TemplateEngine> Pending<'a, E> {
    pub fn fact_box(&self) -> &FactBox {
        &self.fact_box
    }

    /// Red List lookup key, falling back to `page_title`
    pub fn lookup_key(&self, page_title: &str) -> LookupKey {
        self.fact_box.lookup_key(page_title)
    }

    /// Finish with a freshly fetched assessment record
    ///
    /// # Errors
    /// `Error::Validation` for a bad record, template engine errors, and
    /// `Error::MergeFailure` when the merged text lost its fact box.
    pub fn complete(self, record: &AssessmentRecord) -> Result<Outcome> {
        let assessment = record.validate(self.reconciler.current_year)?;

        if !self.fact_box.is_outdated(&assessment) {
            return Ok(Outcome::Skipped(SkipReason::UpToDate));
        }

        let update = assessment.field_update();
        debug!(
            rl_id = %update.red_list_id,
            status = %update.status,
            year = %update.year_assessed,
            "Fact box outdated, merging fields"
        );

        let merged = self
            .reconciler
            .engine
            .merge_fields(self.document, &update)?;

        if !has_fact_box_opener(&merged) {
            return Err(Error::MergeFailure(
                "Merged text no longer contains a Taxobox template".to_string(),
            ));
        }

        Ok(Outcome::Updated {
            text: rewrite_marker(&merged, assessment.status),
        })
    }
}

/// True if `text` still opens a `{{Taxobox` template
pub fn has_fact_box_opener(text: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\{\{\s*taxobox").expect("fact box opener regex"))
        .is_match(text)
}
