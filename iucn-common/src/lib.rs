//! # IUCN Common Library
//!
//! Reconciliation core shared by the IUCN Red List bot:
//! - Field value sanitizing and field maps
//! - Status vocabulary (canonical codes, synonyms, category links)
//! - Fact box view and the outdated decision
//! - Classification marker rewriting
//! - Per-document reconciliation driver
//!
//! Everything here is synchronous and free of I/O. Fetching pages and
//! assessments, and saving results, belongs to the `iucn-bot` crate.

pub mod assessment;
pub mod editability;
pub mod error;
pub mod fact_box;
pub mod fields;
pub mod marker;
pub mod outdated;
pub mod reconcile;
pub mod sanitize;
pub mod status;

pub use assessment::{Assessment, AssessmentRecord, FieldUpdate};
pub use error::{Error, Result};
pub use fact_box::{FactBox, LookupKey};
pub use fields::{CleanedFieldMap, FieldKey, RawFieldMap};
pub use marker::rewrite_marker;
pub use outdated::is_outdated;
pub use reconcile::{Outcome, Pending, Reconciler, SkipReason, Stage, TemplateEngine};
pub use sanitize::sanitize;
pub use status::StatusCode;
