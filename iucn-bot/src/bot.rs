//! Bot run loop
//!
//! Walks the configured categories, reconciles every page not on the
//! skip-list and saves the pages that changed. Pages are handled one at a
//! time; a failing page is reported and the run moves on.

use crate::error::BotResult;
use crate::services::{AssessedPages, AssessmentSource, WikiSource};
use chrono::{DateTime, Utc};
use iucn_common::{Outcome, Reconciler, SkipReason, Stage, TemplateEngine};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Fetches, reconciles and reports on single pages; never saves
pub struct PageProcessor<W, A, E> {
    wiki: W,
    assessments: A,
    reconciler: Reconciler<E>,
}

impl<W, A, E> PageProcessor<W, A, E>
where
    W: WikiSource,
    A: AssessmentSource,
    E: TemplateEngine,
{
    pub fn new(wiki: W, assessments: A, reconciler: Reconciler<E>) -> Self {
        Self {
            wiki,
            assessments,
            reconciler,
        }
    }

    pub fn wiki(&self) -> &W {
        &self.wiki
    }

    pub fn assessments(&self) -> &A {
        &self.assessments
    }

    /// Reconcile the current text of `title`
    pub async fn check(&self, title: &str) -> Outcome {
        match self.try_check(title).await {
            Ok(outcome) => outcome,
            Err(e) => Outcome::Failed {
                reason: e.to_string(),
            },
        }
    }

    async fn try_check(&self, title: &str) -> BotResult<Outcome> {
        let document = self.wiki.fetch_page(title).await?;

        let pending = match self.reconciler.begin(&document)? {
            Stage::Skipped(reason) => return Ok(Outcome::Skipped(reason)),
            Stage::Ready(pending) => pending,
        };

        let key = pending.lookup_key(title);
        debug!(title = %title, key = ?key, "Looking up assessment");

        let record = self.assessments.lookup(&key).await?;
        Ok(pending.complete(&record)?)
    }

    /// Save an updated page; other outcomes pass through
    async fn save(&self, title: &str, outcome: Outcome) -> Outcome {
        let Outcome::Updated { text } = outcome else {
            return outcome;
        };

        match self.wiki.save_page(title, &text).await {
            Ok(()) => Outcome::Updated { text },
            Err(e) => Outcome::Failed {
                reason: e.to_string(),
            },
        }
    }
}

/// Run loop settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Reconcile and report, but never save or touch the skip-list
    pub dry_run: bool,
    /// Pause after every saved edit
    pub edit_interval: Duration,
    /// Stop after this many pages have been handled
    pub max_pages: Option<usize>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            edit_interval: Duration::from_secs(crate::config::DEFAULT_EDIT_INTERVAL_SECS),
            max_pages: None,
        }
    }
}

/// Counts per outcome for one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub updated: usize,
    pub up_to_date: usize,
    pub edit_denied: usize,
    pub failed: usize,
    /// Titles passed over because of the skip-list
    pub already_assessed: usize,
}

impl RunSummary {
    pub fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Updated { .. } => self.updated += 1,
            Outcome::Skipped(SkipReason::UpToDate) => self.up_to_date += 1,
            Outcome::Skipped(SkipReason::EditDenied) => self.edit_denied += 1,
            Outcome::Failed { .. } => self.failed += 1,
        }
    }

    /// Pages reconciled (skip-list hits excluded)
    pub fn handled(&self) -> usize {
        self.updated + self.up_to_date + self.edit_denied + self.failed
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} updated, {} up to date, {} edit denied, {} failed, {} already assessed",
            self.updated, self.up_to_date, self.edit_denied, self.failed, self.already_assessed
        )
    }
}

/// One-line report for a page: `done`, `skipped (...)` or `failed: ...`
pub fn report(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Updated { .. } => "done".to_string(),
        Outcome::Skipped(reason) => format!("skipped ({})", reason),
        Outcome::Failed { reason } => format!("failed: {}", reason),
    }
}

/// The bot
pub struct Bot<W, A, E> {
    processor: PageProcessor<W, A, E>,
    assessed: AssessedPages,
    options: RunOptions,
}

impl<W, A, E> Bot<W, A, E>
where
    W: WikiSource,
    A: AssessmentSource,
    E: TemplateEngine,
{
    pub fn new(processor: PageProcessor<W, A, E>, assessed: AssessedPages, options: RunOptions) -> Self {
        Self {
            processor,
            assessed,
            options,
        }
    }

    pub fn processor(&self) -> &PageProcessor<W, A, E> {
        &self.processor
    }

    pub fn assessed(&self) -> &AssessedPages {
        &self.assessed
    }

    /// Reconcile every page in `categories`
    ///
    /// # Errors
    /// Only category listing failures end the run early; page failures are
    /// counted in the summary.
    pub async fn run(&mut self, categories: &[String]) -> BotResult<RunSummary> {
        let started: DateTime<Utc> = Utc::now();
        let mut summary = RunSummary::default();

        info!(
            categories = categories.len(),
            dry_run = self.options.dry_run,
            skip_list = %self.assessed.path().display(),
            "Starting run"
        );

        'categories: for category in categories {
            info!(category = %category, "Traversing category");
            let mut continuation = None;

            loop {
                let batch = self
                    .processor
                    .wiki
                    .category_batch(category, continuation.as_ref())
                    .await?;

                for title in &batch.titles {
                    if self
                        .options
                        .max_pages
                        .is_some_and(|max| summary.handled() >= max)
                    {
                        info!("Page limit reached");
                        break 'categories;
                    }

                    if self.assessed.is_assessed(title) {
                        summary.already_assessed += 1;
                        continue;
                    }

                    let outcome = self.handle(title).await;
                    summary.record(&outcome);
                }

                match batch.next {
                    Some(next) => continuation = Some(next),
                    None => break,
                }
            }
        }

        let elapsed = Utc::now() - started;
        info!(
            updated = summary.updated,
            up_to_date = summary.up_to_date,
            edit_denied = summary.edit_denied,
            failed = summary.failed,
            already_assessed = summary.already_assessed,
            elapsed_secs = elapsed.num_seconds(),
            "Run finished"
        );

        Ok(summary)
    }

    /// Reconcile, save and record one page
    async fn handle(&mut self, title: &str) -> Outcome {
        let outcome = self.processor.check(title).await;

        let outcome = if self.options.dry_run {
            outcome
        } else {
            self.processor.save(title, outcome).await
        };

        match &outcome {
            Outcome::Failed { reason } => warn!(title = %title, reason = %reason, "Page failed"),
            other => info!(title = %title, result = %report(other), "Page handled"),
        }

        if self.options.dry_run {
            return outcome;
        }

        if matches!(
            outcome,
            Outcome::Updated { .. } | Outcome::Skipped(SkipReason::UpToDate)
        ) {
            if let Err(e) = self.assessed.mark_assessed(title) {
                warn!(title = %title, error = %e, "Could not update skip-list");
            }
        }

        if matches!(outcome, Outcome::Updated { .. }) && !self.options.edit_interval.is_zero() {
            debug!("Rate limiting edits: waiting {:?}", self.options.edit_interval);
            tokio::time::sleep(self.options.edit_interval).await;
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_lines() {
        assert_eq!(report(&Outcome::Updated { text: "x".into() }), "done");
        assert_eq!(
            report(&Outcome::Skipped(SkipReason::UpToDate)),
            "skipped (up to date)"
        );
        assert_eq!(
            report(&Outcome::Failed {
                reason: "Not assessed".into()
            }),
            "failed: Not assessed"
        );
    }

    #[test]
    fn test_summary_counts() {
        let mut summary = RunSummary::default();
        summary.record(&Outcome::Updated { text: String::new() });
        summary.record(&Outcome::Skipped(SkipReason::EditDenied));
        summary.record(&Outcome::Failed { reason: String::new() });
        summary.already_assessed = 2;

        assert_eq!(summary.handled(), 3);
        assert_eq!(
            summary.to_string(),
            "1 updated, 0 up to date, 1 edit denied, 1 failed, 2 already assessed"
        );
    }
}
