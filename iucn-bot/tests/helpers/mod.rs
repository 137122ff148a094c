//! Test Helper Utilities
//!
//! In-memory wiki, Red List and template engine for driving the bot

#![allow(dead_code)]

use async_trait::async_trait;
use iucn_bot::services::{
    AssessmentSource, CategoryBatch, Continuation, MediaWikiError, RedListError, WikiSource,
};
use iucn_bot::BotResult;
use iucn_common::{AssessmentRecord, Error, FieldKey, FieldUpdate, LookupKey, RawFieldMap, TemplateEngine};
use std::collections::HashMap;
use std::sync::Mutex;

/// Wiki holding pages in memory; categories are served in fixed batches
#[derive(Default)]
pub struct FakeWiki {
    pages: Mutex<HashMap<String, String>>,
    categories: HashMap<String, Vec<Vec<String>>>,
    saved: Mutex<Vec<(String, String)>>,
    pub fail_saves: bool,
}

impl FakeWiki {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, title: &str, text: &str) -> Self {
        self.pages.get_mut().unwrap().insert(title.to_string(), text.to_string());
        self
    }

    pub fn with_category(mut self, category: &str, batches: &[&[&str]]) -> Self {
        let batches = batches
            .iter()
            .map(|batch| batch.iter().map(|t| t.to_string()).collect())
            .collect();
        self.categories.insert(category.to_string(), batches);
        self
    }

    pub fn page(&self, title: &str) -> Option<String> {
        self.pages.lock().unwrap().get(title).cloned()
    }

    pub fn saved(&self) -> Vec<(String, String)> {
        self.saved.lock().unwrap().clone()
    }
}

#[async_trait]
impl WikiSource for FakeWiki {
    async fn category_batch(
        &self,
        category: &str,
        continuation: Option<&Continuation>,
    ) -> BotResult<CategoryBatch> {
        let batches = self.categories.get(category).ok_or_else(|| MediaWikiError::ApiError {
            code: "nocategory".to_string(),
            info: category.to_string(),
        })?;

        let index = continuation
            .and_then(|c| c.get("cmcontinue"))
            .and_then(|c| c.parse::<usize>().ok())
            .unwrap_or(0);

        let titles = batches.get(index).cloned().unwrap_or_default();
        let next = (index + 1 < batches.len()).then(|| {
            Continuation::from([
                ("cmcontinue".to_string(), (index + 1).to_string()),
                ("continue".to_string(), "-||".to_string()),
            ])
        });

        Ok(CategoryBatch { titles, next })
    }

    async fn fetch_page(&self, title: &str) -> BotResult<String> {
        Ok(self.page(title).ok_or(MediaWikiError::InvalidContent)?)
    }

    async fn save_page(&self, title: &str, text: &str) -> BotResult<()> {
        if self.fail_saves {
            return Err(MediaWikiError::SaveFailed("editconflict".to_string()).into());
        }
        if text.trim().is_empty() {
            return Err(MediaWikiError::EmptyPage.into());
        }

        self.pages.lock().unwrap().insert(title.to_string(), text.to_string());
        self.saved.lock().unwrap().push((title.to_string(), text.to_string()));
        Ok(())
    }
}

/// Red List answering from a fixed table and recording every lookup
#[derive(Default)]
pub struct FakeRedList {
    records: Vec<(LookupKey, AssessmentRecord)>,
    lookups: Mutex<Vec<LookupKey>>,
}

impl FakeRedList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: LookupKey, id: i64, category: &str, date: Option<&str>) -> Self {
        self.records.push((
            key,
            AssessmentRecord {
                subject_id: id,
                category_text: category.to_string(),
                assessment_date_text: date.map(str::to_string),
            },
        ));
        self
    }

    pub fn lookups(&self) -> Vec<LookupKey> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl AssessmentSource for FakeRedList {
    async fn lookup(&self, key: &LookupKey) -> BotResult<AssessmentRecord> {
        self.lookups.lock().unwrap().push(key.clone());

        self.records
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, record)| record.clone())
            .ok_or_else(|| RedListError::NotAssessed.into())
    }
}

/// Reads and writes `| key = value` lines of the first `{{Taxobox` block
pub struct LineEngine;

impl LineEngine {
    fn block(document: &str) -> Option<(usize, usize)> {
        let start = document.find("{{Taxobox")?;
        let end = start + document[start..].find("\n}}")?;
        Some((start, end))
    }
}

impl TemplateEngine for LineEngine {
    fn extract_fields(&self, document: &str) -> iucn_common::Result<RawFieldMap> {
        let (start, end) = Self::block(document)
            .ok_or_else(|| Error::TemplateEngine("Could not parse taxobox".to_string()))?;

        let mut map = RawFieldMap::new();
        for line in document[start..end].lines().skip(1) {
            if let Some((key, value)) = line.trim_start_matches('|').split_once('=') {
                map.insert(FieldKey::named(key), value);
            }
        }
        Ok(map)
    }

    fn merge_fields(&self, document: &str, update: &FieldUpdate) -> iucn_common::Result<String> {
        let (start, end) = Self::block(document)
            .ok_or_else(|| Error::TemplateEngine("Could not update taxobox".to_string()))?;

        let mut lines: Vec<String> = document[start..end].lines().map(str::to_string).collect();
        for (field, value) in update.entries() {
            let line = format!("| {} = {}", field, value);
            match lines.iter_mut().skip(1).find(|l| {
                l.trim_start_matches('|')
                    .split_once('=')
                    .is_some_and(|(key, _)| key.trim() == field)
            }) {
                Some(existing) => *existing = line,
                None => lines.push(line),
            }
        }

        Ok(format!("{}{}{}", &document[..start], lines.join("\n"), &document[end..]))
    }
}
