//! External services used by the bot
//!
//! The run loop talks to the wiki and the Red List through the
//! [`WikiSource`] and [`AssessmentSource`] seams so it can be driven by
//! in-memory fakes in tests.

pub mod assessed_pages;
pub mod mediawiki_client;
pub mod redlist_client;
pub mod template_engine;

pub use assessed_pages::AssessedPages;
pub use mediawiki_client::{CategoryBatch, Continuation, MediaWikiClient, MediaWikiError};
pub use redlist_client::{RedListClient, RedListError};
pub use template_engine::CommandTemplateEngine;

use crate::error::BotResult;
use async_trait::async_trait;
use iucn_common::{AssessmentRecord, LookupKey};

/// Pages to work on, and where to save them
#[async_trait]
pub trait WikiSource: Send + Sync {
    async fn category_batch(
        &self,
        category: &str,
        continuation: Option<&Continuation>,
    ) -> BotResult<CategoryBatch>;

    async fn fetch_page(&self, title: &str) -> BotResult<String>;

    async fn save_page(&self, title: &str, text: &str) -> BotResult<()>;
}

/// Where assessments come from
#[async_trait]
pub trait AssessmentSource: Send + Sync {
    async fn lookup(&self, key: &LookupKey) -> BotResult<AssessmentRecord>;
}

#[async_trait]
impl WikiSource for MediaWikiClient {
    async fn category_batch(
        &self,
        category: &str,
        continuation: Option<&Continuation>,
    ) -> BotResult<CategoryBatch> {
        Ok(MediaWikiClient::category_batch(self, category, continuation).await?)
    }

    async fn fetch_page(&self, title: &str) -> BotResult<String> {
        Ok(MediaWikiClient::fetch_page(self, title).await?)
    }

    async fn save_page(&self, title: &str, text: &str) -> BotResult<()> {
        Ok(MediaWikiClient::save_page(self, title, text).await?)
    }
}

#[async_trait]
impl AssessmentSource for RedListClient {
    async fn lookup(&self, key: &LookupKey) -> BotResult<AssessmentRecord> {
        Ok(RedListClient::lookup(self, key).await?)
    }
}
