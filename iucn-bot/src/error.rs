//! Error types for iucn-bot

use crate::services::mediawiki_client::MediaWikiError;
use crate::services::redlist_client::RedListError;
use thiserror::Error;

/// Bot error type
///
/// Anything that can go wrong while handling a single page. The run loop
/// reports it as `failed: <reason>` and moves on.
#[derive(Debug, Error)]
pub enum BotError {
    /// Red List lookup failed
    #[error(transparent)]
    RedList(#[from] RedListError),

    /// Wiki request failed
    #[error(transparent)]
    MediaWiki(#[from] MediaWikiError),

    /// Reconciliation core error
    #[error(transparent)]
    Common(#[from] iucn_common::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for bot operations
pub type BotResult<T> = std::result::Result<T, BotError>;
