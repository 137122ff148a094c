//! iucn-bot library interface
//!
//! Keeps the IUCN Red List status in the fact boxes of Dutch Wikipedia
//! species pages up to date. The reconciliation itself lives in
//! `iucn-common`; this crate wires it to the wiki, the Red List API and the
//! external fact box parser.

pub mod bot;
pub mod config;
pub mod error;
pub mod services;

pub use crate::bot::{Bot, PageProcessor, RunOptions, RunSummary};
pub use crate::error::{BotError, BotResult};
