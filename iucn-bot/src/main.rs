//! iucn-bot - IUCN Red List status bot for the Dutch Wikipedia
//!
//! `run` walks the species categories and updates outdated fact boxes;
//! `check <title>` reconciles a single page without saving it.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use iucn_bot::bot::report;
use iucn_bot::config::{self, BotConfig};
use iucn_bot::services::{AssessedPages, CommandTemplateEngine, MediaWikiClient, RedListClient};
use iucn_bot::{Bot, PageProcessor, RunOptions};
use iucn_common::{Outcome, Reconciler};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "iucn-bot", version, about = "Keeps IUCN Red List statuses on species pages up to date")]
struct Cli {
    /// Config file (default: ~/.config/iucnbot/config.toml)
    #[arg(long, global = true, env = "IUCNBOT_CONFIG")]
    config: Option<PathBuf>,

    /// Red List API token
    #[arg(long, global = true)]
    redlist_token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Reconcile every page in the configured categories
    Run {
        /// Report what would change without saving anything
        #[arg(long)]
        dry_run: bool,

        /// Category to traverse instead of the configured ones (repeatable)
        #[arg(long = "category")]
        categories: Vec<String>,

        /// Stop after this many pages
        #[arg(long)]
        limit: Option<usize>,

        /// Seconds to wait after every saved edit
        #[arg(long)]
        edit_interval: Option<u64>,

        /// Skip-list file
        #[arg(long)]
        skip_list: Option<PathBuf>,

        /// Bot user name
        #[arg(long)]
        wiki_user: Option<String>,

        /// Bot password
        #[arg(long)]
        wiki_password: Option<String>,
    },

    /// Reconcile one page and print the result without saving
    Check {
        /// Page title
        title: String,

        /// Print the rewritten page text
        #[arg(long)]
        show_text: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = BotConfig::load(cli.config.as_deref())?;
    config.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .init();

    info!("Starting iucn-bot");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let token = config::resolve_redlist_token(cli.redlist_token.as_deref(), &config)?;
    let redlist = RedListClient::new(&config.redlist.base_url, &token, config.redlist.min_interval_ms)?;
    let wiki = MediaWikiClient::new(&config.wiki.endpoint)?;
    let engine = CommandTemplateEngine::new(
        config.template_engine.extract.clone(),
        config.template_engine.merge.clone(),
    );
    let processor = PageProcessor::new(wiki, redlist, Reconciler::new(engine));

    match cli.command {
        Command::Check { title, show_text } => {
            let outcome = processor.check(&title).await;
            println!("{}: {}", title, report(&outcome));
            if let (true, Outcome::Updated { text }) = (show_text, &outcome) {
                println!("{}", text);
            }
        }

        Command::Run {
            dry_run,
            categories,
            limit,
            edit_interval,
            skip_list,
            wiki_user,
            wiki_password,
        } => {
            if !dry_run {
                let (user, password) = config::resolve_wiki_credentials(
                    wiki_user.as_deref(),
                    wiki_password.as_deref(),
                    &config,
                )?;
                processor
                    .wiki()
                    .login(&user, &password)
                    .await
                    .context("Failed to log in to the wiki")?;
            }

            let skip_list = skip_list.unwrap_or_else(|| config.skip_list.clone());
            let assessed = AssessedPages::open(&skip_list)
                .with_context(|| format!("Failed to open skip-list {}", skip_list.display()))?;
            info!(pages = assessed.len(), "Skip-list loaded");

            let options = RunOptions {
                dry_run,
                edit_interval: edit_interval
                    .map(Duration::from_secs)
                    .unwrap_or_else(|| config.edit_interval()),
                max_pages: limit,
            };

            let categories = if categories.is_empty() {
                config.wiki.categories.clone()
            } else {
                categories
            };

            let mut bot = Bot::new(processor, assessed, options);
            let summary = bot.run(&categories).await?;
            println!("... done: {}", summary);
        }
    }

    Ok(())
}
