//! birdbuddy: command-line access to a Bird Buddy account.
//!
//! Credentials come from `BIRDBUDDY_EMAIL`/`BIRDBUDDY_PASSWORD` or
//! `BIRDBUDDY_REFRESH_TOKEN`, optionally through a `.env` file.

use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use birdbuddy_client::{BirdBuddy, ClientConfig, FinishOptions};
use birdbuddy_core::defaults::FEED_PAGE_SIZE;
use birdbuddy_core::{FeedNodeType, FinishStrategy};

#[derive(Parser)]
#[command(name = "birdbuddy")]
#[command(author, version, about = "Bird Buddy smart feeder client")]
#[command(propagate_version = true)]
struct Cli {
    /// Accept-Language for species names
    #[arg(long, env = "BIRDBUDDY_LANGUAGE")]
    language: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List feeders on the account
    Feeders,

    /// Show the most recent feed items
    Feed {
        /// Number of items to fetch
        #[arg(short, long, default_value_t = FEED_PAGE_SIZE)]
        first: u32,
    },

    /// List postcards waiting to be collected
    Postcards,

    /// Collect all new postcards
    Collect {
        /// Weakest strategy allowed: recognized, best-guess or mystery
        #[arg(short, long, default_value = "recognized")]
        strategy: FinishStrategy,

        /// Minimum confidence for a best guess
        #[arg(short, long)]
        threshold: Option<u8>,

        /// Share collected media with the community
        #[arg(long)]
        share: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

// LOG_FORMAT: "json" or "text" (default "text")
// RUST_LOG:   env filter (default: info for the birdbuddy crates)
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "birdbuddy=info,birdbuddy_client=info,birdbuddy_core=info".into());
    let registry = tracing_subscriber::registry().with(env_filter);

    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    if log_format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = ClientConfig::from_env().context("Invalid Bird Buddy configuration")?;
    let client = BirdBuddy::new(config)?;
    if let Some(language) = &cli.language {
        client.set_language_code(language).await;
    }

    match cli.command {
        Commands::Feeders => cmd_feeders(&client).await,
        Commands::Feed { first } => cmd_feed(&client, first).await,
        Commands::Postcards => cmd_postcards(&client).await,
        Commands::Collect {
            strategy,
            threshold,
            share,
        } => {
            let mut options = FinishOptions::with_strategy(strategy).share(share);
            if let Some(threshold) = threshold {
                options = options.threshold(threshold);
            }
            cmd_collect(&client, options).await
        }
    }
}

async fn cmd_feeders(client: &BirdBuddy) -> anyhow::Result<()> {
    client.refresh().await.context("Failed to load account")?;
    let mut feeders: Vec<_> = client.feeders().await.into_values().collect();
    feeders.sort_by(|a, b| a.name().cmp(b.name()));

    for feeder in &feeders {
        let role = if feeder.is_owner() { "owner" } else { "member" };
        println!("{}  {}  ({})", feeder.id, feeder, role);
    }
    if feeders.is_empty() {
        println!("No feeders");
    }
    Ok(())
}

async fn cmd_feed(client: &BirdBuddy, first: u32) -> anyhow::Result<()> {
    let feed = client.feed(first, None).await.context("Failed to load feed")?;
    for node in feed.nodes() {
        println!("{}  {}  {}", node.created_at.to_rfc3339(), node.node_type, node.id);
    }
    if feed.page_info.has_next_page {
        if let Some(cursor) = feed.page_end_cursor() {
            println!("(more items after {})", cursor);
        }
    }
    Ok(())
}

async fn cmd_postcards(client: &BirdBuddy) -> anyhow::Result<()> {
    let postcards = client.feed_nodes(FeedNodeType::NewPostcard).await?;
    for postcard in &postcards {
        println!("{}  {}", postcard.created_at.to_rfc3339(), postcard.id);
    }
    println!("{} new postcard(s)", postcards.len());
    Ok(())
}

async fn cmd_collect(client: &BirdBuddy, options: FinishOptions) -> anyhow::Result<()> {
    let postcards = client.new_postcards().await?;
    let mut collected = 0usize;

    for postcard in &postcards {
        let sighting = match client.sighting_from_postcard(&postcard.id).await {
            Ok(sighting) => sighting,
            Err(e) => {
                warn!(feed_item_id = %postcard.id, error = %e, "Failed to read postcard");
                continue;
            }
        };
        println!("{}", sighting);

        match client
            .finish_postcard(&postcard.id, &sighting, options)
            .await
        {
            Ok(true) => collected += 1,
            Ok(false) => warn!(feed_item_id = %postcard.id, "Postcard was not collected"),
            Err(e) => warn!(feed_item_id = %postcard.id, error = %e, "Failed to collect postcard"),
        }
    }

    info!(collected, total = postcards.len(), "Collection finished");
    println!("Collected {} of {} postcard(s)", collected, postcards.len());
    Ok(())
}
