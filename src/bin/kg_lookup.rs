//! Knowledge Graph lookup CLI
//!
//! Runs one business lookup against the live API and prints the JSON result.
//!
//! Usage:
//!   cargo run --bin kg_lookup -- --name "Starbucks" --location "Seattle"
//!
//! Examples:
//!   # Direct lookup by KG ID, falling back to search
//!   cargo run --bin kg_lookup -- --name "Kenny Bunch Plumbing" --kgmid /g/11bzt6slj6
//!
//!   # Every raw hit for troubleshooting
//!   cargo run --bin kg_lookup -- --name "Blue Bottle" --location Oakland --debug-listing

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kg_lookup::{EntityMatcher, KgConfig, KnowledgeGraphClient, MatchPolicy};

/// Knowledge Graph business lookup
#[derive(Parser, Debug)]
#[command(name = "kg_lookup")]
#[command(about = "Find the best Knowledge Graph entity for a business name")]
struct Args {
    /// Business name (e.g., "Kenny Bunch Plumbing")
    #[arg(long, short = 'n')]
    name: String,

    /// Location hint (e.g., "Wylie, TX")
    #[arg(long, short = 'l')]
    location: Option<String>,

    /// Known KG ID to try before searching (e.g., "/g/11bzt6slj6")
    #[arg(long)]
    kgmid: Option<String>,

    /// Single search instead of the multi-strategy sequence
    #[arg(long, conflicts_with = "debug_listing")]
    quick: bool,

    /// Print every raw hit instead of a best match
    #[arg(long)]
    debug_listing: bool,

    /// API key (defaults to GOOGLE_MAPS_API_KEY / GOOGLE_API_KEY)
    #[arg(long, env = "GOOGLE_MAPS_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Per-call timeout in seconds
    #[arg(long, env = "KG_TIMEOUT_SECS", default_value_t = 30)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let default_filter = if std::env::var("DEBUG").is_ok_and(|v| v.eq_ignore_ascii_case("true")) {
        "kg_lookup=debug"
    } else {
        "kg_lookup=warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let config = match args.api_key {
        Some(key) => KgConfig::from_env_with_key(key),
        None => KgConfig::from_env(),
    }
    .context("Knowledge Graph API is not configured")?
    .with_timeout(std::time::Duration::from_secs(args.timeout_secs));

    let client = KnowledgeGraphClient::new(config).context("Failed to build API client")?;
    let matcher = EntityMatcher::new(Arc::new(client), MatchPolicy::from_env());

    let output = if args.debug_listing {
        let listing = matcher
            .debug_search(&args.name, args.location.as_deref())
            .await
            .context("Debug search failed")?;
        serde_json::to_string_pretty(&listing)?
    } else if args.quick {
        let result = matcher
            .quick_match(&args.name, args.location.as_deref())
            .await;
        serde_json::to_string_pretty(&result)?
    } else {
        let result = matcher
            .find_business(&args.name, args.location.as_deref(), args.kgmid.as_deref())
            .await;
        serde_json::to_string_pretty(&result)?
    };

    println!("{}", output);
    Ok(())
}
