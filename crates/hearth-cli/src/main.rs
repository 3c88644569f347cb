use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use hearth_client::{BrowserSession, SessionOptions};
use hearth_core::models::Listing;
use hearth_core::profile::SiteProfile;
use hearth_core::{AppError, Collector, Navigator, export};
use hearth_db::{Database, DatabaseConfig, ListingRepository};

#[derive(Parser)]
#[command(name = "hearth", version, about = "Typed listing feed from a client-rendered catalog")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape all result pages for a location and export the records
    Scrape {
        /// Location to search for
        #[arg(short, long, default_value = "South Jordan, UT")]
        location: String,

        /// CSV output path (defaults to a timestamped name)
        #[arg(long)]
        csv: Option<PathBuf>,

        /// JSON output path (defaults to a timestamped name)
        #[arg(long)]
        json: Option<PathBuf>,

        /// Also load the records into PostgreSQL (requires DATABASE_URL)
        #[arg(long, default_value_t = false)]
        save: bool,

        /// Run the browser with a visible window
        #[arg(long, default_value_t = false)]
        headful: bool,

        /// Override the catalog base URL
        #[arg(long, env = "HEARTH_BASE_URL")]
        base_url: Option<String>,
    },

    /// Load a previously exported JSON file into PostgreSQL
    Load {
        /// Path to a JSON export produced by `hearth scrape`
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Show the most recently scraped listings from the database
    Recent {
        /// Number of listings to show
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Setup tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("hearth=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scrape {
            location,
            csv,
            json,
            save,
            headful,
            base_url,
        } => {
            cmd_scrape(&location, csv, json, save, headful, base_url).await?;
        }
        Commands::Load { input } => {
            cmd_load(&input).await?;
        }
        Commands::Recent { limit } => {
            cmd_recent(limit).await?;
        }
    }

    Ok(())
}

/// Connect to PostgreSQL using DATABASE_URL and run migrations.
async fn connect_db() -> Result<ListingRepository> {
    let config = DatabaseConfig::from_env().map_err(|e| anyhow::anyhow!(e))?;
    let db = Database::connect(&config)
        .await
        .context("Failed to connect to database")?;
    db.migrate().await.map_err(|e| anyhow::anyhow!(e))?;
    Ok(db.listing_repo())
}

async fn cmd_scrape(
    location: &str,
    csv: Option<PathBuf>,
    json: Option<PathBuf>,
    save: bool,
    headful: bool,
    base_url: Option<String>,
) -> Result<()> {
    // Fail fast on a missing DATABASE_URL before spending minutes scraping.
    let repo = if save { Some(connect_db().await?) } else { None };

    let mut profile = SiteProfile::default();
    if let Some(url) = base_url {
        profile = profile.with_base_url(url);
    }

    tracing::info!("Launching browser session");
    let session = BrowserSession::launch(&SessionOptions { headful })
        .await
        .map_err(|e| anyhow::anyhow!(e))?;

    // A Ctrl-C stops collection at the next card/page boundary; the
    // session is still closed below on this path.
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupt received, returning partial results");
                cancel.cancel();
            }
        });
    }

    let outcome = run_pipeline(&session, &profile, location, &cancel).await;

    // Release the browser on every path before touching the outcome.
    if let Err(e) = session.close().await {
        tracing::warn!(error = %e, "Browser shutdown was not clean");
    }

    let records = outcome.map_err(|e| anyhow::anyhow!(e))?;

    if records.is_empty() {
        println!("No listings found — check selectors or page structure");
        return Ok(());
    }

    let csv_path = csv.unwrap_or_else(|| PathBuf::from(export::default_output_name("csv")));
    let json_path = json.unwrap_or_else(|| PathBuf::from(export::default_output_name("json")));
    export::write_csv_file(&records, &csv_path).map_err(|e| anyhow::anyhow!(e))?;
    export::write_json_file(&records, &json_path).map_err(|e| anyhow::anyhow!(e))?;
    tracing::info!(csv = %csv_path.display(), json = %json_path.display(), "Wrote exports");

    if let Some(repo) = repo {
        let inserted = repo
            .insert_many(&records)
            .await
            .map_err(|e| anyhow::anyhow!(e))?;
        tracing::info!(inserted, "Saved listings to database");
    }

    print_summary(&records);
    Ok(())
}

async fn run_pipeline(
    session: &BrowserSession,
    profile: &SiteProfile,
    location: &str,
    cancel: &CancellationToken,
) -> Result<Vec<Listing>, AppError> {
    Navigator::new(session, profile).submit_search(location).await?;
    Ok(Collector::new(session, profile).collect(cancel).await)
}

fn print_summary(records: &[Listing]) {
    let with_prices = records.iter().filter(|r| r.price.is_some()).count();
    println!(
        "Scraped {} listings ({} with prices)\n",
        records.len(),
        with_prices
    );

    for (i, listing) in records.iter().take(5).enumerate() {
        println!(
            "{}. MLS {} — {} — {}",
            i + 1,
            listing.mls_id.as_deref().unwrap_or("?"),
            listing
                .price
                .map(|p| format!("${p}"))
                .unwrap_or_else(|| "no price".into()),
            listing.address.as_deref().unwrap_or("no address"),
        );
    }
}

async fn cmd_load(input: &PathBuf) -> Result<()> {
    let records = export::read_json_file(input)
        .with_context(|| format!("Failed to read export file: {}", input.display()))?;

    let repo = connect_db().await?;
    let inserted = repo
        .insert_many(&records)
        .await
        .map_err(|e| anyhow::anyhow!(e))?;

    println!("Loaded {inserted} listings from {}", input.display());
    Ok(())
}

async fn cmd_recent(limit: usize) -> Result<()> {
    let repo = connect_db().await?;
    let listings = repo.recent(limit).await.map_err(|e| anyhow::anyhow!(e))?;

    if listings.is_empty() {
        println!("No listings stored yet");
        return Ok(());
    }

    for listing in &listings {
        println!(
            "{} — MLS {} — {} — {} (DOM {})",
            listing.scraped_at.format("%Y-%m-%d %H:%M:%S UTC"),
            listing.mls_id.as_deref().unwrap_or("?"),
            listing
                .price
                .map(|p| format!("${p}"))
                .unwrap_or_else(|| "no price".into()),
            listing.status,
            listing.days_on_market,
        );
    }

    println!("\nTotal shown: {}", listings.len());
    Ok(())
}
