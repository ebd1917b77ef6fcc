//! CLI commands for marathon-bot.
//!
//! Runs the LINE webhook server, or scrapes and queries the race calendar
//! once from the terminal.

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::query;
use crate::scraper::ScrapePipeline;
use crate::store::Snapshot;
use crate::types::RaceRecord;

#[derive(Parser)]
#[command(name = "marathon-bot")]
#[command(version, about = "Marathon race calendar LINE bot", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the webhook server
    Serve {
        /// Host to bind to (overrides config)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to (overrides config and PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Scrape the race calendar once and print the records
    Scrape {
        /// Output format (json, table)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Scrape once and print the reply the bot would send
    Query {
        /// Search type (date, region, keyword)
        mode: String,

        /// Search value, e.g. 202506, 3 or 半馬
        value: String,
    },
}

/// Scrape the calendar and print every normalized record.
pub async fn run_scrape(format: String) -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    let pipeline = ScrapePipeline::new(&config.scraper)?;

    eprintln!("Fetching {}", config.scraper.url);
    let races = pipeline.run().await?;
    eprintln!("Scraped {} races", races.len());

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&races)?),
        "table" => print_race_table(&races),
        other => anyhow::bail!("Unknown format: {} (expected json or table)", other),
    }

    Ok(())
}

/// Scrape the calendar and answer one query.
pub async fn run_query(mode: String, value: String) -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    let pipeline = ScrapePipeline::new(&config.scraper)?;

    let snapshot = match pipeline.run().await {
        Ok(races) => Some(Snapshot::new(races)),
        Err(e) => {
            eprintln!("Scrape failed: {}", e);
            None
        }
    };

    println!("{}", query::search(snapshot.as_ref(), &mode, &value));
    Ok(())
}

pub fn print_race_table(races: &[RaceRecord]) {
    println!(
        "  {:6} {:>6} {:>5}  {:30} {:20} {}",
        "Date", "Region", "Month", "Name", "Location", "Distance"
    );
    println!("  {}", "-".repeat(90));
    for race in races {
        println!(
            "  {:6} {:>6} {:>5}  {:30} {:20} {}",
            race.date,
            race.region_code,
            race.month.as_deref().unwrap_or("-"),
            race.name,
            race.location,
            race.distance
        );
    }
}
