mod clusters;
mod geocode;
mod survey;

use clap::{Parser, Subcommand};
use prylom_core::{CaptureMode, Category, Currency, GeoPoint, Language};
use prylom_geocode::GroupingMode;
use tracing_subscriber::EnvFilter;

use crate::geocode::GeocodeCommands;

#[derive(Debug, Parser)]
#[command(name = "prylom-cli")]
#[command(about = "Prylom land survey and listing map command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Compute the spherical area of a polygon in hectares
    Area {
        /// Polygon vertex as LAT,LNG (repeat, in drawing order)
        #[arg(long = "point", required = true, allow_hyphen_values = true)]
        points: Vec<GeoPoint>,
    },
    /// Query the geocoding service
    Geocode {
        #[command(subcommand)]
        command: GeocodeCommands,
    },
    /// Group the listing catalog into map clusters and print their popups
    Clusters {
        /// Grouping key: municipality or micro-region
        #[arg(long, default_value = "municipality")]
        mode: GroupingMode,

        /// Only cluster listings in this category
        #[arg(long)]
        category: Option<Category>,

        /// Display currency; defaults to the language's currency
        #[arg(long)]
        currency: Option<Currency>,

        /// Interface language tag (pt, en, zh, ru)
        #[arg(long, default_value = "pt")]
        lang: String,
    },
    /// Replay map clicks through a capture session and print the result
    Survey {
        /// Capture mode: point or polygon
        #[arg(long, default_value = "polygon")]
        mode: CaptureMode,

        /// Clicked location as LAT,LNG (repeat, in click order)
        #[arg(long = "point", required = true, allow_hyphen_values = true)]
        points: Vec<GeoPoint>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = prylom_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    // stdout carries the JSON output.
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Commands::Area { points }) => survey::run_area(&points)?,
        Some(Commands::Geocode { command }) => geocode::run_geocode(&config, command).await?,
        Some(Commands::Clusters {
            mode,
            category,
            currency,
            lang,
        }) => {
            let currency =
                currency.unwrap_or_else(|| Language::from_tag(&lang).default_currency());
            clusters::run_clusters(&config, mode, category, currency).await?;
        }
        Some(Commands::Survey { mode, points }) => {
            survey::run_survey(&config, mode, &points).await?;
        }
        None => println!("prylom-cli: run with --help for available commands"),
    }

    Ok(())
}

/// Pretty-prints `value` as JSON on stdout.
pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
