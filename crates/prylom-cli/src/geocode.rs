//! `geocode` command handlers.

use std::time::Duration;

use clap::Subcommand;
use prylom_core::{AppConfig, GeoPoint};
use prylom_geocode::{NominatimClient, RateLimiter};

use crate::print_json;

/// Sub-commands available under `geocode`.
#[derive(Debug, Subcommand)]
pub enum GeocodeCommands {
    /// Free-text place search (as typed into the map search box)
    Search {
        /// Municipality, farm or address
        query: String,
    },
    /// Resolve a coordinate to municipality and state
    Reverse {
        #[arg(allow_hyphen_values = true)]
        lat: f64,
        #[arg(allow_hyphen_values = true)]
        lng: f64,
    },
}

/// Builds the geocoder described by `config`, with its rate limiter.
///
/// # Errors
///
/// Returns an error if the base URL is invalid or the HTTP client cannot be
/// constructed.
pub(crate) fn build_geocoder(config: &AppConfig) -> anyhow::Result<NominatimClient> {
    let limiter = RateLimiter::new(Duration::from_millis(config.geocoder_min_interval_ms));
    let client = NominatimClient::new(
        &config.geocoder_base_url,
        &config.geocoder_user_agent,
        config.geocoder_timeout_secs,
        limiter,
    )
    .map_err(|e| anyhow::anyhow!("failed to build geocoder client: {e}"))?;
    Ok(client.with_country_codes(&config.geocoder_country_codes))
}

/// # Errors
///
/// Returns an error if the coordinate is out of range or the geocoder fails.
pub(crate) async fn run_geocode(
    config: &AppConfig,
    command: GeocodeCommands,
) -> anyhow::Result<()> {
    let client = build_geocoder(config)?;

    match command {
        GeocodeCommands::Search { query } => match client.search(&query).await? {
            Some(place) => print_json(&place)?,
            None => println!("no place found for \"{query}\""),
        },
        GeocodeCommands::Reverse { lat, lng } => {
            let point = GeoPoint::checked(lat, lng)
                .ok_or_else(|| anyhow::anyhow!("coordinate out of range: {lat},{lng}"))?;
            match client.reverse(point).await? {
                Some(place) => print_json(&place)?,
                None => println!("no place found at {lat},{lng}"),
            }
        }
    }

    Ok(())
}
