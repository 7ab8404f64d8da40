//! Core domain model for the Prylom land-survey and listing map.
//!
//! Holds the geographic value types ([`GeoPoint`], [`Ring`]), the spherical
//! area calculator, the capture value produced by a drawing session, the
//! listing catalog model, currency formatting and environment configuration.
//! Nothing in here performs I/O beyond reading config files.

pub mod app_config;
pub mod area;
pub mod capture;
pub mod config;
pub mod currency;
pub mod geometry;
pub mod listing;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use area::{compute_area_hectares, EARTH_RADIUS_M};
pub use capture::{CaptureMode, CapturedArea};
pub use config::{load_app_config, load_app_config_from_env};
pub use currency::{format_price_parts, Currency, Language, PriceParts};
pub use geometry::{GeoPoint, Ring};
pub use listing::{filter_by_category, load_listings, Category, ListingsFile, LocatedListing};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read listings file {path}: {source}")]
    ListingsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse listings file: {0}")]
    ListingsFileParse(#[from] serde_yaml::Error),

    #[error("listings validation failed: {0}")]
    Validation(String),
}
