use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Fazendas,
    Maquinas,
    Avioes,
    Graos,
}

impl Category {
    /// Human-readable label used in map popups.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Category::Fazendas => "Fazendas",
            Category::Maquinas => "Máquinas",
            Category::Avioes => "Aviões",
            Category::Graos => "Grãos",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Fazendas => write!(f, "fazendas"),
            Category::Maquinas => write!(f, "maquinas"),
            Category::Avioes => write!(f, "avioes"),
            Category::Graos => write!(f, "graos"),
        }
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fazendas" => Ok(Category::Fazendas),
            "maquinas" => Ok(Category::Maquinas),
            "avioes" => Ok(Category::Avioes),
            "graos" => Ok(Category::Graos),
            other => Err(format!("unknown category \"{other}\"")),
        }
    }
}

/// A marketplace listing as supplied by the catalog.
///
/// Listings carry place names, not coordinates; the map resolves a point per
/// location group through the geocoder. Nothing downstream mutates them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocatedListing {
    pub id: String,
    #[serde(alias = "title")]
    pub display_title: String,
    pub category: Category,
    pub municipality: String,
    pub state: String,
    /// Agricultural micro-region, when the catalog knows it.
    #[serde(default)]
    pub region: Option<String>,
    /// Asking price in BRL centavos.
    #[serde(default)]
    pub price_minor: Option<i64>,
    /// Pricing unit for non-farm listings (`saca`, `hora`, ...).
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListingsFile {
    pub listings: Vec<LocatedListing>,
}

/// Load and validate the listing catalog from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_listings(path: &Path) -> Result<ListingsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ListingsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let listings_file: ListingsFile = serde_yaml::from_str(&content)?;

    validate_listings(&listings_file)?;

    Ok(listings_file)
}

fn validate_listings(listings_file: &ListingsFile) -> Result<(), ConfigError> {
    let mut seen_ids = HashSet::new();

    for listing in &listings_file.listings {
        if listing.id.trim().is_empty() {
            return Err(ConfigError::Validation(
                "listing id must be non-empty".to_string(),
            ));
        }

        for (field, value) in [
            ("display_title", &listing.display_title),
            ("municipality", &listing.municipality),
            ("state", &listing.state),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "listing '{}' has an empty {field}",
                    listing.id
                )));
            }
        }

        if listing.price_minor.is_some_and(|p| p < 0) {
            return Err(ConfigError::Validation(format!(
                "listing '{}' has a negative price",
                listing.id
            )));
        }

        if !seen_ids.insert(listing.id.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate listing id: '{}'",
                listing.id
            )));
        }
    }

    Ok(())
}

/// Listings in `category`, or all of them when `category` is `None`.
/// Catalog order is preserved.
#[must_use]
pub fn filter_by_category(
    listings: &[LocatedListing],
    category: Option<Category>,
) -> Vec<LocatedListing> {
    listings
        .iter()
        .filter(|l| category.is_none_or(|c| l.category == c))
        .cloned()
        .collect()
}

#[cfg(test)]
#[path = "listing_test.rs"]
mod tests;
