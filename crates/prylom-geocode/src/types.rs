//! Nominatim wire types and the place records handed to callers.

use prylom_core::GeoPoint;
use serde::{Deserialize, Serialize};

/// One entry of a `/search?format=json` response. Nominatim encodes the
/// coordinates as strings.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SearchHit {
    pub lat: String,
    pub lon: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// A `/reverse?format=json` response. Failures come back as HTTP 200 with
/// only an `error` field.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ReverseResponse {
    #[serde(default)]
    pub lat: Option<String>,
    #[serde(default)]
    pub lon: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub address: Option<ReverseAddress>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ReverseAddress {
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    pub municipality: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

impl ReverseAddress {
    /// Nominatim puts the municipality under a different key depending on
    /// settlement size.
    pub(crate) fn municipality_name(&self) -> Option<String> {
        self.city
            .as_ref()
            .or(self.town.as_ref())
            .or(self.village.as_ref())
            .or(self.municipality.as_ref())
            .cloned()
    }
}

/// Best match for a free-text search.
#[derive(Debug, Clone, Serialize)]
pub struct Place {
    pub point: GeoPoint,
    pub display_name: Option<String>,
}

/// Administrative names for a clicked coordinate.
#[derive(Debug, Clone, Serialize)]
pub struct ReversePlace {
    pub point: GeoPoint,
    pub municipality: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub display_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn municipality_prefers_city_then_town() {
        let addr = ReverseAddress {
            town: Some("Sorriso".into()),
            village: Some("Primavera".into()),
            ..ReverseAddress::default()
        };
        assert_eq!(addr.municipality_name().as_deref(), Some("Sorriso"));

        let addr = ReverseAddress {
            city: Some("Cuiabá".into()),
            town: Some("Sorriso".into()),
            ..ReverseAddress::default()
        };
        assert_eq!(addr.municipality_name().as_deref(), Some("Cuiabá"));
    }

    #[test]
    fn reverse_error_payload_parses() {
        let parsed: ReverseResponse =
            serde_json::from_str(r#"{"error":"Unable to geocode"}"#).unwrap();
        assert_eq!(parsed.error.as_deref(), Some("Unable to geocode"));
        assert!(parsed.lat.is_none());
    }
}
