//! HTTP client for a Nominatim-compatible geocoding service.

use std::time::Duration;

use prylom_core::GeoPoint;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::error::GeocodeError;
use crate::rate_limit::RateLimiter;
use crate::types::{Place, ReverseResponse, ReversePlace, SearchHit};
use crate::Geocoder;

/// Nominatim zoom level that resolves to municipality granularity.
const REVERSE_ZOOM_MUNICIPALITY: &str = "10";

/// Client for Nominatim's `/search` and `/reverse` endpoints.
///
/// Every request first takes a slot from the client's [`RateLimiter`], so a
/// single client shared across tasks never exceeds the configured rate.
/// HTTP 429 surfaces as [`GeocodeError::RateLimited`]; there is no automatic
/// retry.
pub struct NominatimClient {
    client: Client,
    base_url: Url,
    limiter: RateLimiter,
    country_codes: Option<String>,
}

impl NominatimClient {
    /// Creates a client for `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`GeocodeError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn new(
        base_url: &str,
        user_agent: &str,
        timeout_secs: u64,
        limiter: RateLimiter,
    ) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Trailing slash so `join` appends instead of replacing the last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| GeocodeError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            limiter,
            country_codes: None,
        })
    }

    /// Restricts free-text [`search`](Self::search) to these ISO country
    /// codes (comma-separated, e.g. `"br"`).
    #[must_use]
    pub fn with_country_codes(mut self, codes: &str) -> Self {
        let codes = codes.trim();
        self.country_codes = (!codes.is_empty()).then(|| codes.to_owned());
        self
    }

    /// Free-text place search for the map's search box. Returns the best
    /// match, or `None` when nothing matched.
    ///
    /// # Errors
    ///
    /// - [`GeocodeError::RateLimited`] on HTTP 429.
    /// - [`GeocodeError::UnexpectedStatus`] on any other non-2xx status.
    /// - [`GeocodeError::Http`] on network failure.
    /// - [`GeocodeError::Deserialize`] / [`GeocodeError::InvalidCoordinate`]
    ///   if the body is malformed.
    pub async fn search(&self, query: &str) -> Result<Option<Place>, GeocodeError> {
        let url = self.search_url(query, self.country_codes.as_deref());
        let context = format!("search(q={query})");
        let hits: Vec<SearchHit> = self.get_json(url, &context).await?;

        hits.into_iter()
            .next()
            .map(|hit| -> Result<Place, GeocodeError> {
                let point = parse_point(&hit.lat, &hit.lon, &context)?;
                Ok(Place {
                    point,
                    display_name: hit.display_name,
                })
            })
            .transpose()
    }

    /// Reverse geocodes `point` to municipality level.
    ///
    /// # Errors
    ///
    /// Same as [`search`](Self::search).
    pub async fn reverse(&self, point: GeoPoint) -> Result<Option<ReversePlace>, GeocodeError> {
        let mut url = self.endpoint("reverse");
        url.query_pairs_mut()
            .append_pair("format", "json")
            .append_pair("lat", &point.latitude.to_string())
            .append_pair("lon", &point.longitude.to_string())
            .append_pair("zoom", REVERSE_ZOOM_MUNICIPALITY)
            .append_pair("addressdetails", "1");

        let context = format!("reverse(lat={}, lon={})", point.latitude, point.longitude);
        let body: ReverseResponse = self.get_json(url, &context).await?;

        if let Some(message) = body.error {
            tracing::debug!(%message, lat = point.latitude, lon = point.longitude, "reverse geocode found nothing");
            return Ok(None);
        }

        let resolved = match (body.lat.as_deref(), body.lon.as_deref()) {
            (Some(lat), Some(lon)) => parse_point(lat, lon, &context)?,
            _ => point,
        };
        let address = body.address.unwrap_or_default();

        Ok(Some(ReversePlace {
            point: resolved,
            municipality: address.municipality_name(),
            state: address.state,
            country: address.country,
            display_name: body.display_name,
        }))
    }

    fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map(|mut segments| {
                segments.pop_if_empty().push(path);
            })
            .ok();
        url
    }

    fn search_url(&self, query: &str, country_codes: Option<&str>) -> Url {
        let mut url = self.endpoint("search");
        url.query_pairs_mut()
            .append_pair("format", "json")
            .append_pair("q", query)
            .append_pair("limit", "1");
        if let Some(codes) = country_codes {
            url.query_pairs_mut().append_pair("countrycodes", codes);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        context: &str,
    ) -> Result<T, GeocodeError> {
        self.limiter.acquire().await;

        let response = self
            .client
            .get(url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .header(reqwest::header::ACCEPT_LANGUAGE, "pt-BR,pt;q=0.9,en;q=0.8")
            .send()
            .await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(GeocodeError::RateLimited { retry_after_secs });
        }

        if !status.is_success() {
            return Err(GeocodeError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str::<T>(&body).map_err(|e| GeocodeError::Deserialize {
            context: context.to_owned(),
            source: e,
        })
    }
}

impl Geocoder for NominatimClient {
    async fn forward(&self, query: &str) -> Result<Option<GeoPoint>, GeocodeError> {
        // Cluster queries already name the country, so no countrycodes filter.
        let url = self.search_url(query, None);
        let context = format!("forward(q={query})");
        let hits: Vec<SearchHit> = self.get_json(url, &context).await?;
        hits.first()
            .map(|hit| parse_point(&hit.lat, &hit.lon, &context))
            .transpose()
    }
}

fn parse_point(lat: &str, lon: &str, context: &str) -> Result<GeoPoint, GeocodeError> {
    let invalid = || GeocodeError::InvalidCoordinate {
        context: context.to_owned(),
        lat: lat.to_owned(),
        lon: lon.to_owned(),
    };
    let latitude = lat.trim().parse::<f64>().map_err(|_| invalid())?;
    let longitude = lon.trim().parse::<f64>().map_err(|_| invalid())?;
    GeoPoint::checked(latitude, longitude).ok_or_else(invalid)
}
