use axum::{
    extract::{Query, State},
    Extension, Json,
};
use prylom_core::GeoPoint;
use prylom_geocode::{Place, ReversePlace};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{map_geocode_error, ok, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ReverseQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

/// `GET /api/v1/geocode/search?q=`. Best match for the map search box, or
/// `null` when nothing matched.
pub(super) async fn search_place(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiResponse<Option<Place>>>, ApiError> {
    let q = query.q.as_deref().map(str::trim).unwrap_or_default();
    if q.is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "query parameter 'q' must be non-empty",
        ));
    }

    let place = state
        .clusters
        .geocoder()
        .search(q)
        .await
        .map_err(|e| map_geocode_error(req_id.0.clone(), &e))?;

    Ok(ok(req_id, place))
}

/// `GET /api/v1/geocode/reverse?lat=&lng=`. Municipality and state for a
/// clicked coordinate.
pub(super) async fn reverse_place(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ReverseQuery>,
) -> Result<Json<ApiResponse<Option<ReversePlace>>>, ApiError> {
    let point = match (query.lat, query.lng) {
        (Some(lat), Some(lng)) => GeoPoint::checked(lat, lng),
        _ => None,
    }
    .ok_or_else(|| {
        ApiError::new(
            req_id.0.as_str(),
            "validation_error",
            "'lat' and 'lng' must be valid coordinates",
        )
    })?;

    let place = state
        .clusters
        .geocoder()
        .reverse(point)
        .await
        .map_err(|e| map_geocode_error(req_id.0.clone(), &e))?;

    Ok(ok(req_id, place))
}
