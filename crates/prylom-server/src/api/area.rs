use axum::{Extension, Json};
use prylom_core::{compute_area_hectares, GeoPoint, Ring};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{ok, ApiError, ApiResponse};

#[derive(Debug, Deserialize)]
pub(super) struct AreaRequest {
    pub points: Vec<GeoPoint>,
}

#[derive(Debug, Serialize)]
pub(super) struct AreaResponse {
    pub vertices: usize,
    pub area_hectares: f64,
}

/// POST /api/v1/area: spherical area of an open ring, in hectares.
pub(super) async fn compute_area(
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<AreaRequest>,
) -> Result<Json<ApiResponse<AreaResponse>>, ApiError> {
    let ring = body
        .points
        .iter()
        .map(|p| {
            GeoPoint::checked(p.latitude, p.longitude).ok_or_else(|| {
                ApiError::new(
                    req_id.0.as_str(),
                    "validation_error",
                    format!("coordinate out of range: {},{}", p.latitude, p.longitude),
                )
            })
        })
        .collect::<Result<Ring, ApiError>>()?;

    let data = AreaResponse {
        vertices: ring.len(),
        area_hectares: compute_area_hectares(&ring),
    };
    Ok(ok(req_id, data))
}
