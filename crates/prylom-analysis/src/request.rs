use prylom_core::{GeoPoint, Ring};
use serde::Serialize;

/// What the analysis service is asked about: a single point, or a polygon
/// anchored at its most recently added vertex.
#[derive(Debug, Clone, Serialize)]
pub struct SiteAnalysisRequest {
    pub anchor: GeoPoint,
    pub ring: Option<Ring>,
    /// Locally computed area, forwarded so the service need not estimate it.
    pub area_hectares: Option<f64>,
}

impl SiteAnalysisRequest {
    #[must_use]
    pub fn point(anchor: GeoPoint) -> Self {
        Self {
            anchor,
            ring: None,
            area_hectares: None,
        }
    }

    #[must_use]
    pub fn polygon(anchor: GeoPoint, ring: Ring, area_hectares: f64) -> Self {
        Self {
            anchor,
            ring: Some(ring),
            area_hectares: Some(area_hectares),
        }
    }

    #[must_use]
    pub fn is_polygon(&self) -> bool {
        self.ring.is_some()
    }
}
