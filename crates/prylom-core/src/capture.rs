//! The geometry captured by one map drawing session.

use serde::{Deserialize, Serialize};

use crate::area::compute_area_hectares;
use crate::geometry::{GeoPoint, Ring};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureMode {
    Point,
    Polygon,
}

impl std::fmt::Display for CaptureMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureMode::Point => write!(f, "point"),
            CaptureMode::Polygon => write!(f, "polygon"),
        }
    }
}

impl std::str::FromStr for CaptureMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "point" => Ok(CaptureMode::Point),
            "polygon" => Ok(CaptureMode::Polygon),
            other => Err(format!("unknown capture mode \"{other}\"")),
        }
    }
}

/// A point or polygon drawn on the map, with its area kept current.
///
/// In point mode `ring` stays empty and `center_point` is the last click.
/// In polygon mode `center_point` is the vertex mean of `ring`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapturedArea {
    pub mode: CaptureMode,
    pub ring: Ring,
    pub center_point: Option<GeoPoint>,
    pub area_hectares: f64,
}

impl CapturedArea {
    #[must_use]
    pub fn empty(mode: CaptureMode) -> Self {
        Self {
            mode,
            ring: Ring::new(),
            center_point: None,
            area_hectares: 0.0,
        }
    }

    /// Applies one click according to the capture mode.
    pub fn apply_click(&mut self, point: GeoPoint) {
        match self.mode {
            CaptureMode::Point => {
                self.center_point = Some(point);
            }
            CaptureMode::Polygon => {
                self.ring.push(point);
                self.center_point = self.ring.centroid();
            }
        }
        self.area_hectares = compute_area_hectares(&self.ring);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.center_point.is_none() && self.ring.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_mode_overwrites_center_and_keeps_ring_empty() {
        let mut area = CapturedArea::empty(CaptureMode::Point);
        area.apply_click(GeoPoint::new(-10.0, -50.0));
        area.apply_click(GeoPoint::new(-11.0, -51.0));
        assert!(area.ring.is_empty());
        assert!(area
            .center_point
            .unwrap()
            .approx_eq(&GeoPoint::new(-11.0, -51.0), 0.0));
        assert!(area.area_hectares.abs() < f64::EPSILON);
    }

    #[test]
    fn polygon_mode_recomputes_area_per_vertex() {
        let mut area = CapturedArea::empty(CaptureMode::Polygon);
        area.apply_click(GeoPoint::new(-10.0, -50.0));
        area.apply_click(GeoPoint::new(-10.0, -49.99));
        assert!(area.area_hectares.abs() < f64::EPSILON);
        area.apply_click(GeoPoint::new(-10.01, -49.99));
        let triangle = area.area_hectares;
        assert!(triangle > 0.0);
        area.apply_click(GeoPoint::new(-10.01, -50.0));
        assert!(area.area_hectares > triangle);
        assert_eq!(area.ring.len(), 4);
    }

    #[test]
    fn parses_mode_case_insensitively() {
        assert_eq!("Polygon".parse::<CaptureMode>(), Ok(CaptureMode::Polygon));
        assert!("circle".parse::<CaptureMode>().is_err());
    }
}
