//! Geographic points and open polygon rings.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default tolerance used when deciding whether two points are the same
/// place. Roughly 1 cm at the equator.
pub const POINT_TOLERANCE_DEG: f64 = 1e-7;

/// A WGS84 coordinate in decimal degrees.
///
/// Deliberately not `PartialEq`: callers compare with [`GeoPoint::approx_eq`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PointParseError {
    #[error("expected \"LAT,LNG\", got \"{0}\"")]
    Format(String),

    #[error("coordinate out of range: {0}")]
    OutOfRange(String),
}

impl GeoPoint {
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Builds a point only if both components are finite and inside the
    /// valid latitude/longitude ranges.
    #[must_use]
    pub fn checked(latitude: f64, longitude: f64) -> Option<Self> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        valid.then_some(Self::new(latitude, longitude))
    }

    #[must_use]
    pub fn approx_eq(&self, other: &GeoPoint, tolerance_deg: f64) -> bool {
        (self.latitude - other.latitude).abs() <= tolerance_deg
            && (self.longitude - other.longitude).abs() <= tolerance_deg
    }
}

impl FromStr for GeoPoint {
    type Err = PointParseError;

    /// Parses `"LAT,LNG"` (whitespace around either part is ignored).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lng) = s
            .split_once(',')
            .ok_or_else(|| PointParseError::Format(s.to_owned()))?;
        let lat: f64 = lat
            .trim()
            .parse()
            .map_err(|_| PointParseError::Format(s.to_owned()))?;
        let lng: f64 = lng
            .trim()
            .parse()
            .map_err(|_| PointParseError::Format(s.to_owned()))?;
        GeoPoint::checked(lat, lng).ok_or_else(|| PointParseError::OutOfRange(s.to_owned()))
    }
}

impl From<GeoPoint> for geo::Point<f64> {
    fn from(p: GeoPoint) -> Self {
        geo::Point::new(p.longitude, p.latitude)
    }
}

impl From<GeoPoint> for geo::Coord<f64> {
    fn from(p: GeoPoint) -> Self {
        geo::Coord {
            x: p.longitude,
            y: p.latitude,
        }
    }
}

/// An ordered, implicitly closed sequence of points.
///
/// The last vertex connects back to the first; no closing duplicate is
/// stored. Insertion order defines the edges and winding.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ring {
    points: Vec<GeoPoint>,
}

impl Ring {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_points(points: Vec<GeoPoint>) -> Self {
        Self { points }
    }

    /// Builds a ring from `(lat, lng)` tuples.
    #[must_use]
    pub fn from_lat_lng_pairs(pairs: &[(f64, f64)]) -> Self {
        Self {
            points: pairs
                .iter()
                .map(|&(lat, lng)| GeoPoint::new(lat, lng))
                .collect(),
        }
    }

    pub fn push(&mut self, point: GeoPoint) {
        self.points.push(point);
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[must_use]
    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    #[must_use]
    pub fn last(&self) -> Option<GeoPoint> {
        self.points.last().copied()
    }

    /// Same vertices in reverse order (opposite winding).
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            points: self.points.iter().rev().copied().collect(),
        }
    }

    /// Consecutive vertex pairs, including the closing edge from the last
    /// vertex back to the first. Empty for rings with fewer than 2 points.
    pub fn edges(&self) -> impl Iterator<Item = (GeoPoint, GeoPoint)> + '_ {
        let n = if self.points.len() < 2 {
            0
        } else {
            self.points.len()
        };
        (0..n).map(move |i| (self.points[i], self.points[(i + 1) % n]))
    }

    /// Arithmetic mean of the vertices.
    #[must_use]
    pub fn centroid(&self) -> Option<GeoPoint> {
        if self.points.is_empty() {
            return None;
        }
        #[allow(clippy::cast_precision_loss)]
        let n = self.points.len() as f64;
        let (lat, lng) = self
            .points
            .iter()
            .fold((0.0, 0.0), |(lat, lng), p| (lat + p.latitude, lng + p.longitude));
        Some(GeoPoint::new(lat / n, lng / n))
    }

    /// Converts to a closed `geo::Polygon` (x = longitude, y = latitude).
    #[must_use]
    pub fn to_polygon(&self) -> geo::Polygon<f64> {
        let coords: Vec<geo::Coord<f64>> = self.points.iter().map(|&p| p.into()).collect();
        // LineString::from + Polygon::new closes the exterior automatically.
        geo::Polygon::new(geo::LineString::from(coords), vec![])
    }
}

impl FromIterator<GeoPoint> for Ring {
    fn from_iter<T: IntoIterator<Item = GeoPoint>>(iter: T) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lat_lng_pair() {
        let p: GeoPoint = " -15.78 , -47.93 ".parse().unwrap();
        assert!(p.approx_eq(&GeoPoint::new(-15.78, -47.93), POINT_TOLERANCE_DEG));
    }

    #[test]
    fn rejects_missing_comma() {
        let err = "-15.78".parse::<GeoPoint>().unwrap_err();
        assert!(matches!(err, PointParseError::Format(_)));
    }

    #[test]
    fn rejects_out_of_range_latitude() {
        let err = "91.0,10.0".parse::<GeoPoint>().unwrap_err();
        assert!(matches!(err, PointParseError::OutOfRange(_)));
    }

    #[test]
    fn checked_rejects_nan() {
        assert!(GeoPoint::checked(f64::NAN, 0.0).is_none());
        assert!(GeoPoint::checked(0.0, 180.0).is_some());
    }

    #[test]
    fn approx_eq_uses_tolerance() {
        let a = GeoPoint::new(-10.0, -50.0);
        let b = GeoPoint::new(-10.000_000_05, -50.0);
        assert!(a.approx_eq(&b, POINT_TOLERANCE_DEG));
        assert!(!a.approx_eq(&GeoPoint::new(-10.001, -50.0), POINT_TOLERANCE_DEG));
    }

    #[test]
    fn edges_wrap_back_to_first_vertex() {
        let ring = Ring::from_lat_lng_pairs(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0)]);
        let edges: Vec<_> = ring.edges().collect();
        assert_eq!(edges.len(), 3);
        assert!(edges[2].0.approx_eq(&GeoPoint::new(1.0, 1.0), 0.0));
        assert!(edges[2].1.approx_eq(&GeoPoint::new(0.0, 0.0), 0.0));
    }

    #[test]
    fn edges_empty_for_single_point() {
        let ring = Ring::from_lat_lng_pairs(&[(5.0, 5.0)]);
        assert_eq!(ring.edges().count(), 0);
    }

    #[test]
    fn centroid_is_vertex_mean() {
        let ring = Ring::from_lat_lng_pairs(&[(0.0, 0.0), (0.0, 2.0), (2.0, 2.0), (2.0, 0.0)]);
        let c = ring.centroid().unwrap();
        assert!(c.approx_eq(&GeoPoint::new(1.0, 1.0), 1e-12));
        assert!(Ring::new().centroid().is_none());
    }

    #[test]
    fn polygon_conversion_closes_ring_and_swaps_axes() {
        let ring = Ring::from_lat_lng_pairs(&[(-10.0, -50.0), (-10.0, -49.0), (-11.0, -49.0)]);
        let polygon = ring.to_polygon();
        let coords: Vec<_> = polygon.exterior().coords().copied().collect();
        assert_eq!(coords.len(), 4, "exterior is closed in the converted value");
        assert!((coords[0].x - -50.0).abs() < f64::EPSILON);
        assert!((coords[0].y - -10.0).abs() < f64::EPSILON);
        assert_eq!(ring.len(), 3, "source ring stays open");
    }

    #[test]
    fn serializes_as_plain_array() {
        let ring = Ring::from_lat_lng_pairs(&[(1.0, 2.0)]);
        let json = serde_json::to_value(&ring).unwrap();
        assert_eq!(json, serde_json::json!([{ "latitude": 1.0, "longitude": 2.0 }]));
    }
}
