//! Spherical polygon area for drawn land parcels.
//!
//! Uses the Chamberlain–Duquette spherical-excess summation over the ring's
//! edges. Accurate enough for single-country parcels (tens to a few thousand
//! hectares); no antimeridian handling is attempted.

use crate::geometry::Ring;

/// Sphere radius used for the area approximation, in metres.
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

const SQUARE_METRES_PER_HECTARE: f64 = 10_000.0;

/// Area enclosed by `ring`, in hectares.
///
/// Rings with fewer than 3 vertices have no area and return `0.0`. The
/// result is unsigned, so winding direction does not matter. Self-intersecting
/// rings yield a well-defined but not geometrically meaningful number.
#[must_use]
pub fn compute_area_hectares(ring: &Ring) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }

    let sum: f64 = ring
        .edges()
        .map(|(p1, p2)| {
            (p2.longitude - p1.longitude).to_radians()
                * (2.0 + p1.latitude.to_radians().sin() + p2.latitude.to_radians().sin())
        })
        .sum();

    let square_metres = (sum * EARTH_RADIUS_M * EARTH_RADIUS_M / 2.0).abs();
    square_metres / SQUARE_METRES_PER_HECTARE
}

#[cfg(test)]
mod tests {
    use geo::GeodesicArea;

    use super::*;
    use crate::geometry::GeoPoint;

    /// Degrees spanned by `metres` along a great circle of the model sphere.
    fn metres_to_degrees(metres: f64) -> f64 {
        (metres / EARTH_RADIUS_M).to_degrees()
    }

    fn quadrilateral() -> Ring {
        // A farm-sized parcel in northern Mato Grosso.
        Ring::from_lat_lng_pairs(&[
            (-12.500, -55.700),
            (-12.500, -55.650),
            (-12.550, -55.640),
            (-12.560, -55.710),
        ])
    }

    #[test]
    fn fewer_than_three_points_is_zero() {
        let p1 = GeoPoint::new(-15.0, -47.0);
        let p2 = GeoPoint::new(-15.1, -47.1);
        assert!(compute_area_hectares(&Ring::new()).abs() < f64::EPSILON);
        assert!(compute_area_hectares(&Ring::from_points(vec![p1])).abs() < f64::EPSILON);
        assert!(compute_area_hectares(&Ring::from_points(vec![p1, p2])).abs() < f64::EPSILON);
    }

    #[test]
    fn one_kilometre_square_at_equator_is_about_100_ha() {
        let d = metres_to_degrees(1_000.0);
        let ring = Ring::from_lat_lng_pairs(&[(0.0, 0.0), (0.0, d), (d, d), (d, 0.0)]);
        let ha = compute_area_hectares(&ring);
        assert!((ha - 100.0).abs() < 5.0, "expected ~100 ha, got {ha}");
    }

    #[test]
    fn winding_does_not_change_area() {
        let ring = quadrilateral();
        let forward = compute_area_hectares(&ring);
        let backward = compute_area_hectares(&ring.reversed());
        assert!(forward > 0.0);
        assert!((forward - backward).abs() < 1e-9 * forward);
    }

    #[test]
    fn expanding_a_convex_ring_increases_area() {
        let triangle = Ring::from_lat_lng_pairs(&[(-10.0, -50.0), (-10.0, -49.9), (-10.1, -49.9)]);
        let mut square = triangle.clone();
        square.push(GeoPoint::new(-10.1, -50.0));
        assert!(compute_area_hectares(&square) > compute_area_hectares(&triangle));
    }

    #[test]
    fn matches_geodesic_reference_within_five_percent() {
        let ring = quadrilateral();
        let ours = compute_area_hectares(&ring);
        let reference = ring.to_polygon().geodesic_area_unsigned() / 10_000.0;
        let drift = (ours - reference).abs() / reference;
        assert!(drift < 0.05, "ours={ours} reference={reference} drift={drift}");
    }

    #[test]
    fn degenerate_collinear_ring_is_finite_and_non_negative() {
        let ring = Ring::from_lat_lng_pairs(&[(0.0, 0.0), (0.0, 1.0), (0.0, 2.0)]);
        let ha = compute_area_hectares(&ring);
        assert!(ha.is_finite());
        assert!(ha >= 0.0);
    }
}
