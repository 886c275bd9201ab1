//! Small planar helpers over `geo`, all in degrees unless stated otherwise.
//!
//! The boolean operations always work on `MultiPolygon` pairs so the
//! selection can grow into disjoint parts without changing type.

use std::f64::consts::TAU;

use geo::{
    BooleanOps, ConvexHull, Coord, Destination, Haversine, Intersects, LineString, MultiPoint,
    MultiPolygon, Point, Polygon, Scale,
};

use crate::bounds::Aabb2;

/// Longitude magnitude beyond which a vertex is on the antimeridian side.
pub const ANTIMERIDIAN_SIDE_DEG: f64 = 90.0;

/// Vertex count of the disk used for approximate containment tests.
pub const CIRCLE_STEPS: usize = 64;

const BUFFER_ARC_STEPS: usize = 16;

/// `-1`, `0` or `1`; NaN stays NaN.
pub fn sign(v: f64) -> f64 {
    if v.is_nan() {
        f64::NAN
    } else if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

pub fn is_antimeridian_side(lng: f64) -> bool {
    lng.abs() > ANTIMERIDIAN_SIDE_DEG
}

pub fn bbox(polygon: &Polygon<f64>) -> Option<Aabb2> {
    Aabb2::of_polygon(polygon)
}

/// Scales `polygon` by `factor` around the center of its bounding box.
pub fn scale(polygon: &Polygon<f64>, factor: f64) -> Polygon<f64> {
    polygon.scale(factor)
}

/// Planar outward buffer by `distance` degrees.
///
/// Built as the convex hull of a small arc around every exterior vertex, so
/// it is exact (up to arc discretization) for convex input and a convex
/// superset otherwise. Axis-aligned edges are offset by exactly `distance`.
pub fn buffer(polygon: &Polygon<f64>, distance: f64) -> Polygon<f64> {
    if !(distance > 0.0 && distance.is_finite()) {
        return polygon.clone();
    }

    let mut points = Vec::with_capacity(polygon.exterior().0.len() * BUFFER_ARC_STEPS);
    for c in polygon.exterior().coords() {
        for step in 0..BUFFER_ARC_STEPS {
            let angle = step as f64 / BUFFER_ARC_STEPS as f64 * TAU;
            points.push(Point::new(
                c.x + distance * angle.cos(),
                c.y + distance * angle.sin(),
            ));
        }
    }
    MultiPoint::new(points).convex_hull()
}

pub fn union(a: &MultiPolygon<f64>, b: &Polygon<f64>) -> MultiPolygon<f64> {
    a.union(&MultiPolygon::new(vec![b.clone()]))
}

/// `a \ b`.
pub fn difference(a: &MultiPolygon<f64>, b: &Polygon<f64>) -> MultiPolygon<f64> {
    a.difference(&MultiPolygon::new(vec![b.clone()]))
}

pub fn intersection(a: &MultiPolygon<f64>, b: &Polygon<f64>) -> MultiPolygon<f64> {
    a.intersection(&MultiPolygon::new(vec![b.clone()]))
}

pub fn intersects(a: &MultiPolygon<f64>, b: &Polygon<f64>) -> bool {
    a.intersects(b)
}

/// Geodesic disk approximated by `steps` vertices, radius in meters.
pub fn circle(center: Coord<f64>, radius_m: f64, steps: usize) -> Polygon<f64> {
    let origin = Point::from(center);
    let steps = steps.max(3);
    let ring: Vec<Coord<f64>> = (0..steps)
        .map(|i| {
            let bearing = -(i as f64) * 360.0 / steps as f64;
            Haversine::destination(origin, bearing, radius_m).into()
        })
        .collect();
    Polygon::new(LineString::from(ring), vec![])
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Area, Contains, polygon};

    fn unit_square(x: f64, y: f64) -> Polygon<f64> {
        polygon![
            (x: x, y: y),
            (x: x + 1.0, y: y),
            (x: x + 1.0, y: y + 1.0),
            (x: x, y: y + 1.0),
        ]
    }

    #[test]
    fn sign_matches_math_sign() {
        assert_eq!(sign(3.0), 1.0);
        assert_eq!(sign(-0.5), -1.0);
        assert_eq!(sign(0.0), 0.0);
        assert!(sign(f64::NAN).is_nan());
    }

    #[test]
    fn antimeridian_side_is_strict() {
        assert!(!is_antimeridian_side(90.0));
        assert!(is_antimeridian_side(90.5));
        assert!(is_antimeridian_side(-179.0));
    }

    #[test]
    fn scale_shrinks_bbox_proportionally() {
        let poly = polygon![
            (x: 0.0, y: 0.0),
            (x: 10.0, y: 0.0),
            (x: 10.0, y: 4.0),
            (x: 0.0, y: 4.0),
        ];
        let b = bbox(&scale(&poly, 0.1)).unwrap();
        assert!((b.width() - 1.0).abs() < 1e-9);
        assert!((b.height() - 0.4).abs() < 1e-9);
    }

    #[test]
    fn buffer_offsets_square_edges() {
        let buffered = buffer(&unit_square(0.0, 0.0), 0.5);
        let b = bbox(&buffered).unwrap();
        assert!((b.min[0] + 0.5).abs() < 1e-9);
        assert!((b.max[0] - 1.5).abs() < 1e-9);
        assert!((b.min[1] + 0.5).abs() < 1e-9);
        assert!((b.max[1] - 1.5).abs() < 1e-9);
        assert!(buffered.contains(&unit_square(0.0, 0.0)));
    }

    #[test]
    fn buffer_by_zero_is_identity() {
        let square = unit_square(2.0, 2.0);
        assert_eq!(buffer(&square, 0.0), square);
    }

    #[test]
    fn union_then_difference_is_empty() {
        let cell = unit_square(0.0, 0.0);
        let grown = union(&MultiPolygon::new(vec![]), &cell);
        assert!((grown.unsigned_area() - 1.0).abs() < 1e-9);
        let shrunk = difference(&grown, &cell);
        assert!(shrunk.unsigned_area() < 1e-9);
    }

    #[test]
    fn touching_squares_merge() {
        let a = union(&MultiPolygon::new(vec![]), &unit_square(0.0, 0.0));
        let ab = union(&a, &unit_square(1.0, 0.0));
        assert_eq!(ab.0.len(), 1);
        assert!((ab.unsigned_area() - 2.0).abs() < 1e-9);
        assert!(intersects(&ab, &unit_square(1.5, 0.5)));
        assert!(!intersects(&ab, &unit_square(5.0, 5.0)));
        assert!((intersection(&ab, &unit_square(1.5, 0.5)).unsigned_area() - 0.25).abs() < 1e-9);
    }

    #[test]
    fn circle_has_requested_radius() {
        let c = circle(Coord { x: 0.0, y: 0.0 }, 111_195.0, CIRCLE_STEPS);
        assert_eq!(c.exterior().0.len(), CIRCLE_STEPS + 1);
        let b = bbox(&c).unwrap();
        // 111.195 km is about one degree along a great circle at the equator.
        assert!((b.max[1] - 1.0).abs() < 0.01);
        assert!((b.min[0] + 1.0).abs() < 0.01);
    }
}
