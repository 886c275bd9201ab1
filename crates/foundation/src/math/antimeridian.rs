//! Rewrites longitude jumps so a cell ring is drawn as one non-wrapping shape.

use geo::{Coord, LineString, Polygon};

use super::geomath::{is_antimeridian_side, sign};

/// Walks `rings` in order as one flat coordinate sequence and shifts every
/// antimeridian-side vertex whose longitude sign disagrees with the previous
/// vertex by `360 * sign(previous)`.
///
/// Returns `true` if any vertex was corrected. Vertex order is never changed.
pub fn normalize_rings<'a>(rings: impl IntoIterator<Item = &'a mut LineString<f64>>) -> bool {
    let mut previous: Option<Coord<f64>> = None;
    let mut corrected = false;

    for ring in rings {
        for current in ring.0.iter_mut() {
            if let Some(prev) = previous {
                if is_antimeridian_side(current.x) {
                    let center_sign = sign(prev.x);
                    if sign(current.x) != center_sign {
                        current.x += 360.0 * center_sign;
                        corrected = true;
                    }
                }
            }
            previous = Some(*current);
        }
    }

    corrected
}

/// Normalizes a polygon, returning it together with the correction flag.
pub fn normalize_polygon(polygon: Polygon<f64>) -> (Polygon<f64>, bool) {
    let (mut exterior, mut interiors) = polygon.into_inner();
    let corrected = normalize_rings(std::iter::once(&mut exterior).chain(interiors.iter_mut()));
    (Polygon::new(exterior, interiors), corrected)
}
