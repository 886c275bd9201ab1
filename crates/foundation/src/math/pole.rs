use geo::{CoordsIter, Polygon};

/// Latitude beyond which cells are too distorted to draw reliably.
pub const CLOSE_TO_POLE_DEG: f64 = 85.0;

/// `true` if any vertex of `polygon` lies beyond `threshold_deg` latitude.
pub fn is_close_to_pole(polygon: &Polygon<f64>, threshold_deg: f64) -> bool {
    polygon.coords_iter().any(|c| c.y.abs() > threshold_deg)
}

#[cfg(test)]
mod tests {
    use super::{CLOSE_TO_POLE_DEG, is_close_to_pole};
    use geo::polygon;

    #[test]
    fn flags_polar_vertices_only() {
        let arctic = polygon![(x: 0.0, y: 84.0), (x: 1.0, y: 85.5), (x: 2.0, y: 84.0)];
        let temperate = polygon![(x: 0.0, y: 84.0), (x: 1.0, y: 85.0), (x: 2.0, y: 84.0)];
        let antarctic = polygon![(x: 0.0, y: -86.0), (x: 1.0, y: -84.0), (x: 2.0, y: -84.0)];
        assert!(is_close_to_pole(&arctic, CLOSE_TO_POLE_DEG));
        assert!(!is_close_to_pole(&temperate, CLOSE_TO_POLE_DEG));
        assert!(is_close_to_pole(&antarctic, CLOSE_TO_POLE_DEG));
    }
}
