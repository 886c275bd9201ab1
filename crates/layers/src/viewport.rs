//! Traces the geographic footprint of the canvas.
//!
//! Unprojecting only the four corners misses the curvature a rotated or
//! pitched camera puts on the edges, so each edge is sampled at several
//! evenly spaced points and the results are joined into one closed ring.

use geo::{Coord, LineString, Polygon};

use crate::error::LayerError;
use crate::host::MapHost;

/// Relative canvas positions, clockwise from the top-left corner.
///
/// With `n` samples per side the ring has `4 * n` points: the top edge
/// left to right, the right edge top to bottom, the bottom edge right to left,
/// and the left edge bottom to top. Each corner appears once.
pub fn sample_positions(per_side: usize) -> Vec<[f64; 2]> {
    let n = per_side.max(1);
    let step = |i: usize| i as f64 / n as f64;
    let back = |i: usize| (n - i) as f64 / n as f64;
    let mut out = Vec::with_capacity(4 * n);
    out.extend((0..n).map(|i| [step(i), 0.0]));
    out.extend((0..n).map(|i| [1.0, step(i)]));
    out.extend((0..n).map(|i| [back(i), 1.0]));
    out.extend((0..n).map(|i| [0.0, back(i)]));
    out
}

/// The visible area as a polygon in (lng, lat).
///
/// Fails with [`LayerError::ViewportUnavailable`] on the first sample that
/// does not hit the globe.
pub fn sample_viewport<H: MapHost + ?Sized>(
    host: &H,
    per_side: usize,
) -> Result<Polygon<f64>, LayerError> {
    let [width, height] = host.canvas_size().css();
    let ring: Vec<Coord<f64>> = sample_positions(per_side)
        .into_iter()
        .map(|[rx, ry]| {
            let (x, y) = (rx * width, ry * height);
            host.unproject([x, y])
                .ok_or(LayerError::ViewportUnavailable { x, y })
        })
        .collect::<Result<_, _>>()?;
    Ok(Polygon::new(LineString::new(ring), vec![]))
}
