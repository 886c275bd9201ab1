use foundation::bounds::Aabb2;
use foundation::math;
use geo::{Intersects, MultiPolygon, Polygon, Rect, Translate, coord};

/// Square tiles covering a viewport, each small enough for the index to
/// rasterize without precision trouble over large views.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkGrid {
    /// Side of one chunk, degrees.
    pub size: f64,
    pub chunks: Vec<Polygon<f64>>,
}

/// Side length for chunks over `viewport`: the short side of the viewport's
/// bounding box after scaling it by `scale`.
pub fn chunk_size(viewport: &Polygon<f64>, scale: f64) -> f64 {
    math::bbox(&math::scale(viewport, scale))
        .map(|b| b.width().min(b.height()))
        .unwrap_or(0.0)
}

impl ChunkGrid {
    /// Lays a square grid over the viewport's bounding box and keeps the
    /// squares touching the viewport.
    ///
    /// The grid has `floor(width / size)` columns and `floor(height / size)`
    /// rows and is centered on the box, so thin margins on each side stay
    /// uncovered. Callers buffer every chunk by `size` to close them.
    pub fn over(viewport: &Polygon<f64>, scale: f64, max_chunks: usize) -> Self {
        let size = chunk_size(viewport, scale);
        let Some(bounds) = math::bbox(viewport) else {
            return Self { size, chunks: Vec::new() };
        };
        if !(size > 0.0 && size.is_finite()) {
            return Self { size, chunks: Vec::new() };
        }

        let columns = (bounds.width() / size).floor() as usize;
        let rows = (bounds.height() / size).floor() as usize;
        let dx = (bounds.width() - columns as f64 * size) / 2.0;
        let dy = (bounds.height() - rows as f64 * size) / 2.0;

        let mut chunks = Vec::new();
        'grid: for col in 0..columns {
            for row in 0..rows {
                let x = bounds.min[0] + dx + col as f64 * size;
                let y = bounds.min[1] + dy + row as f64 * size;
                let square = Aabb2::new([x, y], [x + size, y + size]).to_polygon();
                if !square.intersects(viewport) {
                    continue;
                }
                if chunks.len() == max_chunks {
                    tracing::warn!(max_chunks, columns, rows, "chunk cap reached, viewport partially covered");
                    break 'grid;
                }
                chunks.push(square);
            }
        }
        Self { size, chunks }
    }
}

/// Splits `chunk` into pieces inside the canonical longitude and latitude
/// ranges, shifting copies that lie past the antimeridian by a full turn.
pub fn canonical_pieces(chunk: &Polygon<f64>) -> Vec<Polygon<f64>> {
    let world: Polygon<f64> = Rect::new(coord! { x: -180.0, y: -90.0 }, coord! { x: 180.0, y: 90.0 }).to_polygon();
    let Some(bounds) = math::bbox(chunk) else {
        return Vec::new();
    };
    if bounds.min[0] >= -180.0 && bounds.max[0] <= 180.0 && bounds.min[1] >= -90.0 && bounds.max[1] <= 90.0 {
        return vec![chunk.clone()];
    }

    let mut pieces = Vec::new();
    for turns in [-1.0, 0.0, 1.0] {
        let shifted = MultiPolygon::new(vec![chunk.translate(turns * 360.0, 0.0)]);
        pieces.extend(math::intersection(&shifted, &world));
    }
    pieces
}
