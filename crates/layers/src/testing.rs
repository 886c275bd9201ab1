use cells::{CellError, CellId, CellIndexer, Resolution};
use foundation::bounds::Aabb2;
use foundation::math::MercatorCamera;
use geo::{Coord, Intersects, Polygon, coord};

use crate::headless::HeadlessHost;

const OFFSET: i64 = 1 << 31;
const METERS_PER_DEGREE: f64 = 111_195.0;

/// Planar index of axis-aligned squares `side` degrees wide. Resolution is
/// ignored, so every zoom sees the same lattice.
#[derive(Debug, Copy, Clone)]
pub struct SquareIndexer {
    side: f64,
}

impl SquareIndexer {
    pub fn new(side: f64) -> Self {
        Self { side }
    }

    fn encode(i: i64, j: i64) -> CellId {
        CellId((((i + OFFSET) as u64) << 32) | (j + OFFSET) as u64)
    }

    fn decode(cell: CellId) -> (i64, i64) {
        ((cell.0 >> 32) as i64 - OFFSET, (cell.0 & 0xffff_ffff) as i64 - OFFSET)
    }

    fn square(&self, i: i64, j: i64) -> Aabb2 {
        let (x, y) = (i as f64 * self.side, j as f64 * self.side);
        Aabb2::new([x, y], [x + self.side, y + self.side])
    }
}

impl CellIndexer for SquareIndexer {
    fn polygon_to_cells(&self, polygon: &Polygon<f64>, _: Resolution) -> Result<Vec<CellId>, CellError> {
        let bounds = Aabb2::of_polygon(polygon).ok_or_else(|| CellError::InvalidGeometry("empty polygon".into()))?;
        let lo = |v: f64| (v / self.side).floor() as i64;
        let mut out = Vec::new();
        for i in lo(bounds.min[0])..=lo(bounds.max[0]) {
            for j in lo(bounds.min[1])..=lo(bounds.max[1]) {
                if self.square(i, j).to_polygon().intersects(polygon) {
                    out.push(Self::encode(i, j));
                }
            }
        }
        Ok(out)
    }

    fn cell_to_polygon(&self, cell: CellId) -> Result<Polygon<f64>, CellError> {
        let (i, j) = Self::decode(cell);
        Ok(self.square(i, j).to_polygon())
    }

    fn cell_centroid(&self, cell: CellId) -> Result<Coord<f64>, CellError> {
        let (i, j) = Self::decode(cell);
        Ok(self.square(i, j).center())
    }

    fn cell_resolution(&self, _: CellId) -> Result<Resolution, CellError> {
        Ok(Resolution::MIN)
    }

    /// Small enough that the membership disk stays inside its own square.
    fn average_edge_length_m(&self, _: Resolution) -> f64 {
        self.side * METERS_PER_DEGREE * 0.4
    }

    fn cell_at(&self, point: Coord<f64>, _: Resolution) -> Result<CellId, CellError> {
        if !(point.x.is_finite() && point.y.is_finite()) {
            return Err(CellError::InvalidCoordinate(format!("{point:?}")));
        }
        let i = (point.x / self.side).floor() as i64;
        let j = (point.y / self.side).floor() as i64;
        Ok(Self::encode(i, j))
    }
}

/// 1024x768 headless map centered on Chicago.
pub fn chicago_host(zoom: f64) -> HeadlessHost {
    HeadlessHost::new(MercatorCamera::new(coord! { x: -87.8, y: 41.9 }, zoom, 1024.0, 768.0))
}
