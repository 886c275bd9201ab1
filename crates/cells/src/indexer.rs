use geo::{Coord, Polygon};

use crate::cell::{CellId, Resolution};
use crate::error::CellError;

/// Narrow contract over a hierarchical hexagonal spatial index.
///
/// Coordinates are degrees with `x = longitude`, `y = latitude`.
pub trait CellIndexer {
    /// Every cell covering `polygon` at `resolution`. Order is unspecified.
    fn polygon_to_cells(
        &self,
        polygon: &Polygon<f64>,
        resolution: Resolution,
    ) -> Result<Vec<CellId>, CellError>;

    /// Boundary polygon of a cell, in the index's vertex order.
    fn cell_to_polygon(&self, cell: CellId) -> Result<Polygon<f64>, CellError>;

    fn cell_centroid(&self, cell: CellId) -> Result<Coord<f64>, CellError>;

    fn cell_resolution(&self, cell: CellId) -> Result<Resolution, CellError>;

    /// Average hexagon edge length at `resolution`, meters.
    fn average_edge_length_m(&self, resolution: Resolution) -> f64;

    /// The cell containing `point`.
    fn cell_at(&self, point: Coord<f64>, resolution: Resolution) -> Result<CellId, CellError>;
}
