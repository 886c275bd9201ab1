//! [`CellIndexer`] backed by the `h3o` implementation of H3.

use geo::{Coord, LineString, Polygon};
use h3o::geom::{ContainmentMode, TilerBuilder};
use h3o::{CellIndex, LatLng};

use crate::cell::{CellId, Resolution};
use crate::error::CellError;
use crate::indexer::CellIndexer;

#[derive(Debug, Clone, Copy)]
pub struct H3Indexer {
    containment: ContainmentMode,
}

impl Default for H3Indexer {
    fn default() -> Self {
        Self::new()
    }
}

impl H3Indexer {
    /// Rasterizes to the full covering set: every cell touching the polygon.
    pub fn new() -> Self {
        Self {
            containment: ContainmentMode::Covers,
        }
    }

    pub fn with_containment(containment: ContainmentMode) -> Self {
        Self { containment }
    }
}

fn h3_resolution(resolution: Resolution) -> Result<h3o::Resolution, CellError> {
    h3o::Resolution::try_from(resolution.get())
        .map_err(|_| CellError::InvalidResolution(resolution.get()))
}

fn h3_cell(cell: CellId) -> Result<CellIndex, CellError> {
    CellIndex::try_from(cell.0).map_err(|_| CellError::InvalidCell(cell.0))
}

impl From<CellIndex> for CellId {
    fn from(cell: CellIndex) -> Self {
        CellId(u64::from(cell))
    }
}

impl CellIndexer for H3Indexer {
    fn polygon_to_cells(
        &self,
        polygon: &Polygon<f64>,
        resolution: Resolution,
    ) -> Result<Vec<CellId>, CellError> {
        let mut tiler = TilerBuilder::new(h3_resolution(resolution)?)
            .containment_mode(self.containment)
            .build();
        tiler
            .add(polygon.clone())
            .map_err(|e| CellError::InvalidGeometry(e.to_string()))?;
        Ok(tiler.into_coverage().map(CellId::from).collect())
    }

    fn cell_to_polygon(&self, cell: CellId) -> Result<Polygon<f64>, CellError> {
        let boundary = h3_cell(cell)?.boundary();
        let ring: Vec<Coord<f64>> = boundary
            .iter()
            .map(|ll| Coord {
                x: ll.lng(),
                y: ll.lat(),
            })
            .collect();
        Ok(Polygon::new(LineString::from(ring), vec![]))
    }

    fn cell_centroid(&self, cell: CellId) -> Result<Coord<f64>, CellError> {
        let center = LatLng::from(h3_cell(cell)?);
        Ok(Coord {
            x: center.lng(),
            y: center.lat(),
        })
    }

    fn cell_resolution(&self, cell: CellId) -> Result<Resolution, CellError> {
        Resolution::new(u8::from(h3_cell(cell)?.resolution()))
    }

    fn average_edge_length_m(&self, resolution: Resolution) -> f64 {
        h3_resolution(resolution)
            .map(h3o::Resolution::edge_length_m)
            .unwrap_or(0.0)
    }

    fn cell_at(&self, point: Coord<f64>, resolution: Resolution) -> Result<CellId, CellError> {
        let ll = LatLng::new(point.y, point.x)
            .map_err(|e| CellError::InvalidCoordinate(e.to_string()))?;
        Ok(ll.to_cell(h3_resolution(resolution)?).into())
    }
}

#[cfg(test)]
mod tests {
    use super::H3Indexer;
    use crate::cell::{CellId, Resolution};
    use crate::indexer::CellIndexer;
    use geo::{Contains, Coord, Point, polygon};
    use std::collections::HashSet;

    fn res(r: u8) -> Resolution {
        Resolution::new(r).unwrap()
    }

    #[test]
    fn cell_at_chicago_round_trips_through_centroid() {
        let index = H3Indexer::new();
        let cell = index
            .cell_at(Coord { x: -87.8, y: 41.9 }, res(7))
            .unwrap();
        assert_eq!(index.cell_resolution(cell).unwrap(), res(7));

        let center = index.cell_centroid(cell).unwrap();
        assert_eq!(index.cell_at(center, res(7)).unwrap(), cell);

        let poly = index.cell_to_polygon(cell).unwrap();
        // Hexagon plus the closing vertex.
        assert_eq!(poly.exterior().0.len(), 7);
        assert!(poly.contains(&Point::from(center)));
    }

    #[test]
    fn polyfill_of_small_box_is_non_empty_and_unique() {
        let index = H3Indexer::new();
        let bbox = polygon![
            (x: -88.0, y: 41.5),
            (x: -87.5, y: 41.5),
            (x: -87.5, y: 42.0),
            (x: -88.0, y: 42.0),
        ];
        let cells = index.polygon_to_cells(&bbox, res(7)).unwrap();
        assert!(!cells.is_empty());
        let unique: HashSet<CellId> = cells.iter().copied().collect();
        assert_eq!(unique.len(), cells.len());
    }

    #[test]
    fn edge_length_shrinks_with_resolution() {
        let index = H3Indexer::new();
        let r7 = index.average_edge_length_m(res(7));
        assert!((r7 - 1_406.0).abs() < 5.0, "res 7 edge {r7}");
        assert!(index.average_edge_length_m(res(8)) < r7);
    }

    #[test]
    fn cell_on_antimeridian_has_mixed_longitude_signs() {
        let index = H3Indexer::new();
        let cell = index.cell_at(Coord { x: 180.0, y: 0.0 }, res(2)).unwrap();
        let poly = index.cell_to_polygon(cell).unwrap();
        let has_east = poly.exterior().coords().any(|c| c.x > 90.0);
        let has_west = poly.exterior().coords().any(|c| c.x < -90.0);
        assert!(has_east && has_west);
    }

    #[test]
    fn invalid_cell_is_an_error() {
        let index = H3Indexer::new();
        assert!(index.cell_to_polygon(CellId(0)).is_err());
    }
}
