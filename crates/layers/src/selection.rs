use cells::{CellError, CellId, CellIndexer};
use foundation::math;
use geo::{Area, LineString, MultiPolygon, Polygon, Translate};
use serde_json::Value;

use crate::feature;

/// Selected area as one (possibly disjoint) multipolygon.
///
/// Cells are merged into the geometry on `add` and cut out on `remove`; the
/// set keeps no list of cell ids. Membership is answered geometrically.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionSet {
    geometry: MultiPolygon<f64>,
}

impl Default for SelectionSet {
    fn default() -> Self {
        Self {
            geometry: MultiPolygon::new(Vec::new()),
        }
    }
}

/// Parts and holes smaller than this fraction of the cell just added or
/// removed are rounding residue from edges shared with neighbouring cells.
const SLIVER_FRACTION: f64 = 1e-6;

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn geometry(&self) -> &MultiPolygon<f64> {
        &self.geometry
    }

    pub fn is_empty(&self) -> bool {
        self.geometry.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.geometry = MultiPolygon::new(Vec::new());
    }

    /// Whether `cell` is selected.
    ///
    /// Tests a disk of half the average edge length around the cell's
    /// centroid against the selection. Any overlap counts, so a cell whose
    /// neighbour is selected can read as selected when the disk reaches past
    /// its own boundary.
    pub fn contains<I: CellIndexer + ?Sized>(&self, indexer: &I, cell: CellId) -> Result<bool, CellError> {
        if self.is_empty() {
            return Ok(false);
        }
        let center = indexer.cell_centroid(cell)?;
        let radius = indexer.average_edge_length_m(indexer.cell_resolution(cell)?) / 2.0;
        let (disk, _) = math::normalize_polygon(math::circle(center, radius, math::CIRCLE_STEPS));

        if math::intersects(&self.geometry, &disk) {
            return Ok(true);
        }
        // Cells on the antimeridian are stored east of 180; try the disk's other copy.
        if math::is_antimeridian_side(center.x) {
            let shift = -360.0 * math::sign(center.x);
            return Ok(math::intersects(&self.geometry, &disk.translate(shift, 0.0)));
        }
        Ok(false)
    }

    pub fn add<I: CellIndexer + ?Sized>(&mut self, indexer: &I, cell: CellId) -> Result<(), CellError> {
        let polygon = cell_polygon(indexer, cell)?;
        self.geometry = if self.is_empty() {
            MultiPolygon::new(vec![polygon])
        } else {
            let floor = polygon.unsigned_area() * SLIVER_FRACTION;
            drop_slivers(math::union(&self.geometry, &polygon), floor)
        };
        Ok(())
    }

    pub fn remove<I: CellIndexer + ?Sized>(&mut self, indexer: &I, cell: CellId) -> Result<(), CellError> {
        if self.is_empty() {
            return Ok(());
        }
        let polygon = cell_polygon(indexer, cell)?;
        let floor = polygon.unsigned_area() * SLIVER_FRACTION;
        self.geometry = drop_slivers(math::difference(&self.geometry, &polygon), floor);
        Ok(())
    }

    pub fn to_geojson(&self) -> Value {
        feature::selection_collection(&self.geometry)
    }
}

fn cell_polygon<I: CellIndexer + ?Sized>(indexer: &I, cell: CellId) -> Result<Polygon<f64>, CellError> {
    let (polygon, _) = math::normalize_polygon(indexer.cell_to_polygon(cell)?);
    Ok(polygon)
}

fn drop_slivers(geometry: MultiPolygon<f64>, floor: f64) -> MultiPolygon<f64> {
    let ring_area = |ring: &LineString<f64>| Polygon::new(ring.clone(), vec![]).unsigned_area();
    geometry
        .into_iter()
        .filter(|p| p.unsigned_area() > floor)
        .map(|p| {
            let (exterior, interiors) = p.into_inner();
            let interiors = interiors.into_iter().filter(|r| ring_area(r) > floor).collect();
            Polygon::new(exterior, interiors)
        })
        .collect()
}
