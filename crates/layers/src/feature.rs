use cells::CellId;
use foundation::ids::DisplayId;
use geo::{LineString, MultiPolygon, Polygon};
use serde_json::{Map, Value, json};

/// One grid cell ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct CellFeature {
    pub id: DisplayId,
    pub cell: CellId,
    pub polygon: Polygon<f64>,
    pub close_to_pole: bool,
    pub crosses_antimeridian: bool,
}

impl CellFeature {
    /// GeoJSON `Feature`. The flags are only written when set.
    pub fn to_geojson(&self) -> Value {
        let mut properties = Map::new();
        properties.insert("cell".into(), Value::String(self.cell.to_string()));
        if self.close_to_pole {
            properties.insert("closeToPole".into(), Value::Bool(true));
        }
        if self.crosses_antimeridian {
            properties.insert("crossesAntimeridian".into(), Value::Bool(true));
        }
        json!({
            "type": "Feature",
            "id": self.id.get(),
            "properties": properties,
            "geometry": {
                "type": "Polygon",
                "coordinates": polygon_coordinates(&self.polygon),
            },
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureCollection {
    pub features: Vec<CellFeature>,
}

impl FeatureCollection {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CellFeature> {
        self.features.iter()
    }

    pub fn to_geojson(&self) -> Value {
        json!({
            "type": "FeatureCollection",
            "features": self.features.iter().map(CellFeature::to_geojson).collect::<Vec<_>>(),
        })
    }
}

pub fn empty_collection() -> Value {
    json!({ "type": "FeatureCollection", "features": [] })
}

/// The selection as a collection holding a single `MultiPolygon` feature, or
/// an empty collection when nothing is selected.
pub fn selection_collection(geometry: &MultiPolygon<f64>) -> Value {
    if geometry.0.is_empty() {
        return empty_collection();
    }
    let coordinates: Vec<Value> = geometry.0.iter().map(polygon_coordinates).collect();
    json!({
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "properties": {},
            "geometry": { "type": "MultiPolygon", "coordinates": coordinates },
        }],
    })
}

fn polygon_coordinates(polygon: &Polygon<f64>) -> Value {
    let rings = std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(ring_coordinates)
        .collect();
    Value::Array(rings)
}

fn ring_coordinates(ring: &LineString<f64>) -> Value {
    Value::Array(ring.coords().map(|c| json!([c.x, c.y])).collect())
}
