use std::collections::BTreeMap;

use foundation::ids::DisplayId;
use foundation::math::MercatorCamera;
use geo::Coord;
use serde_json::Value;

use crate::host::{CanvasSize, LayerSpec, MapHost};

/// A `MapHost` without a renderer: a Web Mercator camera plus the sources,
/// layers and feature state the engine pushed into it.
///
/// Used by the command line tool and by tests.
#[derive(Debug, Clone)]
pub struct HeadlessHost {
    pub camera: MercatorCamera,
    pub device_pixel_ratio: f64,
    sources: BTreeMap<String, Option<Value>>,
    layers: Vec<LayerSpec>,
    fill_colors: BTreeMap<String, String>,
    feature_states: BTreeMap<(String, DisplayId), bool>,
    drag_pan: bool,
    cursor: String,
    blind: bool,
}

impl HeadlessHost {
    pub fn new(camera: MercatorCamera) -> Self {
        Self {
            camera,
            device_pixel_ratio: 1.0,
            sources: BTreeMap::new(),
            layers: Vec::new(),
            fill_colors: BTreeMap::new(),
            feature_states: BTreeMap::new(),
            drag_pan: true,
            cursor: String::new(),
            blind: false,
        }
    }

    pub fn with_device_pixel_ratio(mut self, dpr: f64) -> Self {
        self.device_pixel_ratio = dpr;
        self
    }

    /// Makes every `unproject` call fail, as a globe view looking into space does.
    pub fn set_blind(&mut self, blind: bool) {
        self.blind = blind;
    }

    pub fn has_source(&self, source_id: &str) -> bool {
        self.sources.contains_key(source_id)
    }

    /// Last data pushed to a source.
    pub fn source_data(&self, source_id: &str) -> Option<&Value> {
        self.sources.get(source_id).and_then(Option::as_ref)
    }

    pub fn layers(&self) -> &[LayerSpec] {
        &self.layers
    }

    pub fn fill_color(&self, layer_id: &str) -> Option<&str> {
        self.fill_colors.get(layer_id).map(String::as_str)
    }

    pub fn feature_hovered(&self, source_id: &str, feature: DisplayId) -> bool {
        self.feature_states
            .get(&(source_id.to_string(), feature))
            .copied()
            .unwrap_or(false)
    }
}

impl MapHost for HeadlessHost {
    fn unproject(&self, screen: [f64; 2]) -> Option<Coord<f64>> {
        if self.blind {
            return None;
        }
        self.camera.unproject(screen)
    }

    fn zoom(&self) -> f64 {
        self.camera.zoom
    }

    fn canvas_size(&self) -> CanvasSize {
        CanvasSize {
            width: self.camera.width_px * self.device_pixel_ratio,
            height: self.camera.height_px * self.device_pixel_ratio,
            device_pixel_ratio: self.device_pixel_ratio,
        }
    }

    fn add_source(&mut self, source_id: &str) {
        self.sources.entry(source_id.to_string()).or_insert(None);
    }

    fn remove_source(&mut self, source_id: &str) {
        self.sources.remove(source_id);
        self.feature_states.retain(|(s, _), _| s != source_id);
    }

    fn add_layer(&mut self, layer: LayerSpec) {
        self.layers.retain(|l| l.id != layer.id);
        self.layers.push(layer);
    }

    fn remove_layer(&mut self, layer_id: &str) {
        self.layers.retain(|l| l.id != layer_id);
        self.fill_colors.remove(layer_id);
    }

    fn set_source_data(&mut self, source_id: &str, data: Value) {
        match self.sources.get_mut(source_id) {
            Some(slot) => *slot = Some(data),
            None => tracing::warn!(source_id, "data pushed to unknown source"),
        }
    }

    fn set_feature_state(&mut self, source_id: &str, feature: DisplayId, hovered: bool) {
        self.feature_states
            .insert((source_id.to_string(), feature), hovered);
    }

    fn set_fill_color(&mut self, layer_id: &str, color: &str) {
        self.fill_colors
            .insert(layer_id.to_string(), color.to_string());
    }

    fn drag_pan_enabled(&self) -> bool {
        self.drag_pan
    }

    fn set_drag_pan(&mut self, enabled: bool) {
        self.drag_pan = enabled;
    }

    fn cursor(&self) -> String {
        self.cursor.clone()
    }

    fn set_cursor(&mut self, cursor: &str) {
        self.cursor = cursor.to_string();
    }
}
