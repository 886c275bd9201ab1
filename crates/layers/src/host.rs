use foundation::ids::DisplayId;
use geo::Coord;
use serde_json::Value;

/// Canvas dimensions in device pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
    pub device_pixel_ratio: f64,
}

impl CanvasSize {
    /// Size in CSS pixels, the space `MapHost::unproject` works in.
    pub fn css(&self) -> [f64; 2] {
        let dpr = if self.device_pixel_ratio > 0.0 {
            self.device_pixel_ratio
        } else {
            1.0
        };
        [self.width / dpr, self.height / dpr]
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LayerKind {
    Fill,
    Line,
}

/// A style layer registered with the host, drawing one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerSpec {
    pub id: String,
    pub source: String,
    pub kind: LayerKind,
    /// Skip features flagged `closeToPole`; the host cannot draw them reliably.
    pub hide_close_to_pole: bool,
}

/// The map widget the layers draw into.
///
/// Everything the engine needs from the outside world goes through this
/// trait: screen to geographic conversion, the current zoom, data sources,
/// style layers, per-feature state, and the drag-pan and cursor toggles the
/// selection gesture borrows while painting.
pub trait MapHost {
    /// Converts a point in CSS pixels to (lng, lat). `None` when the point
    /// does not hit the globe.
    fn unproject(&self, screen: [f64; 2]) -> Option<Coord<f64>>;
    fn zoom(&self) -> f64;
    fn canvas_size(&self) -> CanvasSize;

    fn add_source(&mut self, source_id: &str);
    fn remove_source(&mut self, source_id: &str);
    fn add_layer(&mut self, layer: LayerSpec);
    fn remove_layer(&mut self, layer_id: &str);
    fn set_source_data(&mut self, source_id: &str, data: Value);
    fn set_feature_state(&mut self, source_id: &str, feature: DisplayId, hovered: bool);
    fn set_fill_color(&mut self, layer_id: &str, color: &str);

    fn drag_pan_enabled(&self) -> bool;
    fn set_drag_pan(&mut self, enabled: bool);
    fn cursor(&self) -> String;
    fn set_cursor(&mut self, cursor: &str);
}
