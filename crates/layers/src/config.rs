use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::LayerError;

/// Tunables for the grid and selection layers.
///
/// Every field has a default, so a partial JSON document is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Screen samples per canvas edge when tracing the viewport footprint.
    pub samples_per_side: usize,
    /// Factor the viewport is scaled by before measuring the chunk size.
    pub chunk_scale: f64,
    /// Upper bound on chunks rasterized per redraw.
    pub max_chunks: usize,
    pub close_to_pole_deg: f64,
    pub max_zoom: f64,
    pub max_resolution: u8,
    pub long_press_ms: u64,
    pub move_cooldown_ms: u64,
    pub move_trailing_ms: u64,
    pub paint_cursor: String,
    pub highlight: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            samples_per_side: 3,
            chunk_scale: 0.1,
            max_chunks: 4096,
            close_to_pole_deg: foundation::math::CLOSE_TO_POLE_DEG,
            max_zoom: cells::MAX_ZOOM,
            max_resolution: cells::MAX_RESOLUTION,
            long_press_ms: 500,
            move_cooldown_ms: 500,
            move_trailing_ms: 100,
            paint_cursor: "crosshair".to_string(),
            highlight: "#08f8".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self, LayerError> {
        let config: EngineConfig =
            serde_json::from_str(json).map_err(|e| LayerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), LayerError> {
        if self.samples_per_side == 0 {
            return Err(LayerError::Config("samples_per_side must be at least 1".into()));
        }
        if !(self.chunk_scale > 0.0 && self.chunk_scale.is_finite()) {
            return Err(LayerError::Config(format!(
                "chunk_scale must be positive, got {}",
                self.chunk_scale
            )));
        }
        if !(self.max_zoom > 0.0) {
            return Err(LayerError::Config("max_zoom must be positive".into()));
        }
        if self.max_resolution > cells::MAX_RESOLUTION {
            return Err(LayerError::Config(format!(
                "max_resolution {} exceeds {}",
                self.max_resolution,
                cells::MAX_RESOLUTION
            )));
        }
        Ok(())
    }

    pub fn long_press(&self) -> Duration {
        Duration::from_millis(self.long_press_ms)
    }

    pub fn move_cooldown(&self) -> Duration {
        Duration::from_millis(self.move_cooldown_ms)
    }

    pub fn move_trailing(&self) -> Duration {
        Duration::from_millis(self.move_trailing_ms)
    }

    pub fn resolution_for_zoom(&self, zoom: f64) -> cells::Resolution {
        cells::resolution_for_zoom_with(zoom, self.max_zoom, self.max_resolution)
    }
}

#[cfg(test)]
mod tests {
    use super::EngineConfig;
    use pretty_assertions::assert_eq;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = EngineConfig::from_json_str(r#"{ "long_press_ms": 750 }"#).unwrap();
        assert_eq!(cfg.long_press_ms, 750);
        assert_eq!(cfg.samples_per_side, 3);
        assert_eq!(cfg.highlight, "#08f8");
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(EngineConfig::from_json_str(r#"{ "samples_per_side": 0 }"#).is_err());
        assert!(EngineConfig::from_json_str(r#"{ "chunk_scale": -1.0 }"#).is_err());
        assert!(EngineConfig::from_json_str(r#"{ "max_resolution": 16 }"#).is_err());
        assert!(EngineConfig::from_json_str("not json").is_err());
    }

    #[test]
    fn zoom_ten_maps_to_seven_by_default() {
        assert_eq!(EngineConfig::default().resolution_for_zoom(10.0).get(), 7);
    }
}
