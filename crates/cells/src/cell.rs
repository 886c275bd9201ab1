use std::fmt;
use std::str::FromStr;

use crate::error::CellError;

/// Map zoom level at which the finest cell resolution is reached.
pub const MAX_ZOOM: f64 = 22.0;

/// Finest resolution of the hierarchical index.
pub const MAX_RESOLUTION: u8 = 15;

/// Opaque cell identifier handed out by the spatial index.
///
/// Stable for a given resolution and location. Displayed as lowercase hex,
/// which is the usual string form of H3 indexes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId(pub u64);

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}", self.0)
    }
}

impl FromStr for CellId {
    type Err = CellError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        u64::from_str_radix(s, 16)
            .map(CellId)
            .map_err(|_| CellError::MalformedCellId(s.to_string()))
    }
}

/// Index resolution in `[0, MAX_RESOLUTION]`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Resolution(u8);

impl Resolution {
    pub const MIN: Resolution = Resolution(0);
    pub const MAX: Resolution = Resolution(MAX_RESOLUTION);

    pub fn new(value: u8) -> Result<Self, CellError> {
        if value > MAX_RESOLUTION {
            return Err(CellError::InvalidResolution(value));
        }
        Ok(Resolution(value))
    }

    /// Like [`Resolution::new`] but clamps instead of failing.
    pub fn saturating(value: i64) -> Self {
        Resolution(value.clamp(0, MAX_RESOLUTION as i64) as u8)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Resolution for a map zoom level: `round(max(z, 0) / max_zoom * max_resolution)`.
///
/// Out-of-range results clamp to `[0, max_resolution]`; NaN zoom maps to
/// resolution 0. Monotonically non-decreasing in `zoom`.
pub fn resolution_for_zoom_with(zoom: f64, max_zoom: f64, max_resolution: u8) -> Resolution {
    if zoom.is_nan() || !(max_zoom > 0.0) {
        return Resolution::MIN;
    }
    let max_resolution = max_resolution.min(MAX_RESOLUTION);
    let raw = (zoom.max(0.0) / max_zoom * max_resolution as f64).round();
    if raw > max_resolution as f64 {
        tracing::trace!(zoom, raw, "zoom beyond finest resolution, clamping");
    }
    Resolution::saturating(raw as i64).min(Resolution(max_resolution))
}

pub fn resolution_for_zoom(zoom: f64) -> Resolution {
    resolution_for_zoom_with(zoom, MAX_ZOOM, MAX_RESOLUTION)
}
