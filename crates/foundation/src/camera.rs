use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Camera position as persisted in a location hash: `lng,lat,zoom`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CameraPosition {
    pub lng: f64,
    pub lat: f64,
    pub zoom: f64,
}

impl CameraPosition {
    pub const DEFAULT: CameraPosition = CameraPosition {
        lng: -87.8,
        lat: 41.9,
        zoom: 10.0,
    };

    pub fn new(lng: f64, lat: f64, zoom: f64) -> Self {
        Self { lng, lat, zoom }
    }
}

impl Default for CameraPosition {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for CameraPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2},{:.2},{:.2}", self.lng, self.lat, self.zoom)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CameraPositionError {
    #[error("invalid number {value:?} in camera position")]
    InvalidNumber { value: String },
    #[error("camera position has {0} parts, expected at most 3")]
    TooManyParts(usize),
}

impl FromStr for CameraPosition {
    type Err = CameraPositionError;

    /// Parses `lng,lat,zoom`, tolerating a leading `#` and missing trailing
    /// parts (which fall back to [`CameraPosition::DEFAULT`]).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s
            .trim_start_matches('#')
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        if parts.len() > 3 {
            return Err(CameraPositionError::TooManyParts(parts.len()));
        }

        let mut values = [Self::DEFAULT.lng, Self::DEFAULT.lat, Self::DEFAULT.zoom];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| CameraPositionError::InvalidNumber {
                    value: part.to_string(),
                })?;
        }

        Ok(CameraPosition::new(values[0], values[1], values[2]))
    }
}
