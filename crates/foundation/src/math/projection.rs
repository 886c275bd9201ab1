//! Web Mercator camera with the same pixel conventions as common web map
//! renderers (512 px tiles at zoom 0, bearing in degrees clockwise).

use std::f64::consts::PI;

use geo::Coord;

pub const TILE_SIZE_PX: f64 = 512.0;

/// Latitude limit of the Web Mercator square.
pub const MAX_MERCATOR_LAT: f64 = 85.051_128_779_806_59;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MercatorCamera {
    pub center: Coord<f64>,
    pub zoom: f64,
    pub bearing_deg: f64,
    /// Viewport size in CSS pixels.
    pub width_px: f64,
    pub height_px: f64,
}

impl MercatorCamera {
    pub fn new(center: Coord<f64>, zoom: f64, width_px: f64, height_px: f64) -> Self {
        Self {
            center,
            zoom,
            bearing_deg: 0.0,
            width_px,
            height_px,
        }
    }

    pub fn with_bearing(mut self, bearing_deg: f64) -> Self {
        self.bearing_deg = bearing_deg;
        self
    }

    pub fn world_size(&self) -> f64 {
        TILE_SIZE_PX * 2f64.powf(self.zoom)
    }

    /// Geographic coordinate to screen pixels.
    pub fn project(&self, geo: Coord<f64>) -> [f64; 2] {
        let ws = self.world_size();
        let [px, py] = lnglat_to_world(geo, ws);
        let [cx, cy] = lnglat_to_world(self.center, ws);
        let (sin, cos) = self.bearing_deg.to_radians().sin_cos();
        let (dx, dy) = (px - cx, py - cy);
        [
            dx * cos + dy * sin + self.width_px / 2.0,
            -dx * sin + dy * cos + self.height_px / 2.0,
        ]
    }

    /// Screen pixels to geographic coordinate.
    ///
    /// Longitudes are not wrapped, so points beyond the antimeridian come back
    /// outside `[-180, 180]`. Returns `None` only for non-finite input.
    pub fn unproject(&self, screen: [f64; 2]) -> Option<Coord<f64>> {
        let ws = self.world_size();
        let [cx, cy] = lnglat_to_world(self.center, ws);
        let (sin, cos) = self.bearing_deg.to_radians().sin_cos();
        let sx = screen[0] - self.width_px / 2.0;
        let sy = screen[1] - self.height_px / 2.0;
        let wx = cx + sx * cos - sy * sin;
        let wy = cy + sx * sin + sy * cos;
        let out = world_to_lnglat([wx, wy], ws);
        (out.x.is_finite() && out.y.is_finite()).then_some(out)
    }
}

fn lnglat_to_world(geo: Coord<f64>, world_size: f64) -> [f64; 2] {
    let lat = geo.y.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT).to_radians();
    let x = (geo.x + 180.0) / 360.0 * world_size;
    let y = (PI - (PI / 4.0 + lat / 2.0).tan().ln()) / (2.0 * PI) * world_size;
    [x, y]
}

fn world_to_lnglat(world: [f64; 2], world_size: f64) -> Coord<f64> {
    let lng = world[0] / world_size * 360.0 - 180.0;
    let y = PI - world[1] / world_size * 2.0 * PI;
    let lat = (2.0 * y.exp().atan() - PI / 2.0).to_degrees();
    Coord { x: lng, y: lat }
}
