use geo::{BoundingRect, Coord, Polygon, Rect};

/// Axis-aligned bounding box in degrees (`min = [west, south]`, `max = [east, north]`).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb2 {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl Aabb2 {
    pub fn new(min: [f64; 2], max: [f64; 2]) -> Self {
        Aabb2 { min, max }
    }

    pub fn of_polygon(polygon: &Polygon<f64>) -> Option<Self> {
        polygon.bounding_rect().map(Self::from)
    }

    pub fn width(&self) -> f64 {
        (self.max[0] - self.min[0]).abs()
    }

    pub fn height(&self) -> f64 {
        (self.max[1] - self.min[1]).abs()
    }

    pub fn center(&self) -> Coord<f64> {
        Coord {
            x: (self.min[0] + self.max[0]) / 2.0,
            y: (self.min[1] + self.max[1]) / 2.0,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        !(self.width() > 0.0 && self.height() > 0.0)
    }

    pub fn to_polygon(&self) -> Polygon<f64> {
        Rect::new(
            Coord { x: self.min[0], y: self.min[1] },
            Coord { x: self.max[0], y: self.max[1] },
        )
        .to_polygon()
    }
}

impl From<Rect<f64>> for Aabb2 {
    fn from(rect: Rect<f64>) -> Self {
        Aabb2::new([rect.min().x, rect.min().y], [rect.max().x, rect.max().y])
    }
}
