pub mod antimeridian;
pub mod geomath;
pub mod pole;
pub mod projection;

pub use antimeridian::*;
pub use geomath::*;
pub use pole::*;
pub use projection::*;
