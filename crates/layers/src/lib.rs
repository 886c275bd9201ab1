pub mod chunks;
pub mod config;
pub mod error;
pub mod feature;
pub mod gesture;
pub mod grid;
pub mod headless;
pub mod host;
pub mod layer;
pub mod selection;
pub mod selection_layer;
pub mod viewport;

#[cfg(test)]
mod testing;

pub use config::EngineConfig;
pub use error::LayerError;
pub use feature::{CellFeature, FeatureCollection};
pub use gesture::*;
pub use grid::*;
pub use headless::HeadlessHost;
pub use host::*;
pub use layer::*;
pub use selection::SelectionSet;
pub use selection_layer::*;
