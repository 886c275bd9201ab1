use cells::CellError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayerError {
    /// The camera is looking off the globe or the canvas is not ready.
    #[error("viewport unavailable: screen point ({x}, {y}) does not unproject")]
    ViewportUnavailable { x: f64, y: f64 },
    #[error(transparent)]
    Cell(#[from] CellError),
    #[error("invalid engine config: {0}")]
    Config(String),
}
