use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CellError {
    #[error("invalid cell id {0:x}")]
    InvalidCell(u64),
    #[error("not a hex cell id: {0:?}")]
    MalformedCellId(String),
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(String),
    #[error("index rejected geometry: {0}")]
    InvalidGeometry(String),
    #[error("resolution {0} outside [0, 15]")]
    InvalidResolution(u8),
}
