pub mod cell;
pub mod error;
pub mod h3;
pub mod indexer;

pub use cell::*;
pub use error::*;
pub use h3::*;
pub use indexer::*;
