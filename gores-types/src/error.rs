//! Error type used by the crate.

use thiserror::Error;

/// Error enum.
#[derive(Debug, Error)]
pub enum GoresTypesError {
    /// Projection parameters that cannot describe a valid projection.
    #[error("invalid projection parameters: {0}")]
    InvalidProjection(String),
}
