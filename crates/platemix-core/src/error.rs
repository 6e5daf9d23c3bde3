//! Error types for PlateMix

use thiserror::Error;

/// Main error type for PlateMix domain operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatemixError {
    /// Invalid run parameters, detected before any transfer is issued
    #[error("Configuration error: {0}")]
    Config(String),

    /// The destination plate ran out of wells
    #[error("Destination plate exhausted: mixture {mixture_index} has no well (capacity {capacity})")]
    WellsExhausted {
        /// Index of the mixture that could not be placed.
        mixture_index: usize,
        /// Total number of wells on the plate.
        capacity: usize,
    },
}

/// Result type alias for PlateMix operations
pub type Result<T> = std::result::Result<T, PlatemixError>;
