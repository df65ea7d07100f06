//! Error types shared by the network, trainer and parameter loading.

use thiserror::Error;

/// Errors raised when a component is built or driven with malformed configuration.
///
/// Broken tree or trainer assembly (cursor out of range, population drift)
/// is not represented here: those are defects and abort via `panic!`.
#[derive(Debug, Error)]
pub enum SteerError {
    /// A parameter is outside of its allowed range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// An input vector does not match the network's input layer.
    #[error("input vector has {actual} elements, network expects {expected}")]
    InputLength {
        /// Input count the network was built with.
        expected: usize,
        /// Length of the vector that was supplied.
        actual: usize,
    },
    /// A parameter file could not be read.
    #[error("failed to read parameter file: {0}")]
    Io(#[from] std::io::Error),
    /// A parameter file could not be parsed.
    #[error("failed to parse parameter file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SteerError>;
