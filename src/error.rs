//! Error types for the clustering engine.

use crate::device::AcceleratorError;
use thiserror::Error;

/// Errors returned by [`KMeans`](crate::KMeans) and its collaborators.
///
/// Everything except [`KMeansError::Accelerator`] is a recoverable
/// configuration error: the caller can fix its input and try again.
#[derive(Debug, Error)]
pub enum KMeansError {
    #[error("dataset contains no points")]
    EmptyDataset,

    #[error("points must have at least one feature")]
    ZeroDimension,

    #[error("number of clusters must be at least 1")]
    InvalidClusterCount,

    #[error("cannot form {k} clusters from {n} points")]
    TooFewPoints { k: usize, n: usize },

    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("engine has not been fitted")]
    NotFitted,

    #[error("label index {index} out of range for {len} training points")]
    LabelOutOfRange { index: usize, len: usize },

    #[error("output buffer holds {actual} labels, expected {expected}")]
    OutputLength { expected: usize, actual: usize },

    #[error("initial centers have shape {actual:?}, expected {expected:?}")]
    CenterShape {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("got {actual} training labels for {expected} points")]
    LabelCount { expected: usize, actual: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to load configuration: {0}")]
    Config(String),

    /// The accelerator failed mid-fit. No result was committed.
    #[error("accelerator failure: {0}")]
    Accelerator(#[from] AcceleratorError),
}

impl KMeansError {
    /// Accelerator failures abort the whole fit; everything else is a caller error.
    pub fn is_fatal(&self) -> bool {
        matches!(self, KMeansError::Accelerator(_))
    }
}

pub type Result<T> = std::result::Result<T, KMeansError>;
