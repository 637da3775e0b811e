use thiserror::Error;

use crate::model::ModelError;
use crate::store::StoreError;

/// Errors raised by detector operations.
#[derive(Debug, Error)]
pub enum DetectorError {
    /// The document store failed or was unreachable.
    #[error("Store unavailable: {0}")]
    Store(#[from] StoreError),

    /// Too few training rows to fit a model. The detector stays untrained.
    #[error("Insufficient training data: {rows} rows available, {required} required")]
    InsufficientData { rows: usize, required: usize },

    /// A scan was requested before any model was fitted.
    #[error("No fitted model: train before scanning")]
    UnfittedModel,

    /// Model construction failed.
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// A report could not be encoded.
    #[error("Failed to encode report: {0}")]
    Encode(#[from] serde_json::Error),
}

impl DetectorError {
    /// True for the designed not-enough-data early exit, the one condition
    /// an entry point absorbs instead of propagating.
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, DetectorError::InsufficientData { .. })
    }
}

/// Result type for detector operations.
pub type DetectorResult<T> = std::result::Result<T, DetectorError>;
