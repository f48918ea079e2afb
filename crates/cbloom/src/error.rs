//! Error types for the counting Bloom filter

use thiserror::Error;

/// Errors that can occur when building or mutating a counting Bloom filter
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("Invalid error rate: {error_rate} (must be strictly between 0 and 1)")]
    InvalidErrorRate { error_rate: f64 },

    #[error("Invalid capacity: {capacity} (must be > 0)")]
    InvalidCapacity { capacity: u64 },

    #[error("Filter size exceeds maximum: {size} counters > {max}")]
    FilterTooLarge { size: f64, max: usize },

    #[error("Filter is at capacity: {inserted} > {capacity}")]
    CapacityExceeded { capacity: u64, inserted: u64 },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Inconsistent filter state: {0}")]
    InconsistentState(String),
}

impl FilterError {
    /// True for the variants raised by parameter validation.
    pub fn is_invalid_parameter(&self) -> bool {
        matches!(
            self,
            FilterError::InvalidErrorRate { .. } | FilterError::InvalidCapacity { .. }
        )
    }
}

impl From<bincode::Error> for FilterError {
    fn from(err: bincode::Error) -> Self {
        FilterError::Serialization(err.to_string())
    }
}
