//! Counting Bloom filter configuration and validation
//!
//! # Example
//!
//! ```ignore
//! use cbloom::domain::CountingBloomConfigBuilder;
//!
//! let config = CountingBloomConfigBuilder::new()
//!     .capacity(100_000)
//!     .error_rate(0.001)
//!     .build()
//!     .expect("Valid config");
//! ```

use serde::{Deserialize, Serialize};

use super::parameters::{solve, validate_capacity, validate_error_rate, SliceParams};
use crate::error::FilterError;

/// Filter sizing configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CountingBloomConfig {
    /// Intended maximum number of distinct keys
    pub capacity: u64,
    /// Target false positive rate, strictly between 0 and 1
    pub error_rate: f64,
}

impl Default for CountingBloomConfig {
    fn default() -> Self {
        Self {
            capacity: 10_000,
            error_rate: 0.001, // 0.1% false positive rate
        }
    }
}

impl CountingBloomConfig {
    /// Create a new configuration with validation
    pub fn new(capacity: u64, error_rate: f64) -> Result<Self, FilterError> {
        let config = Self {
            capacity,
            error_rate,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the error rate first, then the capacity
    pub fn validate(&self) -> Result<(), FilterError> {
        validate_error_rate(self.error_rate)?;
        validate_capacity(self.capacity)
    }

    /// Slice layout this configuration produces
    pub fn slice_params(&self) -> Result<SliceParams, FilterError> {
        solve(self.capacity, self.error_rate)
    }

    /// Builder-style method to set capacity
    pub fn with_capacity(mut self, capacity: u64) -> Self {
        self.capacity = capacity;
        self
    }

    /// Builder-style method to set the error rate
    pub fn with_error_rate(mut self, error_rate: f64) -> Self {
        self.error_rate = error_rate;
        self
    }
}

/// Builder for [`CountingBloomConfig`]
///
/// Unset fields fall back to [`CountingBloomConfig::default`].
#[derive(Default)]
pub struct CountingBloomConfigBuilder {
    capacity: Option<u64>,
    error_rate: Option<f64>,
}

impl CountingBloomConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the intended maximum number of distinct keys
    pub fn capacity(mut self, capacity: u64) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Set the target false positive rate
    pub fn error_rate(mut self, error_rate: f64) -> Self {
        self.error_rate = Some(error_rate);
        self
    }

    /// Build the config, validating all parameters
    pub fn build(self) -> Result<CountingBloomConfig, FilterError> {
        let config = self.build_unchecked();
        config.validate()?;
        Ok(config)
    }

    /// Build without validation
    pub fn build_unchecked(self) -> CountingBloomConfig {
        let defaults = CountingBloomConfig::default();

        CountingBloomConfig {
            capacity: self.capacity.unwrap_or(defaults.capacity),
            error_rate: self.error_rate.unwrap_or(defaults.error_rate),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = CountingBloomConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.error_rate, 0.001);
    }

    #[test]
    fn test_new_rejects_invalid_values() {
        assert!(matches!(
            CountingBloomConfig::new(100, 0.0),
            Err(FilterError::InvalidErrorRate { .. })
        ));
        assert!(matches!(
            CountingBloomConfig::new(100, 1.0),
            Err(FilterError::InvalidErrorRate { .. })
        ));
        assert!(matches!(
            CountingBloomConfig::new(0, 0.01),
            Err(FilterError::InvalidCapacity { .. })
        ));
    }

    #[test]
    fn test_builder_creates_valid_config() {
        let config = CountingBloomConfigBuilder::new()
            .capacity(500)
            .error_rate(0.05)
            .build()
            .expect("Should create valid config");

        assert_eq!(config.capacity, 500);
        assert_eq!(config.error_rate, 0.05);
    }

    #[test]
    fn test_builder_uses_defaults() {
        let config = CountingBloomConfigBuilder::new()
            .capacity(42)
            .build()
            .expect("Should use default error rate");

        assert_eq!(config.error_rate, CountingBloomConfig::default().error_rate);
    }

    #[test]
    fn test_build_unchecked_skips_validation() {
        let config = CountingBloomConfigBuilder::new().capacity(0).build_unchecked();
        assert_eq!(config.capacity, 0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_with_methods_chain() {
        let config = CountingBloomConfig::default()
            .with_capacity(10_000)
            .with_error_rate(0.001);
        let params = config.slice_params().unwrap();
        assert_eq!(params.num_slices, 10);
        assert_eq!(params.counters_per_slice, 14_378);
    }
}
