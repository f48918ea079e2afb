//! Slice sizing for a partitioned counting Bloom filter
//!
//! Given capacity n and target error rate P, with k slices of m counters each:
//!
//! - k = ceil(log2(1/P))
//! - n ~= (k * m) * (ln(2)^2 / |ln(P)|), so
//! - m = ceil(n * |ln(P)| / (k * ln(2)^2))

use std::f64::consts::LN_2;
use std::mem::size_of;

use crate::error::FilterError;

/// Slice layout derived from capacity and error rate
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SliceParams {
    /// Number of slices (one hash-derived index per slice)
    pub num_slices: usize,
    /// Counters in each slice
    pub counters_per_slice: usize,
}

/// Largest counter array a single allocation can address
pub const MAX_COUNTERS: usize = isize::MAX as usize / size_of::<u32>();

impl SliceParams {
    /// Total counters across all slices
    ///
    /// # Errors
    /// `FilterTooLarge` if the product overflows or exceeds [`MAX_COUNTERS`].
    pub fn num_counters(&self) -> Result<usize, FilterError> {
        match self.num_slices.checked_mul(self.counters_per_slice) {
            Some(total) if total <= MAX_COUNTERS => Ok(total),
            _ => Err(FilterError::FilterTooLarge {
                size: self.num_slices as f64 * self.counters_per_slice as f64,
                max: MAX_COUNTERS,
            }),
        }
    }
}

/// Check that an error rate lies strictly inside (0, 1).
///
/// NaN is rejected as well.
pub fn validate_error_rate(error_rate: f64) -> Result<(), FilterError> {
    if error_rate > 0.0 && error_rate < 1.0 {
        Ok(())
    } else {
        Err(FilterError::InvalidErrorRate { error_rate })
    }
}

/// Check that a capacity is positive.
pub fn validate_capacity(capacity: u64) -> Result<(), FilterError> {
    if capacity == 0 {
        return Err(FilterError::InvalidCapacity { capacity });
    }
    Ok(())
}

/// Solve for the slice count and counters-per-slice that meet `error_rate`
/// for `capacity` distinct keys.
///
/// # Errors
/// `InvalidErrorRate` unless `0 < error_rate < 1`, `InvalidCapacity` if
/// `capacity == 0`, `FilterTooLarge` if the counter array cannot be addressed.
pub fn solve(capacity: u64, error_rate: f64) -> Result<SliceParams, FilterError> {
    validate_error_rate(error_rate)?;
    validate_capacity(capacity)?;

    let abs_ln_p = error_rate.ln().abs();

    // log2(1/P) == |ln(P)| / ln(2)
    let num_slices = ((abs_ln_p / LN_2).ceil() as usize).max(1);

    let counters_per_slice =
        ((capacity as f64 * abs_ln_p) / (num_slices as f64 * LN_2 * LN_2)).ceil();

    // `as usize` saturates, so oversized layouts must be caught before the cast.
    if counters_per_slice >= usize::MAX as f64 {
        return Err(FilterError::FilterTooLarge {
            size: num_slices as f64 * counters_per_slice,
            max: MAX_COUNTERS,
        });
    }

    let params = SliceParams {
        num_slices,
        counters_per_slice: (counters_per_slice as usize).max(1),
    };
    params.num_counters()?;
    Ok(params)
}

/// Estimated false positive rate of a partitioned filter holding `n` keys.
///
/// Formula: FPR = (1 - e^(-n/m))^k, with m counters per slice.
pub fn estimate_fpr(params: &SliceParams, n: u64) -> f64 {
    let exponent = -(n as f64) / params.counters_per_slice as f64;
    (1.0 - exponent.exp()).powi(params.num_slices as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solve_capacity_10000_error_0001() {
        let params = solve(10_000, 0.001).unwrap();
        assert_eq!(params.num_slices, 10);
        assert_eq!(params.counters_per_slice, 14_378);
        assert_eq!(params.num_counters().unwrap(), 143_780);
    }

    #[test]
    fn test_solve_capacity_100_error_001() {
        let params = solve(100, 0.01).unwrap();
        assert_eq!(params.num_slices, 7);
        assert_eq!(params.counters_per_slice, 137);
    }

    #[test]
    fn test_solve_small_and_coarse() {
        assert_eq!(
            solve(10, 0.001).unwrap(),
            SliceParams {
                num_slices: 10,
                counters_per_slice: 15
            }
        );
        assert_eq!(
            solve(1000, 0.05).unwrap(),
            SliceParams {
                num_slices: 5,
                counters_per_slice: 1248
            }
        );
    }

    #[test]
    fn test_solve_rejects_bad_error_rate() {
        for error_rate in [0.0, 1.0, -0.5, 1.5, f64::NAN, f64::INFINITY] {
            let result = solve(100, error_rate);
            assert!(
                matches!(result, Err(FilterError::InvalidErrorRate { .. })),
                "error_rate {} should be rejected",
                error_rate
            );
        }
    }

    #[test]
    fn test_solve_rejects_zero_capacity() {
        assert!(matches!(
            solve(0, 0.01),
            Err(FilterError::InvalidCapacity { capacity: 0 })
        ));
    }

    #[test]
    fn test_solve_rejects_unaddressable_layout() {
        for error_rate in [0.001, 0.25] {
            let result = solve(u64::MAX, error_rate);
            assert!(
                matches!(result, Err(FilterError::FilterTooLarge { .. })),
                "capacity u64::MAX at {} should be too large, got {:?}",
                error_rate,
                result
            );
        }
    }

    #[test]
    fn test_num_counters_overflow_is_an_error() {
        let params = SliceParams {
            num_slices: 2,
            counters_per_slice: usize::MAX,
        };
        assert!(matches!(
            params.num_counters(),
            Err(FilterError::FilterTooLarge { max: MAX_COUNTERS, .. })
        ));

        let params = SliceParams {
            num_slices: 1,
            counters_per_slice: MAX_COUNTERS + 1,
        };
        assert!(params.num_counters().is_err());
    }

    #[test]
    fn test_error_rate_near_one_still_has_a_slice() {
        let params = solve(1, 0.999_999_999).unwrap();
        assert_eq!(params.num_slices, 1);
        assert!(params.counters_per_slice >= 1);
    }

    #[test]
    fn test_lower_error_rate_needs_more_slices() {
        let coarse = solve(1000, 0.1).unwrap();
        let fine = solve(1000, 0.0001).unwrap();
        assert!(fine.num_slices > coarse.num_slices);
        assert!(fine.num_counters().unwrap() > coarse.num_counters().unwrap());
    }

    #[test]
    fn test_estimate_fpr_at_capacity_meets_target() {
        let params = solve(1000, 0.01).unwrap();
        let fpr = estimate_fpr(&params, 1000);
        assert!(fpr <= 0.01 * 1.1, "FPR at capacity {} exceeds target", fpr);
        assert_eq!(estimate_fpr(&params, 0), 0.0);
    }
}
