//! # cbloom
//!
//! Counting Bloom filter: approximate set membership with removal and
//! multiplicity estimates, sized for a capacity and a target false positive
//! rate.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): Pure filter logic, no I/O
//!   - `solve`: capacity + error rate → slice count and counters per slice
//!   - `HashSequenceGenerator`: key → one index per slice, from salted
//!     MD5/SHA digests
//!   - `CountingBloomFilter`: flat counter array with add / remove / count
//!   - `CountingBloomConfig`: configuration with validation
//!   - `BloomKey`: text, bytes and printable values as canonical bytes
//!
//! - **Errors** (`error`): `FilterError`
//!
//! ## Invariants
//!
//! - **No false negatives**: a key added and not removed has `count >= 1`
//! - **Determinism**: a filter maps a key to the same indices every time,
//!   so remove always undoes the matching add
//! - Counters never go below zero; remove only acts on keys whose every
//!   counter is non-zero
//!
//! ## Usage Example
//!
//! ```ignore
//! use cbloom::{CountingBloomFilter, FilterError};
//!
//! let mut filter = CountingBloomFilter::new(100_000, 0.001)?;
//!
//! assert!(!filter.add("test")?);
//! assert!(filter.contains("test"));
//! assert_eq!(filter.count("test"), 1);
//!
//! filter.remove("test");
//! assert_eq!(filter.count("test"), 0);
//!
//! match filter.add("next") {
//!     Err(FilterError::CapacityExceeded { .. }) => { /* filter full, rebuild larger */ }
//!     other => { other?; }
//! }
//! ```
//!
//! The filter is not synchronized. Wrap it in a `Mutex` to share it.

pub mod domain;
pub mod error;

// Re-exports for convenience
pub use domain::{
    BloomKey, CountingBloomConfig, CountingBloomConfigBuilder, CountingBloomFilter,
    HashSequenceGenerator, Printable, SliceParams,
};
pub use error::FilterError;
