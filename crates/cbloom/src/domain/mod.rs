//! Domain Layer - Pure filter logic
//!
//! This layer contains:
//! - Slice sizing (parameter solver)
//! - Salted index derivation (hash sequence generator)
//! - Key normalization
//! - Counting Bloom filter
//! - Configuration
//!
//! RULES:
//! - No I/O operations
//! - No async code
//! - Pure functions where possible

pub mod config;
pub mod counting_bloom;
pub mod hash_functions;
pub mod key;
pub mod parameters;

pub use config::{CountingBloomConfig, CountingBloomConfigBuilder};
pub use counting_bloom::CountingBloomFilter;
pub use hash_functions::{DigestKind, HashIndices, HashSequenceGenerator, IndexWidth};
pub use key::{BloomKey, Printable};
pub use parameters::{estimate_fpr, solve, SliceParams, MAX_COUNTERS};
