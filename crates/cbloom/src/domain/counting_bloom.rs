//! # Counting Bloom Filter
//!
//! Partitioned counting Bloom filter sized from a capacity and a target
//! error rate.
//!
//! ## Layout
//!
//! `num_slices` slices of `counters_per_slice` counters, stored flat. Slice
//! `s` owns `[s * counters_per_slice, (s + 1) * counters_per_slice)` and each
//! key touches exactly one counter per slice.
//!
//! ## Operations
//!
//! - Add: increment the key's counters; a key is new unless every one of
//!   them was already non-zero
//! - Remove: decrement the key's counters, only if every one is non-zero
//! - Count: minimum counter across the key's slots
//!
//! ## Capacity
//!
//! The distinct-key estimate is checked before each add. The add that pushes
//! it past capacity succeeds; every add after that fails with
//! [`FilterError::CapacityExceeded`].

use serde::{Deserialize, Serialize, Serializer};
use tracing::{debug, trace, warn};

use super::config::CountingBloomConfig;
use super::hash_functions::HashSequenceGenerator;
use super::key::BloomKey;
use super::parameters::{estimate_fpr, solve, SliceParams, MAX_COUNTERS};
use crate::error::FilterError;

/// Counting Bloom filter with `u32` counters.
///
/// Not internally synchronized: share it behind a lock if several threads
/// need it.
#[derive(Clone, Debug, Deserialize)]
#[serde(try_from = "FilterSnapshot")]
pub struct CountingBloomFilter {
    /// Target false positive rate
    error_rate: f64,
    /// Intended maximum number of distinct keys
    capacity: u64,
    /// Slice layout solved from capacity and error rate
    params: SliceParams,
    /// Flat counter array, slice-major
    counters: Vec<u32>,
    /// Running estimate of distinct keys stored
    inserted: u64,
    /// Key → per-slice index mapping
    hasher: HashSequenceGenerator,
}

/// Serialized form; the hash generator is rebuilt on load.
#[derive(Serialize, Deserialize)]
struct FilterSnapshot {
    error_rate: f64,
    capacity: u64,
    num_slices: u64,
    counters_per_slice: u64,
    inserted: u64,
    counters: Vec<u32>,
}

/// Borrowed mirror of [`FilterSnapshot`]; field order must match.
#[derive(Serialize)]
struct FilterSnapshotRef<'a> {
    error_rate: f64,
    capacity: u64,
    num_slices: u64,
    counters_per_slice: u64,
    inserted: u64,
    counters: &'a [u32],
}

impl Serialize for CountingBloomFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        FilterSnapshotRef {
            error_rate: self.error_rate,
            capacity: self.capacity,
            num_slices: self.params.num_slices as u64,
            counters_per_slice: self.params.counters_per_slice as u64,
            inserted: self.inserted,
            counters: &self.counters,
        }
        .serialize(serializer)
    }
}

impl TryFrom<FilterSnapshot> for CountingBloomFilter {
    type Error = FilterError;

    fn try_from(snapshot: FilterSnapshot) -> Result<Self, Self::Error> {
        let params = solve(snapshot.capacity, snapshot.error_rate)?;

        if params.num_slices as u64 != snapshot.num_slices
            || params.counters_per_slice as u64 != snapshot.counters_per_slice
        {
            return Err(FilterError::InconsistentState(format!(
                "stored layout {}x{} does not match solved layout {}x{}",
                snapshot.num_slices,
                snapshot.counters_per_slice,
                params.num_slices,
                params.counters_per_slice
            )));
        }

        let expected = params.num_counters()?;
        if snapshot.counters.len() != expected {
            return Err(FilterError::InconsistentState(format!(
                "expected {} counters, found {}",
                expected,
                snapshot.counters.len()
            )));
        }

        Ok(Self::assemble(
            snapshot.capacity,
            snapshot.error_rate,
            params,
            snapshot.counters,
            snapshot.inserted,
        ))
    }
}

/// Absolute counter positions for `key`, one per slice.
fn slots<'a>(
    hasher: &'a HashSequenceGenerator,
    key: &'a [u8],
) -> impl Iterator<Item = usize> + 'a {
    let counters_per_slice = hasher.counters_per_slice();
    hasher
        .indices(key)
        .enumerate()
        .map(move |(slice, index)| slice * counters_per_slice + index)
}

impl CountingBloomFilter {
    /// Create an empty filter able to hold `capacity` distinct keys at
    /// `error_rate` false positives.
    ///
    /// # Errors
    /// `InvalidErrorRate` unless `0 < error_rate < 1`, `InvalidCapacity` if
    /// `capacity == 0`, `FilterTooLarge` if the counter array cannot be
    /// allocated.
    pub fn new(capacity: u64, error_rate: f64) -> Result<Self, FilterError> {
        let params = solve(capacity, error_rate)?;
        let num_counters = params.num_counters()?;

        let mut counters = Vec::new();
        counters
            .try_reserve_exact(num_counters)
            .map_err(|_| FilterError::FilterTooLarge {
                size: num_counters as f64,
                max: MAX_COUNTERS,
            })?;
        counters.resize(num_counters, 0u32);
        Ok(Self::assemble(capacity, error_rate, params, counters, 0))
    }

    /// Create an empty filter from a configuration
    pub fn from_config(config: &CountingBloomConfig) -> Result<Self, FilterError> {
        Self::new(config.capacity, config.error_rate)
    }

    fn assemble(
        capacity: u64,
        error_rate: f64,
        params: SliceParams,
        counters: Vec<u32>,
        inserted: u64,
    ) -> Self {
        let hasher = HashSequenceGenerator::new(params.num_slices, params.counters_per_slice);

        debug!(
            capacity,
            error_rate,
            num_slices = params.num_slices,
            counters_per_slice = params.counters_per_slice,
            digest = hasher.digest_kind().name(),
            salts = hasher.num_salts(),
            "Counting Bloom filter ready"
        );

        Self {
            error_rate,
            capacity,
            params,
            counters,
            inserted,
            hasher,
        }
    }

    /// Add a key, returning whether it was already present.
    ///
    /// "Present" means every one of the key's counters was non-zero before
    /// this call. Otherwise the key counts as new and the distinct-key
    /// estimate grows by one.
    ///
    /// # Errors
    /// `CapacityExceeded` if the distinct-key estimate is already above
    /// capacity. Nothing is mutated in that case.
    pub fn add<K: BloomKey + ?Sized>(&mut self, key: &K) -> Result<bool, FilterError> {
        if self.inserted > self.capacity {
            warn!(
                capacity = self.capacity,
                inserted = self.inserted,
                "Rejecting add: filter is over capacity"
            );
            return Err(FilterError::CapacityExceeded {
                capacity: self.capacity,
                inserted: self.inserted,
            });
        }

        let key = key.key_bytes();
        let mut hits = 0;
        for slot in slots(&self.hasher, &key) {
            let counter = &mut self.counters[slot];
            if *counter > 0 {
                hits += 1;
            }
            *counter = counter.saturating_add(1);
        }

        let already_present = hits == self.params.num_slices;
        if !already_present {
            self.inserted += 1;
        }
        Ok(already_present)
    }

    /// Remove a key if the filter believes it is present.
    ///
    /// Counters are only decremented when every one of the key's counters is
    /// non-zero, so removal never drives a counter below zero. Returns
    /// whether anything was removed.
    ///
    /// Removing a key that was never added but collides on every slot
    /// (a false positive) will corrupt the counts of the keys it collides with.
    pub fn remove<K: BloomKey + ?Sized>(&mut self, key: &K) -> bool {
        let key = key.key_bytes();

        let hits = slots(&self.hasher, &key)
            .filter(|&slot| self.counters[slot] > 0)
            .count();
        if hits < self.params.num_slices {
            trace!(
                hits,
                num_slices = self.params.num_slices,
                "Key not present, skipping remove"
            );
            return false;
        }

        for slot in slots(&self.hasher, &key) {
            self.counters[slot] -= 1;
        }
        self.inserted = self.inserted.saturating_sub(1);
        true
    }

    /// Estimated number of times `key` was added (minimum across its slots).
    ///
    /// Never under-reports a key that was added and not removed; may
    /// over-report through collisions. Returns 0 for keys never added,
    /// barring false positives.
    pub fn count<K: BloomKey + ?Sized>(&self, key: &K) -> u32 {
        let key = key.key_bytes();
        let min = slots(&self.hasher, &key)
            .map(|slot| self.counters[slot])
            .min()
            .unwrap_or(0);
        min
    }

    /// Test if a key might be in the filter
    pub fn contains<K: BloomKey + ?Sized>(&self, key: &K) -> bool {
        let key = key.key_bytes();
        let present = slots(&self.hasher, &key).all(|slot| self.counters[slot] > 0);
        present
    }

    /// Per-slice indices (each in `[0, counters_per_slice)`) for `key`
    pub fn hash_indices<K: BloomKey + ?Sized>(&self, key: &K) -> Vec<usize> {
        let key = key.key_bytes();
        self.hasher.indices(&key).collect()
    }

    /// Estimated false positive rate at the current fill
    pub fn estimated_false_positive_rate(&self) -> f64 {
        estimate_fpr(&self.params, self.inserted)
    }

    /// Reset all counters and the distinct-key estimate
    pub fn clear(&mut self) {
        self.counters.fill(0);
        self.inserted = 0;
    }

    /// Running estimate of distinct keys stored
    pub fn inserted_count(&self) -> u64 {
        self.inserted
    }

    pub fn len(&self) -> usize {
        self.inserted as usize
    }

    pub fn is_empty(&self) -> bool {
        self.inserted == 0
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    pub fn error_rate(&self) -> f64 {
        self.error_rate
    }

    pub fn num_slices(&self) -> usize {
        self.params.num_slices
    }

    pub fn counters_per_slice(&self) -> usize {
        self.params.counters_per_slice
    }

    pub fn num_counters(&self) -> usize {
        self.counters.len()
    }

    /// Raw counter array, slice-major
    pub fn counters(&self) -> &[u32] {
        &self.counters
    }

    pub fn slice_params(&self) -> SliceParams {
        self.params
    }

    pub fn hash_generator(&self) -> &HashSequenceGenerator {
        &self.hasher
    }

    /// Serialize the filter to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, FilterError> {
        Ok(bincode::serialize(self)?)
    }

    /// Deserialize a filter from bytes, validating its layout
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FilterError> {
        let snapshot: FilterSnapshot = bincode::deserialize(bytes)?;
        Self::try_from(snapshot)
    }
}
