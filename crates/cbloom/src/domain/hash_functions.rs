//! Salted index derivation for the counting Bloom filter
//!
//! Each key is mapped to exactly `num_slices` indices, one per slice, by
//! hashing `salt || key` with a cryptographic digest and cutting the output
//! into fixed-width little-endian integers.
//!
//! ## Sizing
//!
//! - Index width: 2 bytes below 2^15 counters per slice, 4 bytes below 2^31,
//!   8 bytes otherwise.
//! - Digest: the smallest of MD5 / SHA-1 / SHA-256 / SHA-384 / SHA-512 whose
//!   output covers `8 * num_slices * width` bits, falling back to SHA-512.
//! - Salts: `ceil(num_slices / indices_per_digest)` of them, salt `i` being
//!   `digest(le_u32(i))`.
//!
//! The mapping is a pure function of `(num_slices, counters_per_slice, key)`.
//! Removal depends on regenerating the exact sequence an earlier add used.

use std::fmt;
use std::iter::FusedIterator;

use digest::Digest;
use md5::Md5;
use sha1::Sha1;
use sha2::{Sha256, Sha384, Sha512};

/// Width of a single unpacked index
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexWidth {
    U16,
    U32,
    U64,
}

impl IndexWidth {
    /// Narrowest width able to address `counters_per_slice` slots.
    pub fn for_counters(counters_per_slice: usize) -> Self {
        let m = counters_per_slice as u64;
        if m >= 1 << 31 {
            IndexWidth::U64
        } else if m >= 1 << 15 {
            IndexWidth::U32
        } else {
            IndexWidth::U16
        }
    }

    /// Width in bytes
    pub fn bytes(self) -> usize {
        match self {
            IndexWidth::U16 => 2,
            IndexWidth::U32 => 4,
            IndexWidth::U64 => 8,
        }
    }

    /// Read one little-endian index from a chunk of exactly `bytes()` bytes.
    fn read(self, chunk: &[u8]) -> u64 {
        // Zero-extending a little-endian value keeps its magnitude.
        let mut buf = [0u8; 8];
        buf[..chunk.len()].copy_from_slice(chunk);
        u64::from_le_bytes(buf)
    }
}

/// Digest algorithm backing a generator
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DigestKind {
    Md5,
    Sha1,
    Sha256,
    Sha384,
    Sha512,
}

impl DigestKind {
    /// Smallest digest whose output covers `total_bits`.
    pub fn for_total_bits(total_bits: usize) -> Self {
        if total_bits > 384 {
            DigestKind::Sha512
        } else if total_bits > 256 {
            DigestKind::Sha384
        } else if total_bits > 160 {
            DigestKind::Sha256
        } else if total_bits > 128 {
            DigestKind::Sha1
        } else {
            DigestKind::Md5
        }
    }

    /// Output size in bytes
    pub fn output_size(self) -> usize {
        match self {
            DigestKind::Md5 => 16,
            DigestKind::Sha1 => 20,
            DigestKind::Sha256 => 32,
            DigestKind::Sha384 => 48,
            DigestKind::Sha512 => 64,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DigestKind::Md5 => "md5",
            DigestKind::Sha1 => "sha1",
            DigestKind::Sha256 => "sha256",
            DigestKind::Sha384 => "sha384",
            DigestKind::Sha512 => "sha512",
        }
    }

    /// Hash the concatenation of `parts`.
    pub fn hash(self, parts: &[&[u8]]) -> Vec<u8> {
        match self {
            DigestKind::Md5 => hash_parts::<Md5>(parts),
            DigestKind::Sha1 => hash_parts::<Sha1>(parts),
            DigestKind::Sha256 => hash_parts::<Sha256>(parts),
            DigestKind::Sha384 => hash_parts::<Sha384>(parts),
            DigestKind::Sha512 => hash_parts::<Sha512>(parts),
        }
    }
}

fn hash_parts<D: Digest>(parts: &[&[u8]]) -> Vec<u8> {
    let mut hasher = D::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().to_vec()
}

/// Deterministic key → index sequence mapping for one filter layout.
///
/// Built once per filter; [`indices`](Self::indices) returns a fresh lazy
/// sequence on every call.
#[derive(Clone)]
pub struct HashSequenceGenerator {
    num_slices: usize,
    counters_per_slice: u64,
    width: IndexWidth,
    digest: DigestKind,
    indices_per_digest: usize,
    salts: Vec<Vec<u8>>,
}

impl HashSequenceGenerator {
    /// Build the generator for `num_slices` slices of `counters_per_slice`
    /// counters. Both must be at least 1.
    pub fn new(num_slices: usize, counters_per_slice: usize) -> Self {
        let width = IndexWidth::for_counters(counters_per_slice);
        let digest = DigestKind::for_total_bits(8 * num_slices * width.bytes());
        let indices_per_digest = digest.output_size() / width.bytes();
        let num_salts = num_slices.div_ceil(indices_per_digest);

        let salts = (0..num_salts as u32)
            .map(|i| digest.hash(&[i.to_le_bytes().as_slice()]))
            .collect();

        Self {
            num_slices,
            counters_per_slice: counters_per_slice as u64,
            width,
            digest,
            indices_per_digest,
            salts,
        }
    }

    /// Lazily derive the `num_slices` indices for `key`.
    pub fn indices<'a>(&'a self, key: &'a [u8]) -> HashIndices<'a> {
        HashIndices {
            generator: self,
            key,
            block: Vec::new(),
            cursor: 0,
            next_salt: 0,
            emitted: 0,
        }
    }

    pub fn num_slices(&self) -> usize {
        self.num_slices
    }

    pub fn counters_per_slice(&self) -> usize {
        self.counters_per_slice as usize
    }

    pub fn index_width(&self) -> IndexWidth {
        self.width
    }

    pub fn digest_kind(&self) -> DigestKind {
        self.digest
    }

    pub fn indices_per_digest(&self) -> usize {
        self.indices_per_digest
    }

    pub fn num_salts(&self) -> usize {
        self.salts.len()
    }
}

impl fmt::Debug for HashSequenceGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashSequenceGenerator")
            .field("num_slices", &self.num_slices)
            .field("counters_per_slice", &self.counters_per_slice)
            .field("width", &self.width)
            .field("digest", &self.digest)
            .field(
                "salts",
                &self.salts.iter().map(hex::encode).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Index sequence for a single key
///
/// Yields exactly `num_slices` values in `[0, counters_per_slice)`, hashing
/// one salted block at a time and stopping mid-block once enough indices
/// have been produced.
pub struct HashIndices<'a> {
    generator: &'a HashSequenceGenerator,
    key: &'a [u8],
    block: Vec<u8>,
    cursor: usize,
    next_salt: usize,
    emitted: usize,
}

impl Iterator for HashIndices<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let generator = self.generator;
        if self.emitted >= generator.num_slices {
            return None;
        }

        let width = generator.width.bytes();
        if self.cursor + width > self.block.len() {
            let salt = generator.salts.get(self.next_salt)?;
            self.block = generator.digest.hash(&[salt.as_slice(), self.key]);
            self.next_salt += 1;
            self.cursor = 0;
        }

        let raw = generator
            .width
            .read(&self.block[self.cursor..self.cursor + width]);
        self.cursor += width;
        self.emitted += 1;

        Some((raw % generator.counters_per_slice) as usize)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.generator.num_slices - self.emitted;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for HashIndices<'_> {}

impl FusedIterator for HashIndices<'_> {}
