//! Key normalization at the filter boundary
//!
//! The filter hashes canonical byte sequences. Text is hashed as its UTF-8
//! encoding, raw bytes as-is, and other printable values as the UTF-8 of
//! their `Display` form (so `42u32` and `"42"` land on the same counters).

use std::borrow::Cow;
use std::fmt;

/// A value the filter can hash.
pub trait BloomKey {
    /// Canonical bytes for this key
    fn key_bytes(&self) -> Cow<'_, [u8]>;
}

impl BloomKey for str {
    fn key_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.as_bytes())
    }
}

impl BloomKey for String {
    fn key_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.as_bytes())
    }
}

impl BloomKey for [u8] {
    fn key_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self)
    }
}

impl<const N: usize> BloomKey for [u8; N] {
    fn key_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.as_slice())
    }
}

impl BloomKey for Vec<u8> {
    fn key_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.as_slice())
    }
}

impl<T: BloomKey + ?Sized> BloomKey for &T {
    fn key_bytes(&self) -> Cow<'_, [u8]> {
        (**self).key_bytes()
    }
}

/// Hash any `Display` value through its textual form.
///
/// ```ignore
/// filter.add(&Printable(std::net::Ipv4Addr::LOCALHOST))?;
/// assert!(filter.contains("127.0.0.1"));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Printable<T>(pub T);

impl<T: fmt::Display> BloomKey for Printable<T> {
    fn key_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Owned(self.0.to_string().into_bytes())
    }
}

macro_rules! impl_display_key {
    ($($ty:ty),* $(,)?) => {
        $(
            impl BloomKey for $ty {
                fn key_bytes(&self) -> Cow<'_, [u8]> {
                    Cow::Owned(self.to_string().into_bytes())
                }
            }
        )*
    };
}

impl_display_key!(
    u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, char, bool,
);
