//! Middleware for augur series providers.
//!
//! [`SeriesCache`] memoizes raw provider results per `(instrument, range)` with a
//! TTL measured against an injectable [`augur_core::Clock`], and coalesces
//! concurrent requests for the same key into a single upstream fetch.
#![warn(missing_docs)]

mod cache;

pub use cache::{CacheEntry, SeriesCache, SeriesKey};
