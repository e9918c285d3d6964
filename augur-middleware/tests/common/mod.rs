#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use augur_core::{DateRange, InstrumentId, RawRow, RawSeries};
use augur_middleware::SeriesCache;
use augur_mock::{DynamicMockController, DynamicMockProvider, ManualClock};
use augur_types::CacheConfig;
use chrono::NaiveDate;

pub fn id(s: &str) -> InstrumentId {
    InstrumentId::new(s).expect("valid id")
}

pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
}

pub fn range(a: u32, b: u32) -> DateRange {
    DateRange::new(day(a), day(b)).unwrap()
}

pub fn series(sym: &str) -> RawSeries {
    RawSeries {
        instrument: id(sym),
        rows: (1..=5)
            .map(|d| RawRow::close_only(day(d), f64::from(d)))
            .collect(),
    }
}

pub fn config(ttl_secs: u64) -> CacheConfig {
    CacheConfig {
        ttl: Duration::from_secs(ttl_secs),
        ..CacheConfig::default()
    }
}

pub fn cache_with(
    config: CacheConfig,
) -> (SeriesCache, DynamicMockController, Arc<ManualClock>) {
    let (provider, controller) = DynamicMockProvider::new_with_controller("P0");
    let clock = Arc::new(ManualClock::default());
    let cache = SeriesCache::with_clock(provider, config, clock.clone());
    (cache, controller, clock)
}
