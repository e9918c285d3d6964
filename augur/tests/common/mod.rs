#![allow(dead_code)]

use augur::{DateRange, ForecasterConfig, InstrumentId, Observation, Series};
use chrono::{Days, NaiveDate};

pub fn id(s: &str) -> InstrumentId {
    InstrumentId::new(s).expect("valid id")
}

pub fn d(m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, m, day).unwrap()
}

/// Range covering the 100-day `LINEAR` fixture (2024-01-01 ..= 2024-04-09).
pub fn linear_range() -> DateRange {
    DateRange::new(d(1, 1), d(4, 10)).unwrap()
}

/// `n` consecutive days from 2024-01-01 with value `10 + slope·i`.
pub fn linear_series(n: u64, slope: f64) -> Series {
    let obs = (0..n)
        .map(|i| Observation::new(d(1, 1) + Days::new(i), slope.mul_add(i as f64, 10.0)))
        .collect();
    Series::new(id("LIN"), obs).unwrap()
}

/// Plain line: no changepoints, no seasonality.
pub fn linear_config() -> ForecasterConfig {
    ForecasterConfig::default()
        .with_changepoint_count(0)
        .with_seasonalities(vec![])
}
