use std::f64::consts::TAU;
use std::time::Duration;

use augur_core::RawRow;
use chrono::{Datelike, Days, NaiveDate, Weekday};

/// Latency of the `SLOW` fixture.
pub const SLOW_DELAY: Duration = Duration::from_millis(200);

/// Raw rows for a fixture instrument, in provider order.
///
/// - `AAPL`: weekday sessions 2019-01-02 .. 2022-12-30 with trend, weekly and yearly
///   cycles, full OHLC and adjusted close.
/// - `LINEAR`: 100 consecutive days from 2024-01-01, close `10 + 0.5·i`.
/// - `DUPS`: out-of-order rows with a duplicated date and a halted (null) session.
/// - `SPARSE`: a single usable row.
/// - `SLOW`: same as `LINEAR`.
/// - `EMPTY`: no rows.
#[must_use]
pub fn fixture_rows(symbol: &str) -> Option<Vec<RawRow>> {
    match symbol {
        "AAPL" => Some(aapl()),
        "LINEAR" | "SLOW" => Some(linear()),
        "DUPS" => Some(dups()),
        "SPARSE" => Some(vec![RawRow::close_only(date(2024, 3, 1), 42.0)]),
        "EMPTY" => Some(Vec::new()),
        _ => None,
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn linear() -> Vec<RawRow> {
    let start = date(2024, 1, 1);
    (0..100u64)
        .map(|i| RawRow::close_only(start + Days::new(i), 0.5f64.mul_add(i as f64, 10.0)))
        .collect()
}

fn aapl() -> Vec<RawRow> {
    let start = date(2019, 1, 2);
    let end = date(2022, 12, 31);
    start
        .iter_days()
        .take_while(|d| *d < end)
        .enumerate()
        .filter(|(_, d)| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        .map(|(i, d)| {
            let x = i as f64;
            let yearly = 6.0 * (TAU * f64::from(d.ordinal()) / 365.25).sin();
            let weekly = 0.4 * (TAU * f64::from(d.weekday().num_days_from_monday()) / 7.0).cos();
            let noise = ((x * 12.9898).sin() * 43_758.545_3).fract() * 0.8;
            let close = 0.12f64.mul_add(x, 150.0) + yearly + weekly + noise;
            RawRow {
                date: d,
                open: Some(close - 0.3),
                high: Some(close + 1.1),
                low: Some(close - 1.2),
                close: Some(close),
                adj_close: Some(close * 0.98),
                volume: Some(80_000_000 + (i as u64 % 17) * 1_000_000),
            }
        })
        .collect()
}

fn dups() -> Vec<RawRow> {
    let mut halted = RawRow::close_only(date(2024, 1, 4), 0.0);
    halted.close = None;
    vec![
        RawRow::close_only(date(2024, 1, 3), 12.0),
        RawRow::close_only(date(2024, 1, 1), 10.0),
        halted,
        RawRow::close_only(date(2024, 1, 2), 11.0),
        RawRow::close_only(date(2024, 1, 3), 13.0),
        RawRow::close_only(date(2024, 1, 5), 14.0),
    ]
}
