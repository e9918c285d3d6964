//! Wire format of the Yahoo chart endpoint and its conversion into raw rows.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Deserialize;

use augur_core::{AugurError, DateRange, InstrumentId, RawRow, RawSeries};

use crate::PROVIDER_NAME;

/// Top-level chart response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChartEnvelope {
    /// Payload wrapper.
    pub chart: Chart,
}

/// Either a result list or an error object.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Chart {
    /// Results; Yahoo returns at most one per symbol.
    #[serde(default)]
    pub result: Option<Vec<ChartResult>>,
    /// Upstream error, if any.
    #[serde(default)]
    pub error: Option<ChartError>,
}

/// Upstream error object.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChartError {
    /// Short code such as `"Not Found"`.
    #[serde(default)]
    pub code: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
}

/// One symbol's bars.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChartResult {
    /// Exchange metadata.
    #[serde(default)]
    pub meta: ChartMeta,
    /// Bar open times in epoch seconds; absent when the range holds no sessions.
    #[serde(default)]
    pub timestamp: Vec<i64>,
    /// Price columns.
    #[serde(default)]
    pub indicators: Indicators,
}

/// Exchange metadata used for date mapping.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartMeta {
    /// Symbol echoed by the endpoint.
    #[serde(default)]
    pub symbol: Option<String>,
    /// Quote currency.
    #[serde(default)]
    pub currency: Option<String>,
    /// IANA timezone of the listing exchange.
    #[serde(default)]
    pub exchange_timezone_name: Option<String>,
    /// UTC offset of the exchange in seconds.
    #[serde(default)]
    pub gmtoffset: Option<i32>,
}

/// Column groups.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Indicators {
    /// OHLCV columns.
    #[serde(default)]
    pub quote: Vec<QuoteColumns>,
    /// Adjusted close column.
    #[serde(default)]
    pub adjclose: Option<Vec<AdjCloseColumn>>,
}

/// OHLCV columns aligned with `timestamp`; nulls mark halted sessions.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuoteColumns {
    /// Opening prices.
    #[serde(default)]
    pub open: Vec<Option<f64>>,
    /// Session highs.
    #[serde(default)]
    pub high: Vec<Option<f64>>,
    /// Session lows.
    #[serde(default)]
    pub low: Vec<Option<f64>>,
    /// Closing prices.
    #[serde(default)]
    pub close: Vec<Option<f64>>,
    /// Traded volumes.
    #[serde(default)]
    pub volume: Vec<Option<u64>>,
}

/// Adjusted close aligned with `timestamp`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdjCloseColumn {
    /// Split- and dividend-adjusted closes.
    #[serde(default)]
    pub adjclose: Vec<Option<f64>>,
}

enum ExchangeZone {
    Named(Tz),
    Fixed(FixedOffset),
}

impl ExchangeZone {
    fn from_meta(meta: &ChartMeta) -> Self {
        if let Some(tz) = meta
            .exchange_timezone_name
            .as_deref()
            .and_then(|name| name.parse::<Tz>().ok())
        {
            return Self::Named(tz);
        }
        meta.gmtoffset
            .and_then(FixedOffset::east_opt)
            .map_or(Self::Named(Tz::UTC), Self::Fixed)
    }

    fn local_date(&self, utc: DateTime<Utc>) -> NaiveDate {
        match self {
            Self::Named(tz) => utc.with_timezone(tz).date_naive(),
            Self::Fixed(offset) => utc.with_timezone(offset).date_naive(),
        }
    }
}

/// Convert an upstream error object into the workspace taxonomy.
pub(crate) fn map_chart_error(err: &ChartError, symbol: &str) -> AugurError {
    if err.code.eq_ignore_ascii_case("Not Found") {
        AugurError::not_found(format!("series for {symbol}"))
    } else {
        AugurError::provider(
            PROVIDER_NAME,
            format!("{}: {}", err.code, err.description),
        )
    }
}

/// Turn a chart payload into raw rows for `instrument`, keeping only dates
/// inside `range` (the endpoint may include the current partial session).
///
/// Trading dates are taken in the exchange's own timezone.
///
/// # Errors
/// - `NotFound` when the payload carries a not-found error or no result.
/// - `Provider` for any other upstream error object.
/// - `Data` for timestamps outside the representable range.
pub fn into_raw_series(
    instrument: &InstrumentId,
    range: DateRange,
    envelope: ChartEnvelope,
) -> Result<RawSeries, AugurError> {
    if let Some(err) = &envelope.chart.error {
        return Err(map_chart_error(err, instrument.as_str()));
    }
    let result = envelope
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| AugurError::not_found(format!("series for {instrument}")))?;

    let zone = ExchangeZone::from_meta(&result.meta);
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let adjclose = result
        .indicators
        .adjclose
        .and_then(|cols| cols.into_iter().next())
        .map(|c| c.adjclose)
        .unwrap_or_default();
    let at = |col: &[Option<f64>], i: usize| col.get(i).copied().flatten();

    let mut rows = Vec::with_capacity(result.timestamp.len());
    for (i, &ts) in result.timestamp.iter().enumerate() {
        let utc = DateTime::from_timestamp(ts, 0)
            .ok_or_else(|| AugurError::Data(format!("timestamp out of range: {ts}")))?;
        let date = zone.local_date(utc);
        if !range.contains(date) {
            continue;
        }
        rows.push(RawRow {
            date,
            open: at(&quote.open, i),
            high: at(&quote.high, i),
            low: at(&quote.low, i),
            close: at(&quote.close, i),
            adj_close: at(&adjclose, i),
            volume: quote.volume.get(i).copied().flatten(),
        });
    }
    Ok(RawSeries {
        instrument: instrument.clone(),
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn aapl() -> InstrumentId {
        InstrumentId::new("AAPL").unwrap()
    }

    fn january() -> DateRange {
        DateRange::new(d(2024, 1, 1), d(2024, 2, 1)).unwrap()
    }

    const BODY: &str = r#"{
        "chart": {
            "result": [{
                "meta": {
                    "currency": "USD",
                    "symbol": "AAPL",
                    "exchangeTimezoneName": "America/New_York",
                    "gmtoffset": -18000
                },
                "timestamp": [1704205800, 1704292200, 1704378600],
                "indicators": {
                    "quote": [{
                        "open": [187.15, 184.22, null],
                        "high": [188.44, 185.88, null],
                        "low": [183.89, 183.43, null],
                        "close": [185.64, 184.25, null],
                        "volume": [82488700, 58414500, null]
                    }],
                    "adjclose": [{ "adjclose": [184.73, 183.35, null] }]
                }
            }],
            "error": null
        }
    }"#;

    #[test]
    fn maps_bars_to_exchange_local_dates() {
        let env: ChartEnvelope = serde_json::from_str(BODY).unwrap();
        let raw = into_raw_series(&aapl(), january(), env).unwrap();
        let dates: Vec<_> = raw.rows.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![d(2024, 1, 2), d(2024, 1, 3), d(2024, 1, 4)]);
        assert_eq!(raw.rows[0].close, Some(185.64));
        assert_eq!(raw.rows[0].adj_close, Some(184.73));
        assert_eq!(raw.rows[1].volume, Some(58_414_500));
        assert_eq!(raw.rows[2].close, None);
    }

    #[test]
    fn rows_outside_range_are_dropped() {
        let env: ChartEnvelope = serde_json::from_str(BODY).unwrap();
        let range = DateRange::new(d(2024, 1, 3), d(2024, 1, 4)).unwrap();
        let raw = into_raw_series(&aapl(), range, env).unwrap();
        assert_eq!(raw.len(), 1);
        assert_eq!(raw.rows[0].date, d(2024, 1, 3));
    }

    #[test]
    fn gmtoffset_is_used_without_a_known_zone() {
        // 2024-01-02T23:30:00Z is already Jan 3 at UTC+2.
        let body = r#"{"chart":{"result":[{
            "meta": {"exchangeTimezoneName": "Nowhere/Special", "gmtoffset": 7200},
            "timestamp": [1704238200],
            "indicators": {"quote": [{"close": [10.0]}]}
        }],"error":null}}"#;
        let env: ChartEnvelope = serde_json::from_str(body).unwrap();
        let raw = into_raw_series(&aapl(), january(), env).unwrap();
        assert_eq!(raw.rows[0].date, d(2024, 1, 3));
    }

    #[test]
    fn missing_timestamps_mean_no_rows() {
        let body = r#"{"chart":{"result":[{"meta":{},"indicators":{"quote":[{}]}}],"error":null}}"#;
        let env: ChartEnvelope = serde_json::from_str(body).unwrap();
        let raw = into_raw_series(&aapl(), january(), env).unwrap();
        assert!(raw.is_empty());
    }

    #[test]
    fn upstream_errors_are_classified() {
        let not_found = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        let env: ChartEnvelope = serde_json::from_str(not_found).unwrap();
        assert!(matches!(
            into_raw_series(&aapl(), january(), env),
            Err(AugurError::NotFound { .. })
        ));

        let bad = r#"{"chart":{"result":null,"error":{"code":"Bad Request","description":"Invalid input"}}}"#;
        let env: ChartEnvelope = serde_json::from_str(bad).unwrap();
        match into_raw_series(&aapl(), january(), env) {
            Err(AugurError::Provider { provider, msg }) => {
                assert_eq!(provider, PROVIDER_NAME);
                assert!(msg.contains("Bad Request"));
            }
            other => panic!("expected provider error, got {other:?}"),
        }
    }
}
