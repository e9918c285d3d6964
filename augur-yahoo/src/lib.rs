//! augur-yahoo
//!
//! Series provider that implements `SeriesProvider` on top of the public Yahoo
//! Finance chart endpoint (`/v8/finance/chart/{symbol}`). Bars are requested at
//! daily interval and dated in the listing exchange's timezone.
#![warn(missing_docs)]

/// Chart source trait and the production HTTP source.
pub mod adapter;
/// Chart payload model and conversion into raw rows.
pub mod chart;

use std::sync::Arc;

use adapter::{ChartSource, HttpChartSource};
use async_trait::async_trait;
use augur_core::{AugurError, DateRange, InstrumentId, RawSeries, SeriesProvider};
use chrono::NaiveDate;

/// Stable provider name used in errors and logs.
pub const PROVIDER_NAME: &str = "augur-yahoo";

/// Public provider type. Production users construct it with [`YahooProvider::new`].
#[derive(Clone)]
pub struct YahooProvider {
    source: Arc<dyn ChartSource>,
}

impl YahooProvider {
    fn looks_like_not_found(msg: &str) -> bool {
        let m = msg.to_ascii_lowercase();
        m.contains("not found") || m.contains("no data") || m.contains("delisted")
    }

    fn normalize_error(e: AugurError, what: &str) -> AugurError {
        match e {
            AugurError::Provider { provider: _, msg } => {
                if Self::looks_like_not_found(&msg) {
                    AugurError::not_found(what.to_string())
                } else {
                    AugurError::provider(PROVIDER_NAME, msg)
                }
            }
            AugurError::Other(msg) | AugurError::Data(msg) => AugurError::provider(PROVIDER_NAME, msg),
            other => other,
        }
    }

    /// Build against the public endpoint.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new() -> Result<Self, AugurError> {
        Ok(Self::from_source(Arc::new(HttpChartSource::new()?)))
    }

    /// Build against a custom host (mirrors, proxies, local mock servers).
    ///
    /// # Errors
    /// Returns `InvalidArg` for an unusable URL, or an error if the HTTP client
    /// cannot be constructed.
    pub fn with_base_url(base_url: &str) -> Result<Self, AugurError> {
        Ok(Self::from_source(Arc::new(HttpChartSource::with_base_url(
            base_url,
        )?)))
    }

    /// Build from any chart source, e.g. an injected test adapter.
    #[must_use]
    pub fn from_source(source: Arc<dyn ChartSource>) -> Self {
        Self { source }
    }
}

fn midnight_utc(date: NaiveDate) -> i64 {
    date.and_time(chrono::NaiveTime::MIN).and_utc().timestamp()
}

#[async_trait]
impl SeriesProvider for YahooProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn vendor(&self) -> &'static str {
        "Yahoo"
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "augur_yahoo::fetch_series",
            skip(self),
            fields(instrument = %instrument, start = %range.start(), end = %range.end()),
        )
    )]
    async fn fetch_series(
        &self,
        instrument: &InstrumentId,
        range: DateRange,
    ) -> Result<RawSeries, AugurError> {
        let what = format!("series for {instrument}");
        let envelope = self
            .source
            .chart(
                instrument.as_str(),
                midnight_utc(range.start()),
                midnight_utc(range.end()),
            )
            .await
            .map_err(|e| Self::normalize_error(e, &what))?;
        let raw = chart::into_raw_series(instrument, range, envelope)
            .map_err(|e| Self::normalize_error(e, &what))?;
        #[cfg(feature = "tracing")]
        tracing::debug!(rows = raw.len(), "chart fetched");
        Ok(raw)
    }
}
