use async_trait::async_trait;

use crate::{AugurError, DateRange, InstrumentId, RawSeries};

/// Source of raw daily history for an instrument.
///
/// Implementations return rows as delivered upstream (possibly unsorted, with
/// duplicates or null prices); normalization happens downstream.
#[async_trait]
pub trait SeriesProvider: Send + Sync {
    /// A stable identifier used in error messages and logs (e.g., "augur-yahoo").
    fn name(&self) -> &'static str;

    /// Human-friendly vendor string.
    fn vendor(&self) -> &'static str {
        "unknown"
    }

    /// Fetch raw rows for `instrument` over the half-open `range`.
    ///
    /// # Errors
    /// - `NotFound` for unknown instruments.
    /// - `Provider` for connectivity or upstream failures.
    async fn fetch_series(
        &self,
        instrument: &InstrumentId,
        range: DateRange,
    ) -> Result<RawSeries, AugurError>;
}
