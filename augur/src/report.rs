use std::sync::Arc;

use augur_core::{
    ComponentSeries, DateRange, Forecast, ForecastRow, FittedModel, HORIZON_DAYS_PER_YEAR,
    InstrumentId,
};
use serde::Serialize;

/// Convert a horizon in whole years into the day count the forecaster accepts.
///
/// ```
/// assert_eq!(augur::horizon_days_from_years(1), 365);
/// assert_eq!(augur::horizon_days_from_years(4), 1460);
/// ```
#[must_use]
pub const fn horizon_days_from_years(years: u32) -> u32 {
    years.saturating_mul(HORIZON_DAYS_PER_YEAR)
}

/// Result of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct ForecastReport {
    /// Instrument that was modeled.
    pub instrument: InstrumentId,
    /// History range that was fetched.
    pub range: DateRange,
    /// Days forecast past the last observation.
    pub horizon_days: u32,
    /// Model fitted on the fetched history.
    pub model: Arc<FittedModel>,
    /// Rows for every training date followed by the horizon.
    pub forecast: Forecast,
}

impl ForecastReport {
    /// Rows after the last training date.
    #[must_use]
    pub fn future(&self) -> &[ForecastRow] {
        let end = self.model.training_end();
        let first = self.forecast.rows.partition_point(|r| r.date <= end);
        &self.forecast.rows[first..]
    }

    /// Per-component view for charting.
    #[must_use]
    pub fn components(&self) -> Vec<ComponentSeries> {
        self.forecast.components()
    }
}
