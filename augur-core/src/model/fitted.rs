//! The immutable result of a fit and prediction from it.

use std::collections::BTreeMap;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::Serialize;

use crate::{
    AugurError, Forecast, ForecastRow, ForecasterConfig, Frequency, InstrumentId, SeasonalValue,
    Series,
};

use super::seasonality::{SeasonalComponent, epoch_day};
use super::trend::TrendParameters;
use super::uncertainty::{Simulation, normal_quantile, trend_half_widths};

/// Days after training over which the trend band is simulated daily.
const DAILY_BAND_DAYS: i64 = 730;
/// Spacing of the trend band grid beyond [`DAILY_BAND_DAYS`].
const BAND_STRIDE_DAYS: i64 = 30;

/// Grid slot whose day is the first grid day on or after `days_after` (>= 1).
fn band_grid_index(days_after: i64) -> usize {
    let slot = if days_after <= DAILY_BAND_DAYS {
        days_after - 1
    } else {
        DAILY_BAND_DAYS - 1 + (days_after - DAILY_BAND_DAYS + BAND_STRIDE_DAYS - 1) / BAND_STRIDE_DAYS
    };
    usize::try_from(slot).unwrap_or(0)
}

/// Days after training of grid slot `index`.
fn band_grid_offset(index: usize) -> i64 {
    let index = i64::try_from(index).unwrap_or(i64::MAX);
    if index < DAILY_BAND_DAYS {
        index + 1
    } else {
        DAILY_BAND_DAYS + (index - DAILY_BAND_DAYS + 1) * BAND_STRIDE_DAYS
    }
}

/// A configured seasonal component that was left out of the model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DroppedSeasonality {
    /// Component name.
    pub name: String,
    /// Declared period in days.
    pub period_days: f64,
    /// Why it could not be estimated.
    pub reason: AugurError,
}

/// Parameters of a fitted trend + seasonality model.
///
/// Immutable once built; share it behind an `Arc` and call [`FittedModel::predict`]
/// from any number of threads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FittedModel {
    history: Series,
    trend: TrendParameters,
    seasonalities: Vec<SeasonalComponent>,
    dropped: Vec<DroppedSeasonality>,
    sigma: f64,
    interval_width: f64,
    uncertainty_samples: usize,
    random_seed: u64,
    iterations: usize,
    converged: bool,
}

impl FittedModel {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        history: Series,
        trend: TrendParameters,
        seasonalities: Vec<SeasonalComponent>,
        dropped: Vec<DroppedSeasonality>,
        sigma: f64,
        config: &ForecasterConfig,
        iterations: usize,
        converged: bool,
    ) -> Self {
        Self {
            history,
            trend,
            seasonalities,
            dropped,
            sigma,
            interval_width: config.interval_width,
            uncertainty_samples: config.uncertainty_samples,
            random_seed: config.random_seed,
            iterations,
            converged,
        }
    }

    /// Instrument the model was trained on.
    #[must_use]
    pub const fn instrument(&self) -> &InstrumentId {
        self.history.instrument()
    }

    /// The training series.
    #[must_use]
    pub const fn history(&self) -> &Series {
        &self.history
    }

    /// First training date.
    #[must_use]
    pub fn training_start(&self) -> NaiveDate {
        self.history.first_date()
    }

    /// Last training date.
    #[must_use]
    pub fn training_end(&self) -> NaiveDate {
        self.history.last_date()
    }

    /// Fitted trend.
    #[must_use]
    pub const fn trend(&self) -> &TrendParameters {
        &self.trend
    }

    /// Fitted seasonal components in configuration order.
    #[must_use]
    pub fn seasonalities(&self) -> &[SeasonalComponent] {
        &self.seasonalities
    }

    /// Fitted seasonal component by name.
    #[must_use]
    pub fn seasonality(&self, name: &str) -> Option<&SeasonalComponent> {
        self.seasonalities.iter().find(|s| s.name() == name)
    }

    /// Configured components that were not identifiable from the training data.
    #[must_use]
    pub fn dropped(&self) -> &[DroppedSeasonality] {
        &self.dropped
    }

    /// Residual standard deviation in value units (0 for an exact fit).
    #[must_use]
    pub const fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Interval coverage used for bounds.
    #[must_use]
    pub const fn interval_width(&self) -> f64 {
        self.interval_width
    }

    /// Optimizer iterations performed.
    #[must_use]
    pub const fn iterations(&self) -> usize {
        self.iterations
    }

    /// Whether the optimizer met its tolerance before the iteration cap.
    #[must_use]
    pub const fn converged(&self) -> bool {
        self.converged
    }

    /// Training dates (optional) followed by `horizon_days` calendar days after
    /// the last training date, filtered by `frequency`.
    #[must_use]
    pub fn future_dates(
        &self,
        horizon_days: u32,
        include_history: bool,
        frequency: Frequency,
    ) -> Vec<NaiveDate> {
        let mut out: Vec<NaiveDate> = if include_history {
            self.history.dates().collect()
        } else {
            Vec::new()
        };
        let last = self.training_end();
        out.extend(
            (1..=u64::from(horizon_days))
                .filter_map(|i| last.checked_add_days(Days::new(i)))
                .filter(|d| match frequency {
                    Frequency::Weekdays => !matches!(d.weekday(), Weekday::Sat | Weekday::Sun),
                    _ => true,
                }),
        );
        out
    }

    /// Evaluate the model at `dates`, returning one row per date in input order.
    ///
    /// Dates inside the training range carry the residual-noise band only; dates
    /// after it additionally carry simulated trend uncertainty, whose width never
    /// shrinks with distance. The result depends only on the model and the dates.
    #[must_use]
    pub fn predict(&self, dates: &[NaiveDate]) -> Vec<ForecastRow> {
        let z = normal_quantile(0.5 + self.interval_width / 2.0);
        let noise = if self.sigma > 0.0 { z * self.sigma } else { 0.0 };
        let widths = self.trend_widths(dates);

        dates
            .iter()
            .map(|&date| {
                let trend = self.trend.value(date);
                let day = epoch_day(date);
                let seasonal: Vec<SeasonalValue> = self
                    .seasonalities
                    .iter()
                    .map(|s| SeasonalValue {
                        name: s.name().to_string(),
                        value: s.value_at_day(day),
                    })
                    .collect();
                let yhat = trend + seasonal.iter().map(|s| s.value).sum::<f64>();
                let (w_lo, w_hi) = widths.get(&date).copied().unwrap_or((0.0, 0.0));
                ForecastRow {
                    date,
                    trend,
                    trend_lower: trend - w_lo,
                    trend_upper: trend + w_hi,
                    seasonal,
                    yhat,
                    yhat_lower: yhat - noise - w_lo,
                    yhat_upper: yhat + noise + w_hi,
                }
            })
            .collect()
    }

    /// Predict over `future_dates(horizon_days, include_history, frequency)`.
    #[must_use]
    pub fn forecast(&self, horizon_days: u32, include_history: bool, frequency: Frequency) -> Forecast {
        Forecast::new(self.predict(&self.future_dates(horizon_days, include_history, frequency)))
    }

    /// Trend half-widths for every requested date after the training range.
    ///
    /// The band is simulated on a grid fixed by the model alone: daily for the
    /// first [`DAILY_BAND_DAYS`] days after training, then every
    /// [`BAND_STRIDE_DAYS`] days. A date reads the running maximum at the first
    /// grid day on or after it, so widths never shrink with distance and do not
    /// depend on which other dates are requested.
    fn trend_widths(&self, dates: &[NaiveDate]) -> BTreeMap<NaiveDate, (f64, f64)> {
        let end = self.training_end();
        let offsets: Vec<(NaiveDate, i64)> = dates
            .iter()
            .filter(|d| **d > end)
            .map(|d| (*d, (*d - end).num_days()))
            .collect();
        let Some(last) = offsets.iter().map(|(_, k)| band_grid_index(*k)).max() else {
            return BTreeMap::new();
        };
        let scale = self.trend.scale();
        let base = scale.t(end);
        let grid_t: Vec<f64> = (0..=last)
            .map(|i| base + band_grid_offset(i) as f64 / scale.span_days())
            .collect();
        let widths = trend_half_widths(
            &self.trend,
            Simulation {
                samples: self.uncertainty_samples,
                interval_width: self.interval_width,
                seed: self.random_seed,
            },
            &grid_t,
        );
        offsets
            .into_iter()
            .map(|(date, k)| (date, widths[band_grid_index(k)]))
            .collect()
    }
}
