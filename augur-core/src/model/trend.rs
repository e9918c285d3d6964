//! Piecewise-linear trend with slope changes at changepoints.

use chrono::NaiveDate;
use serde::Serialize;

use crate::{ForecasterConfig, Series};

/// Mapping between calendar dates/values and the unit-scaled coordinates the
/// optimizer works in.
///
/// `t = 0` is the first training date and `t = 1` the last; values are divided
/// by the largest absolute training value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeScale {
    start: NaiveDate,
    span_days: f64,
    value_scale: f64,
}

impl TimeScale {
    pub(crate) fn from_series(series: &Series) -> Self {
        let span_days = series.span_days().max(1) as f64;
        let max_abs = series
            .observations()
            .iter()
            .map(|o| o.value.abs())
            .fold(0.0_f64, f64::max);
        Self {
            start: series.first_date(),
            span_days,
            value_scale: if max_abs > 0.0 { max_abs } else { 1.0 },
        }
    }

    /// Scaled time of a date; may be negative or exceed 1 outside the training range.
    #[must_use]
    pub fn t(&self, date: NaiveDate) -> f64 {
        (date - self.start).num_days() as f64 / self.span_days
    }

    /// First training date (`t = 0`).
    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    /// Calendar days covered by `t in [0, 1]`.
    #[must_use]
    pub const fn span_days(&self) -> f64 {
        self.span_days
    }

    /// Divisor applied to training values.
    #[must_use]
    pub const fn value_scale(&self) -> f64 {
        self.value_scale
    }
}

/// A fitted slope change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Changepoint {
    /// Calendar date of the changepoint.
    pub date: NaiveDate,
    /// Scaled position in `[0, 1]`.
    pub t: f64,
    /// Slope change in scaled units.
    pub delta: f64,
}

/// Fitted trend `g(t) = k·t + m + Σ δ_j·max(t − s_j, 0)`.
///
/// Continuous everywhere; the slope after the last changepoint carries on unchanged
/// beyond the training range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendParameters {
    scale: TimeScale,
    rate: f64,
    offset: f64,
    changepoints: Vec<Changepoint>,
}

impl TrendParameters {
    pub(crate) const fn new(
        scale: TimeScale,
        rate: f64,
        offset: f64,
        changepoints: Vec<Changepoint>,
    ) -> Self {
        Self {
            scale,
            rate,
            offset,
            changepoints,
        }
    }

    /// Time and value scaling of the model.
    #[must_use]
    pub const fn scale(&self) -> &TimeScale {
        &self.scale
    }

    /// Base slope `k` in scaled units.
    #[must_use]
    pub const fn rate(&self) -> f64 {
        self.rate
    }

    /// Intercept `m` in scaled units.
    #[must_use]
    pub const fn offset(&self) -> f64 {
        self.offset
    }

    /// Changepoints in date order.
    #[must_use]
    pub fn changepoints(&self) -> &[Changepoint] {
        &self.changepoints
    }

    /// Trend at scaled time `t`, in scaled units.
    #[must_use]
    pub fn evaluate(&self, t: f64) -> f64 {
        let bends: f64 = self
            .changepoints
            .iter()
            .map(|c| c.delta * (t - c.t).max(0.0))
            .sum();
        self.rate.mul_add(t, self.offset) + bends
    }

    /// Slope at scaled time `t`: the base rate plus every delta at or before `t`.
    #[must_use]
    pub fn slope_at(&self, t: f64) -> f64 {
        self.rate
            + self
                .changepoints
                .iter()
                .filter(|c| c.t <= t)
                .map(|c| c.delta)
                .sum::<f64>()
    }

    /// Trend value at a calendar date, in value units.
    #[must_use]
    pub fn value(&self, date: NaiveDate) -> f64 {
        self.evaluate(self.scale.t(date)) * self.scale.value_scale
    }

    /// Initial growth in value units per day.
    #[must_use]
    pub fn growth_per_day(&self) -> f64 {
        self.per_day(self.rate)
    }

    /// Growth after the last changepoint, in value units per day.
    #[must_use]
    pub fn final_growth_per_day(&self) -> f64 {
        self.per_day(self.slope_at(f64::INFINITY))
    }

    /// Trend value at the first training date, in value units.
    #[must_use]
    pub fn offset_value(&self) -> f64 {
        self.offset * self.scale.value_scale
    }

    /// Slope change of a changepoint, in value units per day.
    #[must_use]
    pub fn delta_per_day(&self, changepoint: &Changepoint) -> f64 {
        self.per_day(changepoint.delta)
    }

    /// Mean absolute slope change across changepoints (scaled units); 0 without changepoints.
    #[must_use]
    pub fn mean_abs_delta(&self) -> f64 {
        if self.changepoints.is_empty() {
            return 0.0;
        }
        self.changepoints.iter().map(|c| c.delta.abs()).sum::<f64>()
            / self.changepoints.len() as f64
    }

    fn per_day(&self, scaled_slope: f64) -> f64 {
        scaled_slope * self.scale.value_scale / self.scale.span_days
    }
}

/// Candidate changepoint dates with their scaled positions.
///
/// Explicit dates are kept when strictly inside the training range; otherwise
/// `changepoint_count` dates are spread uniformly over the first
/// `changepoint_range` fraction of the observations.
pub(crate) fn place_changepoints(
    series: &Series,
    scale: &TimeScale,
    config: &ForecasterConfig,
) -> Vec<(NaiveDate, f64)> {
    let dates: Vec<NaiveDate> = series.dates().collect();
    let chosen: Vec<NaiveDate> = match &config.changepoints {
        Some(explicit) => {
            let (first, last) = (series.first_date(), series.last_date());
            let mut kept: Vec<NaiveDate> = explicit
                .iter()
                .copied()
                .filter(|d| first < *d && *d < last)
                .collect();
            kept.sort_unstable();
            kept.dedup();
            if kept.len() < explicit.len() {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    discarded = explicit.len() - kept.len(),
                    %first,
                    %last,
                    "explicit changepoints outside the training range were discarded"
                );
            }
            kept
        }
        None => {
            let history = (dates.len() as f64 * config.changepoint_range).floor() as usize;
            let n = config.changepoint_count.min(history.saturating_sub(1));
            if n == 0 {
                Vec::new()
            } else {
                let last_idx = (history - 1) as f64;
                let mut idx: Vec<usize> = (1..=n)
                    .map(|i| (i as f64 * last_idx / n as f64).round() as usize)
                    .collect();
                idx.dedup();
                idx.into_iter().map(|i| dates[i]).collect()
            }
        }
    };
    chosen.into_iter().map(|d| (d, scale.t(d))).collect()
}
