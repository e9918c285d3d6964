//! Configuration types shared by the cache, the forecaster and the orchestrator.

use std::collections::HashSet;
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::forecast::{TREND, YHAT};
use crate::{AugurError, ValueField};

/// Length of a calendar year in days used for yearly seasonality.
pub const DAYS_PER_YEAR: f64 = 365.25;
/// Length of a week in days.
pub const DAYS_PER_WEEK: f64 = 7.0;
/// Days per year used when converting a year horizon into a day count.
pub const HORIZON_DAYS_PER_YEAR: u32 = 365;

/// One periodic component expressed as a Fourier series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalityConfig {
    /// Component name, unique within a model.
    pub name: String,
    /// Period length in days.
    pub period_days: f64,
    /// Number of sine/cosine pairs.
    pub harmonic_order: usize,
    /// Standard deviation of the Gaussian shrinkage on the Fourier coefficients.
    pub prior_scale: f64,
}

impl SeasonalityConfig {
    /// Default shrinkage scale for Fourier coefficients.
    pub const DEFAULT_PRIOR_SCALE: f64 = 10.0;

    /// Custom component.
    pub fn new(name: impl Into<String>, period_days: f64, harmonic_order: usize) -> Self {
        Self {
            name: name.into(),
            period_days,
            harmonic_order,
            prior_scale: Self::DEFAULT_PRIOR_SCALE,
        }
    }

    /// Day-of-week cycle: 7-day period, order 3.
    #[must_use]
    pub fn weekly() -> Self {
        Self::new("weekly", DAYS_PER_WEEK, 3)
    }

    /// Time-of-year cycle: 365.25-day period, order 10.
    #[must_use]
    pub fn yearly() -> Self {
        Self::new("yearly", DAYS_PER_YEAR, 10)
    }

    /// Override the coefficient prior scale.
    #[must_use]
    pub const fn with_prior_scale(mut self, prior_scale: f64) -> Self {
        self.prior_scale = prior_scale;
        self
    }
}

/// Forecaster configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecasterConfig {
    /// Number of automatically placed potential changepoints.
    pub changepoint_count: usize,
    /// Leading fraction of the history in which changepoints may be placed, in (0, 1].
    pub changepoint_range: f64,
    /// Explicit changepoint dates; overrides automatic placement when set.
    pub changepoints: Option<Vec<NaiveDate>>,
    /// Seasonal components to fit jointly with the trend.
    pub seasonalities: Vec<SeasonalityConfig>,
    /// Laplace scale of changepoint slope deltas; larger values allow a more
    /// flexible trend, 0 freezes the trend to a single line.
    pub trend_flexibility: f64,
    /// Number of simulated trend futures used for the uncertainty band; 0 keeps
    /// only the residual-noise band.
    pub uncertainty_samples: usize,
    /// Coverage of the forecast interval, in (0, 1).
    pub interval_width: f64,
    /// Fail the fit instead of dropping an unidentifiable seasonal component.
    pub strict_seasonality: bool,
    /// Seed for the trend-uncertainty simulation.
    pub random_seed: u64,
    /// Iteration cap of the sparse trend optimizer.
    pub max_iterations: usize,
    /// Relative objective change at which the optimizer stops.
    pub tolerance: f64,
}

impl Default for ForecasterConfig {
    fn default() -> Self {
        Self {
            changepoint_count: 25,
            changepoint_range: 0.8,
            changepoints: None,
            seasonalities: vec![SeasonalityConfig::weekly(), SeasonalityConfig::yearly()],
            trend_flexibility: 0.05,
            uncertainty_samples: 1000,
            interval_width: 0.8,
            strict_seasonality: false,
            random_seed: 0,
            max_iterations: 1000,
            tolerance: 1e-8,
        }
    }
}

impl ForecasterConfig {
    /// Set the automatic changepoint count.
    #[must_use]
    pub const fn with_changepoint_count(mut self, n: usize) -> Self {
        self.changepoint_count = n;
        self
    }

    /// Set the changepoint range fraction.
    #[must_use]
    pub const fn with_changepoint_range(mut self, fraction: f64) -> Self {
        self.changepoint_range = fraction;
        self
    }

    /// Use explicit changepoint dates instead of automatic placement.
    #[must_use]
    pub fn with_changepoints(mut self, dates: Vec<NaiveDate>) -> Self {
        self.changepoints = Some(dates);
        self
    }

    /// Replace the seasonal components.
    #[must_use]
    pub fn with_seasonalities(mut self, seasonalities: Vec<SeasonalityConfig>) -> Self {
        self.seasonalities = seasonalities;
        self
    }

    /// Set the trend flexibility (Laplace scale of slope deltas).
    #[must_use]
    pub const fn with_trend_flexibility(mut self, scale: f64) -> Self {
        self.trend_flexibility = scale;
        self
    }

    /// Set the number of uncertainty simulations.
    #[must_use]
    pub const fn with_uncertainty_samples(mut self, n: usize) -> Self {
        self.uncertainty_samples = n;
        self
    }

    /// Set the interval coverage.
    #[must_use]
    pub const fn with_interval_width(mut self, width: f64) -> Self {
        self.interval_width = width;
        self
    }

    /// Toggle strict seasonality identifiability.
    #[must_use]
    pub const fn strict_seasonality(mut self, yes: bool) -> Self {
        self.strict_seasonality = yes;
        self
    }

    /// Set the simulation seed.
    #[must_use]
    pub const fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = seed;
        self
    }

    /// Check ranges and uniqueness of every field.
    ///
    /// # Errors
    /// Returns `InvalidArg` naming the first offending field.
    pub fn validate(&self) -> Result<(), AugurError> {
        if !(self.changepoint_range > 0.0 && self.changepoint_range <= 1.0) {
            return Err(AugurError::InvalidArg(format!(
                "changepoint_range must be in (0, 1], got {}",
                self.changepoint_range
            )));
        }
        if !(self.trend_flexibility.is_finite() && self.trend_flexibility >= 0.0) {
            return Err(AugurError::InvalidArg(format!(
                "trend_flexibility must be finite and >= 0, got {}",
                self.trend_flexibility
            )));
        }
        if !(self.interval_width > 0.0 && self.interval_width < 1.0) {
            return Err(AugurError::InvalidArg(format!(
                "interval_width must be in (0, 1), got {}",
                self.interval_width
            )));
        }
        if self.max_iterations == 0 {
            return Err(AugurError::InvalidArg("max_iterations must be >= 1".into()));
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(AugurError::InvalidArg(format!(
                "tolerance must be finite and > 0, got {}",
                self.tolerance
            )));
        }
        let mut names = HashSet::new();
        for s in &self.seasonalities {
            if s.name.is_empty() || s.name == TREND || s.name == YHAT {
                return Err(AugurError::InvalidArg(format!(
                    "invalid seasonality name {:?}",
                    s.name
                )));
            }
            if !names.insert(s.name.as_str()) {
                return Err(AugurError::InvalidArg(format!(
                    "duplicate seasonality name {:?}",
                    s.name
                )));
            }
            if !(s.period_days.is_finite() && s.period_days > 0.0) {
                return Err(AugurError::InvalidArg(format!(
                    "seasonality {:?}: period must be > 0, got {}",
                    s.name, s.period_days
                )));
            }
            if s.harmonic_order == 0 {
                return Err(AugurError::InvalidArg(format!(
                    "seasonality {:?}: harmonic order must be >= 1",
                    s.name
                )));
            }
            if !(s.prior_scale.is_finite() && s.prior_scale > 0.0) {
                return Err(AugurError::InvalidArg(format!(
                    "seasonality {:?}: prior scale must be > 0, got {}",
                    s.name, s.prior_scale
                )));
            }
        }
        Ok(())
    }
}

/// Cadence of the future index appended after the training range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Frequency {
    /// Every calendar day.
    #[default]
    CalendarDays,
    /// Monday through Friday only.
    Weekdays,
}

/// Configuration for the series cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// How long a fetched series stays fresh; zero disables caching.
    pub ttl: Duration,
    /// Maximum number of cached keys; least recently used keys are evicted first.
    pub max_entries: usize,
    /// Upper bound on a single upstream fetch.
    pub fetch_timeout: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(3600),
            max_entries: 256,
            fetch_timeout: Duration::from_secs(30),
        }
    }
}

impl CacheConfig {
    /// Whether entries are retained at all.
    #[must_use]
    pub fn enabled(&self) -> bool {
        !self.ttl.is_zero()
    }
}

/// Global configuration for the `Augur` pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AugurConfig {
    /// Series cache settings.
    pub cache: CacheConfig,
    /// Forecaster settings.
    pub forecaster: ForecasterConfig,
    /// Which raw price column is modeled.
    pub value_field: ValueField,
    /// Cadence of the appended future index.
    pub frequency: Frequency,
}
