//! Augur fetches daily history for a traded instrument and forecasts it.
//!
//! Overview
//! - History comes from any `SeriesProvider` (`augur-yahoo` for live data,
//!   `augur-mock` for fixtures) behind a TTL cache with singleflight fetches.
//! - Raw rows are normalized into a strictly ordered series; gaps stay gaps.
//! - A piecewise-linear trend with sparse changepoints and Fourier seasonal
//!   components is fitted jointly, then extrapolated with uncertainty bounds.
//!
//! Key behaviors
//! - Fitting is CPU-bound and runs on the blocking pool; `predict` is pure and
//!   can be called concurrently.
//! - Provider failures and too-short series abort a run; nothing is cached on
//!   failure and no default forecast is fabricated.
//! - Horizons are day counts; use [`horizon_days_from_years`] for year input.
//!
//! Examples
//! ```rust,ignore
//! use std::sync::Arc;
//! use augur::{Augur, DateRange, InstrumentId, horizon_days_from_years};
//!
//! let augur = Augur::builder()
//!     .with_provider(Arc::new(augur_yahoo::YahooProvider::new()?))
//!     .build()?;
//! let aapl = InstrumentId::new("AAPL")?;
//! let range = DateRange::new(start, today)?;
//! let report = augur.forecast(&aapl, range, horizon_days_from_years(1)).await?;
//! for row in report.forecast.tail(5) {
//!     println!("{} {:.2} [{:.2}, {:.2}]", row.date, row.yhat, row.yhat_lower, row.yhat_upper);
//! }
//! ```
//!
//! See `augur/examples/` for runnable end-to-end demonstrations.
#![warn(missing_docs)]

pub(crate) mod core;
mod forecaster;
mod report;

pub use core::{Augur, AugurBuilder};
pub use forecaster::Forecaster;
pub use report::{ForecastReport, horizon_days_from_years};

pub use augur_middleware::{CacheEntry, SeriesCache, SeriesKey};

// Re-export core types for convenience
pub use augur_core::{
    AugurConfig, AugurError, CacheConfig, CancelFlag, Changepoint, Clock, ComponentPoint,
    ComponentSeries, DAYS_PER_WEEK, DAYS_PER_YEAR, DateRange, DroppedSeasonality, FittedModel,
    Forecast, ForecastRow, ForecasterConfig, Frequency, HORIZON_DAYS_PER_YEAR, Harmonic,
    InstrumentId, Observation, RawRow, RawSeries, SeasonalComponent, SeasonalValue,
    SeasonalityConfig, Series, SeriesProvider, SystemClock, TrendParameters, ValueField,
};
