//! augur-specific data transfer objects, configuration primitives and the unified error.
#![warn(missing_docs)]

mod config;
mod error;
pub mod forecast;
mod series;

pub use config::{
    AugurConfig, CacheConfig, DAYS_PER_WEEK, DAYS_PER_YEAR, ForecasterConfig, Frequency,
    HORIZON_DAYS_PER_YEAR, SeasonalityConfig,
};
pub use error::AugurError;
pub use forecast::{ComponentPoint, ComponentSeries, Forecast, ForecastRow, SeasonalValue};
pub use series::{DateRange, InstrumentId, Observation, RawRow, RawSeries, Series, ValueField};
