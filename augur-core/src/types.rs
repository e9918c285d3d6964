//! Re-export of foundational types from `augur-types`.
// Consolidated re-exports so downstream crates can depend on `augur-core` only

pub use augur_types::{AugurError, DateRange, InstrumentId, Observation, RawRow, RawSeries, Series, ValueField};
pub use augur_types::{AugurConfig, CacheConfig, ForecasterConfig, Frequency, SeasonalityConfig};
pub use augur_types::{ComponentPoint, ComponentSeries, Forecast, ForecastRow, SeasonalValue};
pub use augur_types::{DAYS_PER_WEEK, DAYS_PER_YEAR, HORIZON_DAYS_PER_YEAR};
