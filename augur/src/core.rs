use std::sync::Arc;

use augur_core::{
    AugurConfig, AugurError, CacheConfig, CancelFlag, Clock, DateRange, ForecasterConfig,
    Frequency, InstrumentId, RawSeries, Series, SeriesProvider, SystemClock, ValueField,
    normalize_with,
};
use augur_middleware::SeriesCache;

use crate::forecaster::Forecaster;
use crate::report::ForecastReport;

/// Pipeline that fetches history through a cache, normalizes it, fits a model
/// and predicts over the history plus a horizon.
pub struct Augur {
    pub(crate) cache: SeriesCache,
    pub(crate) cfg: AugurConfig,
}

/// Builder for constructing an `Augur` pipeline with custom configuration.
pub struct AugurBuilder {
    provider: Option<Arc<dyn SeriesProvider>>,
    clock: Option<Arc<dyn Clock>>,
    cfg: AugurConfig,
}

impl Default for AugurBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AugurBuilder {
    /// Create a new builder with default cache and forecaster settings.
    ///
    /// A provider must be set via [`AugurBuilder::with_provider`] before building.
    #[must_use]
    pub fn new() -> Self {
        Self {
            provider: None,
            clock: None,
            cfg: AugurConfig::default(),
        }
    }

    /// Set the historical-series provider. The pipeline wraps it in its own cache.
    #[must_use]
    pub fn with_provider(mut self, provider: Arc<dyn SeriesProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Time source for cache freshness; defaults to the system clock.
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn config(mut self, cfg: AugurConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Cache TTL, capacity and fetch timeout.
    ///
    /// A zero TTL disables retention; concurrent identical requests still share
    /// one upstream fetch.
    #[must_use]
    pub const fn cache_config(mut self, cache: CacheConfig) -> Self {
        self.cfg.cache = cache;
        self
    }

    /// Model settings used by every fit.
    #[must_use]
    pub fn forecaster_config(mut self, forecaster: ForecasterConfig) -> Self {
        self.cfg.forecaster = forecaster;
        self
    }

    /// Price column that is modeled.
    #[must_use]
    pub const fn value_field(mut self, field: ValueField) -> Self {
        self.cfg.value_field = field;
        self
    }

    /// Cadence of the forecast horizon.
    #[must_use]
    pub const fn frequency(mut self, frequency: Frequency) -> Self {
        self.cfg.frequency = frequency;
        self
    }

    /// Build the `Augur` pipeline.
    ///
    /// # Errors
    /// Returns `InvalidArg` if no provider was set or the forecaster configuration
    /// is invalid.
    pub fn build(self) -> Result<Augur, AugurError> {
        let Some(provider) = self.provider else {
            return Err(AugurError::InvalidArg(
                "no provider registered; add one via with_provider(...)".to_string(),
            ));
        };
        self.cfg.forecaster.validate()?;
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        Ok(Augur {
            cache: SeriesCache::with_clock(provider, self.cfg.cache.clone(), clock),
            cfg: self.cfg,
        })
    }
}

impl Augur {
    /// Start building a new `Augur` instance.
    ///
    /// ```rust,ignore
    /// use std::sync::Arc;
    /// use augur::{Augur, ForecasterConfig};
    ///
    /// let augur = Augur::builder()
    ///     .with_provider(Arc::new(augur_yahoo::YahooProvider::new()?))
    ///     .forecaster_config(ForecasterConfig::default().with_changepoint_count(10))
    ///     .build()?;
    /// ```
    #[must_use]
    pub fn builder() -> AugurBuilder {
        AugurBuilder::new()
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &AugurConfig {
        &self.cfg
    }

    /// The series cache in front of the provider.
    #[must_use]
    pub const fn cache(&self) -> &SeriesCache {
        &self.cache
    }

    /// A fresh, unfit forecaster with the pipeline's model settings.
    ///
    /// # Errors
    /// Returns `InvalidArg` if the forecaster configuration is invalid.
    pub fn forecaster(&self) -> Result<Forecaster, AugurError> {
        Forecaster::new(self.cfg.forecaster.clone())
    }

    /// Raw provider rows for `instrument` over `range`, served from the cache
    /// while fresh.
    ///
    /// # Errors
    /// `Provider`, `NotFound` or `ProviderTimeout` from the upstream fetch.
    pub async fn raw_series(
        &self,
        instrument: &InstrumentId,
        range: DateRange,
    ) -> Result<Arc<RawSeries>, AugurError> {
        self.cache.get(instrument, range).await
    }

    /// Normalized training series for `instrument` over `range`.
    ///
    /// # Errors
    /// Provider errors from the fetch, or `EmptySeries` when fewer than two
    /// usable observations remain.
    pub async fn series(
        &self,
        instrument: &InstrumentId,
        range: DateRange,
    ) -> Result<Series, AugurError> {
        let raw = self.raw_series(instrument, range).await?;
        normalize_with(&raw, self.cfg.value_field)
    }

    /// Fetch, normalize, fit and predict `horizon_days` past the last observation.
    ///
    /// # Errors
    /// Provider errors and `EmptySeries` abort the run unchanged; fit failures
    /// surface as `Fit` or `Identifiability`.
    pub async fn forecast(
        &self,
        instrument: &InstrumentId,
        range: DateRange,
        horizon_days: u32,
    ) -> Result<ForecastReport, AugurError> {
        self.forecast_with_cancel(instrument, range, horizon_days, CancelFlag::new())
            .await
    }

    /// Like [`Augur::forecast`], with a flag that cancels the fit cooperatively.
    ///
    /// # Errors
    /// As [`Augur::forecast`], plus `Cancelled`.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "augur::forecast",
            skip(self, cancel),
            fields(instrument = %instrument, start = %range.start(), end = %range.end()),
        )
    )]
    pub async fn forecast_with_cancel(
        &self,
        instrument: &InstrumentId,
        range: DateRange,
        horizon_days: u32,
        cancel: CancelFlag,
    ) -> Result<ForecastReport, AugurError> {
        let series = self.series(instrument, range).await?;
        let forecaster = self.forecaster()?;
        let model = forecaster.fit_offloaded_with(series, cancel).await?;
        let forecast = model.forecast(horizon_days, true, self.cfg.frequency);
        #[cfg(feature = "tracing")]
        tracing::info!(rows = forecast.len(), sigma = model.sigma(), "forecast ready");
        Ok(ForecastReport {
            instrument: instrument.clone(),
            range,
            horizon_days,
            model,
            forecast,
        })
    }
}
