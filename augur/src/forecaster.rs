use std::sync::{Arc, PoisonError, RwLock};

use augur_core::{
    AugurError, CancelFlag, Forecast, ForecastRow, ForecasterConfig, FittedModel, Frequency,
    Series,
};
use chrono::NaiveDate;

/// Fit-then-predict state machine around one configuration.
///
/// States are `Unfit` and `Fit`. Re-fitting swaps the whole model in one step, so a
/// concurrent `predict` sees either the previous model or the new one. A fit that
/// fails or is cancelled leaves the previous state untouched.
pub struct Forecaster {
    cfg: ForecasterConfig,
    state: RwLock<Option<Arc<FittedModel>>>,
}

/// Raises the flag if the awaiting future is dropped before the fit returns.
struct CancelOnDrop(Option<CancelFlag>);

impl CancelOnDrop {
    fn disarm(&mut self) {
        self.0 = None;
    }
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        if let Some(flag) = self.0.take() {
            flag.cancel();
        }
    }
}

impl Forecaster {
    /// Unfit forecaster.
    ///
    /// # Errors
    /// Returns `InvalidArg` if `cfg` fails validation.
    pub fn new(cfg: ForecasterConfig) -> Result<Self, AugurError> {
        cfg.validate()?;
        Ok(Self {
            cfg,
            state: RwLock::new(None),
        })
    }

    /// Configuration every fit uses.
    #[must_use]
    pub const fn config(&self) -> &ForecasterConfig {
        &self.cfg
    }

    /// Whether a model is installed.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// The installed model.
    ///
    /// # Errors
    /// Returns `NotFitted` before the first successful fit.
    pub fn model(&self) -> Result<Arc<FittedModel>, AugurError> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(AugurError::NotFitted)
    }

    fn install(&self, model: FittedModel) -> Arc<FittedModel> {
        let model = Arc::new(model);
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&model));
        model
    }

    /// Fit on the calling thread and install the result.
    ///
    /// # Errors
    /// `EmptySeries`, `Identifiability` (strict mode) or `Fit`; on error the
    /// previous model stays installed.
    pub fn fit(&self, series: &Series) -> Result<Arc<FittedModel>, AugurError> {
        self.fit_cancellable(series, &CancelFlag::new())
    }

    /// Like [`Forecaster::fit`], polling `cancel` between optimizer iterations.
    ///
    /// # Errors
    /// As [`Forecaster::fit`], plus `Cancelled`.
    pub fn fit_cancellable(
        &self,
        series: &Series,
        cancel: &CancelFlag,
    ) -> Result<Arc<FittedModel>, AugurError> {
        let model = augur_core::fit(series, &self.cfg, cancel)?;
        Ok(self.install(model))
    }

    /// Fit on the blocking thread pool so the async caller is not stalled.
    ///
    /// # Errors
    /// As [`Forecaster::fit`], or `Other` if the worker task panicked.
    pub async fn fit_offloaded(&self, series: Series) -> Result<Arc<FittedModel>, AugurError> {
        self.fit_offloaded_with(series, CancelFlag::new()).await
    }

    /// Offloaded fit observing `cancel`. Dropping the returned future raises
    /// `cancel` so the worker stops at its next iteration.
    ///
    /// # Errors
    /// As [`Forecaster::fit_cancellable`], or `Other` if the worker task panicked.
    pub async fn fit_offloaded_with(
        &self,
        series: Series,
        cancel: CancelFlag,
    ) -> Result<Arc<FittedModel>, AugurError> {
        let cfg = self.cfg.clone();
        let mut guard = CancelOnDrop(Some(cancel.clone()));
        let joined =
            tokio::task::spawn_blocking(move || augur_core::fit(&series, &cfg, &cancel)).await;
        guard.disarm();
        let model = joined.map_err(|e| AugurError::Other(format!("fit task failed: {e}")))??;
        Ok(self.install(model))
    }

    /// Evaluate the installed model at `dates`, in input order.
    ///
    /// # Errors
    /// Returns `NotFitted` before the first successful fit.
    pub fn predict(&self, dates: &[NaiveDate]) -> Result<Vec<ForecastRow>, AugurError> {
        Ok(self.model()?.predict(dates))
    }

    /// Predict over the training dates (optional) plus `horizon_days` calendar
    /// days after the last one.
    ///
    /// # Errors
    /// Returns `NotFitted` before the first successful fit.
    pub fn predict_horizon(
        &self,
        horizon_days: u32,
        include_history: bool,
        frequency: Frequency,
    ) -> Result<Forecast, AugurError> {
        Ok(self
            .model()?
            .forecast(horizon_days, include_history, frequency))
    }
}
