//! augur-core
//!
//! Core traits, types, and numerics shared across the augur workspace.
//!
//! - `types`: re-exported DTOs, configuration and the unified error.
//! - `connector`: the `SeriesProvider` trait implemented by historical-series sources.
//! - `clock`: the time source used for cache freshness.
//! - `timeseries`: normalization of raw provider rows into a training series.
//! - `model`: the piecewise-linear trend, Fourier seasonality, the joint sparse
//!   least-squares fit and prediction with uncertainty bounds.
//!
//! Fitting is synchronous and CPU-bound; callers that run inside an async runtime
//! should offload it (the `augur` crate does so with `spawn_blocking`). A fitted
//! model is immutable and `predict` is a pure function of the model and the dates.
#![warn(missing_docs)]

/// Time source abstraction.
pub mod clock;
/// Historical-series provider trait.
pub mod connector;
/// Trend, seasonality, joint fit and prediction.
pub mod model;
/// Series normalization and cadence inference.
pub mod timeseries;
pub mod types;

pub use clock::{Clock, SystemClock};
pub use connector::SeriesProvider;
pub use model::{
    CancelFlag, Changepoint, DroppedSeasonality, FittedModel, Harmonic, SeasonalComponent,
    TimeScale, TrendParameters, epoch_day, fit, normal_quantile,
};
pub use timeseries::infer::estimate_step_days;
pub use timeseries::normalize::{normalize, normalize_observations, normalize_with};
pub use types::*;
