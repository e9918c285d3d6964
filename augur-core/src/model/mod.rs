//! Trend + seasonality decomposition model.
//!
//! The model is `y(t) = g(t) + Σ s_i(t) + ε` with a piecewise-linear trend `g`
//! and Fourier seasonal terms `s_i`, fitted jointly by penalized least squares.

mod cancel;
mod fit;
mod fitted;
mod linalg;
/// Fourier seasonal components.
pub mod seasonality;
/// Piecewise-linear trend.
pub mod trend;
mod uncertainty;

pub use cancel::CancelFlag;
pub use fit::fit;
pub use fitted::{DroppedSeasonality, FittedModel};
pub use seasonality::{Harmonic, SeasonalComponent, epoch_day};
pub use trend::{Changepoint, TimeScale, TrendParameters};
pub use uncertainty::normal_quantile;
