//! Joint sparse least-squares fit of trend and seasonality.

use std::ops::Range;

use crate::timeseries::infer::estimate_step_days;
use crate::{AugurError, ForecasterConfig, SeasonalityConfig, Series};

use super::cancel::CancelFlag;
use super::fitted::{DroppedSeasonality, FittedModel};
use super::linalg::solve_spd;
use super::seasonality::{SeasonalComponent, check_identifiable, epoch_day, fourier_terms};
use super::trend::{Changepoint, TimeScale, TrendParameters, place_changepoints};

/// Lower bound on the noise variance (scaled units) used in penalties and the objective.
const SIGMA2_FLOOR: f64 = 1e-8;
/// Lower bound on `|δ|` in the reweighting of the Laplace penalty.
const DELTA_FLOOR: f64 = 1e-6;
/// Residual noise below this fraction of the value scale is reported as zero.
const ZERO_NOISE_RATIO: f64 = 1e-9;

/// Column layout: `[m, k, δ_1..δ_c, seasonal blocks...]`.
struct Design {
    rows: usize,
    cols: usize,
    x: Vec<f64>,
    changepoints: Range<usize>,
    seasonal: Vec<(Range<usize>, f64)>,
}

impl Design {
    fn build(
        ts: &[f64],
        days: &[f64],
        changepoint_t: &[f64],
        seasonalities: &[&SeasonalityConfig],
    ) -> Self {
        let cp_start = 2;
        let cp_end = cp_start + changepoint_t.len();
        let mut seasonal = Vec::with_capacity(seasonalities.len());
        let mut next = cp_end;
        for s in seasonalities {
            let width = 2 * s.harmonic_order;
            seasonal.push((next..next + width, s.prior_scale));
            next += width;
        }
        let cols = next;
        let mut x = Vec::with_capacity(ts.len() * cols);
        for (&t, &day) in ts.iter().zip(days) {
            x.push(1.0);
            x.push(t);
            x.extend(changepoint_t.iter().map(|&s| (t - s).max(0.0)));
            for s in seasonalities {
                fourier_terms(day, s.period_days, s.harmonic_order, &mut x);
            }
        }
        Self {
            rows: ts.len(),
            cols,
            x,
            changepoints: cp_start..cp_end,
            seasonal,
        }
    }

    fn row(&self, i: usize) -> &[f64] {
        &self.x[i * self.cols..(i + 1) * self.cols]
    }

    /// `XᵀX` (row-major) and `Xᵀy`.
    fn normal_equations(&self, y: &[f64]) -> (Vec<f64>, Vec<f64>) {
        let p = self.cols;
        let mut xtx = vec![0.0_f64; p * p];
        let mut xty = vec![0.0_f64; p];
        for (i, &yi) in y.iter().enumerate().take(self.rows) {
            let row = self.row(i);
            for a in 0..p {
                let ra = row[a];
                if ra == 0.0 {
                    continue;
                }
                xty[a] += ra * yi;
                for b in a..p {
                    xtx[a * p + b] += ra * row[b];
                }
            }
        }
        for a in 0..p {
            for b in 0..a {
                xtx[a * p + b] = xtx[b * p + a];
            }
        }
        (xtx, xty)
    }

    fn rss(&self, y: &[f64], beta: &[f64]) -> f64 {
        y.iter()
            .enumerate()
            .map(|(i, &yi)| {
                let fitted: f64 = self.row(i).iter().zip(beta).map(|(x, b)| x * b).sum();
                (yi - fitted).powi(2)
            })
            .sum()
    }
}

struct Solution {
    beta: Vec<f64>,
    rss: f64,
    iterations: usize,
    converged: bool,
}

/// Minimize `RSS/(2σ²) + Σ|δ|/τ + Σβ_s²/(2·prior²) + (n/2)·ln σ²` by
/// iteratively reweighted ridge regression.
///
/// Each iteration majorizes `|δ|` by a quadratic at the current estimate and
/// solves the resulting normal equations; σ² is re-estimated from the residuals.
fn solve_penalized(
    design: &Design,
    y: &[f64],
    tau: f64,
    config: &ForecasterConfig,
    cancel: &CancelFlag,
) -> Result<Solution, AugurError> {
    let (xtx, xty) = design.normal_equations(y);
    let p = design.cols;
    let n = design.rows as f64;
    let mean = y.iter().sum::<f64>() / n;
    let mut sigma2 = (y.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).max(SIGMA2_FLOOR);
    let mut delta_abs = vec![1.0_f64; design.changepoints.len()];
    let mut previous = f64::INFINITY;
    let mut solution: Option<Solution> = None;

    for iteration in 1..=config.max_iterations {
        if cancel.is_cancelled() {
            return Err(AugurError::Cancelled);
        }
        let mut a = xtx.clone();
        for (j, col) in design.changepoints.clone().enumerate() {
            a[col * p + col] += sigma2 / (tau * delta_abs[j].max(DELTA_FLOOR));
        }
        for (block, prior) in &design.seasonal {
            for col in block.clone() {
                a[col * p + col] += sigma2 / (prior * prior);
            }
        }
        let beta = solve_spd(&a, &xty, p)?;
        let rss = design.rss(y, &beta);
        if !rss.is_finite() {
            return Err(AugurError::fit("residual sum of squares is not finite"));
        }
        sigma2 = (rss / n).max(SIGMA2_FLOOR);

        let mut objective = rss / (2.0 * sigma2) + 0.5 * n * sigma2.ln();
        for (j, col) in design.changepoints.clone().enumerate() {
            delta_abs[j] = beta[col].abs();
            objective += delta_abs[j] / tau;
        }
        for (block, prior) in &design.seasonal {
            for col in block.clone() {
                objective += beta[col] * beta[col] / (2.0 * prior * prior);
            }
        }

        let converged = (previous - objective).abs() <= config.tolerance * objective.abs().max(1.0);
        previous = objective;
        solution = Some(Solution {
            beta,
            rss,
            iterations: iteration,
            converged,
        });
        if converged {
            break;
        }
    }
    solution.ok_or_else(|| AugurError::fit("optimizer performed no iterations"))
}

/// Fit trend and seasonality jointly to a normalized series.
///
/// Seasonal components that the series cannot identify are dropped (or fail the
/// fit when `strict_seasonality` is set). Failing to converge within
/// `max_iterations` keeps the last iterate and marks the model as not converged.
///
/// # Errors
/// - `InvalidArg` for an invalid configuration.
/// - `EmptySeries` for fewer than two observations.
/// - `Identifiability` in strict mode.
/// - `Fit` when the normal equations are singular or the solution is not finite.
/// - `Cancelled` when `cancel` is raised before the optimizer finishes.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        name = "augur_core::model::fit",
        skip(series, config, cancel),
        fields(instrument = %series.instrument(), observations = series.len()),
    )
)]
pub fn fit(
    series: &Series,
    config: &ForecasterConfig,
    cancel: &CancelFlag,
) -> Result<FittedModel, AugurError> {
    config.validate()?;
    if series.len() < 2 {
        return Err(AugurError::empty_series(series.len()));
    }
    let scale = TimeScale::from_series(series);
    let span_days = series.span_days();
    let dates: Vec<_> = series.dates().collect();
    let step_days = estimate_step_days(&dates);

    let mut active: Vec<&SeasonalityConfig> = Vec::new();
    let mut dropped = Vec::new();
    for s in &config.seasonalities {
        match check_identifiable(s, span_days, step_days) {
            Ok(()) => active.push(s),
            Err(e) if config.strict_seasonality => return Err(e),
            Err(e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(component = %s.name, period_days = s.period_days, span_days, "dropping unidentifiable seasonality");
                dropped.push(DroppedSeasonality {
                    name: s.name.clone(),
                    period_days: s.period_days,
                    reason: e,
                });
            }
        }
    }

    let tau = config.trend_flexibility;
    let changepoints = if tau > 0.0 {
        place_changepoints(series, &scale, config)
    } else {
        Vec::new()
    };
    let changepoint_t: Vec<f64> = changepoints.iter().map(|(_, t)| *t).collect();

    let ts: Vec<f64> = dates.iter().map(|d| scale.t(*d)).collect();
    let days: Vec<f64> = dates.iter().map(|d| epoch_day(*d)).collect();
    let y: Vec<f64> = series
        .observations()
        .iter()
        .map(|o| o.value / scale.value_scale())
        .collect();

    let design = Design::build(&ts, &days, &changepoint_t, &active);
    let solution = solve_penalized(&design, &y, tau, config, cancel)?;
    if !solution.converged {
        #[cfg(feature = "tracing")]
        tracing::warn!(
            iterations = solution.iterations,
            "trend optimizer reached its iteration cap without converging"
        );
    }

    let beta = &solution.beta;
    let trend = TrendParameters::new(
        scale,
        beta[1],
        beta[0],
        changepoints
            .iter()
            .zip(design.changepoints.clone())
            .map(|((date, t), col)| Changepoint {
                date: *date,
                t: *t,
                delta: beta[col],
            })
            .collect(),
    );
    let seasonalities = active
        .iter()
        .zip(&design.seasonal)
        .map(|(cfg, (block, _))| {
            let coefficients: Vec<f64> = beta[block.clone()]
                .iter()
                .map(|b| b * scale.value_scale())
                .collect();
            SeasonalComponent::from_coefficients(cfg, &coefficients)
        })
        .collect();

    let mut sigma = (solution.rss / design.rows as f64).sqrt() * scale.value_scale();
    if sigma <= ZERO_NOISE_RATIO * scale.value_scale() {
        sigma = 0.0;
    }

    let model = FittedModel::new(
        series.clone(),
        trend,
        seasonalities,
        dropped,
        sigma,
        config,
        solution.iterations,
        solution.converged,
    );
    #[cfg(feature = "tracing")]
    tracing::info!(
        iterations = model.iterations(),
        converged = model.converged(),
        sigma = model.sigma(),
        changepoints = model.trend().changepoints().len(),
        "fit complete"
    );
    Ok(model)
}
