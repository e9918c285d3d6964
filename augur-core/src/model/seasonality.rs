//! Fourier-series seasonal components.

use std::f64::consts::TAU;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::{AugurError, SeasonalityConfig};

/// `num_days_from_ce` of 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Days since 1970-01-01.
///
/// Seasonal phases are anchored to this absolute origin, so they do not depend
/// on where the training range starts.
#[must_use]
pub fn epoch_day(date: NaiveDate) -> f64 {
    f64::from(date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE)
}

/// Append `cos(2πk·d/P), sin(2πk·d/P)` for `k = 1..=order` to `out`.
pub(crate) fn fourier_terms(day: f64, period_days: f64, order: usize, out: &mut Vec<f64>) {
    for k in 1..=order {
        let x = TAU * k as f64 * day / period_days;
        out.push(x.cos());
        out.push(x.sin());
    }
}

/// One harmonic of a fitted component, in value units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Harmonic {
    /// Harmonic index `k` (1-based).
    pub order: usize,
    /// Cosine coefficient.
    pub cos: f64,
    /// Sine coefficient.
    pub sin: f64,
}

impl Harmonic {
    /// `sqrt(cos² + sin²)`.
    #[must_use]
    pub fn amplitude(&self) -> f64 {
        self.cos.hypot(self.sin)
    }

    /// Phase `φ` in radians such that the harmonic equals `A·cos(x − φ)`.
    #[must_use]
    pub fn phase(&self) -> f64 {
        self.sin.atan2(self.cos)
    }
}

/// A fitted seasonal component.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonalComponent {
    name: String,
    period_days: f64,
    harmonics: Vec<Harmonic>,
}

impl SeasonalComponent {
    /// Build from interleaved `[cos1, sin1, cos2, sin2, ...]` coefficients in value units.
    pub(crate) fn from_coefficients(config: &SeasonalityConfig, coefficients: &[f64]) -> Self {
        let harmonics = coefficients
            .chunks_exact(2)
            .enumerate()
            .map(|(i, pair)| Harmonic {
                order: i + 1,
                cos: pair[0],
                sin: pair[1],
            })
            .collect();
        Self {
            name: config.name.clone(),
            period_days: config.period_days,
            harmonics,
        }
    }

    /// Component name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Period in days.
    #[must_use]
    pub const fn period_days(&self) -> f64 {
        self.period_days
    }

    /// Fitted harmonics in increasing order.
    #[must_use]
    pub fn harmonics(&self) -> &[Harmonic] {
        &self.harmonics
    }

    /// Contribution at a fractional day offset from 1970-01-01.
    #[must_use]
    pub fn value_at_day(&self, day: f64) -> f64 {
        self.harmonics
            .iter()
            .map(|h| {
                let x = TAU * h.order as f64 * day / self.period_days;
                h.cos.mul_add(x.cos(), h.sin * x.sin())
            })
            .sum()
    }

    /// Contribution at a calendar date.
    #[must_use]
    pub fn value(&self, date: NaiveDate) -> f64 {
        self.value_at_day(epoch_day(date))
    }
}

/// Check that a component can be estimated from the training data.
///
/// The span must cover at least one full period and the typical observation
/// step must be shorter than the period.
pub(crate) fn check_identifiable(
    config: &SeasonalityConfig,
    span_days: i64,
    step_days: Option<i64>,
) -> Result<(), AugurError> {
    let span_too_short = (span_days as f64) < config.period_days;
    let too_coarse = step_days.is_some_and(|s| s as f64 >= config.period_days);
    if span_too_short || too_coarse {
        return Err(AugurError::identifiability(
            config.name.clone(),
            config.period_days,
            span_days,
        ));
    }
    Ok(())
}
