//! Forecast interval construction: residual noise quantiles and simulated trend futures.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::trend::TrendParameters;

/// Per-path seed stride (golden-ratio increment) so paths draw independent streams.
const PATH_SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// Inverse of the standard normal CDF (Acklam's rational approximation,
/// relative error below 1.2e-9).
///
/// Returns `±∞` at `p = 0`/`p = 1` and NaN outside `[0, 1]`.
#[must_use]
pub fn normal_quantile(p: f64) -> f64 {
    const A: [f64; 6] = [
        -3.969_683_028_665_376e1,
        2.209_460_984_245_205e2,
        -2.759_285_104_469_687e2,
        1.383_577_518_672_690e2,
        -3.066_479_806_614_716e1,
        2.506_628_277_459_239,
    ];
    const B: [f64; 5] = [
        -5.447_609_879_822_406e1,
        1.615_858_368_580_409e2,
        -1.556_989_798_598_866e2,
        6.680_131_188_771_972e1,
        -1.328_068_155_288_572e1,
    ];
    const C: [f64; 6] = [
        -7.784_894_002_430_293e-3,
        -3.223_964_580_411_365e-1,
        -2.400_758_277_161_838,
        -2.549_732_539_343_734,
        4.374_664_141_464_968,
        2.938_163_982_698_783,
    ];
    const D: [f64; 4] = [
        7.784_695_709_041_462e-3,
        3.224_671_290_700_398e-1,
        2.445_134_137_142_996,
        3.754_408_661_907_416,
    ];
    const P_LOW: f64 = 0.024_25;

    if p.is_nan() || !(0.0..=1.0).contains(&p) {
        return f64::NAN;
    }
    if p == 0.0 {
        return f64::NEG_INFINITY;
    }
    if p == 1.0 {
        return f64::INFINITY;
    }
    let tail = |q: f64| {
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    };
    if p < P_LOW {
        tail((-2.0 * p.ln()).sqrt())
    } else if p <= 1.0 - P_LOW {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        -tail((-2.0 * (1.0 - p).ln()).sqrt())
    }
}

/// Settings of the trend-future simulation.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Simulation {
    pub samples: usize,
    pub interval_width: f64,
    pub seed: u64,
}

/// Lower and upper trend half-widths (value units) for each future scaled time.
///
/// `future_t` must be sorted ascending and lie beyond the training range (`t > 1`).
/// Each width is a running maximum over the preceding entries, so callers pass a
/// gap-free grid when a width must not depend on which other dates are queried.
/// New changepoints arrive as a Poisson process with the fitted changepoint
/// density per unit of scaled time; their deltas are Laplace distributed with
/// the mean absolute fitted delta as scale. Per-date quantiles of the simulated
/// deviation are turned into non-decreasing half-widths.
pub(crate) fn trend_half_widths(
    trend: &TrendParameters,
    sim: Simulation,
    future_t: &[f64],
) -> Vec<(f64, f64)> {
    let mut widths = vec![(0.0, 0.0); future_t.len()];
    let rate = trend.changepoints().len() as f64;
    let scale = trend.mean_abs_delta();
    let Some(&horizon) = future_t.last() else {
        return widths;
    };
    if sim.samples == 0 || rate <= 0.0 || scale <= 0.0 {
        return widths;
    }

    let mut paths: Vec<PathState> = (0..sim.samples)
        .map(|i| {
            let mut rng = StdRng::seed_from_u64(
                sim.seed
                    .wrapping_add((i as u64).wrapping_mul(PATH_SEED_STRIDE)),
            );
            let mut events = Vec::new();
            let mut at = 1.0;
            loop {
                let u: f64 = rng.random_range(f64::EPSILON..1.0);
                at += -u.ln() / rate;
                if at >= horizon {
                    break;
                }
                events.push((at, laplace(&mut rng, scale)));
            }
            PathState::new(events)
        })
        .collect();

    let lo_q = (1.0 - sim.interval_width) / 2.0;
    let hi_q = 1.0 - lo_q;
    let value_scale = trend.scale().value_scale();
    let (mut run_lo, mut run_hi) = (0.0_f64, 0.0_f64);
    let mut column = vec![0.0_f64; paths.len()];
    for (&t, width) in future_t.iter().zip(widths.iter_mut()) {
        for (path, dev) in paths.iter_mut().zip(column.iter_mut()) {
            *dev = path.deviation_at(t);
        }
        column.sort_unstable_by(f64::total_cmp);
        let lo = quantile_sorted(&column, lo_q);
        let hi = quantile_sorted(&column, hi_q);
        run_lo = run_lo.max(-lo * value_scale);
        run_hi = run_hi.max(hi * value_scale);
        *width = (run_lo, run_hi);
    }
    widths
}

/// One simulated future: changepoint events and running sums for ascending queries.
struct PathState {
    events: Vec<(f64, f64)>,
    next: usize,
    sum_delta: f64,
    sum_delta_at: f64,
}

impl PathState {
    const fn new(events: Vec<(f64, f64)>) -> Self {
        Self {
            events,
            next: 0,
            sum_delta: 0.0,
            sum_delta_at: 0.0,
        }
    }

    /// `Σ_{s < t} δ·(t − s)`; `t` must not decrease between calls.
    fn deviation_at(&mut self, t: f64) -> f64 {
        while let Some(&(at, delta)) = self.events.get(self.next) {
            if at >= t {
                break;
            }
            self.sum_delta += delta;
            self.sum_delta_at += delta * at;
            self.next += 1;
        }
        self.sum_delta.mul_add(t, -self.sum_delta_at)
    }
}

/// Laplace(0, b) draw by inverse CDF.
fn laplace<R: Rng>(rng: &mut R, b: f64) -> f64 {
    let u: f64 = rng.random_range(f64::EPSILON..1.0);
    if u < 0.5 {
        b * (2.0 * u).ln()
    } else {
        -b * (2.0 * (1.0 - u)).ln()
    }
}

/// Linear-interpolated quantile of an ascending slice.
fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}
