use std::sync::{Arc, OnceLock};

use augur_core::{
    CancelFlag, FittedModel, ForecasterConfig, Frequency, InstrumentId, Observation,
    SeasonalityConfig, Series, fit,
};
use chrono::{Days, NaiveDate};
use proptest::prelude::*;

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2019, 1, 1).unwrap()
}

/// Deterministic pseudo-noise in [-0.5, 0.5).
fn jitter(i: usize) -> f64 {
    ((i as f64 * 12.9898).sin() * 43_758.545_3).fract().abs() - 0.5
}

fn noisy_series() -> Series {
    let obs = (0..800)
        .map(|i| {
            let x = i as f64;
            let trend = if i < 400 { 50.0 + 0.05 * x } else { 70.0 - 0.02 * (x - 400.0) };
            let yearly = 4.0 * (std::f64::consts::TAU * x / 365.25).cos();
            Observation::new(start() + Days::new(i as u64), trend + yearly + jitter(i))
        })
        .collect();
    Series::new(InstrumentId::new("NOISY").unwrap(), obs).unwrap()
}

fn model() -> Arc<FittedModel> {
    static MODEL: OnceLock<Arc<FittedModel>> = OnceLock::new();
    MODEL
        .get_or_init(|| {
            let cfg = ForecasterConfig::default()
                .with_seasonalities(vec![
                    SeasonalityConfig::weekly(),
                    SeasonalityConfig::new("yearly", 365.25, 6),
                ])
                .with_uncertainty_samples(300)
                .with_random_seed(7);
            Arc::new(fit(&noisy_series(), &cfg, &CancelFlag::new()).unwrap())
        })
        .clone()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn seasonal_components_repeat_every_period(day in -20_000.0f64..40_000.0) {
        for s in model().seasonalities() {
            let a = s.value_at_day(day);
            let b = s.value_at_day(day + s.period_days());
            prop_assert!((a - b).abs() < 1e-6, "{}: {} vs {}", s.name(), a, b);
        }
    }

    #[test]
    fn trend_is_continuous_at_every_changepoint(idx in 0usize..25, eps in 1e-12f64..1e-9) {
        let m = model();
        let trend = m.trend();
        let cps = trend.changepoints();
        prop_assume!(!cps.is_empty());
        let c = cps[idx % cps.len()];
        prop_assert!((trend.evaluate(c.t - eps) - trend.evaluate(c.t + eps)).abs() < 1e-6);
    }

    #[test]
    fn predict_is_a_pure_function_of_dates(offsets in proptest::collection::vec(0u64..1500, 1..40)) {
        let dates: Vec<NaiveDate> = offsets.iter().map(|&o| start() + Days::new(o)).collect();
        let m = model();
        prop_assert_eq!(m.predict(&dates), m.predict(&dates));
    }

    #[test]
    fn rows_decompose_additively(offset in 0u64..2000) {
        let row = &model().predict(&[start() + Days::new(offset)])[0];
        prop_assert!((row.trend + row.additive_terms() - row.yhat).abs() < 1e-9);
        prop_assert!(row.yhat_lower <= row.yhat && row.yhat <= row.yhat_upper);
        prop_assert!(row.trend_lower <= row.trend && row.trend <= row.trend_upper);
    }
}

#[test]
fn interval_never_narrows_beyond_training_end() {
    let m = model();
    let forecast = m.forecast(365, true, Frequency::CalendarDays);
    let end = m.training_end();
    let in_range_width = forecast
        .rows
        .iter()
        .filter(|r| r.date <= end)
        .map(|r| r.interval_width())
        .fold(0.0_f64, f64::max);
    let future: Vec<f64> = forecast
        .rows
        .iter()
        .filter(|r| r.date > end)
        .map(|r| r.interval_width())
        .collect();
    assert_eq!(future.len(), 365);
    assert!(future[0] >= in_range_width - 1e-12);
    assert!(future.windows(2).all(|w| w[1] >= w[0]));
    assert!(future[364] > future[0]);
}

#[test]
fn prediction_order_follows_input_and_ignores_neighbours() {
    let m = model();
    let a = start() + Days::new(900);
    let b = start() + Days::new(1200);
    let both = m.predict(&[b, a]);
    assert_eq!(both[0].date, b);
    assert_eq!(both[1].date, a);
    // the band at a date does not depend on which other dates are requested
    let alone = m.predict(&[a]);
    assert_eq!(alone[0], both[1]);
}

#[test]
fn in_sample_predictions_track_observations() {
    let m = model();
    let series = noisy_series();
    let dates: Vec<NaiveDate> = series.dates().collect();
    let rows = m.predict(&dates);
    let sigma = m.sigma();
    assert!(sigma > 0.1 && sigma < 0.8, "sigma = {sigma}");
    for (row, obs) in rows.iter().zip(series.observations()) {
        assert!((row.yhat - obs.value).abs() <= 4.0 * sigma);
        assert_eq!(row.trend_lower, row.trend);
    }
}

#[test]
fn same_seed_same_band_different_seed_different_band() {
    let series = noisy_series();
    let base = ForecasterConfig::default()
        .with_seasonalities(vec![])
        .with_uncertainty_samples(200);
    let m1 = fit(&series, &base.clone().with_random_seed(1), &CancelFlag::new()).unwrap();
    let m1b = fit(&series, &base.clone().with_random_seed(1), &CancelFlag::new()).unwrap();
    let m2 = fit(&series, &base.with_random_seed(2), &CancelFlag::new()).unwrap();
    let d = [start() + Days::new(1100)];
    assert_eq!(m1.predict(&d), m1b.predict(&d));
    assert_ne!(m1.predict(&d)[0].yhat_upper, m2.predict(&d)[0].yhat_upper);
    assert_eq!(m1.predict(&d)[0].yhat, m2.predict(&d)[0].yhat);
}

#[test]
fn distant_sparse_dates_keep_a_monotone_independent_band() {
    let m = model();
    let end = m.training_end();
    let far = NaiveDate::from_ymd_opt(2200, 1, 1).unwrap();
    let dates = [
        end + Days::new(30),
        end + Days::new(900),
        end + Days::new(20_000),
        far,
    ];
    let rows = m.predict(&dates);
    let widths: Vec<f64> = rows.iter().map(|r| r.interval_width()).collect();
    assert!(widths.iter().all(|w| w.is_finite()));
    assert!(widths.windows(2).all(|w| w[1] >= w[0]), "{widths:?}");
    assert!(widths[3] > widths[0]);
    assert_eq!(m.predict(&[far])[0], rows[3]);
    assert_eq!(m.predict(&[dates[1]])[0], rows[1]);
}
