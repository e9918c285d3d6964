mod common;

use std::sync::Arc;

use augur::{AugurError, CancelFlag, Forecaster, ForecasterConfig, Frequency, SeasonalityConfig};
use chrono::Days;
use common::{d, linear_config, linear_series};

#[test]
fn predict_before_fit_is_not_fitted() {
    let f = Forecaster::new(linear_config()).unwrap();
    assert!(!f.is_fitted());
    assert!(matches!(f.predict(&[d(1, 1)]), Err(AugurError::NotFitted)));
    assert!(matches!(
        f.predict_horizon(10, true, Frequency::CalendarDays),
        Err(AugurError::NotFitted)
    ));
    assert!(matches!(f.model(), Err(AugurError::NotFitted)));
}

#[test]
fn invalid_config_is_rejected_up_front() {
    let err = Forecaster::new(ForecasterConfig::default().with_interval_width(1.5));
    assert!(matches!(err, Err(AugurError::InvalidArg(_))));
}

#[test]
fn linear_uptrend_through_the_state_machine() {
    let f = Forecaster::new(linear_config()).unwrap();
    f.fit(&linear_series(100, 0.5)).unwrap();
    assert!(f.is_fitted());

    let rows = f.predict(&[d(1, 1) + Days::new(99)]).unwrap();
    assert!((rows[0].yhat - 59.5).abs() < 1e-6);
    assert_eq!(rows[0].yhat_lower, rows[0].yhat_upper);

    let forecast = f.predict_horizon(30, true, Frequency::CalendarDays).unwrap();
    assert_eq!(forecast.len(), 130);
    let last = &forecast.tail(1)[0];
    assert_eq!(last.date, d(1, 1) + Days::new(129));
    assert!((last.yhat - 74.5).abs() < 1e-6);
}

#[test]
fn refit_replaces_the_model() {
    let f = Forecaster::new(linear_config()).unwrap();
    let first = f.fit(&linear_series(100, 0.5)).unwrap();
    let second = f.fit(&linear_series(100, 2.0)).unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
    assert!((f.model().unwrap().trend().growth_per_day() - 2.0).abs() < 1e-9);
    // The earlier handle stays valid and unchanged.
    assert!((first.trend().growth_per_day() - 0.5).abs() < 1e-9);
}

#[test]
fn cancelled_refit_keeps_previous_model() {
    let f = Forecaster::new(linear_config()).unwrap();
    let before = f.fit(&linear_series(100, 0.5)).unwrap();

    let cancel = CancelFlag::new();
    cancel.cancel();
    let err = f.fit_cancellable(&linear_series(100, 2.0), &cancel);
    assert!(matches!(err, Err(AugurError::Cancelled)));
    assert!(Arc::ptr_eq(&before, &f.model().unwrap()));
}

#[test]
fn failed_refit_keeps_previous_model() {
    let cfg = linear_config()
        .with_seasonalities(vec![SeasonalityConfig::weekly()])
        .strict_seasonality(true);
    let f = Forecaster::new(cfg).unwrap();
    let before = f.fit(&linear_series(100, 0.5)).unwrap();

    // Five days cannot carry a weekly cycle.
    let err = f.fit(&linear_series(5, 1.0));
    assert!(matches!(err, Err(AugurError::Identifiability { .. })));
    assert!(Arc::ptr_eq(&before, &f.model().unwrap()));
}

#[test]
fn failed_first_fit_stays_unfit() {
    let cancel = CancelFlag::new();
    cancel.cancel();
    let f = Forecaster::new(linear_config()).unwrap();
    assert!(f.fit_cancellable(&linear_series(100, 0.5), &cancel).is_err());
    assert!(!f.is_fitted());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn offloaded_fit_installs_model() {
    let f = Forecaster::new(linear_config()).unwrap();
    let model = f.fit_offloaded(linear_series(100, 0.5)).await.unwrap();
    assert!(f.is_fitted());
    assert!(Arc::ptr_eq(&model, &f.model().unwrap()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn offloaded_fit_observes_cancellation() {
    let f = Forecaster::new(linear_config()).unwrap();
    let cancel = CancelFlag::new();
    cancel.cancel();
    let err = f.fit_offloaded_with(linear_series(100, 0.5), cancel).await;
    assert!(matches!(err, Err(AugurError::Cancelled)));
    assert!(!f.is_fitted());
}

#[test]
fn concurrent_predict_sees_whole_models() {
    let f = Forecaster::new(linear_config()).unwrap();
    let slow = linear_series(100, 0.5);
    let fast = linear_series(100, 2.0);
    f.fit(&slow).unwrap();
    let probe = d(1, 1) + Days::new(100);

    std::thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                for _ in 0..200 {
                    let row = &f.predict(&[probe]).unwrap()[0];
                    let old = (row.yhat - 60.0).abs() < 1e-6;
                    let new = (row.yhat - 210.0).abs() < 1e-6;
                    assert!(old || new, "torn prediction: {}", row.yhat);
                }
            });
        }
        for i in 0..20 {
            let series = if i % 2 == 0 { &fast } else { &slow };
            f.fit(series).unwrap();
        }
    });
}
