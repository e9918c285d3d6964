use augur_core::{
    AugurError, DateRange, InstrumentId, SeriesProvider, ValueField, normalize, normalize_with,
};
use augur_mock::{MockProvider, SLOW_DELAY};
use chrono::NaiveDate;

fn id(s: &str) -> InstrumentId {
    InstrumentId::new(s).expect("valid id")
}

fn range(a: (i32, u32, u32), b: (i32, u32, u32)) -> DateRange {
    DateRange::new(
        NaiveDate::from_ymd_opt(a.0, a.1, a.2).unwrap(),
        NaiveDate::from_ymd_opt(b.0, b.1, b.2).unwrap(),
    )
    .unwrap()
}

#[tokio::test]
async fn aapl_fixture_is_weekday_only_and_range_filtered() {
    let raw = MockProvider::new()
        .fetch_series(&id("aapl"), range((2020, 1, 1), (2021, 1, 1)))
        .await
        .unwrap();
    assert!(!raw.is_empty());
    assert!(raw.rows.iter().all(|r| r.date.format("%Y").to_string() == "2020"));
    let s = normalize_with(&raw, ValueField::AdjClose).unwrap();
    assert_eq!(s.len(), raw.len());
}

#[tokio::test]
async fn end_date_is_exclusive() {
    let raw = MockProvider::new()
        .fetch_series(&id("LINEAR"), range((2024, 1, 1), (2024, 1, 11)))
        .await
        .unwrap();
    assert_eq!(raw.len(), 10);
}

#[tokio::test]
async fn dups_fixture_normalizes_last_write_wins() {
    let raw = MockProvider::new()
        .fetch_series(&id("DUPS"), range((2024, 1, 1), (2024, 2, 1)))
        .await
        .unwrap();
    let s = normalize(&raw).unwrap();
    let vals: Vec<f64> = s.observations().iter().map(|o| o.value).collect();
    assert_eq!(vals, vec![10.0, 11.0, 13.0, 14.0]);
}

#[tokio::test]
async fn special_instruments() {
    let p = MockProvider::new();
    let r = range((2024, 1, 1), (2025, 1, 1));
    assert!(matches!(
        p.fetch_series(&id("FAIL"), r).await,
        Err(AugurError::Provider { .. })
    ));
    assert!(matches!(
        p.fetch_series(&id("NOPE"), r).await,
        Err(AugurError::NotFound { .. })
    ));
    assert!(p.fetch_series(&id("EMPTY"), r).await.unwrap().is_empty());
    let sparse = p.fetch_series(&id("SPARSE"), r).await.unwrap();
    assert_eq!(normalize(&sparse), Err(AugurError::empty_series(1)));
}

#[tokio::test(start_paused = true)]
async fn slow_fixture_sleeps() {
    let started = tokio::time::Instant::now();
    let raw = MockProvider::new()
        .fetch_series(&id("SLOW"), range((2024, 1, 1), (2024, 5, 1)))
        .await
        .unwrap();
    assert_eq!(raw.len(), 100);
    assert!(started.elapsed() >= SLOW_DELAY);
}
