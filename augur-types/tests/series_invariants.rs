use augur_types::{
    AugurError, DateRange, InstrumentId, Observation, RawRow, RawSeries, Series, ValueField,
};
use chrono::NaiveDate;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[test]
fn instrument_id_is_canonical() {
    let a = InstrumentId::new(" aapl ").unwrap();
    let b = InstrumentId::new("AAPL").unwrap();
    assert_eq!(a, b);
    assert_eq!(a.as_str(), "AAPL");
    assert!(matches!(InstrumentId::new("  "), Err(AugurError::InvalidArg(_))));
    assert!(matches!(InstrumentId::new("BRK B"), Err(AugurError::InvalidArg(_))));
}

#[test]
fn date_range_is_half_open() {
    let r = DateRange::new(d(2021, 1, 1), d(2021, 1, 31)).unwrap();
    assert!(r.contains(d(2021, 1, 1)));
    assert!(r.contains(d(2021, 1, 30)));
    assert!(!r.contains(d(2021, 1, 31)));
    assert!(DateRange::new(d(2021, 1, 31), d(2021, 1, 31)).is_err());
}

#[test]
fn series_requires_two_increasing_finite_observations() {
    let id = InstrumentId::new("X").unwrap();
    let one = vec![Observation::new(d(2021, 1, 4), 1.0)];
    assert!(matches!(
        Series::new(id.clone(), one),
        Err(AugurError::EmptySeries { remaining: 1 })
    ));

    let unsorted = vec![
        Observation::new(d(2021, 1, 5), 1.0),
        Observation::new(d(2021, 1, 4), 2.0),
    ];
    assert!(matches!(Series::new(id.clone(), unsorted), Err(AugurError::Data(_))));

    let nan = vec![
        Observation::new(d(2021, 1, 4), 1.0),
        Observation::new(d(2021, 1, 5), f64::NAN),
    ];
    assert!(matches!(Series::new(id.clone(), nan), Err(AugurError::Data(_))));

    let ok = Series::new(
        id,
        vec![
            Observation::new(d(2021, 1, 4), 1.0),
            Observation::new(d(2021, 1, 8), 2.0),
        ],
    )
    .unwrap();
    assert_eq!(ok.span_days(), 4);
    assert_eq!(ok.first_date(), d(2021, 1, 4));
    assert_eq!(ok.last_date(), d(2021, 1, 8));
}

#[test]
fn value_field_selection() {
    let row = RawRow {
        date: d(2021, 1, 4),
        open: Some(10.0),
        high: None,
        low: None,
        close: Some(11.0),
        adj_close: None,
        volume: None,
    };
    assert_eq!(ValueField::Close.pick(&row), Some(11.0));
    assert_eq!(ValueField::Open.pick(&row), Some(10.0));
    // adjusted close falls back to close
    assert_eq!(ValueField::AdjClose.pick(&row), Some(11.0));

    let halted = RawRow {
        close: Some(f64::NAN),
        ..row
    };
    assert_eq!(ValueField::Close.pick(&halted), None);
}

#[test]
fn series_converts_back_to_close_rows() {
    let id = InstrumentId::new("X").unwrap();
    let s = Series::new(
        id,
        vec![
            Observation::new(d(2021, 1, 4), 1.0),
            Observation::new(d(2021, 1, 5), 2.0),
        ],
    )
    .unwrap();
    let raw = RawSeries::from(&s);
    assert_eq!(raw.len(), 2);
    assert_eq!(raw.rows[1].close, Some(2.0));
    assert_eq!(raw.instrument.as_str(), "X");
}

#[test]
fn provider_errors_are_classified() {
    assert!(AugurError::provider("p", "boom").is_provider_error());
    assert!(AugurError::not_found("series for X").is_provider_error());
    assert!(AugurError::provider_timeout("p").is_provider_error());
    assert!(!AugurError::NotFitted.is_provider_error());
    assert!(!AugurError::empty_series(0).is_provider_error());
    assert!(AugurError::fit("singular").is_retryable_fit());
}
