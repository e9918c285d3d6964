use augur_core::{
    AugurError, InstrumentId, Observation, RawRow, RawSeries, ValueField, normalize,
    normalize_observations, normalize_with,
};
use chrono::{Days, NaiveDate};
use proptest::prelude::*;

fn base() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
}

fn arb_row() -> impl Strategy<Value = RawRow> {
    (
        0u64..400,
        prop_oneof![
            8 => (1.0f64..1000.0).prop_map(Some),
            1 => Just(None),
            1 => Just(Some(f64::NAN)),
        ],
    )
        .prop_map(|(offset, close)| RawRow {
            date: base() + Days::new(offset),
            open: None,
            high: None,
            low: None,
            close,
            adj_close: None,
            volume: None,
        })
}

fn raw(rows: Vec<RawRow>) -> RawSeries {
    RawSeries {
        instrument: InstrumentId::new("PROP").unwrap(),
        rows,
    }
}

proptest! {
    #[test]
    fn normalize_is_idempotent(rows in proptest::collection::vec(arb_row(), 0..200)) {
        match normalize(&raw(rows)) {
            Ok(once) => {
                let twice = normalize(&RawSeries::from(&once)).unwrap();
                prop_assert_eq!(once, twice);
            }
            Err(e) => {
                let is_short_series = matches!(e, AugurError::EmptySeries { remaining } if remaining < 2);
                prop_assert!(is_short_series)
            }
        }
    }

    #[test]
    fn output_is_strictly_increasing_and_finite(rows in proptest::collection::vec(arb_row(), 2..200)) {
        if let Ok(s) = normalize(&raw(rows)) {
            prop_assert!(s.observations().windows(2).all(|w| w[0].date < w[1].date));
            prop_assert!(s.observations().iter().all(|o| o.value.is_finite()));
        }
    }

    #[test]
    fn last_duplicate_wins(rows in proptest::collection::vec(arb_row(), 2..120)) {
        if let Ok(s) = normalize(&raw(rows.clone())) {
            for o in s.observations() {
                let last = rows
                    .iter()
                    .rev()
                    .find(|r| r.date == o.date && r.close.is_some_and(f64::is_finite))
                    .and_then(|r| r.close);
                prop_assert_eq!(Some(o.value), last);
            }
        }
    }

    #[test]
    fn row_order_does_not_matter_without_duplicates(offsets in proptest::collection::btree_set(0u64..1000, 2..100)) {
        let rows: Vec<RawRow> = offsets
            .iter()
            .map(|&o| RawRow::close_only(base() + Days::new(o), o as f64 + 1.0))
            .collect();
        let mut reversed = rows.clone();
        reversed.reverse();
        prop_assert_eq!(normalize(&raw(rows)).unwrap(), normalize(&raw(reversed)).unwrap());
    }
}

#[test]
fn adj_close_falls_back_to_close() {
    let mut with_adj = RawRow::close_only(base(), 10.0);
    with_adj.adj_close = Some(9.5);
    let plain = RawRow::close_only(base() + Days::new(1), 11.0);
    let s = normalize_with(&raw(vec![with_adj, plain]), ValueField::AdjClose).unwrap();
    let vals: Vec<f64> = s.observations().iter().map(|o| o.value).collect();
    assert_eq!(vals, vec![9.5, 11.0]);
}

#[test]
fn open_field_without_open_prices_is_empty() {
    let rows = vec![
        RawRow::close_only(base(), 1.0),
        RawRow::close_only(base() + Days::new(1), 2.0),
    ];
    assert_eq!(
        normalize_with(&raw(rows), ValueField::Open),
        Err(AugurError::empty_series(0))
    );
}

#[test]
fn observations_entry_point_drops_infinities() {
    let obs = vec![
        Observation::new(base(), 1.0),
        Observation::new(base() + Days::new(1), f64::INFINITY),
        Observation::new(base() + Days::new(2), 3.0),
    ];
    let s = normalize_observations(InstrumentId::new("x").unwrap(), obs).unwrap();
    assert_eq!(s.len(), 2);
    assert_eq!(s.instrument().as_str(), "X");
}
