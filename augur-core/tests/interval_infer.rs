use augur_core::estimate_step_days;
use chrono::{Days, NaiveDate};
use proptest::prelude::*;

fn dates_from_offsets(offsets: &[u64]) -> Vec<NaiveDate> {
    let base = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
    offsets.iter().map(|&o| base + Days::new(o)).collect()
}

proptest! {
    #[test]
    fn constant_step_is_recovered(step in 1u64..40, n in 3usize..120, rev in any::<bool>()) {
        let mut offsets: Vec<u64> = (0..n as u64).map(|i| i * step).collect();
        if rev {
            offsets.reverse();
        }
        prop_assert_eq!(estimate_step_days(&dates_from_offsets(&offsets)), Some(step as i64));
    }

    #[test]
    fn duplicates_do_not_change_the_estimate(step in 1u64..10, n in 3usize..60, dup in 0usize..60) {
        let mut offsets: Vec<u64> = (0..n as u64).map(|i| i * step).collect();
        offsets.push(offsets[dup % n]);
        prop_assert_eq!(estimate_step_days(&dates_from_offsets(&offsets)), Some(step as i64));
    }
}

#[test]
fn weekday_calendar_infers_one_day() {
    // Mon..Fri over four weeks: deltas are 1 (x4) and 3 (x1) per week
    let offsets: Vec<u64> = (0..28).filter(|d| d % 7 < 5).collect();
    assert_eq!(estimate_step_days(&dates_from_offsets(&offsets)), Some(1));
}

#[test]
fn single_date_has_no_step() {
    assert_eq!(estimate_step_days(&dates_from_offsets(&[5])), None);
    assert_eq!(estimate_step_days(&dates_from_offsets(&[5, 5])), None);
}
