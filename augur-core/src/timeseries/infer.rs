use chrono::NaiveDate;

/// Estimate a representative step (in days) from positive adjacent deltas of
/// the given dates.
///
/// Prefer the mode (most frequent positive delta); if there is no unique mode,
/// return the lower median.
///
/// Unique mode (1 day):
///
/// ```
/// use augur_core::estimate_step_days;
/// use chrono::NaiveDate;
///
/// let d = |day: u32| NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
/// // Adjacent deltas: 1,1,1,3,1  => unique mode is 1
/// let dates = vec![d(1), d(2), d(3), d(4), d(7), d(8)];
/// assert_eq!(estimate_step_days(&dates), Some(1));
/// ```
///
/// No unique mode: fall back to lower median (7 days):
///
/// ```
/// use augur_core::estimate_step_days;
/// use chrono::NaiveDate;
///
/// let d = |m: u32, day: u32| NaiveDate::from_ymd_opt(2024, m, day).unwrap();
/// // Adjacent deltas: 7,7,14,14  => lower median is 7
/// let dates = vec![d(1, 1), d(1, 8), d(1, 15), d(1, 29), d(2, 12)];
/// assert_eq!(estimate_step_days(&dates), Some(7));
/// ```
///
/// The step decides which seasonal cycles a series can identify: samples taken
/// once per period or less often see a cycle at a single phase, so the fit drops
/// such a component (or rejects it in strict mode).
///
/// The input order does not matter; duplicates are ignored. Returns `None` if
/// fewer than two distinct dates are present.
#[must_use]
pub fn estimate_step_days(dates: &[NaiveDate]) -> Option<i64> {
    let mut sorted = dates.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    if sorted.len() < 2 {
        return None;
    }
    let mut deltas: Vec<i64> = sorted
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).num_days())
        .collect();
    deltas.sort_unstable();

    let runs: Vec<(i64, usize)> = deltas
        .chunk_by(|a, b| a == b)
        .map(|run| (run[0], run.len()))
        .collect();
    let top = runs.iter().map(|(_, n)| *n).max()?;
    let mut modes = runs.iter().filter(|(_, n)| *n == top);
    match (modes.next(), modes.next()) {
        (Some((step, _)), None) => Some(*step),
        _ => Some(deltas[(deltas.len() - 1) / 2]),
    }
}
