use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::{AugurError, InstrumentId, Observation, RawSeries, Series, ValueField};

/// Normalize raw provider rows using the closing price.
///
/// See [`normalize_with`].
///
/// # Errors
/// Returns `EmptySeries` if fewer than two usable observations remain.
pub fn normalize(raw: &RawSeries) -> Result<Series, AugurError> {
    normalize_with(raw, ValueField::Close)
}

/// Normalize raw provider rows into a training series.
///
/// - The value is taken from `field`; rows where it is missing or non-finite are dropped.
/// - Rows are keyed by date; the last appearance in provider order wins for duplicates.
/// - Output is sorted by date.
///
/// Normalizing the rows of an already normalized series yields the same series.
///
/// # Errors
/// Returns `EmptySeries` if fewer than two usable observations remain.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        name = "augur_core::timeseries::normalize",
        skip(raw),
        fields(instrument = %raw.instrument, rows = raw.rows.len(), field = ?field),
    )
)]
pub fn normalize_with(raw: &RawSeries, field: ValueField) -> Result<Series, AugurError> {
    let observations = raw
        .rows
        .iter()
        .filter_map(|row| field.pick(row).map(|v| Observation::new(row.date, v)));
    normalize_observations(raw.instrument.clone(), observations)
}

/// Sort, de-duplicate (last write wins) and filter non-finite observations.
///
/// # Errors
/// Returns `EmptySeries` if fewer than two observations remain.
pub fn normalize_observations<I>(
    instrument: InstrumentId,
    observations: I,
) -> Result<Series, AugurError>
where
    I: IntoIterator<Item = Observation>,
{
    let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    let mut dropped = 0usize;
    for o in observations {
        if o.value.is_finite() {
            by_date.insert(o.date, o.value);
        } else {
            dropped += 1;
        }
    }
    if dropped > 0 {
        #[cfg(feature = "tracing")]
        tracing::debug!(%instrument, dropped, "dropped non-finite observations");
    }
    let observations: Vec<Observation> = by_date
        .into_iter()
        .map(|(date, value)| Observation::new(date, value))
        .collect();
    if observations.len() < 2 {
        return Err(AugurError::empty_series(observations.len()));
    }
    Series::new(instrument, observations)
}
