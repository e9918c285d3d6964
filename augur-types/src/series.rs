//! Observation and series types exchanged between providers, the cache and the model.

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::AugurError;

/// Identifier of a traded instrument (ticker symbol).
///
/// Stored trimmed and upper-cased so that `"aapl "` and `"AAPL"` share one cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstrumentId(String);

impl InstrumentId {
    /// Validate and canonicalize an instrument identifier.
    ///
    /// # Errors
    /// Returns `InvalidArg` when the identifier is empty or contains whitespace.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, AugurError> {
        let s = raw.as_ref().trim();
        if s.is_empty() {
            return Err(AugurError::InvalidArg("instrument id is empty".into()));
        }
        if s.chars().any(char::is_whitespace) {
            return Err(AugurError::InvalidArg(format!(
                "instrument id contains whitespace: {s:?}"
            )));
        }
        Ok(Self(s.to_ascii_uppercase()))
    }

    /// Borrow the canonical identifier string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Half-open calendar range `[start, end)` of a historical query.
///
/// The end date is exclusive, matching how daily history endpoints treat `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Build a range.
    ///
    /// # Errors
    /// Returns `InvalidArg` if `start >= end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, AugurError> {
        if start >= end {
            return Err(AugurError::InvalidArg(format!(
                "date range start {start} must be before end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// First date included in the range.
    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    /// First date after the range.
    #[must_use]
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// Whether `date` falls inside `[start, end)`.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }
}

/// One row as delivered by a historical-series provider.
///
/// Prices are optional because upstream feeds emit nulls for halted sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    /// Trading date.
    pub date: NaiveDate,
    /// Opening price.
    pub open: Option<f64>,
    /// Session high.
    pub high: Option<f64>,
    /// Session low.
    pub low: Option<f64>,
    /// Closing price.
    pub close: Option<f64>,
    /// Close adjusted for splits and dividends.
    pub adj_close: Option<f64>,
    /// Traded volume.
    pub volume: Option<u64>,
}

impl RawRow {
    /// Row carrying only a closing price.
    #[must_use]
    pub const fn close_only(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            open: None,
            high: None,
            low: None,
            close: Some(close),
            adj_close: None,
            volume: None,
        }
    }
}

/// Raw provider output for one instrument over one queried range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSeries {
    /// Instrument the rows belong to.
    pub instrument: InstrumentId,
    /// Rows in provider order; may be unsorted or contain duplicates.
    pub rows: Vec<RawRow>,
}

impl RawSeries {
    /// Number of raw rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the provider returned no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Which price column of a raw row becomes the modeled value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ValueField {
    /// Closing price.
    #[default]
    Close,
    /// Adjusted close; falls back to the close when the row has no adjusted value.
    AdjClose,
    /// Opening price.
    Open,
}

impl ValueField {
    /// Extract the selected value from a row, if present and finite.
    #[must_use]
    pub fn pick(self, row: &RawRow) -> Option<f64> {
        let v = match self {
            Self::Close => row.close,
            Self::AdjClose => row.adj_close.or(row.close),
            Self::Open => row.open,
        }?;
        v.is_finite().then_some(v)
    }
}

/// A single dated value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Calendar date of the observation.
    pub date: NaiveDate,
    /// Observed value.
    pub value: f64,
}

impl Observation {
    /// Convenience constructor.
    #[must_use]
    pub const fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Normalized, immutable training series.
///
/// Invariants: at least two observations, strictly increasing dates, finite values.
/// Cloning is cheap; clones share the same observation buffer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    instrument: InstrumentId,
    observations: Arc<[Observation]>,
}

impl Series {
    /// Build a series from observations that already satisfy the invariants.
    ///
    /// # Errors
    /// - `EmptySeries` when fewer than two observations are given.
    /// - `Data` when dates are not strictly increasing or a value is not finite.
    pub fn new(
        instrument: InstrumentId,
        observations: Vec<Observation>,
    ) -> Result<Self, AugurError> {
        if observations.len() < 2 {
            return Err(AugurError::empty_series(observations.len()));
        }
        for pair in observations.windows(2) {
            if pair[0].date >= pair[1].date {
                return Err(AugurError::Data(format!(
                    "observation dates must be strictly increasing: {} then {}",
                    pair[0].date, pair[1].date
                )));
            }
        }
        if let Some(bad) = observations.iter().find(|o| !o.value.is_finite()) {
            return Err(AugurError::Data(format!(
                "non-finite value at {}",
                bad.date
            )));
        }
        Ok(Self {
            instrument,
            observations: observations.into(),
        })
    }

    /// Instrument the series belongs to.
    #[must_use]
    pub const fn instrument(&self) -> &InstrumentId {
        &self.instrument
    }

    /// Observations in strictly increasing date order.
    #[must_use]
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Number of observations (always at least two).
    #[must_use]
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Always false; kept for API symmetry with collections.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// First observed date.
    #[must_use]
    pub fn first_date(&self) -> NaiveDate {
        self.observations[0].date
    }

    /// Last observed date.
    #[must_use]
    pub fn last_date(&self) -> NaiveDate {
        self.observations[self.observations.len() - 1].date
    }

    /// Calendar days between the first and last observation.
    #[must_use]
    pub fn span_days(&self) -> i64 {
        (self.last_date() - self.first_date()).num_days()
    }

    /// Observed dates in order.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.observations.iter().map(|o| o.date)
    }
}

impl From<&Series> for RawSeries {
    /// Re-express a normalized series as close-only raw rows.
    fn from(series: &Series) -> Self {
        Self {
            instrument: series.instrument.clone(),
            rows: series
                .observations
                .iter()
                .map(|o| RawRow::close_only(o.date, o.value))
                .collect(),
        }
    }
}
