//! Deterministic series providers and a manual clock for tests and examples.
use async_trait::async_trait;
use augur_core::{AugurError, DateRange, InstrumentId, RawSeries, SeriesProvider};

mod clock;
mod dynamic;
mod fixtures;

pub use clock::ManualClock;
pub use dynamic::{DynamicMockController, DynamicMockProvider, MockBehavior};
pub use fixtures::history::{SLOW_DELAY, fixture_rows};

/// Mock provider for CI-safe examples. Serves deterministic data from static fixtures.
///
/// Special instruments: `FAIL` returns a provider error, `SLOW` answers after
/// [`SLOW_DELAY`], `EMPTY` returns no rows, anything without a fixture is `NotFound`.
pub struct MockProvider;

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockProvider {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SeriesProvider for MockProvider {
    fn name(&self) -> &'static str {
        "augur-mock"
    }

    fn vendor(&self) -> &'static str {
        "Mock"
    }

    async fn fetch_series(
        &self,
        instrument: &InstrumentId,
        range: DateRange,
    ) -> Result<RawSeries, AugurError> {
        match instrument.as_str() {
            "FAIL" => {
                return Err(AugurError::provider(
                    self.name(),
                    "forced failure: fetch_series",
                ));
            }
            "SLOW" => tokio::time::sleep(SLOW_DELAY).await,
            _ => {}
        }
        let rows = fixture_rows(instrument.as_str())
            .ok_or_else(|| AugurError::not_found(format!("series for {instrument}")))?;
        Ok(RawSeries {
            instrument: instrument.clone(),
            rows: rows.into_iter().filter(|r| range.contains(r.date)).collect(),
        })
    }
}
