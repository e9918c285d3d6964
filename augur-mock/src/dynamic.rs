use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use augur_core::{AugurError, DateRange, InstrumentId, RawSeries, SeriesProvider};

/// Instruction for how a fetch should behave for a given instrument.
#[derive(Clone, Debug)]
pub enum MockBehavior<T> {
    /// Return the provided value immediately.
    Return(T),
    /// Return the provided value after sleeping (uses `tokio::time`, so paused
    /// test clocks advance through it).
    Delay(Duration, T),
    /// Fail immediately with the provided error.
    Fail(AugurError),
    /// Fail with the provided error after sleeping.
    FailAfter(Duration, AugurError),
    /// Hang indefinitely (simulate a timeout).
    Hang,
}

#[derive(Default)]
struct InternalState {
    /// Queued behaviors per instrument; the last one sticks.
    series_rules: HashMap<InstrumentId, VecDeque<MockBehavior<RawSeries>>>,
    calls: HashMap<InstrumentId, Vec<DateRange>>,
}

/// Controller handle used by tests to drive the dynamic mock from the outside.
pub struct DynamicMockController {
    state: Arc<Mutex<InternalState>>,
}

impl DynamicMockController {
    /// Set the behavior for every subsequent fetch of `instrument`.
    pub async fn set_series_behavior(
        &self,
        instrument: InstrumentId,
        behavior: MockBehavior<RawSeries>,
    ) {
        let mut guard = self.state.lock().await;
        guard
            .series_rules
            .insert(instrument, VecDeque::from([behavior]));
    }

    /// Queue behaviors consumed one per fetch; the last behavior repeats.
    pub async fn set_series_sequence(
        &self,
        instrument: InstrumentId,
        behaviors: Vec<MockBehavior<RawSeries>>,
    ) {
        let mut guard = self.state.lock().await;
        guard.series_rules.insert(instrument, behaviors.into());
    }

    /// Number of fetches observed for `instrument`.
    pub async fn calls(&self, instrument: &InstrumentId) -> usize {
        let guard = self.state.lock().await;
        guard.calls.get(instrument).map_or(0, Vec::len)
    }

    /// Ranges requested for `instrument`, in call order.
    pub async fn requested_ranges(&self, instrument: &InstrumentId) -> Vec<DateRange> {
        let guard = self.state.lock().await;
        guard.calls.get(instrument).cloned().unwrap_or_default()
    }

    /// Clear all configured behaviors and call logs.
    pub async fn clear_all_behaviors(&self) {
        let mut guard = self.state.lock().await;
        guard.series_rules.clear();
        guard.calls.clear();
    }
}

/// A provider that defers all behavior to an external controller.
pub struct DynamicMockProvider {
    name: &'static str,
    state: Arc<Mutex<InternalState>>,
}

impl DynamicMockProvider {
    /// Create a new dynamic mock provider and its controller.
    #[must_use]
    pub fn new_with_controller(
        name: &'static str,
    ) -> (Arc<dyn SeriesProvider>, DynamicMockController) {
        let state = Arc::new(Mutex::new(InternalState::default()));
        let controller = DynamicMockController {
            state: Arc::clone(&state),
        };
        let me = Arc::new(Self { name, state });
        (me as Arc<dyn SeriesProvider>, controller)
    }
}

#[async_trait]
impl SeriesProvider for DynamicMockProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    fn vendor(&self) -> &'static str {
        "DynamicMock"
    }

    async fn fetch_series(
        &self,
        instrument: &InstrumentId,
        range: DateRange,
    ) -> Result<RawSeries, AugurError> {
        // Acquire behavior snapshot without holding the lock across await points
        let behavior = {
            let mut guard = self.state.lock().await;
            guard
                .calls
                .entry(instrument.clone())
                .or_default()
                .push(range);
            guard.series_rules.get_mut(instrument).and_then(|queue| {
                if queue.len() > 1 {
                    queue.pop_front()
                } else {
                    queue.front().cloned()
                }
            })
        };

        match behavior {
            Some(MockBehavior::Return(series)) => Ok(series),
            Some(MockBehavior::Delay(by, series)) => {
                tokio::time::sleep(by).await;
                Ok(series)
            }
            Some(MockBehavior::Fail(e)) => Err(e),
            Some(MockBehavior::FailAfter(by, e)) => {
                tokio::time::sleep(by).await;
                Err(e)
            }
            Some(MockBehavior::Hang) => {
                std::future::pending::<()>().await;
                unreachable!()
            }
            None => Err(AugurError::not_found(format!(
                "dynamic mock: no behavior set for {instrument}"
            ))),
        }
    }
}
