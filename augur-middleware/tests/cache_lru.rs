mod common;

use augur_mock::MockBehavior;
use augur_types::CacheConfig;
use common::{cache_with, config, id, range, series};

#[tokio::test]
async fn least_recently_used_key_is_evicted() {
    let cfg = CacheConfig {
        max_entries: 2,
        ..config(3600)
    };
    let (cache, controller, _clock) = cache_with(cfg);
    for sym in ["A", "B", "C"] {
        controller
            .set_series_behavior(id(sym), MockBehavior::Return(series(sym)))
            .await;
    }
    cache.get(&id("A"), range(1, 31)).await.unwrap();
    cache.get(&id("B"), range(1, 31)).await.unwrap();
    // touch A so that B becomes the eviction candidate
    cache.get(&id("A"), range(1, 31)).await.unwrap();
    cache.get(&id("C"), range(1, 31)).await.unwrap();
    assert_eq!(cache.len(), 2);

    cache.get(&id("A"), range(1, 31)).await.unwrap();
    cache.get(&id("B"), range(1, 31)).await.unwrap();
    assert_eq!(controller.calls(&id("A")).await, 1);
    assert_eq!(controller.calls(&id("B")).await, 2);
}
