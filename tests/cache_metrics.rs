use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use metrics_util::debugging::DebuggingRecorder;

use beststories::application::repos::{RepoError, StoriesRepo};
use beststories::application::stories::{StoryService, StoryServiceSettings};
use beststories::cache::{CacheConfig, StoryStore};
use beststories::domain::stories::{Story, StoryCount, StoryId};
use beststories::infra::cache_warmer::CacheWarmer;

struct FlakyRepo;

#[async_trait]
impl StoriesRepo for FlakyRepo {
    async fn best_story_ids(&self) -> Result<Vec<StoryId>, RepoError> {
        Ok(vec![StoryId(1), StoryId(2), StoryId(3)])
    }

    async fn story(&self, id: StoryId) -> Result<Story, RepoError> {
        if id == StoryId(2) {
            return Err(RepoError::Status { status: 500 });
        }
        Ok(Story::new(id, id.get() as i64))
    }
}

#[tokio::test]
async fn story_paths_emit_expected_metric_keys() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");

    // hit/miss/expired/evict on a single-slot store
    let store = StoryStore::new(&CacheConfig {
        ttl_seconds: 60,
        capacity: 1,
    });
    assert!(store.get_story(StoryId(1)).is_none());
    store.set_story(Story::new(1, 1), Duration::from_secs(60));
    assert!(store.get_story(StoryId(1)).is_some());
    store.set_story(Story::new(2, 2), Duration::from_secs(60));
    assert!(store.get_story(StoryId(1)).is_none());
    store.set_story(Story::new(3, 3), Duration::ZERO);
    assert!(store.get_story(StoryId(3)).is_none());

    // upstream item failure and warm-up timing
    let service = Arc::new(StoryService::new(
        Arc::new(FlakyRepo),
        Arc::new(StoryStore::new(&CacheConfig::default())),
        StoryServiceSettings {
            cache_ttl: Duration::from_secs(60),
            max_concurrent_fetches: NonZeroUsize::new(2).expect("non-zero"),
        },
    ));
    let loaded = CacheWarmer::new(service, StoryCount::new(3))
        .warm_initial()
        .await
        .expect("warm-up should succeed");
    assert_eq!(loaded, 2);

    let names: HashSet<String> = snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .map(|(composite_key, _, _, _)| composite_key.key().name().to_string())
        .collect();

    let expected = [
        "beststories_cache_hit_total",
        "beststories_cache_miss_total",
        "beststories_cache_expired_total",
        "beststories_cache_evict_total",
        "beststories_upstream_item_failure_total",
        "beststories_warmup_ms",
    ];

    for metric in expected {
        assert!(names.contains(metric), "missing metric: {metric}");
    }
}
