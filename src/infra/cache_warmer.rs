use std::{sync::Arc, time::Instant};

use metrics::histogram;
use thiserror::Error;
use tokio::task::{JoinError, JoinHandle};
use tracing::{error, info};

use crate::{
    application::stories::{StoryError, StoryService},
    domain::stories::StoryCount,
};

const METRIC_WARMUP_MS: &str = "beststories_warmup_ms";

#[derive(Debug, Error)]
pub enum CacheWarmError {
    #[error("failed to load best stories: {0}")]
    Stories(#[from] StoryError),
}

/// Preloads the story cache once at startup.
pub struct CacheWarmer {
    stories: Arc<StoryService>,
    count: StoryCount,
}

impl CacheWarmer {
    pub fn new(stories: Arc<StoryService>, count: StoryCount) -> Self {
        Self { stories, count }
    }

    /// Resolve the top stories through the aggregator, which caches every
    /// story it had to fetch. Returns how many stories were loaded.
    pub async fn warm_initial(&self) -> Result<usize, CacheWarmError> {
        info!(
            target = "beststories::cache_warmer",
            count = self.count.get(),
            "warming story cache"
        );

        let started = Instant::now();
        let stories = self.stories.top_stories(self.count).await?;
        histogram!(METRIC_WARMUP_MS).record(started.elapsed().as_secs_f64() * 1000.0);

        Ok(stories.len())
    }

    /// Run the warm-up in the background; the outcome is logged either way.
    pub fn spawn(self) -> JoinHandle<Result<usize, CacheWarmError>> {
        tokio::spawn(async move {
            let outcome = self.warm_initial().await;
            match &outcome {
                Ok(loaded) => info!(
                    target = "beststories::cache_warmer",
                    loaded, "story cache warmed"
                ),
                Err(err) => error!(
                    target = "beststories::cache_warmer",
                    error = %err,
                    "story cache warm-up failed"
                ),
            }
            outcome
        })
    }
}

/// Abort a spawned warm-up and wait for it to settle.
///
/// Cancellation and normal completion are `Ok`; a panicked task is returned
/// as its `JoinError`.
pub async fn stop(handle: JoinHandle<Result<usize, CacheWarmError>>) -> Result<(), JoinError> {
    handle.abort();
    match handle.await {
        Ok(_) => Ok(()),
        Err(err) if err.is_cancelled() => Ok(()),
        Err(err) => Err(err),
    }
}
