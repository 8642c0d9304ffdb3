//! Best-stories aggregation: ranking lookup, cache partition, bounded fan-out.

use std::{collections::HashSet, num::NonZeroUsize, sync::Arc, time::Duration};

use futures::stream::{self, StreamExt};
use metrics::counter;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::application::repos::{RepoError, StoriesRepo, StoryCache};
use crate::domain::stories::{Story, StoryCount, StoryId};

const METRIC_UPSTREAM_ITEM_FAILURE: &str = "beststories_upstream_item_failure_total";

#[derive(Debug, Error)]
pub enum StoryError {
    #[error("failed to load story ranking")]
    Ranking(#[source] RepoError),
}

impl StoryError {
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            StoryError::Ranking(err) => err.status(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StoryServiceSettings {
    pub cache_ttl: Duration,
    pub max_concurrent_fetches: NonZeroUsize,
}

pub struct StoryService {
    repo: Arc<dyn StoriesRepo>,
    cache: Arc<dyn StoryCache>,
    settings: StoryServiceSettings,
}

impl StoryService {
    pub fn new(
        repo: Arc<dyn StoriesRepo>,
        cache: Arc<dyn StoryCache>,
        settings: StoryServiceSettings,
    ) -> Self {
        Self {
            repo,
            cache,
            settings,
        }
    }

    /// Top `count` stories of the current ranking, highest score first.
    ///
    /// Cached stories are served without a network round trip; the rest are
    /// fetched concurrently and cached. Stories whose detail fetch fails are
    /// left out of the result.
    #[instrument(skip(self), fields(count = count.get()))]
    pub async fn top_stories(&self, count: StoryCount) -> Result<Vec<Story>, StoryError> {
        let ranking = self
            .repo
            .best_story_ids()
            .await
            .map_err(StoryError::Ranking)?;

        let mut seen = HashSet::new();
        let selected: Vec<StoryId> = ranking
            .into_iter()
            .take(count.get())
            .filter(|id| seen.insert(*id))
            .collect();

        let mut stories = Vec::with_capacity(selected.len());
        let mut pending = Vec::new();
        for id in selected {
            match self.cache.get(id) {
                Some(story) => stories.push(story),
                None => pending.push(id),
            }
        }

        let cached = stories.len();
        let requested = pending.len();

        let fetched: Vec<Story> = stream::iter(pending)
            .map(|id| self.fetch_and_cache(id))
            .buffered(self.settings.max_concurrent_fetches.get())
            .filter_map(|story| async move { story })
            .collect()
            .await;

        debug!(
            target = "beststories::stories",
            cached,
            requested,
            fetched = fetched.len(),
            "resolved story details"
        );

        stories.extend(fetched);
        stories.sort_by(|a, b| b.score.cmp(&a.score));
        Ok(stories)
    }

    async fn fetch_and_cache(&self, id: StoryId) -> Option<Story> {
        match self.repo.story(id).await {
            Ok(story) => {
                self.cache.set(story.clone(), self.settings.cache_ttl);
                Some(story)
            }
            Err(err) => {
                counter!(METRIC_UPSTREAM_ITEM_FAILURE).increment(1);
                warn!(
                    target = "beststories::stories",
                    story_id = %id,
                    error = %err,
                    "dropping story after failed detail fetch"
                );
                None
            }
        }
    }
}
