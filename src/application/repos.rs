//! Port traits describing the upstream ranking API and the story cache.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::stories::{Story, StoryId};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("upstream answered with status {status}")]
    Status { status: u16 },
    #[error("upstream request failed: {0}")]
    Transport(String),
    #[error("upstream payload could not be decoded: {0}")]
    Decode(String),
    #[error("upstream has no item `{id}`")]
    Missing { id: StoryId },
}

impl RepoError {
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::Transport(err.to_string())
    }

    pub fn decode(err: impl std::fmt::Display) -> Self {
        Self::Decode(err.to_string())
    }

    /// Status code reported by upstream, when the failure carried one.
    pub fn status(&self) -> Option<u16> {
        match self {
            RepoError::Status { status } => Some(*status),
            _ => None,
        }
    }
}

/// Read-only access to the upstream story ranking.
#[async_trait]
pub trait StoriesRepo: Send + Sync {
    /// Current "best" ranking, highest first.
    async fn best_story_ids(&self) -> Result<Vec<StoryId>, RepoError>;

    async fn story(&self, id: StoryId) -> Result<Story, RepoError>;
}

/// Process-wide story cache with passive expiry.
///
/// Implementations must tolerate concurrent `get`/`set` calls from any number
/// of requests; each call is atomic per key.
pub trait StoryCache: Send + Sync {
    /// Returns the cached story, or `None` when absent or expired.
    fn get(&self, id: StoryId) -> Option<Story>;

    fn set(&self, story: Story, ttl: Duration);
}
