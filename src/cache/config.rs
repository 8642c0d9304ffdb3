//! Cache configuration.
//!
//! Built from the validated `[cache]` settings, or directly by callers that
//! embed a `StoryStore`.

use std::{num::NonZeroUsize, time::Duration};

const DEFAULT_TTL_SECONDS: u64 = 20 * 60;
const DEFAULT_CAPACITY: usize = 2048;

/// Story cache configuration.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Lifetime of a cached story, counted from insertion.
    pub ttl_seconds: u64,
    /// Maximum number of stories kept at once; least recently used go first.
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: DEFAULT_TTL_SECONDS,
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            ttl_seconds: settings.ttl.as_secs(),
            capacity: settings.capacity.get(),
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }

    /// Returns the capacity as NonZeroUsize. A directly constructed zero
    /// capacity is clamped to 1; loaded settings never carry zero.
    pub fn capacity_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.capacity).unwrap_or(NonZeroUsize::MIN)
    }
}
