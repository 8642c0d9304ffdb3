//! In-memory story store.
//!
//! Entries carry their own deadline and are checked lazily: an expired entry
//! is dropped by the lookup that finds it. Capacity is bounded with LRU
//! eviction so a flood of distinct ids cannot grow the map without limit.

use std::{
    sync::RwLock,
    time::{Duration, Instant},
};

use lru::LruCache;
use metrics::counter;

use crate::application::repos::StoryCache;
use crate::domain::stories::{Story, StoryId};

use super::config::CacheConfig;
use super::keys::story_key;
use super::lock::{rw_read, rw_write};

const SOURCE: &str = "cache::store";

const METRIC_HIT: &str = "beststories_cache_hit_total";
const METRIC_MISS: &str = "beststories_cache_miss_total";
const METRIC_EXPIRED: &str = "beststories_cache_expired_total";
const METRIC_EVICT: &str = "beststories_cache_evict_total";

#[derive(Clone)]
struct CacheEntry {
    story: Story,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

pub struct StoryStore {
    entries: RwLock<LruCache<String, CacheEntry>>,
}

impl StoryStore {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: RwLock::new(LruCache::new(config.capacity_non_zero())),
        }
    }

    pub fn get_story(&self, id: StoryId) -> Option<Story> {
        self.get_story_at(id, Instant::now())
    }

    pub fn set_story(&self, story: Story, ttl: Duration) {
        self.set_story_at(story, ttl, Instant::now());
    }

    pub(crate) fn get_story_at(&self, id: StoryId, now: Instant) -> Option<Story> {
        let key = story_key(id);
        let mut entries = rw_write(&self.entries, SOURCE, "get_story");

        let lookup = entries
            .get(&key)
            .map(|entry| entry.is_live(now).then(|| entry.story.clone()));

        match lookup {
            Some(Some(story)) => {
                counter!(METRIC_HIT).increment(1);
                Some(story)
            }
            Some(None) => {
                entries.pop(&key);
                counter!(METRIC_EXPIRED).increment(1);
                counter!(METRIC_MISS).increment(1);
                None
            }
            None => {
                counter!(METRIC_MISS).increment(1);
                None
            }
        }
    }

    pub(crate) fn set_story_at(&self, story: Story, ttl: Duration, now: Instant) {
        let key = story_key(story.id);
        let entry = CacheEntry {
            story,
            expires_at: now.checked_add(ttl).unwrap_or(now),
        };

        let displaced = rw_write(&self.entries, SOURCE, "set_story").push(key.clone(), entry);
        if displaced.is_some_and(|(displaced_key, _)| displaced_key != key) {
            counter!(METRIC_EVICT).increment(1);
        }
    }

    /// Number of stored entries, expired ones included until they are looked up.
    pub fn len(&self) -> usize {
        rw_read(&self.entries, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StoryCache for StoryStore {
    fn get(&self, id: StoryId) -> Option<Story> {
        self.get_story(id)
    }

    fn set(&self, story: Story, ttl: Duration) {
        self.set_story(story, ttl);
    }
}
