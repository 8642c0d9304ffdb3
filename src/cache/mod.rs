//! Story cache.
//!
//! A process-wide, in-memory map from `Story_<id>` keys to upstream stories.
//! Each entry lives for a fixed TTL from insertion and expires lazily on the
//! next lookup; nothing invalidates entries explicitly.
//!
//! ## Configuration
//!
//! ```toml
//! [cache]
//! ttl_seconds = 1200
//! capacity = 2048
//! ```

mod config;
mod keys;
mod lock;
mod store;

pub use config::CacheConfig;
pub use keys::story_key;
pub use store::StoryStore;
