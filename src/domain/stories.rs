//! Story records as served by the upstream ranking API.
//!
//! Only `id` and `score` carry meaning for aggregation. Every other field the
//! upstream sends (title, url, by, time, kids, ...) is kept verbatim in
//! [`Story::metadata`] and re-emitted unchanged when the story is serialized.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::DomainError;

/// Upstream identifier of a story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoryId(pub u64);

impl StoryId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for StoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for StoryId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    pub id: StoryId,
    #[serde(default)]
    pub score: i64,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl Story {
    pub fn new(id: impl Into<StoryId>, score: i64) -> Self {
        Self {
            id: id.into(),
            score,
            metadata: Map::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(name.into(), value.into());
        self
    }

    pub fn title(&self) -> Option<&str> {
        self.metadata.get("title").and_then(Value::as_str)
    }
}

/// Number of stories requested by a caller.
///
/// Zero is a valid request and yields an empty result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct StoryCount(usize);

impl StoryCount {
    pub const DEFAULT: StoryCount = StoryCount(10);

    pub fn new(value: usize) -> Self {
        Self(value)
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for StoryCount {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl FromStr for StoryCount {
    type Err = DomainError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("story count is empty"));
        }

        trimmed
            .parse::<usize>()
            .map(Self)
            .map_err(|err| DomainError::validation(format!("story count `{trimmed}`: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn unknown_fields_survive_a_round_trip() {
        let raw = json!({
            "by": "dhouston",
            "descendants": 71,
            "id": 8863,
            "kids": [8952, 9224],
            "score": 111,
            "time": 1175714200,
            "title": "My YC app: Dropbox - Throw away your USB drive",
            "type": "story",
            "url": "http://www.getdropbox.com/u/2/screencast.html"
        });

        let story: Story = serde_json::from_value(raw.clone()).expect("story decodes");
        assert_eq!(story.id, StoryId(8863));
        assert_eq!(story.score, 111);
        assert_eq!(
            story.title(),
            Some("My YC app: Dropbox - Throw away your USB drive")
        );

        let encoded = serde_json::to_value(&story).expect("story encodes");
        assert_eq!(encoded, raw);
    }

    #[test]
    fn missing_score_defaults_to_zero() {
        let story: Story = serde_json::from_value(json!({ "id": 1, "type": "job" }))
            .expect("story decodes");
        assert_eq!(story.score, 0);
    }

    #[test]
    fn story_without_id_is_rejected() {
        let result = serde_json::from_value::<Story>(json!({ "score": 5 }));
        assert!(result.is_err());
    }

    #[test]
    fn count_parses_plain_integers() {
        assert_eq!("25".parse::<StoryCount>().expect("valid"), StoryCount(25));
        assert_eq!(" 3 ".parse::<StoryCount>().expect("valid"), StoryCount(3));
        assert_eq!("0".parse::<StoryCount>().expect("valid"), StoryCount(0));
    }

    #[test]
    fn count_rejects_garbage() {
        for raw in ["", "  ", "-4", "ten", "1.5", "99999999999999999999999"] {
            assert!(
                matches!(
                    raw.parse::<StoryCount>(),
                    Err(DomainError::Validation { .. })
                ),
                "`{raw}` should not parse"
            );
        }
    }
}
