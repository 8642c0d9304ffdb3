//! Cache key derivation.

use crate::domain::stories::StoryId;

const STORY_KEY_PREFIX: &str = "Story_";

/// Key under which a story is cached: `Story_<id>`.
pub fn story_key(id: StoryId) -> String {
    format!("{STORY_KEY_PREFIX}{id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn story_key_uses_prefix_and_id() {
        assert_eq!(story_key(StoryId(8863)), "Story_8863");
        assert_eq!(story_key(StoryId(0)), "Story_0");
    }
}
