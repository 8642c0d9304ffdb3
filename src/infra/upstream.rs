//! Hacker News Firebase API adapter.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::trace;
use url::Url;

use crate::{
    application::repos::{RepoError, StoriesRepo},
    config::UpstreamSettings,
    domain::stories::{Story, StoryId},
};

use super::error::InfraError;

const BEST_STORIES_PATH: &str = "beststories.json";

#[derive(Clone, Debug)]
pub struct HackerNewsClient {
    client: Client,
    base: Url,
}

impl HackerNewsClient {
    pub fn new(settings: &UpstreamSettings) -> Result<Self, InfraError> {
        let client = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .build()?;
        Ok(Self {
            client,
            base: settings.base_url.clone(),
        })
    }

    fn url(&self, path: &str) -> Result<Url, RepoError> {
        self.base.join(path).map_err(RepoError::transport)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, RepoError> {
        trace!(target = "beststories::upstream", url = %url, "upstream request");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(RepoError::transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(RepoError::Status {
                status: status.as_u16(),
            });
        }

        response.json::<T>().await.map_err(RepoError::decode)
    }
}

#[async_trait]
impl StoriesRepo for HackerNewsClient {
    async fn best_story_ids(&self) -> Result<Vec<StoryId>, RepoError> {
        let url = self.url(BEST_STORIES_PATH)?;
        self.get_json(url).await
    }

    async fn story(&self, id: StoryId) -> Result<Story, RepoError> {
        let url = self.url(&format!("item/{id}.json"))?;
        // Deleted or unknown items come back as a literal `null`.
        let item: Option<Story> = self.get_json(url).await?;
        item.ok_or(RepoError::Missing { id })
    }
}
