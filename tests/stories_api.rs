use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use beststories::application::repos::{RepoError, StoriesRepo};
use beststories::application::stories::{StoryService, StoryServiceSettings};
use beststories::cache::{CacheConfig, StoryStore};
use beststories::domain::stories::{Story, StoryCount, StoryId};
use beststories::infra::http::{HttpState, build_router};
use beststories::infra::http::middleware::REQUEST_ID_HEADER;

struct ScriptedRepo {
    ranking: Result<Vec<u64>, u16>,
    scores: HashMap<u64, i64>,
    missing: Vec<u64>,
    detail_calls: AtomicUsize,
}

impl ScriptedRepo {
    fn ranked(ranking: &[u64], scores: &[(u64, i64)]) -> Self {
        Self {
            ranking: Ok(ranking.to_vec()),
            scores: scores.iter().copied().collect(),
            missing: Vec::new(),
            detail_calls: AtomicUsize::new(0),
        }
    }

    fn failing(status: u16) -> Self {
        Self {
            ranking: Err(status),
            scores: HashMap::new(),
            missing: Vec::new(),
            detail_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl StoriesRepo for ScriptedRepo {
    async fn best_story_ids(&self) -> Result<Vec<StoryId>, RepoError> {
        match &self.ranking {
            Ok(ids) => Ok(ids.iter().copied().map(StoryId).collect()),
            Err(status) => Err(RepoError::Status { status: *status }),
        }
    }

    async fn story(&self, id: StoryId) -> Result<Story, RepoError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        if self.missing.contains(&id.get()) {
            return Err(RepoError::Missing { id });
        }
        let score = self.scores.get(&id.get()).copied().unwrap_or_default();
        Ok(Story::new(id, score)
            .with_field("title", format!("Story {id}"))
            .with_field("by", "pg")
            .with_field("type", "story"))
    }
}

fn app(repo: Arc<ScriptedRepo>) -> Router {
    let service = StoryService::new(
        repo,
        Arc::new(StoryStore::new(&CacheConfig::default())),
        StoryServiceSettings {
            cache_ttl: Duration::from_secs(20 * 60),
            max_concurrent_fetches: NonZeroUsize::new(8).expect("non-zero"),
        },
    );
    build_router(HttpState {
        stories: Arc::new(service),
        default_count: StoryCount::DEFAULT,
    })
}

async fn get(app: &Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let request = Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request should build");
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("router should respond");
    let status = response.status();
    let headers = response.headers().clone();
    let body = response
        .into_body()
        .collect()
        .await
        .expect("collect body")
        .to_bytes();
    (status, headers, body.to_vec())
}

fn ids(body: &[u8]) -> Vec<u64> {
    let stories: Vec<Value> = serde_json::from_slice(body).expect("json array");
    stories
        .iter()
        .map(|story| story["id"].as_u64().expect("numeric id"))
        .collect()
}

#[tokio::test]
async fn best_stories_are_sorted_by_score() {
    let repo = Arc::new(ScriptedRepo::ranked(
        &[1, 2, 3, 4, 5],
        &[(1, 10), (2, 50), (3, 30), (4, 70), (5, 90)],
    ));
    let app = app(repo.clone());

    let (status, headers, body) = get(&app, "/bestStories/3").await;

    assert_eq!(status, StatusCode::OK);
    assert!(headers.contains_key(REQUEST_ID_HEADER));
    assert_eq!(ids(&body), vec![2, 3, 1]);
    assert_eq!(repo.detail_calls.load(Ordering::SeqCst), 3);

    let stories: Vec<Value> = serde_json::from_slice(&body).expect("json array");
    assert_eq!(stories[0]["title"], "Story 2");
    assert_eq!(stories[0]["by"], "pg");
    assert_eq!(stories[0]["score"], 50);
}

#[tokio::test]
async fn repeated_requests_use_the_cache() {
    let repo = Arc::new(ScriptedRepo::ranked(&[1, 2, 3], &[(1, 3), (2, 2), (3, 1)]));
    let app = app(repo.clone());

    let (first, _, _) = get(&app, "/bestStories/3").await;
    let (second, _, body) = get(&app, "/bestStories/3").await;

    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::OK);
    assert_eq!(ids(&body), vec![1, 2, 3]);
    assert_eq!(repo.detail_calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn upstream_status_is_passed_through_with_empty_body() {
    let repo = Arc::new(ScriptedRepo::failing(503));
    let app = app(repo.clone());

    let (status, _, body) = get(&app, "/bestStories/5").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body.is_empty());
    assert_eq!(repo.detail_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_story_is_left_out() {
    let repo = Arc::new(ScriptedRepo {
        missing: vec![2],
        ..ScriptedRepo::ranked(&[1, 2, 3], &[(1, 1), (2, 2), (3, 3)])
    });
    let app = app(repo);

    let (status, _, body) = get(&app, "/bestStories/3").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![3, 1]);
}

#[tokio::test]
async fn malformed_count_falls_back_to_default() {
    let ranking: Vec<u64> = (1..=20).collect();
    let scores: Vec<(u64, i64)> = ranking.iter().map(|id| (*id, *id as i64)).collect();
    let repo = Arc::new(ScriptedRepo::ranked(&ranking, &scores));
    let app = app(repo);

    for uri in [
        "/bestStories/lots",
        "/bestStories/-2",
        "/bestStories/%FF",
        "/bestStories/99999999999999999999999",
        "/bestStories",
    ] {
        let (status, _, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(ids(&body), (1..=10).rev().collect::<Vec<u64>>(), "{uri}");
    }
}

#[tokio::test]
async fn zero_count_returns_empty_array() {
    let repo = Arc::new(ScriptedRepo::ranked(&[1, 2], &[]));
    let app = app(repo);

    let (status, _, body) = get(&app, "/bestStories/0").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"[]");
}

#[tokio::test]
async fn health_endpoint_answers_no_content() {
    let app = app(Arc::new(ScriptedRepo::failing(500)));

    let (status, _, body) = get(&app, "/_health").await;

    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_empty());
}
