use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State, rejection::PathRejection},
    http::StatusCode,
    middleware,
    routing::get,
};
use tracing::debug;

use crate::{
    application::{error::HttpError, stories::StoryService},
    domain::stories::{Story, StoryCount},
};

use super::middleware::{log_responses, set_request_context};

#[derive(Clone)]
pub struct HttpState {
    pub stories: Arc<StoryService>,
    /// Used when the requested count is missing or malformed.
    pub default_count: StoryCount,
}

pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/bestStories", get(best_stories_default))
        .route("/bestStories/{numberOfStories}", get(best_stories))
        .route("/_health", get(health))
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

async fn best_stories(
    State(state): State<HttpState>,
    raw_count: Result<Path<String>, PathRejection>,
) -> Result<Json<Vec<Story>>, HttpError> {
    let count = match raw_count {
        Ok(Path(raw)) => resolve_count(&raw, state.default_count),
        Err(rejection) => {
            debug!(
                target = "beststories::http::stories",
                error = %rejection,
                fallback = state.default_count.get(),
                "undecodable story count, using default"
            );
            state.default_count
        }
    };
    serve_top_stories(&state, count).await
}

async fn best_stories_default(
    State(state): State<HttpState>,
) -> Result<Json<Vec<Story>>, HttpError> {
    serve_top_stories(&state, state.default_count).await
}

async fn serve_top_stories(
    state: &HttpState,
    count: StoryCount,
) -> Result<Json<Vec<Story>>, HttpError> {
    let stories = state.stories.top_stories(count).await?;
    Ok(Json(stories))
}

async fn health() -> StatusCode {
    StatusCode::NO_CONTENT
}

fn resolve_count(raw: &str, default: StoryCount) -> StoryCount {
    match raw.parse::<StoryCount>() {
        Ok(count) => count,
        Err(err) => {
            debug!(
                target = "beststories::http::stories",
                raw = %raw,
                error = %err,
                fallback = default.get(),
                "malformed story count, using default"
            );
            default
        }
    }
}
