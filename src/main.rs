use std::{process, sync::Arc};

use beststories::{
    application::{
        error::AppError,
        repos::{StoriesRepo, StoryCache},
        stories::{StoryService, StoryServiceSettings},
    },
    cache::{CacheConfig, StoryStore},
    config,
    domain::stories::StoryCount,
    infra::{
        cache_warmer::{self, CacheWarmer},
        error::InfraError,
        http::{self, HttpState},
        telemetry,
        upstream::HackerNewsClient,
    },
};
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let stories = build_story_service(&settings)?;

    let warmup_handle = if settings.warmup.enabled {
        let count = StoryCount::new(settings.warmup.count.get() as usize);
        Some(CacheWarmer::new(stories.clone(), count).spawn())
    } else {
        None
    };

    let http_state = HttpState {
        stories,
        default_count: StoryCount::new(settings.stories.default_count.get() as usize),
    };
    let result = serve_http(&settings, http_state).await;

    if let Some(handle) = warmup_handle {
        if let Err(err) = cache_warmer::stop(handle).await {
            warn!(
                target = "beststories::cache_warmer",
                error = %err,
                "story cache warm-up task panicked"
            );
        }
    }

    result
}

fn build_story_service(settings: &config::Settings) -> Result<Arc<StoryService>, AppError> {
    let repo: Arc<dyn StoriesRepo> =
        Arc::new(HackerNewsClient::new(&settings.upstream).map_err(AppError::from)?);

    let cache_config = CacheConfig::from(&settings.cache);
    let cache: Arc<dyn StoryCache> = Arc::new(StoryStore::new(&cache_config));

    Ok(Arc::new(StoryService::new(
        repo,
        cache,
        StoryServiceSettings {
            cache_ttl: cache_config.ttl(),
            max_concurrent_fetches: settings.upstream.max_concurrent_fetches,
        },
    )))
}

async fn serve_http(settings: &config::Settings, state: HttpState) -> Result<(), AppError> {
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "beststories::http",
        addr = %settings.server.addr,
        upstream = %settings.upstream.base_url,
        "listening"
    );

    let grace = settings.server.graceful_shutdown;
    let server = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .into_future();

    tokio::select! {
        result = server => {
            result.map_err(|err| AppError::unexpected(format!("server error: {err}")))?;
        }
        _ = async {
            shutdown_signal().await;
            tokio::time::sleep(grace).await;
        } => {
            warn!(
                target = "beststories::http",
                grace_seconds = grace.as_secs(),
                "graceful shutdown timed out, dropping open connections"
            );
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
