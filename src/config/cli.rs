use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, builder::BoolishValueParser};

/// Command-line arguments for the beststories binary.
#[derive(Debug, Parser)]
#[command(
    name = "beststories",
    version,
    about = "Caching proxy for the best Hacker News stories"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "BESTSTORIES_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the HTTP service.
    Serve(Box<ServeArgs>),
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Override the graceful shutdown timeout.
    #[arg(long = "server-graceful-shutdown-seconds", value_name = "SECONDS")]
    pub server_graceful_shutdown_seconds: Option<u64>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Override the upstream API base URL.
    #[arg(long = "upstream-base-url", value_name = "URL")]
    pub upstream_base_url: Option<String>,

    /// Override the number of story detail fetches allowed in flight per request.
    #[arg(long = "upstream-max-concurrent-fetches", value_name = "COUNT")]
    pub upstream_max_concurrent_fetches: Option<u32>,

    /// Override the story cache lifetime.
    #[arg(long = "cache-ttl-seconds", value_name = "SECONDS")]
    pub cache_ttl_seconds: Option<u64>,

    /// Override the maximum number of cached stories.
    #[arg(long = "cache-capacity", value_name = "COUNT")]
    pub cache_capacity: Option<usize>,

    /// Enable the startup cache warm-up.
    #[arg(
        long = "warmup-enabled",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub warmup_enabled: Option<bool>,

    /// Override how many stories the warm-up loads.
    #[arg(long = "warmup-count", value_name = "COUNT")]
    pub warmup_count: Option<u32>,

    /// Override the count used when a request's count is malformed.
    #[arg(long = "stories-default-count", value_name = "COUNT")]
    pub stories_default_count: Option<u32>,
}
