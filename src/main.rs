use anyhow::Context;
use clap::Parser;
use shardlog::{web, HasherKind, RedisConfig, ServerConfig, Store};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, Level};

#[derive(Parser, Debug)]
#[command(name = "shardlog")]
#[command(about = "In-memory key-value cache with a sharded index over an append-only log")]
struct Args {
    /// JSON configuration file; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind to
    #[arg(short, long)]
    bind: Option<SocketAddr>,

    /// Number of index shards
    #[arg(short, long)]
    shards: Option<usize>,

    /// Key hash algorithm
    #[arg(long, value_enum)]
    hasher: Option<HasherKind>,

    /// Entries preallocated in the value log
    #[arg(long)]
    initial_capacity: Option<usize>,

    /// Tokio worker threads (defaults to the number of CPUs)
    #[arg(short, long)]
    workers: Option<usize>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: Level,

    /// Redis URL for the comparison backend under /redis
    #[arg(long)]
    redis_url: Option<String>,

    /// Expiry for values written to Redis
    #[arg(long)]
    redis_ttl_secs: Option<u64>,
}

impl Args {
    fn into_config(self) -> anyhow::Result<ServerConfig> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::from_file(path)?,
            None => ServerConfig::default(),
        };

        if let Some(bind) = self.bind {
            config.bind = bind;
        }
        if let Some(shards) = self.shards {
            config.store.num_shards = shards;
        }
        if let Some(hasher) = self.hasher {
            config.store.hasher = hasher;
        }
        if let Some(capacity) = self.initial_capacity {
            config.store.initial_capacity = capacity;
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if self.redis_url.is_some() || self.redis_ttl_secs.is_some() {
            let redis = config.redis.get_or_insert_with(RedisConfig::default);
            if let Some(url) = self.redis_url {
                redis.url = url;
            }
            if self.redis_ttl_secs.is_some() {
                redis.ttl_secs = self.redis_ttl_secs;
            }
        }

        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(args.log_level.into()),
        )
        .init();

    let config = args.into_config()?;
    let workers = config.workers.max(1);
    info!("shardlog starting with {} worker threads", workers);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(workers)
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;

    runtime.block_on(run(config))
}

async fn run(config: ServerConfig) -> anyhow::Result<()> {
    let store = Arc::new(Store::new(&config.store).context("failed to initialize store")?);

    let comparison = connect_comparison(config.redis.clone()).await?;

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Shutdown signal received"),
            Err(e) => error!("Failed to listen for shutdown signal: {}", e),
        }
        signal_token.cancel();
    });

    web::run_web_server(config.bind, store, comparison, shutdown).await
}

#[cfg(feature = "redis")]
async fn connect_comparison(config: Option<RedisConfig>) -> anyhow::Result<Option<web::SharedBackend>> {
    let Some(config) = config else {
        return Ok(None);
    };

    let backend: web::SharedBackend = Arc::new(
        shardlog::backend::RedisBackend::connect(config)
            .await
            .context("failed to connect the Redis comparison backend")?,
    );
    Ok(Some(backend))
}

#[cfg(not(feature = "redis"))]
async fn connect_comparison(config: Option<RedisConfig>) -> anyhow::Result<Option<web::SharedBackend>> {
    if config.is_some() {
        tracing::warn!("Redis backend configured but shardlog was built without the `redis` feature");
    }
    Ok(None)
}
