//! Composition root: configuration, logging, pools, worker, HTTP server.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Url;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use geoalert::config::AppConfig;
use geoalert::domain::{
    LocationService, StatsService, WebhookWorker, WebhookWorkerConfig, WebhookWorkerPorts,
    ZoneService,
};
use geoalert::inbound::http::auth::ApiKeyConfig;
use geoalert::inbound::http::health::HealthDependencies;
use geoalert::inbound::http::state::HttpState;
use geoalert::outbound::cache::RedisZoneCache;
use geoalert::outbound::persistence::{
    DbPool, DieselCheckRepository, DieselWebhookRepository, DieselZoneRepository, PoolConfig,
};
use geoalert::outbound::queue::RedisTaskQueue;
use geoalert::outbound::redis::RedisHandle;
use geoalert::outbound::webhook::ReqwestWebhookSender;
use geoalert::server::{create_server, ServerDependencies};

/// Per-attempt deadline for outbound webhook POSTs.
const WEBHOOK_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[actix_web::main]
async fn main() -> io::Result<()> {
    let config = AppConfig::from_env().map_err(io::Error::other)?;

    let filter =
        EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(err) = fmt().with_env_filter(filter).json().try_init() {
        warn!(error = %err, "tracing init failed");
    }

    let pool = DbPool::new(PoolConfig::new(&config.database_url))
        .await
        .map_err(io::Error::other)?;
    pool.ping().await.map_err(io::Error::other)?;
    info!("database connected");

    let redis = RedisHandle::connect(&config.redis_url)
        .await
        .map_err(io::Error::other)?;
    info!("redis connected");

    let webhook_endpoint = Url::parse(&config.webhook_url)
        .map_err(|err| io::Error::other(format!("invalid WEBHOOK_URL: {err}")))?;
    let sender = Arc::new(
        ReqwestWebhookSender::new(webhook_endpoint, WEBHOOK_REQUEST_TIMEOUT)
            .map_err(io::Error::other)?,
    );

    let zones = Arc::new(DieselZoneRepository::new(pool.clone()));
    let checks = Arc::new(DieselCheckRepository::new(pool.clone()));
    let webhooks = Arc::new(DieselWebhookRepository::new(pool.clone()));
    let cache = Arc::new(RedisZoneCache::new(redis.clone(), config.cache_ttl));
    let queue = Arc::new(RedisTaskQueue::new(redis.clone()));

    let location = Arc::new(LocationService::new(
        zones.clone(),
        checks.clone(),
        webhooks.clone(),
        cache.clone(),
        queue.clone(),
    ));
    let zone_service = Arc::new(ZoneService::new(zones.clone(), cache));
    let stats = Arc::new(StatsService::new(zones, checks, webhooks.clone()));

    let worker = Arc::new(WebhookWorker::new(
        WebhookWorkerPorts::new(webhooks, queue, sender),
        WebhookWorkerConfig {
            max_retries: config.max_retries,
            retry_delay: config.retry_delay,
        },
    ));
    let shutdown = CancellationToken::new();
    let (consumer, scanner) = worker.spawn(shutdown.clone());

    let http_state = HttpState::new(location, zone_service, stats.clone(), config.stats_window_minutes);
    let health = HealthDependencies {
        db: pool,
        redis,
        stats,
    };

    let bind_addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let server = create_server(
        bind_addr,
        ServerDependencies {
            http_state,
            health,
            api_key: ApiKeyConfig::new(config.api_key.clone()),
        },
    )?;

    info!(port = config.http_port, "starting HTTP server");
    server.await?;

    info!("shutting down");
    shutdown.cancel();
    let _ = consumer.await;
    let _ = scanner.await;
    info!("stopped");

    Ok(())
}
