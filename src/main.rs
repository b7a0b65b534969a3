mod config;
mod delivery;
mod domain;
mod repository;
mod telemetry;
mod usecase;

use std::sync::Arc;

use axum::{extract::State, routing::get, Router};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::delivery::http::v1::notifications::list_notifications;
use crate::repository::postgres::{create_pool, PostgresContentRepository};
use crate::usecase::contracts::ContentRepository;
use crate::usecase::notifications::NotificationsUseCase;

pub struct AppState<C>
where
    C: ContentRepository,
{
    pub notifications_usecase: NotificationsUseCase<C>,
    pub metrics_handle: PrometheusHandle,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config::AppConfig::from_env();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // Initialize tracing subscriber with optional OpenTelemetry layer
    if config.telemetry_enabled {
        let telemetry_config = telemetry::TelemetryConfig {
            service_name: config.telemetry_service_name.clone(),
            service_version: config.telemetry_service_version.clone(),
            environment: config.telemetry_environment.clone(),
            otlp_endpoint: config.telemetry_otlp_endpoint.clone(),
        };

        telemetry::init_telemetry_with_subscriber(&telemetry_config, env_filter)
            .expect("failed to initialize telemetry");
    } else {
        telemetry::init_subscriber_without_telemetry(env_filter);
    }

    tracing::info!("starting the notifications service");

    let metrics_handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder");
    metrics_process::Collector::default().describe();
    tracing::info!("prometheus metrics initialized");

    let pool = create_pool(&config.database_url, config.database_max_connections)
        .await
        .expect("failed to create database pool");
    tracing::info!("database pool created");

    sqlx::migrate!().run(&pool).await?;
    tracing::info!("database migrations applied");

    let content_repository = PostgresContentRepository::new(pool);
    let notifications_usecase = NotificationsUseCase::new(content_repository);

    let shared_state = Arc::new(AppState {
        notifications_usecase,
        metrics_handle,
    });

    // The notifications endpoint is public and read-only; no auth layer.
    let router = Router::new()
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics::<PostgresContentRepository>))
        .route(
            "/api/v1/notifications",
            get(list_notifications::<PostgresContentRepository>),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(shared_state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("notifications service running on {}", config.bind_addr);
    axum::serve(listener, router).await?;

    if config.telemetry_enabled {
        telemetry::shutdown_telemetry();
    }

    Ok(())
}

async fn metrics<C>(State(state): State<Arc<AppState<C>>>) -> String
where
    C: ContentRepository + 'static,
{
    metrics_process::Collector::default().collect();
    state.metrics_handle.render()
}

#[tracing::instrument]
async fn healthz() -> &'static str {
    "OK"
}
