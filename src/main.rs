use std::{
    error::Error,
    sync::{Arc, Mutex},
};

use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
};
use axum_prometheus::PrometheusMetricLayer;
use dotenv::dotenv;
use inventory_management::{
    config::{Config, StoreBackend},
    metrics::PrometheusMetricsService,
    repositories::RepositoryContext,
    routes::build_router,
    state::AppState,
};
use tokio::signal::{self, ctrl_c};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{event, Level};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();

    let config = Config::from_env()?;
    init_tracing(&config)?;

    let uow = match &config.store {
        StoreBackend::Memory => RepositoryContext::in_memory(),
        StoreBackend::MongoDb(info) => RepositoryContext::mongodb(info).await?,
    };
    let state = Arc::new(AppState::new(
        uow,
        Arc::new(PrometheusMetricsService::new()?),
    ));

    let (prometheus_layer, metrics_handle) = PrometheusMetricLayer::pair();

    let app = build_router(state)
        .route(
            "/metrics/http",
            get(move || std::future::ready(metrics_handle.render())),
        )
        .layer(prometheus_layer)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&config)?),
        );

    let address = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    event!(Level::INFO, "Server running on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    event!(Level::INFO, "Server shut down");
    Ok(())
}

fn init_tracing(config: &Config) -> Result<(), Box<dyn Error>> {
    let builder = tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_target(false)
        .with_ansi(false)
        .json()
        .with_file(true)
        .with_line_number(true)
        .with_current_span(true);

    match &config.log_path {
        Some(path) => builder
            .with_writer(Mutex::new(std::fs::File::create(path)?))
            .init(),
        None => builder.init(),
    }

    Ok(())
}

fn cors_layer(config: &Config) -> Result<CorsLayer, Box<dyn Error>> {
    let cors = match &config.cors_origin {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin.parse::<HeaderValue>()?)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE]),
        None => CorsLayer::permissive(),
    };

    Ok(cors)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => event!(Level::INFO, "Received Ctrl+C, shutting down"),
            Err(e) => event!(Level::ERROR, "Failed to listen for Ctrl+C: {}", e),
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                event!(Level::INFO, "Received terminate signal, shutting down");
            }
            Err(e) => {
                event!(Level::ERROR, "Failed to install terminate handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
