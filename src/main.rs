use std::sync::Arc;

use car_inspect::api;
use car_inspect::config::{Config, LogFormat};
use car_inspect::engine::random::{RandomSource, StdRandom};
use car_inspect::error::AppError;
use car_inspect::inspection::stub::StubClassifier;
use car_inspect::state::AppState;
use car_inspect::store::OrderStore;
use chrono::TimeDelta;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = Config::from_env()?;

    init_tracing(&config);

    let store = OrderStore::open(&config.database_path)?;
    let random: Box<dyn RandomSource> = match config.rng_seed {
        Some(seed) => {
            tracing::info!(seed, "using seeded random source");
            Box::new(StdRandom::from_seed(seed))
        }
        None => Box::new(StdRandom::from_entropy()),
    };

    let app_state = AppState::new(
        store,
        Arc::new(StubClassifier),
        random,
        config.event_buffer_size,
    )
    .with_quote_ttl(TimeDelta::seconds(i64::from(config.quote_ttl_secs)));

    let app = api::rest::router(Arc::new(app_state))
        .fallback_service(ServeDir::new(&config.static_dir))
        .layer(CorsLayer::permissive());

    let bind_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|err| AppError::Internal(format!("failed to bind {bind_addr}: {err}")))?;

    tracing::info!(
        http_port = config.http_port,
        database = %config.database_path.display(),
        "http server started"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::Internal(format!("server error: {err}")))?;

    Ok(())
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::new(config.log_level.clone());

    match config.log_format {
        LogFormat::Compact => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init(),
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
