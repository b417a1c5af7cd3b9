//! Riskwatch service - background sensor poller and HTTP API.
//!
//! Run with: `cargo run -p riskwatch-service`

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use clap::Parser;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use riskwatch_core::{
    AdvisoryClient, AdvisoryProvider, AlarmController, ControllerOptions, FallbackAdvisor,
};
use riskwatch_service::{
    AggregateClient, AppState, Collector, Config, HttpSensor, MockSensor, SensorSource, api,
};

/// Riskwatch service - background sensor poller and HTTP REST API.
#[derive(Parser, Debug)]
#[command(name = "riskwatch-service")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address (overrides config).
    #[arg(short, long)]
    bind: Option<String>,

    /// Use the built-in mock sensor feed (overrides config).
    #[arg(long)]
    mock: bool,

    /// Disable the background collector (API only mode).
    #[arg(long)]
    no_collector: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("riskwatch_service=info".parse()?)
                .add_directive("riskwatch_core=info".parse()?)
                .add_directive("tower_http=debug".parse()?),
        )
        .init();

    // Load configuration
    let mut config = match &args.config {
        Some(path) => Config::load_validated(path)?,
        None => Config::load_default().unwrap_or_default(),
    };

    // Override config with CLI args
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    if args.mock {
        config.sensor.mock = true;
    }

    // Advisory provider
    let provider: Arc<dyn AdvisoryProvider> = if config.advisory.enabled {
        Arc::new(AdvisoryClient::with_deadline(
            &config.advisory.url,
            &config.advisory.api_key,
            Duration::from_millis(config.advisory.timeout_ms),
        )?)
    } else {
        info!("Advisory service disabled; using local fallback text");
        Arc::new(FallbackAdvisor)
    };

    // Alarm engine
    let controller = AlarmController::with_options(
        provider,
        ControllerOptions {
            triggers: config.triggers.clone(),
            ..ControllerOptions::default()
        },
    );

    // Sensor feed
    let sensor: Arc<dyn SensorSource> = if config.sensor.mock {
        info!("Using mock sensor feed");
        Arc::new(MockSensor)
    } else {
        info!("Polling sensor at {}", config.sensor.url);
        Arc::new(HttpSensor::new(
            &config.sensor.url,
            Duration::from_millis(config.sensor.request_timeout_ms),
        )?)
    };

    // Hourly-aggregate feed
    let aggregates = AggregateClient::new(&config.aggregates.url)?;

    // Create application state
    let state = AppState::new(config.clone(), controller, sensor, aggregates);

    // Start the background collector
    if !args.no_collector {
        let collector = Collector::new(Arc::clone(&state));
        collector.start();
    } else {
        info!("Background collector disabled");
    }

    // Build the router
    let app = Router::new()
        .merge(api::router())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Parse bind address
    let addr: SocketAddr = config.server.bind.parse()?;

    info!("Starting server on {}", addr);

    // Run the server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
