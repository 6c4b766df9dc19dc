use std::sync::Arc;

use axum::Router;
use clap::Parser;
use tower_http::{services::ServeDir, trace::TraceLayer}; // static UI files, request spans

use taskflow::AppState;
use taskflow::clock::SystemClock;
use taskflow::config::{CliArgs, Config};
use taskflow::store;

#[tokio::main]
async fn main() {
    let cli = CliArgs::parse();

    let config = match Config::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            std::process::exit(1);
        }
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let seed = match config.seed_path.as_deref() {
        Some(path) => store::load_seed(path),
        None => store::builtin_seed(),
    };
    let seed = match seed {
        Ok(seed) => seed,
        Err(e) => {
            tracing::error!(error = %e, "failed to load seed data");
            std::process::exit(1);
        }
    };
    tracing::info!(
        tasks = seed.tasks.len(),
        categories = seed.categories.len(),
        latency = ?config.latency,
        "task store seeded"
    );

    let state = AppState::from_seed(seed, Arc::new(SystemClock), config.latency);

    let mut app = Router::new().nest("/api", taskflow::api_router(state));
    if let Some(dir) = &config.static_dir {
        tracing::info!(dir = %dir.display(), "serving static files");
        app = app.fallback_service(ServeDir::new(dir));
    }
    let app = app.layer(TraceLayer::new_for_http());

    let listener = match tokio::net::TcpListener::bind(config.bind_addr.as_str()).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(addr = %config.bind_addr, error = %e, "bind failed");
            std::process::exit(1);
        }
    };
    tracing::info!(addr = %config.bind_addr, "server running, API base /api");

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server error");
        std::process::exit(1);
    }
}
