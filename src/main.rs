// src/main.rs

use daily_quiz_backend::clock::SystemClock;
use daily_quiz_backend::config::Config;
use daily_quiz_backend::generator::OpenRouterClient;
use daily_quiz_backend::routes;
use daily_quiz_backend::state::AppState;
use daily_quiz_backend::store;
use dotenvy::dotenv;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    // Initialize Database Pool
    let connect_options = SqliteConnectOptions::from_str(&config.database_url)
        .expect("Invalid DATABASE_URL")
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(3))
        .connect_with(connect_options)
        .await
        .expect("Failed to open database");

    tracing::info!("Database connected...");

    store::create_schema(&pool)
        .await
        .expect("Failed to create database schema");
    tracing::info!("Schema ready.");

    if config.openrouter_api_key.is_none() {
        tracing::warn!(
            "OPENROUTER_API_KEY not set; generation will use the fallback question set"
        );
    }
    if config.aptitude_bank.is_none() || config.technical_bank.is_none() {
        tracing::info!("Question banks not configured; running in generator mode");
    }

    let chat = Arc::new(OpenRouterClient::new(&config));

    // Create AppState
    let state = AppState::new(pool, config.clone(), Arc::new(SystemClock), chat);

    // Create the Axum application router
    let app = routes::create_router(state);

    // Bind to the listening address
    let addr: SocketAddr = config.bind_addr.parse().expect("Invalid BIND_ADDR");
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();

    // Start the server
    axum::serve(listener, app).await.unwrap();
}
