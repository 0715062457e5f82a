// src/main.rs

use std::sync::Arc;
use std::time::Duration;

use dotenvy::dotenv;
use lms_client::api::{HttpApi, RemoteApi};
use lms_client::config::Config;
use lms_client::poll;
use lms_client::reset;
use lms_client::state::SessionState;
use lms_client::storage::LocalStore;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily("logs", "client.log");
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

    // Open the local store; fall back to memory when the path is unusable
    let store = match LocalStore::open_file(&config.storage_path) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::error!(
                "cannot open local store at {:?}, using in-memory store: {}",
                config.storage_path,
                e
            );
            Arc::new(LocalStore::in_memory())
        }
    };

    // Daily cache reset runs once per calendar day at bootstrap
    match reset::run_daily_reset_now(&store, config.category_slots) {
        Ok(Some(audit)) => tracing::info!(
            "daily cache reset cleared {} slots",
            audit.cleared_categories.len()
        ),
        Ok(None) => tracing::debug!("cache already reset today"),
        Err(e) => tracing::warn!("daily cache reset failed: {}", e),
    }

    let api = Arc::new(HttpApi::new(&config.api_base_url).expect("API_BASE_URL must be a valid URL"));

    let state = SessionState::new(config, store, api.clone());
    state.initialize().await;

    tracing::info!(
        "session ready: logged_in={} balance={} responses={}",
        state.identity.is_logged_in(),
        state.points.balance(),
        state.surveys.responses().len()
    );

    // Dashboard refresh loop: re-fetch the user record on a fixed interval.
    // Stale responses are fenced off; Ctrl-C tears the poller down.
    let _poller = state.identity.user_id.clone().map(|user_id| {
        let api = Arc::clone(&api);
        poll::spawn_poller(
            Duration::from_secs(30),
            move || {
                let api = Arc::clone(&api);
                let user_id = user_id.clone();
                async move { api.fetch_user(&user_id).await }
            },
            |user| {
                tracing::info!("dashboard refresh: remote balance {}", user.points());
            },
        )
    });

    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutting down"),
        Err(e) => tracing::error!("failed to listen for shutdown signal: {}", e),
    }
}
