use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use impostor::{
    broadcast,
    config::{GameConfig, ServerConfig},
    state::AppState,
    words::WordPool,
    ws,
};

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist, only log if it's a different issue
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "impostor=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting impostor...");

    let server_config = ServerConfig::from_env();
    let game_config = GameConfig::from_env();
    tracing::info!(
        "Lobby size {} (max {}), {} association rounds",
        game_config.lobby_size,
        game_config.max_lobby_size,
        game_config.association_rounds
    );

    let words = match WordPool::load(&server_config.words_file).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::warn!("{}. Games cannot start until words are available.", e);
            WordPool::default()
        }
    };
    if words.is_empty() {
        tracing::warn!(
            "Word pool is empty; populate {} and restart",
            server_config.words_file.display()
        );
    }

    let state = Arc::new(AppState::new(words, game_config));

    // Forces the vote in games that stall in the association phase (if configured)
    broadcast::spawn_association_deadline_watcher(state.clone());

    let app = Router::new()
        .route("/ws", get(ws::ws_handler))
        .route("/health", get(|| async { "ok" }))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    tracing::info!("Listening on http://{}", server_config.bind_addr);

    let listener = tokio::net::TcpListener::bind(server_config.bind_addr)
        .await
        .unwrap();
    axum::serve(listener, app).await.unwrap();
}
