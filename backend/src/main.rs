use axum::extract::Path;
use axum::http::{header::HeaderName, Method};
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde::Serialize;
use shared::config::GameKind;
use shared::stats::PlayStats;
use shared::storage::KeyValueStore;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{Mutex, RwLock};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config_loader::{spawn_config_loads, GameConfigs, SharedConfigs};
use crate::error::AppError;
use crate::games::backend_hunt_game::create_router as create_hunt_router;
use crate::games::backend_match_game::{create_router as create_match_game_router, MatchGameState};
use crate::games::backend_prize_game::{create_router as create_prize_game_router, PrizeGameState};
use crate::games::backend_quiz_game::{create_router as create_quiz_router, QuizGameState};
use crate::settings::Settings;
use crate::store::FileStore;

mod config_loader;
mod error;
mod games;
mod logging;
mod settings;
mod store;

pub type SharedStore = Arc<Mutex<Box<dyn KeyValueStore + Send>>>;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub configs: SharedConfigs,
    pub store: SharedStore,
    pub stats: Arc<Mutex<StatsBook>>,
}

/// Play counters for the whole host and per game.
#[derive(Debug, Default)]
pub struct StatsBook {
    overall: PlayStats,
    games: HashMap<GameKind, PlayStats>,
}

impl StatsBook {
    pub fn record(&mut self, kind: GameKind, is_win: bool, payout: f64) {
        self.overall.record(is_win, payout);
        self.games.entry(kind).or_default().record(is_win, payout);
    }
}

#[derive(Debug, Serialize)]
struct StatsResponse {
    overall: PlayStats,
    win_rate: f64,
    games: HashMap<GameKind, PlayStats>,
}

pub fn now_ms() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}

pub fn now_secs() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}

async fn health_check() -> &'static str {
    "OK"
}

async fn get_stats(Extension(state): Extension<AppState>) -> Json<StatsResponse> {
    let stats = state.stats.lock().await;
    Json(StatsResponse {
        overall: stats.overall.clone(),
        win_rate: stats.overall.win_rate(),
        games: stats.games.clone(),
    })
}

async fn get_game_config(
    Extension(state): Extension<AppState>,
    Path(game): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let kind = GameKind::from_str(&game).map_err(|_| AppError::UnknownGame(game.clone()))?;
    let configs = state.configs.read().await;
    let document = configs
        .document(kind)
        .map_err(|e| AppError::Internal(format!("Could not serialise {} configuration: {}", kind, e)))?;
    Ok(Json(document))
}

pub fn build_app(
    state: AppState,
    prize_state: Arc<PrizeGameState>,
    match_state: Arc<MatchGameState>,
    quiz_state: Arc<QuizGameState>,
) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(vec![Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(vec![HeaderName::from_static("content-type")]);

    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/stats", get(get_stats))
        .route("/api/games/:game/config", get(get_game_config))
        .nest("/api/sessions", create_prize_game_router().with_state(prize_state))
        .nest("/api/match", create_match_game_router().with_state(match_state))
        .nest("/api/quiz", create_quiz_router().with_state(quiz_state))
        .nest("/api/hunt", create_hunt_router().with_state(state.clone()))
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::setup();
    dotenvy::from_path(".env").ok();

    let settings = Settings::from_env();
    let file_store = FileStore::open(&settings.store_path);
    info!("Progress store at {}", file_store.path().display());

    let configs: SharedConfigs = Arc::new(RwLock::new(GameConfigs::default()));
    spawn_config_loads(&reqwest::Client::new(), &settings.config_base, &configs);

    let store: Box<dyn KeyValueStore + Send> = Box::new(file_store.spawn_writer());
    let state = AppState {
        settings: Arc::new(settings.clone()),
        configs,
        store: Arc::new(Mutex::new(store)),
        stats: Arc::new(Mutex::new(StatsBook::default())),
    };
    let prize_state = Arc::new(PrizeGameState::new());
    let match_state = Arc::new(MatchGameState::new());
    let quiz_state = Arc::new(QuizGameState::new());

    // Purge abandoned sessions
    let prize_clone = prize_state.clone();
    let match_clone = match_state.clone();
    let quiz_clone = quiz_state.clone();
    let expiry = settings.session_expiry_seconds;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            let now = now_secs();
            let removed = prize_clone.cleanup_expired_sessions(now, expiry).await
                + match_clone.cleanup_expired_sessions(now, expiry).await
                + quiz_clone.cleanup_expired_sessions(now, expiry).await;
            if removed > 0 {
                info!("Removed {} expired sessions", removed);
            }
        }
    });

    let app = build_app(state, prize_state, match_state, quiz_state);

    info!("listening on {}", settings.bind_addr);
    let listener = TcpListener::bind(settings.bind_addr).await?;
    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
