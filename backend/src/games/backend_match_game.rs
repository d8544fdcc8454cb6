use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use shared::constants::MATCH_HIDE_DELAY_MS;
use shared::shared_match_game::{FlipOutcome, FlipRequest, FlipResponse, MatchGame, NewMatchResponse, PublicMatchGame};
use shared::sound::{AudioService, GameSound, MemoryAction, SoundBoard};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::{now_ms, now_secs};

pub struct MatchSession {
    pub game: MatchGame,
    pub created_at: u64,
    pub sound: SoundBoard,
}

#[derive(Clone, Default)]
pub struct MatchGameState {
    pub sessions: Arc<Mutex<HashMap<Uuid, MatchSession>>>,
}

impl MatchGameState {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn cleanup_expired_sessions(&self, now: u64, expiry_seconds: u64) -> usize {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, session| now.saturating_sub(session.created_at) < expiry_seconds);
        before - sessions.len()
    }
}

async fn new_game(State(state): State<Arc<MatchGameState>>) -> Json<NewMatchResponse> {
    let game = {
        let mut rng = rand::thread_rng();
        MatchGame::shuffled(&mut rng)
    };
    let session_id = Uuid::new_v4();
    let public = game.to_public();

    state.sessions.lock().await.insert(
        session_id,
        MatchSession {
            game,
            created_at: now_secs(),
            sound: SoundBoard::default(),
        },
    );
    info!("New memory match {}", session_id);

    Json(NewMatchResponse {
        session_id: session_id.to_string(),
        game: public,
    })
}

async fn get_game(
    State(state): State<Arc<MatchGameState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<PublicMatchGame>, AppError> {
    let mut sessions = state.sessions.lock().await;
    let session = sessions.get_mut(&id).ok_or(AppError::SessionNotFound)?;
    session.game.hide_unmatched(now_ms());
    Ok(Json(session.game.to_public()))
}

async fn flip(
    State(state): State<Arc<MatchGameState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<FlipRequest>,
) -> Result<Json<FlipResponse>, AppError> {
    let mut sessions = state.sessions.lock().await;
    let session = sessions.get_mut(&id).ok_or(AppError::SessionNotFound)?;

    let outcome = session.game.flip(payload.card_index, now_ms())?;
    session.sound.play_game(GameSound::Memory(MemoryAction::Flip));
    match outcome {
        FlipOutcome::Matched { completed } => {
            session.sound.play_game(GameSound::Memory(MemoryAction::Match));
            if completed {
                session.sound.play_game(GameSound::Memory(MemoryAction::Complete));
                info!("Memory match {} completed in {} moves", id, session.game.moves);
            }
        }
        FlipOutcome::Mismatched => {
            // Turn the pair back over once the player has had a look.
            let state_clone = state.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(MATCH_HIDE_DELAY_MS)).await;
                let mut sessions = state_clone.sessions.lock().await;
                if let Some(session) = sessions.get_mut(&id) {
                    session.game.hide_unmatched(now_ms());
                }
            });
        }
        FlipOutcome::Flipped => {}
    }

    Ok(Json(FlipResponse {
        outcome,
        game: session.game.to_public(),
        sounds: session.sound.take_cues(),
    }))
}

pub fn create_router() -> Router<Arc<MatchGameState>> {
    Router::new()
        .route("/", post(new_game))
        .route("/:id", get(get_game))
        .route("/:id/flip", post(flip))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{call, test_app};
    use axum::http::StatusCode;
    use serde_json::json;
    use shared::reveal::RevealSettings;

    #[tokio::test]
    async fn test_new_game_hides_every_card() {
        let app = test_app(RevealSettings::default(), Default::default());
        let (status, body) = call(&app, "POST", "/api/match", None).await;
        assert_eq!(status, StatusCode::OK);
        let cards = body["game"]["cards"].as_array().unwrap();
        assert_eq!(cards.len(), 16);
        assert!(cards.iter().all(|c| c["animal"].is_null()));
        assert_eq!(body["game"]["total_pairs"], 8);
    }

    #[tokio::test]
    async fn test_flip_rules() {
        let app = test_app(RevealSettings::default(), Default::default());
        let (_, body) = call(&app, "POST", "/api/match", None).await;
        let id = body["session_id"].as_str().unwrap().to_string();
        let flip_uri = format!("/api/match/{}/flip", id);

        let (status, first) = call(&app, "POST", &flip_uri, Some(json!({ "card_index": 0 }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["outcome"]["outcome"], "flipped");
        assert!(!first["game"]["cards"][0]["animal"].is_null());
        assert_eq!(first["sounds"][0]["sound"], "click");

        let (status, _) = call(&app, "POST", &flip_uri, Some(json!({ "card_index": 0 }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = call(&app, "POST", &flip_uri, Some(json!({ "card_index": 99 }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, second) = call(&app, "POST", &flip_uri, Some(json!({ "card_index": 1 }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(second["game"]["moves"], 1);
        if second["outcome"]["outcome"] == "mismatched" {
            let (status, _) = call(&app, "POST", &flip_uri, Some(json!({ "card_index": 2 }))).await;
            assert_eq!(status, StatusCode::CONFLICT);
        } else {
            assert_eq!(second["game"]["matched_pairs"], 1);
        }
    }

    #[tokio::test]
    async fn test_unknown_match_session() {
        let app = test_app(RevealSettings::default(), Default::default());
        let (status, _) = call(&app, "GET", &format!("/api/match/{}", Uuid::new_v4()), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_cleanup_drops_old_games() {
        let state = MatchGameState::new();
        state.sessions.lock().await.insert(
            Uuid::new_v4(),
            MatchSession {
                game: MatchGame::new(Vec::new()),
                created_at: 0,
                sound: SoundBoard::default(),
            },
        );
        assert_eq!(state.cleanup_expired_sessions(10, 900).await, 0);
        assert_eq!(state.cleanup_expired_sessions(900, 900).await, 1);
    }
}
