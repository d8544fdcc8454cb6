use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use shared::shared_hunt_game::{HuntStep, ScavengerHunt, StepCompletion};
use tracing::info;

use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HuntView {
    pub player: String,
    pub steps: Vec<HuntStep>,
    pub streak: u32,
    pub completed_count: usize,
    pub progress_percent: f64,
    pub completed: bool,
}

impl HuntView {
    fn new(player: String, hunt: ScavengerHunt) -> Self {
        Self {
            completed_count: hunt.completed_count(),
            progress_percent: hunt.progress_percent(),
            completed: hunt.is_complete(),
            player,
            steps: hunt.steps,
            streak: hunt.streak,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CompleteStepResponse {
    pub completion: StepCompletion,
    pub hunt: HuntView,
}

async fn get_hunt(State(state): State<AppState>, Path(player): Path<String>) -> Json<HuntView> {
    let store = state.store.lock().await;
    let hunt = ScavengerHunt::load(&**store, Some(&player));
    Json(HuntView::new(player, hunt))
}

async fn complete_step(
    State(state): State<AppState>,
    Path((player, step)): Path<(String, String)>,
) -> Result<Json<CompleteStepResponse>, AppError> {
    let mut store = state.store.lock().await;
    let mut hunt = ScavengerHunt::load(&**store, Some(&player));
    let completion = hunt.complete_step(&mut **store, &step)?;
    if completion.hunt_completed {
        info!("Player {} finished the scavenger hunt", player);
    }
    Ok(Json(CompleteStepResponse {
        completion,
        hunt: HuntView::new(player, hunt),
    }))
}

async fn reset_hunt(State(state): State<AppState>, Path(player): Path<String>) -> Json<HuntView> {
    let mut store = state.store.lock().await;
    let mut hunt = ScavengerHunt::load(&**store, Some(&player));
    hunt.reset(&mut **store);
    Json(HuntView::new(player, hunt))
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/:player", get(get_hunt))
        .route("/:player/steps/:step/complete", post(complete_step))
        .route("/:player/reset", post(reset_hunt))
}

#[cfg(test)]
mod tests {
    use crate::test_support::{call, test_app};
    use axum::http::StatusCode;
    use shared::reveal::RevealSettings;
    use shared::shared_hunt_game::default_steps;

    #[tokio::test]
    async fn test_hunt_progress_is_kept_per_player() {
        let app = test_app(RevealSettings::default(), Default::default());
        let first_step = default_steps()[0].id.clone();

        let (status, body) = call(&app, "GET", "/api/hunt/ana", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["completed_count"], 0);

        let uri = format!("/api/hunt/ana/steps/{}/complete", first_step);
        let (status, body) = call(&app, "POST", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["completion"]["streak"], 1);
        assert_eq!(body["hunt"]["completed_count"], 1);

        let (status, _) = call(&app, "POST", &uri, None).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (_, body) = call(&app, "GET", "/api/hunt/ana", None).await;
        assert_eq!(body["completed_count"], 1);
        let (_, body) = call(&app, "GET", "/api/hunt/ben", None).await;
        assert_eq!(body["completed_count"], 0);

        let (status, body) = call(&app, "POST", "/api/hunt/ana/reset", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["completed_count"], 0);
        assert_eq!(body["streak"], 0);
    }

    #[tokio::test]
    async fn test_unknown_step_is_not_found() {
        let app = test_app(RevealSettings::default(), Default::default());
        let (status, body) = call(&app, "POST", "/api/hunt/ana/steps/nowhere/complete", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("nowhere"));
    }
}
