use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use shared::shared_quiz_game::{
    Answer, PublicSingleQuiz, PublicStepQuiz, QuizQuestion, QuizStep, SingleQuiz, StepAdvance, StepQuiz,
};
use shared::sound::{AudioService, GameSound, QuizAction, SoundBoard, SoundCue};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::{now_ms, now_secs};

pub enum QuizKind {
    Single(SingleQuiz),
    Steps(StepQuiz),
}

pub struct QuizSession {
    pub quiz: QuizKind,
    pub created_at: u64,
    pub sound: SoundBoard,
}

#[derive(Clone, Default)]
pub struct QuizGameState {
    pub sessions: Arc<Mutex<HashMap<Uuid, QuizSession>>>,
}

impl QuizGameState {
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

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NewQuizRequest {
    Single { quiz: QuizQuestion },
    Steps { steps: Vec<QuizStep> },
}

#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    pub option: usize,
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub question_id: String,
    pub value: Answer,
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuizView {
    Single { quiz: PublicSingleQuiz },
    Steps { quiz: PublicStepQuiz },
}

#[derive(Debug, Serialize)]
pub struct QuizResponse {
    pub session_id: Uuid,
    pub view: QuizView,
    pub advance: Option<StepAdvance>,
    pub sounds: Vec<SoundCue>,
}

impl QuizSession {
    fn respond(&mut self, id: Uuid, advance: Option<StepAdvance>) -> QuizResponse {
        let view = match &self.quiz {
            QuizKind::Single(quiz) => QuizView::Single {
                quiz: quiz.to_public(now_ms()),
            },
            QuizKind::Steps(quiz) => QuizView::Steps { quiz: quiz.to_public() },
        };
        QuizResponse {
            session_id: id,
            view,
            advance,
            sounds: self.sound.take_cues(),
        }
    }

    fn single(&mut self) -> Result<&mut SingleQuiz, AppError> {
        match &mut self.quiz {
            QuizKind::Single(quiz) => Ok(quiz),
            QuizKind::Steps(_) => Err(AppError::BadRequest("This is a step quiz".to_string())),
        }
    }

    fn steps(&mut self) -> Result<&mut StepQuiz, AppError> {
        match &mut self.quiz {
            QuizKind::Steps(quiz) => Ok(quiz),
            QuizKind::Single(_) => Err(AppError::BadRequest("This is a single question quiz".to_string())),
        }
    }
}

async fn with_quiz<F>(state: &QuizGameState, id: Uuid, f: F) -> Result<Json<QuizResponse>, AppError>
where
    F: FnOnce(&mut QuizSession) -> Result<Option<StepAdvance>, AppError>,
{
    let mut sessions = state.sessions.lock().await;
    let session = sessions.get_mut(&id).ok_or(AppError::SessionNotFound)?;
    let advance = f(session)?;
    Ok(Json(session.respond(id, advance)))
}

async fn new_quiz(
    State(state): State<Arc<QuizGameState>>,
    Json(payload): Json<NewQuizRequest>,
) -> Result<Json<QuizResponse>, AppError> {
    let quiz = match payload {
        NewQuizRequest::Single { quiz } => QuizKind::Single(SingleQuiz::new(quiz)?),
        NewQuizRequest::Steps { steps } => QuizKind::Steps(StepQuiz::new(steps)?),
    };
    let id = Uuid::new_v4();
    let mut session = QuizSession {
        quiz,
        created_at: now_secs(),
        sound: SoundBoard::default(),
    };
    let response = session.respond(id, None);
    state.sessions.lock().await.insert(id, session);
    info!("New quiz {}", id);
    Ok(Json(response))
}

async fn get_quiz(
    State(state): State<Arc<QuizGameState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<QuizResponse>, AppError> {
    with_quiz(&state, id, |_| Ok(None)).await
}

async fn select(
    State(state): State<Arc<QuizGameState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SelectRequest>,
) -> Result<Json<QuizResponse>, AppError> {
    with_quiz(&state, id, |session| {
        session.single()?.select(payload.option)?;
        session.sound.play_game(GameSound::Quiz(QuizAction::Select));
        Ok(None)
    })
    .await
}

async fn submit(
    State(state): State<Arc<QuizGameState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<QuizResponse>, AppError> {
    let now = now_ms();
    with_quiz(&state, id, |session| {
        let correct = session.single()?.submit(now)?;
        let action = if correct { QuizAction::Correct } else { QuizAction::Incorrect };
        session.sound.play_game(GameSound::Quiz(action));
        Ok(None)
    })
    .await
}

async fn answer(
    State(state): State<Arc<QuizGameState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AnswerRequest>,
) -> Result<Json<QuizResponse>, AppError> {
    with_quiz(&state, id, |session| {
        session.steps()?.answer(&payload.question_id, payload.value)?;
        Ok(None)
    })
    .await
}

async fn next_step(
    State(state): State<Arc<QuizGameState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<QuizResponse>, AppError> {
    with_quiz(&state, id, |session| {
        let advance = session.steps()?.next()?;
        if matches!(advance, StepAdvance::Finished { .. }) {
            session.sound.play_game(GameSound::Quiz(QuizAction::Complete));
            info!("Quiz {} finished", id);
        }
        Ok(Some(advance))
    })
    .await
}

async fn previous_step(
    State(state): State<Arc<QuizGameState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<QuizResponse>, AppError> {
    with_quiz(&state, id, |session| {
        session.steps()?.back()?;
        Ok(None)
    })
    .await
}

async fn retry(
    State(state): State<Arc<QuizGameState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<QuizResponse>, AppError> {
    with_quiz(&state, id, |session| {
        match &mut session.quiz {
            QuizKind::Single(quiz) => quiz.retry(),
            QuizKind::Steps(quiz) => quiz.retry(),
        }
        Ok(None)
    })
    .await
}

pub fn create_router() -> Router<Arc<QuizGameState>> {
    Router::new()
        .route("/", post(new_quiz))
        .route("/:id", get(get_quiz))
        .route("/:id/select", post(select))
        .route("/:id/submit", post(submit))
        .route("/:id/answer", post(answer))
        .route("/:id/next", post(next_step))
        .route("/:id/back", post(previous_step))
        .route("/:id/retry", post(retry))
}
