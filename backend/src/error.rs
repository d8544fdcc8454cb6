use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use shared::reveal::RevealError;
use shared::shared_egg_game::EggError;
use shared::shared_gift_game::GiftError;
use shared::shared_hunt_game::HuntError;
use shared::shared_match_game::FlipError;
use shared::shared_quiz_game::QuizError;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    SessionNotFound,
    UnknownGame(String),
    EmptyPrizeTable,
    BadRequest(String),
    Reveal(RevealError),
    Gift(GiftError),
    Egg(EggError),
    Flip(FlipError),
    Hunt(HuntError),
    Quiz(QuizError),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::SessionNotFound => write!(f, "Session not found"),
            AppError::UnknownGame(game) => write!(f, "Unknown game '{}'", game),
            AppError::EmptyPrizeTable => write!(f, "{}", shared::constants::EMPTY_PRIZE_TABLE_ERROR),
            AppError::BadRequest(message) => write!(f, "{}", message),
            AppError::Reveal(e) => write!(f, "{}", e),
            AppError::Gift(e) => write!(f, "{}", e),
            AppError::Egg(e) => write!(f, "{}", e),
            AppError::Flip(e) => write!(f, "{}", e),
            AppError::Hunt(e) => write!(f, "{}", e),
            AppError::Quiz(e) => write!(f, "{}", e),
            AppError::Internal(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::SessionNotFound | AppError::UnknownGame(_) => StatusCode::NOT_FOUND,
            AppError::EmptyPrizeTable => StatusCode::CONFLICT,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Reveal(e) => match e {
                RevealError::InvalidEmail => StatusCode::BAD_REQUEST,
                _ => StatusCode::CONFLICT,
            },
            AppError::Gift(e) => match e {
                GiftError::NoSuchBox(_) => StatusCode::BAD_REQUEST,
                GiftError::AlreadySelected => StatusCode::CONFLICT,
            },
            AppError::Egg(e) => match e {
                EggError::EmptyTable => StatusCode::CONFLICT,
                EggError::NoSuchEgg(_) | EggError::AlreadyCracked(_) => StatusCode::BAD_REQUEST,
            },
            AppError::Flip(e) => match e {
                FlipError::NoSuchCard(_) | FlipError::AlreadyFaceUp(_) => StatusCode::BAD_REQUEST,
                FlipError::Locked | FlipError::Completed => StatusCode::CONFLICT,
            },
            AppError::Hunt(e) => match e {
                HuntError::UnknownStep(_) => StatusCode::NOT_FOUND,
                HuntError::AlreadyCompleted(_) => StatusCode::CONFLICT,
            },
            AppError::Quiz(e) => match e {
                QuizError::AlreadyAnswered | QuizError::Finished => StatusCode::CONFLICT,
                QuizError::EmptyQuiz
                | QuizError::NoSuchOption(_)
                | QuizError::NothingSelected
                | QuizError::NoSuchQuestion(_)
                | QuizError::InvalidAnswer(_)
                | QuizError::StepIncomplete(_) => StatusCode::BAD_REQUEST,
            },
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<RevealError> for AppError {
    fn from(e: RevealError) -> Self {
        AppError::Reveal(e)
    }
}

impl From<GiftError> for AppError {
    fn from(e: GiftError) -> Self {
        AppError::Gift(e)
    }
}

impl From<EggError> for AppError {
    fn from(e: EggError) -> Self {
        match e {
            EggError::EmptyTable => AppError::EmptyPrizeTable,
            other => AppError::Egg(other),
        }
    }
}

impl From<FlipError> for AppError {
    fn from(e: FlipError) -> Self {
        AppError::Flip(e)
    }
}

impl From<HuntError> for AppError {
    fn from(e: HuntError) -> Self {
        AppError::Hunt(e)
    }
}

impl From<QuizError> for AppError {
    fn from(e: QuizError) -> Self {
        AppError::Quiz(e)
    }
}
