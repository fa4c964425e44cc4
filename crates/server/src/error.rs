use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uramix_core::EngineError;

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Operator key required")]
    Unauthorized,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Engine(e) => match e {
                EngineError::NotFound { .. } => StatusCode::NOT_FOUND,
                EngineError::InvalidToken => StatusCode::NOT_FOUND,
                EngineError::InvalidState(_) => StatusCode::CONFLICT,
                EngineError::AlreadyRedeemed => StatusCode::CONFLICT,
                EngineError::ReferralAlreadyUsed => StatusCode::CONFLICT,
                EngineError::AccountExists(_) => StatusCode::CONFLICT,
                EngineError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                EngineError::InsufficientCredits { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                EngineError::InsufficientStock { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                EngineError::InsufficientBalance { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                EngineError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            },
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "success": false,
            "error": self.to_string(),
        }));

        (self.status(), body).into_response()
    }
}
