use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use shared::{FailureCategory, FailureReason, ValidationError};

use crate::repository::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{message}")]
    Rejected { reason: FailureReason, message: String },
}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        let reason = match e {
            ValidationError::InvalidMultiplier(_) => FailureReason::InvalidMultiplier,
            ValidationError::InvalidDuration | ValidationError::InvalidTimeRange { .. } => {
                FailureReason::InvalidDuration
            }
            ValidationError::UnknownBoosterType(_) => FailureReason::InvalidRequest,
        };
        AppError::Rejected {
            reason,
            message: e.to_string(),
        }
    }
}

impl AppError {
    fn category(&self) -> FailureCategory {
        match self {
            AppError::Store(_) => FailureCategory::Availability,
            AppError::NotFound(_) | AppError::InvalidInput(_) => FailureCategory::Validation,
            AppError::Rejected { reason, .. } => reason.category(),
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::Store(_) => "STORAGE_UNAVAILABLE",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::InvalidInput(_) => "VALIDATION_INVALID_INPUT",
            AppError::Rejected { reason, .. } => reason.code(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let category = self.category();
        let code = self.code();

        let (status, message) = match &self {
            AppError::Store(e) => {
                tracing::error!("Storage error: {:?}", e);
                (StatusCode::SERVICE_UNAVAILABLE, "Booster storage unavailable".to_string())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Rejected { message, .. } => (
                StatusCode::from_u16(category.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                message.clone(),
            ),
        };

        metrics::counter!("errors_total", "category" => category.as_str(), "code" => code).increment(1);

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
                "category": category.as_str(),
            }
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
