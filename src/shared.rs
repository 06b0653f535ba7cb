use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

use crate::account::repository::AccountRepository;
use crate::auth::token::TokenConfig;
use crate::config::AppConfig;
use crate::generator::{GenerationError, GenerationService};
use crate::report::RangeReportView;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub account_repository: Arc<dyn AccountRepository + Send + Sync>,
    pub generation_service: Arc<GenerationService>,
    pub report_view: Arc<RangeReportView>,
    pub token_config: TokenConfig,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(
        account_repository: Arc<dyn AccountRepository + Send + Sync>,
        generation_service: Arc<GenerationService>,
        token_config: TokenConfig,
        config: Arc<AppConfig>,
    ) -> Self {
        let report_view = Arc::new(RangeReportView::new(Arc::clone(&account_repository)));
        Self {
            account_repository,
            generation_service,
            report_view,
            token_config,
            config,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("JWT error: {0}")]
    JwtError(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation failed")]
    Validation(BTreeMap<String, String>),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    #[error("Internal server error")]
    Internal,
}

impl From<GenerationError> for AppError {
    fn from(error: GenerationError) -> Self {
        match error {
            GenerationError::InvalidRequest(errors) => AppError::Validation(
                errors
                    .into_iter()
                    .map(|(field, message)| (field.to_string(), message))
                    .collect(),
            ),
            GenerationError::UsernameCollision(_) => AppError::Conflict(error.to_string()),
            GenerationError::Forbidden => AppError::Forbidden(error.to_string()),
            GenerationError::DataUnavailable(msg) => AppError::DataUnavailable(msg),
            GenerationError::AccountCreationFailed { .. } | GenerationError::Storage(_) => {
                AppError::DatabaseError(error.to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::JwtError(msg) => (StatusCode::UNAUTHORIZED, json!({ "error": msg })),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, json!({ "error": msg })),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, json!({ "error": msg })),
            AppError::Validation(fields) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "error": "Validation failed", "fields": fields }),
            ),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, json!({ "error": msg })),
            AppError::DatabaseError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": format!("Database error: {}", msg) }),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            AppError::DataUnavailable(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": format!("Data unavailable: {}", msg) }),
            ),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Internal server error" }),
            ),
        };

        (status, Json(body)).into_response()
    }
}
