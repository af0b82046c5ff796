//! Shared handler state and error mapping
//!
//! Every `/api` response uses the `{success, data?, error?}` envelope, errors
//! included. [`ApiError`] carries the HTTP status alongside the message so a
//! failed request keeps the envelope while still answering 400/404/413/500.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::config::UploadConfig;
use crate::db::DynDatabasePool;
use crate::services::{
    CarouselService, EventService, ExhibitorService, NotificationService, ServiceError,
    SettingsService,
};
use crate::validation::ValidationErrors;

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub pool: DynDatabasePool,
    pub exhibitor_service: Arc<ExhibitorService>,
    pub event_service: Arc<EventService>,
    pub notification_service: Arc<NotificationService>,
    pub carousel_service: Arc<CarouselService>,
    pub settings_service: Arc<SettingsService>,
    pub upload_config: Arc<UploadConfig>,
}

/// Error half of the response envelope
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    /// Per-field messages for rejected input
    pub fields: Option<ValidationErrors>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    success: bool,
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<&'a ValidationErrors>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            fields: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn invalid_fields(errors: ValidationErrors) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: "Dados inválidos".to_string(),
            fields: Some(errors),
        }
    }

    pub fn payload_too_large(message: impl Into<String>) -> Self {
        Self::new(StatusCode::PAYLOAD_TOO_LARGE, message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(message) => ApiError::not_found(message),
            ServiceError::Validation(errors) => ApiError::invalid_fields(errors),
            ServiceError::Internal(e) => {
                tracing::error!("Request failed: {:#}", e);
                ApiError::internal_error("Erro interno do servidor")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            success: false,
            error: &self.message,
            errors: self.fields.as_ref(),
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_errors_map_to_status() {
        let not_found: ApiError = ServiceError::NotFound("Evento 1 não encontrado".into()).into();
        assert_eq!(not_found.status, StatusCode::NOT_FOUND);
        assert_eq!(not_found.message, "Evento 1 não encontrado");

        let mut errors = ValidationErrors::new();
        errors.add("title", "Título é obrigatório");
        let invalid: ApiError = ServiceError::Validation(errors).into();
        assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
        assert!(invalid.fields.is_some());

        let internal: ApiError = ServiceError::Internal(anyhow::anyhow!("disk on fire")).into();
        assert_eq!(internal.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!internal.message.contains("disk"));
    }
}
