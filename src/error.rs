use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::{
    gateway::{GatewayError, GatewayErrorKind},
    response::ApiResponse,
};

/// Wire codes for the `error.type` field of the response envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorType {
    NetworkError,
    ValidationError,
    DuplicateEmail,
    InvalidCredentials,
    UserNotFound,
    ProductError,
    OrderError,
    UnknownError,
}

/// Operation failures, one variant per error bucket. Display strings are
/// the user-facing messages, already in Spanish.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("No se puede conectar a la base de datos")]
    Network { details: Option<String> },

    #[error("{0}")]
    Validation(String),

    #[error("El correo electrónico ya está registrado")]
    DuplicateEmail,

    #[error("Credenciales incorrectas")]
    InvalidCredentials,

    #[error("Usuario no encontrado")]
    UserNotFound,

    #[error("{0}")]
    Product(String),

    #[error("{0}")]
    Order(String),

    #[error("Ocurrió un error inesperado. Intenta nuevamente.")]
    Unknown { details: Option<String> },
}

impl AppError {
    pub fn error_type(&self) -> ErrorType {
        match self {
            AppError::Network { .. } => ErrorType::NetworkError,
            AppError::Validation(_) => ErrorType::ValidationError,
            AppError::DuplicateEmail => ErrorType::DuplicateEmail,
            AppError::InvalidCredentials => ErrorType::InvalidCredentials,
            AppError::UserNotFound => ErrorType::UserNotFound,
            AppError::Product(_) => ErrorType::ProductError,
            AppError::Order(_) => ErrorType::OrderError,
            AppError::Unknown { .. } => ErrorType::UnknownError,
        }
    }

    pub fn details(&self) -> Option<&str> {
        match self {
            AppError::Network { details } | AppError::Unknown { details } => details.as_deref(),
            _ => None,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::Network { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::DuplicateEmail => StatusCode::CONFLICT,
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::UserNotFound => StatusCode::NOT_FOUND,
            AppError::Product(_) | AppError::Order(_) => StatusCode::BAD_REQUEST,
            AppError::Unknown { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error body carried inside the response envelope.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApiError {
    #[serde(rename = "type")]
    pub error_type: ErrorType,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl From<&AppError> for ApiError {
    fn from(err: &AppError) -> Self {
        ApiError {
            error_type: err.error_type(),
            message: err.to_string(),
            details: err.details().map(str::to_owned),
        }
    }
}

// Fallback classification from the gateway's typed codes. Services
// override this wherever an operation demands its own bucket.
impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        match err.kind {
            GatewayErrorKind::Unavailable => AppError::Network {
                details: Some(err.message),
            },
            GatewayErrorKind::UniqueViolation => AppError::DuplicateEmail,
            GatewayErrorKind::ConstraintViolation => {
                AppError::Validation("Los datos proporcionados no son válidos".into())
            }
            GatewayErrorKind::NotFound | GatewayErrorKind::Other => AppError::Unknown {
                details: Some(err.message),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ApiResponse::<serde_json::Value>::failure(ApiError::from(&self));
        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_codes_use_screaming_snake_case() {
        let json = serde_json::to_string(&ErrorType::NetworkError).unwrap();
        assert_eq!(json, "\"NETWORK_ERROR\"");
        let json = serde_json::to_string(&ErrorType::DuplicateEmail).unwrap();
        assert_eq!(json, "\"DUPLICATE_EMAIL\"");
    }

    #[test]
    fn gateway_kinds_map_to_buckets() {
        let err = AppError::from(GatewayError::unavailable("sin conexión"));
        assert_eq!(err.error_type(), ErrorType::NetworkError);

        let err = AppError::from(GatewayError::new(
            GatewayErrorKind::UniqueViolation,
            "usuarios_email_key",
        ));
        assert_eq!(err.error_type(), ErrorType::DuplicateEmail);

        let err = AppError::from(GatewayError::new(
            GatewayErrorKind::ConstraintViolation,
            "violación de integridad",
        ));
        assert_eq!(err.error_type(), ErrorType::ValidationError);

        let err = AppError::from(GatewayError::new(GatewayErrorKind::Other, "boom"));
        assert_eq!(err.error_type(), ErrorType::UnknownError);
    }

    #[test]
    fn envelope_keeps_details() {
        let err = AppError::Network {
            details: Some("timeout".into()),
        };
        let body = ApiError::from(&err);
        assert_eq!(body.details.as_deref(), Some("timeout"));
        assert_eq!(body.message, "No se puede conectar a la base de datos");
    }
}
