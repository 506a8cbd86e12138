use axum::{extract::FromRequestParts, http::header};
use uuid::Uuid;

use crate::{error::AppError, models::User, state::AppState};

/// Caller identity resolved from the bearer token via the session store.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub token: Uuid,
    pub usuario: User,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| AppError::Validation("Falta el encabezado Authorization".into()))?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::Validation("Encabezado Authorization inválido".into()))?;

        let Some(token) = auth_str.strip_prefix("Bearer ") else {
            return Err(AppError::Validation(
                "Esquema de Authorization inválido".into(),
            ));
        };

        let token = Uuid::parse_str(token.trim()).map_err(|_| AppError::InvalidCredentials)?;

        let session = state
            .sessions
            .load(token)
            .await
            .ok_or(AppError::InvalidCredentials)?;

        Ok(AuthUser {
            token,
            usuario: session.usuario,
        })
    }
}
