use chrono::Utc;
use uuid::Uuid;

use crate::{
    dto::auth::{LoginRequest, LoginResponse, RegisterRequest},
    error::{AppError, AppResult},
    gateway::GatewayErrorKind,
    models::{NewUser, User},
    response::ApiResponse,
    session::Session,
    state::AppState,
    validation,
};

pub const ADMIN_EMAIL: &str = "admin@textil.com";
pub const ADMIN_PASSWORD: &str = "123456";

pub async fn register(state: &AppState, payload: RegisterRequest) -> AppResult<ApiResponse<User>> {
    validation::validate_nombre(&payload.nombre)?;
    validation::validate_email(&payload.email)?;
    validation::validate_password(&payload.password)?;
    validation::validate_password_confirmation(&payload.password, &payload.confirm_password)?;

    state
        .gateway
        .ping()
        .await
        .map_err(|err| AppError::Network {
            details: Some(err.message),
        })?;

    // Pre-check before the insert; the unique constraint still backs
    // this up when two registrations race.
    if state
        .gateway
        .find_user_by_email(&payload.email)
        .await?
        .is_some()
    {
        return Err(AppError::DuplicateEmail);
    }

    let user = state
        .gateway
        .insert_user(NewUser {
            nombre: payload.nombre,
            email: payload.email,
            password: payload.password,
        })
        .await?;

    Ok(ApiResponse::success("Usuario registrado", user))
}

pub async fn login(state: &AppState, payload: LoginRequest) -> AppResult<ApiResponse<LoginResponse>> {
    if payload.email.is_empty() || payload.password.is_empty() {
        return Err(AppError::Validation(
            "Email y contraseña son obligatorios".into(),
        ));
    }

    // Hard-coded administrator pair, resolved without touching the gateway.
    if payload.email == ADMIN_EMAIL && payload.password == ADMIN_PASSWORD {
        let usuario = User {
            id: Uuid::nil(),
            nombre: "Administrador".into(),
            email: payload.email,
            created_at: Utc::now(),
        };
        return start_session(state, usuario).await;
    }

    state
        .gateway
        .ping()
        .await
        .map_err(|err| AppError::Network {
            details: Some(err.message),
        })?;

    let usuario = state
        .gateway
        .find_user_by_credentials(&payload.email, &payload.password)
        .await
        .map_err(|err| match err.kind {
            GatewayErrorKind::Unavailable => AppError::Network {
                details: Some(err.message),
            },
            _ => AppError::InvalidCredentials,
        })?
        .ok_or(AppError::InvalidCredentials)?;

    start_session(state, usuario).await
}

pub async fn logout(state: &AppState, token: Uuid) -> AppResult<ApiResponse<serde_json::Value>> {
    state.sessions.clear(token).await;
    Ok(ApiResponse::success("Sesión cerrada", serde_json::json!({})))
}

async fn start_session(state: &AppState, usuario: User) -> AppResult<ApiResponse<LoginResponse>> {
    let session = Session::new(usuario);
    state.sessions.save(session.clone()).await;
    Ok(ApiResponse::success(
        "Sesión iniciada",
        LoginResponse {
            token: session.token,
            usuario: session.usuario,
        },
    ))
}
