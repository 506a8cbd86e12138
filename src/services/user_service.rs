use uuid::Uuid;

use crate::{
    dto::users::UserList,
    error::{AppError, AppResult},
    gateway::GatewayErrorKind,
    models::User,
    response::ApiResponse,
    state::AppState,
};

pub async fn list_users(state: &AppState) -> AppResult<ApiResponse<UserList>> {
    let items = state.gateway.list_users().await?;
    Ok(ApiResponse::success("Usuarios", UserList { items }))
}

pub async fn get_user(state: &AppState, id: Uuid) -> AppResult<ApiResponse<User>> {
    if id.is_nil() {
        return Err(AppError::Validation("ID de usuario es requerido".into()));
    }

    let usuario = state
        .gateway
        .find_user_by_id(id)
        .await
        .map_err(|err| match err.kind {
            GatewayErrorKind::Unavailable => AppError::Network {
                details: Some(err.message),
            },
            _ => AppError::UserNotFound,
        })?
        .ok_or(AppError::UserNotFound)?;

    Ok(ApiResponse::success("Usuario", usuario))
}
