//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Form, Json,
    extract::State,
    http::StatusCode,
};

use crate::{
    infrastructure::dto::http::{
        ErrorDto, OnlineUsersDto, RegisterRequest, TokenRequest, TokenResponse, UserDto,
    },
    ui::state::AppState,
    usecase::{IssueTokenError, RegisterError},
};

type ApiError = (StatusCode, Json<ErrorDto>);

fn api_error(status: StatusCode, detail: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorDto {
            detail: detail.into(),
        }),
    )
}

/// Welcome endpoint
pub async fn welcome() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Welcome to hiroba",
        "websocket": "/ws?token=<access_token>",
    }))
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Snapshot of currently connected usernames (registration order)
pub async fn online_users(State(state): State<Arc<AppState>>) -> Json<OnlineUsersDto> {
    let users = state
        .list_online_users_usecase
        .usernames()
        .await
        .into_iter()
        .map(|name| name.into_string())
        .collect();
    Json(OnlineUsersDto { users })
}

/// `POST /auth/register`
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserDto>), ApiError> {
    match state
        .register_user_usecase
        .execute(request.username, &request.password)
        .await
    {
        Ok(user) => Ok((StatusCode::CREATED, Json(UserDto::from(&user)))),
        Err(e @ RegisterError::DuplicateUser(_)) => {
            Err(api_error(StatusCode::CONFLICT, e.to_string()))
        }
        Err(e @ (RegisterError::InvalidUserName(_) | RegisterError::EmptyPassword)) => {
            Err(api_error(StatusCode::BAD_REQUEST, e.to_string()))
        }
        Err(e @ RegisterError::Storage(_)) => {
            tracing::error!("Failed to register user: {}", e);
            Err(api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to register user",
            ))
        }
    }
}

/// `POST /auth/token` (form-encoded `username`, `password`)
pub async fn issue_token(
    State(state): State<Arc<AppState>>,
    Form(request): Form<TokenRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    match state
        .issue_token_usecase
        .execute(request.username, &request.password)
        .await
    {
        Ok(token) => Ok(Json(TokenResponse::bearer(token))),
        Err(e @ IssueTokenError::InvalidCredentials) => {
            Err(api_error(StatusCode::UNAUTHORIZED, e.to_string()))
        }
        Err(e) => {
            tracing::error!("Failed to issue token: {}", e);
            Err(api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to issue token",
            ))
        }
    }
}
