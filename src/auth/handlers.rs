use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use tracing::{instrument, warn};

use crate::{
    auth::dto::{LoginRequest, RegisterRequest},
    error::ApiError,
    state::AppState,
    users::{dto::UserResponse, validate},
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    payload.username = payload.username.trim().to_string();
    payload.email = validate::normalize_email(&payload.email);

    validate::check_username(&payload.username)?;
    validate::check_email(&payload.email)?;
    validate::check_password(&payload.password)?;

    if state.users.find_by_username(&payload.username).await?.is_some() {
        warn!(username = %payload.username, "username already registered");
        return Err(ApiError::Conflict("Username already registered".into()));
    }
    if state.users.find_by_email(&payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::Conflict("Email already registered".into()));
    }

    let user = state.users.register(payload.into()).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Verifies credentials and returns the principal. No token is issued.
#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .users
        .authenticate(&payload.username, &payload.password)
        .await
        .map_err(|e| {
            warn!(username = %payload.username, error = %e, "login failed");
            e
        })?;
    Ok(Json(user.into()))
}
