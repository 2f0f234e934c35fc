use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{instrument, warn};

use super::{
    dto::{UpdateUserRequest, UserResponse},
    repo_types::UserPatch,
    validate,
};
use crate::{auth, error::ApiError, state::AppState};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(auth::handlers::register))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/users/:id/activate", post(activate_user))
        .route("/users/:id/deactivate", post(deactivate_user))
        .route("/users/by-username/:username", get(get_by_username))
}

fn not_found() -> ApiError {
    ApiError::NotFound("User not found".into())
}

#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = state.users.list_users().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.users.get_user(id).await?.ok_or_else(not_found)?;
    Ok(Json(user.into()))
}

#[instrument(skip(state))]
pub async fn get_by_username(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .users
        .find_by_username(&username)
        .await?
        .ok_or_else(not_found)?;
    Ok(Json(user.into()))
}

/// The password in the body is hashed here; the service stores what it gets.
#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let email = validate::normalize_email(&payload.email);
    validate::check_email(&email)?;
    validate::check_password(&payload.password)?;

    state.users.get_user(id).await?.ok_or_else(not_found)?;
    if let Some(other) = state.users.find_by_email(&email).await? {
        if other.id != id {
            warn!(email = %email, "email already registered");
            return Err(ApiError::Conflict("Email already registered".into()));
        }
    }

    let patch = UserPatch {
        password: state.users.hash_password(&payload.password)?,
        email,
        first_name: payload.first_name,
        last_name: payload.last_name,
    };
    let user = state.users.update_user(id, patch).await?.ok_or_else(not_found)?;
    Ok(Json(user.into()))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if state.users.delete_user(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found())
    }
}

#[instrument(skip(state))]
pub async fn activate_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if state.users.activate_user(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found())
    }
}

#[instrument(skip(state))]
pub async fn deactivate_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if state.users.deactivate_user(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found())
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::{app::build_app, users::repo_types::NewUser};

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(b) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(b.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    async fn seeded() -> (AppState, Router, i64) {
        let state = AppState::fake();
        let user = state
            .users
            .register(NewUser::new("alice", "alice@example.com", "correct-horse"))
            .await
            .unwrap();
        let app = build_app(state.clone());
        (state, app, user.id)
    }

    #[tokio::test]
    async fn list_and_get() {
        let (_, app, id) = seeded().await;

        let (status, body) = send(&app, "GET", "/api/v1/users", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);

        let (status, body) = send(&app, "GET", &format!("/api/v1/users/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], id);
        assert!(body.get("password").is_none());

        let (status, body) = send(&app, "GET", "/api/v1/users/999", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "User not found");

        let (status, body) = send(&app, "GET", "/api/v1/users/by-username/alice", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], id);
    }

    #[tokio::test]
    async fn put_ignores_non_allowlisted_fields_and_hashes_password() {
        let (state, app, id) = seeded().await;
        let before = state.users.get_user(id).await.unwrap().unwrap();

        let (status, body) = send(
            &app,
            "PUT",
            &format!("/api/v1/users/{}", id),
            Some(json!({
                "username": "mallory",
                "is_active": false,
                "email": "alice@new.example.com",
                "password": "another-secret",
                "last_name": "Liddell"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], "alice");
        assert_eq!(body["is_active"], true);
        assert_eq!(body["email"], "alice@new.example.com");
        assert_eq!(body["last_name"], "Liddell");

        let after = state.users.get_user(id).await.unwrap().unwrap();
        assert_eq!(after.created_at, before.created_at);
        assert_ne!(after.password, "another-secret");
        assert!(state.users.authenticate("alice", "another-secret").await.is_ok());
    }

    #[tokio::test]
    async fn put_unknown_user_is_not_found() {
        let (_, app, _) = seeded().await;
        let (status, _) = send(
            &app,
            "PUT",
            "/api/v1/users/999",
            Some(json!({"email": "x@example.com", "password": "long-enough"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn put_unknown_user_with_taken_email_is_not_found() {
        let (_, app, _) = seeded().await;
        let (status, body) = send(
            &app,
            "PUT",
            "/api/v1/users/999",
            Some(json!({"email": "alice@example.com", "password": "long-enough"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error_code"], "not_found");
    }

    #[tokio::test]
    async fn put_with_another_users_email_conflicts() {
        let (state, app, id) = seeded().await;
        state
            .users
            .register(NewUser::new("bob", "bob@example.com", "correct-horse"))
            .await
            .unwrap();
        let (status, _) = send(
            &app,
            "PUT",
            &format!("/api/v1/users/{}", id),
            Some(json!({"email": "bob@example.com", "password": "long-enough"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn delete_then_missing() {
        let (_, app, id) = seeded().await;
        let uri = format!("/api/v1/users/{}", id);
        let (status, _) = send(&app, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&app, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn activation_toggles() {
        let (state, app, id) = seeded().await;
        let (status, _) = send(&app, "POST", &format!("/api/v1/users/{}/deactivate", id), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(state.users.get_user(id).await.unwrap().unwrap().is_active);

        let (status, _) = send(&app, "POST", &format!("/api/v1/users/{}/activate", id), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(&app, "POST", "/api/v1/users/999/activate", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn role_lookup() {
        let (_, app, _) = seeded().await;
        let (status, body) = send(&app, "GET", "/api/v1/roles/ADMIN", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["role_name"], "ADMIN");
        let (status, _) = send(&app, "GET", "/api/v1/roles/ROOT", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn health() {
        let app = build_app(AppState::fake());
        let response = app
            .oneshot(Request::builder().uri("/api/v1/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
