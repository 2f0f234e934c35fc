use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;

use super::repo::Role;
use crate::{error::ApiError, state::AppState};

pub fn role_routes() -> Router<AppState> {
    Router::new().route("/roles/:name", get(get_role))
}

#[instrument(skip(state))]
pub async fn get_role(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Role>, ApiError> {
    state
        .roles
        .find_by_role_name(&name)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Role not found".into()))
}
