use crate::state::AppState;
use axum::Router;

pub mod authenticator;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod password;

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}
