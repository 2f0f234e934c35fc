mod app;
mod auth;
mod config;
mod db;
mod error;
mod roles;
mod state;
mod users;

use tracing_subscriber::EnvFilter;

use crate::state::AppState;

const DEFAULT_LOG_FILTER: &str = "usermgmt=debug,axum=info,tower_http=info";

/// `RUST_LOG` overrides the default filter; `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => builder.with_target(false).json().init(),
        _ => builder.init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    init_tracing();

    let state = AppState::init().await?;
    let addr = state.config.bind_addr();

    app::serve(app::build_app(state), &addr).await
}
