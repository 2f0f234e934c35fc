use std::sync::Arc;

use crate::auth::{
    authenticator::StoreAuthenticator,
    password::{Argon2Encoder, PasswordEncoder},
};
use crate::config::{AppConfig, StoreConfig};
use crate::db;
use crate::roles::repo::{MemoryRoleStore, PgRoleStore, RoleStore};
use crate::users::{
    memory::MemoryUserStore,
    repo::{PgUserStore, UserStore},
    services::UserService,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: UserService,
    pub roles: Arc<dyn RoleStore>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let (users, roles): (Arc<dyn UserStore>, Arc<dyn RoleStore>) = match &config.store {
            StoreConfig::Postgres(db_config) => {
                let pool = db::connect(db_config).await?;
                db::migrate(&pool).await;
                (
                    Arc::new(PgUserStore::new(pool.clone())) as Arc<dyn UserStore>,
                    Arc::new(PgRoleStore::new(pool)) as Arc<dyn RoleStore>,
                )
            }
            StoreConfig::Memory => {
                tracing::warn!("using in-memory store; records are lost on restart");
                (
                    Arc::new(MemoryUserStore::new()) as Arc<dyn UserStore>,
                    Arc::new(MemoryRoleStore::seeded()) as Arc<dyn RoleStore>,
                )
            }
        };

        let hash = &config.password_hash;
        let encoder = Argon2Encoder::with_params(hash.memory_kib, hash.iterations, hash.parallelism)?;

        Self::from_parts(config, users, roles, Arc::new(encoder))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        users: Arc<dyn UserStore>,
        roles: Arc<dyn RoleStore>,
        encoder: Arc<dyn PasswordEncoder>,
    ) -> anyhow::Result<Self> {
        let authenticator = Arc::new(StoreAuthenticator::new(users.clone(), encoder.clone())?);
        Ok(Self {
            config,
            users: UserService::new(users, encoder, authenticator),
            roles,
        })
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        let config = Arc::new(AppConfig {
            store: StoreConfig::Memory,
            password_hash: crate::config::PasswordHashConfig::default(),
            host: "127.0.0.1".into(),
            port: 0,
        });
        Self::from_parts(
            config,
            Arc::new(MemoryUserStore::new()),
            Arc::new(MemoryRoleStore::seeded()),
            Arc::new(crate::auth::password::cheap_encoder()),
        )
        .expect("fake state")
    }
}
