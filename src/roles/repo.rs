use std::collections::BTreeMap;
use std::sync::Mutex;

use anyhow::Context;
use async_trait::async_trait;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use tracing::instrument;

/// Named role. Lookup only; no policy consults it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Role {
    pub id: i64,
    pub role_name: String,
}

#[async_trait]
pub trait RoleStore: Send + Sync {
    async fn find_by_role_name(&self, role_name: &str) -> anyhow::Result<Option<Role>>;
}

#[derive(Clone)]
pub struct PgRoleStore {
    db: PgPool,
}

impl PgRoleStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RoleStore for PgRoleStore {
    #[instrument(skip(self))]
    async fn find_by_role_name(&self, role_name: &str) -> anyhow::Result<Option<Role>> {
        let role = sqlx::query_as::<_, Role>(
            r#"
            SELECT id, role_name
            FROM roles
            WHERE role_name = $1
            "#,
        )
        .bind(role_name)
        .fetch_optional(&self.db)
        .await
        .context("find role by name")?;
        Ok(role)
    }
}

/// In-process role table, seeded like the SQL migration.
pub struct MemoryRoleStore {
    roles: Mutex<BTreeMap<String, Role>>,
}

impl MemoryRoleStore {
    pub fn seeded() -> Self {
        let roles = ["USER", "ADMIN"]
            .iter()
            .zip(1..)
            .map(|(name, id)| {
                let role = Role {
                    id,
                    role_name: name.to_string(),
                };
                (role.role_name.clone(), role)
            })
            .collect();
        Self {
            roles: Mutex::new(roles),
        }
    }
}

#[async_trait]
impl RoleStore for MemoryRoleStore {
    async fn find_by_role_name(&self, role_name: &str) -> anyhow::Result<Option<Role>> {
        let roles = self
            .roles
            .lock()
            .map_err(|_| anyhow::anyhow!("role table lock poisoned"))?;
        Ok(roles.get(role_name).cloned())
    }
}
