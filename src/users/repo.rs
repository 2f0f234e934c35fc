use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use super::repo_types::{NewUser, User};

/// Persistence operations the user service depends on.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_all(&self) -> anyhow::Result<Vec<User>>;
    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<User>>;
    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn exists_by_id(&self, id: i64) -> anyhow::Result<bool>;
    /// Insert a new row; id and timestamps come back populated.
    async fn insert(&self, user: NewUser) -> anyhow::Result<User>;
    /// Write every column of an existing row except `created_at`.
    async fn save(&self, user: User) -> anyhow::Result<User>;
    async fn delete_by_id(&self, id: i64) -> anyhow::Result<()>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    #[instrument(skip(self))]
    async fn find_all(&self) -> anyhow::Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password, first_name, last_name,
                   is_active, created_at, updated_at
            FROM users
            ORDER BY id
            "#,
        )
        .fetch_all(&self.db)
        .await
        .context("list users")?;
        Ok(users)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password, first_name, last_name,
                   is_active, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find user by id")?;
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password, first_name, last_name,
                   is_active, created_at, updated_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await
        .context("find user by username")?;
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password, first_name, last_name,
                   is_active, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .context("find user by email")?;
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn exists_by_id(&self, id: i64) -> anyhow::Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.db)
            .await
            .context("check user exists")?;
        Ok(exists)
    }

    #[instrument(skip(self, user), fields(username = %user.username))]
    async fn insert(&self, user: NewUser) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password, first_name, last_name, is_active)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, username, email, password, first_name, last_name,
                      is_active, created_at, updated_at
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.is_active)
        .fetch_one(&self.db)
        .await
        .context("insert user")?;
        Ok(user)
    }

    #[instrument(skip(self, user), fields(user_id = user.id))]
    async fn save(&self, user: User) -> anyhow::Result<User> {
        let saved = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
               SET username = $2, email = $3, password = $4, first_name = $5,
                   last_name = $6, is_active = $7, updated_at = $8
             WHERE id = $1
            RETURNING id, username, email, password, first_name, last_name,
                      is_active, created_at, updated_at
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.is_active)
        .bind(user.updated_at)
        .fetch_optional(&self.db)
        .await
        .context("update user")?;
        saved.ok_or_else(|| anyhow::anyhow!("user {} not found", user.id))
    }

    #[instrument(skip(self))]
    async fn delete_by_id(&self, id: i64) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .context("delete user")?;
        Ok(())
    }
}
