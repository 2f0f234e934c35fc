use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;

use super::repo::UserStore;
use super::repo_types::{NewUser, User};

/// In-process user table. Enforces the same unique keys as the SQL schema.
#[derive(Default)]
pub struct MemoryUserStore {
    inner: Mutex<Table>,
}

#[derive(Default)]
struct Table {
    last_id: i64,
    rows: BTreeMap<i64, User>,
}

impl Table {
    fn ensure_unique(&self, id: Option<i64>, username: &str, email: &str) -> anyhow::Result<()> {
        for row in self.rows.values().filter(|r| Some(r.id) != id) {
            anyhow::ensure!(row.username != username, "username {:?} already exists", username);
            anyhow::ensure!(row.email != email, "email {:?} already exists", email);
        }
        Ok(())
    }
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self) -> anyhow::Result<std::sync::MutexGuard<'_, Table>> {
        self.inner
            .lock()
            .map_err(|_| anyhow::anyhow!("user table lock poisoned"))
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_all(&self) -> anyhow::Result<Vec<User>> {
        Ok(self.table()?.rows.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<User>> {
        Ok(self.table()?.rows.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        let table = self.table()?;
        Ok(table.rows.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let table = self.table()?;
        Ok(table.rows.values().find(|u| u.email == email).cloned())
    }

    async fn exists_by_id(&self, id: i64) -> anyhow::Result<bool> {
        Ok(self.table()?.rows.contains_key(&id))
    }

    async fn insert(&self, user: NewUser) -> anyhow::Result<User> {
        let mut table = self.table()?;
        table.ensure_unique(None, &user.username, &user.email)?;
        table.last_id += 1;
        let now = OffsetDateTime::now_utc();
        let row = User {
            id: table.last_id,
            username: user.username,
            email: user.email,
            password: user.password,
            first_name: user.first_name,
            last_name: user.last_name,
            is_active: user.is_active,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(row.id, row.clone());
        Ok(row)
    }

    async fn save(&self, mut user: User) -> anyhow::Result<User> {
        let mut table = self.table()?;
        let created_at = table
            .rows
            .get(&user.id)
            .map(|existing| existing.created_at)
            .ok_or_else(|| anyhow::anyhow!("user {} not found", user.id))?;
        table.ensure_unique(Some(user.id), &user.username, &user.email)?;
        user.created_at = created_at;
        table.rows.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete_by_id(&self, id: i64) -> anyhow::Result<()> {
        self.table()?.rows.remove(&id);
        Ok(())
    }
}
