use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Where user and role records live.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreConfig {
    Postgres(DatabaseConfig),
    /// Process-local tables, lost on restart.
    Memory,
}

/// Argon2 cost parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct PasswordHashConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordHashConfig {
    fn default() -> Self {
        Self {
            memory_kib: argon2::Params::DEFAULT_M_COST,
            iterations: argon2::Params::DEFAULT_T_COST,
            parallelism: argon2::Params::DEFAULT_P_COST,
        }
    }
}

impl PasswordHashConfig {
    fn from_env() -> Self {
        let defaults = Self::default();
        let var = |name: &str, default: u32| {
            std::env::var(name)
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(default)
        };
        Self {
            memory_kib: var("ARGON2_MEMORY_KIB", defaults.memory_kib),
            iterations: var("ARGON2_ITERATIONS", defaults.iterations),
            parallelism: var("ARGON2_PARALLELISM", defaults.parallelism),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub password_hash: PasswordHashConfig,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let store = match std::env::var("USER_STORE").as_deref() {
            Ok("memory") => StoreConfig::Memory,
            Ok("postgres") | Err(_) => StoreConfig::Postgres(DatabaseConfig {
                url: std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
                max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|v| v.parse::<u32>().ok())
                    .unwrap_or(10),
            }),
            Ok(other) => anyhow::bail!("unknown USER_STORE {:?}", other),
        };
        let port = match std::env::var("APP_PORT") {
            Ok(v) => v
                .parse::<u16>()
                .with_context(|| format!("invalid APP_PORT {:?}", v))?,
            Err(_) => 8080,
        };
        Ok(Self {
            store,
            password_hash: PasswordHashConfig::from_env(),
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
