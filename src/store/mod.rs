//! Storage accessor for the `users` table. One `UserStore` per backend; the
//! backend is chosen from the `DATABASE_URL` scheme.

mod mysql;
mod postgres;
mod sqlite;

pub use mysql::MySqlUserStore;
pub use postgres::{ensure_database_exists, PgUserStore};
pub use sqlite::SqliteUserStore;

use crate::config::StoreConfig;
use crate::error::{AppError, ConfigError};
use crate::model::{NewUser, User};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

pub const USERS_TABLE: &str = "users";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Sqlite,
    Postgres,
    MySql,
}

impl Backend {
    pub fn from_url(url: &str) -> Result<Self, ConfigError> {
        let scheme = url.split(':').next().unwrap_or("").to_ascii_lowercase();
        match scheme.as_str() {
            "sqlite" => Ok(Backend::Sqlite),
            "postgres" | "postgresql" => Ok(Backend::Postgres),
            "mysql" | "mariadb" => Ok(Backend::MySql),
            _ => Err(ConfigError::UnsupportedDatabase(scheme)),
        }
    }
}

/// All reads and writes of `users` go through this trait. Each call holds a
/// pooled connection for one statement only.
#[async_trait]
pub trait UserStore: Send + Sync {
    fn backend(&self) -> Backend;

    /// `CREATE TABLE IF NOT EXISTS`; safe to run on every startup.
    async fn ensure_schema(&self) -> Result<(), AppError>;

    /// All users by ascending id. Empty table gives an empty vec.
    async fn list_users(&self) -> Result<Vec<User>, AppError>;

    async fn create_user(&self, new_user: &NewUser) -> Result<User, AppError>;

    async fn ping(&self) -> Result<(), AppError>;

    /// Close the pool; later calls fail with `StorageUnavailable`.
    async fn close(&self);
}

/// Open a pool for the backend named by `config.database_url`.
pub async fn connect(config: &StoreConfig) -> Result<Arc<dyn UserStore>, AppError> {
    let backend = Backend::from_url(&config.database_url)?;
    tracing::info!(?backend, max_connections = config.max_connections, "connecting to store");
    let store: Arc<dyn UserStore> = match backend {
        Backend::Sqlite => Arc::new(SqliteUserStore::connect(config).await?),
        Backend::Postgres => {
            ensure_database_exists(&config.database_url).await?;
            Arc::new(PgUserStore::connect(config).await?)
        }
        Backend::MySql => Arc::new(MySqlUserStore::connect(config).await?),
    };
    Ok(store)
}
