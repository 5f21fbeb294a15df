//! SQLite backend. In-memory URLs are pinned to a single connection that never
//! idles out, otherwise the database would vanish with the connection.

use super::{Backend, UserStore, USERS_TABLE};
use crate::config::StoreConfig;
use crate::error::AppError;
use crate::model::{NewUser, User};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

pub struct SqliteUserStore {
    pool: SqlitePool,
}

fn is_memory_url(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

impl SqliteUserStore {
    pub async fn connect(config: &StoreConfig) -> Result<Self, AppError> {
        let opts = SqliteConnectOptions::from_str(&config.database_url)?.create_if_missing(true);
        let pool_opts = if is_memory_url(&config.database_url) {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(config.max_connections)
        };
        let pool = pool_opts
            .acquire_timeout(config.acquire_timeout)
            .connect_with(opts)
            .await?;
        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        SqliteUserStore { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl UserStore for SqliteUserStore {
    fn backend(&self) -> Backend {
        Backend::Sqlite
    }

    async fn ensure_schema(&self) -> Result<(), AppError> {
        let ddl = format!(
            "CREATE TABLE IF NOT EXISTS {} (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL)",
            USERS_TABLE
        );
        tracing::debug!(sql = %ddl, "ensure schema");
        sqlx::query(&ddl).execute(&self.pool).await?;
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let sql = format!("SELECT id, name FROM {} ORDER BY id", USERS_TABLE);
        tracing::debug!(sql = %sql, "query");
        let users = sqlx::query_as::<_, User>(&sql).fetch_all(&self.pool).await?;
        Ok(users)
    }

    async fn create_user(&self, new_user: &NewUser) -> Result<User, AppError> {
        let sql = format!("INSERT INTO {} (name) VALUES (?) RETURNING id, name", USERS_TABLE);
        tracing::debug!(sql = %sql, "query");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(&new_user.name)
            .fetch_one(&self.pool)
            .await?;
        Ok(user)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
