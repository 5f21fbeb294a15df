//! MySQL / MariaDB backend. No RETURNING, so the created row is rebuilt from
//! `last_insert_id`.

use super::{Backend, UserStore, USERS_TABLE};
use crate::config::StoreConfig;
use crate::error::AppError;
use crate::model::{NewUser, User};
use async_trait::async_trait;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};

pub struct MySqlUserStore {
    pool: MySqlPool,
}

impl MySqlUserStore {
    pub async fn connect(config: &StoreConfig) -> Result<Self, AppError> {
        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(&config.database_url)
            .await?;
        Ok(MySqlUserStore { pool })
    }
}

#[async_trait]
impl UserStore for MySqlUserStore {
    fn backend(&self) -> Backend {
        Backend::MySql
    }

    async fn ensure_schema(&self) -> Result<(), AppError> {
        let ddl = format!(
            "CREATE TABLE IF NOT EXISTS {} (id BIGINT PRIMARY KEY AUTO_INCREMENT, name VARCHAR(255) NOT NULL)",
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
        let sql = format!("INSERT INTO {} (name) VALUES (?)", USERS_TABLE);
        tracing::debug!(sql = %sql, "query");
        let result = sqlx::query(&sql)
            .bind(&new_user.name)
            .execute(&self.pool)
            .await?;
        let id = insert_id(result.last_insert_id())?;
        Ok(User {
            id,
            name: new_user.name.clone(),
        })
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

/// `last_insert_id` is unsigned; ids past `i64::MAX` cannot be represented in `User`.
fn insert_id(raw: u64) -> Result<i64, AppError> {
    i64::try_from(raw).map_err(|e| AppError::Storage(sqlx::Error::Decode(Box::new(e))))
}
