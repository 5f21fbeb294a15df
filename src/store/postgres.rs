//! PostgreSQL backend, plus creation of the target database when it is missing.

use super::{Backend, UserStore, USERS_TABLE};
use crate::config::StoreConfig;
use crate::error::{AppError, ConfigError};
use crate::model::{NewUser, User};
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use sqlx::ConnectOptions;
use std::str::FromStr;

pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub async fn connect(config: &StoreConfig) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(&config.database_url)
            .await?;
        Ok(PgUserStore { pool })
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    fn backend(&self) -> Backend {
        Backend::Postgres
    }

    async fn ensure_schema(&self) -> Result<(), AppError> {
        let ddl = format!(
            "CREATE TABLE IF NOT EXISTS {} (id BIGSERIAL PRIMARY KEY, name TEXT NOT NULL)",
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
        let sql = format!("INSERT INTO {} (name) VALUES ($1) RETURNING id, name", USERS_TABLE);
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

/// Ensure the database in `database_url` exists; create it if not. Connects to the
/// default `postgres` database to run CREATE DATABASE. Call before creating the pool.
/// A URL without a database path leaves the choice to the server and is skipped.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let Some((admin, db_name)) = admin_target(database_url)? else {
        return Ok(());
    };
    let mut conn = admin.connect().await?;
    let (exists,): (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
            .bind(&db_name)
            .fetch_one(&mut conn)
            .await?;
    if !exists {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

/// Admin connection options and the target database name, or `None` when there is
/// nothing to create (no database in the URL, or it is `postgres` itself).
fn admin_target(database_url: &str) -> Result<Option<(PgConnectOptions, String)>, ConfigError> {
    let opts = PgConnectOptions::from_str(database_url).map_err(|e| ConfigError::Invalid {
        key: "DATABASE_URL",
        value: "<redacted>".into(),
        reason: e.to_string(),
    })?;
    let db_name = match opts.get_database() {
        Some(name) if !name.is_empty() && name != "postgres" => name.to_string(),
        _ => return Ok(None),
    };
    Ok(Some((opts.database("postgres"), db_name)))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
