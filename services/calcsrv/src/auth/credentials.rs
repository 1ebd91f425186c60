//! Login/password-hash persistence
//!
//! The `users` table is also the parent of `calculations.user_id`, so it
//! must exist before the ledger's table is created.

use sqlx::{Row, SqlitePool};
use tracing::{debug, info};

use super::password;
use crate::error::{CalcsrvError, Result};

pub const USERS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        login TEXT UNIQUE NOT NULL,
        password_hash TEXT NOT NULL
    )
"#;

/// Identity confirmed by [`CredentialStore::authenticate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub login: String,
}

#[derive(Debug, Clone)]
pub struct CredentialStore {
    pool: SqlitePool,
    cost: u32,
}

impl CredentialStore {
    pub fn new(pool: SqlitePool, cost: u32) -> Self {
        Self { pool, cost }
    }

    /// Create the `users` table if missing
    pub async fn migrate(pool: &SqlitePool) -> Result<()> {
        sqlx::query(USERS_TABLE).execute(pool).await?;
        Ok(())
    }

    /// Store a new user and return its id
    pub async fn register(&self, login: &str, password: &str) -> Result<i64> {
        let hash = hash_off_thread(password.to_string(), self.cost).await?;

        let result = sqlx::query("INSERT INTO users (login, password_hash) VALUES (?, ?)")
            .bind(login)
            .bind(&hash)
            .execute(&self.pool)
            .await;

        match result {
            Ok(done) => {
                let id = done.last_insert_rowid();
                info!(user_id = id, "User registered: {}", login);
                Ok(id)
            },
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                debug!("Registration rejected, login taken: {}", login);
                Err(CalcsrvError::UserExists(login.to_string()))
            },
            Err(e) => Err(e.into()),
        }
    }

    /// Check a login/password pair
    ///
    /// Unknown login and wrong password both yield `InvalidCredentials`.
    pub async fn authenticate(&self, login: &str, password: &str) -> Result<AuthenticatedUser> {
        let row = sqlx::query("SELECT id, password_hash FROM users WHERE login = ?")
            .bind(login)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            debug!("Login failed, unknown user: {}", login);
            return Err(CalcsrvError::InvalidCredentials);
        };
        let id: i64 = row.try_get("id")?;
        let stored: String = row.try_get("password_hash")?;

        if verify_off_thread(password.to_string(), stored).await? {
            Ok(AuthenticatedUser {
                id,
                login: login.to_string(),
            })
        } else {
            debug!(user_id = id, "Login failed, wrong password");
            Err(CalcsrvError::InvalidCredentials)
        }
    }

    pub async fn count(&self) -> Result<i64> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?)
    }
}

// Hashing is CPU-bound; keep it off the async workers
async fn hash_off_thread(password: String, cost: u32) -> Result<String> {
    tokio::task::spawn_blocking(move || password::hash_password(&password, cost))
        .await
        .map_err(|e| CalcsrvError::internal(format!("Password hashing task failed: {}", e)))?
}

async fn verify_off_thread(password: String, stored: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || password::verify_password(&password, &stored))
        .await
        .map_err(|e| CalcsrvError::internal(format!("Password check task failed: {}", e)))?
}
