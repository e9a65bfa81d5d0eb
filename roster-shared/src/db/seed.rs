/// Startup seeding
///
/// The admin account is created once, on the first start against an empty
/// database. Later starts leave it alone, so a password changed through the
/// API survives restarts.

use sqlx::sqlite::SqlitePool;
use tracing::{debug, info};

use crate::auth::password::{hash_password, PasswordError};
use crate::models::user::{User, UserRole};

/// Error type for seeding
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Password(#[from] PasswordError),
}

/// Ensures the admin user exists
///
/// Returns true if a row was inserted, false if `username` was already taken.
pub async fn seed_admin(
    pool: &SqlitePool,
    username: &str,
    password: &str,
) -> Result<bool, SeedError> {
    if User::find_by_username(pool, username).await?.is_some() {
        debug!(username = %username, "Admin user already present");
        return Ok(false);
    }

    let password_hash = hash_password(password)?;

    let result = sqlx::query(
        r#"
        INSERT OR IGNORE INTO users (username, password, role, created_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(username)
    .bind(password_hash)
    .bind(UserRole::Admin.as_str())
    .bind(chrono::Utc::now())
    .execute(pool)
    .await?;

    let inserted = result.rows_affected() > 0;
    if inserted {
        info!(username = %username, "Seeded admin user");
    }

    Ok(inserted)
}
