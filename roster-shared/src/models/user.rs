/// User model and database operations
///
/// Two kinds of users share one table. The admin is seeded at startup and
/// always has a password hash. Carers are created the first time someone
/// logs in under a new name and never have one.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id INTEGER PRIMARY KEY AUTOINCREMENT,
///     username TEXT UNIQUE NOT NULL,
///     password TEXT,
///     role TEXT NOT NULL DEFAULT 'carer',
///     created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use roster_shared::models::user::{normalize_carer_username, User};
/// use sqlx::SqlitePool;
///
/// # async fn example(pool: SqlitePool) -> Result<(), sqlx::Error> {
/// let username = normalize_carer_username("Jane Doe").unwrap();
/// let carer = User::find_or_create_carer(&pool, &username).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::fmt;

/// Role of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Authors rosters, logs in with a password
    Admin,

    /// Shift staff, logs in by name only
    Carer,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Carer => "carer",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role column held a value other than `admin` or `carer`
#[derive(Debug, thiserror::Error)]
#[error("Unknown user role: {0}")]
pub struct UnknownRole(pub String);

impl TryFrom<String> for UserRole {
    type Error = UnknownRole;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "admin" => Ok(UserRole::Admin),
            "carer" => Ok(UserRole::Carer),
            _ => Err(UnknownRole(value)),
        }
    }
}

/// User row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Row ID
    pub id: i64,

    /// Unique username
    ///
    /// For carers this is the normalized form of the name they typed.
    pub username: String,

    /// Argon2id password hash, `None` for carers
    #[sqlx(rename = "password")]
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,

    /// Role
    #[sqlx(try_from = "String")]
    pub role: UserRole,

    /// When the user row was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a user
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub username: String,
    pub password_hash: Option<String>,
    pub role: UserRole,
}

/// Turns a free-text carer name into a username
///
/// Trims, lowercases and replaces each run of whitespace with a single `_`.
/// Returns `None` for names that are empty after trimming.
///
/// ```
/// use roster_shared::models::user::normalize_carer_username;
///
/// assert_eq!(normalize_carer_username("Jane Doe").as_deref(), Some("jane_doe"));
/// assert_eq!(normalize_carer_username("  jane   doe ").as_deref(), Some("jane_doe"));
/// assert_eq!(normalize_carer_username("   "), None);
/// ```
pub fn normalize_carer_username(name: &str) -> Option<String> {
    let normalized = name
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_");

    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}

impl User {
    /// Inserts a new user
    ///
    /// # Errors
    ///
    /// Fails on a duplicate username (unique constraint) or a connection
    /// problem.
    pub async fn create(pool: &SqlitePool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password, role, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING id, username, password, role, created_at
            "#,
        )
        .bind(data.username)
        .bind(data.password_hash)
        .bind(data.role.as_str())
        .bind(Utc::now())
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password, role, created_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by exact username
    pub async fn find_by_username(
        pool: &SqlitePool,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password, role, created_at
            FROM users
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Returns the carer row for `username`, creating it on first use
    ///
    /// The insert is `INSERT OR IGNORE`, so two names that normalize to the
    /// same username share one row. Returns `None` when the username already
    /// belongs to a non-carer (the admin), so a name login can never yield an
    /// admin session.
    pub async fn find_or_create_carer(
        pool: &SqlitePool,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO users (username, role, created_at)
            VALUES (?, 'carer', ?)
            "#,
        )
        .bind(username)
        .bind(Utc::now())
        .execute(pool)
        .await?;

        let user = Self::find_by_username(pool, username).await?;

        Ok(user.filter(|u| u.role == UserRole::Carer))
    }

    /// Replaces the stored password hash
    ///
    /// Returns false if no user has the given ID.
    pub async fn update_password(
        pool: &SqlitePool,
        id: i64,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET password = ? WHERE id = ?")
            .bind(password_hash)
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts users, optionally restricted to one role
    pub async fn count(pool: &SqlitePool, role: Option<UserRole>) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = match role {
            Some(role) => {
                sqlx::query_as("SELECT COUNT(*) FROM users WHERE role = ?")
                    .bind(role.as_str())
                    .fetch_one(pool)
                    .await?
            }
            None => sqlx::query_as("SELECT COUNT(*) FROM users").fetch_one(pool).await?,
        };

        Ok(count)
    }
}
