/// Roster model and database operations
///
/// Every save of a new roster inserts a row; there is no dedup and no cap on
/// history. Updates target an explicit ID. The "current" roster is simply
/// the row with the newest `updated_at`.
///
/// The schedule and active-day maps are stored as JSON text and are not
/// checked against any schema here; see [`super::schedule`] for the typed
/// view.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE rosters (
///     id INTEGER PRIMARY KEY AUTOINCREMENT,
///     name TEXT NOT NULL,
///     data TEXT NOT NULL,
///     active_days TEXT NOT NULL,
///     created_by INTEGER REFERENCES users (id),
///     created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
///     updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use roster_shared::models::roster::{CreateRoster, Roster};
/// use serde_json::json;
/// use sqlx::SqlitePool;
///
/// # async fn example(pool: SqlitePool) -> Result<(), sqlx::Error> {
/// let roster = Roster::create(
///     &pool,
///     CreateRoster {
///         name: "Week 12".to_string(),
///         data: json!({"monday": {"morning": [], "evening": [], "instructions": ""}}),
///         active_days: json!({"monday": true}),
///         created_by: Some(1),
///     },
/// )
/// .await?;
///
/// let current = Roster::find_current(&pool).await?;
/// assert_eq!(current.map(|r| r.id), Some(roster.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::{types::Json, SqlitePool};

/// Roster row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Roster {
    /// Row ID
    pub id: i64,

    /// Display name
    pub name: String,

    /// Schedule document keyed by weekday
    pub data: Json<Value>,

    /// Active-day flags keyed by weekday
    pub active_days: Json<Value>,

    /// Admin who created the row
    pub created_by: Option<i64>,

    pub created_at: DateTime<Utc>,

    /// Bumped on every update; decides which roster is current
    pub updated_at: DateTime<Utc>,
}

/// Roster listing entry, without the documents
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct RosterSummary {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for inserting a roster
#[derive(Debug, Clone)]
pub struct CreateRoster {
    pub name: String,
    pub data: Value,
    pub active_days: Value,
    pub created_by: Option<i64>,
}

/// Input for overwriting a roster
#[derive(Debug, Clone)]
pub struct UpdateRoster {
    pub name: String,
    pub data: Value,
    pub active_days: Value,
}

impl Roster {
    /// Inserts a new roster row
    ///
    /// Both timestamps are set to now, which makes the new row current.
    pub async fn create(pool: &SqlitePool, data: CreateRoster) -> Result<Self, sqlx::Error> {
        let now = Utc::now();

        let roster = sqlx::query_as::<_, Roster>(
            r#"
            INSERT INTO rosters (name, data, active_days, created_by, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id, name, data, active_days, created_by, created_at, updated_at
            "#,
        )
        .bind(data.name)
        .bind(Json(data.data))
        .bind(Json(data.active_days))
        .bind(data.created_by)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await?;

        Ok(roster)
    }

    /// Overwrites an existing roster and bumps `updated_at`
    ///
    /// Returns `None` if no row has the given ID; nothing is written in that
    /// case.
    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        data: UpdateRoster,
    ) -> Result<Option<Self>, sqlx::Error> {
        let roster = sqlx::query_as::<_, Roster>(
            r#"
            UPDATE rosters
            SET name = ?, data = ?, active_days = ?, updated_at = ?
            WHERE id = ?
            RETURNING id, name, data, active_days, created_by, created_at, updated_at
            "#,
        )
        .bind(data.name)
        .bind(Json(data.data))
        .bind(Json(data.active_days))
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(roster)
    }

    /// Finds a roster by ID
    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let roster = sqlx::query_as::<_, Roster>(
            r#"
            SELECT id, name, data, active_days, created_by, created_at, updated_at
            FROM rosters
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(roster)
    }

    /// Finds the most recently updated roster
    ///
    /// Ties on `updated_at` go to the higher ID.
    pub async fn find_current(pool: &SqlitePool) -> Result<Option<Self>, sqlx::Error> {
        let roster = sqlx::query_as::<_, Roster>(
            r#"
            SELECT id, name, data, active_days, created_by, created_at, updated_at
            FROM rosters
            ORDER BY updated_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(pool)
        .await?;

        Ok(roster)
    }

    /// Lists every roster, most recently updated first
    pub async fn list_summaries(pool: &SqlitePool) -> Result<Vec<RosterSummary>, sqlx::Error> {
        let rosters = sqlx::query_as::<_, RosterSummary>(
            r#"
            SELECT id, name, created_at, updated_at
            FROM rosters
            ORDER BY updated_at DESC, id DESC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(rosters)
    }

    /// Counts stored rosters
    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM rosters")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}
