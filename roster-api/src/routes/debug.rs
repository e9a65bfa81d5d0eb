/// Diagnostics endpoint
///
/// `GET /api/debug`, admin only, mounted only when `DEBUG_ENDPOINTS` is on
/// (the default outside production).
///
/// # Response
///
/// ```json
/// {
///   "user": { "id": 1, "username": "admin", "role": "admin" },
///   "environment": "development",
///   "database": {
///     "appliedMigrations": 2,
///     "latestMigration": 20240601000002,
///     "migrationsUpToDate": true,
///     "activeConnections": 1,
///     "idleConnections": 0
///   },
///   "rosters": 3,
///   "users": { "total": 4, "admins": 1, "carers": 3 }
/// }
/// ```

use crate::{app::AppState, error::ApiResult, routes::auth::UserInfo};
use axum::{extract::State, Extension, Json};
use roster_shared::{
    auth::middleware::AuthContext,
    db::{migrations::get_migration_status, pool::get_pool_stats},
    models::{
        roster::Roster,
        user::{User, UserRole},
    },
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct DebugResponse {
    pub user: UserInfo,
    pub environment: &'static str,
    pub database: DatabaseInfo,
    pub rosters: i64,
    pub users: UserCounts,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseInfo {
    pub applied_migrations: usize,
    pub latest_migration: Option<i64>,
    pub migrations_up_to_date: bool,
    pub active_connections: usize,
    pub idle_connections: usize,
}

#[derive(Debug, Serialize)]
pub struct UserCounts {
    pub total: i64,
    pub admins: i64,
    pub carers: i64,
}

pub async fn debug_info(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<DebugResponse>> {
    let migrations = get_migration_status(&state.db).await?;
    let pool = get_pool_stats(&state.db);

    let users = UserCounts {
        total: User::count(&state.db, None).await?,
        admins: User::count(&state.db, Some(UserRole::Admin)).await?,
        carers: User::count(&state.db, Some(UserRole::Carer)).await?,
    };

    Ok(Json(DebugResponse {
        user: auth.into(),
        environment: state.config.environment(),
        database: DatabaseInfo {
            applied_migrations: migrations.applied_migrations,
            latest_migration: migrations.latest_version,
            migrations_up_to_date: migrations.is_up_to_date,
            active_connections: pool.active_connections,
            idle_connections: pool.idle_connections,
        },
        rosters: Roster::count(&state.db).await?,
        users,
    }))
}
