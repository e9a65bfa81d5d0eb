/// Health check endpoint
///
/// Reports that the server is up and whether the database answers.
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
///
/// # Response
///
/// ```json
/// {
///   "status": "OK",
///   "timestamp": "2024-06-01T09:00:00.000Z",
///   "service": "Care Roster API",
///   "version": "0.1.0",
///   "database": "connected"
/// }
/// ```

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use chrono::{SecondsFormat, Utc};
use roster_shared::db::pool;
use serde::{Deserialize, Serialize};

pub const SERVICE_NAME: &str = "Care Roster API";

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `OK`, or `DEGRADED` when the database does not answer
    pub status: String,

    /// Server time, RFC 3339
    pub timestamp: String,

    pub service: String,

    /// Application version
    pub version: String,

    /// Database status
    pub database: String,
}

/// Health check handler
///
/// Always answers 200 so load balancers can tell a slow database apart from
/// a dead process.
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let database_status = match pool::health_check(&state.db).await {
        Ok(()) => "connected",
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not reach the database");
            "disconnected"
        }
    };

    Ok(Json(HealthResponse {
        status: if database_status == "connected" {
            "OK".to_string()
        } else {
            "DEGRADED".to_string()
        },
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database_status.to_string(),
    }))
}
