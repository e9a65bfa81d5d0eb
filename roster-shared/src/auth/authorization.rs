/// Role checks
///
/// There are exactly two roles. Admins author rosters and manage their own
/// password; carers only read. Every check here works off the
/// [`AuthContext`] built from the session token, without a database lookup.

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use super::middleware::AuthContext;
use crate::models::user::UserRole;

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// Caller does not hold the required role
    #[error("Insufficient permissions: requires {required:?}, has {actual:?}")]
    InsufficientRole {
        required: UserRole,
        actual: UserRole,
    },

    /// Role check ran before session authentication
    #[error("No authenticated session on the request")]
    MissingContext,
}

impl IntoResponse for AuthzError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthzError::InsufficientRole { .. } => {
                (StatusCode::FORBIDDEN, "Admin access required.")
            }
            AuthzError::MissingContext => {
                (StatusCode::UNAUTHORIZED, "Access denied. No token provided.")
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Checks that the caller holds `required`
pub fn require_role(auth: &AuthContext, required: UserRole) -> Result<(), AuthzError> {
    if auth.role != required {
        return Err(AuthzError::InsufficientRole {
            required,
            actual: auth.role,
        });
    }

    Ok(())
}

/// Checks that the caller is the admin
pub fn require_admin(auth: &AuthContext) -> Result<(), AuthzError> {
    require_role(auth, UserRole::Admin)
}

/// Rejects callers that are not the admin
///
/// Must be layered inside [`super::middleware::cookie_auth_middleware`] so
/// the [`AuthContext`] is already in the request extensions.
pub async fn admin_only_middleware(req: Request, next: Next) -> Result<Response, AuthzError> {
    let auth = req
        .extensions()
        .get::<AuthContext>()
        .ok_or(AuthzError::MissingContext)?;

    if let Err(err) = require_admin(auth) {
        tracing::warn!(user_id = auth.user_id, role = %auth.role, "Admin route refused");
        return Err(err);
    }

    Ok(next.run(req).await)
}
