/// Session authentication for Axum
///
/// Reads the session cookie, validates the token inside it and turns the
/// claims into an [`AuthContext`] that handlers pick up from the request
/// extensions.
///
/// # Failure modes
///
/// - No cookie at all: [`AuthError::MissingCredentials`] (mapped to 401)
/// - A cookie whose token fails validation: [`AuthError::InvalidToken`]
///   (mapped to 400)
///
/// # Example
///
/// ```no_run
/// use axum::Extension;
/// use roster_shared::auth::middleware::AuthContext;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("Hello, {}!", auth.username)
/// }
/// ```

use axum::{
    extract::Request,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::cookie::read_cookie;
use super::jwt::{validate_token, Claims, JwtError};
use crate::models::user::UserRole;

/// Authenticated caller, added to request extensions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: i64,

    /// Username carried in the token
    pub username: String,

    /// Role carried in the token
    pub role: UserRole,

    /// ID of the token that authenticated this request
    pub token_id: Uuid,
}

impl AuthContext {
    /// Creates auth context from validated claims
    pub fn from_claims(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            username: claims.username,
            role: claims.role,
            token_id: claims.jti,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Error type for session authentication
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No session cookie on the request
    #[error("Access denied. No token provided.")]
    MissingCredentials,

    /// Session cookie present but the token is not acceptable
    #[error("Invalid token: {0}")]
    InvalidToken(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingCredentials => {
                (StatusCode::UNAUTHORIZED, "Access denied. No token provided.")
            }
            AuthError::InvalidToken(_) => (StatusCode::BAD_REQUEST, "Invalid token."),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Authenticates a request from its headers
///
/// # Errors
///
/// See the module docs for the two failure modes.
pub fn authenticate(
    headers: &HeaderMap,
    cookie_name: &str,
    secret: &str,
) -> Result<AuthContext, AuthError> {
    let token = read_cookie(headers, cookie_name).ok_or(AuthError::MissingCredentials)?;

    let claims = validate_token(&token, secret).map_err(|e| match e {
        JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
        JwtError::InvalidIssuer { .. } => AuthError::InvalidToken("Invalid issuer".to_string()),
        other => AuthError::InvalidToken(other.to_string()),
    })?;

    Ok(AuthContext::from_claims(claims))
}

/// Session cookie authentication middleware
///
/// Runs [`authenticate`] and stores the resulting [`AuthContext`] in the
/// request extensions before calling the next handler.
///
/// # Example
///
/// ```no_run
/// use axum::{middleware, routing::get, Router};
/// use roster_shared::auth::middleware::cookie_auth_middleware;
///
/// async fn handler() -> &'static str {
///     "Protected route"
/// }
///
/// let app: Router = Router::new()
///     .route("/protected", get(handler))
///     .layer(middleware::from_fn(|req, next| {
///         cookie_auth_middleware("secret".to_string(), "token", req, next)
///     }));
/// ```
pub async fn cookie_auth_middleware(
    secret: String,
    cookie_name: &'static str,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let context = authenticate(req.headers(), cookie_name, &secret)?;

    tracing::debug!(
        user_id = context.user_id,
        role = %context.role,
        "Authenticated session"
    );

    req.extensions_mut().insert(context);

    Ok(next.run(req).await)
}
