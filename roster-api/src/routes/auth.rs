/// Authentication endpoints
///
/// The session token travels in an httpOnly cookie. Admins sign in with a
/// password; carers pick their name and get a session without one.
///
/// # Endpoints
///
/// - `POST /api/auth/login` - Username (+ password for the admin)
/// - `POST /api/auth/carer-login` - Name only, creates the carer on first use
/// - `POST /api/auth/logout` - Clears the cookie
/// - `GET /api/auth/me` - Caller identity from the token
/// - `POST /api/auth/change-password` - Admin password change

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ApiJson,
};
use axum::{
    extract::State,
    http::{header, HeaderValue},
    response::{AppendHeaders, IntoResponse},
    Extension, Json,
};
use roster_shared::{
    auth::{jwt, middleware::AuthContext, password},
    models::user::{normalize_carer_username, User, UserRole},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    /// Required for the admin, ignored for carers
    #[serde(default)]
    pub password: Option<String>,
}

/// Carer login request
#[derive(Debug, Deserialize)]
pub struct CarerLoginRequest {
    /// Name as typed by the carer
    #[serde(default)]
    pub name: Option<String>,
}

/// Change password request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub current_password: Option<String>,

    #[serde(default)]
    pub new_password: Option<String>,
}

/// Public view of a user
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
    pub role: UserRole,

    /// Name exactly as entered, carer login only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: UserInfo,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl UserInfo {
    fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            role: user.role,
            display_name: None,
        }
    }
}

impl From<AuthContext> for UserInfo {
    fn from(auth: AuthContext) -> Self {
        Self {
            id: auth.user_id,
            username: auth.username,
            role: auth.role,
            display_name: None,
        }
    }
}

/// Signs a token for `user` and renders it as a `Set-Cookie` value
fn session_cookie(state: &AppState, user: &User) -> ApiResult<HeaderValue> {
    let claims = jwt::Claims::new(user.id, user.username.clone(), user.role);
    let token = jwt::create_token(&claims, state.jwt_secret())?;

    state
        .cookie
        .issue(&token)
        .map_err(|e| ApiError::internal("Server error", e))
}

/// Login endpoint
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/login
/// Content-Type: application/json
///
/// { "username": "admin", "password": "admin123" }
/// ```
///
/// # Response
///
/// Sets the `token` cookie.
///
/// ```json
/// { "user": { "id": 1, "username": "admin", "role": "admin" } }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Username missing, or admin without a password
/// - `401 Unauthorized`: Unknown user or wrong admin password
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    req.validate().map_err(ApiError::from_validation)?;

    let user = User::find_by_username(&state.db, &req.username)
        .await?
        .ok_or_else(|| {
            tracing::info!(username = %req.username, "Login for unknown user");
            ApiError::Unauthorized("Invalid credentials".to_string())
        })?;

    if user.role == UserRole::Admin {
        let candidate = req
            .password
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| ApiError::BadRequest("Password is required for admin".to_string()))?;

        let valid = match user.password_hash.as_deref() {
            Some(hash) => password::verify_password(candidate, hash)?,
            None => false,
        };

        if !valid {
            tracing::warn!(user_id = user.id, "Admin login with wrong password");
            return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
        }
    }

    let cookie = session_cookie(&state, &user)?;

    tracing::info!(user_id = user.id, role = %user.role, "User logged in");

    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(UserResponse {
            user: UserInfo::from_user(&user),
        }),
    ))
}

/// Carer login endpoint
///
/// The name is normalized into a username ("Jane Doe" becomes `jane_doe`)
/// and the carer row is created on first use. A name that normalizes to an
/// existing non-carer account is refused.
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/carer-login
/// Content-Type: application/json
///
/// { "name": "Jane Doe" }
/// ```
///
/// # Response
///
/// ```json
/// { "user": { "id": 2, "username": "jane_doe", "role": "carer", "displayName": "Jane Doe" } }
/// ```
pub async fn carer_login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CarerLoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let name = req.name.unwrap_or_default();
    let username = normalize_carer_username(&name)
        .ok_or_else(|| ApiError::BadRequest("Carer name is required".to_string()))?;

    let user = User::find_or_create_carer(&state.db, &username)
        .await?
        .ok_or_else(|| {
            tracing::warn!(username = %username, "Carer login matched a non-carer account");
            ApiError::Unauthorized("Invalid credentials".to_string())
        })?;

    let cookie = session_cookie(&state, &user)?;

    tracing::info!(user_id = user.id, username = %user.username, "Carer logged in");

    let mut info = UserInfo::from_user(&user);
    info.display_name = Some(name.trim().to_string());

    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(UserResponse { user: info }),
    ))
}

/// Logout endpoint
///
/// Always succeeds, with or without a session.
pub async fn logout(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let cookie = state
        .cookie
        .clear()
        .map_err(|e| ApiError::internal("Server error", e))?;

    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(MessageResponse {
            message: "Logged out successfully".to_string(),
        }),
    ))
}

/// Current user endpoint
///
/// Answers from the token alone.
pub async fn me(Extension(auth): Extension<AuthContext>) -> Json<UserResponse> {
    Json(UserResponse { user: auth.into() })
}

/// Change password endpoint
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/change-password
/// Content-Type: application/json
///
/// { "currentPassword": "admin123", "newPassword": "s3cret!" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: A field is missing, the new password is too short,
///   or the current password does not match
/// - `404 Not Found`: The token's user no longer exists
pub async fn change_password(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(req): ApiJson<ChangePasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let (current, new) = match (req.current_password, req.new_password) {
        (Some(current), Some(new)) if !current.is_empty() && !new.is_empty() => (current, new),
        _ => {
            return Err(ApiError::BadRequest(
                "Current password and new password are required".to_string(),
            ))
        }
    };

    password::validate_new_password(&new).map_err(ApiError::BadRequest)?;

    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let matches = match user.password_hash.as_deref() {
        Some(hash) => password::verify_password(&current, hash)?,
        None => false,
    };

    if !matches {
        tracing::warn!(user_id = user.id, "Password change with wrong current password");
        return Err(ApiError::BadRequest(
            "Current password is incorrect".to_string(),
        ));
    }

    let new_hash = password::hash_password(&new)?;

    if !User::update_password(&state.db, user.id, &new_hash).await? {
        return Err(ApiError::internal(
            "Failed to update password",
            format!("user {} vanished during update", user.id),
        ));
    }

    tracing::info!(user_id = user.id, "Password changed");

    Ok(Json(MessageResponse {
        message: "Password changed successfully".to_string(),
    }))
}
