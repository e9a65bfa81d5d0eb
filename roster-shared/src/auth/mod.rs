/// Authentication and authorization
///
/// # Modules
///
/// - [`password`]: Argon2id hashing for the admin password
/// - [`jwt`]: Session token claims, signing and validation
/// - [`cookie`]: The httpOnly cookie that carries the session token
/// - [`middleware`]: Turning a request's cookie into an [`middleware::AuthContext`]
/// - [`authorization`]: The admin/carer role check
///
/// Carers never have a password: their session comes from a name-only
/// login. The admin always logs in with a password.

pub mod authorization;
pub mod cookie;
pub mod jwt;
pub mod middleware;
pub mod password;
