/// Middleware modules for the API server
///
/// - Security headers
/// - Per-client rate limiting on `/api`

pub mod rate_limit;
pub mod security;
