//! # Roster Shared Library
//!
//! This crate contains the types, storage and authentication logic used by
//! the roster API server.
//!
//! ## Module Organization
//!
//! - `auth`: Password hashing, session tokens, cookie auth middleware
//! - `db`: Connection pool, migrations and startup seeding
//! - `models`: Users, rosters and the weekly schedule shape

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the roster shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
