/// API route handlers
///
/// - `health`: Health check endpoint
/// - `auth`: Login, carer login, logout, identity, password change
/// - `roster`: Roster reads and admin writes
/// - `events`: Heartbeat stream
/// - `debug`: Admin diagnostics

pub mod auth;
pub mod debug;
pub mod events;
pub mod health;
pub mod roster;
