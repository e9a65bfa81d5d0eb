/// Database models
///
/// # Models
///
/// - `user`: Admin and carer accounts
/// - `roster`: Saved weekly rosters
/// - `schedule`: Typed view of a roster's schedule document

pub mod roster;
pub mod schedule;
pub mod user;
