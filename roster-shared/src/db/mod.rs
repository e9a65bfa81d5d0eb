/// Database layer
///
/// # Modules
///
/// - `pool`: SQLite connection pool with health checks
/// - `migrations`: Embedded migration runner
/// - `seed`: Admin account seeding at startup
///
/// Models are in the `models` module at crate root level.

pub mod migrations;
pub mod pool;
pub mod seed;
