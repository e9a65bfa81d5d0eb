/// Configuration management for the API server
///
/// This module loads configuration from environment variables (and a `.env`
/// file when present) into a type-safe configuration struct.
///
/// # Environment Variables
///
/// - `APP_ENV`: `production` or anything else for development (default: development)
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `PORT`: Port to bind to (default: 5001, required in production)
/// - `DATABASE_URL`: SQLite URL (default: sqlite://roster.db, sqlite://data/roster.db in production)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 5)
/// - `JWT_SECRET`: Token signing secret, at least 32 characters (required in production)
/// - `ADMIN_USERNAME` / `ADMIN_PASSWORD`: Seeded admin (default: admin / admin123)
/// - `CORS_ORIGINS`: Comma-separated allowed origins, `*` for any
/// - `SSE_HEARTBEAT_SECS`: Heartbeat period on the updates stream (default: 30)
/// - `RATE_LIMIT_MAX_REQUESTS` / `RATE_LIMIT_WINDOW_SECS`: API rate limit (default: 500 per 900s)
/// - `DEBUG_ENDPOINTS`: Mount `/api/debug` (default: true outside production)
/// - `RUST_LOG`: Log filter
///
/// # Example
///
/// ```no_run
/// use roster_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// Secret used when `JWT_SECRET` is unset outside production
const DEVELOPMENT_JWT_SECRET: &str = "roster-development-secret-change-me-please";

/// Origins the mobile client is served from by default
const DEFAULT_CORS_ORIGINS: &[&str] = &[
    "http://localhost:3000",
    "http://localhost:3001",
    "capacitor://localhost",
    "ionic://localhost",
];

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT configuration
    pub jwt: JwtConfig,

    /// Seeded admin account
    pub admin: AdminConfig,

    /// Rate limiting for `/api/*`
    pub rate_limit: RateLimitConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Production mode: secure cookies, HSTS, rate limiting
    pub production: bool,

    /// Allowed CORS origins (`*` = any)
    pub cors_origins: Vec<String>,

    /// Seconds between heartbeats on the updates stream
    pub sse_heartbeat_secs: u64,

    /// Whether `/api/debug` is mounted
    pub debug_endpoints: bool,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Secret key for JWT signing
    ///
    /// Must be at least 32 bytes. Generate with: `openssl rand -hex 32`
    #[serde(skip_serializing)]
    pub secret: String,
}

/// Admin account seeded on first start
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    pub username: String,

    #[serde(skip_serializing)]
    pub password: String,
}

/// Fixed-window rate limit applied per client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Whether the limiter is installed
    pub enabled: bool,

    /// Requests allowed per window
    pub max_requests: u32,

    /// Window length in seconds
    pub window_secs: u64,
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{} has an invalid value: {}", name, e)),
        Err(_) => Ok(default),
    }
}

fn parse_bool_var(name: &str, default: bool) -> anyhow::Result<bool> {
    match env::var(name) {
        Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => anyhow::bail!("{} has an invalid boolean value: {}", name, other),
        },
        Err(_) => Ok(default),
    }
}

/// Splits a comma-separated origin list, dropping blanks
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A production deployment is missing `PORT` or `JWT_SECRET`
    /// - `JWT_SECRET` is shorter than 32 characters
    /// - A numeric or boolean variable cannot be parsed
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let production = env::var("APP_ENV")
            .map(|v| v.eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        let host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = if production {
            env::var("PORT")
                .map_err(|_| anyhow::anyhow!("PORT environment variable is required in production"))?
                .parse::<u16>()?
        } else {
            parse_var("PORT", 5001u16)?
        };

        let default_db = if production {
            "sqlite://data/roster.db"
        } else {
            "sqlite://roster.db"
        };
        let database_url = env::var("DATABASE_URL").unwrap_or_else(|_| default_db.to_string());
        let max_connections = parse_var("DATABASE_MAX_CONNECTIONS", 5u32)?;

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) => secret,
            Err(_) if production => {
                anyhow::bail!("JWT_SECRET environment variable is required in production")
            }
            Err(_) => {
                tracing::warn!("JWT_SECRET not set, using the development secret");
                DEVELOPMENT_JWT_SECRET.to_string()
            }
        };

        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let cors_origins = env::var("CORS_ORIGINS")
            .map(|raw| parse_origins(&raw))
            .unwrap_or_else(|_| DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect());

        Ok(Self {
            api: ApiConfig {
                host,
                port,
                production,
                cors_origins,
                sse_heartbeat_secs: parse_var("SSE_HEARTBEAT_SECS", 30u64)?.max(1),
                debug_endpoints: parse_bool_var("DEBUG_ENDPOINTS", !production)?,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            jwt: JwtConfig { secret: jwt_secret },
            admin: AdminConfig {
                username: env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string()),
                password: env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".to_string()),
            },
            rate_limit: RateLimitConfig {
                enabled: production,
                max_requests: parse_var("RATE_LIMIT_MAX_REQUESTS", 500u32)?,
                window_secs: parse_var("RATE_LIMIT_WINDOW_SECS", 900u64)?.max(1),
            },
        })
    }

    /// Configuration for tests and local experiments
    ///
    /// In-memory database, development cookies, no rate limiting.
    pub fn for_testing() -> Self {
        Self {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                production: false,
                cors_origins: vec!["http://localhost:3000".to_string()],
                sse_heartbeat_secs: 30,
                debug_endpoints: true,
            },
            database: DatabaseConfig {
                url: "sqlite::memory:".to_string(),
                max_connections: 1,
            },
            jwt: JwtConfig {
                secret: "test-secret-key-at-least-32-bytes-long".to_string(),
            },
            admin: AdminConfig {
                username: "admin".to_string(),
                password: "admin123".to_string(),
            },
            rate_limit: RateLimitConfig {
                enabled: false,
                max_requests: 500,
                window_secs: 900,
            },
        }
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Name of the deployment environment
    pub fn environment(&self) -> &'static str {
        if self.api.production {
            "production"
        } else {
            "development"
        }
    }
}
