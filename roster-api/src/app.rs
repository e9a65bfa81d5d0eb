/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use roster_api::{app::AppState, config::Config};
/// use roster_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(DatabaseConfig {
///     url: config.database.url.clone(),
///     ..Default::default()
/// })
/// .await?;
/// let state = AppState::new(pool, config);
/// let app = roster_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    error::ApiError,
    middleware::{
        rate_limit::{rate_limit_layer, RateLimiter},
        security::SecurityHeadersLayer,
    },
};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use roster_shared::auth::{
    authorization::admin_only_middleware,
    cookie::{SessionCookie, SESSION_COOKIE_NAME},
    middleware::cookie_auth_middleware,
};
use sqlx::SqlitePool;
use std::{sync::Arc, time::Duration};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Session cookie attributes for this environment
    pub cookie: SessionCookie,

    /// Per-client request counters for `/api`
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(db: SqlitePool, config: Config) -> Self {
        let cookie = SessionCookie::new(config.api.production);
        let rate_limiter = RateLimiter::new(
            config.rate_limit.max_requests,
            Duration::from_secs(config.rate_limit.window_secs),
        );

        Self {
            db,
            config: Arc::new(config),
            cookie,
            rate_limiter: Arc::new(rate_limiter),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET  /health                      # public
/// └── /api/
///     ├── /auth/
///     │   ├── POST /login               # public
///     │   ├── POST /carer-login         # public
///     │   ├── POST /logout              # public
///     │   ├── GET  /me                  # session
///     │   └── POST /change-password     # session + admin
///     ├── /roster/
///     │   ├── GET  /current             # session
///     │   ├── GET  /today               # session
///     │   ├── GET  /updates             # session (SSE)
///     │   ├── GET  /:id                 # session
///     │   ├── GET  /template            # session + admin
///     │   ├── POST /validate            # session + admin
///     │   ├── POST /                    # session + admin
///     │   └── PUT  /:id                 # session + admin
///     ├── GET /rosters                  # session + admin
///     └── GET /debug                    # session + admin, when enabled
/// ```
///
/// # Middleware Stack
///
/// Outermost first:
/// 1. Security headers
/// 2. CORS
/// 3. Request tracing
/// 4. Rate limiting on `/api` (production)
/// 5. Session and role checks (per route group)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let public_auth_routes = Router::new()
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/carer-login", post(routes::auth::carer_login))
        .route("/auth/logout", post(routes::auth::logout));

    // Any signed-in user
    let session_routes = Router::new()
        .route("/auth/me", get(routes::auth::me))
        .route("/roster/current", get(routes::roster::current_roster))
        .route("/roster/today", get(routes::roster::today))
        .route("/roster/updates", get(routes::events::roster_updates))
        .route("/roster/:id", get(routes::roster::get_roster));

    // Admin only
    let mut admin_routes = Router::new()
        .route("/auth/change-password", post(routes::auth::change_password))
        .route("/roster/template", get(routes::roster::template))
        .route("/roster/validate", post(routes::roster::validate_roster))
        .route("/roster", post(routes::roster::create_roster))
        .route("/roster/:id", axum::routing::put(routes::roster::update_roster))
        .route("/rosters", get(routes::roster::list_rosters));

    if state.config.api.debug_endpoints {
        admin_routes = admin_routes.route("/debug", get(routes::debug::debug_info));
    }

    let admin_routes = admin_routes.route_layer(from_fn(admin_only_middleware));

    let protected_routes = session_routes
        .merge(admin_routes)
        .route_layer(from_fn_with_state(state.clone(), session_auth_layer));

    let mut api_routes = public_auth_routes.merge(protected_routes);

    if state.config.rate_limit.enabled {
        api_routes = api_routes.layer(from_fn_with_state(state.clone(), rate_limit_layer));
    }

    Router::new()
        .merge(health_routes)
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config))
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// CORS for the browser and mobile shells
///
/// Credentials are always allowed because the session travels in a cookie.
/// `*` mirrors the caller's origin instead of sending a wildcard, which
/// browsers reject alongside credentials.
fn cors_layer(config: &Config) -> CorsLayer {
    let origins = &config.api.cors_origins;

    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::mirror_request()
    } else {
        let origins: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}

/// Session cookie authentication layer
///
/// Validates the `token` cookie and injects `AuthContext` into request
/// extensions.
async fn session_auth_layer(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    cookie_auth_middleware(state.jwt_secret().to_string(), SESSION_COOKIE_NAME, req, next)
        .await
        .map_err(ApiError::from)
}
