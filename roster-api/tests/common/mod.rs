//! Common test utilities for integration tests
//!
//! - A fresh in-memory database per test, migrated and with the admin seeded
//! - The full router, driven through `tower::Service`
//! - Login helpers that hand back the session cookie

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, Response, StatusCode};
use axum::Router;
use roster_api::app::{build_router, AppState};
use roster_api::config::Config;
use roster_shared::db::migrations::run_migrations;
use roster_shared::db::pool::{create_pool, DatabaseConfig};
use roster_shared::db::seed::seed_admin;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower::Service as _;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin123";

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: SqlitePool,
    pub app: Router,
    pub config: Config,
}

impl TestContext {
    /// Creates a new test context with the default test configuration
    pub async fn new() -> anyhow::Result<Self> {
        Self::with_config(Config::for_testing()).await
    }

    /// Creates a new test context with a tweaked configuration
    pub async fn with_config(config: Config) -> anyhow::Result<Self> {
        let db = create_pool(DatabaseConfig::in_memory()).await?;
        run_migrations(&db).await?;
        seed_admin(&db, &config.admin.username, &config.admin.password).await?;

        let app = build_router(AppState::new(db.clone(), config.clone()));

        Ok(TestContext { db, app, config })
    }

    /// Sends one request through the router
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }

        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        self.app
            .clone()
            .call(builder.body(body).unwrap())
            .await
            .unwrap()
    }

    /// Sends a raw body, for requests the JSON helpers cannot express
    pub async fn send_raw(
        &self,
        uri: &str,
        cookie: Option<&str>,
        content_type: Option<&str>,
        body: &str,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(Method::POST).uri(uri);

        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }

        self.app
            .clone()
            .call(builder.body(Body::from(body.to_string())).unwrap())
            .await
            .unwrap()
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        self.send(Method::GET, uri, cookie, None).await
    }

    pub async fn post(&self, uri: &str, cookie: Option<&str>, body: Value) -> Response<Body> {
        self.send(Method::POST, uri, cookie, Some(body)).await
    }

    pub async fn put(&self, uri: &str, cookie: Option<&str>, body: Value) -> Response<Body> {
        self.send(Method::PUT, uri, cookie, Some(body)).await
    }

    /// Logs in as the seeded admin and returns the `Cookie` header value
    pub async fn login_admin(&self) -> String {
        let response = self
            .post(
                "/api/auth/login",
                None,
                json!({ "username": ADMIN_USERNAME, "password": ADMIN_PASSWORD }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);

        session_cookie(&response).expect("admin login did not set a cookie")
    }

    /// Logs in as a carer and returns the `Cookie` header value
    pub async fn login_carer(&self, name: &str) -> String {
        let response = self
            .post("/api/auth/carer-login", None, json!({ "name": name }))
            .await;
        assert_eq!(response.status(), StatusCode::OK);

        session_cookie(&response).expect("carer login did not set a cookie")
    }

    /// Saves a roster as the admin and returns its ID
    pub async fn create_roster(&self, admin_cookie: &str, name: &str) -> i64 {
        let response = self
            .post("/api/roster", Some(admin_cookie), roster_body(name))
            .await;
        assert_eq!(response.status(), StatusCode::OK);

        body_json(response).await["rosterId"].as_i64().unwrap()
    }

    /// Stored password hash of a user
    pub async fn password_hash(&self, username: &str) -> Option<String> {
        sqlx::query_scalar("SELECT password FROM users WHERE username = ?")
            .bind(username)
            .fetch_one(&self.db)
            .await
            .unwrap()
    }
}

/// `name=value` of the session cookie set by a response
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    set_cookie(response)
        .and_then(|c| c.split(';').next().map(str::to_string))
        .filter(|pair| pair != "token=")
}

/// Raw `Set-Cookie` header of a response
pub fn set_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

pub async fn body_json(response: Response<Body>) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// A complete roster body with Monday filled in
pub fn roster_body(name: &str) -> Value {
    json!({
        "name": name,
        "data": {
            "monday": {
                "morning": [{"name": "Jane"}, {"name": "Sam"}],
                "evening": [{"name": "Alex"}],
                "instructions": format!("{} notes", name)
            }
        },
        "activeDays": {
            "monday": true,
            "tuesday": false
        }
    })
}
