//! Integration tests for the roster API
//!
//! These drive the full router end-to-end against an in-memory database:
//! - Admin and carer sessions
//! - Role checks on admin routes
//! - Roster create, update, read and listing
//! - Password change

mod common;

use axum::http::{header, StatusCode};
use common::{body_json, roster_body, set_cookie, TestContext, ADMIN_PASSWORD, ADMIN_USERNAME};
use roster_shared::auth::password::verify_password;
use serde_json::json;

#[tokio::test]
async fn test_health_check() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx.get("/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("X-Content-Type-Options").unwrap(),
        "nosniff"
    );

    let json = body_json(response).await;
    assert_eq!(json["status"], "OK");
    assert_eq!(json["database"], "connected");
    assert!(json["timestamp"].is_string());
}

#[tokio::test]
async fn test_admin_login_requires_password() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx
        .post("/api/auth/login", None, json!({ "username": ADMIN_USERNAME }))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(set_cookie(&response).is_none());
    assert_eq!(
        body_json(response).await["error"],
        "Password is required for admin"
    );
}

#[tokio::test]
async fn test_admin_login_rejects_bad_credentials() {
    let ctx = TestContext::new().await.unwrap();

    let wrong_password = ctx
        .post(
            "/api/auth/login",
            None,
            json!({ "username": ADMIN_USERNAME, "password": "not-it" }),
        )
        .await;
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(wrong_password).await["error"], "Invalid credentials");

    let unknown_user = ctx
        .post(
            "/api/auth/login",
            None,
            json!({ "username": "nobody", "password": "whatever" }),
        )
        .await;
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);

    let no_username = ctx.post("/api/auth/login", None, json!({})).await;
    assert_eq!(no_username.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(no_username).await["error"], "Username is required");
}

#[tokio::test]
async fn test_admin_login_sets_session_cookie() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx
        .post(
            "/api/auth/login",
            None,
            json!({ "username": ADMIN_USERNAME, "password": ADMIN_PASSWORD }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let raw = set_cookie(&response).unwrap();
    assert!(raw.starts_with("token="));
    assert!(raw.contains("HttpOnly"));
    assert!(raw.contains("Max-Age=86400"));
    assert!(raw.contains("SameSite=Lax"));
    assert!(!raw.contains("Secure"));

    let json = body_json(response).await;
    assert_eq!(json["user"]["username"], ADMIN_USERNAME);
    assert_eq!(json["user"]["role"], "admin");

    let cookie = raw.split(';').next().unwrap().to_string();
    let me = ctx.get("/api/auth/me", Some(&cookie)).await;
    assert_eq!(me.status(), StatusCode::OK);
    assert_eq!(body_json(me).await["user"]["role"], "admin");
}

#[tokio::test]
async fn test_carer_login_needs_no_password() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx
        .post("/api/auth/carer-login", None, json!({ "name": "  Jane Doe " }))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(set_cookie(&response).is_some());

    let json = body_json(response).await;
    assert_eq!(json["user"]["username"], "jane_doe");
    assert_eq!(json["user"]["role"], "carer");
    assert_eq!(json["user"]["displayName"], "Jane Doe");

    // The carer row now exists, so the plain login works without a password
    let response = ctx
        .post("/api/auth/login", None, json!({ "username": "jane_doe" }))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["user"]["role"], "carer");
}

#[tokio::test]
async fn test_carer_names_reuse_one_user() {
    let ctx = TestContext::new().await.unwrap();

    let first = ctx
        .post("/api/auth/carer-login", None, json!({ "name": "Jane Doe" }))
        .await;
    let second = ctx
        .post("/api/auth/carer-login", None, json!({ "name": "jane doe" }))
        .await;

    let first = body_json(first).await;
    let second = body_json(second).await;
    assert_eq!(first["user"]["id"], second["user"]["id"]);

    let (carers,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE role = 'carer'")
        .fetch_one(&ctx.db)
        .await
        .unwrap();
    assert_eq!(carers, 1);
}

#[tokio::test]
async fn test_carer_login_rejects_blank_and_admin_names() {
    let ctx = TestContext::new().await.unwrap();

    let blank = ctx
        .post("/api/auth/carer-login", None, json!({ "name": "   " }))
        .await;
    assert_eq!(blank.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(blank).await["error"], "Carer name is required");

    let missing = ctx.post("/api/auth/carer-login", None, json!({})).await;
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

    let admin = ctx
        .post("/api/auth/carer-login", None, json!({ "name": "Admin" }))
        .await;
    assert_eq!(admin.status(), StatusCode::UNAUTHORIZED);
    assert!(set_cookie(&admin).is_none());
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx.post("/api/auth/logout", None, json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);

    let raw = set_cookie(&response).unwrap();
    assert!(raw.starts_with("token=;"));
    assert!(raw.contains("Max-Age=0"));
    assert_eq!(
        body_json(response).await["message"],
        "Logged out successfully"
    );
}

#[tokio::test]
async fn test_protected_routes_require_session() {
    let ctx = TestContext::new().await.unwrap();

    let missing = ctx.get("/api/roster/current", None).await;
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(missing).await["error"],
        "Access denied. No token provided."
    );

    let garbage = ctx.get("/api/roster/current", Some("token=not-a-jwt")).await;
    assert_eq!(garbage.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(garbage).await["error"], "Invalid token.");
}

#[tokio::test]
async fn test_carer_cannot_use_admin_routes() {
    let ctx = TestContext::new().await.unwrap();
    let carer = ctx.login_carer("Sam").await;

    let create = ctx
        .post("/api/roster", Some(&carer), roster_body("Week 1"))
        .await;
    assert_eq!(create.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(create).await["error"], "Admin access required.");

    for uri in ["/api/rosters", "/api/roster/template"] {
        let response = ctx.get(uri, Some(&carer)).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{}", uri);
    }

    let change = ctx
        .post(
            "/api/auth/change-password",
            Some(&carer),
            json!({ "currentPassword": "x", "newPassword": "yyyyyy" }),
        )
        .await;
    assert_eq!(change.status(), StatusCode::FORBIDDEN);

    // Reading is fine
    let current = ctx.get("/api/roster/current", Some(&carer)).await;
    assert_eq!(current.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_current_roster_is_latest_save() {
    let ctx = TestContext::new().await.unwrap();
    let admin = ctx.login_admin().await;

    let empty = ctx.get("/api/roster/current", Some(&admin)).await;
    assert!(body_json(empty).await["roster"].is_null());

    let first = ctx.create_roster(&admin, "Week 1").await;
    let second = ctx.create_roster(&admin, "Week 2").await;
    assert_ne!(first, second);

    let carer = ctx.login_carer("Jane").await;
    let current = body_json(ctx.get("/api/roster/current", Some(&carer)).await).await;
    assert_eq!(current["roster"]["id"], second);
    assert_eq!(current["roster"]["name"], "Week 2");
    assert_eq!(current["roster"]["activeDays"]["monday"], true);
    assert_eq!(
        current["roster"]["data"]["monday"]["morning"][0]["name"],
        "Jane"
    );
    assert!(current["roster"]["createdAt"].is_string());
    assert!(current["roster"]["updatedAt"].is_string());

    let list = body_json(ctx.get("/api/rosters", Some(&admin)).await).await;
    let ids: Vec<i64> = list["rosters"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![second, first]);
    assert!(list["rosters"][0]["created_at"].is_string());
}

#[tokio::test]
async fn test_update_moves_roster_to_current() {
    let ctx = TestContext::new().await.unwrap();
    let admin = ctx.login_admin().await;

    let first = ctx.create_roster(&admin, "Week 1").await;
    ctx.create_roster(&admin, "Week 2").await;

    let response = ctx
        .put(
            &format!("/api/roster/{}", first),
            Some(&admin),
            roster_body("Week 1 (revised)"),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["message"],
        "Roster updated successfully"
    );

    let current = body_json(ctx.get("/api/roster/current", Some(&admin)).await).await;
    assert_eq!(current["roster"]["id"], first);
    assert_eq!(current["roster"]["name"], "Week 1 (revised)");
}

#[tokio::test]
async fn test_update_missing_roster_is_404() {
    let ctx = TestContext::new().await.unwrap();
    let admin = ctx.login_admin().await;
    let existing = ctx.create_roster(&admin, "Week 1").await;

    let response = ctx
        .put(
            &format!("/api/roster/{}", existing + 100),
            Some(&admin),
            roster_body("Ghost"),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "Roster not found");

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM rosters")
        .fetch_one(&ctx.db)
        .await
        .unwrap();
    assert_eq!(count, 1);

    let stored = body_json(
        ctx.get(&format!("/api/roster/{}", existing), Some(&admin))
            .await,
    )
    .await;
    assert_eq!(stored["roster"]["name"], "Week 1");
}

#[tokio::test]
async fn test_roster_body_requires_all_fields() {
    let ctx = TestContext::new().await.unwrap();
    let admin = ctx.login_admin().await;

    let bodies = [
        json!({ "data": {}, "activeDays": {} }),
        json!({ "name": "", "data": {}, "activeDays": {} }),
        json!({ "name": "Week 1", "activeDays": {} }),
        json!({ "name": "Week 1", "data": null, "activeDays": {} }),
        json!({ "name": "Week 1", "data": {} }),
    ];

    for body in bodies {
        let response = ctx.post("/api/roster", Some(&admin), body.clone()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", body);
        assert_eq!(
            body_json(response).await["error"],
            "Name, data, and activeDays are required"
        );
    }

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM rosters")
        .fetch_one(&ctx.db)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_get_roster_by_id() {
    let ctx = TestContext::new().await.unwrap();
    let admin = ctx.login_admin().await;
    let id = ctx.create_roster(&admin, "Week 1").await;

    let found = ctx.get(&format!("/api/roster/{}", id), Some(&admin)).await;
    assert_eq!(found.status(), StatusCode::OK);
    assert_eq!(body_json(found).await["roster"]["id"], id);

    let missing = ctx
        .get(&format!("/api/roster/{}", id + 1), Some(&admin))
        .await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let not_numeric = ctx.get("/api/roster/latest", Some(&admin)).await;
    assert_eq!(not_numeric.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_today_view() {
    let ctx = TestContext::new().await.unwrap();
    let carer = ctx.login_carer("Jane").await;

    let empty = body_json(ctx.get("/api/roster/today", Some(&carer)).await).await;
    assert!(empty["day"].is_string());
    assert!(empty["shift"].is_null());
    assert!(empty["rosterId"].is_null());

    let admin = ctx.login_admin().await;
    let every_day = json!({
        "name": "Full week",
        "data": {
            "monday": {"morning": [{"name": "A"}], "evening": [{"name": "B"}], "instructions": "mon"},
            "tuesday": {"morning": [{"name": "A"}], "evening": [{"name": "B"}], "instructions": "tue"},
            "wednesday": {"morning": [{"name": "A"}], "evening": [{"name": "B"}], "instructions": "wed"},
            "thursday": {"morning": [{"name": "A"}], "evening": [{"name": "B"}], "instructions": "thu"},
            "friday": {"morning": [{"name": "A"}], "evening": [{"name": "B"}], "instructions": "fri"},
            "saturday": {"morning": [{"name": "A"}], "evening": [{"name": "B"}], "instructions": "sat"},
            "sunday": {"morning": [{"name": "A"}], "evening": [{"name": "B"}], "instructions": "sun"}
        },
        "activeDays": {
            "monday": true, "tuesday": true, "wednesday": true, "thursday": true,
            "friday": true, "saturday": true, "sunday": true
        }
    });
    let created = body_json(ctx.post("/api/roster", Some(&admin), every_day).await).await;

    let today = body_json(ctx.get("/api/roster/today", Some(&carer)).await).await;
    assert_eq!(today["rosterId"], created["rosterId"]);
    assert_eq!(today["active"], true);
    assert_eq!(today["shift"]["morning"][0]["name"], "A");

    let day = today["day"].as_str().unwrap();
    assert_eq!(today["shift"]["instructions"], &day[..3]);
}

#[tokio::test]
async fn test_template_and_validation() {
    let ctx = TestContext::new().await.unwrap();
    let admin = ctx.login_admin().await;

    let template = body_json(ctx.get("/api/roster/template", Some(&admin)).await).await;
    assert_eq!(template["data"].as_object().unwrap().len(), 7);
    assert_eq!(template["data"]["monday"]["morning"].as_array().unwrap().len(), 2);
    assert_eq!(template["activeDays"]["sunday"], true);

    // The blank template fails validation on every day
    let response = ctx
        .post(
            "/api/roster/validate",
            Some(&admin),
            json!({ "data": template["data"], "activeDays": template["activeDays"] }),
        )
        .await;
    let result = body_json(response).await;
    assert_eq!(result["valid"], false);
    assert!(result["errors"]
        .as_array()
        .unwrap()
        .contains(&json!("monday morning shift has empty carer names")));

    let body = roster_body("Week 1");
    let response = ctx
        .post(
            "/api/roster/validate",
            Some(&admin),
            json!({ "data": body["data"], "activeDays": body["activeDays"] }),
        )
        .await;
    let result = body_json(response).await;
    assert_eq!(result["valid"], true);
    assert_eq!(result["errors"], json!([]));
}

#[tokio::test]
async fn test_change_password_wrong_current_keeps_hash() {
    let ctx = TestContext::new().await.unwrap();
    let admin = ctx.login_admin().await;
    let before = ctx.password_hash(ADMIN_USERNAME).await.unwrap();

    let response = ctx
        .post(
            "/api/auth/change-password",
            Some(&admin),
            json!({ "currentPassword": "wrong", "newPassword": "brand-new" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "Current password is incorrect"
    );

    assert_eq!(ctx.password_hash(ADMIN_USERNAME).await.unwrap(), before);
}

#[tokio::test]
async fn test_change_password_validation() {
    let ctx = TestContext::new().await.unwrap();
    let admin = ctx.login_admin().await;

    let missing = ctx
        .post(
            "/api/auth/change-password",
            Some(&admin),
            json!({ "currentPassword": ADMIN_PASSWORD }),
        )
        .await;
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(missing).await["error"],
        "Current password and new password are required"
    );

    let short = ctx
        .post(
            "/api/auth/change-password",
            Some(&admin),
            json!({ "currentPassword": ADMIN_PASSWORD, "newPassword": "abc" }),
        )
        .await;
    assert_eq!(short.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(short).await["error"],
        "New password must be at least 6 characters"
    );
}

#[tokio::test]
async fn test_change_password_success() {
    let ctx = TestContext::new().await.unwrap();
    let admin = ctx.login_admin().await;

    let response = ctx
        .post(
            "/api/auth/change-password",
            Some(&admin),
            json!({ "currentPassword": ADMIN_PASSWORD, "newPassword": "brand-new" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["message"],
        "Password changed successfully"
    );

    let hash = ctx.password_hash(ADMIN_USERNAME).await.unwrap();
    assert!(verify_password("brand-new", &hash).unwrap());

    let old = ctx
        .post(
            "/api/auth/login",
            None,
            json!({ "username": ADMIN_USERNAME, "password": ADMIN_PASSWORD }),
        )
        .await;
    assert_eq!(old.status(), StatusCode::UNAUTHORIZED);

    let new = ctx
        .post(
            "/api/auth/login",
            None,
            json!({ "username": ADMIN_USERNAME, "password": "brand-new" }),
        )
        .await;
    assert_eq!(new.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unreadable_bodies_get_json_errors() {
    let ctx = TestContext::new().await.unwrap();
    let admin = ctx.login_admin().await;

    let cases = [
        ("/api/auth/login", None, Some("application/json"), "{not json"),
        ("/api/auth/carer-login", None, Some("application/json"), r#"{"name":42}"#),
        ("/api/auth/carer-login", None, None, r#"{"name":"Jane"}"#),
        (
            "/api/roster",
            Some(admin.as_str()),
            Some("application/json"),
            r#"{"name":5,"data":{},"activeDays":{}}"#,
        ),
    ];

    for (uri, cookie, content_type, body) in cases {
        let response = ctx.send_raw(uri, cookie, content_type, body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{} {}", uri, body);
        assert!(response
            .headers()
            .get(header::CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("application/json"));

        let json = body_json(response).await;
        assert!(json["error"].is_string(), "{} {}", uri, body);
    }

    let missing_type = ctx
        .send_raw("/api/auth/carer-login", None, None, r#"{"name":"Jane"}"#)
        .await;
    assert_eq!(
        body_json(missing_type).await["error"],
        "Expected request with Content-Type: application/json"
    );

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM rosters")
        .fetch_one(&ctx.db)
        .await
        .unwrap();
    assert_eq!(rows, 0);
}
