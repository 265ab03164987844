//! Integration tests for profile and platform user management.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{json_request, request, TestContext};
use serde_json::json;

fn sync_request(user_id: &str, email: Option<&str>, display_name: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::PUT)
        .uri("/api/v1/users/me")
        .header("content-type", "application/json")
        .header("X-User-Id", user_id);
    if let Some(email) = email {
        builder = builder.header("X-User-Email", email);
    }
    builder
        .body(Body::from(
            json!({ "display_name": display_name }).to_string(),
        ))
        .unwrap()
}

#[tokio::test]
async fn test_sync_profile_creates_guest() {
    let ctx = TestContext::new();

    let (status, body) = ctx
        .send(sync_request("auth0|new", Some("New.User@Example.com"), "New User"))
        .await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["user"]["id"], "auth0|new");
    assert_eq!(body["user"]["email"], "new.user@example.com");
    assert_eq!(body["user"]["display_name"], "New User");
    assert_eq!(body["user"]["role"], "guest");
    assert_eq!(body["user"]["is_app_admin"], false);
}

#[tokio::test]
async fn test_first_sync_requires_email() {
    let ctx = TestContext::new();

    let (status, _) = ctx.send(sync_request("auth0|new", None, "New User")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_user_cannot_read_profile() {
    let ctx = TestContext::new();

    let (status, _) = ctx
        .send(request(Method::GET, "/api/v1/users/me", "nobody"))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_grant_platform_admin() {
    let ctx = TestContext::new();
    let admin = ctx.admin("platform-admin").await;
    let user = ctx.user("user-1").await;

    let (status, _) = ctx
        .send(json_request(
            Method::PUT,
            &format!("/api/v1/users/{admin}/role"),
            &user,
            json!({ "role": "admin" }),
        ))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = ctx
        .send(json_request(
            Method::PUT,
            &format!("/api/v1/users/{user}/role"),
            &admin,
            json!({ "role": "admin" }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["is_app_admin"], true);
}

#[tokio::test]
async fn test_admin_cannot_demote_self() {
    let ctx = TestContext::new();
    let admin = ctx.admin("platform-admin").await;

    let (status, _) = ctx
        .send(json_request(
            Method::PUT,
            &format!("/api/v1/users/{admin}/role"),
            &admin,
            json!({ "role": "user" }),
        ))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_unknown_platform_role_is_rejected() {
    let ctx = TestContext::new();
    let admin = ctx.admin("platform-admin").await;
    let user = ctx.user("user-1").await;

    let (status, body) = ctx
        .send(json_request(
            Method::PUT,
            &format!("/api/v1/users/{user}/role"),
            &admin,
            json!({ "role": "root" }),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn test_unknown_user_status_is_rejected() {
    let ctx = TestContext::new();
    let admin = ctx.admin("platform-admin").await;
    let user = ctx.user("user-1").await;

    let (status, body) = ctx
        .send(json_request(
            Method::PUT,
            &format!("/api/v1/users/{user}/status"),
            &admin,
            json!({ "status": "paused" }),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn test_disabled_user_is_locked_out() {
    let ctx = TestContext::new();
    let admin = ctx.admin("platform-admin").await;
    let user = ctx.user("user-1").await;

    let (status, body) = ctx
        .send(json_request(
            Method::PUT,
            &format!("/api/v1/users/{user}/status"),
            &admin,
            json!({ "status": "disabled" }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["disabled"], true);

    let (status, _) = ctx
        .send(request(Method::GET, "/api/v1/users/me", &user))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = ctx
        .send(json_request(
            Method::PUT,
            &format!("/api/v1/users/{user}/status"),
            &admin,
            json!({ "status": "enabled" }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = ctx
        .send(request(Method::GET, "/api/v1/users/me", &user))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_team_owner_cannot_be_deleted() {
    let ctx = TestContext::new();
    let admin = ctx.admin("platform-admin").await;
    let owner = ctx.user("owner-1").await;
    let member = ctx.user("member-1").await;
    let team_id = ctx.create_team(&owner, "Design").await;
    ctx.add_member(&team_id, &owner, &member, "viewer").await;

    let (status, _) = ctx
        .send(request(
            Method::DELETE,
            &format!("/api/v1/users/{owner}"),
            &admin,
        ))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = ctx
        .send(request(
            Method::DELETE,
            &format!("/api/v1/users/{member}"),
            &admin,
        ))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, members) = ctx
        .send(request(
            Method::GET,
            &format!("/api/v1/teams/{team_id}/members"),
            &owner,
        ))
        .await;
    assert_eq!(members["count"], 1);
}
