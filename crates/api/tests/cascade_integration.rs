//! Integration tests for team deletion across both stores.

mod common;

use axum::http::{Method, StatusCode};
use common::{request, TestContext};

#[tokio::test]
async fn test_delete_team_clears_presentation_references() {
    let ctx = TestContext::new();
    let owner = ctx.user("owner-1").await;
    let member = ctx.user("member-1").await;
    let admin = ctx.admin("platform-admin").await;
    let team_id = ctx.create_team(&owner, "Design").await;
    ctx.add_member(&team_id, &owner, &member, "editor").await;
    let presentation_id = ctx.create_presentation(&member, Some(&team_id)).await;

    let (status, body) = ctx
        .send(request(
            Method::DELETE,
            &format!("/api/v1/teams/{team_id}"),
            &admin,
        ))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["cascade"]["team_name"], "Design");
    assert_eq!(body["cascade"]["presentations_cleared"], 1);
    assert_eq!(
        body["cascade"]["completed_steps"],
        serde_json::json!(["delete_primary_record", "clear_presentation_team_refs"])
    );

    let (status, _) = ctx
        .send(request(
            Method::GET,
            &format!("/api/v1/teams/{team_id}"),
            &admin,
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    for user in [&owner, &member] {
        let (_, me) = ctx.send(request(Method::GET, "/api/v1/users/me", user)).await;
        assert_eq!(me["user"]["role"], "guest");
        assert!(me["user"]["team_id"].is_null());
    }

    let (_, body) = ctx
        .send(request(
            Method::GET,
            &format!("/api/v1/presentations/{presentation_id}"),
            &member,
        ))
        .await;
    assert!(body["presentation"]["team_id"].is_null());
}

#[tokio::test]
async fn test_only_platform_admin_deletes_teams() {
    let ctx = TestContext::new();
    let owner = ctx.user("owner-1").await;
    let team_id = ctx.create_team(&owner, "Design").await;

    let (status, _) = ctx
        .send(request(
            Method::DELETE,
            &format!("/api/v1/teams/{team_id}"),
            &owner,
        ))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_secondary_failure_reports_partial_failure_then_retry_succeeds() {
    let ctx = TestContext::new();
    let owner = ctx.user("owner-1").await;
    let admin = ctx.admin("platform-admin").await;
    let team_id = ctx.create_team(&owner, "Design").await;
    let presentation_id = ctx.create_presentation(&owner, Some(&team_id)).await;

    ctx.secondary.set_fail_bulk_updates(true);
    let (status, body) = ctx
        .send(request(
            Method::DELETE,
            &format!("/api/v1/teams/{team_id}"),
            &admin,
        ))
        .await;
    assert_eq!(status, StatusCode::MULTI_STATUS, "{body}");
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "partial_failure");
    assert_eq!(body["completed_steps"], serde_json::json!(["delete_primary_record"]));
    assert_eq!(
        body["pending_steps"],
        serde_json::json!(["clear_presentation_team_refs"])
    );
    let retry_path = body["retry_path"].as_str().unwrap().to_string();
    assert_eq!(retry_path, format!("/api/v1/teams/{team_id}/cascade/retry"));

    // The primary deletion is not rolled back.
    let (status, _) = ctx
        .send(request(
            Method::GET,
            &format!("/api/v1/teams/{team_id}"),
            &admin,
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    ctx.secondary.set_fail_bulk_updates(false);
    let (status, body) = ctx.send(request(Method::POST, &retry_path, &admin)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["cascade"]["presentations_cleared"], 1);

    let (_, body) = ctx
        .send(request(
            Method::GET,
            &format!("/api/v1/presentations/{presentation_id}"),
            &owner,
        ))
        .await;
    assert!(body["presentation"]["team_id"].is_null());

    // Retrying again is harmless.
    let (status, body) = ctx.send(request(Method::POST, &retry_path, &admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cascade"]["presentations_cleared"], 0);
}

#[tokio::test]
async fn test_retry_for_live_team_is_conflict() {
    let ctx = TestContext::new();
    let owner = ctx.user("owner-1").await;
    let admin = ctx.admin("platform-admin").await;
    let team_id = ctx.create_team(&owner, "Design").await;

    let (status, _) = ctx
        .send(request(
            Method::POST,
            &format!("/api/v1/teams/{team_id}/cascade/retry"),
            &admin,
        ))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}
