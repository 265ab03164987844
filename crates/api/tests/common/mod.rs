//! Shared helpers for API integration tests.
//!
//! Every test builds the full router over fresh in-memory stores, so tests are
//! independent and need no database.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request},
    Router,
};
use domain::models::NewUser;
use domain::store::{InMemoryPrimaryStore, InMemorySecondaryStore, Stores};
use fake::faker::internet::en::SafeEmail;
use fake::Fake;
use serde_json::Value;
use slidehub_api::app::create_app;
use slidehub_api::config::Config;
use std::sync::Arc;
use tower::ServiceExt;

pub struct TestContext {
    pub app: Router,
    pub stores: Stores,
    pub primary: Arc<InMemoryPrimaryStore>,
    pub secondary: Arc<InMemorySecondaryStore>,
}

impl TestContext {
    pub fn new() -> Self {
        let primary = Arc::new(InMemoryPrimaryStore::new());
        let secondary = Arc::new(InMemorySecondaryStore::new());
        let stores = Stores::from_memory(primary.clone(), secondary.clone());
        let config = Config::load_for_test(&[]).expect("test config");
        Self {
            app: create_app(config, stores.clone()),
            stores,
            primary,
            secondary,
        }
    }

    /// Insert a user directly and return its id.
    pub async fn user(&self, id: &str) -> String {
        let domain_email: String = SafeEmail().fake();
        let email = format!("{id}.{domain_email}");
        self.user_with_email(id, &email).await;
        id.to_string()
    }

    pub async fn user_with_email(&self, id: &str, email: &str) {
        self.stores
            .users
            .upsert_user(NewUser {
                id: id.to_string(),
                email: email.to_lowercase(),
                display_name: None,
            })
            .await
            .expect("seed user");
    }

    pub async fn admin(&self, id: &str) -> String {
        self.user(id).await;
        self.stores
            .users
            .set_app_admin(id, true)
            .await
            .expect("seed admin");
        id.to_string()
    }

    pub async fn email_of(&self, id: &str) -> String {
        self.stores
            .users
            .find_user(id)
            .await
            .expect("lookup")
            .expect("user exists")
            .email
    }

    pub async fn send(&self, request: Request<Body>) -> (axum::http::StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.expect("response");
        let status = response.status();
        (status, parse_response_body(response).await)
    }

    /// Create a team through the API, returning its id.
    pub async fn create_team(&self, owner: &str, name: &str) -> String {
        let (status, body) = self
            .send(json_request(
                Method::POST,
                "/api/v1/teams",
                owner,
                serde_json::json!({ "name": name }),
            ))
            .await;
        assert_eq!(status, axum::http::StatusCode::CREATED, "{body}");
        body["team"]["id"].as_str().expect("team id").to_string()
    }

    /// Invite `user_id` and have them accept, through the API.
    pub async fn add_member(&self, team_id: &str, inviter: &str, user_id: &str, role: &str) {
        let email = self.email_of(user_id).await;
        let (status, body) = self
            .send(json_request(
                Method::POST,
                &format!("/api/v1/teams/{team_id}/members"),
                inviter,
                serde_json::json!({ "email": email, "role": role }),
            ))
            .await;
        assert_eq!(status, axum::http::StatusCode::CREATED, "{body}");
        let invite_id = body["invitation"]["id"].as_str().expect("invite id");

        let (status, body) = self
            .send(json_request(
                Method::POST,
                &format!("/api/v1/invitations/{invite_id}/respond"),
                user_id,
                serde_json::json!({ "action": "accept" }),
            ))
            .await;
        assert_eq!(status, axum::http::StatusCode::OK, "{body}");
    }

    /// Create a presentation through the API, returning its id.
    pub async fn create_presentation(&self, owner: &str, team_id: Option<&str>) -> String {
        let (status, body) = self
            .send(json_request(
                Method::POST,
                "/api/v1/presentations",
                owner,
                serde_json::json!({ "title": "Quarterly review", "team_id": team_id }),
            ))
            .await;
        assert_eq!(status, axum::http::StatusCode::CREATED, "{body}");
        body["presentation"]["id"]
            .as_str()
            .expect("presentation id")
            .to_string()
    }
}

/// Build a JSON request on behalf of `user_id`.
pub fn json_request(method: Method, uri: &str, user_id: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header("X-User-Id", user_id)
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

/// Build a body-less request on behalf of `user_id`.
pub fn request(method: Method, uri: &str, user_id: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("X-User-Id", user_id)
        .body(Body::empty())
        .unwrap()
}

pub async fn parse_response_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap_or(Value::Null)
}
