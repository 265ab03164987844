//! Acting-user extractor.
//!
//! Authentication happens upstream; the gateway forwards the verified identity
//! in `X-User-Id` and, when known, `X-User-Email`.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use domain::models::Identity;

use crate::error::ApiError;

/// Header carrying the identity-provider user id.
pub const USER_ID_HEADER: &str = "X-User-Id";

/// Header carrying the caller's email, if the identity provider shared it.
pub const USER_EMAIL_HEADER: &str = "X-User-Email";

/// The caller on whose behalf a request is executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActingUser {
    pub user_id: String,
    pub email: Option<String>,
}

impl ActingUser {
    pub fn identity(&self) -> Identity {
        Identity {
            user_id: self.user_id.clone(),
            email: self.email.clone(),
        }
    }

    /// Reject a body-supplied actor id that names someone else.
    pub fn ensure_matches(&self, claimed: Option<&str>) -> Result<(), ApiError> {
        match claimed {
            Some(claimed) if claimed != self.user_id => Err(ApiError::Forbidden(
                "actorUserId does not match the authenticated user".into(),
            )),
            _ => Ok(()),
        }
    }
}

fn header_value(parts: &Parts, name: &str) -> Option<String> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

#[async_trait]
impl<S> FromRequestParts<S> for ActingUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = header_value(parts, USER_ID_HEADER)
            .ok_or_else(|| ApiError::Unauthorized("Missing X-User-Id header".to_string()))?;

        Ok(Self {
            user_id,
            email: header_value(parts, USER_EMAIL_HEADER),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(req: Request<()>) -> Result<ActingUser, ApiError> {
        let (mut parts, _) = req.into_parts();
        ActingUser::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_extracts_user_id_and_email() {
        let req = Request::builder()
            .header(USER_ID_HEADER, "auth0|alice")
            .header(USER_EMAIL_HEADER, "Alice@Example.com")
            .body(())
            .unwrap();
        let user = extract(req).await.unwrap();
        assert_eq!(user.user_id, "auth0|alice");
        assert_eq!(user.email.as_deref(), Some("Alice@Example.com"));
    }

    #[tokio::test]
    async fn test_missing_user_id_is_unauthorized() {
        let req = Request::builder().body(()).unwrap();
        assert!(matches!(extract(req).await, Err(ApiError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_blank_user_id_is_unauthorized() {
        let req = Request::builder()
            .header(USER_ID_HEADER, "   ")
            .body(())
            .unwrap();
        assert!(matches!(extract(req).await, Err(ApiError::Unauthorized(_))));
    }

    #[test]
    fn test_ensure_matches() {
        let user = ActingUser {
            user_id: "u1".into(),
            email: None,
        };
        assert!(user.ensure_matches(None).is_ok());
        assert!(user.ensure_matches(Some("u1")).is_ok());
        assert!(matches!(
            user.ensure_matches(Some("u2")),
            Err(ApiError::Forbidden(_))
        ));
    }
}
