use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::models::{CascadeStep, PartialFailure};
use domain::DomainError;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    /// Team deletion committed in the primary store but cleanup is pending.
    #[error("Partial failure: {}", .0.message)]
    PartialFailure(PartialFailure),

    #[error("Rate limited")]
    RateLimited,

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Vec<ValidationDetail>>,
}

#[derive(Debug, Serialize)]
pub struct ValidationDetail {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
struct PartialFailureBody {
    success: bool,
    error: &'static str,
    message: String,
    team_id: Uuid,
    completed_steps: Vec<CascadeStep>,
    pending_steps: Vec<CascadeStep>,
    retry_path: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::PartialFailure(failure) => {
                let body = PartialFailureBody {
                    success: false,
                    error: "partial_failure",
                    retry_path: failure.retry_path(),
                    message: failure.message,
                    team_id: failure.team_id,
                    completed_steps: failure.completed,
                    pending_steps: failure.pending,
                };
                return (StatusCode::MULTI_STATUS, Json(body)).into_response();
            }
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg),
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, "validation_error", msg),
            ApiError::PreconditionFailed(msg) => {
                (StatusCode::BAD_REQUEST, "precondition_failed", msg)
            }
            ApiError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "rate_limited",
                "Too many requests. Please try again later.".into(),
            ),
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".into(),
                )
            }
        };

        let body = ErrorBody {
            success: false,
            error: error_code.into(),
            message,
            details: None,
        };

        (status, Json(body)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::AuthenticationRequired => {
                ApiError::Unauthorized("Authentication required".into())
            }
            DomainError::AuthorizationDenied(msg) => ApiError::Forbidden(msg),
            DomainError::NotFound(msg) => ApiError::NotFound(msg),
            DomainError::Validation(msg) => ApiError::Validation(msg),
            DomainError::Conflict(msg) => ApiError::Conflict(msg),
            DomainError::PreconditionFailed(msg) => ApiError::PreconditionFailed(msg),
            DomainError::PartialFailure(failure) => ApiError::PartialFailure(failure),
            DomainError::Store(err) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let details: Vec<ValidationDetail> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| ValidationDetail {
                    field: field.to_string(),
                    message: e.message.clone().map(|m| m.to_string()).unwrap_or_default(),
                })
            })
            .collect();

        let message = if details.len() == 1 {
            details[0].message.clone()
        } else {
            format!("{} validation errors", details.len())
        };

        ApiError::Validation(message)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::{FromRequest, FromRequestParts, Query};
    use axum::http::{header, Request};
    use domain::StoreError;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    enum Decision {
        #[serde(rename = "accept")]
        Accept,
    }

    #[derive(Debug, Deserialize)]
    struct DecisionBody {
        #[allow(dead_code)]
        action: Decision,
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (ApiError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (ApiError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (ApiError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ApiError::Conflict("x".into()), StatusCode::CONFLICT),
            (ApiError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (ApiError::PreconditionFailed("x".into()), StatusCode::BAD_REQUEST),
            (ApiError::RateLimited, StatusCode::TOO_MANY_REQUESTS),
            (ApiError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[tokio::test]
    async fn test_error_body_envelope() {
        let response = ApiError::Conflict("Invitation already pending".into()).into_response();
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "conflict");
        assert_eq!(body["message"], "Invitation already pending");
    }

    #[tokio::test]
    async fn test_internal_error_hides_message() {
        let response = ApiError::Internal("connection refused".into()).into_response();
        let body = body_json(response).await;
        assert_eq!(body["message"], "An internal error occurred");
    }

    #[tokio::test]
    async fn test_partial_failure_response() {
        let team_id = Uuid::new_v4();
        let error = ApiError::from(DomainError::PartialFailure(PartialFailure {
            message: "Team deleted but presentation cleanup failed".into(),
            team_id,
            completed: vec![CascadeStep::DeletePrimaryRecord],
            pending: vec![CascadeStep::ClearPresentationTeamRefs],
        }));
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::MULTI_STATUS);

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "partial_failure");
        assert_eq!(body["completed_steps"][0], "delete_primary_record");
        assert_eq!(body["pending_steps"][0], "clear_presentation_team_refs");
        assert_eq!(
            body["retry_path"],
            format!("/api/v1/teams/{team_id}/cascade/retry")
        );
    }

    #[test]
    fn test_from_domain_error() {
        assert!(matches!(
            ApiError::from(DomainError::AuthenticationRequired),
            ApiError::Unauthorized(_)
        ));
        assert!(matches!(
            ApiError::from(DomainError::PreconditionFailed("not deleted".into())),
            ApiError::PreconditionFailed(_)
        ));
        assert!(matches!(
            ApiError::from(DomainError::Store(StoreError::Unavailable("down".into()))),
            ApiError::Internal(_)
        ));
    }

    #[tokio::test]
    async fn test_unknown_enum_value_in_json_is_validation_error() {
        let request = Request::builder()
            .method("POST")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"action":"maybe"}"#))
            .unwrap();
        let rejection = Json::<DecisionBody>::from_request(request, &())
            .await
            .unwrap_err();

        let response = ApiError::from(rejection).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "validation_error");
    }

    #[tokio::test]
    async fn test_malformed_json_is_validation_error() {
        let request = Request::builder()
            .method("POST")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let rejection = Json::<DecisionBody>::from_request(request, &())
            .await
            .unwrap_err();

        assert!(matches!(ApiError::from(rejection), ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn test_bad_query_is_validation_error() {
        #[derive(Debug, Deserialize)]
        struct Flag {
            #[allow(dead_code)]
            permanent: bool,
        }

        let request = Request::builder()
            .uri("/presentations/1?permanent=maybe")
            .body(Body::empty())
            .unwrap();
        let (mut parts, _) = request.into_parts();
        let rejection = Query::<Flag>::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();

        assert!(matches!(ApiError::from(rejection), ApiError::Validation(_)));
    }

    #[test]
    fn test_display() {
        assert_eq!(
            ApiError::Forbidden("test".to_string()).to_string(),
            "Forbidden: test"
        );
        assert_eq!(ApiError::RateLimited.to_string(), "Rate limited");
    }
}
