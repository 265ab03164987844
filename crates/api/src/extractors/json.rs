//! Body and query extractors that reject with the API error envelope.
//!
//! Deserialization failures (malformed JSON, unknown enum values, bad query
//! parameters) surface as `400 validation_error` instead of axum's plain-text
//! rejections.

use axum::extract::FromRequest;
use axum::extract::FromRequestParts;

use crate::error::ApiError;

/// JSON request body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);

/// Query string parameters.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct AppQuery<T>(pub T);
