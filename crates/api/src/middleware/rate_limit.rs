//! Rate limiting middleware.
//!
//! Provides per-user rate limiting keyed by the acting user id.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use governor::{
    clock::{Clock, DefaultClock},
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter as GovRateLimiter,
};
use serde_json::json;
use std::{
    collections::HashMap,
    num::NonZeroU32,
    sync::{Arc, RwLock},
};

use crate::app::AppState;
use crate::extractors::USER_ID_HEADER;

type UserRateLimiter = GovRateLimiter<NotKeyed, InMemoryState, DefaultClock>;

const FALLBACK_LIMIT: NonZeroU32 = match NonZeroU32::new(100) {
    Some(limit) => limit,
    None => unreachable!(),
};

/// Rate limiter state shared across all requests, one limiter per user id.
pub struct RateLimiterState {
    limiters: RwLock<HashMap<String, Arc<UserRateLimiter>>>,
    rate_limit_per_minute: u32,
}

impl RateLimiterState {
    /// Create a new rate limiter state with the specified limit per minute.
    pub fn new(rate_limit_per_minute: u32) -> Self {
        Self {
            limiters: RwLock::new(HashMap::new()),
            rate_limit_per_minute,
        }
    }

    fn get_or_create_limiter(&self, user_id: &str) -> Arc<UserRateLimiter> {
        {
            let limiters = self.limiters.read().unwrap_or_else(|e| e.into_inner());
            if let Some(limiter) = limiters.get(user_id) {
                return limiter.clone();
            }
        }

        let mut limiters = self.limiters.write().unwrap_or_else(|e| e.into_inner());
        limiters
            .entry(user_id.to_string())
            .or_insert_with(|| {
                let per_minute =
                    NonZeroU32::new(self.rate_limit_per_minute).unwrap_or(FALLBACK_LIMIT);
                Arc::new(GovRateLimiter::direct(Quota::per_minute(per_minute)))
            })
            .clone()
    }

    /// Returns Err with the retry-after seconds when the user is over quota.
    pub fn check(&self, user_id: &str) -> Result<(), u64> {
        let limiter = self.get_or_create_limiter(user_id);
        limiter.check().map_err(|not_until| {
            let wait_time = not_until.wait_time_from(DefaultClock::default().now());
            wait_time.as_secs().max(1)
        })
    }
}

impl std::fmt::Debug for RateLimiterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let active = self
            .limiters
            .read()
            .map(|l| l.len())
            .unwrap_or_default();
        f.debug_struct("RateLimiterState")
            .field("rate_limit_per_minute", &self.rate_limit_per_minute)
            .field("active_limiters", &active)
            .finish()
    }
}

/// Middleware that applies rate limiting per acting user.
///
/// Requests without `X-User-Id` pass through; the handler rejects them.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let Some(rate_limiter) = state.rate_limiter.as_ref() else {
        return next.run(req).await;
    };
    let Some(user_id) = req
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
    else {
        return next.run(req).await;
    };

    if let Err(retry_after) = rate_limiter.check(&user_id) {
        tracing::warn!(user_id = %user_id, retry_after, "Rate limit exceeded");
        return rate_limited_response(state.config.security.rate_limit_per_minute, retry_after);
    }

    next.run(req).await
}

fn rate_limited_response(limit: u32, retry_after: u64) -> Response {
    let body = json!({
        "success": false,
        "error": "rate_limited",
        "message": format!("Rate limit of {} requests/minute exceeded", limit),
        "retry_after": retry_after
    });

    let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
    response
}
