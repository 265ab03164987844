use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use domain::services::Services;
use domain::store::Stores;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, rate_limit_middleware, trace_id, RateLimiterState,
};
use crate::routes::{admin, health, invitations, presentations, teams, users};

#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    pub stores: Stores,
    pub config: Arc<Config>,
    pub rate_limiter: Option<Arc<RateLimiterState>>,
}

pub fn create_app(config: Config, stores: Stores) -> Router {
    let config = Arc::new(config);

    let rate_limiter = (config.security.rate_limit_per_minute > 0).then(|| {
        Arc::new(RateLimiterState::new(
            config.security.rate_limit_per_minute,
        ))
    });

    let state = AppState {
        services: Services::new(&stores),
        stores,
        config: config.clone(),
        rate_limiter,
    };

    let cors = if config.security.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Every /api/v1 route acts on behalf of the X-User-Id caller.
    let api_routes = Router::new()
        // Users
        .route("/api/v1/users/me", get(users::get_me).put(users::sync_profile))
        .route("/api/v1/users/:user_id/role", put(users::set_platform_role))
        .route("/api/v1/users/:user_id/status", put(users::set_user_status))
        .route("/api/v1/users/:user_id", delete(users::delete_user))
        // Teams
        .route("/api/v1/teams", post(teams::create_team))
        .route(
            "/api/v1/teams/:team_id",
            get(teams::get_team)
                .put(teams::update_team)
                .delete(teams::delete_team),
        )
        .route(
            "/api/v1/teams/:team_id/cascade/retry",
            post(teams::retry_cascade),
        )
        .route(
            "/api/v1/teams/:team_id/members",
            get(teams::list_members).post(teams::create_invitation),
        )
        .route(
            "/api/v1/teams/:team_id/members/:user_id/role",
            put(teams::change_member_role),
        )
        .route(
            "/api/v1/teams/:team_id/members/:user_id",
            delete(teams::remove_member),
        )
        .route("/api/v1/teams/:team_id/owner", post(teams::transfer_ownership))
        .route(
            "/api/v1/teams/:team_id/invitations",
            get(teams::list_team_invitations),
        )
        .route(
            "/api/v1/teams/:team_id/invitations/:invite_id",
            delete(teams::revoke_invitation),
        )
        .route("/api/v1/teams/:team_id/activity", get(teams::list_activity))
        .route(
            "/api/v1/teams/:team_id/presentations",
            get(teams::list_team_presentations),
        )
        // Invitations (invitee side)
        .route("/api/v1/invitations", get(invitations::list_my_invitations))
        .route(
            "/api/v1/invitations/:invite_id/respond",
            post(invitations::respond_to_invitation),
        )
        // Presentations
        .route("/api/v1/presentations", post(presentations::create_presentation))
        .route(
            "/api/v1/presentations/:id",
            get(presentations::get_presentation).delete(presentations::delete_presentation),
        )
        .route(
            "/api/v1/presentations/:id/status",
            put(presentations::set_status),
        )
        .route(
            "/api/v1/presentations/:id/restore",
            post(presentations::restore_presentation),
        )
        .route(
            "/api/v1/presentations/:id/moderation",
            get(presentations::moderation_history),
        )
        // Admin
        .route("/api/v1/admin/presentations", get(admin::list_presentations))
        .route(
            "/api/v1/admin/presentations/:id",
            get(admin::get_presentation),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ));

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
