//! User profile and platform administration routes.

use axum::{
    extract::{Path, State},
    Json,
};
use domain::models::{
    PlatformRole, SetPlatformRoleRequest, SetUserStatusRequest, SyncProfileRequest, User,
    UserStatus,
};
use serde::Serialize;
use tracing::info;
use validator::Validate;

use super::{respond, ApiResponse, Empty};
use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{ActingUser, AppJson};

#[derive(Debug, Serialize)]
pub struct UserPayload {
    pub user: User,
}

/// Get the caller's profile.
///
/// GET /api/v1/users/me
pub async fn get_me(
    State(state): State<AppState>,
    actor: ActingUser,
) -> Result<Json<ApiResponse<UserPayload>>, ApiError> {
    let user = state.services.users.get_me(&actor.user_id).await?;
    Ok(respond("Profile loaded", UserPayload { user }))
}

/// Create or refresh the caller's profile from identity data.
///
/// PUT /api/v1/users/me
pub async fn sync_profile(
    State(state): State<AppState>,
    actor: ActingUser,
    AppJson(request): AppJson<SyncProfileRequest>,
) -> Result<Json<ApiResponse<UserPayload>>, ApiError> {
    request.validate()?;

    let user = state
        .services
        .users
        .sync_profile(&actor.identity(), request.display_name)
        .await?;

    Ok(respond("Profile synchronized", UserPayload { user }))
}

/// Grant or revoke platform admin.
///
/// PUT /api/v1/users/:user_id/role
pub async fn set_platform_role(
    State(state): State<AppState>,
    actor: ActingUser,
    Path(user_id): Path<String>,
    AppJson(request): AppJson<SetPlatformRoleRequest>,
) -> Result<Json<ApiResponse<UserPayload>>, ApiError> {
    let is_app_admin = request.role == PlatformRole::Admin;
    let user = state
        .services
        .users
        .set_platform_role(&actor.user_id, &user_id, is_app_admin)
        .await?;

    info!(
        actor_id = %actor.user_id,
        target_id = %user_id,
        is_app_admin,
        "Platform role updated"
    );

    Ok(respond("Platform role updated", UserPayload { user }))
}

/// Enable or disable an account.
///
/// PUT /api/v1/users/:user_id/status
pub async fn set_user_status(
    State(state): State<AppState>,
    actor: ActingUser,
    Path(user_id): Path<String>,
    AppJson(request): AppJson<SetUserStatusRequest>,
) -> Result<Json<ApiResponse<UserPayload>>, ApiError> {
    let disabled = request.status == UserStatus::Disabled;
    let user = state
        .services
        .users
        .set_disabled(&actor.user_id, &user_id, disabled)
        .await?;

    let message = if disabled {
        "User disabled"
    } else {
        "User enabled"
    };
    Ok(respond(message, UserPayload { user }))
}

/// Delete a user account.
///
/// DELETE /api/v1/users/:user_id
pub async fn delete_user(
    State(state): State<AppState>,
    actor: ActingUser,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    state
        .services
        .users
        .delete_user(&actor.user_id, &user_id)
        .await?;
    Ok(respond("User deleted", Empty {}))
}
