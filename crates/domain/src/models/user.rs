//! User domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::role::Role;

/// Identity of the caller, as supplied by the external identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Stable identity-provider user id.
    pub user_id: String,
    pub email: Option<String>,
}

/// User domain model.
///
/// `team_id` and `role` mirror the user's membership row and are only ever
/// written together with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub team_id: Option<Uuid>,
    pub role: Role,
    pub is_app_admin: bool,
    pub disabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Name recorded on activity entries.
    pub fn actor_name(&self) -> String {
        self.display_name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| self.email.clone())
    }

    /// Platform admin rights only count while the account is enabled.
    pub fn is_active_admin(&self) -> bool {
        self.is_app_admin && !self.disabled
    }
}

/// Input for inserting or refreshing a user from identity-provider data.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
}

/// Platform-wide role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformRole {
    Admin,
    User,
}

/// Account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Enabled,
    Disabled,
}

/// Request to create or refresh the caller's profile.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct SyncProfileRequest {
    #[validate(custom(function = "shared::validation::validate_display_name"))]
    pub display_name: Option<String>,
}

/// Request to change a user's platform role.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SetPlatformRoleRequest {
    pub role: PlatformRole,
}

/// Request to enable or disable a user.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SetUserStatusRequest {
    pub status: UserStatus,
}
