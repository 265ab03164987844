//! User administration and profile sync.

use std::sync::Arc;

use shared::validation::{normalize_email, validate_display_name, validate_email_address};
use tracing::info;

use crate::error::{DomainError, DomainResult, StoreError};
use crate::models::{ActivityBuilder, ActivityType, Identity, NewUser, User};
use crate::services::activity::ActivityLogger;
use crate::services::authorization::AuthorizationGate;
use crate::store::{Stores, TeamStore, UserStore};

fn user_not_found(err: StoreError) -> DomainError {
    match err {
        StoreError::NotFound => DomainError::NotFound("User not found".into()),
        other => other.into(),
    }
}

#[derive(Clone)]
pub struct UserAdminService {
    gate: AuthorizationGate,
    activity: ActivityLogger,
    users: Arc<dyn UserStore>,
    teams: Arc<dyn TeamStore>,
}

impl UserAdminService {
    pub fn new(stores: &Stores, gate: AuthorizationGate, activity: ActivityLogger) -> Self {
        Self {
            gate,
            activity,
            users: stores.users.clone(),
            teams: stores.teams.clone(),
        }
    }

    /// Create or refresh the caller's record from identity-provider data.
    ///
    /// An email is required the first time a user is seen.
    pub async fn sync_profile(
        &self,
        identity: &Identity,
        display_name: Option<String>,
    ) -> DomainResult<User> {
        if let Some(name) = &display_name {
            validate_display_name(name)?;
        }

        let existing = self.users.find_user(&identity.user_id).await?;
        if existing.as_ref().is_some_and(|u| u.disabled) {
            return Err(DomainError::AuthorizationDenied("Account is disabled".into()));
        }

        let email = match (&identity.email, &existing) {
            (Some(email), _) => normalize_email(email),
            (None, Some(user)) => user.email.clone(),
            (None, None) => {
                return Err(DomainError::Validation(
                    "Email is required on first sign-in".into(),
                ))
            }
        };
        validate_email_address(&email)?;

        let user = self
            .users
            .upsert_user(NewUser {
                id: identity.user_id.clone(),
                email,
                display_name: display_name.map(|n| n.trim().to_string()),
            })
            .await?;

        info!(user_id = %user.id, created = existing.is_none(), "User profile synced");

        Ok(user)
    }

    pub async fn get_me(&self, actor_id: &str) -> DomainResult<User> {
        self.gate.load_actor(actor_id).await
    }

    /// Grant or revoke platform admin. Admins cannot demote themselves.
    pub async fn set_platform_role(
        &self,
        actor_id: &str,
        target_id: &str,
        is_app_admin: bool,
    ) -> DomainResult<User> {
        let cap = self.gate.require_platform_admin(actor_id).await?;
        if !is_app_admin {
            AuthorizationGate::ensure_not_self(actor_id, target_id, "remove platform admin from")?;
        }

        let user = self
            .users
            .set_app_admin(target_id, is_app_admin)
            .await
            .map_err(user_not_found)?;

        info!(
            user_id = %target_id,
            is_app_admin = is_app_admin,
            changed_by = %cap.actor.id,
            "Platform role changed"
        );

        Ok(user)
    }

    /// Enable or disable an account. Admins cannot disable themselves.
    pub async fn set_disabled(
        &self,
        actor_id: &str,
        target_id: &str,
        disabled: bool,
    ) -> DomainResult<User> {
        let cap = self.gate.require_platform_admin(actor_id).await?;
        if disabled {
            AuthorizationGate::ensure_not_self(actor_id, target_id, "disable")?;
        }

        let user = self
            .users
            .set_disabled(target_id, disabled)
            .await
            .map_err(user_not_found)?;

        info!(
            user_id = %target_id,
            disabled = disabled,
            changed_by = %cap.actor.id,
            "User status changed"
        );

        Ok(user)
    }

    /// Delete a user. Blocked while the user owns a team.
    pub async fn delete_user(&self, actor_id: &str, target_id: &str) -> DomainResult<()> {
        let cap = self.gate.require_platform_admin(actor_id).await?;
        AuthorizationGate::ensure_not_self(actor_id, target_id, "delete")?;

        let target = self
            .users
            .find_user(target_id)
            .await?
            .ok_or_else(|| DomainError::NotFound("User not found".into()))?;
        if self.teams.count_owned_teams(target_id).await? > 0 {
            return Err(DomainError::Conflict(
                "User owns a team; transfer ownership or delete the team first".into(),
            ));
        }

        if let Some(team_id) = target.team_id {
            if self.teams.remove_member(team_id, target_id).await? {
                self.activity
                    .record(
                        ActivityBuilder::new(
                            team_id,
                            &cap.actor.id,
                            cap.actor.actor_name(),
                            ActivityType::MemberRemoved,
                        )
                        .on_target("user", target_id)
                        .with_target_name(target.actor_name())
                        .with_detail("role", target.role.as_str())
                        .with_detail("account_deleted", true)
                        .build(),
                    )
                    .await;
            }
        }

        self.users.delete_user(target_id).await?;

        info!(user_id = %target_id, deleted_by = %cap.actor.id, "User deleted");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use crate::services::testing::Fixture;
    use fake::faker::internet::en::SafeEmail;
    use fake::Fake;

    fn identity(id: &str, email: Option<&str>) -> Identity {
        Identity {
            user_id: id.into(),
            email: email.map(String::from),
        }
    }

    #[tokio::test]
    async fn test_sync_profile_creates_guest() {
        let fx = Fixture::new().await;
        let email: String = SafeEmail().fake();
        let user = fx
            .services
            .users
            .sync_profile(&identity("u1", Some(&email.to_uppercase())), Some("Ada".into()))
            .await
            .unwrap();
        assert_eq!(user.email, email.to_lowercase());
        assert_eq!(user.role, Role::Guest);
        assert_eq!(user.display_name.as_deref(), Some("Ada"));

        let resynced = fx
            .services
            .users
            .sync_profile(&identity("u1", None), None)
            .await
            .unwrap();
        assert_eq!(resynced.email, email.to_lowercase());
        assert_eq!(resynced.display_name.as_deref(), Some("Ada"));
    }

    #[tokio::test]
    async fn test_sync_profile_requires_email_first_time() {
        let fx = Fixture::new().await;
        let result = fx
            .services
            .users
            .sync_profile(&identity("u1", None), None)
            .await;
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn test_admin_cannot_demote_or_disable_self() {
        let fx = Fixture::new().await;
        fx.admin("a").await;
        assert!(matches!(
            fx.services.users.set_platform_role("a", "a", false).await,
            Err(DomainError::Conflict(_))
        ));
        assert!(matches!(
            fx.services.users.set_disabled("a", "a", true).await,
            Err(DomainError::Conflict(_))
        ));
        let me = fx.services.users.get_me("a").await.unwrap();
        assert!(me.is_app_admin);
        assert!(!me.disabled);
    }

    #[tokio::test]
    async fn test_set_platform_role_and_status() {
        let fx = Fixture::new().await;
        fx.admin("a").await;
        fx.user("u1").await;

        let promoted = fx
            .services
            .users
            .set_platform_role("a", "u1", true)
            .await
            .unwrap();
        assert!(promoted.is_app_admin);

        let disabled = fx.services.users.set_disabled("a", "u1", true).await.unwrap();
        assert!(disabled.disabled);
        assert!(matches!(
            fx.services.users.get_me("u1").await,
            Err(DomainError::AuthorizationDenied(_))
        ));

        assert!(matches!(
            fx.services.users.set_disabled("a", "ghost", true).await,
            Err(DomainError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_non_admin_cannot_change_roles() {
        let fx = Fixture::new().await;
        fx.user("u1").await;
        fx.user("u2").await;
        assert!(matches!(
            fx.services.users.set_platform_role("u1", "u2", true).await,
            Err(DomainError::AuthorizationDenied(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_user_blocked_for_team_owner() {
        let fx = Fixture::new().await;
        fx.admin("a").await;
        fx.team("u1").await;
        assert!(matches!(
            fx.services.users.delete_user("a", "u1").await,
            Err(DomainError::Conflict(_))
        ));
        assert!(fx.stores.users.find_user("u1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_member_user_removes_membership() {
        let fx = Fixture::new().await;
        fx.admin("a").await;
        let team = fx.team("u1").await;
        fx.member(team.id, "u1", "u2", Role::Editor).await;

        fx.services.users.delete_user("a", "u2").await.unwrap();

        assert!(fx.stores.users.find_user("u2").await.unwrap().is_none());
        assert!(fx
            .stores
            .teams
            .find_member(team.id, "u2")
            .await
            .unwrap()
            .is_none());
        assert_eq!(
            fx.activities(team.id).await[0].action_type,
            ActivityType::MemberRemoved
        );
    }

    #[tokio::test]
    async fn test_delete_self_conflicts() {
        let fx = Fixture::new().await;
        fx.admin("a").await;
        assert!(matches!(
            fx.services.users.delete_user("a", "a").await,
            Err(DomainError::Conflict(_))
        ));
    }
}
