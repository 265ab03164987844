//! Authorization gate.
//!
//! Every mutating workflow asks the gate for a capability before its first
//! write. A denial is returned as `AuthorizationDenied` and nothing has been
//! written at that point. Capabilities carry the loaded actor (and team), so
//! callers never re-derive permissions on their own.

use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};
use crate::models::{Team, TeamPermission, User};
use crate::store::{Stores, TeamStore, UserStore};

/// Proof that the actor is an enabled platform admin.
#[derive(Debug, Clone)]
pub struct AdminCapability {
    pub actor: User,
}

/// Proof that the actor holds at least some permission in a team.
#[derive(Debug, Clone)]
pub struct TeamCapability {
    pub actor: User,
    pub team: Team,
    /// Effective permission. Platform admins always hold `Owner`.
    pub permission: TeamPermission,
    pub via_platform_admin: bool,
}

impl TeamCapability {
    pub fn is_owner(&self) -> bool {
        self.permission == TeamPermission::Owner
    }
}

#[derive(Clone)]
pub struct AuthorizationGate {
    users: Arc<dyn UserStore>,
    teams: Arc<dyn TeamStore>,
}

impl AuthorizationGate {
    pub fn new(stores: &Stores) -> Self {
        Self {
            users: stores.users.clone(),
            teams: stores.teams.clone(),
        }
    }

    /// Load the acting user. Unknown and disabled accounts are denied.
    pub async fn load_actor(&self, actor_id: &str) -> DomainResult<User> {
        let user = self.users.find_user(actor_id).await?.ok_or_else(|| {
            warn!(actor_id = %actor_id, "Rejected request from unknown user");
            DomainError::AuthorizationDenied("Unknown user".into())
        })?;

        if user.disabled {
            warn!(actor_id = %actor_id, "Rejected request from disabled user");
            return Err(DomainError::AuthorizationDenied("Account is disabled".into()));
        }

        Ok(user)
    }

    pub async fn is_platform_admin(&self, actor_id: &str) -> DomainResult<bool> {
        Ok(self
            .users
            .find_user(actor_id)
            .await?
            .is_some_and(|u| u.is_active_admin()))
    }

    /// The actor's membership permission in a team, `None` for non-members.
    pub async fn team_permission(
        &self,
        team_id: Uuid,
        actor_id: &str,
    ) -> DomainResult<TeamPermission> {
        Ok(self
            .teams
            .find_member(team_id, actor_id)
            .await?
            .map(|m| m.role.permission())
            .unwrap_or(TeamPermission::None))
    }

    pub async fn require_platform_admin(&self, actor_id: &str) -> DomainResult<AdminCapability> {
        let actor = self.load_actor(actor_id).await?;
        if !actor.is_app_admin {
            warn!(actor_id = %actor_id, "Platform admin required");
            return Err(DomainError::AuthorizationDenied(
                "Platform admin access required".into(),
            ));
        }
        Ok(AdminCapability { actor })
    }

    /// Require at least `minimum` in `team_id`.
    ///
    /// NotFound if the team does not exist. Platform admins pass with
    /// owner-equivalent permission.
    pub async fn require_team_permission(
        &self,
        team_id: Uuid,
        actor_id: &str,
        minimum: TeamPermission,
    ) -> DomainResult<TeamCapability> {
        let actor = self.load_actor(actor_id).await?;
        let team = self
            .teams
            .find_team(team_id)
            .await?
            .ok_or_else(|| DomainError::NotFound("Team not found".into()))?;

        if actor.is_app_admin {
            return Ok(TeamCapability {
                actor,
                team,
                permission: TeamPermission::Owner,
                via_platform_admin: true,
            });
        }

        let permission = self.team_permission(team_id, actor_id).await?;
        if !permission.allows(minimum) {
            warn!(
                actor_id = %actor_id,
                team_id = %team_id,
                held = %permission,
                required = %minimum,
                "Team permission denied"
            );
            return Err(DomainError::AuthorizationDenied(format!(
                "Requires {} permission in this team",
                minimum
            )));
        }

        Ok(TeamCapability {
            actor,
            team,
            permission,
            via_platform_admin: false,
        })
    }

    /// Reject an actor targeting their own account (self-demotion, self-disable).
    pub fn ensure_not_self(actor_id: &str, target_id: &str, what: &str) -> DomainResult<()> {
        if actor_id == target_id {
            warn!(actor_id = %actor_id, action = %what, "Rejected self-targeting action");
            return Err(DomainError::Conflict(format!("You cannot {} yourself", what)));
        }
        Ok(())
    }
}
