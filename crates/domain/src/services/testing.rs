//! Shared fixtures for service tests.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use shared::pagination::PageRequest;
use uuid::Uuid;

use crate::models::{
    NewInvitation, NewPresentation, NewTeam, NewUser, PendingInvitation, Presentation, Role, Team,
    TeamActivity, TeamMember, User,
};
use crate::services::Services;
use crate::store::{
    ActivityStore, InMemoryPrimaryStore, InMemorySecondaryStore, InvitationStore,
    PresentationStore, Stores, TeamStore, UserStore,
};

pub(crate) struct Fixture {
    pub primary: Arc<InMemoryPrimaryStore>,
    pub secondary: Arc<InMemorySecondaryStore>,
    pub stores: Stores,
    pub services: Services,
}

impl Fixture {
    pub async fn new() -> Self {
        let primary = Arc::new(InMemoryPrimaryStore::new());
        let secondary = Arc::new(InMemorySecondaryStore::new());
        let stores = Stores::from_memory(primary.clone(), secondary.clone());
        let services = Services::new(&stores);
        Self {
            primary,
            secondary,
            stores,
            services,
        }
    }

    /// Create (or refresh) a user with email `<id>@x.com`.
    pub async fn user(&self, id: &str) -> User {
        self.stores
            .users
            .upsert_user(NewUser {
                id: id.into(),
                email: format!("{id}@x.com"),
                display_name: None,
            })
            .await
            .unwrap()
    }

    pub async fn admin(&self, id: &str) -> User {
        self.user(id).await;
        self.stores.users.set_app_admin(id, true).await.unwrap()
    }

    /// Create a team owned by `owner`, creating the owner if needed.
    pub async fn team(&self, owner: &str) -> Team {
        self.user(owner).await;
        self.stores
            .teams
            .create_team(NewTeam {
                name: format!("{owner}'s team"),
                owner_id: owner.into(),
                settings: json!({}),
            })
            .await
            .unwrap()
            .team
    }

    /// Invite through the workflow, as `actor`.
    pub async fn invite(
        &self,
        team_id: Uuid,
        actor: &str,
        email: &str,
        role: Role,
    ) -> PendingInvitation {
        self.services
            .invitations
            .create_invitation(team_id, actor, email, role)
            .await
            .unwrap()
    }

    /// Add `user_id` to the team at `role` directly through the store.
    pub async fn member(&self, team_id: Uuid, invited_by: &str, user_id: &str, role: Role) -> TeamMember {
        let user = self.user(user_id).await;
        let invitation = self
            .stores
            .invitations
            .create_invitation(NewInvitation {
                team_id,
                email: user.email,
                role,
                invited_by: invited_by.into(),
            })
            .await
            .unwrap();
        self.stores
            .invitations
            .accept_invitation(invitation.id, user_id, Utc::now())
            .await
            .unwrap()
    }

    pub async fn presentation(&self, owner: &str, team_id: Option<Uuid>) -> Presentation {
        self.stores
            .presentations
            .create_presentation(NewPresentation {
                title: "Roadmap".into(),
                team_id,
                owner_id: owner.into(),
            })
            .await
            .unwrap()
    }

    pub async fn activities(&self, team_id: Uuid) -> Vec<TeamActivity> {
        self.stores
            .activities
            .list_for_team(team_id, &PageRequest::new(1, 100))
            .await
            .unwrap()
            .0
    }
}
