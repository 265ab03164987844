//! Domain services for Slidehub.
//!
//! Services hold the workflow rules. Each one consults the authorization gate
//! before its first write and reports through the activity logger afterwards.

pub mod activity;
pub mod authorization;
pub mod cascade;
pub mod invitations;
pub mod moderation;
pub mod teams;
pub mod users;

#[cfg(test)]
pub(crate) mod testing;

pub use activity::ActivityLogger;
pub use authorization::{AdminCapability, AuthorizationGate, TeamCapability};
pub use cascade::CascadeCoordinator;
pub use invitations::InvitationService;
pub use moderation::ModerationService;
pub use teams::TeamService;
pub use users::UserAdminService;

use crate::store::Stores;

/// Every workflow service, wired to one set of stores.
#[derive(Clone)]
pub struct Services {
    pub gate: AuthorizationGate,
    pub activity: ActivityLogger,
    pub invitations: InvitationService,
    pub teams: TeamService,
    pub moderation: ModerationService,
    pub cascade: CascadeCoordinator,
    pub users: UserAdminService,
}

impl Services {
    pub fn new(stores: &Stores) -> Self {
        let gate = AuthorizationGate::new(stores);
        let activity = ActivityLogger::new(stores);
        Self {
            invitations: InvitationService::new(stores, gate.clone(), activity.clone()),
            teams: TeamService::new(stores, gate.clone(), activity.clone()),
            moderation: ModerationService::new(stores, gate.clone(), activity.clone()),
            cascade: CascadeCoordinator::new(stores, gate.clone()),
            users: UserAdminService::new(stores, gate.clone(), activity.clone()),
            gate,
            activity,
        }
    }
}
