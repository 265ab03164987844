//! Repository implementations of the domain store ports.

pub mod activity;
pub mod invitation;
pub mod presentation;
pub mod team;
pub mod user;

use std::sync::Arc;

use domain::store::Stores;
use sqlx::PgPool;

pub use activity::ActivityRepository;
pub use invitation::InvitationRepository;
pub use presentation::PresentationRepository;
pub use team::TeamRepository;
pub use user::UserRepository;

/// Wire every store port to PostgreSQL.
///
/// Users, teams, invitations and activity live in the primary database;
/// presentations live in the secondary one.
pub fn postgres_stores(primary: &PgPool, secondary: &PgPool) -> Stores {
    Stores {
        users: Arc::new(UserRepository::new(primary.clone())),
        teams: Arc::new(TeamRepository::new(primary.clone())),
        invitations: Arc::new(InvitationRepository::new(primary.clone())),
        activities: Arc::new(ActivityRepository::new(primary.clone())),
        presentations: Arc::new(PresentationRepository::new(secondary.clone())),
    }
}
