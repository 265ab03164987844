//! Entity definitions (database row mappings).

pub mod activity;
pub mod invitation;
pub mod presentation;
pub mod team;
pub mod user;

pub use activity::{ActivityTypeDb, TeamActivityEntity};
pub use invitation::InvitationEntity;
pub use presentation::{ModerationEventEntity, ModerationStatusDb, PresentationEntity};
pub use team::{TeamEntity, TeamMemberEntity};
pub use user::{TeamRoleDb, UserEntity};
