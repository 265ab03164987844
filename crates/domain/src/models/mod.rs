//! Domain models for Slidehub.

pub mod activity;
pub mod cascade;
pub mod invitation;
pub mod presentation;
pub mod role;
pub mod team;
pub mod user;

pub use activity::{ActivityBuilder, ActivityType, NewActivity, TeamActivity};
pub use cascade::{CascadeReport, CascadeStep, PartialFailure};
pub use invitation::{
    CreateInvitationRequest, InvitationOutcome, InvitationResponseAction, NewInvitation,
    PendingInvitation, RespondToInvitationRequest,
};
pub use presentation::{
    CreatePresentationRequest, DeletePresentationQuery, ListPresentationsQuery, ModerationEvent,
    ModerationStatus, NewPresentation, Presentation, PresentationFilter, SetStatusRequest,
    StatusChange,
};
pub use role::{Role, TeamPermission};
pub use team::{
    ChangeMemberRoleRequest, CreateTeamRequest, NewTeam, Team, TeamMember, TeamProfileUpdate,
    TeamWithMembers, TransferOwnershipRequest, UpdateTeamRequest,
};
pub use user::{
    Identity, NewUser, PlatformRole, SetPlatformRoleRequest, SetUserStatusRequest,
    SyncProfileRequest, User, UserStatus,
};
