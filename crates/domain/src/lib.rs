//! Domain layer for the Slidehub backend.
//!
//! This crate contains:
//! - Domain models (Team, User, PendingInvitation, TeamActivity, Presentation)
//! - The error taxonomy shared by every workflow
//! - Store ports for the Primary and Secondary stores, plus in-memory implementations
//! - Workflow services (authorization, invitations, moderation, cascade, activity)

pub mod error;
pub mod models;
pub mod services;
pub mod store;

pub use error::{DomainError, StoreError, StoreResult};
