//! Custom Axum extractors.

pub mod acting_user;
pub mod json;

pub use acting_user::{ActingUser, USER_EMAIL_HEADER, USER_ID_HEADER};
pub use json::{AppJson, AppQuery};
