//! Persistence layer for the Slidehub backend.
//!
//! This crate contains:
//! - Connection pools and migrations for the primary and secondary databases
//! - Entity definitions (database row mappings)
//! - Repository implementations of the domain store ports

pub mod db;
pub mod entities;
pub mod error;
pub mod metrics;
pub mod repositories;

pub use repositories::postgres_stores;
