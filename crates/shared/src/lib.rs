//! Shared utilities and common types for the Slidehub backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Offset pagination helpers
//! - Common validation logic (emails, display names)

pub mod pagination;
pub mod validation;
