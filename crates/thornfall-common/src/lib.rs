//! # Thornfall Common
//!
//! Common types, utilities, and shared abstractions for Thornfall.
//!
//! This crate provides foundational types used across all Thornfall
//! subsystems:
//! - ID types (EntityId, UpgradeId, ArchetypeId)
//! - Common error types
//! - 2D math helpers for targeting and boss geometry
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod ids;
pub mod math;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::*;
    pub use crate::ids::*;
    pub use crate::math::*;
}

pub use prelude::*;
