//! # Thornfall Gameplay
//!
//! Combat and progression systems for Thornfall.
//!
//! This crate provides the deterministic, render-free simulation core:
//! - Simulation clock (time advances only with the tick)
//! - Timed attack state machines (prepare / strike / recover)
//! - Health, damage log and passive healing
//! - Combat resolution (attack cone, shield-crowd mitigation)
//! - XP, leveling and skill points
//! - The upgrade DAG with layout anchors
//! - Enemy archetypes, chasing AI and population maintenance
//! - The multi-phase boss encounter
//! - World tick orchestration tying it all together

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod attack;
pub mod boss;
pub mod combat;
pub mod enemy;
pub mod health;
pub mod player;
pub mod progression;
pub mod spawner;
pub mod time;
pub mod upgrades;
pub mod world;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::attack::*;
    pub use crate::boss::*;
    pub use crate::combat::*;
    pub use crate::enemy::*;
    pub use crate::health::*;
    pub use crate::player::*;
    pub use crate::progression::*;
    pub use crate::spawner::*;
    pub use crate::time::*;
    pub use crate::upgrades::*;
    pub use crate::world::*;
}

pub use prelude::*;
