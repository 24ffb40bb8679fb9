//! Error types for Thornfall.

use crate::ids::UpgradeId;
use thiserror::Error;

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Upgrade catalog validation errors
    #[error("upgrade tree error: {0}")]
    UpgradeTree(#[from] UpgradeTreeError),

    /// Attack profile errors
    #[error("attack profile error: {0}")]
    AttackProfile(#[from] AttackProfileError),
}

/// Errors raised while validating the static upgrade catalog.
///
/// The catalog is fixed configuration, so any of these is a programming
/// error surfaced at construction time, not something to recover from
/// mid-game.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpgradeTreeError {
    /// Two upgrades share the same id
    #[error("duplicate upgrade id {0:?}")]
    DuplicateId(UpgradeId),

    /// A dependency references an id that is not in the catalog
    #[error("upgrade {upgrade:?} depends on unknown id {dependency:?}")]
    UnknownDependency {
        /// Upgrade declaring the dependency
        upgrade: UpgradeId,
        /// The missing id
        dependency: UpgradeId,
    },

    /// A dependency references an id that is not numerically smaller
    ///
    /// Construction order doubles as the acyclicity proof: if every edge
    /// points at a smaller id the graph cannot contain a cycle.
    #[error("upgrade {upgrade:?} depends on {dependency:?}, which is not a smaller id")]
    ForwardDependency {
        /// Upgrade declaring the dependency
        upgrade: UpgradeId,
        /// The offending id
        dependency: UpgradeId,
    },

    /// A layout anchor references a node with no resolved position
    #[error("upgrade {upgrade:?} is anchored to {anchor:?}, which has no position yet")]
    UnresolvedAnchor {
        /// Upgrade being laid out
        upgrade: UpgradeId,
        /// The anchor id
        anchor: UpgradeId,
    },
}

/// Errors raised while validating an attack profile.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AttackProfileError {
    /// Phase boundaries are not strictly increasing
    #[error("attack phases must satisfy prepare < strike < end, got {prepare} / {strike} / {end}")]
    NonMonotonicPhases {
        /// End of the preparation window
        prepare: f32,
        /// Instant of the strike
        strike: f32,
        /// End of the whole cycle
        end: f32,
    },

    /// Range must be positive
    #[error("attack range must be positive, got {0}")]
    NonPositiveRange(f32),
}

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
