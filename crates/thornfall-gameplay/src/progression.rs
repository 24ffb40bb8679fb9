//! Experience, leveling and upgrade currency.
//!
//! This module provides:
//! - Carry-propagating XP accumulation (one large grant may level several
//!   times)
//! - Geometric growth of the per-level XP requirement
//! - A configurable upgrade currency (skill points by default, raw XP as a
//!   legacy alternative)

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default growth factor applied to `max_xp` on each level-up.
pub const LEVEL_GROWTH: f32 = 1.3;

/// Starting XP requirement for the first level.
pub const BASE_MAX_XP: i32 = 100;

/// Which pool upgrade purchases are paid from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    /// Spend skill points earned on level-up.
    #[default]
    Points,
    /// Spend accumulated XP directly.
    Xp,
}

/// XP, level-up points and the leveling curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progression {
    /// XP accumulated towards the next level
    pub xp: i32,
    /// XP required for the next level; grows geometrically
    pub max_xp: i32,
    /// Spendable skill points
    pub points: i32,
    growth: f32,
    currency: Currency,
}

impl Default for Progression {
    fn default() -> Self {
        Self {
            xp: 0,
            max_xp: BASE_MAX_XP,
            points: 0,
            growth: LEVEL_GROWTH,
            currency: Currency::default(),
        }
    }
}

impl Progression {
    /// Creates progression state at level one with no XP.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the level growth factor. Must be greater than one.
    #[must_use]
    pub fn with_growth(mut self, growth: f32) -> Self {
        self.growth = growth.max(1.0 + f32::EPSILON);
        self
    }

    /// Selects the upgrade currency.
    #[must_use]
    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    /// The configured upgrade currency.
    #[must_use]
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Grants XP, carrying over level boundaries.
    ///
    /// While `xp >= max_xp`: subtract the requirement, grant one point and
    /// grow the requirement geometrically (truncated to an integer). A
    /// single large grant may trigger several level-ups.
    pub fn gain_xp(&mut self, amount: i32) {
        self.xp += amount;
        while self.xp >= self.max_xp {
            self.xp -= self.max_xp;
            self.points += 1;
            self.max_xp = (self.max_xp as f32 * self.growth) as i32;
            debug!(points = self.points, max_xp = self.max_xp, "level up");
        }
    }

    /// Balance of the configured currency.
    #[must_use]
    pub fn balance(&self) -> i32 {
        match self.currency {
            Currency::Points => self.points,
            Currency::Xp => self.xp,
        }
    }

    /// Whether the configured currency covers a cost.
    #[must_use]
    pub fn can_afford(&self, cost: i32) -> bool {
        self.balance() >= cost
    }

    /// Deducts a cost from the configured currency.
    ///
    /// Returns whether the deduction happened; an unaffordable cost leaves
    /// the state untouched.
    pub fn spend(&mut self, cost: i32) -> bool {
        if !self.can_afford(cost) {
            return false;
        }
        match self.currency {
            Currency::Points => self.points -= cost,
            Currency::Xp => self.xp -= cost,
        }
        true
    }
}
