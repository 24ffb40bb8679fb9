//! Upgrade tree: catalog, dependency rules and purchases.
//!
//! This module provides:
//! - Immutable [`Upgrade`] records with stat modifiers and dependency edges
//! - [`UpgradeTree`] — the catalog validated once at construction
//! - Purchase eligibility (`can_purchase`) and silent-rejection `purchase`
//! - Lazy, cached node layout for the tree view
//!
//! The catalog forms a DAG. Validation relies on the construction-order
//! convention: a node may only depend on (and be anchored to) numerically
//! smaller ids, which rules out cycles without a traversal.

use ahash::{AHashMap, AHashSet};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use thornfall_common::error::UpgradeTreeError;
use thornfall_common::ids::UpgradeId;
use tracing::debug;

use crate::progression::Progression;

/// Direction an upgrade node is laid out in, relative to its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnchorDirection {
    /// West of the anchor.
    Left,
    /// East of the anchor.
    Right,
    /// North of the anchor.
    Up,
    /// South of the anchor.
    Down,
    /// North-east diagonal.
    UpRight,
    /// South-east diagonal.
    DownRight,
    /// North-west diagonal.
    UpLeft,
    /// South-west diagonal.
    DownLeft,
}

impl AnchorDirection {
    /// Unit offset vector for this direction.
    #[must_use]
    pub fn offset(self) -> Vec2 {
        let v = match self {
            Self::Left => Vec2::new(-1.0, 0.0),
            Self::Right => Vec2::new(1.0, 0.0),
            Self::Up => Vec2::new(0.0, 1.0),
            Self::Down => Vec2::new(0.0, -1.0),
            Self::UpRight => Vec2::new(1.0, 1.0),
            Self::DownRight => Vec2::new(1.0, -1.0),
            Self::UpLeft => Vec2::new(-1.0, 1.0),
            Self::DownLeft => Vec2::new(-1.0, -1.0),
        };
        v.normalize()
    }
}

/// Where an upgrade node sits in the tree view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    /// Offset direction from the reference node.
    pub direction: AnchorDirection,
    /// Node this one is placed relative to; `None` anchors to the root.
    pub reference: Option<UpgradeId>,
}

impl Anchor {
    /// Anchors to the root (player) node.
    #[must_use]
    pub const fn root(direction: AnchorDirection) -> Self {
        Self {
            direction,
            reference: None,
        }
    }

    /// Anchors to another upgrade node.
    #[must_use]
    pub const fn to(direction: AnchorDirection, reference: UpgradeId) -> Self {
        Self {
            direction,
            reference: Some(reference),
        }
    }
}

/// An immutable upgrade node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Upgrade {
    /// Globally unique id; ids sharing a leading digit group form a branch.
    pub id: UpgradeId,
    /// Human-readable effect label for the tree view.
    pub label: String,
    /// Cost in the configured currency.
    pub cost: i32,
    /// Additive maximum-hitpoint bonus.
    pub hp_bonus: i32,
    /// Additive heal-per-second bonus.
    pub heal_bonus: i32,
    /// Multiplicative damage bonus (1.0 = none).
    pub damage_mult: f32,
    /// Flat damage bonus.
    pub damage_add: i32,
    /// Multiplicative attack-speed bonus (1.0 = none).
    pub attack_speed_mult: f32,
    /// Prerequisites; all must be acquired before this one.
    pub depends_on: Vec<UpgradeId>,
    /// Layout anchor for the tree view.
    pub anchor: Anchor,
}

impl Upgrade {
    fn base(id: u32, label: String, cost: i32, anchor: Anchor, depends_on: &[u32]) -> Self {
        Self {
            id: UpgradeId::new(id),
            label,
            cost,
            hp_bonus: 0,
            heal_bonus: 0,
            damage_mult: 1.0,
            damage_add: 0,
            attack_speed_mult: 1.0,
            depends_on: depends_on.iter().copied().map(UpgradeId::new).collect(),
            anchor,
        }
    }

    /// Additive max-HP upgrade.
    #[must_use]
    pub fn hp(id: u32, cost: i32, hp_bonus: i32, anchor: Anchor, depends_on: &[u32]) -> Self {
        let mut upgrade = Self::base(
            id,
            format!("Add {hp_bonus} more HP"),
            cost,
            anchor,
            depends_on,
        );
        upgrade.hp_bonus = hp_bonus;
        upgrade
    }

    /// Additive heal-per-second upgrade.
    #[must_use]
    pub fn heal(id: u32, cost: i32, heal_bonus: i32, anchor: Anchor, depends_on: &[u32]) -> Self {
        let mut upgrade = Self::base(
            id,
            format!("Heal {heal_bonus} hp/sec more"),
            cost,
            anchor,
            depends_on,
        );
        upgrade.heal_bonus = heal_bonus;
        upgrade
    }

    /// Multiplicative damage upgrade.
    #[must_use]
    pub fn damage(id: u32, cost: i32, damage_mult: f32, anchor: Anchor, depends_on: &[u32]) -> Self {
        let percent = ((damage_mult - 1.0) * 1000.0).round() / 10.0;
        let mut upgrade = Self::base(
            id,
            format!("Damage {percent}% more"),
            cost,
            anchor,
            depends_on,
        );
        upgrade.damage_mult = damage_mult;
        upgrade
    }

    /// Flat damage upgrade.
    #[must_use]
    pub fn flat_damage(
        id: u32,
        cost: i32,
        damage_add: i32,
        anchor: Anchor,
        depends_on: &[u32],
    ) -> Self {
        let mut upgrade = Self::base(
            id,
            format!("Add {damage_add} damage"),
            cost,
            anchor,
            depends_on,
        );
        upgrade.damage_add = damage_add;
        upgrade
    }

    /// Multiplicative attack-speed upgrade.
    #[must_use]
    pub fn attack_speed(
        id: u32,
        cost: i32,
        attack_speed_mult: f32,
        anchor: Anchor,
        depends_on: &[u32],
    ) -> Self {
        let percent = ((attack_speed_mult - 1.0) * 1000.0).round() / 10.0;
        let mut upgrade = Self::base(
            id,
            format!("{percent}% more attack speed"),
            cost,
            anchor,
            depends_on,
        );
        upgrade.attack_speed_mult = attack_speed_mult;
        upgrade
    }
}

/// The validated, constructed-once upgrade catalog.
///
/// Serializes as a plain upgrade list; deserialization runs the same
/// validation as [`UpgradeTree::new`] and rebuilds the id index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Upgrade>", into = "Vec<Upgrade>")]
pub struct UpgradeTree {
    upgrades: Vec<Upgrade>,
    by_id: AHashMap<UpgradeId, usize>,
}

impl TryFrom<Vec<Upgrade>> for UpgradeTree {
    type Error = UpgradeTreeError;

    fn try_from(upgrades: Vec<Upgrade>) -> Result<Self, Self::Error> {
        Self::new(upgrades)
    }
}

impl From<UpgradeTree> for Vec<Upgrade> {
    fn from(tree: UpgradeTree) -> Self {
        tree.upgrades
    }
}

impl UpgradeTree {
    /// Builds and validates a catalog.
    ///
    /// Rejects duplicate ids, dependencies or anchors on unknown ids, and
    /// dependencies or anchors that are not numerically smaller than the
    /// declaring node (the construction-order constraint that guarantees
    /// acyclicity).
    pub fn new(mut upgrades: Vec<Upgrade>) -> Result<Self, UpgradeTreeError> {
        upgrades.sort_by_key(|upgrade| upgrade.id);

        let mut by_id = AHashMap::with_capacity(upgrades.len());
        for (index, upgrade) in upgrades.iter().enumerate() {
            if by_id.insert(upgrade.id, index).is_some() {
                return Err(UpgradeTreeError::DuplicateId(upgrade.id));
            }
        }

        for upgrade in &upgrades {
            for &dependency in &upgrade.depends_on {
                if !by_id.contains_key(&dependency) {
                    return Err(UpgradeTreeError::UnknownDependency {
                        upgrade: upgrade.id,
                        dependency,
                    });
                }
                if dependency >= upgrade.id {
                    return Err(UpgradeTreeError::ForwardDependency {
                        upgrade: upgrade.id,
                        dependency,
                    });
                }
            }
            if let Some(anchor) = upgrade.anchor.reference {
                if !by_id.contains_key(&anchor) || anchor >= upgrade.id {
                    return Err(UpgradeTreeError::UnresolvedAnchor {
                        upgrade: upgrade.id,
                        anchor,
                    });
                }
            }
        }

        Ok(Self { upgrades, by_id })
    }

    /// The standard catalog: five branches radiating from the player node.
    pub fn standard() -> Result<Self, UpgradeTreeError> {
        use AnchorDirection::{DownRight, Left, Right, Up, UpRight};
        let root = Anchor::root;
        let to = |direction, reference: u32| Anchor::to(direction, UpgradeId::new(reference));

        Self::new(vec![
            // Left: hitpoints
            Upgrade::hp(1, 1, 100, root(Left), &[]),
            Upgrade::hp(2, 1, 300, to(Left, 1), &[1]),
            Upgrade::hp(3, 1, 500, to(Left, 2), &[2]),
            Upgrade::hp(4, 1, 1000, to(Left, 3), &[3]),
            Upgrade::hp(5, 1, 2000, to(Left, 4), &[4]),
            // Top: heal rate
            Upgrade::heal(101, 1, 1, root(Up), &[]),
            Upgrade::heal(102, 1, 2, to(Up, 101), &[101]),
            Upgrade::heal(103, 1, 4, to(Up, 102), &[102]),
            Upgrade::heal(104, 1, 8, to(Up, 103), &[103]),
            Upgrade::heal(105, 1, 14, to(Up, 104), &[104]),
            // Right: damage multiplier
            Upgrade::damage(201, 1, 1.20, root(Right), &[]),
            Upgrade::damage(202, 2, 1.25, to(Right, 201), &[201]),
            Upgrade::damage(203, 2, 1.30, to(Right, 202), &[202]),
            Upgrade::damage(204, 3, 1.35, to(Right, 203), &[203]),
            Upgrade::damage(205, 4, 1.50, to(Right, 204), &[204]),
            // Upper right: flat damage
            Upgrade::flat_damage(210, 2, 10, to(UpRight, 201), &[201]),
            Upgrade::flat_damage(211, 2, 10, to(UpRight, 202), &[210, 202]),
            Upgrade::flat_damage(212, 2, 20, to(UpRight, 203), &[211, 203]),
            Upgrade::flat_damage(213, 3, 30, to(UpRight, 204), &[212, 204]),
            Upgrade::flat_damage(214, 4, 40, to(UpRight, 205), &[213, 205]),
            // Lower right: attack speed
            Upgrade::attack_speed(220, 2, 1.10, to(DownRight, 201), &[201]),
            Upgrade::attack_speed(221, 2, 1.10, to(DownRight, 202), &[220, 202]),
            Upgrade::attack_speed(222, 2, 1.20, to(DownRight, 203), &[221, 203]),
            Upgrade::attack_speed(223, 3, 1.25, to(DownRight, 204), &[222, 204]),
            Upgrade::attack_speed(224, 4, 1.30, to(DownRight, 205), &[223, 205]),
        ])
    }

    /// All upgrades in ascending id order.
    #[must_use]
    pub fn upgrades(&self) -> &[Upgrade] {
        &self.upgrades
    }

    /// Looks up an upgrade by id.
    #[must_use]
    pub fn get(&self, id: UpgradeId) -> Option<&Upgrade> {
        self.by_id.get(&id).map(|&index| &self.upgrades[index])
    }

    /// Purchase eligibility: not yet owned, affordable, dependencies met.
    #[must_use]
    pub fn can_purchase(
        &self,
        id: UpgradeId,
        acquired: &AHashSet<UpgradeId>,
        progression: &Progression,
    ) -> bool {
        if acquired.contains(&id) {
            return false;
        }
        let Some(upgrade) = self.get(id) else {
            return false;
        };
        if !progression.can_afford(upgrade.cost) {
            return false;
        }
        upgrade
            .depends_on
            .iter()
            .all(|dependency| acquired.contains(dependency))
    }

    /// Attempts a purchase; an ineligible request is a silent no-op.
    ///
    /// On success the cost is deducted and the id appended to the acquired
    /// set. Returns whether the purchase happened; the caller is expected
    /// to recompute derived stats afterwards.
    pub fn purchase(
        &self,
        id: UpgradeId,
        acquired: &mut AHashSet<UpgradeId>,
        progression: &mut Progression,
    ) -> bool {
        if !self.can_purchase(id, acquired, progression) {
            return false;
        }
        // can_purchase checked affordability and existence
        let Some(upgrade) = self.get(id) else {
            return false;
        };
        if !progression.spend(upgrade.cost) {
            return false;
        }
        acquired.insert(id);
        debug!(id = id.raw(), cost = upgrade.cost, "upgrade purchased");
        true
    }
}

/// Lazily resolved, cached layout positions for the tree view.
///
/// Each node's position derives from its anchor's already-resolved position
/// plus a fixed offset in one of the eight directions. Positions are
/// computed the first time a node is visited and cached after that. Layout
/// is a rendering feed; purchase logic never consults it.
#[derive(Debug, Clone)]
pub struct UpgradeLayout {
    root: Vec2,
    spacing: f32,
    positions: AHashMap<UpgradeId, Vec2>,
}

impl UpgradeLayout {
    /// Creates a layout rooted at the player node with a node spacing.
    #[must_use]
    pub fn new(root: Vec2, spacing: f32) -> Self {
        Self {
            root,
            spacing,
            positions: AHashMap::new(),
        }
    }

    /// Resolves (and caches) a node's position.
    pub fn position_of(
        &mut self,
        tree: &UpgradeTree,
        id: UpgradeId,
    ) -> Result<Vec2, UpgradeTreeError> {
        if let Some(&position) = self.positions.get(&id) {
            return Ok(position);
        }
        let Some(upgrade) = tree.get(id) else {
            return Err(UpgradeTreeError::UnresolvedAnchor {
                upgrade: id,
                anchor: id,
            });
        };
        let reference = match upgrade.anchor.reference {
            // Anchors only point at smaller ids, so this recursion is finite.
            Some(anchor_id) => self.position_of(tree, anchor_id)?,
            None => self.root,
        };
        let position = reference + upgrade.anchor.direction.offset() * self.spacing;
        self.positions.insert(id, position);
        Ok(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(amount: i32) -> Progression {
        let mut prog = Progression::new();
        prog.points = amount;
        prog
    }

    #[test]
    fn test_standard_catalog_is_valid() {
        let tree = UpgradeTree::standard().expect("standard catalog must validate");
        assert_eq!(tree.upgrades().len(), 25);
        assert!(tree.get(UpgradeId::new(214)).is_some());
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let result = UpgradeTree::new(vec![
            Upgrade::hp(1, 1, 100, Anchor::root(AnchorDirection::Left), &[]),
            Upgrade::hp(1, 1, 200, Anchor::root(AnchorDirection::Right), &[]),
        ]);
        assert!(matches!(result, Err(UpgradeTreeError::DuplicateId(_))));
    }

    #[test]
    fn test_unknown_dependency_rejected() {
        let result = UpgradeTree::new(vec![Upgrade::hp(
            2,
            1,
            100,
            Anchor::root(AnchorDirection::Left),
            &[1],
        )]);
        assert!(matches!(
            result,
            Err(UpgradeTreeError::UnknownDependency { .. })
        ));
    }

    #[test]
    fn test_forward_dependency_rejected() {
        let result = UpgradeTree::new(vec![
            Upgrade::hp(1, 1, 100, Anchor::root(AnchorDirection::Left), &[2]),
            Upgrade::hp(2, 1, 200, Anchor::to(AnchorDirection::Left, UpgradeId::new(1)), &[]),
        ]);
        assert!(matches!(
            result,
            Err(UpgradeTreeError::ForwardDependency { .. })
        ));
    }

    #[test]
    fn test_self_dependency_rejected() {
        let result = UpgradeTree::new(vec![Upgrade::hp(
            1,
            1,
            100,
            Anchor::root(AnchorDirection::Left),
            &[1],
        )]);
        assert!(matches!(
            result,
            Err(UpgradeTreeError::ForwardDependency { .. })
        ));
    }

    #[test]
    fn test_can_purchase_requires_dependency() {
        let tree = UpgradeTree::standard().expect("valid catalog");
        let acquired = AHashSet::new();
        let prog = points(10);

        // id 2 depends on id 1; plenty of points but no dependency.
        assert!(!tree.can_purchase(UpgradeId::new(2), &acquired, &prog));
        assert!(tree.can_purchase(UpgradeId::new(1), &acquired, &prog));
    }

    #[test]
    fn test_can_purchase_requires_currency() {
        let tree = UpgradeTree::standard().expect("valid catalog");
        let acquired = AHashSet::new();
        assert!(!tree.can_purchase(UpgradeId::new(1), &acquired, &points(0)));
    }

    #[test]
    fn test_can_purchase_rejects_owned() {
        let tree = UpgradeTree::standard().expect("valid catalog");
        let mut acquired = AHashSet::new();
        acquired.insert(UpgradeId::new(1));
        assert!(!tree.can_purchase(UpgradeId::new(1), &acquired, &points(10)));
    }

    #[test]
    fn test_purchase_deducts_and_acquires() {
        let tree = UpgradeTree::standard().expect("valid catalog");
        let mut acquired = AHashSet::new();
        let mut prog = points(3);

        assert!(tree.purchase(UpgradeId::new(1), &mut acquired, &mut prog));
        assert_eq!(prog.points, 2);
        assert!(acquired.contains(&UpgradeId::new(1)));

        // Second purchase of the same id is a no-op.
        assert!(!tree.purchase(UpgradeId::new(1), &mut acquired, &mut prog));
        assert_eq!(prog.points, 2);
    }

    #[test]
    fn test_rejected_purchase_leaves_state_unchanged() {
        let tree = UpgradeTree::standard().expect("valid catalog");
        let mut acquired = AHashSet::new();
        let mut prog = points(10);

        // Dependency 201 missing for 202.
        assert!(!tree.purchase(UpgradeId::new(202), &mut acquired, &mut prog));
        assert_eq!(prog.points, 10);
        assert!(acquired.is_empty());
    }

    #[test]
    fn test_multi_dependency_chain() {
        let tree = UpgradeTree::standard().expect("valid catalog");
        let mut acquired = AHashSet::new();
        let mut prog = points(20);

        // 211 needs both 210 and 202.
        for id in [201, 202, 210] {
            assert!(tree.purchase(UpgradeId::new(id), &mut acquired, &mut prog));
        }
        assert!(tree.can_purchase(UpgradeId::new(211), &acquired, &prog));
    }

    #[test]
    fn test_layout_resolves_and_caches() {
        let tree = UpgradeTree::standard().expect("valid catalog");
        let mut layout = UpgradeLayout::new(Vec2::ZERO, 100.0);

        let p1 = layout.position_of(&tree, UpgradeId::new(1)).expect("resolves");
        assert!((p1 - Vec2::new(-100.0, 0.0)).length() < 1e-4);

        // Deep node resolves the whole chain; cached second call matches.
        let p5 = layout.position_of(&tree, UpgradeId::new(5)).expect("resolves");
        assert!((p5 - Vec2::new(-500.0, 0.0)).length() < 1e-4);
        let p5_again = layout.position_of(&tree, UpgradeId::new(5)).expect("cached");
        assert_eq!(p5, p5_again);
    }

    #[test]
    fn test_catalog_json_round_trip() {
        let tree = UpgradeTree::standard().expect("valid catalog");
        let json = serde_json::to_string(&tree).expect("serializes");
        let restored: UpgradeTree = serde_json::from_str(&json).expect("revalidates");
        assert_eq!(tree, restored);
        assert!(restored.get(UpgradeId::new(214)).is_some());
    }

    #[test]
    fn test_layout_diagonal_offset_is_normalized() {
        let tree = UpgradeTree::standard().expect("valid catalog");
        let mut layout = UpgradeLayout::new(Vec2::ZERO, 100.0);

        let p201 = layout.position_of(&tree, UpgradeId::new(201)).expect("resolves");
        let p210 = layout.position_of(&tree, UpgradeId::new(210)).expect("resolves");
        assert!(((p210 - p201).length() - 100.0).abs() < 1e-3);
    }
}
