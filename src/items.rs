//! The standard item catalog.
//!
//! Items are immutable stat-multiplier definitions; equipping one scales the
//! wearer's health, shield, and damage by its factors. The default catalog
//! holds one item per slot — the kit every new duelist starts with and every
//! training bot carries.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for an item instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(pub Uuid);

impl ItemId {
    pub fn new() -> Self {
        ItemId(Uuid::new_v4())
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Equipment slot categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Helmet,
    LeftHandWeapon,
    RightHandWeapon,
    Shield,
    Shoes,
    Ring,
}

impl ItemKind {
    pub fn name(&self) -> &'static str {
        match self {
            ItemKind::Helmet => "helmet",
            ItemKind::LeftHandWeapon => "left hand weapon",
            ItemKind::RightHandWeapon => "right hand weapon",
            ItemKind::Shield => "shield",
            ItemKind::Shoes => "shoes",
            ItemKind::Ring => "ring",
        }
    }

    pub fn all() -> [ItemKind; 6] {
        [
            ItemKind::Helmet,
            ItemKind::LeftHandWeapon,
            ItemKind::RightHandWeapon,
            ItemKind::Shield,
            ItemKind::Shoes,
            ItemKind::Ring,
        ]
    }

    /// The slot this kind cannot share hands with, if any.
    ///
    /// A shield and a left-hand weapon occupy the same arm.
    pub fn conflicts_with(&self) -> Option<ItemKind> {
        match self {
            ItemKind::Shield => Some(ItemKind::LeftHandWeapon),
            ItemKind::LeftHandWeapon => Some(ItemKind::Shield),
            _ => None,
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A piece of equipment.
///
/// The multipliers are fixed at construction; only `equipped` changes over
/// an item's life, and only through the owning character's equip/unequip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub kind: ItemKind,
    pub name: String,
    pub damage_mul: f64,
    pub health_mul: f64,
    pub shield_mul: f64,
    pub equipped: bool,
}

impl Item {
    pub fn new(
        kind: ItemKind,
        name: impl Into<String>,
        damage_mul: f64,
        health_mul: f64,
        shield_mul: f64,
    ) -> Self {
        Self {
            id: ItemId::new(),
            kind,
            name: name.into(),
            damage_mul,
            health_mul,
            shield_mul,
            equipped: false,
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Type: {}\nName: {}\nBoost damage: {}, boost health: {}, boost shield: {}.",
            self.kind, self.name, self.damage_mul, self.health_mul, self.shield_mul
        )
    }
}

/// The default item for a slot.
pub fn default_item(kind: ItemKind) -> Item {
    match kind {
        ItemKind::Helmet => Item::new(kind, "Usual helmet", 1.0, 1.0, 1.2),
        ItemKind::LeftHandWeapon => Item::new(kind, "Simple left hand sword", 1.2, 1.0, 0.9),
        ItemKind::RightHandWeapon => Item::new(kind, "Simple right hand axe", 1.25, 1.0, 0.85),
        ItemKind::Shield => Item::new(kind, "Metal shield", 1.05, 1.0, 1.3),
        ItemKind::Shoes => Item::new(kind, "Leather shoes", 1.05, 1.1, 1.05),
        ItemKind::Ring => Item::new(kind, "Ring of Sun", 1.1, 1.2, 0.9),
    }
}

/// One default item of each kind — the starting kit for new duelists and
/// the loot table carried by training bots.
pub fn starter_kit() -> Vec<Item> {
    ItemKind::all().into_iter().map(default_item).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starter_kit_covers_every_slot() {
        let kit = starter_kit();
        assert_eq!(kit.len(), 6);
        for kind in ItemKind::all() {
            assert!(kit.iter().any(|i| i.kind == kind));
        }
        assert!(kit.iter().all(|i| !i.equipped));
    }

    #[test]
    fn test_default_multipliers() {
        let helmet = default_item(ItemKind::Helmet);
        assert_eq!(helmet.name, "Usual helmet");
        assert_eq!(helmet.damage_mul, 1.0);
        assert_eq!(helmet.shield_mul, 1.2);

        let axe = default_item(ItemKind::RightHandWeapon);
        assert_eq!(axe.damage_mul, 1.25);
        assert_eq!(axe.shield_mul, 0.85);
    }

    #[test]
    fn test_fresh_ids() {
        let a = default_item(ItemKind::Ring);
        let b = default_item(ItemKind::Ring);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_hand_conflicts() {
        assert_eq!(
            ItemKind::Shield.conflicts_with(),
            Some(ItemKind::LeftHandWeapon)
        );
        assert_eq!(
            ItemKind::LeftHandWeapon.conflicts_with(),
            Some(ItemKind::Shield)
        );
        assert_eq!(ItemKind::RightHandWeapon.conflicts_with(), None);
        assert_eq!(ItemKind::Helmet.conflicts_with(), None);
    }
}
