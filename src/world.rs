//! The duel data model.
//!
//! Characters, their stats and equipment, and the `Arena` that holds two of
//! them for a duel. Everything here is plain state plus the operations that
//! keep its invariants; the combat rules that read and mutate it live in
//! [`crate::rules`].

use crate::bots::Bot;
use crate::fate::FateTable;
use crate::items::{starter_kit, Item, ItemId, ItemKind};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharacterId(pub Uuid);

impl CharacterId {
    pub fn new() -> Self {
        CharacterId(Uuid::new_v4())
    }
}

impl Default for CharacterId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One of the two corners of an arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn other(&self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

/// Duelist archetypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Archetype {
    Warrior,
    Paladin,
    Mage,
    Rogue,
}

impl Archetype {
    pub fn name(&self) -> &'static str {
        match self {
            Archetype::Warrior => "Warrior",
            Archetype::Paladin => "Paladin",
            Archetype::Mage => "Mage",
            Archetype::Rogue => "Rogue",
        }
    }

    pub fn all() -> [Archetype; 4] {
        [
            Archetype::Warrior,
            Archetype::Paladin,
            Archetype::Mage,
            Archetype::Rogue,
        ]
    }

    /// The archetype this one has the advantage over.
    ///
    /// Advantage cycle: Warrior -> Mage -> Rogue -> Paladin -> Warrior.
    pub fn prey(&self) -> Archetype {
        match self {
            Archetype::Warrior => Archetype::Mage,
            Archetype::Mage => Archetype::Rogue,
            Archetype::Rogue => Archetype::Paladin,
            Archetype::Paladin => Archetype::Warrior,
        }
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One-time damage multiplier granted to the advantaged side of a matchup.
pub const MATCHUP_DAMAGE_BONUS: f64 = 1.15;

/// The health/shield/damage triple every combat rule operates on.
///
/// Values are `f64` throughout: equipment multipliers and the win boost keep
/// them fractional, and the drift from a multiply/divide round trip is
/// accepted rather than corrected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatBlock {
    pub health: f64,
    pub shield: f64,
    pub damage: f64,
}

impl StatBlock {
    pub fn new(health: f64, shield: f64, damage: f64) -> Self {
        Self {
            health,
            shield,
            damage,
        }
    }

    /// The stats after putting an item on.
    pub fn apply_item(&self, item: &Item) -> StatBlock {
        StatBlock {
            health: self.health * item.health_mul,
            shield: self.shield * item.shield_mul,
            damage: self.damage * item.damage_mul,
        }
    }

    /// The stats after taking an item off — the inverse of [`apply_item`].
    ///
    /// [`apply_item`]: StatBlock::apply_item
    pub fn remove_item(&self, item: &Item) -> StatBlock {
        StatBlock {
            health: self.health / item.health_mul,
            shield: self.shield / item.shield_mul,
            damage: self.damage / item.damage_mul,
        }
    }

    /// The stats after a win at the given level: each value grows by
    /// `level` percent of itself.
    pub fn win_boost(&self, level: u32) -> StatBlock {
        let factor = f64::from(level) / 100.0;
        StatBlock {
            health: self.health + factor * self.health,
            shield: self.shield + factor * self.shield,
            damage: self.damage + factor * self.damage,
        }
    }
}

/// A character's item collection.
///
/// The inventory owns every item the character has, equipped or not; the
/// equipment set only references items living here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    pub items: Vec<Item>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_item(&mut self, item: Item) {
        self.items.push(item);
    }

    pub fn remove_item(&mut self, id: ItemId) -> Option<Item> {
        let index = self.items.iter().position(|i| i.id == id)?;
        Some(self.items.remove(index))
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        self.items.iter_mut().find(|i| i.id == id)
    }

    /// Items available to put on.
    pub fn unequipped(&self) -> impl Iterator<Item = &Item> {
        self.items.iter().filter(|i| !i.equipped)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// The set of currently equipped items, one slot per kind.
///
/// Slots reference items in the owning character's inventory; the set never
/// owns or destroys an item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    pub helmet: Option<ItemId>,
    pub left_hand: Option<ItemId>,
    pub right_hand: Option<ItemId>,
    pub shield: Option<ItemId>,
    pub shoes: Option<ItemId>,
    pub ring: Option<ItemId>,
}

impl Equipment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slot(&self, kind: ItemKind) -> Option<ItemId> {
        match kind {
            ItemKind::Helmet => self.helmet,
            ItemKind::LeftHandWeapon => self.left_hand,
            ItemKind::RightHandWeapon => self.right_hand,
            ItemKind::Shield => self.shield,
            ItemKind::Shoes => self.shoes,
            ItemKind::Ring => self.ring,
        }
    }

    pub(crate) fn slot_mut(&mut self, kind: ItemKind) -> &mut Option<ItemId> {
        match kind {
            ItemKind::Helmet => &mut self.helmet,
            ItemKind::LeftHandWeapon => &mut self.left_hand,
            ItemKind::RightHandWeapon => &mut self.right_hand,
            ItemKind::Shield => &mut self.shield,
            ItemKind::Shoes => &mut self.shoes,
            ItemKind::Ring => &mut self.ring,
        }
    }

    pub fn equipped_count(&self) -> usize {
        ItemKind::all()
            .iter()
            .filter(|k| self.slot(**k).is_some())
            .count()
    }
}

/// Errors from equip/unequip operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EquipError {
    #[error("You can't hold {wanted}. Take off {held} first.")]
    Conflict { wanted: ItemKind, held: ItemKind },

    #[error("that item is not in the inventory")]
    UnknownItem(ItemId),

    #[error("that item is not equipped")]
    NotEquipped(ItemId),
}

/// Outcome of a successful equip call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EquipOutcome {
    /// The item went on; here is the updated stat triple.
    Equipped(StatBlock),
    /// A slot of that kind was already occupied; nothing changed.
    SlotOccupied,
}

/// Who a character defeated, for experience purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Opponent {
    /// A training bot. Worth a flat 4 XP.
    Bot,
    /// Another character at the given level.
    Level(u32),
}

/// A duelist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    pub archetype: Archetype,
    pub stats: StatBlock,
    /// Whether every strike carries the fatal bonus. Rolled once at creation
    /// and frozen for life.
    pub fatal_strike: bool,
    pub fatal_damage: f64,
    /// Fractional: the high-level-opponent bonus scales it by a tenth of the
    /// level difference.
    pub experience: f64,
    pub level: u32,
    pub inventory: Inventory,
    pub equipment: Equipment,
}

impl Character {
    /// Create a fresh level-1 character of the given archetype.
    pub fn new(name: impl Into<String>, archetype: Archetype, fate: &FateTable) -> Self {
        Self::new_with_rng(name, archetype, fate, &mut rand::thread_rng())
    }

    pub fn new_with_rng<R: Rng>(
        name: impl Into<String>,
        archetype: Archetype,
        fate: &FateTable,
        rng: &mut R,
    ) -> Self {
        let data = archetype.data();
        Self {
            id: CharacterId::new(),
            name: name.into(),
            archetype,
            stats: StatBlock::new(data.base_health, data.base_shield, data.base_damage),
            fatal_strike: fate.fatal_strike_with_rng(archetype, rng),
            fatal_damage: data.fatal_damage,
            experience: 0.0,
            level: 1,
            inventory: Inventory::new(),
            equipment: Equipment::new(),
        }
    }

    /// Add the six default items to the inventory (none equipped).
    pub fn with_starter_kit(mut self) -> Self {
        for item in starter_kit() {
            self.inventory.add_item(item);
        }
        self
    }

    /// The damage one strike of this character deals before absorption.
    pub fn strike_damage(&self) -> f64 {
        if self.fatal_strike {
            self.stats.damage + self.fatal_damage
        } else {
            self.stats.damage
        }
    }

    pub fn is_defeated(&self) -> bool {
        self.stats.health <= 0.0
    }

    /// Award experience for a defeated opponent.
    ///
    /// Bots are worth a flat 4. Characters are worth a flat 20, and when the
    /// opponent out-leveled this character the total (including the 20) is
    /// further raised by a tenth of the level difference.
    pub fn add_experience(&mut self, opponent: Opponent) {
        self.experience = self.experience_after(opponent);
    }

    /// What [`add_experience`] would leave behind, without mutating.
    ///
    /// [`add_experience`]: Character::add_experience
    pub fn experience_after(&self, opponent: Opponent) -> f64 {
        match opponent {
            Opponent::Bot => self.experience + 4.0,
            Opponent::Level(level) => {
                let mut experience = self.experience + 20.0;
                if level > self.level {
                    let diff = f64::from(level - self.level);
                    experience += diff / 10.0 * experience;
                }
                experience
            }
        }
    }

    /// Reset experience to zero. Applied to losers.
    pub fn drop_experience(&mut self) {
        self.experience = 0.0;
    }

    /// Convert 100 experience into one level.
    ///
    /// Single-step: at most one level per call, even with 200+ banked.
    pub fn level_up(&mut self) {
        if self.experience >= 100.0 {
            self.experience -= 100.0;
            self.level += 1;
        }
    }

    /// Permanent post-win growth: every stat gains `level` percent of itself.
    pub fn apply_win_boost(&mut self) {
        self.stats = self.stats.win_boost(self.level);
    }

    /// The one-time 15% damage bonus for the advantaged side of a matchup.
    pub fn apply_matchup_bonus(&mut self) {
        self.stats.damage *= MATCHUP_DAMAGE_BONUS;
    }

    /// Put an item from the inventory on.
    ///
    /// A shield and a left-hand weapon cannot be held together; that clash is
    /// a [`EquipError::Conflict`] and changes nothing. An already-occupied
    /// slot is a silent no-op. On success the item's multipliers are applied
    /// to the stats and the updated triple is returned.
    pub fn equip(&mut self, id: ItemId) -> Result<EquipOutcome, EquipError> {
        let item = self
            .inventory
            .get(id)
            .ok_or(EquipError::UnknownItem(id))?
            .clone();

        if let Some(rival) = item.kind.conflicts_with() {
            if self.equipment.slot(rival).is_some() {
                return Err(EquipError::Conflict {
                    wanted: item.kind,
                    held: rival,
                });
            }
        }
        if self.equipment.slot(item.kind).is_some() {
            return Ok(EquipOutcome::SlotOccupied);
        }

        *self.equipment.slot_mut(item.kind) = Some(id);
        if let Some(owned) = self.inventory.get_mut(id) {
            owned.equipped = true;
        }
        self.stats = self.stats.apply_item(&item);
        Ok(EquipOutcome::Equipped(self.stats))
    }

    /// Take an equipped item off, reversing its multipliers.
    pub fn unequip(&mut self, id: ItemId) -> Result<StatBlock, EquipError> {
        let item = self
            .inventory
            .get(id)
            .ok_or(EquipError::UnknownItem(id))?
            .clone();
        if self.equipment.slot(item.kind) != Some(id) {
            return Err(EquipError::NotEquipped(id));
        }

        *self.equipment.slot_mut(item.kind) = None;
        if let Some(owned) = self.inventory.get_mut(id) {
            owned.equipped = false;
        }
        self.stats = self.stats.remove_item(&item);
        Ok(self.stats)
    }
}

impl fmt::Display for Character {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\nName: {}\nLevel: {}\nHealth: {:.1}\nShield: {:.1}\nDamage: {:.1}\nFatality: {:.1}\nExperience: {:.1}",
            self.archetype,
            self.name,
            self.level,
            self.stats.health,
            self.stats.shield,
            self.stats.damage,
            self.fatal_damage,
            self.experience
        )
    }
}

/// Stat triples of both sides, captured before any training happens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DuelSnapshot {
    pub left: StatBlock,
    pub right: StatBlock,
}

/// An in-progress training encounter against a bot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingEncounter {
    pub side: Side,
    pub bot: Bot,
}

/// The duel state: two characters, the pre-training snapshot, and at most
/// one active training encounter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arena {
    pub left: Character,
    pub right: Character,
    snapshot: DuelSnapshot,
    pub training: Option<TrainingEncounter>,
}

impl Arena {
    /// Pair two characters up. The snapshot is captured here, so it always
    /// predates any training damage.
    pub fn new(left: Character, right: Character) -> Self {
        let snapshot = DuelSnapshot {
            left: left.stats,
            right: right.stats,
        };
        Self {
            left,
            right,
            snapshot,
            training: None,
        }
    }

    pub fn duelist(&self, side: Side) -> &Character {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    pub fn duelist_mut(&mut self, side: Side) -> &mut Character {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    pub fn snapshot(&self) -> &DuelSnapshot {
        &self.snapshot
    }

    pub fn snapshot_of(&self, side: Side) -> StatBlock {
        match side {
            Side::Left => self.snapshot.left,
            Side::Right => self.snapshot.right,
        }
    }
}

/// Create a deterministic sample character for tests and examples: no fatal
/// capability, full starter kit in the inventory, nothing equipped.
pub fn create_sample_duelist(name: &str, archetype: Archetype) -> Character {
    Character::new(name, archetype, &FateTable::none()).with_starter_kit()
}
