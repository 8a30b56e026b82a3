//! Training bots.
//!
//! A bot is a disposable opponent: fixed base stats, the standard six-item
//! kit as its loot table, and a frozen item-drop flag. One bot lives for
//! exactly one training encounter; construct a fresh one per encounter.

use crate::fate::FateTable;
use crate::items::{starter_kit, Item};
use rand::Rng;
use serde::{Deserialize, Serialize};

pub const BOT_BASE_HEALTH: f64 = 300.0;
pub const BOT_BASE_DAMAGE: f64 = 15.0;

/// Probability that a defeated bot drops an item from its kit.
pub const BOT_DROP_CHANCE: f64 = 0.05;

/// A procedurally generated training opponent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bot {
    pub health: f64,
    pub damage: f64,
    /// The items a kill can drop from, one chosen uniformly.
    pub kit: Vec<Item>,
    /// Frozen at construction via the fate table.
    pub drops_item: bool,
}

impl Bot {
    pub fn new(fate: &FateTable) -> Self {
        Self::new_with_rng(fate, &mut rand::thread_rng())
    }

    pub fn new_with_rng<R: Rng>(fate: &FateTable, rng: &mut R) -> Self {
        Self {
            health: BOT_BASE_HEALTH,
            damage: BOT_BASE_DAMAGE,
            kit: starter_kit(),
            drops_item: fate.bot_drops_with_rng(rng),
        }
    }

    /// Scale health and damage against the challenger's level: each gains
    /// a tenth of the level, as a fraction of itself. Called exactly once,
    /// when the encounter starts.
    pub fn scale_to(&mut self, opponent_level: u32) {
        let factor = f64::from(opponent_level) / 10.0;
        self.health += factor * self.health;
        self.damage += factor * self.damage;
    }

    pub fn is_defeated(&self) -> bool {
        self.health <= 0.0
    }

    /// The item a kill yields, if this bot's drop flag is set.
    pub fn drop_item(&self) -> Option<Item> {
        self.drop_item_with_rng(&mut rand::thread_rng())
    }

    pub fn drop_item_with_rng<R: Rng>(&self, rng: &mut R) -> Option<Item> {
        if !self.drops_item || self.kit.is_empty() {
            return None;
        }
        let index = rng.gen_range(0..self.kit.len());
        Some(self.kit[index].clone())
    }
}
