//! Frozen-randomness tables.
//!
//! Fatal-strike capability and the bot item-drop flag are Bernoulli outcomes
//! rolled up front and reused, not re-rolled per strike. The table is built
//! once at startup and passed to whatever creates characters and bots; there
//! is no process-wide state.
//!
//! Two modes exist because the sharing granularity is a genuine design
//! choice: `SharedPerKind` rolls one outcome per archetype (and one bot-drop
//! outcome) when the table is generated, so every character of a kind shares
//! its kind's coin flip. `PerInstance` defers the roll to each creation, so
//! siblings of a kind can differ. In both modes the outcome is frozen on the
//! instance once created.

use crate::bots::BOT_DROP_CHANCE;
use crate::world::Archetype;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// How Bernoulli outcomes are shared across instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RollMode {
    /// One frozen outcome per archetype (and one for bot drops), rolled when
    /// the table is generated.
    #[default]
    SharedPerKind,
    /// A fresh outcome per created character or bot.
    PerInstance,
}

/// Pre-rolled Bernoulli outcomes for character and bot creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FateTable {
    mode: RollMode,
    fatal: [bool; 4],
    bot_drop: bool,
}

fn archetype_index(archetype: Archetype) -> usize {
    match archetype {
        Archetype::Warrior => 0,
        Archetype::Paladin => 1,
        Archetype::Mage => 2,
        Archetype::Rogue => 3,
    }
}

impl FateTable {
    /// Generate a table with the thread-local RNG.
    pub fn generate(mode: RollMode) -> Self {
        Self::generate_with_rng(mode, &mut rand::thread_rng())
    }

    /// Generate with a specific RNG (useful for testing).
    ///
    /// In `PerInstance` mode the stored outcomes are never consulted, but
    /// they are rolled anyway so a seeded RNG advances identically in both
    /// modes.
    pub fn generate_with_rng<R: Rng>(mode: RollMode, rng: &mut R) -> Self {
        let mut fatal = [false; 4];
        for archetype in Archetype::all() {
            fatal[archetype_index(archetype)] = rng.gen_bool(archetype.data().fatal_chance);
        }
        let bot_drop = rng.gen_bool(BOT_DROP_CHANCE);
        Self {
            mode,
            fatal,
            bot_drop,
        }
    }

    /// A table where no one is fatal-capable and no bot ever drops loot.
    pub fn none() -> Self {
        Self {
            mode: RollMode::SharedPerKind,
            fatal: [false; 4],
            bot_drop: false,
        }
    }

    /// A table where every archetype is fatal-capable and every bot drops.
    pub fn certain() -> Self {
        Self {
            mode: RollMode::SharedPerKind,
            fatal: [true; 4],
            bot_drop: true,
        }
    }

    pub fn mode(&self) -> RollMode {
        self.mode
    }

    /// Resolve the fatal-strike flag for a character being created.
    pub fn fatal_strike(&self, archetype: Archetype) -> bool {
        self.fatal_strike_with_rng(archetype, &mut rand::thread_rng())
    }

    pub fn fatal_strike_with_rng<R: Rng>(
        &self,
        archetype: Archetype,
        rng: &mut R,
    ) -> bool {
        match self.mode {
            RollMode::SharedPerKind => self.fatal[archetype_index(archetype)],
            RollMode::PerInstance => rng.gen_bool(archetype.data().fatal_chance),
        }
    }

    /// Resolve the item-drop flag for a bot being created.
    pub fn bot_drops(&self) -> bool {
        self.bot_drops_with_rng(&mut rand::thread_rng())
    }

    pub fn bot_drops_with_rng<R: Rng>(&self, rng: &mut R) -> bool {
        match self.mode {
            RollMode::SharedPerKind => self.bot_drop,
            RollMode::PerInstance => rng.gen_bool(BOT_DROP_CHANCE),
        }
    }
}
