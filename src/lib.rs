//! Turn-based duel engine with forest training.
//!
//! This crate provides:
//! - Four duelist archetypes with multiplicative equipment stats
//! - An intent/effect rules engine for deterministic combat resolution
//! - Procedurally generated training bots with item drops
//! - Wholesale roster persistence
//!
//! # Quick Start
//!
//! ```ignore
//! use duel_core::{Archetype, Character, DuelSession, FateTable, RollMode, Side};
//!
//! fn main() {
//!     let fate = FateTable::generate(RollMode::SharedPerKind);
//!     let left = Character::new("Conan", Archetype::Warrior, &fate).with_starter_kit();
//!     let right = Character::new("Tim", Archetype::Mage, &fate).with_starter_kit();
//!
//!     let mut session = DuelSession::new(left, right, fate);
//!     session.train(Side::Left, 3);
//!     let report = session.duel();
//!     println!("{}", report.narrative);
//! }
//! ```

pub mod archetype_data;
pub mod bots;
pub mod fate;
pub mod items;
pub mod persist;
pub mod rules;
pub mod session;
pub mod testing;
pub mod world;

// Primary public API
pub use bots::Bot;
pub use fate::{FateTable, RollMode};
pub use items::{default_item, starter_kit, Item, ItemId, ItemKind};
pub use persist::{PersistError, Roster, SavedRoster};
pub use rules::{
    apply_effect, apply_effects, Effect, Intent, Resolution, RulesEngine, TrainingVerdict, Verdict,
};
pub use session::{DuelReport, DuelSession, TrainingSummary};
pub use world::{
    create_sample_duelist, Archetype, Arena, Character, CharacterId, EquipError, EquipOutcome,
    Opponent, Side, StatBlock,
};
