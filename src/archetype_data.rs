//! Base stats for each duelist archetype.
//!
//! Creation-time data only: the values a character is born with before any
//! equipment, training, or win boosts touch them.

use crate::world::Archetype;

/// Archetype-specific data fixed at character creation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArchetypeData {
    /// Starting health points.
    pub base_health: f64,
    /// Starting damage per strike.
    pub base_damage: f64,
    /// Starting shield points.
    pub base_shield: f64,
    /// Probability of being born fatal-strike capable.
    pub fatal_chance: f64,
    /// Flat damage added to every strike of a fatal-capable character.
    pub fatal_damage: f64,
}

impl Archetype {
    /// Get the creation data for this archetype.
    pub fn data(&self) -> ArchetypeData {
        match self {
            Archetype::Warrior => ArchetypeData {
                base_health: 1200.0,
                base_damage: 120.0,
                base_shield: 200.0,
                fatal_chance: 0.10,
                fatal_damage: 400.0,
            },
            Archetype::Paladin => ArchetypeData {
                base_health: 1100.0,
                base_damage: 115.0,
                base_shield: 180.0,
                fatal_chance: 0.12,
                fatal_damage: 350.0,
            },
            Archetype::Mage => ArchetypeData {
                base_health: 800.0,
                base_damage: 130.0,
                base_shield: 150.0,
                fatal_chance: 0.15,
                fatal_damage: 250.0,
            },
            Archetype::Rogue => ArchetypeData {
                base_health: 1000.0,
                base_damage: 110.0,
                base_shield: 100.0,
                fatal_chance: 0.20,
                fatal_damage: 200.0,
            },
        }
    }
}
