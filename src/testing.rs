//! Testing utilities.
//!
//! Everything random in the engine takes an `Rng`, so deterministic tests
//! are mostly a matter of seeding. This module adds the small amount of glue
//! on top: a seeded RNG constructor and a scripted intent runner that keeps
//! the narratives and effects it saw.

use crate::rules::{apply_effects, Effect, Intent, Resolution, RulesEngine};
use crate::world::{Arena, Side};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// A reproducible RNG for scripted scenarios.
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Runs scripted intents through the real engine, recording everything.
pub struct ScriptRunner {
    engine: RulesEngine,
    rng: StdRng,
    pub arena: Arena,
    /// Narratives in resolution order.
    pub narratives: Vec<String>,
    /// Every applied effect, flattened.
    pub effects: Vec<Effect>,
}

impl ScriptRunner {
    pub fn new(arena: Arena) -> Self {
        Self::with_seed(arena, 0)
    }

    pub fn with_seed(arena: Arena, seed: u64) -> Self {
        Self {
            engine: RulesEngine::new(),
            rng: seeded_rng(seed),
            arena,
            narratives: Vec::new(),
            effects: Vec::new(),
        }
    }

    /// Resolve and apply one intent.
    pub fn step(&mut self, intent: Intent) -> Resolution {
        let resolution = self
            .engine
            .resolve_with_rng(&self.arena, intent, &mut self.rng);
        apply_effects(&mut self.arena, &resolution.effects);
        self.narratives.push(resolution.narrative.clone());
        self.effects.extend(resolution.effects.iter().cloned());
        resolution
    }

    /// Resolve and apply a whole script in order.
    pub fn run(&mut self, intents: impl IntoIterator<Item = Intent>) {
        for intent in intents {
            self.step(intent);
        }
    }

    pub fn health_of(&self, side: Side) -> f64 {
        self.arena.duelist(side).stats.health
    }

    pub fn shield_of(&self, side: Side) -> f64 {
        self.arena.duelist(side).stats.shield
    }

    pub fn experience_of(&self, side: Side) -> f64 {
        self.arena.duelist(side).experience
    }
}
