//! The combat rules engine.
//!
//! Intents describe what should happen in the arena; the stateless
//! [`RulesEngine`] resolves each intent against the current state into a
//! [`Resolution`] — a list of concrete [`Effect`]s plus a narrative line —
//! and [`apply_effect`] writes the effects back. Effects carry the resulting
//! values, so applying them never re-runs rules or randomness.
//!
//! Invalid intents (equipping a conflicting item, striking with no training
//! encounter underway) resolve to an empty effect list with an explanatory
//! narrative; the engine itself never fails.

use crate::bots::Bot;
use crate::items::{Item, ItemId};
use crate::world::{
    Arena, EquipOutcome, Opponent, Side, StatBlock, TrainingEncounter,
};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// What a caller wants to happen in the arena.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Intent {
    /// Put an inventory item on one duelist.
    EquipItem { side: Side, item: ItemId },

    /// Take an equipped item off one duelist.
    UnequipItem { side: Side, item: ItemId },

    /// Grant the one-time 15% damage bonus to whichever side has the
    /// archetype advantage, if either does.
    MatchupBoost,

    /// One simultaneous strike pair between the two duelists.
    Exchange,

    /// Check for a terminal duel outcome after an exchange.
    CheckWinner,

    /// Restore both duelists to the pre-training snapshot.
    RestoreSnapshot,

    /// Begin a training encounter: scale the bot against the challenger's
    /// level and put it in the arena.
    StartTraining { side: Side, bot: Bot },

    /// One strike pair between the training challenger and the bot.
    TrainingRound,

    /// Check for a terminal training outcome after a round.
    TrainingWinner,
}

/// How a duel ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    LeftWins,
    RightWins,
    Draw,
}

/// How a training encounter ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrainingVerdict {
    CharacterWins,
    BotWins,
    Draw,
}

/// A concrete state change to apply to the arena.
///
/// Every variant carries the resulting value rather than a delta.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Effect {
    /// An item went on; the wearer's stats are now `stats`.
    ItemEquipped {
        side: Side,
        item: ItemId,
        stats: StatBlock,
    },

    /// An item came off; the wearer's stats are now `stats`.
    ItemUnequipped {
        side: Side,
        item: ItemId,
        stats: StatBlock,
    },

    /// The matchup bonus landed on one side.
    DamageBoosted { side: Side, new_damage: f64 },

    /// A strike was absorbed; the defender's stats are now `stats`.
    StatsChanged { side: Side, stats: StatBlock },

    /// The training bot took a hit.
    BotDamaged { new_health: f64 },

    /// A side was reset to its pre-training snapshot.
    StatsRestored { side: Side, stats: StatBlock },

    /// Experience was awarded.
    ExperienceGained {
        side: Side,
        amount: f64,
        new_total: f64,
    },

    /// Experience was zeroed (the loser's fate).
    ExperienceReset { side: Side },

    /// 100 experience converted into a level.
    LevelGained {
        side: Side,
        new_level: u32,
        new_experience: f64,
    },

    /// The winner's permanent level-scaled stat growth.
    WinBoostApplied { side: Side, stats: StatBlock },

    /// A defeated bot dropped loot into the winner's inventory.
    ItemDropped { side: Side, item: Item },

    /// A training encounter began.
    TrainingStarted { side: Side, bot: Bot },

    /// The training encounter is over; the bot is gone.
    TrainingEnded {
        side: Side,
        verdict: TrainingVerdict,
    },

    /// The duel reached a terminal outcome.
    DuelEnded { verdict: Verdict },
}

/// The result of resolving an intent.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub effects: Vec<Effect>,
    pub narrative: String,
}

impl Resolution {
    pub fn new(narrative: impl Into<String>) -> Self {
        Self {
            effects: Vec::new(),
            narrative: narrative.into(),
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }

    /// The duel verdict, if this resolution ended the duel.
    pub fn duel_verdict(&self) -> Option<Verdict> {
        self.effects.iter().find_map(|e| match e {
            Effect::DuelEnded { verdict } => Some(*verdict),
            _ => None,
        })
    }

    /// The training verdict, if this resolution ended the encounter.
    pub fn training_verdict(&self) -> Option<TrainingVerdict> {
        self.effects.iter().find_map(|e| match e {
            Effect::TrainingEnded { verdict, .. } => Some(*verdict),
            _ => None,
        })
    }
}

/// Absorb one strike into a defender's stat block.
///
/// A strike weaker than the shield only grinds the shield down; anything
/// else zeroes the shield and the excess comes out of health.
fn absorb_strike(strike: f64, defender: StatBlock) -> StatBlock {
    if strike < defender.shield {
        StatBlock {
            shield: defender.shield - strike,
            ..defender
        }
    } else {
        StatBlock {
            shield: 0.0,
            health: defender.health - (strike - defender.shield),
            ..defender
        }
    }
}

/// Stateless resolver for arena intents.
pub struct RulesEngine;

impl RulesEngine {
    pub fn new() -> Self {
        RulesEngine
    }

    /// Resolve an intent with the thread-local RNG.
    pub fn resolve(&self, arena: &Arena, intent: Intent) -> Resolution {
        self.resolve_with_rng(arena, intent, &mut rand::thread_rng())
    }

    /// Resolve with a specific RNG (useful for testing; only loot picks
    /// consume randomness).
    pub fn resolve_with_rng<R: Rng>(
        &self,
        arena: &Arena,
        intent: Intent,
        rng: &mut R,
    ) -> Resolution {
        tracing::trace!(?intent, "resolving intent");
        match intent {
            Intent::EquipItem { side, item } => self.resolve_equip(arena, side, item),
            Intent::UnequipItem { side, item } => self.resolve_unequip(arena, side, item),
            Intent::MatchupBoost => self.resolve_matchup(arena),
            Intent::Exchange => self.resolve_exchange(arena),
            Intent::CheckWinner => self.resolve_check_winner(arena),
            Intent::RestoreSnapshot => self.resolve_restore(arena),
            Intent::StartTraining { side, bot } => self.resolve_start_training(arena, side, bot),
            Intent::TrainingRound => self.resolve_training_round(arena),
            Intent::TrainingWinner => self.resolve_training_winner(arena, rng),
        }
    }

    fn resolve_equip(&self, arena: &Arena, side: Side, id: ItemId) -> Resolution {
        let character = arena.duelist(side);
        let mut probe = character.clone();
        match probe.equip(id) {
            Ok(EquipOutcome::Equipped(stats)) => {
                let item_name = character
                    .inventory
                    .get(id)
                    .map(|i| i.name.as_str())
                    .unwrap_or("item");
                Resolution::new(format!("{} puts on the {}.", character.name, item_name))
                    .with_effect(Effect::ItemEquipped {
                        side,
                        item: id,
                        stats,
                    })
            }
            Ok(EquipOutcome::SlotOccupied) => Resolution::new(format!(
                "{} already wears something in that slot.",
                character.name
            )),
            Err(err) => Resolution::new(err.to_string()),
        }
    }

    fn resolve_unequip(&self, arena: &Arena, side: Side, id: ItemId) -> Resolution {
        let character = arena.duelist(side);
        let mut probe = character.clone();
        match probe.unequip(id) {
            Ok(stats) => {
                let item_name = character
                    .inventory
                    .get(id)
                    .map(|i| i.name.as_str())
                    .unwrap_or("item");
                Resolution::new(format!("{} takes off the {}.", character.name, item_name))
                    .with_effect(Effect::ItemUnequipped {
                        side,
                        item: id,
                        stats,
                    })
            }
            Err(err) => Resolution::new(err.to_string()),
        }
    }

    fn resolve_matchup(&self, arena: &Arena) -> Resolution {
        let boosted_side = if arena.left.archetype.prey() == arena.right.archetype {
            Some(Side::Left)
        } else if arena.right.archetype.prey() == arena.left.archetype {
            Some(Side::Right)
        } else {
            None
        };

        match boosted_side {
            Some(side) => {
                let advantaged = arena.duelist(side);
                let rival = arena.duelist(side.other());
                let mut preview = advantaged.clone();
                preview.apply_matchup_bonus();
                Resolution::new(format!(
                    "{} the {} has the edge over {} the {}: damage rises to {:.1}.",
                    advantaged.name,
                    advantaged.archetype,
                    rival.name,
                    rival.archetype,
                    preview.stats.damage
                ))
                .with_effect(Effect::DamageBoosted {
                    side,
                    new_damage: preview.stats.damage,
                })
            }
            None => Resolution::new("Neither side has the matchup advantage."),
        }
    }

    fn resolve_exchange(&self, arena: &Arena) -> Resolution {
        // Both strikes are computed from pre-exchange stats, then absorbed
        // against pre-exchange shields: the pair lands simultaneously.
        let left_strike = arena.left.strike_damage();
        let right_strike = arena.right.strike_damage();
        let left_after = absorb_strike(right_strike, arena.left.stats);
        let right_after = absorb_strike(left_strike, arena.right.stats);

        Resolution::new(format!(
            "{} strikes for {:.1}; {} strikes for {:.1}.",
            arena.left.name, left_strike, arena.right.name, right_strike
        ))
        .with_effects([
            Effect::StatsChanged {
                side: Side::Left,
                stats: left_after,
            },
            Effect::StatsChanged {
                side: Side::Right,
                stats: right_after,
            },
        ])
    }

    fn resolve_restore(&self, arena: &Arena) -> Resolution {
        Resolution::new("Both duelists recover to their pre-training form.").with_effects([
            Effect::StatsRestored {
                side: Side::Left,
                stats: arena.snapshot_of(Side::Left),
            },
            Effect::StatsRestored {
                side: Side::Right,
                stats: arena.snapshot_of(Side::Right),
            },
        ])
    }

    fn resolve_check_winner(&self, arena: &Arena) -> Resolution {
        match (arena.left.is_defeated(), arena.right.is_defeated()) {
            (false, false) => Resolution::new("Both duelists are still standing."),
            (false, true) => self.resolve_decisive(arena, Side::Left),
            (true, false) => self.resolve_decisive(arena, Side::Right),
            (true, true) => Resolution::new("Both characters lost.").with_effects([
                Effect::StatsRestored {
                    side: Side::Left,
                    stats: arena.snapshot_of(Side::Left),
                },
                Effect::StatsRestored {
                    side: Side::Right,
                    stats: arena.snapshot_of(Side::Right),
                },
                Effect::ExperienceReset { side: Side::Left },
                Effect::ExperienceReset { side: Side::Right },
                Effect::DuelEnded {
                    verdict: Verdict::Draw,
                },
            ]),
        }
    }

    fn resolve_decisive(&self, arena: &Arena, winner: Side) -> Resolution {
        let loser = winner.other();
        let champion = arena.duelist(winner);
        let defeated = arena.duelist(loser);

        // Walk a copy of the winner through the full reward sequence; the
        // effects then carry its final numbers.
        let mut preview = champion.clone();
        preview.stats = arena.snapshot_of(winner);
        let gained = preview.experience_after(Opponent::Level(defeated.level)) - preview.experience;
        preview.add_experience(Opponent::Level(defeated.level));
        let level_before = preview.level;
        let experience_total = preview.experience;
        preview.level_up();
        preview.apply_win_boost();

        let verdict = match winner {
            Side::Left => Verdict::LeftWins,
            Side::Right => Verdict::RightWins,
        };

        let mut resolution = Resolution::new(format!("The winner: \n{preview}")).with_effects([
            Effect::StatsRestored {
                side: loser,
                stats: arena.snapshot_of(loser),
            },
            Effect::StatsRestored {
                side: winner,
                stats: arena.snapshot_of(winner),
            },
            Effect::ExperienceGained {
                side: winner,
                amount: gained,
                new_total: experience_total,
            },
        ]);
        if preview.level > level_before {
            resolution = resolution.with_effect(Effect::LevelGained {
                side: winner,
                new_level: preview.level,
                new_experience: preview.experience,
            });
        }
        resolution.with_effects([
            Effect::WinBoostApplied {
                side: winner,
                stats: preview.stats,
            },
            Effect::ExperienceReset { side: loser },
            Effect::DuelEnded { verdict },
        ])
    }

    fn resolve_start_training(&self, arena: &Arena, side: Side, mut bot: Bot) -> Resolution {
        if arena.training.is_some() {
            return Resolution::new("A training encounter is already underway.");
        }
        let challenger = arena.duelist(side);
        bot.scale_to(challenger.level);
        let narrative = format!(
            "{} heads into the forest. A bot steps out: {:.1} health, {:.1} damage.",
            challenger.name, bot.health, bot.damage
        );
        Resolution::new(narrative).with_effect(Effect::TrainingStarted { side, bot })
    }

    fn resolve_training_round(&self, arena: &Arena) -> Resolution {
        let Some(encounter) = &arena.training else {
            return Resolution::new("There is no training encounter underway.");
        };
        let challenger = arena.duelist(encounter.side);

        // Same simultaneity as a duel exchange, but one-directional rules:
        // the bot has no shield, so the challenger's strike hits its health
        // directly, while the bot's strike goes through shield absorption.
        let challenger_strike = challenger.strike_damage();
        let bot_strike = encounter.bot.damage;
        let challenger_after = absorb_strike(bot_strike, challenger.stats);
        let bot_health_after = encounter.bot.health - challenger_strike;

        Resolution::new(format!(
            "{} hits the bot for {:.1}; the bot hits back for {:.1}.",
            challenger.name, challenger_strike, bot_strike
        ))
        .with_effects([
            Effect::StatsChanged {
                side: encounter.side,
                stats: challenger_after,
            },
            Effect::BotDamaged {
                new_health: bot_health_after,
            },
        ])
    }

    fn resolve_training_winner<R: Rng>(&self, arena: &Arena, rng: &mut R) -> Resolution {
        let Some(encounter) = &arena.training else {
            return Resolution::new("There is no training encounter underway.");
        };
        let side = encounter.side;
        let challenger = arena.duelist(side);

        match (challenger.is_defeated(), encounter.bot.is_defeated()) {
            (false, false) => Resolution::new("The training bout continues."),
            (false, true) => {
                let mut preview = challenger.clone();
                let gained = preview.experience_after(Opponent::Bot) - preview.experience;
                preview.add_experience(Opponent::Bot);
                let level_before = preview.level;
                let experience_total = preview.experience;
                preview.level_up();

                let prize = encounter.bot.drop_item_with_rng(rng);
                let narrative = match &prize {
                    Some(item) => format!(
                        "Congrats! You kicked bot's ass! You picked up a new item: {}.",
                        item.name
                    ),
                    None => "Congrats! You kicked bot's ass!".to_string(),
                };

                let mut resolution = Resolution::new(narrative).with_effect(
                    Effect::ExperienceGained {
                        side,
                        amount: gained,
                        new_total: experience_total,
                    },
                );
                if preview.level > level_before {
                    resolution = resolution.with_effect(Effect::LevelGained {
                        side,
                        new_level: preview.level,
                        new_experience: preview.experience,
                    });
                }
                if let Some(item) = prize {
                    resolution = resolution.with_effect(Effect::ItemDropped { side, item });
                }
                resolution.with_effect(Effect::TrainingEnded {
                    side,
                    verdict: TrainingVerdict::CharacterWins,
                })
            }
            (true, false) => Resolution::new("You lost to the bot. Loser.").with_effects([
                Effect::ExperienceReset { side },
                Effect::TrainingEnded {
                    side,
                    verdict: TrainingVerdict::BotWins,
                },
            ]),
            (true, true) => Resolution::new("Both characters lost.").with_effects([
                Effect::ExperienceReset { side },
                Effect::TrainingEnded {
                    side,
                    verdict: TrainingVerdict::Draw,
                },
            ]),
        }
    }
}

impl Default for RulesEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply a batch of effects in order.
pub fn apply_effects(arena: &mut Arena, effects: &[Effect]) {
    for effect in effects {
        apply_effect(arena, effect);
    }
}

/// Apply a single effect to the arena.
pub fn apply_effect(arena: &mut Arena, effect: &Effect) {
    match effect {
        Effect::ItemEquipped { side, item, stats } => {
            let character = arena.duelist_mut(*side);
            if let Some(owned) = character.inventory.get_mut(*item) {
                owned.equipped = true;
                let kind = owned.kind;
                *character.equipment.slot_mut(kind) = Some(*item);
                character.stats = *stats;
            }
        }
        Effect::ItemUnequipped { side, item, stats } => {
            let character = arena.duelist_mut(*side);
            if let Some(owned) = character.inventory.get_mut(*item) {
                owned.equipped = false;
                let kind = owned.kind;
                *character.equipment.slot_mut(kind) = None;
                character.stats = *stats;
            }
        }
        Effect::DamageBoosted { side, new_damage } => {
            arena.duelist_mut(*side).stats.damage = *new_damage;
        }
        Effect::StatsChanged { side, stats }
        | Effect::StatsRestored { side, stats }
        | Effect::WinBoostApplied { side, stats } => {
            arena.duelist_mut(*side).stats = *stats;
        }
        Effect::BotDamaged { new_health } => {
            if let Some(encounter) = arena.training.as_mut() {
                encounter.bot.health = *new_health;
            }
        }
        Effect::ExperienceGained {
            side, new_total, ..
        } => {
            arena.duelist_mut(*side).experience = *new_total;
        }
        Effect::ExperienceReset { side } => {
            arena.duelist_mut(*side).drop_experience();
        }
        Effect::LevelGained {
            side,
            new_level,
            new_experience,
        } => {
            let character = arena.duelist_mut(*side);
            character.level = *new_level;
            character.experience = *new_experience;
        }
        Effect::ItemDropped { side, item } => {
            arena.duelist_mut(*side).inventory.add_item(item.clone());
        }
        Effect::TrainingStarted { side, bot } => {
            arena.training = Some(TrainingEncounter {
                side: *side,
                bot: bot.clone(),
            });
        }
        Effect::TrainingEnded { .. } => {
            arena.training = None;
        }
        Effect::DuelEnded { .. } => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fate::FateTable;
    use crate::items::ItemKind;
    use crate::world::{create_sample_duelist, Archetype};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const EPS: f64 = 1e-6;

    fn sample_arena() -> Arena {
        Arena::new(
            create_sample_duelist("Conan", Archetype::Warrior),
            create_sample_duelist("Tim", Archetype::Mage),
        )
    }

    #[test]
    fn test_weak_strike_only_grinds_the_shield() {
        let after = absorb_strike(30.0, StatBlock::new(100.0, 50.0, 10.0));
        assert_eq!(after.shield, 20.0);
        assert_eq!(after.health, 100.0);
    }

    #[test]
    fn test_strike_equal_to_shield_zeroes_it_without_health_loss() {
        let after = absorb_strike(50.0, StatBlock::new(100.0, 50.0, 10.0));
        assert_eq!(after.shield, 0.0);
        assert_eq!(after.health, 100.0);
    }

    #[test]
    fn test_excess_strike_spills_into_health() {
        let after = absorb_strike(80.0, StatBlock::new(100.0, 50.0, 10.0));
        assert_eq!(after.shield, 0.0);
        assert_eq!(after.health, 70.0);
    }

    #[test]
    fn test_exchange_uses_pre_exchange_values_for_both_sides() {
        let mut arena = sample_arena();
        let engine = RulesEngine::new();

        let resolution = engine.resolve(&arena, Intent::Exchange);
        apply_effects(&mut arena, &resolution.effects);

        // Warrior takes 130 into a 200 shield; Mage takes 120 into a 150
        // shield. Neither strike sees the other's outcome.
        assert!((arena.left.stats.shield - 70.0).abs() < EPS);
        assert_eq!(arena.left.stats.health, 1200.0);
        assert!((arena.right.stats.shield - 30.0).abs() < EPS);
        assert_eq!(arena.right.stats.health, 800.0);
    }

    #[test]
    fn test_matchup_boost_is_direction_specific() {
        let engine = RulesEngine::new();

        // Warrior (left) preys on Mage (right).
        let mut arena = sample_arena();
        let resolution = engine.resolve(&arena, Intent::MatchupBoost);
        apply_effects(&mut arena, &resolution.effects);
        assert!((arena.left.stats.damage - 138.0).abs() < EPS);
        assert_eq!(arena.right.stats.damage, 130.0);

        // Swapped seats: the Warrior still gets it, now as the right side.
        let mut swapped = Arena::new(
            create_sample_duelist("Tim", Archetype::Mage),
            create_sample_duelist("Conan", Archetype::Warrior),
        );
        let resolution = engine.resolve(&swapped, Intent::MatchupBoost);
        apply_effects(&mut swapped, &resolution.effects);
        assert_eq!(swapped.left.stats.damage, 130.0);
        assert!((swapped.right.stats.damage - 138.0).abs() < EPS);
    }

    #[test]
    fn test_mirror_and_neutral_matchups_grant_nothing() {
        let engine = RulesEngine::new();

        let mirror = Arena::new(
            create_sample_duelist("A", Archetype::Rogue),
            create_sample_duelist("B", Archetype::Rogue),
        );
        let resolution = engine.resolve(&mirror, Intent::MatchupBoost);
        assert!(resolution.effects.is_empty());

        // Warrior vs Rogue: adjacent in neither direction of the cycle.
        let neutral = Arena::new(
            create_sample_duelist("A", Archetype::Warrior),
            create_sample_duelist("B", Archetype::Rogue),
        );
        let resolution = engine.resolve(&neutral, Intent::MatchupBoost);
        assert!(resolution.effects.is_empty());
    }

    #[test]
    fn test_full_advantage_cycle_boosts_exactly_one_side() {
        let engine = RulesEngine::new();
        let winners = [
            (Archetype::Warrior, Archetype::Mage),
            (Archetype::Mage, Archetype::Rogue),
            (Archetype::Rogue, Archetype::Paladin),
            (Archetype::Paladin, Archetype::Warrior),
        ];
        for (strong, weak) in winners {
            let arena = Arena::new(
                create_sample_duelist("A", strong),
                create_sample_duelist("B", weak),
            );
            let resolution = engine.resolve(&arena, Intent::MatchupBoost);
            assert_eq!(resolution.effects.len(), 1);
            assert!(matches!(
                resolution.effects[0],
                Effect::DamageBoosted {
                    side: Side::Left,
                    ..
                }
            ));
        }
    }

    #[test]
    fn test_check_winner_loops_while_both_stand() {
        let arena = sample_arena();
        let engine = RulesEngine::new();
        let resolution = engine.resolve(&arena, Intent::CheckWinner);
        assert!(resolution.effects.is_empty());
        assert!(resolution.duel_verdict().is_none());
    }

    #[test]
    fn test_decisive_win_restores_rewards_and_resets() {
        let mut arena = sample_arena();
        let engine = RulesEngine::new();

        // Leave the mage dead and the warrior scarred from the fight.
        arena.left.stats = StatBlock::new(400.0, 0.0, 138.0);
        arena.right.stats = StatBlock::new(-16.0, 0.0, 130.0);
        arena.right.experience = 55.0;

        let resolution = engine.resolve(&arena, Intent::CheckWinner);
        assert_eq!(resolution.duel_verdict(), Some(Verdict::LeftWins));
        assert!(resolution.narrative.starts_with("The winner: \nWarrior"));
        apply_effects(&mut arena, &resolution.effects);

        // Winner: restored to the snapshot, then grown 1% for level 1.
        assert!((arena.left.stats.health - 1212.0).abs() < EPS);
        assert!((arena.left.stats.shield - 202.0).abs() < EPS);
        assert!((arena.left.stats.damage - 121.2).abs() < EPS);
        assert_eq!(arena.left.experience, 20.0);
        assert_eq!(arena.left.level, 1);

        // Loser: restored and zeroed.
        assert_eq!(arena.right.stats, arena.snapshot_of(Side::Right));
        assert_eq!(arena.right.experience, 0.0);
    }

    #[test]
    fn test_win_over_a_stronger_opponent_pays_the_level_bonus() {
        let mut arena = sample_arena();
        arena.right.level = 3;
        arena.right.stats.health = -1.0;
        let engine = RulesEngine::new();

        let resolution = engine.resolve(&arena, Intent::CheckWinner);
        apply_effects(&mut arena, &resolution.effects);
        // 20 flat, then (3-1)/10 on top of the total.
        assert!((arena.left.experience - 24.0).abs() < EPS);
    }

    #[test]
    fn test_winner_levels_up_when_experience_allows() {
        let mut arena = sample_arena();
        arena.left.experience = 90.0;
        arena.right.stats.health = -1.0;
        let engine = RulesEngine::new();

        let resolution = engine.resolve(&arena, Intent::CheckWinner);
        apply_effects(&mut arena, &resolution.effects);

        assert_eq!(arena.left.level, 2);
        assert!((arena.left.experience - 10.0).abs() < EPS);
        // Win boost scales with the new level: 2%.
        assert!((arena.left.stats.health - 1224.0).abs() < EPS);
    }

    #[test]
    fn test_draw_restores_both_and_zeroes_both() {
        let mut arena = sample_arena();
        arena.left.stats.health = 0.0;
        arena.right.stats.health = -3.0;
        arena.left.experience = 40.0;
        arena.right.experience = 60.0;
        let engine = RulesEngine::new();

        let resolution = engine.resolve(&arena, Intent::CheckWinner);
        assert_eq!(resolution.duel_verdict(), Some(Verdict::Draw));
        assert_eq!(resolution.narrative, "Both characters lost.");
        apply_effects(&mut arena, &resolution.effects);

        assert_eq!(arena.left.stats, arena.snapshot_of(Side::Left));
        assert_eq!(arena.right.stats, arena.snapshot_of(Side::Right));
        assert_eq!(arena.left.experience, 0.0);
        assert_eq!(arena.right.experience, 0.0);
    }

    #[test]
    fn test_restore_snapshot_heals_training_scars() {
        let mut arena = sample_arena();
        arena.left.stats.health = 12.0;
        arena.right.stats.shield = 0.0;
        let engine = RulesEngine::new();

        let resolution = engine.resolve(&arena, Intent::RestoreSnapshot);
        apply_effects(&mut arena, &resolution.effects);
        assert_eq!(arena.left.stats, arena.snapshot_of(Side::Left));
        assert_eq!(arena.right.stats, arena.snapshot_of(Side::Right));
    }

    #[test]
    fn test_start_training_scales_the_bot_once() {
        let mut arena = sample_arena();
        arena.left.level = 4;
        let engine = RulesEngine::new();

        let bot = Bot::new(&FateTable::none());
        let resolution = engine.resolve(
            &arena,
            Intent::StartTraining {
                side: Side::Left,
                bot,
            },
        );
        apply_effects(&mut arena, &resolution.effects);

        let encounter = arena.training.as_ref().unwrap();
        assert_eq!(encounter.side, Side::Left);
        assert!((encounter.bot.health - 420.0).abs() < EPS);
        assert!((encounter.bot.damage - 21.0).abs() < EPS);

        // A second encounter cannot start while one is underway.
        let resolution = engine.resolve(
            &arena,
            Intent::StartTraining {
                side: Side::Right,
                bot: Bot::new(&FateTable::none()),
            },
        );
        assert!(resolution.effects.is_empty());
    }

    #[test]
    fn test_training_round_is_one_directional() {
        let mut arena = sample_arena();
        let engine = RulesEngine::new();
        let resolution = engine.resolve(
            &arena,
            Intent::StartTraining {
                side: Side::Left,
                bot: Bot::new(&FateTable::none()),
            },
        );
        apply_effects(&mut arena, &resolution.effects);

        let resolution = engine.resolve(&arena, Intent::TrainingRound);
        apply_effects(&mut arena, &resolution.effects);

        // Bot (scaled to level 1: 330 health, 16.5 damage) loses straight
        // health; the challenger's shield absorbs the bot's strike.
        let encounter = arena.training.as_ref().unwrap();
        assert!((encounter.bot.health - 210.0).abs() < EPS);
        assert!((arena.left.stats.shield - 183.5).abs() < EPS);
        assert_eq!(arena.left.stats.health, 1200.0);
    }

    #[test]
    fn test_training_round_without_encounter_is_a_noop() {
        let arena = sample_arena();
        let engine = RulesEngine::new();
        let resolution = engine.resolve(&arena, Intent::TrainingRound);
        assert!(resolution.effects.is_empty());
        let resolution = engine.resolve(&arena, Intent::TrainingWinner);
        assert!(resolution.effects.is_empty());
    }

    #[test]
    fn test_training_victory_awards_four_xp_and_may_drop_loot() {
        let mut arena = sample_arena();
        let engine = RulesEngine::new();
        let mut rng = StdRng::seed_from_u64(17);

        let resolution = engine.resolve_with_rng(
            &arena,
            Intent::StartTraining {
                side: Side::Left,
                bot: Bot::new_with_rng(&FateTable::certain(), &mut rng),
            },
            &mut rng,
        );
        apply_effects(&mut arena, &resolution.effects);
        arena.training.as_mut().unwrap().bot.health = -5.0;

        let items_before = arena.left.inventory.len();
        let resolution = engine.resolve_with_rng(&arena, Intent::TrainingWinner, &mut rng);
        assert_eq!(
            resolution.training_verdict(),
            Some(TrainingVerdict::CharacterWins)
        );
        assert!(resolution.narrative.starts_with("Congrats!"));
        apply_effects(&mut arena, &resolution.effects);

        assert_eq!(arena.left.experience, 4.0);
        assert_eq!(arena.left.inventory.len(), items_before + 1);
        assert!(arena.training.is_none());
    }

    #[test]
    fn test_training_defeat_and_draw_zero_experience() {
        let engine = RulesEngine::new();

        let mut arena = sample_arena();
        arena.left.experience = 44.0;
        arena.training = Some(TrainingEncounter {
            side: Side::Left,
            bot: Bot::new(&FateTable::none()),
        });
        arena.left.stats.health = -10.0;
        let resolution = engine.resolve(&arena, Intent::TrainingWinner);
        assert_eq!(resolution.training_verdict(), Some(TrainingVerdict::BotWins));
        apply_effects(&mut arena, &resolution.effects);
        assert_eq!(arena.left.experience, 0.0);
        assert!(arena.training.is_none());

        let mut arena = sample_arena();
        arena.left.experience = 44.0;
        let mut dead_bot = Bot::new(&FateTable::none());
        dead_bot.health = 0.0;
        arena.training = Some(TrainingEncounter {
            side: Side::Left,
            bot: dead_bot,
        });
        arena.left.stats.health = 0.0;
        let resolution = engine.resolve(&arena, Intent::TrainingWinner);
        assert_eq!(resolution.training_verdict(), Some(TrainingVerdict::Draw));
        apply_effects(&mut arena, &resolution.effects);
        assert_eq!(arena.left.experience, 0.0);
    }

    #[test]
    fn test_equip_intent_reports_conflicts_without_effects() {
        let mut arena = sample_arena();
        let engine = RulesEngine::new();

        let sword = arena
            .left
            .inventory
            .unequipped()
            .find(|i| i.kind == ItemKind::LeftHandWeapon)
            .unwrap()
            .id;
        let shield = arena
            .left
            .inventory
            .unequipped()
            .find(|i| i.kind == ItemKind::Shield)
            .unwrap()
            .id;

        let resolution = engine.resolve(
            &arena,
            Intent::EquipItem {
                side: Side::Left,
                item: sword,
            },
        );
        assert_eq!(resolution.effects.len(), 1);
        apply_effects(&mut arena, &resolution.effects);
        assert!((arena.left.stats.damage - 144.0).abs() < EPS);

        let resolution = engine.resolve(
            &arena,
            Intent::EquipItem {
                side: Side::Left,
                item: shield,
            },
        );
        assert!(resolution.effects.is_empty());
        assert_eq!(
            resolution.narrative,
            "You can't hold shield. Take off left hand weapon first."
        );
    }

    #[test]
    fn test_unequip_intent_round_trips_stats() {
        let mut arena = sample_arena();
        let engine = RulesEngine::new();
        let before = arena.right.stats;

        let ring = arena
            .right
            .inventory
            .unequipped()
            .find(|i| i.kind == ItemKind::Ring)
            .unwrap()
            .id;

        for intent in [
            Intent::EquipItem {
                side: Side::Right,
                item: ring,
            },
            Intent::UnequipItem {
                side: Side::Right,
                item: ring,
            },
        ] {
            let resolution = engine.resolve(&arena, intent);
            apply_effects(&mut arena, &resolution.effects);
        }

        assert!((arena.right.stats.health - before.health).abs() < EPS);
        assert!((arena.right.stats.shield - before.shield).abs() < EPS);
        assert!((arena.right.stats.damage - before.damage).abs() < EPS);
        assert!(!arena.right.inventory.get(ring).unwrap().equipped);
    }
}
