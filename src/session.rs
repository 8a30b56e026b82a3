//! Programmatic duel sessions.
//!
//! [`DuelSession`] sequences engine calls for a complete match the way a
//! console front end would, minus the console: optional forest training per
//! side, snapshot restore, matchup boost, then exchanges until a verdict.
//! Callers feed it fully-formed inputs and read back narratives.

use crate::bots::Bot;
use crate::fate::FateTable;
use crate::rules::{apply_effects, Effect, Intent, Resolution, RulesEngine, TrainingVerdict, Verdict};
use crate::world::{Arena, Character, Side};
use rand::Rng;
use tracing::debug;

/// Tally of one side's training trip.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingSummary {
    pub encounters: u32,
    pub victories: u32,
    pub defeats: u32,
    pub draws: u32,
    /// Names of items looted from defeated bots.
    pub items_won: Vec<String>,
}

/// The outcome of a completed duel.
#[derive(Debug, Clone)]
pub struct DuelReport {
    pub verdict: Verdict,
    /// Number of full exchanges fought.
    pub rounds: u32,
    /// The closing narrative (the winner's sheet, or the draw notice).
    pub narrative: String,
}

/// Drives one match between two characters.
pub struct DuelSession {
    arena: Arena,
    engine: RulesEngine,
    fate: FateTable,
    history: Vec<String>,
}

impl DuelSession {
    /// Start a session. The arena snapshot is captured here, before any
    /// training can happen.
    pub fn new(left: Character, right: Character, fate: FateTable) -> Self {
        Self {
            arena: Arena::new(left, right),
            engine: RulesEngine::new(),
            fate,
            history: Vec::new(),
        }
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn duelist(&self, side: Side) -> &Character {
        self.arena.duelist(side)
    }

    /// Every narrative produced so far, in order.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Resolve and apply a single intent.
    pub fn submit(&mut self, intent: Intent) -> Resolution {
        self.submit_with_rng(intent, &mut rand::thread_rng())
    }

    pub fn submit_with_rng<R: Rng>(&mut self, intent: Intent, rng: &mut R) -> Resolution {
        let resolution = self.engine.resolve_with_rng(&self.arena, intent, rng);
        apply_effects(&mut self.arena, &resolution.effects);
        debug!(narrative = %resolution.narrative, effects = resolution.effects.len(), "intent applied");
        self.history.push(resolution.narrative.clone());
        resolution
    }

    /// Send one side to the forest for up to `encounters` bot fights, each
    /// against a freshly drawn bot, each fought to its end.
    pub fn train(&mut self, side: Side, encounters: u32) -> TrainingSummary {
        self.train_with_rng(side, encounters, &mut rand::thread_rng())
    }

    pub fn train_with_rng<R: Rng>(
        &mut self,
        side: Side,
        encounters: u32,
        rng: &mut R,
    ) -> TrainingSummary {
        let mut summary = TrainingSummary::default();
        for _ in 0..encounters {
            let bot = Bot::new_with_rng(&self.fate, rng);
            self.submit_with_rng(Intent::StartTraining { side, bot }, rng);
            let verdict = loop {
                self.submit_with_rng(Intent::TrainingRound, rng);
                let resolution = self.submit_with_rng(Intent::TrainingWinner, rng);
                for effect in &resolution.effects {
                    if let Effect::ItemDropped { item, .. } = effect {
                        summary.items_won.push(item.name.clone());
                    }
                }
                if let Some(verdict) = resolution.training_verdict() {
                    break verdict;
                }
            };
            summary.encounters += 1;
            match verdict {
                TrainingVerdict::CharacterWins => summary.victories += 1,
                TrainingVerdict::BotWins => summary.defeats += 1,
                TrainingVerdict::Draw => summary.draws += 1,
            }
        }
        summary
    }

    /// Fight the main duel to its verdict.
    ///
    /// Training scars are healed first (snapshot restore), then the matchup
    /// bonus lands, then exchanges run until a terminal outcome. The final
    /// winner check restores the snapshot again, so the bonus and all duel
    /// damage are transient; only experience, levels, the win boost, and
    /// looted items persist.
    pub fn duel(&mut self) -> DuelReport {
        self.duel_with_rng(&mut rand::thread_rng())
    }

    pub fn duel_with_rng<R: Rng>(&mut self, rng: &mut R) -> DuelReport {
        self.submit_with_rng(Intent::RestoreSnapshot, rng);
        self.submit_with_rng(Intent::MatchupBoost, rng);

        let mut rounds = 0;
        loop {
            self.submit_with_rng(Intent::Exchange, rng);
            rounds += 1;
            let resolution = self.submit_with_rng(Intent::CheckWinner, rng);
            if let Some(verdict) = resolution.duel_verdict() {
                debug!(?verdict, rounds, "duel finished");
                return DuelReport {
                    verdict,
                    rounds,
                    narrative: resolution.narrative,
                };
            }
        }
    }

    /// Tear the session down, handing the duelists back for persistence.
    pub fn into_duelists(self) -> (Character, Character) {
        (self.arena.left, self.arena.right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{create_sample_duelist, Archetype};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const EPS: f64 = 1e-6;

    fn sample_session() -> DuelSession {
        DuelSession::new(
            create_sample_duelist("Conan", Archetype::Warrior),
            create_sample_duelist("Tim", Archetype::Mage),
            FateTable::none(),
        )
    }

    #[test]
    fn test_duel_runs_to_a_verdict() {
        let mut session = sample_session();
        let report = session.duel_with_rng(&mut StdRng::seed_from_u64(1));

        // A 138-damage warrior grinds a 150+800 mage down in seven
        // exchanges; the mage never gets through 1200+200 in time.
        assert_eq!(report.verdict, Verdict::LeftWins);
        assert_eq!(report.rounds, 7);
        assert!(report.narrative.starts_with("The winner: \nWarrior"));

        let winner = session.duelist(Side::Left);
        assert!((winner.stats.health - 1212.0).abs() < EPS);
        assert_eq!(winner.experience, 20.0);
        let loser = session.duelist(Side::Right);
        assert_eq!(loser.stats.health, 800.0);
        assert_eq!(loser.experience, 0.0);
    }

    #[test]
    fn test_training_losses_do_not_leak_into_the_duel() {
        let mut session = sample_session();
        let mut rng = StdRng::seed_from_u64(2);

        let summary = session.train_with_rng(Side::Left, 3, &mut rng);
        assert_eq!(summary.encounters, 3);
        assert_eq!(summary.victories, 3);
        // Level-1 bots (330 health, 16.5 damage) die before they can take a
        // level-1 warrior down.
        assert_eq!(session.duelist(Side::Left).experience, 12.0);
        assert!(session.duelist(Side::Left).stats.shield < 200.0);

        let report = session.duel_with_rng(&mut rng);
        assert_eq!(report.verdict, Verdict::LeftWins);
        // Same seven rounds as an untrained duel: the snapshot restore wiped
        // the training scars before the first exchange.
        assert_eq!(report.rounds, 7);
    }

    #[test]
    fn test_training_with_guaranteed_drops_collects_loot() {
        let mut session = DuelSession::new(
            create_sample_duelist("Conan", Archetype::Warrior),
            create_sample_duelist("Tim", Archetype::Mage),
            FateTable::certain(),
        );
        let mut rng = StdRng::seed_from_u64(3);

        let items_before = session.duelist(Side::Left).inventory.len();
        let summary = session.train_with_rng(Side::Left, 2, &mut rng);
        assert_eq!(summary.items_won.len(), 2);
        assert_eq!(
            session.duelist(Side::Left).inventory.len(),
            items_before + 2
        );
    }

    #[test]
    fn test_history_records_every_narrative() {
        let mut session = sample_session();
        session.duel_with_rng(&mut StdRng::seed_from_u64(4));
        // Restore + matchup + 7 * (exchange + check).
        assert_eq!(session.history().len(), 16);
        assert!(session.history()[1].contains("has the edge over"));
    }

    #[test]
    fn test_into_duelists_hands_back_the_characters() {
        let mut session = sample_session();
        session.duel_with_rng(&mut StdRng::seed_from_u64(5));
        let (left, right) = session.into_duelists();
        assert_eq!(left.name, "Conan");
        assert_eq!(right.name, "Tim");
    }
}
