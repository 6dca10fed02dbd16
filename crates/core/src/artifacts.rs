//! Artifacts module - passive modifiers acquired from rewards
//!
//! Each artifact maps to exactly one [`ArtifactEffect`]. The resolution loop
//! consults the owned set once per step through a fixed dispatch on the
//! effect kind:
//!
//! 1. multiplicative score boosts (percentages of all passing gates summed)
//! 2. additive score boosts
//! 3. exact-combo bonuses (points and/or moves)
//! 4. gambles, applied last to the fully boosted step score
//!
//! Tile-scoped effects (tier mutation) are rolled per tile by the caller.
//! Item, shuffle and periodic effects are queried through accessors.

use serde::{Deserialize, Serialize};

use crate::rng::SimpleRng;
use crate::types::ActionError;

/// Condition under which a score boost applies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreGate {
    Always,
    /// Step combo is at least this value
    MinCombo(u32),
    /// Step match count is at least this value
    MinMatchCount(usize),
}

impl ScoreGate {
    pub fn admits(&self, step: &StepContext) -> bool {
        match *self {
            ScoreGate::Always => true,
            ScoreGate::MinCombo(min) => step.combo >= min,
            ScoreGate::MinMatchCount(min) => step.match_count >= min,
        }
    }
}

/// What an artifact does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactEffect {
    /// Multiply the step score by `(100 + percent) / 100`
    ScoreMultiplier { percent: u32, gate: ScoreGate },
    /// Add flat points to the step score
    ScoreBonus { points: u64, gate: ScoreGate },
    /// Flat reward when the step combo equals `combo` exactly
    ExactCombo { combo: u32, points: u64, moves: u32 },
    /// Win: double the step score. Lose: the step costs half of it.
    Gamble { win_percent: u32 },
    /// Chance per matched tier-1 tile to become max tier in place
    TierMutation { chance_percent: u32 },
    /// Every `every_turns` turns, remove the highest-tier tile
    PeriodicClear { every_turns: u32 },
    /// Widen item areas and/or skip inventory consumption
    ItemEnhancement { widen: bool, save_percent: u32 },
    /// Moves knocked off the shuffle cost
    ShuffleDiscount { moves: u32 },
}

/// The artifact catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Magnifier,
    WideNet,
    Whetstone,
    TripleChime,
    EchoBell,
    LoadedDice,
    Transmuter,
    Meteor,
    BlastCore,
    ThriftyPouch,
    ShuffleToken,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 11] = [
        ArtifactKind::Magnifier,
        ArtifactKind::WideNet,
        ArtifactKind::Whetstone,
        ArtifactKind::TripleChime,
        ArtifactKind::EchoBell,
        ArtifactKind::LoadedDice,
        ArtifactKind::Transmuter,
        ArtifactKind::Meteor,
        ArtifactKind::BlastCore,
        ArtifactKind::ThriftyPouch,
        ArtifactKind::ShuffleToken,
    ];

    pub fn effect(&self) -> ArtifactEffect {
        match self {
            ArtifactKind::Magnifier => ArtifactEffect::ScoreMultiplier {
                percent: 50,
                gate: ScoreGate::MinCombo(3),
            },
            ArtifactKind::WideNet => ArtifactEffect::ScoreMultiplier {
                percent: 25,
                gate: ScoreGate::MinMatchCount(5),
            },
            ArtifactKind::Whetstone => ArtifactEffect::ScoreBonus {
                points: 15,
                gate: ScoreGate::Always,
            },
            ArtifactKind::TripleChime => ArtifactEffect::ExactCombo {
                combo: 3,
                points: 100,
                moves: 0,
            },
            ArtifactKind::EchoBell => ArtifactEffect::ExactCombo {
                combo: 4,
                points: 0,
                moves: 1,
            },
            ArtifactKind::LoadedDice => ArtifactEffect::Gamble { win_percent: 50 },
            ArtifactKind::Transmuter => ArtifactEffect::TierMutation { chance_percent: 10 },
            ArtifactKind::Meteor => ArtifactEffect::PeriodicClear { every_turns: 5 },
            ArtifactKind::BlastCore => ArtifactEffect::ItemEnhancement {
                widen: true,
                save_percent: 0,
            },
            ArtifactKind::ThriftyPouch => ArtifactEffect::ItemEnhancement {
                widen: false,
                save_percent: 25,
            },
            ArtifactKind::ShuffleToken => ArtifactEffect::ShuffleDiscount { moves: 1 },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Magnifier => "magnifier",
            ArtifactKind::WideNet => "wide_net",
            ArtifactKind::Whetstone => "whetstone",
            ArtifactKind::TripleChime => "triple_chime",
            ArtifactKind::EchoBell => "echo_bell",
            ArtifactKind::LoadedDice => "loaded_dice",
            ArtifactKind::Transmuter => "transmuter",
            ArtifactKind::Meteor => "meteor",
            ArtifactKind::BlastCore => "blast_core",
            ArtifactKind::ThriftyPouch => "thrifty_pouch",
            ArtifactKind::ShuffleToken => "shuffle_token",
        }
    }
}

/// Inputs an artifact may gate on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepContext {
    pub match_count: usize,
    pub combo: u32,
}

/// Result of running a step's base score through the owned artifacts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreOutcome {
    /// Score before any artifact
    pub base: u64,
    /// Signed change to the total (negative only after a lost gamble)
    pub delta: i64,
    /// Moves granted by exact-combo artifacts
    pub bonus_moves: u32,
    /// `Some(won)` if a gamble was rolled this step
    pub gamble: Option<bool>,
}

/// Owned artifacts, in acquisition order
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Artifacts {
    owned: Vec<ArtifactKind>,
}

impl Artifacts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn owns(&self, kind: ArtifactKind) -> bool {
        self.owned.contains(&kind)
    }

    /// Add an artifact. Each artifact can be owned once.
    pub fn acquire(&mut self, kind: ArtifactKind) -> Result<(), ActionError> {
        if self.owns(kind) {
            return Err(ActionError::ArtifactOwned);
        }
        self.owned.push(kind);
        Ok(())
    }

    pub fn owned(&self) -> &[ArtifactKind] {
        &self.owned
    }

    /// Catalog entries not yet owned
    pub fn unowned(&self) -> impl Iterator<Item = ArtifactKind> + '_ {
        ArtifactKind::ALL.into_iter().filter(|k| !self.owns(*k))
    }

    fn effects(&self) -> impl Iterator<Item = ArtifactEffect> + '_ {
        self.owned.iter().map(|k| k.effect())
    }

    /// Run one step's base score through every score-affecting artifact
    pub fn apply_score(&self, base: u64, step: StepContext, rng: &mut SimpleRng) -> ScoreOutcome {
        let mut percent: u64 = 0;
        let mut flat: u64 = 0;
        let mut exact_points: u64 = 0;
        let mut bonus_moves: u32 = 0;
        let mut win_percent: Option<u32> = None;

        for effect in self.effects() {
            match effect {
                ArtifactEffect::ScoreMultiplier { percent: p, gate } if gate.admits(&step) => {
                    percent += p as u64;
                }
                ArtifactEffect::ScoreBonus { points, gate } if gate.admits(&step) => {
                    flat += points;
                }
                ArtifactEffect::ExactCombo {
                    combo,
                    points,
                    moves,
                } if combo == step.combo => {
                    exact_points += points;
                    bonus_moves += moves;
                }
                ArtifactEffect::Gamble { win_percent: p } => {
                    win_percent = Some(win_percent.map_or(p, |w| w.max(p)));
                }
                _ => {}
            }
        }

        let boosted = base
            .saturating_mul(100 + percent)
            .saturating_div(100)
            .saturating_add(flat)
            .saturating_add(exact_points);

        let (delta, gamble) = match win_percent {
            Some(p) if boosted > 0 => {
                if rng.roll_percent(p) {
                    (boosted.saturating_mul(2) as i64, Some(true))
                } else {
                    (-((boosted / 2) as i64), Some(false))
                }
            }
            _ => (boosted as i64, None),
        };

        ScoreOutcome {
            base,
            delta,
            bonus_moves,
            gamble,
        }
    }

    /// Highest per-tile tier mutation chance among owned artifacts
    pub fn tier_mutation_percent(&self) -> u32 {
        self.effects()
            .filter_map(|e| match e {
                ArtifactEffect::TierMutation { chance_percent } => Some(chance_percent),
                _ => None,
            })
            .max()
            .unwrap_or(0)
    }

    /// Shortest periodic-clear interval among owned artifacts
    pub fn periodic_clear_every(&self) -> Option<u32> {
        self.effects()
            .filter_map(|e| match e {
                ArtifactEffect::PeriodicClear { every_turns } if every_turns > 0 => {
                    Some(every_turns)
                }
                _ => None,
            })
            .min()
    }

    pub fn widens_items(&self) -> bool {
        self.effects()
            .any(|e| matches!(e, ArtifactEffect::ItemEnhancement { widen: true, .. }))
    }

    /// Chance that an item use leaves inventory untouched
    pub fn item_save_percent(&self) -> u32 {
        self.effects()
            .filter_map(|e| match e {
                ArtifactEffect::ItemEnhancement { save_percent, .. } => Some(save_percent),
                _ => None,
            })
            .max()
            .unwrap_or(0)
    }

    pub fn shuffle_discount(&self) -> u32 {
        self.effects()
            .map(|e| match e {
                ArtifactEffect::ShuffleDiscount { moves } => moves,
                _ => 0,
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with(kinds: &[ArtifactKind]) -> Artifacts {
        let mut artifacts = Artifacts::new();
        for kind in kinds {
            artifacts.acquire(*kind).unwrap();
        }
        artifacts
    }

    fn step(match_count: usize, combo: u32) -> StepContext {
        StepContext { match_count, combo }
    }

    #[test]
    fn test_no_artifacts_passes_base_through() {
        let outcome = Artifacts::new().apply_score(60, step(3, 2), &mut SimpleRng::new(1));
        assert_eq!(outcome.base, 60);
        assert_eq!(outcome.delta, 60);
        assert_eq!(outcome.bonus_moves, 0);
        assert_eq!(outcome.gamble, None);
    }

    #[test]
    fn test_acquire_is_exclusive() {
        let mut artifacts = Artifacts::new();
        assert!(artifacts.acquire(ArtifactKind::Meteor).is_ok());
        assert_eq!(
            artifacts.acquire(ArtifactKind::Meteor),
            Err(ActionError::ArtifactOwned)
        );
        assert_eq!(artifacts.owned(), &[ArtifactKind::Meteor]);
        assert_eq!(artifacts.unowned().count(), ArtifactKind::ALL.len() - 1);
    }

    #[test]
    fn test_multiplier_gated_by_combo() {
        let artifacts = with(&[ArtifactKind::Magnifier]);
        let mut rng = SimpleRng::new(1);
        assert_eq!(artifacts.apply_score(100, step(3, 2), &mut rng).delta, 100);
        assert_eq!(artifacts.apply_score(100, step(3, 3), &mut rng).delta, 150);
    }

    #[test]
    fn test_multiplier_gated_by_match_count() {
        let artifacts = with(&[ArtifactKind::WideNet]);
        let mut rng = SimpleRng::new(1);
        assert_eq!(artifacts.apply_score(100, step(4, 2), &mut rng).delta, 100);
        assert_eq!(artifacts.apply_score(100, step(5, 2), &mut rng).delta, 125);
    }

    #[test]
    fn test_multipliers_stack_additively_then_flat() {
        let artifacts = with(&[
            ArtifactKind::Magnifier,
            ArtifactKind::WideNet,
            ArtifactKind::Whetstone,
        ]);
        let outcome = artifacts.apply_score(100, step(5, 3), &mut SimpleRng::new(1));
        // 100 * 175% + 15
        assert_eq!(outcome.delta, 190);
    }

    #[test]
    fn test_exact_combo_bonus() {
        let artifacts = with(&[ArtifactKind::TripleChime, ArtifactKind::EchoBell]);
        let mut rng = SimpleRng::new(1);

        let at_three = artifacts.apply_score(10, step(3, 3), &mut rng);
        assert_eq!(at_three.delta, 110);
        assert_eq!(at_three.bonus_moves, 0);

        let at_four = artifacts.apply_score(10, step(3, 4), &mut rng);
        assert_eq!(at_four.delta, 10);
        assert_eq!(at_four.bonus_moves, 1);

        let at_five = artifacts.apply_score(10, step(3, 5), &mut rng);
        assert_eq!(at_five.delta, 10);
        assert_eq!(at_five.bonus_moves, 0);
    }

    #[test]
    fn test_gamble_doubles_or_halves() {
        let artifacts = with(&[ArtifactKind::LoadedDice]);
        assert!(artifacts.owns(ArtifactKind::LoadedDice));
        let mut rng = SimpleRng::new(77);
        let mut wins = 0;
        let mut losses = 0;
        for _ in 0..200 {
            let outcome = artifacts.apply_score(100, step(3, 2), &mut rng);
            match outcome.gamble {
                Some(true) => {
                    assert_eq!(outcome.delta, 200);
                    wins += 1;
                }
                Some(false) => {
                    assert_eq!(outcome.delta, -50);
                    losses += 1;
                }
                None => panic!("gamble must roll when the step scores"),
            }
        }
        assert!(wins > 0 && losses > 0);
    }

    #[test]
    fn test_gamble_skips_zero_score() {
        let artifacts = with(&[ArtifactKind::LoadedDice]);
        let outcome = artifacts.apply_score(0, step(0, 2), &mut SimpleRng::new(1));
        assert_eq!(outcome.gamble, None);
        assert_eq!(outcome.delta, 0);
    }

    #[test]
    fn test_accessors() {
        let none = Artifacts::new();
        assert_eq!(none.tier_mutation_percent(), 0);
        assert_eq!(none.periodic_clear_every(), None);
        assert!(!none.widens_items());
        assert_eq!(none.item_save_percent(), 0);
        assert_eq!(none.shuffle_discount(), 0);

        let all = with(&ArtifactKind::ALL);
        assert_eq!(all.tier_mutation_percent(), 10);
        assert_eq!(all.periodic_clear_every(), Some(5));
        assert!(all.widens_items());
        assert_eq!(all.item_save_percent(), 25);
        assert_eq!(all.shuffle_discount(), 1);
    }
}
