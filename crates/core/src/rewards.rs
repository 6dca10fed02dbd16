//! Rewards module - score thresholds and the offers they unlock
//!
//! Each entry of [`REWARD_THRESHOLDS`] fires once per run. Crossing one
//! queues a [`RewardOffer`]; offers wait in arrival order until the player
//! picks a choice, and never block play.

use std::collections::VecDeque;

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::artifacts::{ArtifactKind, Artifacts};
use crate::rng::SimpleRng;
use crate::types::{ActionError, ItemKind, REWARD_BONUS_MOVES, REWARD_COINS, REWARD_THRESHOLDS};

/// Maximum number of choices in one offer
pub const OFFER_CHOICES: usize = 3;

/// One selectable reward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Reward {
    BonusMoves(u32),
    Item(ItemKind),
    Coins(u32),
    Artifact(ArtifactKind),
}

/// Choices unlocked by one threshold
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardOffer {
    pub threshold: u64,
    pub choices: ArrayVec<Reward, OFFER_CHOICES>,
}

/// Threshold progress plus the queue of unanswered offers
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RewardTrack {
    next_index: usize,
    pending: VecDeque<RewardOffer>,
}

impl RewardTrack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an offer for every threshold `score` has newly reached.
    ///
    /// Returns the offers queued by this call, oldest first.
    pub fn check(
        &mut self,
        score: u64,
        artifacts: &Artifacts,
        rng: &mut SimpleRng,
    ) -> Vec<RewardOffer> {
        let mut fresh = Vec::new();
        while let Some(&threshold) = REWARD_THRESHOLDS.get(self.next_index) {
            if score < threshold {
                break;
            }
            self.next_index += 1;
            let offer = self.build_offer(threshold, artifacts, rng);
            self.pending.push_back(offer.clone());
            fresh.push(offer);
        }
        fresh
    }

    fn build_offer(
        &self,
        threshold: u64,
        artifacts: &Artifacts,
        rng: &mut SimpleRng,
    ) -> RewardOffer {
        let mut choices = ArrayVec::new();

        // Artifacts already sitting in an unanswered offer are not offered again
        let candidates: Vec<ArtifactKind> = artifacts
            .unowned()
            .filter(|kind| !self.is_offered(*kind))
            .collect();
        if !candidates.is_empty() {
            let pick = rng.next_range(candidates.len() as u32) as usize;
            choices.push(Reward::Artifact(candidates[pick]));
        }

        let item = ItemKind::ALL[rng.next_range(ItemKind::ALL.len() as u32) as usize];
        let mut basics = [
            Reward::BonusMoves(REWARD_BONUS_MOVES),
            Reward::Item(item),
            Reward::Coins(REWARD_COINS),
        ];
        rng.shuffle(&mut basics);
        for reward in basics {
            if choices.is_full() {
                break;
            }
            choices.push(reward);
        }

        RewardOffer { threshold, choices }
    }

    fn is_offered(&self, kind: ArtifactKind) -> bool {
        self.pending
            .iter()
            .flat_map(|offer| offer.choices.iter())
            .any(|reward| *reward == Reward::Artifact(kind))
    }

    /// Resolve the oldest pending offer with the choice at `index`.
    ///
    /// Validation happens before the offer is removed, so a rejected choice
    /// leaves the queue untouched.
    pub fn select(&mut self, index: usize, artifacts: &Artifacts) -> Result<Reward, ActionError> {
        let offer = self.pending.front().ok_or(ActionError::NoRewardPending)?;
        let reward = *offer
            .choices
            .get(index)
            .ok_or(ActionError::InvalidRewardChoice(index))?;
        if let Reward::Artifact(kind) = reward {
            if artifacts.owns(kind) {
                return Err(ActionError::ArtifactOwned);
            }
        }
        self.pending.pop_front();
        Ok(reward)
    }

    pub fn pending(&self) -> impl Iterator<Item = &RewardOffer> {
        self.pending.iter()
    }

    /// Next threshold still ahead, if any
    pub fn next_threshold(&self) -> Option<u64> {
        REWARD_THRESHOLDS.get(self.next_index).copied()
    }
}
