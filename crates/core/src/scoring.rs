//! Scoring module - per-step score and the streak tracker
//!
//! One resolution step scores
//! `match_count × BASE_SCORE × combo × max(streak_multiplier, 1)`
//! before artifact modifiers. `match_count` is the raw match detector output
//! length, so a cell shared by a horizontal and a vertical run counts twice.
//!
//! The streak counts successive player swaps that produced a match within
//! `STREAK_WINDOW_MS` of each other, measured on the game clock.

use serde::{Deserialize, Serialize};

use crate::types::{BASE_SCORE, STREAK_MAX_MULTIPLIER, STREAK_WINDOW_MS};

/// Score for one resolution step before artifact modifiers
pub fn base_step_score(match_count: usize, combo: u32, streak_multiplier: u32) -> u64 {
    (match_count as u64)
        .saturating_mul(BASE_SCORE)
        .saturating_mul(combo as u64)
        .saturating_mul(streak_multiplier.max(1) as u64)
}

/// Apply a signed delta to a non-negative total
pub fn apply_delta(total: u64, delta: i64) -> u64 {
    if delta >= 0 {
        total.saturating_add(delta as u64)
    } else {
        total.saturating_sub(delta.unsigned_abs())
    }
}

/// Successive-match streak
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Streak {
    count: u32,
    last_hit_ms: Option<u64>,
}

impl Streak {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a matching swap at `now_ms` and return the multiplier to use
    pub fn register(&mut self, now_ms: u64) -> u32 {
        let within_window = self
            .last_hit_ms
            .is_some_and(|last| now_ms.saturating_sub(last) <= STREAK_WINDOW_MS);
        self.count = if within_window { self.count + 1 } else { 1 };
        self.last_hit_ms = Some(now_ms);
        self.multiplier()
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// `count` capped at `STREAK_MAX_MULTIPLIER`, never below 1
    pub fn multiplier(&self) -> u32 {
        self.count.clamp(1, STREAK_MAX_MULTIPLIER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_step_score() {
        assert_eq!(base_step_score(3, 1, 1), 30);
        assert_eq!(base_step_score(3, 2, 1), 60);
        assert_eq!(base_step_score(5, 2, 3), 300);
        // Zero multiplier is treated as 1
        assert_eq!(base_step_score(3, 2, 0), 60);
        assert_eq!(base_step_score(0, 5, 3), 0);
    }

    #[test]
    fn test_apply_delta_never_goes_negative() {
        assert_eq!(apply_delta(100, 50), 150);
        assert_eq!(apply_delta(100, -30), 70);
        assert_eq!(apply_delta(10, -30), 0);
    }

    #[test]
    fn test_streak_grows_inside_window() {
        let mut streak = Streak::new();
        assert_eq!(streak.multiplier(), 1);
        assert_eq!(streak.register(0), 1);
        assert_eq!(streak.register(1000), 2);
        assert_eq!(streak.register(1000 + STREAK_WINDOW_MS), 3);
        assert_eq!(streak.count(), 3);
    }

    #[test]
    fn test_streak_resets_outside_window() {
        let mut streak = Streak::new();
        streak.register(0);
        streak.register(100);
        assert_eq!(streak.register(100 + STREAK_WINDOW_MS + 1), 1);
        assert_eq!(streak.count(), 1);
    }

    #[test]
    fn test_streak_multiplier_is_capped() {
        let mut streak = Streak::new();
        for i in 0..10 {
            streak.register(i * 10);
        }
        assert_eq!(streak.count(), 10);
        assert_eq!(streak.multiplier(), STREAK_MAX_MULTIPLIER);
    }
}
