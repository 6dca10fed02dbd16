//! Game module - the resolution loop
//!
//! [`Game`] owns the grid, the counters and every modifier, and is the only
//! thing that mutates them. Player actions (`swap`, `use_item`, `shuffle`,
//! `select_reward`) are validated synchronously and either rejected with an
//! [`ActionError`] or accepted, in which case a chain starts and the game
//! becomes busy until [`Game::advance`] has walked it back to `Idle`.
//!
//! ```text
//! swap ──► Swapping ──► Checking ──(no match)──► revert ──► Idle | GameOver
//!                          │
//! use_item ────────────────┼──► Resolving(k) ──► Refilling(k) ──(matches)──► Resolving(k+1)
//!                                                    │
//!                                                    └──► Settling ──► Idle | GameOver
//! ```
//!
//! Each `advance` runs exactly one phase and reports the advisory delay a
//! presentation layer may wait before the next one. Headless callers use
//! [`Game::run_until_idle`].

use arrayvec::ArrayVec;
use log::{debug, info, trace, warn};

use crate::artifacts::{ArtifactKind, Artifacts, StepContext};
use crate::events::{GameEvent, MatchResolved, ShuffleReport, Trigger};
use crate::feasibility::{find_possible_move, has_possible_move};
use crate::game_state::{GameConfig, GameState, Phase, PhaseStep};
use crate::grid::{Grid, Stamp, TileFactory};
use crate::items::{pick_line_direction, Inventory, ItemEffect};
use crate::matcher::{find_matches, unique_cells, CellSet, MatchList};
use crate::rewards::{Reward, RewardOffer, RewardTrack};
use crate::rng::SimpleRng;
use crate::scoring::{apply_delta, base_step_score, Streak};
use crate::snapshot::GameSnapshot;
use crate::types::{
    ActionError, Coord, ItemKind, LineDirection, SwapMove, GRID_SIZE, MAX_TIER,
    SHUFFLE_ATTEMPT_BUDGET, SHUFFLE_COST_MOVES,
};

/// Chain in flight
#[derive(Debug, Clone)]
struct Chain {
    trigger: Trigger,
    /// Resolution steps completed so far
    steps: u32,
    streak_multiplier: u32,
    /// Cells the next `Resolving` phase acts on
    pending: MatchList,
    /// `pending` is an effect area rather than detector output
    effect: bool,
}

impl Chain {
    fn new(trigger: Trigger) -> Self {
        Self {
            trigger,
            steps: 0,
            streak_multiplier: 1,
            pending: MatchList::new(),
            effect: false,
        }
    }
}

/// Complete match-3 run
#[derive(Debug, Clone)]
pub struct Game {
    config: GameConfig,
    grid: Grid,
    state: GameState,
    phase: Phase,
    chain: Option<Chain>,
    inventory: Inventory,
    artifacts: Artifacts,
    rewards: RewardTrack,
    streak: Streak,
    rng: SimpleRng,
    factory: TileFactory,
    /// Game clock, advanced only by `tick`
    clock_ms: u64,
    /// Monotonic run id (increments on restart)
    episode_id: u32,
    /// Resolution steps across the run, stamped onto refilled tiles
    step: u32,
    /// Last period (`turn / every`) the periodic clear has covered. Set
    /// when the artifact is acquired, so the first clear comes a full
    /// period later.
    periodic_mark: Option<u32>,
    events: Vec<GameEvent>,
}

impl Game {
    /// Start a run on a freshly generated board that has at least one move
    pub fn new(config: GameConfig) -> Self {
        let mut rng = SimpleRng::new(config.seed);
        let mut factory = TileFactory::new();
        let grid = playable_grid(&mut rng, &mut factory, Stamp::default());
        Self::assemble(config, grid, rng, factory)
    }

    /// Start a run on a fixed board (see [`Grid::from_rows`]).
    ///
    /// The board is taken as given: no match or stalemate check is made.
    pub fn from_rows(config: GameConfig, rows: [&str; GRID_SIZE]) -> Option<Self> {
        let rng = SimpleRng::new(config.seed);
        let mut factory = TileFactory::new();
        let grid = Grid::from_rows(rows, &mut factory, Stamp::default())?;
        Some(Self::assemble(config, grid, rng, factory))
    }

    fn assemble(config: GameConfig, grid: Grid, rng: SimpleRng, factory: TileFactory) -> Self {
        Self {
            config,
            grid,
            state: GameState::new(config.difficulty),
            phase: Phase::Idle,
            chain: None,
            inventory: Inventory::new(config.difficulty.starting_items()),
            artifacts: Artifacts::new(),
            rewards: RewardTrack::new(),
            streak: Streak::new(),
            rng,
            factory,
            clock_ms: 0,
            episode_id: 0,
            step: 0,
            periodic_mark: None,
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_busy(&self) -> bool {
        self.phase.is_busy()
    }

    pub fn is_over(&self) -> bool {
        self.state.game_over
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn artifacts(&self) -> &Artifacts {
        &self.artifacts
    }

    pub fn pending_offers(&self) -> impl Iterator<Item = &RewardOffer> {
        self.rewards.pending()
    }

    pub fn episode_id(&self) -> u32 {
        self.episode_id
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            episode_id: self.episode_id,
            seed: self.config.seed,
            difficulty: self.config.difficulty,
            phase: self.phase,
            state: self.state,
            tiles: self.grid.tiles().to_vec(),
            inventory: self.inventory,
            artifacts: self.artifacts.owned().to_vec(),
            pending_offers: self.rewards.pending().cloned().collect(),
            next_reward_at: self.rewards.next_threshold(),
            clock_ms: self.clock_ms,
        }
    }

    /// Take every event queued since the last call
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Advance the game clock (streak timing)
    pub fn tick(&mut self, elapsed_ms: u32) {
        self.clock_ms = self.clock_ms.saturating_add(elapsed_ms as u64);
    }

    fn guard_idle(&self) -> Result<(), ActionError> {
        if self.state.game_over {
            return Err(ActionError::GameOver);
        }
        if self.phase.is_busy() {
            return Err(ActionError::Busy);
        }
        Ok(())
    }

    fn stamp(&self) -> Stamp {
        Stamp {
            step: self.step,
            turn: self.state.turn,
        }
    }

    fn publish_state(&mut self) {
        self.events.push(GameEvent::StateChanged(self.state));
    }

    /// Start a swap of two adjacent cells
    pub fn swap(&mut self, a: Coord, b: Coord) -> Result<(), ActionError> {
        self.guard_idle()?;
        if !a.in_bounds() || !b.in_bounds() {
            return Err(ActionError::OutOfBounds);
        }
        if !a.is_adjacent(b) {
            return Err(ActionError::NotAdjacent);
        }

        self.state.turn += 1;
        self.state.swapping = true;
        self.chain = Some(Chain::new(Trigger::Swap(SwapMove::new(a, b))));
        self.phase = Phase::Swapping;
        trace!("swap accepted: {:?} <-> {:?} (turn {})", a, b, self.state.turn);
        self.publish_state();
        Ok(())
    }

    /// Activate an item on `at`.
    ///
    /// `direction` is only read by the rocket; when absent the line is picked
    /// by [`pick_line_direction`]. Item use never consumes a move.
    pub fn use_item(
        &mut self,
        kind: ItemKind,
        at: Coord,
        direction: Option<LineDirection>,
    ) -> Result<(), ActionError> {
        self.guard_idle()?;
        if !at.in_bounds() {
            return Err(ActionError::OutOfBounds);
        }
        self.inventory.ensure(kind)?;

        if self.rng.roll_percent(self.artifacts.item_save_percent()) {
            debug!("{} use was free", kind.as_str());
        } else {
            self.inventory.consume(kind)?;
        }

        let direction = direction.unwrap_or_else(|| pick_line_direction(&self.grid, at));
        let area = kind.effect_area(at, direction, self.artifacts.widens_items());

        self.state.turn += 1;
        let mut chain = Chain::new(Trigger::Item { kind });
        chain.pending = area.iter().copied().collect();
        chain.effect = true;
        self.begin_resolution(chain);
        trace!(
            "{} used at {:?}, {} cells (turn {})",
            kind.as_str(),
            at,
            area.len(),
            self.state.turn
        );
        self.publish_state();
        Ok(())
    }

    /// Pay to reshuffle the board
    pub fn shuffle(&mut self) -> Result<ShuffleReport, ActionError> {
        self.guard_idle()?;
        self.state.turn += 1;
        let report = self.reshuffle(true);
        if !self.try_periodic_clear() && self.state.moves <= 0 {
            self.end_game();
        }
        self.publish_state();
        Ok(report)
    }

    /// Resolve the oldest pending reward offer with the choice at `index`
    pub fn select_reward(&mut self, index: usize) -> Result<Reward, ActionError> {
        self.guard_idle()?;
        let reward = self.rewards.select(index, &self.artifacts)?;
        match reward {
            Reward::BonusMoves(moves) => self.state.moves += moves as i32,
            Reward::Item(kind) => self.inventory.add(kind, 1),
            Reward::Coins(coins) => self.state.coins = self.state.coins.saturating_add(coins),
            Reward::Artifact(kind) => {
                self.artifacts.acquire(kind)?;
                self.mark_periodic_start();
            }
        }
        debug!("reward selected: {:?}", reward);
        self.publish_state();
        Ok(reward)
    }

    /// Grant an artifact outside the reward flow (loadouts, tests)
    pub fn acquire_artifact(&mut self, kind: ArtifactKind) -> Result<(), ActionError> {
        self.artifacts.acquire(kind)?;
        self.mark_periodic_start();
        Ok(())
    }

    /// Add items outside the reward flow
    pub fn add_items(&mut self, kind: ItemKind, amount: u32) {
        self.inventory.add(kind, amount);
    }

    /// A productive swap on the current board, if the game is idle
    pub fn request_hint(&self) -> Option<SwapMove> {
        if self.phase != Phase::Idle {
            return None;
        }
        find_possible_move(&self.grid)
    }

    /// Throw the run away and start again
    pub fn restart(&mut self, config: GameConfig) {
        let episode_id = self.episode_id.wrapping_add(1);
        *self = Self::new(config);
        self.episode_id = episode_id;
        info!(
            "restart: episode {} difficulty={} seed={}",
            episode_id,
            config.difficulty.as_str(),
            config.seed
        );
        self.publish_state();
        self.events.push(GameEvent::GridChanged);
    }

    /// Drive phases until the game is idle or over. Returns the number of
    /// phases run.
    pub fn run_until_idle(&mut self) -> usize {
        let mut phases = 0;
        while self.advance().is_some() {
            phases += 1;
        }
        phases
    }

    /// Run the current phase. `None` when there is nothing to do.
    pub fn advance(&mut self) -> Option<PhaseStep> {
        let phase = self.phase;
        match phase {
            Phase::Idle | Phase::GameOver => return None,
            Phase::Swapping => self.run_swap(),
            Phase::Checking => self.run_check(),
            Phase::Resolving { combo } => self.run_resolve(combo),
            Phase::Refilling { combo } => self.run_refill(combo),
            Phase::Settling => self.run_settle(),
        }
        trace!("{:?} -> {:?}", phase, self.phase);
        self.publish_state();
        Some(PhaseStep {
            phase,
            delay_ms: phase.delay_ms(),
        })
    }

    fn swap_move(&self) -> Option<SwapMove> {
        match self.chain.as_ref().map(|c| c.trigger) {
            Some(Trigger::Swap(mv)) => Some(mv),
            _ => None,
        }
    }

    fn run_swap(&mut self) {
        if let Some(mv) = self.swap_move() {
            self.grid.swap(mv.a, mv.b);
            self.events.push(GameEvent::GridChanged);
        }
        self.phase = Phase::Checking;
    }

    fn run_check(&mut self) {
        let matches = find_matches(&self.grid);
        self.state.swapping = false;

        if matches.is_empty() {
            if let Some(mv) = self.swap_move() {
                self.grid.swap(mv.a, mv.b);
                self.events.push(GameEvent::GridChanged);
                self.events.push(GameEvent::SwapReverted(mv));
            }
            self.chain = None;
            self.state.moves -= 1;
            debug!("swap reverted, {} moves left", self.state.moves);
            if self.try_periodic_clear() {
                return;
            }
            if self.state.moves <= 0 {
                self.end_game();
            } else {
                self.phase = Phase::Idle;
            }
            return;
        }

        if let Some(mut chain) = self.chain.take() {
            chain.pending = matches;
            self.begin_resolution(chain);
        }
    }

    fn begin_resolution(&mut self, chain: Chain) {
        self.chain = Some(chain);
        self.state.resolving = true;
        self.state.combo += 1;
        self.phase = Phase::Resolving {
            combo: self.state.combo,
        };
    }

    /// Upgrade-or-remove, then score the step
    fn run_resolve(&mut self, combo: u32) {
        let Some(mut chain) = self.chain.take() else {
            self.phase = Phase::Settling;
            return;
        };
        self.step += 1;
        let first_step = chain.steps == 0;
        let matches = std::mem::take(&mut chain.pending);

        let trigger_cells = match chain.trigger {
            Trigger::Swap(mv) if first_step => Some([mv.a, mv.b]),
            _ => None,
        };
        if first_step && matches!(chain.trigger, Trigger::Swap(_)) {
            chain.streak_multiplier = self.streak.register(self.clock_ms);
            self.state.streak = self.streak.count();
        }
        let mutation_percent = if chain.effect {
            0
        } else {
            self.artifacts.tier_mutation_percent()
        };

        let mut upgraded = ArrayVec::<Coord, 2>::new();
        let mut mutated = CellSet::new();
        for cell in unique_cells(&matches) {
            let tile = self.grid[cell];
            let is_trigger = trigger_cells.is_some_and(|cells| cells.contains(&cell));
            if is_trigger && !tile.is_max_tier() {
                self.grid.upgrade(cell);
                upgraded.push(cell);
            } else if !chain.effect && tile.tier == 1 && self.rng.roll_percent(mutation_percent) {
                self.grid[cell].tier = MAX_TIER;
                mutated.push(cell);
            } else {
                self.grid.mark(cell);
            }
        }
        self.events.push(GameEvent::GridChanged);

        let step = StepContext {
            match_count: matches.len(),
            combo,
        };
        let base = base_step_score(step.match_count, combo, chain.streak_multiplier);
        let outcome = self.artifacts.apply_score(base, step, &mut self.rng);
        self.state.score = apply_delta(self.state.score, outcome.delta);
        self.state.moves += outcome.bonus_moves as i32;
        if first_step && matches!(chain.trigger, Trigger::Swap(_)) {
            self.state.moves -= 1;
        }

        self.events.push(GameEvent::MatchResolved(MatchResolved {
            trigger: chain.trigger,
            matches,
            upgraded,
            mutated,
            score_delta: outcome.delta,
            combo_after: combo,
            bonus_moves: outcome.bonus_moves,
        }));

        for offer in self
            .rewards
            .check(self.state.score, &self.artifacts, &mut self.rng)
        {
            debug!("reward offer unlocked at {}", offer.threshold);
            self.events.push(GameEvent::RewardOffered(offer));
        }

        chain.steps += 1;
        self.chain = Some(chain);
        self.phase = Phase::Refilling { combo };
    }

    fn run_refill(&mut self, combo: u32) {
        let stamp = self.stamp();
        self.grid
            .compact_and_refill(&mut self.rng, &mut self.factory, stamp);
        self.events.push(GameEvent::GridChanged);

        let matches = find_matches(&self.grid);
        match self.chain.as_mut() {
            Some(chain) if !matches.is_empty() => {
                chain.pending = matches;
                chain.effect = false;
                self.state.combo = combo + 1;
                self.phase = Phase::Resolving {
                    combo: self.state.combo,
                };
            }
            _ => self.phase = Phase::Settling,
        }
    }

    fn run_settle(&mut self) {
        let chain = self.chain.take();
        self.state.combo = 1;
        self.state.resolving = false;
        if let Some(chain) = &chain {
            debug!(
                "chain settled: {:?}, {} steps, score {}, {} moves left",
                chain.trigger, chain.steps, self.state.score, self.state.moves
            );
        }

        if self.try_periodic_clear() {
            return;
        }

        if self.state.moves <= 0 {
            self.end_game();
            return;
        }
        if !has_possible_move(&self.grid) {
            self.reshuffle(false);
            if self.state.moves <= 0 {
                self.end_game();
                return;
            }
        }
        self.phase = Phase::Idle;
    }

    fn mark_periodic_start(&mut self) {
        if self.periodic_mark.is_some() {
            return;
        }
        if let Some(every) = self.artifacts.periodic_clear_every() {
            self.periodic_mark = Some(self.state.turn / every);
        }
    }

    /// Start a periodic-clear chain if a period boundary has been passed
    /// since the last one. Checked at every point where a turn can end.
    fn try_periodic_clear(&mut self) -> bool {
        let (Some(every), Some(mark)) = (self.artifacts.periodic_clear_every(), self.periodic_mark)
        else {
            return false;
        };
        let period = self.state.turn / every;
        if period <= mark {
            return false;
        }
        self.periodic_mark = Some(period);
        let target = self.grid.highest_tier_cell();
        debug!("periodic clear at {:?} (turn {})", target, self.state.turn);
        let mut chain = Chain::new(Trigger::PeriodicClear);
        chain.pending.push(target);
        chain.effect = true;
        self.begin_resolution(chain);
        true
    }

    /// Shuffle until the board has no match and at least one move; fall back
    /// to a fresh board once the attempt budget is spent.
    fn reshuffle(&mut self, paid: bool) -> ShuffleReport {
        let cost = SHUFFLE_COST_MOVES.saturating_sub(self.artifacts.shuffle_discount());
        let mut attempts = 0;
        let mut accepted = false;
        while attempts < SHUFFLE_ATTEMPT_BUDGET {
            attempts += 1;
            self.grid.shuffle(&mut self.rng);
            if find_matches(&self.grid).is_empty() && has_possible_move(&self.grid) {
                accepted = true;
                break;
            }
        }
        if !accepted {
            warn!(
                "no playable shuffle after {} attempts, regenerating the board",
                attempts
            );
            let stamp = self.stamp();
            self.grid = playable_grid(&mut self.rng, &mut self.factory, stamp);
        }

        self.state.moves -= cost as i32;
        let report = ShuffleReport {
            cost,
            attempts,
            regenerated: !accepted,
            paid,
        };
        debug!("{:?}, {} moves left", report, self.state.moves);
        self.events.push(GameEvent::GridChanged);
        self.events.push(GameEvent::Shuffled(report));
        report
    }

    fn end_game(&mut self) {
        self.phase = Phase::GameOver;
        self.state.game_over = true;
        self.state.swapping = false;
        self.state.resolving = false;
        self.state.combo = 1;
        self.chain = None;
        info!(
            "game over: score {} after {} turns",
            self.state.score, self.state.turn
        );
        self.events.push(GameEvent::GameOver {
            final_score: self.state.score,
        });
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}

/// Generate boards until one has a productive swap
fn playable_grid(rng: &mut SimpleRng, factory: &mut TileFactory, stamp: Stamp) -> Grid {
    loop {
        let grid = Grid::generate(rng, factory, stamp);
        if has_possible_move(&grid) {
            return grid;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Difficulty;

    /// Period-6 diagonal stripes with a ready-made move in row 3:
    /// swapping (3,2) and (3,3) lines up three amber tiles at cols 0..=2.
    const READY: [&str; GRID_SIZE] = [
        "RACJSMRA", "ACJSMRAC", "CJSMRACJ", "AACASMRJ", "SMRACJSM", "MRACJSMR", "RACJSMRA",
        "ACJSMRAC",
    ];

    fn ready_game() -> Game {
        Game::from_rows(GameConfig::new(Difficulty::Casual, 42), READY).unwrap()
    }

    fn resolved(events: &[GameEvent]) -> Vec<MatchResolved> {
        events
            .iter()
            .filter_map(|e| match e {
                GameEvent::MatchResolved(m) => Some(m.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_new_game_is_playable() {
        for seed in 0..20 {
            let game = Game::new(GameConfig::new(Difficulty::Casual, seed));
            assert!(find_matches(game.grid()).is_empty());
            assert!(game.request_hint().is_some());
            assert_eq!(game.phase(), Phase::Idle);
            assert_eq!(game.state().moves, 30);
            assert_eq!(game.inventory().count(ItemKind::Hammer), 2);
        }
    }

    #[test]
    fn test_same_seed_same_game() {
        let a = Game::new(GameConfig::new(Difficulty::Challenge, 99));
        let b = Game::new(GameConfig::new(Difficulty::Challenge, 99));
        assert_eq!(a.grid(), b.grid());
    }

    #[test]
    fn test_swap_validation() {
        let mut game = ready_game();
        assert_eq!(
            game.swap(Coord::new(0, 0), Coord::new(0, 2)),
            Err(ActionError::NotAdjacent)
        );
        assert_eq!(
            game.swap(Coord::new(0, 7), Coord::new(0, 8)),
            Err(ActionError::OutOfBounds)
        );
        assert_eq!(game.state().turn, 0);
        assert!(game.take_events().is_empty());

        game.swap(Coord::new(3, 2), Coord::new(3, 3)).unwrap();
        assert_eq!(
            game.swap(Coord::new(0, 0), Coord::new(0, 1)),
            Err(ActionError::Busy)
        );
        assert_eq!(
            game.use_item(ItemKind::Hammer, Coord::new(0, 0), None),
            Err(ActionError::Busy)
        );
        assert_eq!(game.shuffle(), Err(ActionError::Busy));
        assert_eq!(game.request_hint(), None);
    }

    #[test]
    fn test_productive_swap_upgrades_trigger_and_removes_rest() {
        let mut game = ready_game();
        let upgraded_id = game.grid()[Coord::new(3, 2)].id;
        let removed = [game.grid()[Coord::new(3, 0)].id, game.grid()[Coord::new(3, 1)].id];
        game.swap(Coord::new(3, 2), Coord::new(3, 3)).unwrap();

        assert_eq!(game.advance().map(|s| s.phase), Some(Phase::Swapping));
        assert_eq!(game.advance().map(|s| s.phase), Some(Phase::Checking));
        assert_eq!(game.phase(), Phase::Resolving { combo: 2 });

        let step = game.advance().unwrap();
        assert_eq!(step.phase, Phase::Resolving { combo: 2 });
        assert!(step.delay_ms > 0);

        // Upgraded in place at the swapped-in position
        let tile = game.grid()[Coord::new(3, 2)];
        assert_eq!(tile.id, upgraded_id);
        assert_eq!(tile.kind.glyph(), 'A');
        assert_eq!(tile.tier, 2);
        assert!(!tile.matched);
        assert!(game.grid()[Coord::new(3, 0)].matched);
        assert!(game.grid()[Coord::new(3, 1)].matched);

        let events = game.take_events();
        let steps = resolved(&events);
        assert_eq!(steps.len(), 1);
        assert_eq!(
            steps[0].matches.as_slice(),
            &[Coord::new(3, 0), Coord::new(3, 1), Coord::new(3, 2)]
        );
        assert_eq!(steps[0].upgraded.as_slice(), &[Coord::new(3, 2)]);
        assert_eq!(steps[0].score_delta, 60);
        assert_eq!(game.state().score, 60);
        assert_eq!(game.state().moves, 29);

        game.run_until_idle();
        assert!(!game.is_busy());
        assert_eq!(game.state().combo, 1);
        assert!(find_matches(game.grid()).is_empty());
        assert_eq!(game.grid().marked_count(), 0);
        assert!(game.grid().tiles().iter().all(|t| !removed.contains(&t.id)));
        assert!(game.state().score >= 60);
    }

    #[test]
    fn test_unproductive_swap_reverts_and_costs_a_move() {
        let mut game = ready_game();
        let before = game.grid().clone();
        game.swap(Coord::new(0, 0), Coord::new(0, 1)).unwrap();
        game.run_until_idle();

        assert_eq!(game.grid(), &before);
        assert_eq!(game.state().moves, 29);
        assert_eq!(game.state().turn, 1);
        assert_eq!(game.state().score, 0);
        let events = game.take_events();
        assert!(events.iter().any(|e| matches!(e, GameEvent::SwapReverted(_))));
        assert!(resolved(&events).is_empty());
    }

    #[test]
    fn test_last_unproductive_swap_ends_game() {
        let mut game = ready_game();
        for _ in 0..29 {
            game.swap(Coord::new(0, 0), Coord::new(0, 1)).unwrap();
            game.run_until_idle();
        }
        assert_eq!(game.state().moves, 1);
        game.swap(Coord::new(0, 0), Coord::new(0, 1)).unwrap();
        game.run_until_idle();

        assert!(game.is_over());
        assert_eq!(game.phase(), Phase::GameOver);
        assert_eq!(
            game.swap(Coord::new(3, 2), Coord::new(3, 3)),
            Err(ActionError::GameOver)
        );
        let events = game.take_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::GameOver { final_score: 0 })));
    }

    #[test]
    fn test_item_use_consumes_inventory_not_moves() {
        let mut game = ready_game();
        game.use_item(ItemKind::Bomb, Coord::new(4, 4), None).unwrap();
        assert_eq!(game.phase(), Phase::Resolving { combo: 2 });
        game.run_until_idle();

        assert_eq!(game.inventory().count(ItemKind::Bomb), 1);
        assert_eq!(game.state().moves, 30);
        assert_eq!(game.state().turn, 1);
        // Item chains never touch the streak
        assert_eq!(game.state().streak, 0);

        let events = game.take_events();
        let steps = resolved(&events);
        assert_eq!(steps[0].matches.len(), 9);
        assert!(steps[0].upgraded.is_empty());
        assert_eq!(steps[0].score_delta, 9 * 10 * 2);
    }

    #[test]
    fn test_item_rejected_without_inventory() {
        let mut game = Game::from_rows(GameConfig::new(Difficulty::Challenge, 1), READY).unwrap();
        game.use_item(ItemKind::Hammer, Coord::new(0, 0), None).unwrap();
        game.run_until_idle();
        let state = *game.state();
        assert_eq!(
            game.use_item(ItemKind::Hammer, Coord::new(0, 0), None),
            Err(ActionError::NoInventory(ItemKind::Hammer))
        );
        assert_eq!(game.state(), &state);
    }

    #[test]
    fn test_widened_rocket_marks_cross() {
        let mut game = ready_game();
        game.acquire_artifact(ArtifactKind::BlastCore).unwrap();
        game.use_item(ItemKind::Rocket, Coord::new(5, 5), Some(LineDirection::Row))
            .unwrap();
        game.advance();
        let steps = resolved(&game.take_events());
        assert_eq!(steps[0].matches.len(), GRID_SIZE * 2 - 1);
        assert_eq!(game.grid().marked_count(), GRID_SIZE * 2 - 1);
    }

    #[test]
    fn test_streak_builds_on_quick_matches() {
        let mut game = ready_game();
        game.swap(Coord::new(3, 2), Coord::new(3, 3)).unwrap();
        game.run_until_idle();
        assert_eq!(game.state().streak, 1);

        game.tick(1000);
        let Some(hint) = game.request_hint() else {
            return;
        };
        game.swap(hint.a, hint.b).unwrap();
        game.run_until_idle();
        assert_eq!(game.state().streak, 2);

        game.tick(10_000);
        let Some(hint) = game.request_hint() else {
            return;
        };
        game.swap(hint.a, hint.b).unwrap();
        game.run_until_idle();
        assert_eq!(game.state().streak, 1);
    }

    #[test]
    fn test_paid_shuffle() {
        let mut game = ready_game();
        let report = game.shuffle().unwrap();
        assert!(report.paid);
        assert_eq!(report.cost, SHUFFLE_COST_MOVES);
        assert_eq!(game.state().moves, 30 - SHUFFLE_COST_MOVES as i32);
        assert_eq!(game.state().turn, 1);
        assert!(find_matches(game.grid()).is_empty());
        assert!(has_possible_move(game.grid()));
    }

    #[test]
    fn test_shuffle_token_discount() {
        let mut game = ready_game();
        game.acquire_artifact(ArtifactKind::ShuffleToken).unwrap();
        assert_eq!(game.shuffle().unwrap().cost, SHUFFLE_COST_MOVES - 1);
    }

    #[test]
    fn test_stalemate_board_is_reshuffled_after_a_chain() {
        let stalemate = [
            "RACJSMRA", "ACJSMRAC", "CJSMRACJ", "JSMRACJS", "SMRACJSM", "MRACJSMR", "RACJSMRA",
            "ACJSMRAC",
        ];
        for seed in 1..30 {
            let mut game =
                Game::from_rows(GameConfig::new(Difficulty::Casual, seed), stalemate).unwrap();
            game.use_item(ItemKind::Hammer, Coord::new(7, 7), None).unwrap();
            game.run_until_idle();
            if game.is_over() {
                continue;
            }
            assert!(has_possible_move(game.grid()), "seed {}", seed);
            assert!(find_matches(game.grid()).is_empty());
        }
    }

    #[test]
    fn test_periodic_clear_fires_on_fifth_turn() {
        let mut game = ready_game();
        game.acquire_artifact(ArtifactKind::Meteor).unwrap();
        for _ in 0..4 {
            game.swap(Coord::new(0, 0), Coord::new(0, 1)).unwrap();
            game.run_until_idle();
        }
        game.take_events();

        game.use_item(ItemKind::Hammer, Coord::new(7, 7), None).unwrap();
        game.run_until_idle();
        let steps = resolved(&game.take_events());
        assert!(steps
            .iter()
            .any(|s| s.trigger == Trigger::PeriodicClear && s.matches.len() == 1));
        assert_eq!(
            steps
                .iter()
                .filter(|s| s.trigger == Trigger::PeriodicClear)
                .count(),
            1
        );
    }

    fn periodic_clears(events: &[GameEvent]) -> usize {
        resolved(events)
            .iter()
            .filter(|s| s.trigger == Trigger::PeriodicClear)
            .count()
    }

    #[test]
    fn test_periodic_clear_fires_after_reverted_fifth_swap() {
        let mut game = ready_game();
        game.acquire_artifact(ArtifactKind::Meteor).unwrap();
        for turn in 1..=5 {
            game.swap(Coord::new(0, 0), Coord::new(0, 1)).unwrap();
            game.run_until_idle();
            let clears = periodic_clears(&game.take_events());
            assert_eq!(clears, usize::from(turn == 5), "turn {}", turn);
        }
        assert_eq!(game.phase(), Phase::Idle);
        assert_eq!(game.state().moves, 25);

        // Turns 6 and 7 stay inside the period that just fired
        for _ in 0..2 {
            game.use_item(ItemKind::Hammer, Coord::new(7, 7), None).unwrap();
            game.run_until_idle();
        }
        assert_eq!(game.state().turn, 7);
        assert_eq!(periodic_clears(&game.take_events()), 0);
    }

    #[test]
    fn test_periodic_clear_fires_after_paid_shuffle() {
        let mut game = ready_game();
        game.acquire_artifact(ArtifactKind::Meteor).unwrap();
        for _ in 0..4 {
            game.swap(Coord::new(0, 0), Coord::new(0, 1)).unwrap();
            game.run_until_idle();
        }
        game.take_events();

        game.shuffle().unwrap();
        assert_eq!(game.state().turn, 5);
        assert!(game.is_busy());
        game.run_until_idle();
        assert_eq!(periodic_clears(&game.take_events()), 1);
        assert_eq!(game.phase(), Phase::Idle);
    }

    #[test]
    fn test_periodic_clear_counts_from_acquisition() {
        let mut game = ready_game();
        for _ in 0..7 {
            game.swap(Coord::new(0, 0), Coord::new(0, 1)).unwrap();
            game.run_until_idle();
        }
        game.acquire_artifact(ArtifactKind::Meteor).unwrap();
        game.take_events();

        // Turns 8 and 9 stay inside the period the artifact arrived in
        for _ in 8..=9 {
            game.swap(Coord::new(0, 0), Coord::new(0, 1)).unwrap();
            game.run_until_idle();
        }
        assert_eq!(periodic_clears(&game.take_events()), 0);

        game.swap(Coord::new(0, 0), Coord::new(0, 1)).unwrap();
        game.run_until_idle();
        assert_eq!(periodic_clears(&game.take_events()), 1);
    }

    #[test]
    fn test_reward_offer_and_selection() {
        let mut game = ready_game();
        assert_eq!(game.select_reward(0), Err(ActionError::NoRewardPending));

        game.add_items(ItemKind::Rocket, 20);
        while game.pending_offers().next().is_none() {
            game.use_item(ItemKind::Rocket, Coord::new(4, 4), Some(LineDirection::Row))
                .unwrap();
            game.run_until_idle();
        }
        assert!(game.state().score >= crate::types::REWARD_THRESHOLDS[0]);

        let offer = game.pending_offers().next().cloned().unwrap();
        let moves_before = game.state().moves;
        let coins_before = game.state().coins;
        let reward = game.select_reward(0).unwrap();
        assert_eq!(reward, offer.choices[0]);
        match reward {
            Reward::Artifact(kind) => assert!(game.artifacts().owns(kind)),
            Reward::BonusMoves(n) => assert_eq!(game.state().moves, moves_before + n as i32),
            Reward::Coins(n) => assert_eq!(game.state().coins, coins_before + n),
            Reward::Item(_) => {}
        }
    }

    #[test]
    fn test_restart_resets_and_bumps_episode() {
        let mut game = ready_game();
        game.swap(Coord::new(3, 2), Coord::new(3, 3)).unwrap();
        game.run_until_idle();
        game.restart(GameConfig::new(Difficulty::Challenge, 5));

        assert_eq!(game.episode_id(), 1);
        assert_eq!(game.state(), &GameState::new(Difficulty::Challenge));
        assert_eq!(game.inventory().count(ItemKind::Bomb), 1);
        assert!(game.artifacts().owned().is_empty());
    }

    #[test]
    fn test_snapshot_reflects_game() {
        let game = ready_game();
        let snapshot = game.snapshot();
        assert_eq!(snapshot.rows()[3], "AACASMRJ");
        assert_eq!(snapshot.state, *game.state());
        assert!(snapshot.playable());
        assert_eq!(snapshot.tile(Coord::new(3, 0)).map(|t| t.tier), Some(1));
        assert_eq!(snapshot.next_reward_at, Some(crate::types::REWARD_THRESHOLDS[0]));
        assert_eq!(snapshot.clock_ms, 0);
    }
}
