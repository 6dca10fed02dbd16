//! Core game logic module - pure, deterministic, and testable
//!
//! This crate contains the match-3 rules, the resolution state machine and
//! every modifier that hooks into it. It has **zero dependencies** on UI,
//! timers, or I/O, making it:
//!
//! - **Deterministic**: Same seed and same inputs replay the same game
//! - **Testable**: Every phase can be stepped and inspected
//! - **Portable**: Runs headless, behind a terminal, or behind a web view
//! - **Fast**: Match detection and move scanning never allocate
//!
//! # Module Structure
//!
//! - [`grid`]: 8x8 board of tiles, compaction and refill
//! - [`matcher`]: run detection over a grid snapshot
//! - [`feasibility`]: productive-swap scanner (hints and stalemates)
//! - [`scoring`]: per-step score and the streak tracker
//! - [`items`]: hammer, rocket and bomb effect areas; inventory
//! - [`artifacts`]: passive modifiers and their fixed dispatch
//! - [`rewards`]: score thresholds and reward offers
//! - [`game`]: the resolution loop that ties everything together
//! - [`rng`]: seeded LCG behind every random decision
//!
//! # Game Rules
//!
//! - **Matching**: 3+ tiles in a row or column with equal kind *and* tier
//! - **Upgrade**: the swapped tiles that take part in a match go up one tier
//!   instead of being removed (capped at tier 3)
//! - **Cascade**: refills that form new runs resolve automatically, each at
//!   a higher combo
//! - **Moves**: a swap costs one move whether or not it matches; items are
//!   free but limited
//! - **Stalemate**: a board with no productive swap is reshuffled at a cost
//!
//! # Example
//!
//! ```
//! use tile_cascade_core::{Game, GameConfig};
//! use tile_cascade_core::types::Difficulty;
//!
//! let mut game = Game::new(GameConfig::new(Difficulty::Casual, 12345));
//!
//! let hint = game.request_hint().expect("new boards always have a move");
//! game.swap(hint.a, hint.b).unwrap();
//! game.run_until_idle();
//!
//! assert!(game.state().score > 0);
//! assert!(game.state().moves <= 29);
//! ```

pub mod artifacts;
pub mod events;
pub mod feasibility;
pub mod game;
pub mod game_state;
pub mod grid;
pub mod items;
pub mod matcher;
pub mod rewards;
pub mod rng;
pub mod scoring;
pub mod snapshot;

pub use tile_cascade_types as types;

// Re-export commonly used types for convenience
pub use artifacts::{ArtifactEffect, ArtifactKind, Artifacts};
pub use events::{GameEvent, MatchResolved, ShuffleReport, Trigger};
pub use feasibility::{find_possible_move, has_possible_move};
pub use game::Game;
pub use game_state::{GameConfig, GameState, Phase, PhaseStep};
pub use grid::{Grid, Tile, TileId};
pub use items::{Inventory, ItemEffect};
pub use matcher::{find_matches, MatchList};
pub use rewards::{Reward, RewardOffer};
pub use rng::SimpleRng;
pub use scoring::Streak;
pub use snapshot::GameSnapshot;
