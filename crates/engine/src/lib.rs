//! Engine layer - drives a [`Game`](tile_cascade_core::Game) for presentation
//! collaborators.
//!
//! - [`engine`]: `GameEngine`, the observer fan-out and the phase/hint timers
//! - [`hint`]: background feasibility scans on a tokio runtime
//! - [`config`]: `EngineConfig` from defaults, JSON or environment
//!
//! ```
//! use tile_cascade_engine::{EngineConfig, GameEngine};
//!
//! let mut engine = GameEngine::new(EngineConfig {
//!     animate: false,
//!     ..EngineConfig::default()
//! });
//! let hint = engine.request_hint().unwrap();
//! engine.swap(hint.a, hint.b).unwrap();
//! engine.tick(16);
//! assert!(!engine.game().is_busy());
//! ```

pub mod config;
pub mod engine;
pub mod hint;

pub use tile_cascade_core as core;
pub use tile_cascade_types as types;

pub use config::{ConfigError, EngineConfig};
pub use engine::{GameEngine, GameObserver, ObserverId};
pub use hint::{HintResult, HintWorker};
