//! Tile Cascade (workspace facade crate).
//!
//! This package exposes `tile_cascade::{types,core,engine}` as one public API
//! while the implementation lives in dedicated crates under `crates/`, plus
//! the headless [`autoplay`] driver behind the default binary.

pub mod autoplay;

pub use tile_cascade_core as core;
pub use tile_cascade_engine as engine;
pub use tile_cascade_types as types;
