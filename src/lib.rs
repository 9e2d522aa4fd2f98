//! # Match-3 Simulation Core
//!
//! A deterministic, headless, tick-driven simulation core for a match-3
//! puzzle engine. Consumed by two distinct front-ends, an interactive
//! presentation layer and an AI/MCTS planner, both of which drive it
//! purely through value-typed state and event streams.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    MATCH-3 SIMULATION CORE                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/              - Deterministic primitives               │
//! │  ├── vec2.rs        - 2D logical position/velocity           │
//! │  └── rng.rs         - Domain-partitioned Xorshift128+ PRNG   │
//! │                                                               │
//! │  game/              - Simulation systems (deterministic)     │
//! │  ├── grid.rs        - Tile, Position, GameState, GameConfig  │
//! │  ├── events.rs      - Event log, Null/Buffered collector     │
//! │  ├── match_finder.rs    - Run scanning, group merging        │
//! │  ├── match_processor.rs - Clearing, scoring, bomb creation   │
//! │  ├── power_up.rs    - Bomb activation, chained detonation    │
//! │  ├── physics.rs     - Gravity integration, compaction        │
//! │  ├── refill.rs      - Weighted spawn with non-match retries  │
//! │  └── game_loop.rs   - One-tick orchestration                 │
//! │                                                               │
//! │  engine.rs          - Outer driver, run-until-stable, preview│
//! │  error.rs           - Construction-time error taxonomy       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! `core/` and `game/` are **100% deterministic**:
//! - All randomness comes from a seeded, domain-partitioned Xorshift128+
//!   stream (see [`core::rng`]).
//! - `GameState::clone()` deep-copies the grid and every RNG stream, so an
//!   AI search can branch a cloned state without perturbing the original.
//! - No system time or thread scheduling dependencies.
//!
//! Given identical `(master_seed, config, move sequence)`, the simulation
//! produces identical `GameState` and identical event sequences on any
//! platform.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod engine;
pub mod error;
pub mod game;

// Re-export commonly used types
pub use core::rng::{RandomDomain, RngStream, SeedManager};
pub use core::vec2::Vec2;
pub use engine::{MovePreview, SimulationConfig, SimulationEngine, TickResult};
pub use error::GameError;
pub use game::{BombKind, Event, EventCollector, GameConfig, GameState, Position, Tile, TileType};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default simulation tick rate (Hz), matching `SimulationConfig::for_human_play`.
pub const TICK_RATE: u32 = 60;

/// Minimum number of distinct tile colors a board may be configured with.
pub const MIN_TILE_TYPES: u8 = 3;

/// Maximum number of distinct tile colors a board may be configured with.
pub const MAX_TILE_TYPES: u8 = 8;
