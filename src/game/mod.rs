//! Game Logic Module
//!
//! All simulation logic, deterministic given the same seed and move
//! sequence.
//!
//! ## Module Structure
//!
//! - `grid`: Tile, Position, GameConfig, GameState
//! - `events`: Tagged event log, Null/Buffered collector protocol
//! - `match_finder`: Run scanning and group merging
//! - `match_processor`: Group clearing, scoring, bomb creation
//! - `power_up`: Bomb activation, chained detonation, special combos
//! - `physics`: Gravity integration, stability, column compaction
//! - `refill`: Weighted tile spawning with non-match retries
//! - `game_loop`: One-tick orchestration across every system above

pub mod events;
pub mod game_loop;
pub mod grid;
pub mod match_finder;
pub mod match_processor;
pub mod physics;
pub mod power_up;
pub mod refill;

pub use events::{BufferedCollector, DestroyReason, Event, EventCollector, NullCollector};
pub use game_loop::{GameLoop, StepOutcome};
pub use grid::{BombKind, GameConfig, GameState, Position, Tile, TileType};
pub use match_finder::MatchGroup;
