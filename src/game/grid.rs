//! Grid Data Model
//!
//! `Tile`, `Position`, `GameConfig`, and `GameState` form the plain-data
//! layer every system operates on by mutable reference. Uses a flat
//! `Vec<Tile>` (row-major, `index = y * width + x`) rather than a map,
//! since grid cells are a dense, fixed-size universe.

use serde::{Deserialize, Serialize};

use crate::core::vec2::Vec2;
use crate::core::{RandomDomain, SeedManager};
use crate::error::GameError;

/// One of the configured tile colors, or the empty-cell sentinel.
///
/// `tile_types_count` (3-8) selects a prefix of [`TileType::PLAYABLE`];
/// `Empty` is never counted toward that number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum TileType {
    /// No tile occupies this cell.
    Empty = 0,
    /// Red tile.
    Red = 1,
    /// Orange tile.
    Orange = 2,
    /// Yellow tile.
    Yellow = 3,
    /// Green tile.
    Green = 4,
    /// Blue tile.
    Blue = 5,
    /// Purple tile.
    Purple = 6,
    /// Pink tile.
    Pink = 7,
    /// Cyan tile.
    Cyan = 8,
}

impl TileType {
    /// The eight playable colors, in the order `tile_types_count` indexes.
    pub const PLAYABLE: [TileType; 8] = [
        TileType::Red,
        TileType::Orange,
        TileType::Yellow,
        TileType::Green,
        TileType::Blue,
        TileType::Purple,
        TileType::Pink,
        TileType::Cyan,
    ];

    /// Map a `0..tile_types_count` index to a playable color.
    #[inline]
    pub fn from_index(index: u8) -> Self {
        Self::PLAYABLE[index as usize % Self::PLAYABLE.len()]
    }

    /// True for any non-`Empty` variant.
    #[inline]
    pub fn is_color(self) -> bool {
        !matches!(self, TileType::Empty)
    }
}

/// The region a tile clears when activated, if any.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum BombKind {
    /// Plain tile, no special behavior.
    None = 0,
    /// Clears the entire row.
    LineH = 1,
    /// Clears the entire column.
    LineV = 2,
    /// Clears a 3x3 area centered on the tile.
    Area = 3,
    /// Clears every tile of one color.
    ColorClear = 4,
}

impl BombKind {
    /// True for any variant other than `None`.
    #[inline]
    pub fn is_bomb(self) -> bool {
        !matches!(self, BombKind::None)
    }
}

/// Integer grid cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl Position {
    /// Sentinel outside every valid grid.
    pub const INVALID: Position = Position { x: -1, y: -1 };

    /// Construct a position.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// True if either coordinate is negative (matches `INVALID`, and any
    /// other off-grid value produced by arithmetic on a valid position).
    #[inline]
    pub fn is_invalid(self) -> bool {
        self.x < 0 || self.y < 0
    }

    /// True if `self` and `other` are orthogonally adjacent.
    #[inline]
    pub fn is_adjacent(self, other: Self) -> bool {
        let dx = (self.x - other.x).abs();
        let dy = (self.y - other.y).abs();
        (dx == 1 && dy == 0) || (dx == 0 && dy == 1)
    }
}

/// One grid cell's contents.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    /// Monotonic identity, unique among live tiles.
    pub id: u64,
    /// Color, or `Empty`.
    pub tile_type: TileType,
    /// Special-clear behavior, if any.
    pub bomb: BombKind,
    /// Logical world-space position (not a render coordinate).
    pub position: Vec2,
    /// Logical velocity, consumed by the physics system.
    pub velocity: Vec2,
    /// True while being cleared/exploding; gravity ignores the tile.
    pub is_suspended: bool,
    /// True while vertical velocity is non-zero.
    pub is_falling: bool,
}

impl Tile {
    /// An empty cell at the given logical position.
    pub fn empty_at(position: Vec2) -> Self {
        Self {
            id: 0,
            tile_type: TileType::Empty,
            bomb: BombKind::None,
            position,
            velocity: Vec2::ZERO,
            is_suspended: false,
            is_falling: false,
        }
    }

    /// True if this cell holds no tile.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tile_type == TileType::Empty
    }

    /// True if this tile can participate in match scanning: occupied,
    /// not suspended, not mid-fall.
    #[inline]
    pub fn is_settled(&self) -> bool {
        !self.is_empty() && !self.is_suspended && !self.is_falling
    }
}

/// Static construction-time configuration for a match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Board width in cells.
    pub width: i32,
    /// Board height in cells.
    pub height: i32,
    /// Number of distinct tile colors in play (3-8).
    pub tile_types_count: u8,
    /// Relative spawn weight per color, length `tile_types_count`.
    pub tile_weights: Vec<u32>,
    /// Maximum moves before the match ends (0 = unbounded).
    pub move_limit: i32,
    /// Target difficulty in `[0, 1]`, consulted by refill tuning.
    pub target_difficulty: f32,
    /// Gravitational acceleration applied to falling tiles (units/s^2).
    pub gravity_accel: f32,
    /// Maximum fall speed (units/s).
    pub terminal_velocity: f32,
    /// Base score awarded per tile in a cleared group, before size scaling.
    pub base_score_per_tile: i32,
    /// Maximum refill retries before falling back to least-recently-used.
    pub refill_max_retries: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: 8,
            height: 8,
            tile_types_count: 6,
            tile_weights: vec![1; 6],
            move_limit: 0,
            target_difficulty: 0.5,
            gravity_accel: 30.0,
            terminal_velocity: 25.0,
            base_score_per_tile: 10,
            refill_max_retries: 8,
        }
    }
}

impl GameConfig {
    /// Validate dimension and tile-type constraints.
    pub fn validate(&self) -> Result<(), GameError> {
        if self.width <= 0 || self.height <= 0 || self.tile_types_count < 3 {
            return Err(GameError::InvalidDimensions {
                width: self.width,
                height: self.height,
                tile_types_count: self.tile_types_count,
            });
        }
        Ok(())
    }

    /// The active colors, in weight order.
    pub fn active_colors(&self) -> &[TileType] {
        &TileType::PLAYABLE[..self.tile_types_count as usize]
    }

    /// Weight vector, falling back to uniform weights if misconfigured.
    pub fn weights(&self) -> Vec<u32> {
        if self.tile_weights.len() == self.tile_types_count as usize
            && self.tile_weights.iter().any(|&w| w > 0)
        {
            self.tile_weights.clone()
        } else {
            vec![1; self.tile_types_count as usize]
        }
    }
}

/// Owning container for a single match's full state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// Flat, row-major grid: `index = y * width + x`.
    pub grid: Vec<Tile>,
    /// Board width in cells.
    pub width: i32,
    /// Board height in cells.
    pub height: i32,
    /// Number of distinct tile colors in play.
    pub tile_types_count: u8,
    /// Cumulative score for this match.
    pub score: i64,
    /// Number of moves (`try_swap` acceptances) made so far.
    pub move_count: i64,
    /// Monotonic id source for newly created tiles.
    pub next_tile_id: u64,
    /// Maximum moves before the match ends (0 = unbounded).
    pub move_limit: i32,
    /// Target difficulty in `[0, 1]`.
    pub target_difficulty: f32,
    /// Currently selected cell, `Position::INVALID` when none.
    pub selected_position: Position,
    /// Deterministic RNG handle, owned (not shared) so clones branch freely.
    pub rng: SeedManager,
    /// Construction-time configuration, retained for refill/physics tuning.
    pub config: GameConfig,
}

impl GameState {
    /// Build a new, populated board with no pre-existing matches.
    ///
    /// Board initialization uses a local same-row/same-column check rather
    /// than the full match finder (which operates on a `GameState` and
    /// would be circular here). Equivalent in effect, since no tile has
    /// been placed yet to form anything longer than what this check covers.
    pub fn new(config: GameConfig, master_seed: u64) -> Result<Self, GameError> {
        config.validate()?;

        let width = config.width;
        let height = config.height;
        let mut rng = SeedManager::new(master_seed);
        let weights = config.weights();
        let colors = config.active_colors().to_vec();

        let mut grid: Vec<Tile> = Vec::with_capacity((width * height) as usize);
        let mut next_tile_id: u64 = 1;

        for y in 0..height {
            for x in 0..width {
                let mut chosen = colors[0];
                for _ in 0..32 {
                    let idx = rng
                        .get(RandomDomain::Main)
                        .weighted_index(&weights)
                        .unwrap_or(0);
                    let candidate = colors[idx];
                    let left_two_match = x >= 2
                        && grid[(y * width + x - 1) as usize].tile_type == candidate
                        && grid[(y * width + x - 2) as usize].tile_type == candidate;
                    let below_two_match = y >= 2
                        && grid[((y - 1) * width + x) as usize].tile_type == candidate
                        && grid[((y - 2) * width + x) as usize].tile_type == candidate;
                    chosen = candidate;
                    if !left_two_match && !below_two_match {
                        break;
                    }
                }

                let id = next_tile_id;
                next_tile_id += 1;
                grid.push(Tile {
                    id,
                    tile_type: chosen,
                    bomb: BombKind::None,
                    position: Vec2::from_cell(x, y),
                    velocity: Vec2::ZERO,
                    is_suspended: false,
                    is_falling: false,
                });
            }
        }

        Ok(Self {
            grid,
            width,
            height,
            tile_types_count: config.tile_types_count,
            score: 0,
            move_count: 0,
            next_tile_id,
            move_limit: config.move_limit,
            target_difficulty: config.target_difficulty,
            selected_position: Position::INVALID,
            rng,
            config,
        })
    }

    /// Flat index for a cell, without bounds checking.
    #[inline]
    pub fn index(&self, x: i32, y: i32) -> usize {
        (y * self.width + x) as usize
    }

    /// True if `p` lies within the grid.
    #[inline]
    pub fn is_valid(&self, p: Position) -> bool {
        p.x >= 0 && p.y >= 0 && p.x < self.width && p.y < self.height
    }

    /// Borrow the tile at `(x, y)`.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> &Tile {
        &self.grid[self.index(x, y)]
    }

    /// Mutably borrow the tile at `(x, y)`.
    #[inline]
    pub fn get_mut(&mut self, x: i32, y: i32) -> &mut Tile {
        let idx = self.index(x, y);
        &mut self.grid[idx]
    }

    /// Borrow the tile at `p`.
    #[inline]
    pub fn get_pos(&self, p: Position) -> &Tile {
        self.get(p.x, p.y)
    }

    /// Mutably borrow the tile at `p`.
    #[inline]
    pub fn get_mut_pos(&mut self, p: Position) -> &mut Tile {
        self.get_mut(p.x, p.y)
    }

    /// Overwrite the tile at `(x, y)`.
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, tile: Tile) {
        let idx = self.index(x, y);
        self.grid[idx] = tile;
    }

    /// Allocate the next monotonic tile id.
    #[inline]
    pub fn alloc_tile_id(&mut self) -> u64 {
        let id = self.next_tile_id;
        self.next_tile_id += 1;
        id
    }
}
