//! Physics / Gravity
//!
//! Logical (not graphical) motion integration. Falling tiles advance under
//! constant acceleration up to a terminal velocity and snap to the grid
//! when they reach their resting row. After a stable tick, a column
//! compaction pass converts discrete "this cell should fall" decisions
//! into the physics motion subsequent ticks resolve.

use crate::core::Vec2;
use crate::game::events::{Event, EventCollector};
use crate::game::grid::{GameState, Position};

/// Advance all falling tiles by one time step.
pub fn update(state: &mut GameState, dt: f32) {
    let gravity = state.config.gravity_accel;
    let terminal = state.config.terminal_velocity;
    let width = state.width;
    let height = state.height;

    for y in 0..height {
        for x in 0..width {
            let tile = state.get_mut(x, y);
            if !tile.is_falling {
                continue;
            }

            tile.velocity.y = (tile.velocity.y + gravity * dt).min(terminal);
            tile.position.y += tile.velocity.y * dt;

            // A tile's discrete resting slot is always its own grid index.
            // Compaction/refill already assigned the cell, physics only
            // animates the position catching up to it.
            if tile.position.y >= y as f32 {
                tile.position = Vec2::from_cell(x, y);
                tile.velocity = Vec2::ZERO;
                tile.is_falling = false;
            }
        }
    }
}

/// True iff no tile is falling and no tile is suspended.
pub fn is_stable(state: &GameState) -> bool {
    state
        .grid
        .iter()
        .all(|t| !t.is_falling && !t.is_suspended)
}

/// Column compaction: for each column bottom-up, empty cells pull down the
/// nearest settled tile above them, starting it falling. Returns the moves
/// made so callers (refill) know which cells are now empty.
pub fn compact_columns(state: &mut GameState, collector: &mut dyn EventCollector, tick: i64, sim_time: f32) {
    let width = state.width;
    let height = state.height;

    for x in 0..width {
        // Bottom-up: pulling a tile down from y-1 into y empties y-1, which
        // this same pass then sees and pulls from y-2, naturally cascading
        // a whole column of gaps in one call.
        for y in (1..height).rev() {
            if !state.get(x, y).is_empty() {
                continue;
            }
            let above = *state.get(x, y - 1);
            if above.is_empty() || above.is_suspended || above.is_falling {
                continue;
            }

            let mut moved = above;
            moved.is_falling = true;
            if moved.velocity.y <= 0.0 {
                moved.velocity.y = 1.0;
            }
            state.set(x, y, moved);
            state.set(x, y - 1, crate::game::grid::Tile::empty_at(Vec2::from_cell(x, y - 1)));

            collector.emit(Event::TileMoved {
                tick,
                sim_time,
                tile_id: above.id,
                from: Position::new(x, y - 1),
                to: Position::new(x, y),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::events::BufferedCollector;
    use crate::game::grid::{GameConfig, TileType};

    fn blank_state() -> GameState {
        GameState::new(
            GameConfig {
                width: 4,
                height: 4,
                ..GameConfig::default()
            },
            1,
        )
        .unwrap()
    }

    #[test]
    fn test_is_stable_true_on_fresh_board() {
        let state = blank_state();
        assert!(is_stable(&state));
    }

    #[test]
    fn test_is_stable_false_while_falling() {
        let mut state = blank_state();
        state.get_mut(0, 0).is_falling = true;
        assert!(!is_stable(&state));
    }

    #[test]
    fn test_is_stable_false_while_suspended() {
        let mut state = blank_state();
        state.get_mut(0, 0).is_suspended = true;
        assert!(!is_stable(&state));
    }

    #[test]
    fn test_compaction_drops_tile_into_empty_cell_below() {
        let mut state = blank_state();
        state.set(0, 3, crate::game::grid::Tile::empty_at(Vec2::from_cell(0, 3)));
        let original_id = state.get(0, 2).id;
        state.get_mut(0, 2).tile_type = TileType::Red;

        let mut collector = BufferedCollector::new();
        compact_columns(&mut state, &mut collector, 0, 0.0);

        assert!(state.get(0, 2).is_empty());
        assert_eq!(state.get(0, 3).id, original_id);
        assert!(state.get(0, 3).is_falling);
    }

    #[test]
    fn test_update_snaps_to_resting_row() {
        let mut state = blank_state();
        let tile = state.get_mut(0, 2);
        tile.is_falling = true;
        tile.velocity.y = 1.0;
        tile.position = Vec2::from_cell(0, 1);

        for _ in 0..200 {
            update(&mut state, 1.0 / 60.0);
        }

        let tile = state.get(0, 2);
        assert!(!tile.is_falling);
        assert_eq!(tile.velocity.y, 0.0);
        assert!(tile.position.approx_eq(Vec2::from_cell(0, 2), 0.001));
    }

    #[test]
    fn test_velocity_clamped_to_terminal() {
        let mut state = blank_state();
        let terminal = state.config.terminal_velocity;
        let tile = state.get_mut(0, 3);
        tile.is_falling = true;
        tile.position = Vec2::from_cell(0, -50);

        for _ in 0..120 {
            update(&mut state, 1.0 / 60.0);
        }
        assert!(state.get(0, 3).velocity.y <= terminal + f32::EPSILON);
    }
}
