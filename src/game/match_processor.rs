//! Match Processor
//!
//! Converts match groups into cleared tiles, score, and newly created bomb
//! tiles. Bomb-creation arbitration when a group satisfies more than one
//! rule: **Area > ColorClear > Line**, resolved here and never surfaced to
//! callers as ambiguous.
//!
//! Chained detonation is explicitly out of scope here. See
//! [`crate::game::power_up`].

use crate::core::Vec2;
use crate::game::events::{DestroyReason, Event, EventCollector};
use crate::game::grid::{BombKind, GameState, Position, TileType};
use crate::game::match_finder::MatchGroup;

fn group_orientation(group: &MatchGroup) -> Option<BombKind> {
    let same_row = group.positions.iter().all(|p| p.y == group.positions[0].y);
    let same_col = group.positions.iter().all(|p| p.x == group.positions[0].x);
    if same_row {
        Some(BombKind::LineH)
    } else if same_col {
        Some(BombKind::LineV)
    } else {
        None
    }
}

/// Pick the bomb created by a group, or `None` for a plain 3-match.
fn classify_bomb(group: &MatchGroup) -> BombKind {
    let size = group.positions.len();
    let orientation = group_orientation(group);

    match orientation {
        // A straight line of 5+ outranks the line bomb it would otherwise
        // produce, per the Area > ColorClear > Line arbitration order.
        Some(_) if size >= 5 => BombKind::ColorClear,
        Some(kind) if size == 4 => kind,
        // Non-straight shape (T/L: a branch of >= 3 meeting a run of >= 3).
        None => BombKind::Area,
        _ => BombKind::None,
    }
}

/// Cell a new bomb tile is anchored to within its group.
///
/// A swap-triggered match anchors its bomb on the cell the swap landed on
/// (`swap_anchor`), when that cell is part of this group. Cascades (where
/// `swap_anchor` is `Position::INVALID`, or the landing cell isn't in this
/// particular group) fall back to the geometric middle of the run.
fn anchor_cell(group: &MatchGroup, swap_anchor: Position) -> Position {
    if !swap_anchor.is_invalid() && group.positions.contains(&swap_anchor) {
        return swap_anchor;
    }
    let mid = group.positions.len() / 2;
    group.positions[mid]
}

/// Apply match groups to `state`: clear tiles, award score, create bombs.
///
/// Returns the score gained from this pass. Does not chain: newly created
/// bomb tiles are left dormant, chained detonation is the power-up
/// handler's responsibility. Consumes `state.selected_position` as the
/// swap-anchor hint for bomb placement (see `anchor_cell`), then clears it.
pub fn process_matches(
    state: &mut GameState,
    groups: &[MatchGroup],
    collector: &mut dyn EventCollector,
    tick: i64,
    sim_time: f32,
) -> i32 {
    let base = state.config.base_score_per_tile;
    let mut score_gained = 0i32;
    let swap_anchor = state.selected_position;

    for group in groups {
        let size = group.positions.len() as i32;
        score_gained += base * size;

        let bomb_kind = classify_bomb(group);
        let anchor = anchor_cell(group, swap_anchor);

        for &pos in &group.positions {
            let tile = state.get_pos(pos);
            let tile_id = tile.id;
            let tile_type = tile.tile_type;

            if pos == anchor && bomb_kind.is_bomb() {
                let new_id = state.alloc_tile_id();
                collector.emit(Event::TileDestroyed {
                    tick,
                    sim_time,
                    tile_id,
                    grid_position: pos,
                    tile_type,
                    reason: DestroyReason::Match,
                });
                let position = state.get_pos(pos).position;
                *state.get_mut_pos(pos) = crate::game::grid::Tile {
                    id: new_id,
                    tile_type,
                    bomb: bomb_kind,
                    position,
                    velocity: Vec2::ZERO,
                    is_suspended: false,
                    is_falling: false,
                };
                collector.emit(Event::TileCreated {
                    tick,
                    sim_time,
                    tile_id: new_id,
                    grid_position: pos,
                    tile_type,
                });
                collector.emit(Event::BombCreated {
                    tick,
                    sim_time,
                    tile_id: new_id,
                    grid_position: pos,
                    kind: bomb_kind,
                });
            } else {
                state.get_mut_pos(pos).is_suspended = true;
                collector.emit(Event::TileDestroyed {
                    tick,
                    sim_time,
                    tile_id,
                    grid_position: pos,
                    tile_type,
                    reason: DestroyReason::Match,
                });
            }
        }
    }

    state.score += score_gained as i64;
    state.selected_position = Position::INVALID;

    if !groups.is_empty() {
        collector.emit(Event::MatchResolved {
            tick,
            sim_time,
            groups_cleared: groups.len() as u32,
            score_gained,
        });
    }

    score_gained
}

/// The most common non-empty tile type currently on the board, used when a
/// `ColorClear` bomb is activated without a paired swap target.
pub fn most_common_type(state: &GameState) -> TileType {
    let mut counts = [0u32; TileType::PLAYABLE.len()];
    for tile in &state.grid {
        if tile.is_empty() {
            continue;
        }
        let idx = tile.tile_type as usize - 1;
        counts[idx] += 1;
    }
    let (best_idx, _) = counts
        .iter()
        .enumerate()
        .max_by_key(|&(_, &count)| count)
        .unwrap_or((0, &0));
    TileType::PLAYABLE[best_idx]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::events::BufferedCollector;
    use crate::game::grid::GameConfig;

    fn blank_state() -> GameState {
        GameState::new(
            GameConfig {
                width: 8,
                height: 8,
                ..GameConfig::default()
            },
            1,
        )
        .unwrap()
    }

    #[test]
    fn test_three_match_no_bomb() {
        let mut state = blank_state();
        for x in 0..3 {
            state.get_mut(x, 0).tile_type = TileType::Red;
        }
        let group = MatchGroup {
            tile_type: TileType::Red,
            positions: vec![Position::new(0, 0), Position::new(1, 0), Position::new(2, 0)],
        };
        let mut collector = BufferedCollector::new();
        let score = process_matches(&mut state, &[group], &mut collector, 0, 0.0);
        assert_eq!(score, 30);
        assert_eq!(state.score, 30);
        for x in 0..3 {
            assert!(state.get(x, 0).is_suspended);
        }
    }

    #[test]
    fn test_four_in_line_creates_line_bomb() {
        let mut state = blank_state();
        for x in 0..4 {
            state.get_mut(x, 0).tile_type = TileType::Blue;
        }
        let group = MatchGroup {
            tile_type: TileType::Blue,
            positions: (0..4).map(|x| Position::new(x, 0)).collect(),
        };
        let mut collector = BufferedCollector::new();
        process_matches(&mut state, &[group], &mut collector, 0, 0.0);

        let bombs: Vec<_> = state.grid.iter().filter(|t| t.bomb.is_bomb()).collect();
        assert_eq!(bombs.len(), 1);
        assert_eq!(bombs[0].bomb, BombKind::LineH);
    }

    #[test]
    fn test_five_in_line_creates_color_clear_anchor_rule() {
        let mut state = blank_state();
        for x in 0..5 {
            state.get_mut(x, 0).tile_type = TileType::Green;
        }
        let group = MatchGroup {
            tile_type: TileType::Green,
            positions: (0..5).map(|x| Position::new(x, 0)).collect(),
        };
        let mut collector = BufferedCollector::new();
        process_matches(&mut state, &[group], &mut collector, 0, 0.0);

        let bombs: Vec<_> = state.grid.iter().filter(|t| t.bomb.is_bomb()).collect();
        assert_eq!(bombs.len(), 1);
        assert_eq!(bombs[0].bomb, BombKind::ColorClear);
    }

    #[test]
    fn test_five_in_line_anchors_bomb_on_swap_landing_cell() {
        let mut state = blank_state();
        for x in 0..5 {
            state.get_mut(x, 5).tile_type = TileType::Red;
        }
        state.selected_position = Position::new(3, 5);
        let group = MatchGroup {
            tile_type: TileType::Red,
            positions: (0..5).map(|x| Position::new(x, 5)).collect(),
        };
        let mut collector = BufferedCollector::new();
        process_matches(&mut state, &[group], &mut collector, 0, 0.0);

        assert!(state.get(3, 5).bomb.is_bomb());
        assert_eq!(state.get(3, 5).bomb, BombKind::ColorClear);
        let bombs: Vec<_> = state.grid.iter().filter(|t| t.bomb.is_bomb()).collect();
        assert_eq!(bombs.len(), 1);
        assert!(state.selected_position.is_invalid());
    }

    #[test]
    fn test_cascade_match_falls_back_to_geometric_middle() {
        let mut state = blank_state();
        for x in 0..5 {
            state.get_mut(x, 5).tile_type = TileType::Red;
        }
        // No swap in flight: selected_position stays INVALID, as it would
        // for a cascade discovered after gravity/compaction.
        let group = MatchGroup {
            tile_type: TileType::Red,
            positions: (0..5).map(|x| Position::new(x, 5)).collect(),
        };
        let mut collector = BufferedCollector::new();
        process_matches(&mut state, &[group], &mut collector, 0, 0.0);

        assert!(state.get(2, 5).bomb.is_bomb());
        assert_eq!(state.get(2, 5).bomb, BombKind::ColorClear);
    }

    #[test]
    fn test_t_shape_creates_area_bomb() {
        let mut state = blank_state();
        let cells = [
            Position::new(0, 2),
            Position::new(1, 2),
            Position::new(2, 2),
            Position::new(1, 0),
            Position::new(1, 1),
        ];
        for p in &cells {
            state.get_mut(p.x, p.y).tile_type = TileType::Purple;
        }
        let group = MatchGroup {
            tile_type: TileType::Purple,
            positions: cells.to_vec(),
        };
        let mut collector = BufferedCollector::new();
        process_matches(&mut state, &[group], &mut collector, 0, 0.0);

        let bombs: Vec<_> = state.grid.iter().filter(|t| t.bomb.is_bomb()).collect();
        assert_eq!(bombs.len(), 1);
        assert_eq!(bombs[0].bomb, BombKind::Area);
    }

    #[test]
    fn test_events_emitted_in_order() {
        let mut state = blank_state();
        for x in 0..3 {
            state.get_mut(x, 0).tile_type = TileType::Red;
        }
        let group = MatchGroup {
            tile_type: TileType::Red,
            positions: (0..3).map(|x| Position::new(x, 0)).collect(),
        };
        let mut collector = BufferedCollector::new();
        process_matches(&mut state, &[group], &mut collector, 5, 0.5);

        let events = collector.get_events();
        assert!(events
            .iter()
            .all(|e| e.tick() == 5));
        assert!(matches!(events.last(), Some(Event::MatchResolved { .. })));
    }
}
