//! Power-Up Handler
//!
//! Bomb activation and chained detonation. A cleared tile that itself
//! carries a bomb is activated transitively in BFS order, bounded by board
//! size (no tile is visited twice in one chain, so `width * height` is a
//! hard upper bound, no recursion needed).

use std::collections::{HashSet, VecDeque};

use crate::game::events::{DestroyReason, Event, EventCollector};
use crate::game::grid::{BombKind, GameState, Position, TileType};
use crate::game::match_processor::most_common_type;

/// Positions cleared by one bomb's blast, before chaining.
fn blast_positions(state: &GameState, p: Position, kind: BombKind, swapped_type: Option<TileType>) -> Vec<Position> {
    match kind {
        BombKind::None => Vec::new(),
        BombKind::LineH => (0..state.width).map(|x| Position::new(x, p.y)).collect(),
        BombKind::LineV => (0..state.height).map(|y| Position::new(p.x, y)).collect(),
        BombKind::Area => {
            let mut out = Vec::with_capacity(9);
            for dy in -1..=1 {
                for dx in -1..=1 {
                    let cell = Position::new(p.x + dx, p.y + dy);
                    if state.is_valid(cell) {
                        out.push(cell);
                    }
                }
            }
            out
        }
        BombKind::ColorClear => {
            let target = swapped_type.unwrap_or_else(|| most_common_type(state));
            let mut out = Vec::new();
            for y in 0..state.height {
                for x in 0..state.width {
                    let tile = state.get(x, y);
                    if tile.tile_type == target && !tile.is_suspended {
                        out.push(Position::new(x, y));
                    }
                }
            }
            out
        }
    }
}

/// Activate the bomb at `p`, if any, clearing its region and chaining into
/// any other bombs its blast touches. Returns `true` if a bomb fired.
pub fn try_activate(
    state: &mut GameState,
    p: Position,
    collector: &mut dyn EventCollector,
    tick: i64,
    sim_time: f32,
) -> bool {
    if !state.is_valid(p) {
        return false;
    }
    let kind = state.get_pos(p).bomb;
    if !kind.is_bomb() {
        return false;
    }

    let mut visited: HashSet<Position> = HashSet::with_capacity((state.width * state.height) as usize);
    let mut queue: VecDeque<(Position, DestroyReason)> = VecDeque::new();
    queue.push_back((p, DestroyReason::Bomb));

    while let Some((pos, reason)) = queue.pop_front() {
        if visited.contains(&pos) {
            continue;
        }
        let tile = *state.get_pos(pos);
        if tile.is_empty() {
            continue;
        }
        visited.insert(pos);

        // The activating/chained bomb clears itself first.
        state.get_mut_pos(pos).is_suspended = true;
        collector.emit(Event::TileDestroyed {
            tick,
            sim_time,
            tile_id: tile.id,
            grid_position: pos,
            tile_type: tile.tile_type,
            reason,
        });
        collector.emit(Event::BombActivated {
            tick,
            sim_time,
            tile_id: tile.id,
            grid_position: pos,
            kind: tile.bomb,
        });

        for blast_pos in blast_positions(state, pos, tile.bomb, None) {
            if blast_pos == pos || visited.contains(&blast_pos) || !state.is_valid(blast_pos) {
                continue;
            }
            let blast_tile = *state.get_pos(blast_pos);
            if blast_tile.is_empty() || blast_tile.is_suspended {
                continue;
            }

            if blast_tile.bomb.is_bomb() {
                // Deferred: destroyed and expanded on its own turn, tagged Chain.
                queue.push_back((blast_pos, DestroyReason::Chain));
            } else {
                visited.insert(blast_pos);
                state.get_mut_pos(blast_pos).is_suspended = true;
                collector.emit(Event::TileDestroyed {
                    tick,
                    sim_time,
                    tile_id: blast_tile.id,
                    grid_position: blast_pos,
                    tile_type: blast_tile.tile_type,
                    reason,
                });
            }

            if visited.len() as i32 >= state.width * state.height {
                break;
            }
        }
    }

    true
}

/// Handle a swap between two bomb tiles, per the super-combination table:
/// Line+Line = cross, Line+Area = 3-wide cross, Area+Area = 5x5,
/// anything+ColorClear = clear that color then apply the other bomb at
/// every cleared cell. Each bomb's own blast is evaluated at its own
/// post-swap position (`a` and `b`), not a shared anchor. Runs before the
/// normal match phase of the tick that contains the swap. Returns the
/// score gained.
pub fn process_special_move(
    state: &mut GameState,
    a: Position,
    b: Position,
    collector: &mut dyn EventCollector,
    tick: i64,
    sim_time: f32,
) -> i32 {
    let kind_a = state.get_pos(a).bomb;
    let kind_b = state.get_pos(b).bomb;
    if !kind_a.is_bomb() && !kind_b.is_bomb() {
        return 0;
    }

    let base = state.config.base_score_per_tile;
    let mut cleared = HashSet::new();

    if kind_a == BombKind::ColorClear || kind_b == BombKind::ColorClear {
        let (clear_kind, clear_pos, other_kind, other_pos) = if kind_a == BombKind::ColorClear {
            (kind_a, a, kind_b, b)
        } else {
            (kind_b, b, kind_a, a)
        };
        let swapped_type = Some(state.get_pos(other_pos).tile_type);
        for pos in blast_positions(state, clear_pos, clear_kind, swapped_type) {
            cleared.insert(pos);
        }
        if other_kind.is_bomb() {
            for pos in cleared.clone() {
                for p2 in blast_positions(state, pos, other_kind, None) {
                    cleared.insert(p2);
                }
            }
        }
    } else if kind_a.is_bomb() && kind_b.is_bomb() {
        // Cross / wide-cross / 5x5: union both bombs' blast areas, each
        // evaluated at its own post-swap position.
        for pos in blast_positions(state, a, kind_a, None) {
            cleared.insert(pos);
        }
        for pos in blast_positions(state, b, kind_b, None) {
            cleared.insert(pos);
        }
        if kind_a == BombKind::Area && kind_b == BombKind::Area {
            for dy in -2..=2 {
                for dx in -2..=2 {
                    let cell = Position::new(a.x + dx, a.y + dy);
                    if state.is_valid(cell) {
                        cleared.insert(cell);
                    }
                }
            }
        }
    } else {
        let (bomb_pos, kind) = if kind_a.is_bomb() { (a, kind_a) } else { (b, kind_b) };
        for pos in blast_positions(state, bomb_pos, kind, None) {
            cleared.insert(pos);
        }
    }

    let mut score = 0i32;
    for pos in cleared {
        if !state.is_valid(pos) {
            continue;
        }
        let tile = *state.get_pos(pos);
        if tile.is_empty() || tile.is_suspended {
            continue;
        }
        state.get_mut_pos(pos).is_suspended = true;
        score += base;
        collector.emit(Event::TileDestroyed {
            tick,
            sim_time,
            tile_id: tile.id,
            grid_position: pos,
            tile_type: tile.tile_type,
            reason: DestroyReason::Bomb,
        });
    }

    state.score += score as i64;
    score
}
