//! Match Finder
//!
//! Scans horizontal and vertical runs of identical, settled tiles of length
//! >= 3 and merges overlapping runs (L/T intersections, a 5-run overlapping
//! a 3-run) into single groups via union-find over grid cells.

use crate::game::grid::{GameState, Position, TileType};

/// A merged set of matched cells sharing one tile type.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchGroup {
    /// The common tile type of every cell in the group.
    pub tile_type: TileType,
    /// Member cells, sorted for deterministic downstream iteration.
    pub positions: Vec<Position>,
}

/// Minimal union-find over flat grid indices, scoped to one scan.
struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            self.parent[x] = self.find(self.parent[x]);
        }
        self.parent[x]
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            self.parent[ra] = rb;
        }
    }
}

/// Runs of length >= 3 through a single cell, used to scope scanning to
/// `foci` after a known swap instead of re-scanning the whole board.
fn horizontal_run_at(state: &GameState, x: i32, y: i32) -> Option<(i32, i32)> {
    let t = state.get(x, y).tile_type;
    if !state.get(x, y).is_settled() {
        return None;
    }
    let mut left = x;
    while left > 0 && state.get(left - 1, y).is_settled() && state.get(left - 1, y).tile_type == t {
        left -= 1;
    }
    let mut right = x;
    while right < state.width - 1
        && state.get(right + 1, y).is_settled()
        && state.get(right + 1, y).tile_type == t
    {
        right += 1;
    }
    if right - left + 1 >= 3 {
        Some((left, right))
    } else {
        None
    }
}

fn vertical_run_at(state: &GameState, x: i32, y: i32) -> Option<(i32, i32)> {
    let t = state.get(x, y).tile_type;
    if !state.get(x, y).is_settled() {
        return None;
    }
    let mut top = y;
    while top > 0 && state.get(x, top - 1).is_settled() && state.get(x, top - 1).tile_type == t {
        top -= 1;
    }
    let mut bottom = y;
    while bottom < state.height - 1
        && state.get(x, bottom + 1).is_settled()
        && state.get(x, bottom + 1).tile_type == t
    {
        bottom += 1;
    }
    if bottom - top + 1 >= 3 {
        Some((top, bottom))
    } else {
        None
    }
}

/// Find and merge all match groups on the board.
///
/// `foci`, if provided, restricts scanning to rows/columns passing through
/// those cells, a micro-optimization for the common post-swap case. A
/// `None` focus list scans the full board.
pub fn find_match_groups(state: &GameState, foci: Option<&[Position]>) -> Vec<MatchGroup> {
    let w = state.width;
    let h = state.height;
    let mut uf = UnionFind::new((w * h) as usize);
    let mut member = vec![false; (w * h) as usize];

    let rows: Vec<i32> = match foci {
        Some(cells) => cells.iter().map(|p| p.y).collect(),
        None => (0..h).collect(),
    };
    let cols: Vec<i32> = match foci {
        Some(cells) => cells.iter().map(|p| p.x).collect(),
        None => (0..w).collect(),
    };

    for &y in &rows {
        let mut x = 0;
        while x < w {
            if let Some((left, right)) = horizontal_run_at(state, x, y) {
                for cx in left..=right {
                    let idx = state.index(cx, y);
                    member[idx] = true;
                    uf.union(state.index(left, y), idx);
                }
                x = right + 1;
            } else {
                x += 1;
            }
        }
    }

    for &x in &cols {
        let mut y = 0;
        while y < h {
            if let Some((top, bottom)) = vertical_run_at(state, x, y) {
                for cy in top..=bottom {
                    let idx = state.index(x, cy);
                    member[idx] = true;
                    uf.union(state.index(x, top), idx);
                }
                y = bottom + 1;
            } else {
                y += 1;
            }
        }
    }

    let mut groups: std::collections::BTreeMap<usize, Vec<Position>> = std::collections::BTreeMap::new();
    for idx in 0..(w * h) as usize {
        if member[idx] {
            let root = uf.find(idx);
            let x = (idx as i32) % w;
            let y = (idx as i32) / w;
            groups.entry(root).or_default().push(Position::new(x, y));
        }
    }

    groups
        .into_values()
        .map(|mut positions| {
            positions.sort();
            let tile_type = state.get_pos(positions[0]).tile_type;
            MatchGroup {
                tile_type,
                positions,
            }
        })
        .collect()
}

/// Fast boolean check: does the board have any match at all.
pub fn has_matches(state: &GameState) -> bool {
    for y in 0..state.height {
        for x in 0..state.width {
            if horizontal_run_at(state, x, y).is_some() || vertical_run_at(state, x, y).is_some() {
                return true;
            }
        }
    }
    false
}

/// Fast boolean check: does a match run through a specific cell.
pub fn has_match_at(state: &GameState, p: Position) -> bool {
    if !state.is_valid(p) {
        return false;
    }
    horizontal_run_at(state, p.x, p.y).is_some() || vertical_run_at(state, p.x, p.y).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::grid::GameConfig;

    fn blank_state() -> GameState {
        let config = GameConfig {
            width: 8,
            height: 8,
            ..GameConfig::default()
        };
        GameState::new(config, 1).unwrap()
    }

    fn paint_row(state: &mut GameState, y: i32, x0: i32, len: i32, t: TileType) {
        for x in x0..x0 + len {
            state.get_mut(x, y).tile_type = t;
        }
    }

    fn paint_col(state: &mut GameState, x: i32, y0: i32, len: i32, t: TileType) {
        for y in y0..y0 + len {
            state.get_mut(x, y).tile_type = t;
        }
    }

    #[test]
    fn test_simple_horizontal_run() {
        let mut state = blank_state();
        paint_row(&mut state, 0, 0, 3, TileType::Red);
        assert!(has_matches(&state));
        let groups = find_match_groups(&state, None);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].positions.len(), 3);
        assert_eq!(groups[0].tile_type, TileType::Red);
    }

    #[test]
    fn test_no_match_below_three() {
        let mut state = blank_state();
        paint_row(&mut state, 0, 0, 2, TileType::Red);
        assert!(!has_matches(&state));
        assert!(find_match_groups(&state, None).is_empty());
    }

    #[test]
    fn test_l_intersection_merges_into_one_group() {
        let mut state = blank_state();
        paint_row(&mut state, 2, 0, 3, TileType::Blue);
        paint_col(&mut state, 0, 2, 3, TileType::Blue);
        let groups = find_match_groups(&state, None);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].positions.len(), 5);
    }

    #[test]
    fn test_overlapping_five_and_three_merge() {
        let mut state = blank_state();
        paint_row(&mut state, 0, 0, 5, TileType::Green);
        paint_col(&mut state, 2, 0, 3, TileType::Green);
        let groups = find_match_groups(&state, None);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].positions.len(), 7);
    }

    #[test]
    fn test_suspended_tiles_excluded() {
        let mut state = blank_state();
        paint_row(&mut state, 0, 0, 3, TileType::Red);
        state.get_mut(1, 0).is_suspended = true;
        assert!(!has_matches(&state));
    }

    #[test]
    fn test_has_match_at_specific_cell() {
        let mut state = blank_state();
        paint_row(&mut state, 0, 0, 3, TileType::Yellow);
        assert!(has_match_at(&state, Position::new(1, 0)));
        assert!(!has_match_at(&state, Position::new(5, 5)));
    }

    #[test]
    fn test_foci_restricts_scan() {
        let mut state = blank_state();
        paint_row(&mut state, 0, 0, 3, TileType::Red);
        paint_row(&mut state, 5, 0, 3, TileType::Orange);
        let groups = find_match_groups(&state, Some(&[Position::new(1, 0)]));
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].tile_type, TileType::Red);
    }
}
