//! Game Loop
//!
//! Single entry point orchestrating one tick through every system.
//! Nothing here is asynchronous; "async" in this domain just means a
//! match can span multiple ticks, not that any task runs concurrently.

use crate::game::events::{Event, EventCollector};
use crate::game::grid::GameState;
use crate::game::match_finder::find_match_groups;
use crate::game::match_processor::process_matches;
use crate::game::physics;
use crate::game::power_up::try_activate;
use crate::game::refill::{refill_top_row, RefillHistory};

/// Summary of one tick's outcome, consumed by [`crate::engine::SimulationEngine`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StepOutcome {
    /// True iff the board had no falling tiles, no matches, and no
    /// suspended tiles at the end of this tick.
    pub is_stable: bool,
    /// True iff any tile had `is_falling == true` at the end of this tick.
    pub has_falling_tiles: bool,
    /// True iff the match finder would report matches at the end of this tick.
    pub has_pending_matches: bool,
    /// Score gained from match processing this tick.
    pub score_gained: i32,
}

/// Orchestrates one tick: physics, then (if stable) match/gravity/refill.
pub struct GameLoop {
    refill_history: RefillHistory,
}

impl Default for GameLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl GameLoop {
    /// A fresh loop with empty refill history.
    pub fn new() -> Self {
        Self {
            refill_history: RefillHistory::new(),
        }
    }

    /// Run one tick of `dt` seconds against `state`.
    ///
    /// Ordering guarantee: events from the match phase precede the gravity
    /// phase; a match phase's direct destructions precede chained ones
    /// (enforced inside [`try_activate`]).
    pub fn update(
        &mut self,
        state: &mut GameState,
        dt: f32,
        collector: &mut dyn EventCollector,
        tick: i64,
        sim_time: f32,
    ) -> StepOutcome {
        collector.emit(Event::TickStarted { tick, sim_time });

        physics::update(state, dt);

        let mut score_gained = 0;

        if physics::is_stable(state) {
            let groups = find_match_groups(state, None);
            if !groups.is_empty() {
                score_gained = process_matches(state, &groups, collector, tick, sim_time);

                // Newly created bomb tiles are dormant; only bombs formed
                // at a cell that was itself already a bomb chain-detonate
                // here (swap-triggered activation is driven by
                // `SimulationEngine::try_swap`, not this pass).
                let triggered: Vec<_> = state
                    .grid
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.bomb.is_bomb() && t.is_suspended)
                    .map(|(idx, _)| {
                        let x = idx as i32 % state.width;
                        let y = idx as i32 / state.width;
                        crate::game::grid::Position::new(x, y)
                    })
                    .collect();
                for pos in triggered {
                    try_activate(state, pos, collector, tick, sim_time);
                }
            } else {
                physics::compact_columns(state, collector, tick, sim_time);
                if state.grid.iter().any(|t| t.is_empty()) {
                    refill_top_row(state, &mut self.refill_history, collector, tick, sim_time);
                }
            }
        }

        let has_falling_tiles = state.grid.iter().any(|t| t.is_falling);
        let has_pending_matches = !find_match_groups(state, None).is_empty();
        let is_stable = !has_falling_tiles
            && !has_pending_matches
            && !state.grid.iter().any(|t| t.is_suspended);

        collector.emit(Event::TickCompleted {
            tick,
            sim_time,
            is_stable,
        });

        StepOutcome {
            is_stable,
            has_falling_tiles,
            has_pending_matches,
            score_gained,
        }
    }
}
