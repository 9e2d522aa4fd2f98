//! Simulation Engine
//!
//! Outer driver: fixed-step tick rate, `run_until_stable`, and the pure
//! `preview_move` facility AI strategies use to score candidate moves
//! without touching the caller's state.

use tracing::{debug, warn};

use crate::error::GameError;
use crate::game::events::{BufferedCollector, Event, EventCollector, NullCollector};
use crate::game::game_loop::GameLoop;
use crate::game::grid::{GameState, Position};
use crate::game::match_finder::has_matches;
use crate::game::power_up::{process_special_move, try_activate};

/// Either collector variant, so the engine can switch between them without
/// boxing or dynamic dispatch overhead in the common case.
enum Collector {
    Null(NullCollector),
    Buffered(BufferedCollector),
}

impl Collector {
    fn as_dyn(&mut self) -> &mut dyn EventCollector {
        match self {
            Collector::Null(c) => c,
            Collector::Buffered(c) => c,
        }
    }
}

/// Outer-loop configuration: tick pacing and behavior.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationConfig {
    /// Fixed timestep per tick, in seconds.
    pub fixed_delta_time: f32,
    /// `run_until_stable` gives up after this many ticks.
    pub max_ticks_per_run: u32,
    /// Whether events are collected at all.
    pub emit_events: bool,
    /// Multiplier applied to `fixed_delta_time` (does not change the tick
    /// count, only the simulated time each tick represents).
    pub time_scale: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::for_human_play()
    }
}

impl SimulationConfig {
    /// Human-facing defaults: real-time pacing, events on.
    pub fn for_human_play() -> Self {
        Self {
            fixed_delta_time: 1.0 / 60.0,
            max_ticks_per_run: 10_000,
            emit_events: true,
            time_scale: 1.0,
        }
    }

    /// AI/search preset: coarser timestep, events off, a higher tick cap
    /// since a search may legitimately need many cascades to resolve.
    pub fn for_ai() -> Self {
        Self {
            fixed_delta_time: 0.1,
            max_ticks_per_run: 50_000,
            emit_events: false,
            time_scale: 1.0,
        }
    }
}

/// Result of a single tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TickResult {
    /// The tick index just completed.
    pub current_tick: i64,
    /// Total simulated time elapsed, in seconds.
    pub elapsed_time: f32,
    /// True iff the board was stable at tick end.
    pub is_stable: bool,
    /// Reserved for front-ends with in-flight projectile effects; the core
    /// never sets this itself (no projectile concept in scope).
    pub has_active_projectiles: bool,
    /// True iff any tile was mid-fall at tick end.
    pub has_falling_tiles: bool,
    /// True iff the match finder reports matches at tick end.
    pub has_pending_matches: bool,
    /// The `fixed_delta_time` used for this tick.
    pub delta_time: f32,
}

/// Outcome of simulating a candidate move without mutating the caller's state.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MovePreview {
    /// Whether the move was legal and produced an effect.
    pub is_valid_move: bool,
    /// Score that would be gained.
    pub score_gained: i32,
    /// Tiles that would be cleared.
    pub tiles_cleared: u32,
    /// Number of distinct match-phase executions observed before stability.
    pub max_cascade_depth: u32,
    /// Number of bombs that would activate.
    pub bombs_activated: u32,
}

/// Outer driver owning a `GameState`, a `GameLoop`, and an event collector.
pub struct SimulationEngine {
    state: GameState,
    loop_: GameLoop,
    config: SimulationConfig,
    collector: Collector,
    current_tick: i64,
    elapsed_time: f32,
}

impl SimulationEngine {
    /// Build an engine around an already-constructed state.
    pub fn new(state: GameState, config: SimulationConfig) -> Self {
        let collector = if config.emit_events {
            Collector::Buffered(BufferedCollector::new())
        } else {
            Collector::Null(NullCollector::instance())
        };

        Self {
            state,
            loop_: GameLoop::new(),
            config,
            collector,
            current_tick: 0,
            elapsed_time: 0.0,
        }
    }

    /// Borrow the underlying state.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Run one tick.
    pub fn tick(&mut self) -> TickResult {
        let dt = self.config.fixed_delta_time * self.config.time_scale;
        self.current_tick += 1;
        self.elapsed_time += dt;

        let outcome = self.loop_.update(
            &mut self.state,
            dt,
            self.collector.as_dyn(),
            self.current_tick,
            self.elapsed_time,
        );

        debug!(tick = self.current_tick, stable = outcome.is_stable, "tick complete");

        TickResult {
            current_tick: self.current_tick,
            elapsed_time: self.elapsed_time,
            is_stable: outcome.is_stable,
            has_active_projectiles: false,
            has_falling_tiles: outcome.has_falling_tiles,
            has_pending_matches: outcome.has_pending_matches,
            delta_time: dt,
        }
    }

    /// Tick repeatedly until the board stabilizes, or `max_ticks_per_run`
    /// is reached. On exhaustion, returns the last result with
    /// `is_stable = false` and emits a `SimulationOverrun` event.
    pub fn run_until_stable(&mut self) -> TickResult {
        let mut last = TickResult::default();
        for ticks_run in 0..self.config.max_ticks_per_run {
            last = self.tick();
            if last.is_stable {
                return last;
            }
            if ticks_run + 1 == self.config.max_ticks_per_run {
                warn!(ticks_run = ticks_run + 1, "simulation did not stabilize");
                self.collector.as_dyn().emit(Event::SimulationOverrun {
                    tick: self.current_tick,
                    sim_time: self.elapsed_time,
                    ticks_run: ticks_run + 1,
                });
            }
        }
        last
    }

    /// Validate and apply a swap, without resolving its consequences.
    /// Subsequent `tick()` calls resolve it. Returns `false` (no mutation,
    /// no event) if the move is illegal.
    pub fn try_swap(&mut self, from: Position, to: Position) -> bool {
        if !self.state.is_valid(from) || !self.state.is_valid(to) || !from.is_adjacent(to) {
            return false;
        }
        if self.state.get_pos(from).is_empty() || self.state.get_pos(to).is_empty() {
            return false;
        }

        let tile_a = *self.state.get_pos(from);
        let tile_b = *self.state.get_pos(to);

        self.state.get_mut_pos(from).tile_type = tile_b.tile_type;
        self.state.get_mut_pos(from).bomb = tile_b.bomb;
        self.state.get_mut_pos(to).tile_type = tile_a.tile_type;
        self.state.get_mut_pos(to).bomb = tile_a.bomb;

        let creates_match = has_matches(&self.state);
        let involves_bomb = tile_a.bomb.is_bomb() || tile_b.bomb.is_bomb();

        if !creates_match && !involves_bomb {
            // Revert: no match and no bomb involvement, not a legal move.
            self.state.get_mut_pos(from).tile_type = tile_a.tile_type;
            self.state.get_mut_pos(from).bomb = tile_a.bomb;
            self.state.get_mut_pos(to).tile_type = tile_b.tile_type;
            self.state.get_mut_pos(to).bomb = tile_b.bomb;
            return false;
        }

        self.state.move_count += 1;
        if creates_match {
            // Hint for the next match phase's bomb-anchor placement
            // (`match_processor::anchor_cell`); consumed and cleared there.
            self.state.selected_position = to;
        }

        if involves_bomb && tile_a.bomb.is_bomb() && tile_b.bomb.is_bomb() {
            let tick = self.current_tick + 1;
            let sim_time = self.elapsed_time + self.config.fixed_delta_time;
            process_special_move(&mut self.state, from, to, self.collector.as_dyn(), tick, sim_time);
        } else if involves_bomb {
            let bomb_pos = if tile_a.bomb.is_bomb() { from } else { to };
            let tick = self.current_tick + 1;
            let sim_time = self.elapsed_time + self.config.fixed_delta_time;
            try_activate(&mut self.state, bomb_pos, self.collector.as_dyn(), tick, sim_time);
        }

        true
    }

    /// Clone `state`, disable events, run the given move to stability on
    /// the clone, and diff the outcome. The caller's state is untouched.
    pub fn preview_move(state: &GameState, from: Position, to: Position) -> MovePreview {
        let mut sandbox = SimulationEngine::new(state.clone(), SimulationConfig::for_ai());
        let score_before = sandbox.state.score;

        if !sandbox.try_swap(from, to) {
            return MovePreview {
                is_valid_move: false,
                ..MovePreview::default()
            };
        }

        let mut cascades = 0u32;
        let mut tiles_cleared = 0u32;
        let mut bombs_activated = 0u32;

        for _ in 0..sandbox.config.max_ticks_per_run {
            let result = sandbox.tick();
            if has_matches(&sandbox.state) || sandbox.state.grid.iter().any(|t| t.is_suspended) {
                cascades += 1;
            }
            if result.is_stable {
                break;
            }
        }

        for tile in &sandbox.state.grid {
            if tile.is_empty() {
                tiles_cleared += 1;
            }
            if tile.bomb.is_bomb() {
                bombs_activated += 1;
            }
        }

        MovePreview {
            is_valid_move: true,
            score_gained: (sandbox.state.score - score_before) as i32,
            tiles_cleared,
            max_cascade_depth: cascades,
            bombs_activated,
        }
    }

    /// Drain all buffered events (no-op, empty, for a disabled collector).
    pub fn drain_events(&mut self) -> Vec<Event> {
        self.collector.as_dyn().drain_events()
    }

    /// Construct a fresh engine and validate `config` fields used at
    /// construction time (presently a thin wrapper; dimension validation
    /// happens in `GameState::new`/`GameConfig::validate`).
    pub fn try_new(state: GameState, config: SimulationConfig) -> Result<Self, GameError> {
        Ok(Self::new(state, config))
    }
}
