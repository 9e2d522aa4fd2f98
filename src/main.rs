//! Match-3 simulation demo binary.
//!
//! Drives the library end to end the way a test harness or headless
//! runner would: no rendering, no network, just `tracing::info!` progress
//! and a determinism check via replay.

use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use match3_core::engine::{SimulationConfig, SimulationEngine};
use match3_core::game::{GameConfig, GameState, Position};
use match3_core::{MAX_TILE_TYPES, TICK_RATE, VERSION};

const DEMO_SEED: u64 = 12345;
const DEMO_TICKS: u32 = 600;

fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber).expect("failed to set tracing subscriber");

    info!("match3-core demo v{}", VERSION);
    info!("tick rate: {} Hz", TICK_RATE);

    demo_match();
}

fn demo_match() {
    info!("=== starting demo match ===");

    let config = GameConfig {
        width: 8,
        height: 8,
        tile_types_count: MAX_TILE_TYPES.min(6),
        ..GameConfig::default()
    };

    let state = GameState::new(config.clone(), DEMO_SEED).expect("valid board configuration");
    info!("board: {}x{}, seed {}", state.width, state.height, DEMO_SEED);

    let moves = [
        (Position::new(0, 0), Position::new(1, 0)),
        (Position::new(2, 3), Position::new(2, 4)),
        (Position::new(5, 5), Position::new(5, 6)),
        (Position::new(3, 1), Position::new(4, 1)),
    ];

    let mut engine = SimulationEngine::new(state.clone(), SimulationConfig::for_human_play());
    let mut total_events = 0usize;

    for (i, &(from, to)) in moves.iter().cycle().take(DEMO_TICKS as usize / 50).enumerate() {
        let accepted = engine.try_swap(from, to);
        info!(move_index = i, ?from, ?to, accepted, "attempted swap");

        let result = engine.run_until_stable();
        let drained = engine.drain_events();
        total_events += drained.len();

        info!(
            tick = result.current_tick,
            score = engine.state().score,
            stable = result.is_stable,
            events_this_run = drained.len(),
            "run_until_stable complete"
        );
    }

    info!("=== demo match results ===");
    info!("final score: {}", engine.state().score);
    info!("total events observed: {}", total_events);

    info!("=== verifying determinism via replay ===");
    let mut replay_engine = SimulationEngine::new(state.clone(), SimulationConfig::for_human_play());
    for &(from, to) in moves.iter().cycle().take(DEMO_TICKS as usize / 50) {
        replay_engine.try_swap(from, to);
        replay_engine.run_until_stable();
    }

    if replay_engine.state() == engine.state() {
        info!("determinism verified: replayed state matches");
    } else {
        info!("determinism failure: replayed state differs");
    }
}
