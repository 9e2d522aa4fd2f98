use criterion::{criterion_group, criterion_main, Criterion};

use match3_core::engine::{SimulationConfig, SimulationEngine};
use match3_core::game::{GameConfig, GameState, Position};

fn bench_config() -> GameConfig {
    GameConfig {
        width: 8,
        height: 8,
        tile_types_count: 6,
        ..GameConfig::default()
    }
}

fn bench_tick_throughput(c: &mut Criterion) {
    let state = GameState::new(bench_config(), 42).expect("valid board");
    let mut engine = SimulationEngine::new(state, SimulationConfig::for_ai());

    c.bench_function("tick_stable_board", |b| {
        b.iter(|| {
            engine.tick();
        });
    });
}

fn bench_run_until_stable_after_swap(c: &mut Criterion) {
    c.bench_function("run_until_stable_after_swap", |b| {
        b.iter_batched(
            || {
                let state = GameState::new(bench_config(), 7).expect("valid board");
                SimulationEngine::new(state, SimulationConfig::for_ai())
            },
            |mut engine| {
                engine.try_swap(Position::new(0, 0), Position::new(1, 0));
                engine.run_until_stable();
            },
            criterion::BatchSize::SmallInput,
        );
    });
}

fn bench_preview_move(c: &mut Criterion) {
    let state = GameState::new(bench_config(), 99).expect("valid board");

    c.bench_function("preview_move", |b| {
        b.iter(|| {
            SimulationEngine::preview_move(&state, Position::new(2, 2), Position::new(2, 3));
        });
    });
}

fn bench_determinism_replay(c: &mut Criterion) {
    let moves = [
        (Position::new(0, 0), Position::new(1, 0)),
        (Position::new(2, 3), Position::new(2, 4)),
        (Position::new(5, 5), Position::new(5, 6)),
    ];

    c.bench_function("deterministic_replay", |b| {
        b.iter(|| {
            let state = GameState::new(bench_config(), 2024).expect("valid board");
            let mut engine = SimulationEngine::new(state, SimulationConfig::for_ai());
            for &(from, to) in moves.iter() {
                engine.try_swap(from, to);
                engine.run_until_stable();
            }
            engine.state().score
        });
    });
}

criterion_group!(
    benches,
    bench_tick_throughput,
    bench_run_until_stable_after_swap,
    bench_preview_move,
    bench_determinism_replay,
);
criterion_main!(benches);
