//! Move protocol benchmarks.
//!
//! Measures cascading crate pushes (the deepest path through the movable
//! entity protocol), the rollback of a cascade that ends in a wall, and a
//! move followed by its undo.
//!
//! Run with: `cargo bench --bench engine_benchmarks -p pushbox-engine`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use pushbox_engine::prelude::*;

fn instant() -> GameConfig {
    GameConfig {
        walk_speed_ms: 0,
        ..GameConfig::default()
    }
}

/// A single row: the player, `crates` crates in a line, then `end`.
fn chain(crates: usize, end: char) -> Level {
    let row = format!("P{}{end}", "B".repeat(crates));
    let map = LevelMap::parse("chain", &[row]).unwrap();
    Level::load(&map, instant()).unwrap()
}

fn bench_cascade_push(c: &mut Criterion) {
    let mut group = c.benchmark_group("cascade_push_and_undo");
    for &crates in &[1usize, 8, 32] {
        let mut level = chain(crates, '.');
        group.bench_with_input(BenchmarkId::from_parameter(crates), &crates, |b, _| {
            b.iter(|| {
                let moved = level.move_players(Direction::Right).unwrap();
                level.undo_move();
                black_box(moved)
            });
        });
    }
    group.finish();
}

fn bench_cascade_rollback(c: &mut Criterion) {
    let mut group = c.benchmark_group("cascade_rollback");
    for &crates in &[1usize, 8, 32] {
        let mut level = chain(crates, 'W');
        group.bench_with_input(BenchmarkId::from_parameter(crates), &crates, |b, _| {
            b.iter(|| black_box(level.move_players(Direction::Right).unwrap()));
        });
    }
    group.finish();
}

fn bench_session_frames(c: &mut Criterion) {
    let map = maps::by_name("tutorial").unwrap();
    let left = InputFrame::press(Direction::Left);
    c.bench_function("tutorial_solve_and_restart", |b| {
        let mut session = Session::new(map.clone(), instant()).unwrap();
        b.iter(|| {
            for _ in 0..6 {
                session.step(&left, 0).unwrap();
            }
            let won = session.is_won();
            session.restart().unwrap();
            black_box(won)
        });
    });
}

criterion_group!(
    benches,
    bench_cascade_push,
    bench_cascade_rollback,
    bench_session_frames
);
criterion_main!(benches);
