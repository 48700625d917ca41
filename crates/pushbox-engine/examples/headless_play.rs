//! Headless demo -- plays scripted solutions of two built-in levels, records
//! them, and checks that the recordings replay to the same states.
//!
//! Run with:
//!   cargo run --example headless_play -p pushbox-engine
//!
//! Set `RUST_LOG=debug` to see moves, sounds and checkpoints as they happen.

use anyhow::Context;
use pushbox_engine::prelude::*;

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn glyph(kind: PieceKind) -> char {
    match kind {
        PieceKind::Wall => '#',
        PieceKind::Player => '@',
        PieceKind::Crate => '$',
        PieceKind::Goal => '.',
        PieceKind::Static => '%',
        PieceKind::Floor => ' ',
    }
}

/// One line per row; a crate resting on a goal is drawn as `*`.
fn render(level: &Level) -> anyhow::Result<String> {
    let grid = level.grid();
    let mut out = String::new();
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            let at = Coordinate::new(x as i32, y as i32);
            let crate_on_goal = grid.has_kind_at(at, PieceKind::Crate)?
                && grid.has_kind_at(at, PieceKind::Goal)?;
            if crate_on_goal {
                out.push('*');
                continue;
            }
            out.push(match grid.top(at)? {
                Some(piece) => glyph(grid.kind_of(piece)?),
                None => ' ',
            });
        }
        out.push('\n');
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Scripted play
// ---------------------------------------------------------------------------

fn play(name: &str, script: &[InputFrame], config: &GameConfig) -> anyhow::Result<ReplayLog> {
    let map = maps::by_name(name).with_context(|| format!("no built-in map {name:?}"))?;
    let music = MusicPlayer::new(Box::new(TracingSink));
    let mut session = Session::with_music(map.clone(), config.clone(), music)?;
    let frame_ms = config.walk_speed_ms;
    let mut recorder = MoveRecorder::new(map, frame_ms, config.replay_checkpoint_interval);

    println!("== {name} ==");
    print!("{}", render(session.level())?);

    for input in script {
        recorder.step(&mut session, *input)?;
    }

    print!("{}", render(session.level())?);
    println!(
        "won: {}, moves: {}, frames: {}",
        session.is_won(),
        session.level().move_count(),
        session.frame()
    );
    Ok(recorder.finish())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let config = GameConfig::default();
    let left = InputFrame::press(Direction::Left);
    let right = InputFrame::press(Direction::Right);

    // A wrong turn, taken back, before the real solution.
    let mut tutorial = vec![InputFrame::press(Direction::Up), InputFrame::undo_request()];
    tutorial.extend(std::iter::repeat(left).take(6));
    let twins = vec![right; 4];

    for (name, script) in [("tutorial", tutorial), ("twins", twins)] {
        let log = play(name, &script, &config)?;
        let result = replay(&config, &log)?;
        match result.first_divergence {
            None => println!("replay of {name}: {} frames match\n", result.frames_replayed),
            Some(d) => anyhow::bail!(
                "replay of {name} diverged at frame {}: expected {}, got {}",
                d.frame,
                d.expected_hash,
                d.actual_hash
            ),
        }
    }
    Ok(())
}
