use criterion::{black_box, criterion_group, criterion_main, Criterion};
use neon_tetris::adapter::build_observation;
use neon_tetris::core::{Board, GameSnapshot, GameState, ScriptedPieces};
use neon_tetris::term::{FrameBuffer, GameView, Viewport};
use neon_tetris::types::{GameAction, GameEvent, PieceColor, PieceKind};

fn bench_tick(c: &mut Criterion) {
    let mut state = GameState::new(12345);
    state.apply(GameEvent::Start);

    c.bench_function("game_tick_16ms", |b| {
        b.iter(|| {
            if !state.playing() {
                state.apply(GameEvent::Start);
            }
            state.tick(black_box(16));
        })
    });
}

fn bench_line_clear(c: &mut Criterion) {
    c.bench_function("clear_4_lines", |b| {
        b.iter(|| {
            let mut board = Board::new();
            for y in 16..20 {
                board.fill_row(y, PieceColor::Cyan);
            }
            black_box(board.clear_full_rows());
        })
    });
}

fn bench_piece_spawn(c: &mut Criterion) {
    let mut state = GameState::new(12345);
    state.apply(GameEvent::Start);

    c.bench_function("spawn_piece", |b| {
        b.iter(|| {
            state.spawn_piece();
        })
    });
}

fn bench_hard_drop(c: &mut Criterion) {
    c.bench_function("hard_drop_and_lock", |b| {
        let mut state = GameState::with_source(ScriptedPieces::repeat(PieceKind::I));
        b.iter(|| {
            if !state.playing() {
                state.apply(GameEvent::Start);
            }
            state.apply(GameEvent::Input(black_box(GameAction::HardDrop)));
        })
    });
}

fn bench_snapshot_and_render(c: &mut Criterion) {
    let mut state = GameState::new(12345);
    state.apply(GameEvent::Start);
    let view = GameView::default();
    let mut snap = GameSnapshot::default();
    let mut fb = FrameBuffer::new(80, 24);

    c.bench_function("snapshot_render_80x24", |b| {
        b.iter(|| {
            state.snapshot_into(&mut snap);
            view.render_into(&snap, Viewport::new(80, 24), &mut fb);
            black_box(fb.cells().len());
        })
    });
}

fn bench_observation(c: &mut Criterion) {
    let mut state = GameState::new(12345);
    state.apply(GameEvent::Start);

    c.bench_function("build_observation", |b| {
        let mut seq = 0;
        b.iter(|| {
            seq += 1;
            black_box(build_observation(&state, seq, None));
        })
    });
}

criterion_group!(
    benches,
    bench_tick,
    bench_line_clear,
    bench_piece_spawn,
    bench_hard_drop,
    bench_snapshot_and_render,
    bench_observation
);
criterion_main!(benches);
