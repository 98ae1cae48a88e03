//! Terminal runner (default binary).
//!
//! Crossterm for input, the framebuffer renderer for output, and the optional TCP adapter
//! for remote control. The loop owns the `GameState`; keys, adapter commands and the clock
//! all feed it one event at a time.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};

use neon_tetris::adapter::Adapter;
use neon_tetris::core::GameState;
use neon_tetris::input::{map_key_event, should_quit};
use neon_tetris::term::{AdapterStatusView, FrameBuffer, GameView, TerminalRenderer, Viewport};
use neon_tetris::types::{GameEvent, TICK_MS};

fn main() -> Result<()> {
    let seed = seed_from_env();

    // Bind before entering raw mode so address errors print normally.
    let adapter = Adapter::start_from_env()?;

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, seed, adapter);

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

/// `NEON_TETRIS_SEED` for reproducible games, otherwise the wall clock.
fn seed_from_env() -> u32 {
    std::env::var("NEON_TETRIS_SEED")
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
                .unwrap_or(1)
        })
}

fn run(term: &mut TerminalRenderer, seed: u32, mut adapter: Option<Adapter>) -> Result<()> {
    let mut game = GameState::new(seed);

    let view = GameView::default();
    let status = adapter.as_ref().map(|a| AdapterStatusView {
        port: a.local_addr().port(),
    });
    let mut fb = FrameBuffer::new(0, 0);

    let tick_duration = Duration::from_millis(TICK_MS as u64);
    let mut last_tick = Instant::now();

    loop {
        // Render.
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        let snap = game.snapshot();
        view.render_into_with_adapter(&snap, status.as_ref(), Viewport::new(w, h), &mut fb);
        term.draw_swap(&mut fb)?;

        let mut changed = false;

        // Input with timeout until next tick.
        let timeout = tick_duration
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if should_quit(key) {
                        return Ok(());
                    }
                    match map_key_event(key) {
                        // Enter only starts from the title and game-over screens.
                        Some(GameEvent::Start) if game.playing() => {}
                        Some(event) => changed |= game.apply(event),
                        None => {}
                    }
                }
                Event::Resize(..) => term.invalidate(),
                _ => {}
            }
        }

        if let Some(adapter) = adapter.as_mut() {
            changed |= adapter.pump(&mut game);
        }

        // Tick with the real elapsed time, carrying sub-millisecond remainders.
        let elapsed = last_tick.elapsed();
        if elapsed >= tick_duration {
            let ms = elapsed.as_millis() as u32;
            last_tick += Duration::from_millis(ms as u64);
            changed |= game.tick(ms);
        }

        if changed {
            if let Some(adapter) = adapter.as_mut() {
                adapter.broadcast_observation(&mut game);
            }
        }
    }
}
