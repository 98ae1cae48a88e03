//! Game clock - elapsed-time and gravity tickers
//!
//! The clock does not own a timer. The driver reports how much real time passed and the
//! clock says which tickers fired. Both tickers share one accumulator model:
//!
//! - **Elapsed-time ticker**: fires every [`ELAPSED_TICK_MS`].
//! - **Gravity ticker**: fires every [`gravity_interval_ms`] for the current elapsed tick count.
//!
//! The gravity interval is re-read after every step, so a difficulty change takes effect
//! at the very next deadline.

use crate::types::{BASE_DROP_MS, DROP_FLOOR_MS, DROP_STEP_MS, ELAPSED_TICK_MS, TICKS_PER_STEP};

/// Gravity interval for a given number of elapsed ticks.
///
/// `max(800 - floor(elapsed / 30) * 100, 200)`
///
/// # Examples
///
/// ```
/// use neon_tetris_core::clock::gravity_interval_ms;
///
/// assert_eq!(gravity_interval_ms(0), 800);
/// assert_eq!(gravity_interval_ms(29), 800);
/// assert_eq!(gravity_interval_ms(30), 700);
/// assert_eq!(gravity_interval_ms(10_000), 200);
/// ```
pub fn gravity_interval_ms(elapsed_ticks: u32) -> u32 {
    let steps = elapsed_ticks / TICKS_PER_STEP;
    BASE_DROP_MS
        .saturating_sub(steps.saturating_mul(DROP_STEP_MS))
        .max(DROP_FLOOR_MS)
}

/// Tickers that fired during one [`GameClock::advance`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClockTicks {
    pub elapsed: bool,
    pub gravity: bool,
}

/// Accumulators for both tickers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GameClock {
    elapsed_timer_ms: u32,
    gravity_timer_ms: u32,
}

impl GameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-arm both tickers with a full interval (start, pause, resume, game over).
    pub fn reset(&mut self) {
        self.elapsed_timer_ms = 0;
        self.gravity_timer_ms = 0;
    }

    pub fn elapsed_timer_ms(&self) -> u32 {
        self.elapsed_timer_ms
    }

    pub fn gravity_timer_ms(&self) -> u32 {
        self.gravity_timer_ms
    }

    /// Milliseconds until the next ticker fires.
    ///
    /// Zero means a ticker is already due (the gravity interval shrank under an
    /// accumulator that was close to its old deadline).
    pub fn until_next(&self, elapsed_ticks: u32) -> u32 {
        let elapsed = ELAPSED_TICK_MS.saturating_sub(self.elapsed_timer_ms);
        let gravity = gravity_interval_ms(elapsed_ticks).saturating_sub(self.gravity_timer_ms);
        elapsed.min(gravity)
    }

    /// Advance both accumulators by `elapsed_ms`.
    ///
    /// Each ticker fires at most once per call; callers that need exact ordering step by at
    /// most [`GameClock::until_next`] at a time.
    pub fn advance(&mut self, elapsed_ms: u32, elapsed_ticks: u32) -> ClockTicks {
        let mut ticks = ClockTicks::default();

        self.elapsed_timer_ms = self.elapsed_timer_ms.saturating_add(elapsed_ms);
        if self.elapsed_timer_ms >= ELAPSED_TICK_MS {
            self.elapsed_timer_ms -= ELAPSED_TICK_MS;
            ticks.elapsed = true;
        }

        self.gravity_timer_ms = self.gravity_timer_ms.saturating_add(elapsed_ms);
        if self.gravity_timer_ms >= gravity_interval_ms(elapsed_ticks) {
            self.gravity_timer_ms = 0;
            ticks.gravity = true;
        }

        ticks
    }
}
