//! Game state module - manages the complete session
//!
//! This module ties together the board, the piece catalog, collision checking, line
//! clearing, scoring and the clock. Every change is one event handled to completion by
//! [`GameState::apply`]: a lock, its line clear and the next spawn happen inside a single
//! call, so no caller ever observes a merged piece without its successor (except in the
//! terminal game-over state).

use crate::board::Board;
use crate::clock::{gravity_interval_ms, GameClock};
use crate::collision::collides;
use crate::lines::clear_lines_in_place;
use crate::pieces::{definition, spawn_x, Shape, SPAWN_Y};
use crate::rng::{PieceSource, SimpleRng};
use crate::scoring::calculate_drop_score;
use crate::snapshot::{ActiveSnapshot, GameSnapshot, TimersSnapshot};
use crate::types::*;

/// Active falling piece
///
/// Replaced by a new value on every move or rotation, never patched in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tetromino {
    pub kind: PieceKind,
    pub shape: Shape,
    pub x: i8,
    pub y: i8,
}

impl Tetromino {
    /// Create a new tetromino at its spawn position
    pub fn new(kind: PieceKind) -> Self {
        let shape = definition(kind).shape;
        Self {
            kind,
            shape,
            x: spawn_x(&shape),
            y: SPAWN_Y,
        }
    }

    pub fn color(&self) -> PieceColor {
        definition(self.kind).color
    }

    /// Check that the piece overlaps neither walls, floor, nor locked cells
    pub fn is_valid(&self, board: &Board) -> bool {
        !collides(self.x, self.y, &self.shape, board)
    }

    /// Whether the piece's full width lies within the board columns
    pub fn in_horizontal_bounds(&self) -> bool {
        self.x >= 0 && self.x as i16 + self.shape.width() as i16 <= BOARD_WIDTH as i16
    }

    /// Check if the piece is resting on the floor or a locked cell
    pub fn is_grounded(&self, board: &Board) -> bool {
        collides(self.x, self.y + 1, &self.shape, board)
    }

    /// Board coordinates of every occupied cell
    pub fn cells(&self) -> impl Iterator<Item = (i8, i8)> + '_ {
        self.shape.minos().map(move |(dx, dy)| (self.x + dx, self.y + dy))
    }
}

/// Complete session state
///
/// `R` picks the next piece; [`SimpleRng`] draws uniformly from a seed.
#[derive(Debug, Clone)]
pub struct GameState<R = SimpleRng> {
    board: Board,
    active: Option<Tetromino>,
    source: R,
    clock: GameClock,
    /// Pieces spawned in the current session.
    piece_id: u32,
    /// Last lock event (consumed by observers).
    last_event: Option<LockEvent>,
    score: u32,
    elapsed_ticks: u32,
    playing: bool,
    paused: bool,
    game_over: bool,
}

impl GameState<SimpleRng> {
    /// Create an idle session whose pieces come from a seeded RNG
    pub fn new(seed: u32) -> Self {
        Self::with_source(SimpleRng::new(seed))
    }
}

impl Default for GameState<SimpleRng> {
    fn default() -> Self {
        Self::new(1)
    }
}

impl<R: PieceSource> GameState<R> {
    /// Create an idle session (not playing, no active piece) with an explicit piece source
    pub fn with_source(source: R) -> Self {
        Self {
            board: Board::new(),
            active: None,
            source,
            clock: GameClock::new(),
            piece_id: 0,
            last_event: None,
            score: 0,
            elapsed_ticks: 0,
            playing: false,
            paused: false,
            game_over: false,
        }
    }

    pub fn playing(&self) -> bool {
        self.playing
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn game_over(&self) -> bool {
        self.game_over
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn elapsed_ticks(&self) -> u32 {
        self.elapsed_ticks
    }

    pub fn piece_id(&self) -> u32 {
        self.piece_id
    }

    pub fn active(&self) -> Option<Tetromino> {
        self.active
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn clock(&self) -> &GameClock {
        &self.clock
    }

    pub fn source(&self) -> &R {
        &self.source
    }

    /// Replace the locked cells (puzzle setups, replays, tests).
    ///
    /// Rejected (returns `false`, board unchanged) if the active piece would overlap the
    /// new cells.
    pub fn load_board(&mut self, board: Board) -> bool {
        if let Some(active) = self.active {
            if !active.is_valid(&board) {
                return false;
            }
        }
        self.board = board;
        true
    }

    /// Gravity and elapsed-time tickers only advance while this is true
    pub fn is_running(&self) -> bool {
        self.playing && !self.paused && !self.game_over
    }

    /// Current gravity interval; drivers re-read it after every tick
    pub fn gravity_interval_ms(&self) -> u32 {
        gravity_interval_ms(self.elapsed_ticks)
    }

    /// Single transition entry point for player input and timer events.
    ///
    /// Returns whether observable state changed.
    pub fn apply(&mut self, event: GameEvent) -> bool {
        match event {
            GameEvent::Start => {
                self.start_game();
                true
            }
            GameEvent::Input(action) => self.handle_input(action),
            GameEvent::ElapsedTick => {
                if !self.is_running() {
                    return false;
                }
                self.elapsed_ticks = self.elapsed_ticks.saturating_add(1);
                true
            }
            GameEvent::GravityTick => {
                if !self.is_running() {
                    return false;
                }
                self.move_down()
            }
        }
    }

    /// Reset to an empty board and spawn the first piece
    pub fn start_game(&mut self) {
        self.board.clear();
        self.active = None;
        self.piece_id = 0;
        self.last_event = None;
        self.score = 0;
        self.elapsed_ticks = 0;
        self.game_over = false;
        self.paused = false;
        self.playing = true;
        self.clock.reset();
        self.spawn_piece();
    }

    /// Flip the pause flag. No effect unless a game is being played.
    pub fn toggle_pause(&mut self) -> bool {
        if !self.playing || self.game_over {
            return false;
        }
        self.paused = !self.paused;
        // Resuming re-arms both tickers from zero.
        self.clock.reset();
        true
    }

    /// Dispatch a player command.
    ///
    /// Everything is ignored after game over. While paused (or before the first start) only
    /// [`GameAction::TogglePause`] is considered.
    pub fn handle_input(&mut self, action: GameAction) -> bool {
        if self.game_over {
            return false;
        }
        if action == GameAction::TogglePause {
            return self.toggle_pause();
        }
        if !self.is_running() {
            return false;
        }

        match action {
            GameAction::MoveLeft => self.move_horizontal(-1),
            GameAction::MoveRight => self.move_horizontal(1),
            GameAction::SoftDrop => self.move_down(),
            GameAction::Rotate => self.rotate(),
            GameAction::HardDrop => self.hard_drop(),
            GameAction::TogglePause => false,
        }
    }

    /// Advance the clock by `elapsed_ms` of real time and apply every tick that fell due.
    ///
    /// The clock is stepped deadline by deadline so an interval change caused by an elapsed
    /// tick is seen by the next gravity deadline within the same call.
    pub fn tick(&mut self, elapsed_ms: u32) -> bool {
        let mut changed = false;
        let mut remaining = elapsed_ms;

        while self.is_running() {
            let step = remaining.min(self.clock.until_next(self.elapsed_ticks));
            remaining -= step;

            let fired = self.clock.advance(step, self.elapsed_ticks);
            if fired.elapsed {
                changed |= self.apply(GameEvent::ElapsedTick);
            }
            if fired.gravity {
                changed |= self.apply(GameEvent::GravityTick);
            }

            if remaining == 0 && self.clock.until_next(self.elapsed_ticks) > 0 {
                break;
            }
        }

        changed
    }

    /// Spawn a random piece at the top center.
    ///
    /// A spawn that is out of horizontal bounds or overlaps the board ends the game.
    pub fn spawn_piece(&mut self) -> bool {
        let kind = self.source.next_piece();
        let piece = Tetromino::new(kind);

        if !piece.in_horizontal_bounds() || !piece.is_valid(&self.board) {
            self.active = None;
            self.game_over = true;
            self.playing = false;
            self.paused = false;
            self.clock.reset();
            return false;
        }

        self.active = Some(piece);
        self.piece_id = self.piece_id.wrapping_add(1);
        true
    }

    /// Move one column left (`-1`) or right (`+1`) if the target is free
    pub fn move_horizontal(&mut self, direction: i8) -> bool {
        let Some(active) = self.active else {
            return false;
        };

        let new_x = active.x + direction;
        if collides(new_x, active.y, &active.shape, &self.board) {
            return false;
        }

        self.active = Some(Tetromino { x: new_x, ..active });
        true
    }

    /// Move one row down, or lock the piece if it is resting.
    ///
    /// Shared by manual soft drops and gravity ticks.
    pub fn move_down(&mut self) -> bool {
        let Some(active) = self.active else {
            return false;
        };

        if !active.is_grounded(&self.board) {
            self.active = Some(Tetromino {
                y: active.y + 1,
                ..active
            });
        } else {
            self.lock_piece();
        }
        true
    }

    /// Rotate 90° clockwise in place; blocked rotations are ignored (no wall kicks)
    pub fn rotate(&mut self) -> bool {
        let Some(active) = self.active else {
            return false;
        };

        let rotated = active.shape.rotated();
        if collides(active.x, active.y, &rotated, &self.board) {
            return false;
        }

        self.active = Some(Tetromino {
            shape: rotated,
            ..active
        });
        true
    }

    /// Drop the active piece to its resting row, lock it and spawn the next piece.
    ///
    /// The descent is computed on a scratch copy of the board that is committed only once
    /// the piece is stamped and lines are cleared. A piece that is already resting is left
    /// untouched (no lock, no score).
    pub fn hard_drop(&mut self) -> bool {
        let Some(active) = self.active else {
            return false;
        };

        let mut scratch = self.board.clone();
        let mut distance: i8 = 0;
        while !collides(active.x, active.y + distance + 1, &active.shape, &scratch) {
            distance += 1;
        }

        if distance == 0 {
            return false;
        }

        scratch.stamp(&active.shape, active.x, active.y + distance, active.color());
        let drop_score = calculate_drop_score(distance as u32);
        self.score = self.score.saturating_add(drop_score);

        self.active = None;
        self.commit_lock(scratch, drop_score, true);
        true
    }

    /// Merge the active piece into the board at its current position, clear lines, and
    /// spawn the next piece.
    pub fn lock_piece(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };

        let mut next = self.board.clone();
        next.stamp(&active.shape, active.x, active.y, active.color());
        self.commit_lock(next, 0, false);
    }

    fn commit_lock(&mut self, mut board: Board, drop_score: u32, hard_drop: bool) {
        let cleared = clear_lines_in_place(&mut board);
        self.score = self.score.saturating_add(cleared.score);
        self.board = board;

        self.last_event = Some(LockEvent {
            lines_cleared: cleared.lines() as u32,
            line_clear_score: cleared.score,
            drop_score,
            hard_drop,
        });

        self.spawn_piece();
    }

    /// Take and clear the last lock event.
    pub fn take_last_event(&mut self) -> Option<LockEvent> {
        self.last_event.take()
    }

    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        out.board = *self.board.rows();

        if self.playing {
            if let Some(active) = self.active {
                let color = active.color();
                for (x, y) in active.cells() {
                    if x >= 0 && x < BOARD_WIDTH as i8 && y >= 0 && y < BOARD_HEIGHT as i8 {
                        out.board[y as usize][x as usize] = Some(color);
                    }
                }
            }
        }

        out.active = self.active.map(ActiveSnapshot::from);
        out.playing = self.playing;
        out.paused = self.paused;
        out.game_over = self.game_over;
        out.piece_id = self.piece_id;
        out.score = self.score;
        out.elapsed_ticks = self.elapsed_ticks;
        out.gravity_interval_ms = self.gravity_interval_ms();
        out.timers = TimersSnapshot {
            elapsed_ms: self.clock.elapsed_timer_ms(),
            gravity_ms: self.clock.gravity_timer_ms(),
        };
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut s = GameSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedPieces;

    fn started(kinds: &[PieceKind]) -> GameState<ScriptedPieces> {
        let mut state = GameState::with_source(ScriptedPieces::new(kinds.to_vec()));
        state.start_game();
        state
    }

    #[test]
    fn test_new_game_state_is_idle() {
        let state = GameState::new(12345);

        assert!(!state.playing);
        assert!(!state.paused);
        assert!(!state.game_over);
        assert_eq!(state.score, 0);
        assert_eq!(state.elapsed_ticks, 0);
        assert!(state.active.is_none());
    }

    #[test]
    fn test_load_board_rejects_overlap_with_active_piece() {
        let mut state = started(&[PieceKind::O]);

        let mut blocked = Board::new();
        blocked.set(4, 1, Some(PieceColor::Red));
        assert!(!state.load_board(blocked));
        assert_eq!(state.board().occupied_count(), 0);

        let mut clear = Board::new();
        clear.set(4, 2, Some(PieceColor::Red));
        assert!(state.load_board(clear));
        assert_eq!(state.board().occupied_count(), 1);
        assert!(state.active.unwrap().is_grounded(state.board()));
    }

    #[test]
    fn test_start_spawns_first_piece() {
        let state = started(&[PieceKind::T]);

        assert!(state.playing);
        assert_eq!(state.piece_id, 1);
        let active = state.active.unwrap();
        assert_eq!(active.kind, PieceKind::T);
        assert_eq!((active.x, active.y), (3, 0));
    }

    #[test]
    fn test_input_ignored_before_start() {
        let mut state = GameState::new(1);
        assert!(!state.handle_input(GameAction::MoveLeft));
        assert!(!state.handle_input(GameAction::TogglePause));
        assert!(!state.paused);
    }

    #[test]
    fn test_move_horizontal_stops_at_walls() {
        let mut state = started(&[PieceKind::O]);

        let mut moved = 0;
        while state.move_horizontal(-1) {
            moved += 1;
        }
        assert_eq!(moved, 4);
        assert_eq!(state.active.unwrap().x, 0);

        let mut moved = 0;
        while state.move_horizontal(1) {
            moved += 1;
        }
        assert_eq!(moved, 8);
        assert_eq!(state.active.unwrap().x, 8);
    }

    #[test]
    fn test_rotate_replaces_shape() {
        let mut state = started(&[PieceKind::I]);

        assert!(state.rotate());
        let active = state.active.unwrap();
        assert_eq!((active.shape.width(), active.shape.height()), (1, 4));
        assert_eq!((active.x, active.y), (3, 0));
    }

    #[test]
    fn test_rotate_blocked_by_right_wall() {
        let mut state = started(&[PieceKind::I]);
        assert!(state.rotate());
        while state.move_horizontal(1) {}
        assert_eq!(state.active.unwrap().x, 9);

        // Back to horizontal would need columns 9..13.
        let before = state.active;
        assert!(!state.rotate());
        assert_eq!(state.active, before);
    }

    #[test]
    fn test_rotate_blocked_by_floor() {
        let mut state = started(&[PieceKind::I]);
        while !state.active.unwrap().is_grounded(&state.board) {
            state.move_down();
        }
        assert_eq!(state.active.unwrap().y, 19);
        assert!(!state.rotate());
    }

    #[test]
    fn test_hard_drop_scores_distance_and_spawns() {
        let mut state = started(&[PieceKind::O, PieceKind::T]);

        assert!(state.hard_drop());
        assert_eq!(state.score, 36);
        assert_eq!(state.board.get(4, 18), Some(Some(PieceColor::Yellow)));
        assert_eq!(state.board.get(5, 19), Some(Some(PieceColor::Yellow)));
        assert_eq!(state.active.unwrap().kind, PieceKind::T);

        let ev = state.take_last_event().unwrap();
        assert!(ev.hard_drop);
        assert_eq!(ev.drop_score, 36);
        assert_eq!(ev.lines_cleared, 0);
        assert!(state.take_last_event().is_none());
    }

    #[test]
    fn test_hard_drop_on_resting_piece_is_noop() {
        let mut state = started(&[PieceKind::O]);
        while !state.active.unwrap().is_grounded(&state.board) {
            state.move_down();
        }
        let before_board = state.board.clone();
        let before_active = state.active;

        assert!(!state.hard_drop());
        assert_eq!(state.board, before_board);
        assert_eq!(state.active, before_active);
        assert_eq!(state.score, 0);
        assert_eq!(state.piece_id, 1);
    }

    #[test]
    fn test_move_down_locks_grounded_piece() {
        let mut state = started(&[PieceKind::O]);
        for _ in 0..18 {
            state.move_down();
        }
        assert_eq!(state.active.unwrap().y, 18);
        assert_eq!(state.piece_id, 1);

        assert!(state.move_down());
        assert_eq!(state.piece_id, 2);
        assert_eq!(state.board.occupied_count(), 4);
        assert_eq!(state.active.unwrap().y, 0);
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_lock_clears_line_and_scores() {
        let mut state = started(&[PieceKind::I]);
        for x in 0..6 {
            state.board.set(x, 19, Some(PieceColor::Red));
        }
        // I spawns at x=3; move to x=6 to fill columns 6..9.
        for _ in 0..3 {
            state.move_horizontal(1);
        }
        state.hard_drop();

        assert_eq!(state.score, 19 * 2 + 100);
        assert_eq!(state.board.occupied_count(), 0);
        let ev = state.take_last_event().unwrap();
        assert_eq!(ev.lines_cleared, 1);
        assert_eq!(ev.line_clear_score, 100);
    }

    #[test]
    fn test_blocked_spawn_ends_game() {
        let mut state = started(&[PieceKind::O]);
        state.board.fill_row(0, PieceColor::Red);
        state.board.fill_row(1, PieceColor::Red);
        state.board.set(0, 1, None);

        assert!(!state.spawn_piece());
        assert!(state.game_over);
        assert!(!state.playing);
        assert!(state.active.is_none());
    }

    #[test]
    fn test_game_over_ignores_input_and_ticks() {
        let mut state = started(&[PieceKind::O]);
        state.board.fill_row(1, PieceColor::Red);
        state.board.set(0, 1, None);
        state.spawn_piece();
        assert!(state.game_over);

        for action in [
            GameAction::MoveLeft,
            GameAction::Rotate,
            GameAction::HardDrop,
            GameAction::TogglePause,
        ] {
            assert!(!state.handle_input(action));
        }
        assert!(!state.tick(10_000));
        assert_eq!(state.elapsed_ticks, 0);
    }

    #[test]
    fn test_pause_freezes_discrete_input() {
        let mut state = started(&[PieceKind::T]);
        assert!(state.handle_input(GameAction::TogglePause));
        assert!(state.paused);

        let before = state.active;
        assert!(!state.handle_input(GameAction::MoveLeft));
        assert!(!state.handle_input(GameAction::SoftDrop));
        assert!(!state.handle_input(GameAction::HardDrop));
        assert_eq!(state.active, before);

        assert!(state.handle_input(GameAction::TogglePause));
        assert!(state.handle_input(GameAction::MoveLeft));
    }

    #[test]
    fn test_tick_applies_gravity() {
        let mut state = started(&[PieceKind::T]);

        assert!(!state.tick(799));
        assert_eq!(state.active.unwrap().y, 0);
        assert!(state.tick(1));
        assert_eq!(state.active.unwrap().y, 1);
    }

    #[test]
    fn test_tick_counts_elapsed_ticks() {
        let mut state = started(&[PieceKind::I]);
        state.tick(1000);
        assert_eq!(state.elapsed_ticks, 1);
        state.tick(2500);
        assert_eq!(state.elapsed_ticks, 3);
    }

    #[test]
    fn test_tick_sees_interval_change_within_call() {
        let mut state = started(&[PieceKind::I]);
        state.elapsed_ticks = 29;
        let y0 = state.active.unwrap().y;

        // Gravity at 800ms, the 30th elapsed tick at 1000ms shrinks the interval to 700ms,
        // so the next gravity tick is due at 1500ms rather than 1600ms.
        state.tick(1500);
        assert_eq!(state.elapsed_ticks, 30);
        assert_eq!(state.gravity_interval_ms(), 700);
        assert_eq!(state.active.unwrap().y, y0 + 2);
    }

    #[test]
    fn test_start_game_resets_session() {
        let mut state = started(&[PieceKind::O]);
        state.hard_drop();
        state.tick(5000);
        assert!(state.score > 0);

        state.start_game();
        assert_eq!(state.score, 0);
        assert_eq!(state.elapsed_ticks, 0);
        assert_eq!(state.board.occupied_count(), 0);
        assert_eq!(state.piece_id, 1);
        assert!(state.playing);
    }

    #[test]
    fn test_snapshot_overlays_active_piece() {
        let state = started(&[PieceKind::O]);
        let snap = state.snapshot();

        assert_eq!(snap.board[0][4], Some(PieceColor::Yellow));
        assert_eq!(snap.board[1][5], Some(PieceColor::Yellow));
        assert_eq!(state.board.occupied_count(), 0);
        assert!(snap.playable());
    }

    #[test]
    fn test_snapshot_without_overlay_when_not_playing() {
        let mut state = started(&[PieceKind::O]);
        state.playing = false;
        let snap = state.snapshot();
        assert!(snap.board.iter().flatten().all(|c| c.is_none()));
        assert!(snap.active.is_some());
    }
}
