//! Scoring module
//!
//! Flat rules: every cleared row is worth the same, regardless of how many rows cleared
//! together, and a hard drop pays per row travelled. There are no levels or combos.

use crate::types::{HARD_DROP_POINTS_PER_ROW, LINE_CLEAR_POINTS};

/// Points awarded for a single lock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreResult {
    pub line_clear_score: u32,
    pub drop_score: u32,
    pub total: u32,
}

impl ScoreResult {
    pub fn new(lines: usize, drop_distance: u32) -> Self {
        let line_clear_score = calculate_line_score(lines);
        let drop_score = calculate_drop_score(drop_distance);
        Self {
            line_clear_score,
            drop_score,
            total: line_clear_score.saturating_add(drop_score),
        }
    }
}

/// Points for clearing `lines` rows at once
pub fn calculate_line_score(lines: usize) -> u32 {
    (lines as u32).saturating_mul(LINE_CLEAR_POINTS)
}

/// Points for a hard drop of `distance` rows
pub fn calculate_drop_score(distance: u32) -> u32 {
    distance.saturating_mul(HARD_DROP_POINTS_PER_ROW)
}
