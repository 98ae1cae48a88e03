//! RNG module - injectable piece selection
//!
//! New pieces are drawn uniformly at random from the seven catalog entries, with no bag.
//! The source is a trait so tests and replays can script the exact sequence.
//!
//! Also provides a simple LCG so seeded games are deterministic.

use crate::types::PieceKind;

/// Source of the next piece to spawn
pub trait PieceSource {
    fn next_piece(&mut self) -> PieceKind;
}

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        // LCG formula: (a * state + c) mod m
        // Using Numerical Recipes constants: a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    ///
    /// Uses the high bits; the low bits of a power-of-two LCG cycle quickly.
    pub fn next_range(&mut self, max: u32) -> u32 {
        ((self.next_u32() as u64 * max as u64) >> 32) as u32
    }

    /// Current RNG state (seed a new game with the same continuation)
    pub fn state(&self) -> u32 {
        self.state
    }
}

impl Default for SimpleRng {
    fn default() -> Self {
        Self::new(1)
    }
}

impl PieceSource for SimpleRng {
    fn next_piece(&mut self) -> PieceKind {
        PieceKind::ALL[self.next_range(PieceKind::ALL.len() as u32) as usize]
    }
}

/// Replays a fixed sequence of pieces, cycling when exhausted.
#[derive(Debug, Clone)]
pub struct ScriptedPieces {
    sequence: Vec<PieceKind>,
    index: usize,
}

impl ScriptedPieces {
    /// Create a scripted source. An empty sequence yields `I` pieces.
    pub fn new(sequence: impl Into<Vec<PieceKind>>) -> Self {
        Self {
            sequence: sequence.into(),
            index: 0,
        }
    }

    /// Always yield the same kind
    pub fn repeat(kind: PieceKind) -> Self {
        Self::new(vec![kind])
    }
}

impl PieceSource for ScriptedPieces {
    fn next_piece(&mut self) -> PieceKind {
        if self.sequence.is_empty() {
            return PieceKind::I;
        }
        let kind = self.sequence[self.index % self.sequence.len()];
        self.index = self.index.wrapping_add(1);
        kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rng_deterministic() {
        let mut rng1 = SimpleRng::new(12345);
        let mut rng2 = SimpleRng::new(12345);

        for _ in 0..100 {
            assert_eq!(rng1.next_u32(), rng2.next_u32());
        }
    }

    #[test]
    fn test_rng_different_seeds() {
        let mut rng1 = SimpleRng::new(12345);
        let mut rng2 = SimpleRng::new(54321);

        assert_ne!(rng1.next_u32(), rng2.next_u32());
    }

    #[test]
    fn test_zero_seed_is_remapped() {
        assert_eq!(SimpleRng::new(0).state(), 1);
    }

    #[test]
    fn test_next_range_stays_in_bounds() {
        let mut rng = SimpleRng::new(7);
        for _ in 0..1000 {
            assert!(rng.next_range(7) < 7);
        }
    }

    #[test]
    fn test_uniform_source_draws_every_kind() {
        let mut rng = SimpleRng::new(1);
        let mut counts = [0u32; 7];
        for _ in 0..7000 {
            let kind = rng.next_piece();
            let i = PieceKind::ALL.iter().position(|&k| k == kind).unwrap();
            counts[i] += 1;
        }
        // Loose bounds: each kind near 1000 draws.
        for (i, &c) in counts.iter().enumerate() {
            assert!(c > 700 && c < 1300, "kind {} drawn {} times", i, c);
        }
    }

    #[test]
    fn test_scripted_pieces_cycle() {
        let mut src = ScriptedPieces::new(vec![PieceKind::O, PieceKind::T]);
        assert_eq!(src.next_piece(), PieceKind::O);
        assert_eq!(src.next_piece(), PieceKind::T);
        assert_eq!(src.next_piece(), PieceKind::O);
    }

    #[test]
    fn test_scripted_pieces_empty_defaults_to_i() {
        let mut src = ScriptedPieces::new(Vec::<PieceKind>::new());
        assert_eq!(src.next_piece(), PieceKind::I);
    }
}
