/*!
This module handles random generation of [`PieceKind`]s.
*/

use rand::Rng;

use crate::{ConfigError, PieceKind};

/// Handles the information of which piece kinds to spawn during a game.
///
/// The constraints on *where* a kind may be placed (no ready-made runs on the initial board,
/// no immediate repeats while topping up) are enforced by the [`Board`](crate::Board), which
/// keeps drawing from the generator until a draw is acceptable.
#[derive(Eq, PartialEq, Ord, PartialOrd, Clone, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PieceGenerator {
    /// Uniformly random piece generator.
    #[default]
    Uniform,
    /// Debug generator which repeats a certain pattern of [`PieceKind`]s forever.
    ///
    /// The pattern must contain at least three distinct kinds, so that any placement
    /// constraint (which rules out at most two kinds at once) is eventually satisfied.
    Cycle {
        /// The sequence of kinds that is repeated.
        pattern: Vec<PieceKind>,
        /// Index to the kind that will be yielded next.
        index: usize,
    },
}

impl PieceGenerator {
    /// Initialize an instance of the [`PieceGenerator::Uniform`] variant.
    pub const fn uniform() -> Self {
        Self::Uniform
    }

    /// Initialize an instance of the [`PieceGenerator::Cycle`] variant.
    pub const fn cycle(pattern: Vec<PieceKind>) -> Self {
        Self::Cycle { pattern, index: 0 }
    }

    /// Checks that the generator can always satisfy the board's placement constraints
    /// for a game with `kind_count` different kinds.
    pub fn validate(&self, kind_count: u8) -> Result<(), ConfigError> {
        if kind_count < PieceKind::MIN_KIND_COUNT {
            return Err(ConfigError::TooFewPieceKinds { kind_count });
        }
        if let Self::Cycle { pattern, .. } = self {
            let mut distinct = pattern.clone();
            distinct.sort_unstable();
            distinct.dedup();
            let in_range = distinct.iter().all(|kind| kind.index() < kind_count);
            if !in_range || distinct.len() < usize::from(PieceKind::MIN_KIND_COUNT) {
                return Err(ConfigError::InvalidCyclePattern);
            }
        }
        Ok(())
    }

    /// Produces the next kind out of `kind_count` possible ones.
    ///
    /// # Panics
    /// If there is nothing to draw from: `kind_count` is `0` or the cycle pattern is empty.
    pub fn next_kind<R: Rng + ?Sized>(&mut self, rng: &mut R, kind_count: u8) -> PieceKind {
        match self {
            Self::Uniform => {
                assert!(kind_count > 0, "attempt to draw from zero piece kinds");
                PieceKind::new(rng.random_range(0..kind_count))
            }
            Self::Cycle { pattern, index } => {
                assert!(!pattern.is_empty(), "attempt to draw from an empty cycle pattern");
                let kind = pattern[*index];
                *index += 1;
                if *index == pattern.len() {
                    *index = 0;
                }
                kind
            }
        }
    }

    /// Keeps drawing until `accept` agrees with the drawn kind.
    ///
    /// Terminates for every generator that passed [`PieceGenerator::validate`] as long as
    /// `accept` rejects at most two kinds.
    pub(crate) fn next_kind_where<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        kind_count: u8,
        accept: impl Fn(PieceKind) -> bool,
    ) -> PieceKind {
        loop {
            let kind = self.next_kind(rng, kind_count);
            if accept(kind) {
                break kind;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rand_chacha::{rand_core::SeedableRng, ChaCha12Rng};

    use super::*;

    fn kinds(indices: &[u8]) -> Vec<PieceKind> {
        indices.iter().copied().map(PieceKind::new).collect()
    }

    #[test]
    fn uniform_stays_in_range() {
        let mut rng = ChaCha12Rng::seed_from_u64(7);
        let mut generator = PieceGenerator::uniform();
        for _ in 0..500 {
            assert!(generator.next_kind(&mut rng, 4).index() < 4);
        }
    }

    #[test]
    fn cycle_repeats_pattern() {
        let mut rng = ChaCha12Rng::seed_from_u64(0);
        let mut generator = PieceGenerator::cycle(kinds(&[2, 0, 1]));
        let drawn: Vec<_> = (0..5).map(|_| generator.next_kind(&mut rng, 3)).collect();
        assert_eq!(drawn, kinds(&[2, 0, 1, 2, 0]));
    }

    #[test]
    fn rejection_skips_unwanted_kinds() {
        let mut rng = ChaCha12Rng::seed_from_u64(0);
        let mut generator = PieceGenerator::cycle(kinds(&[0, 1, 2]));
        let kind = generator.next_kind_where(&mut rng, 3, |k| k.index() == 2);
        assert_eq!(kind, PieceKind::new(2));
    }

    #[test]
    #[should_panic(expected = "empty cycle pattern")]
    fn empty_cycle_panics() {
        let mut rng = ChaCha12Rng::seed_from_u64(0);
        PieceGenerator::cycle(Vec::new()).next_kind(&mut rng, 6);
    }

    #[test]
    #[should_panic(expected = "zero piece kinds")]
    fn uniform_without_kinds_panics() {
        let mut rng = ChaCha12Rng::seed_from_u64(0);
        PieceGenerator::uniform().next_kind(&mut rng, 0);
    }

    #[test]
    fn validation() {
        assert_eq!(
            PieceGenerator::uniform().validate(2),
            Err(ConfigError::TooFewPieceKinds { kind_count: 2 })
        );
        assert_eq!(PieceGenerator::uniform().validate(3), Ok(()));
        assert_eq!(
            PieceGenerator::cycle(kinds(&[0, 1, 0, 1])).validate(6),
            Err(ConfigError::InvalidCyclePattern)
        );
        assert_eq!(
            PieceGenerator::cycle(kinds(&[0, 1, 6])).validate(6),
            Err(ConfigError::InvalidCyclePattern)
        );
        assert_eq!(PieceGenerator::cycle(kinds(&[5, 1, 3, 1])).validate(6), Ok(()));
    }
}
