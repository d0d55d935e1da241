/*!
This module handles how [`Chain`]s are turned into points.
*/

use crate::Chain;

/// The points awarded for a minimal three-piece chain at combo multiplier `1`.
pub const DEFAULT_CHAIN_BASE_SCORE: u32 = 60;

/// Points for a chain of `len` pieces: `base * (len - 2) * multiplier`.
///
/// So with the default base, a 3-chain is worth 60, a 4-chain 120, a 5-chain 180, ...
/// Saturates at `u32::MAX`.
pub const fn chain_score(base: u32, len: usize, multiplier: u32) -> u32 {
    base.saturating_mul(len.saturating_sub(2) as u32)
        .saturating_mul(multiplier)
}

/// Bookkeeping that lives exactly as long as one player turn.
///
/// The combo multiplier starts at `1` when a turn starts and grows by one with every chain
/// scored during the turn, across all cascade steps.
#[derive(Eq, PartialEq, Ord, PartialOrd, Clone, Copy, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnContext {
    combo_multiplier: u32,
    score_delta: u32,
}

impl Default for TurnContext {
    fn default() -> Self {
        Self {
            combo_multiplier: 1,
            score_delta: 0,
        }
    }
}

impl TurnContext {
    /// A fresh context as found at the start of a turn.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new turn: the multiplier drops back to `1` and the turn's score is cleared.
    pub fn reset_combo(&mut self) {
        *self = Self::default();
    }

    /// The multiplier the next scored chain will receive.
    pub const fn combo_multiplier(&self) -> u32 {
        self.combo_multiplier
    }

    /// Points scored since the turn started.
    pub const fn score_delta(&self) -> u32 {
        self.score_delta
    }

    /// Assigns scores to `chains` in the given order, advancing the multiplier once per chain.
    ///
    /// Returns the sum of the assigned scores.
    pub fn score_chains(&mut self, chains: &mut [Chain], base: u32) -> u32 {
        let mut total: u32 = 0;
        for chain in chains {
            chain.score = chain_score(base, chain.len(), self.combo_multiplier);
            self.combo_multiplier = self.combo_multiplier.saturating_add(1);
            total = total.saturating_add(chain.score);
        }
        self.score_delta = self.score_delta.saturating_add(total);
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_scores_grow_with_length() {
        assert_eq!(chain_score(60, 3, 1), 60);
        assert_eq!(chain_score(60, 4, 1), 120);
        assert_eq!(chain_score(60, 5, 1), 180);
        assert_eq!(chain_score(60, 4, 2), 240);
    }

    #[test]
    fn huge_base_scores_saturate() {
        let base = u32::MAX / 2;
        assert_eq!(chain_score(base, 3, 2), u32::MAX - 1);
        assert_eq!(chain_score(base, 4, 2), u32::MAX);

        let board: crate::Board = "aaa/bbb".parse().unwrap();
        let mut chains = board.find_chains();
        let mut turn = TurnContext::new();
        assert_eq!(turn.score_chains(&mut chains, base), u32::MAX);
        assert_eq!(chains[0].score, base);
        assert_eq!(chains[1].score, u32::MAX - 1);
        assert_eq!(turn.score_chains(&mut chains, base), u32::MAX);
        assert_eq!(turn.score_delta(), u32::MAX);
    }

    #[test]
    fn reset_restores_multiplier() {
        let mut turn = TurnContext::new();
        assert_eq!(turn.combo_multiplier(), 1);
        let mut chains: [Chain; 0] = [];
        assert_eq!(turn.score_chains(&mut chains, 60), 0);
        assert_eq!(turn.combo_multiplier(), 1);
        turn.reset_combo();
        assert_eq!(turn, TurnContext::new());
    }
}
