use automata_core::prelude::*;

use crate::AutomatonError;

mod dfa;
pub use dfa::DFA;

mod dpa;
pub use dpa::DPA;

mod nba;
pub use nba::NBA;

/// Decides membership of words in the language of an automaton. Automata over finite words only
/// support [`Accepts::accepts`], while automata over infinite words only support the lasso
/// variant [`Accepts::accepts_lasso`]. Asking for the unsupported variant gives back
/// [`AutomatonError::Unsupported`] instead of some default answer.
pub trait Accepts {
    /// The type of symbol making up the words.
    type Symbol: Symbol;

    /// Decides whether the finite `word` is accepted.
    fn accepts(&self, word: &[Self::Symbol]) -> Result<bool, AutomatonError>;

    /// Decides whether the ultimately periodic word `prefix · period^ω` is accepted.
    fn accepts_lasso(
        &self,
        prefix: &[Self::Symbol],
        period: &[Self::Symbol],
    ) -> Result<bool, AutomatonError>;

    /// Decides whether the given ultimately periodic word is accepted.
    fn accepts_omega(&self, word: &ReducedOmegaWord<Self::Symbol>) -> Result<bool, AutomatonError> {
        self.accepts_lasso(word.spoke(), word.cycle())
    }
}
