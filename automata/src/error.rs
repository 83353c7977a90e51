use thiserror::Error;

use crate::ts::StateIndex;

/// Errors that can occur when building automata or deciding acceptance of words.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
#[allow(missing_docs)]
pub enum AutomatonError {
    #[error("state {0} does not exist")]
    InvalidState(StateIndex),
    #[error("symbol `{0}` is not part of the alphabet")]
    UnknownSymbol(String),
    #[error("state {state} has no transition on `{symbol}`")]
    IncompleteTransition { state: StateIndex, symbol: String },
    #[error("no color has been assigned to state {0}")]
    MissingColor(StateIndex),
    #[error("the set of infinitely often visited states is empty")]
    EmptyInfinitySet,
    #[error("the period of an ultimately periodic word must be non-empty")]
    EmptyPeriod,
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),
}
