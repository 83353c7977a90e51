use automata::AutomatonError;
use thiserror::Error;

/// Errors that are raised while learning. Apart from [`LearningError::Automaton`], which wraps
/// failures of the underlying automata, all of them indicate that a precondition of some
/// operation was violated.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
#[allow(missing_docs)]
pub enum LearningError {
    #[error(transparent)]
    Automaton(#[from] AutomatonError),
    #[error("the observation table is not closed, lower row `{0}` has no matching upper row")]
    TableNotClosed(String),
    #[error("the observation table has no row for `{0}`")]
    MissingRow(String),
    #[error("row {0:?} does not exist")]
    InvalidRow(crate::active::RowIndex),
    #[error("the experiment `{0}` is already a column of the table")]
    DuplicateExperiment(String),
    #[error("the table lacks the mandatory experiment `{0}`")]
    MissingExperiment(String),
    #[error("a counterexample must have a non-empty finite part")]
    EmptyCounterexample,
    #[error("`{0}` is classified correctly by the hypothesis")]
    NotACounterexample(String),
    #[error("the oracle classifies `{0}` differently than the counterexample claims")]
    InconsistentCounterexample(String),
    #[error("no breakpoint found in `{0}`, the oracle answers inconsistently")]
    NoBreakpoint(String),
    #[error("state {0} does not exist in the hypothesis")]
    InvalidState(usize),
    #[error("the period of a lasso experiment must be non-empty")]
    EmptyPeriod,
    #[error("the oracle cannot answer queries of the form `{0}`")]
    UnsupportedExperiment(String),
    #[error("the hypothesis has no transition from state {0} on `{1}`")]
    IncompleteHypothesis(usize, String),
    #[error("iteration threshold of {0} rounds exceeded")]
    IterationThresholdExceeded(usize),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}
