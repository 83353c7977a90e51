//! A library for learning automata from queries. The central piece is an observation table
//! from which hypotheses are built, together with the analysis of counterexamples in the style
//! of Rivest and Schapire. Deterministic finite automata, priority mappings (which yield parity
//! automata) and leading right congruences of ω-languages can be learned.
#![warn(missing_docs)]

/// Deals with active learning algorithms such as L*.
pub mod active;

mod error;
pub use error::LearningError;

/// Bundles the most commonly used items.
pub mod prelude {
    pub use super::{
        active::{
            build_hypothesis, CachedOracle, CeAnalysisResult, CeAnalyzer, Counterexample,
            DFAOracle, EquivalenceOracle, Experiment, FnOracle, LStar, LStarHypothesis,
            Labelling, LearnerOptions, MembershipOracle, ObservationTable, OmegaOracle,
            PriorityOracle, RowIndex, StateLabels, Value,
        },
        LearningError,
    };
    pub use automata::prelude::*;
}
