//! Hypothesis automata for active learning. Deterministic automata are built on top of a dense
//! transition table ([`DTS`](ts::DTS)), whose state indices are assigned in order of insertion.
//! On top of that, this crate provides
//! - deterministic finite automata ([`DFA`](automaton::DFA)),
//! - deterministic parity automata with a min-even condition ([`DPA`](automaton::DPA)),
//! - nondeterministic Büchi automata ([`NBA`](automaton::NBA)),
//! - right congruences whose classes are labelled with representatives.
//!
//! Acceptance of finite and ultimately periodic words is decided through the
//! [`Accepts`](automaton::Accepts) trait.
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub use automata_core as core;

/// Deterministic transition systems with dense state indices.
pub mod ts;

/// Defines the automaton types and the [`automaton::Accepts`] capability.
pub mod automaton;

/// Acceptance of infinite words, that is parity conditions and the computation of the set of
/// states that a run visits infinitely often.
pub mod acceptance;

/// Right congruences, in which every class carries a representative.
pub mod congruence;

/// Export of automata in the DOT format.
pub mod dot;

/// Random generation of automata, mainly used for testing.
#[cfg(feature = "random")]
pub mod random;

mod error;
pub use error::AutomatonError;

/// The prelude is supposed to make using this package easier. Including everything, i.e.
/// `use automata::prelude::*;` should be enough to use the package.
pub mod prelude {
    pub use super::{
        acceptance::{infinity_set, ParityCondition},
        automaton::{Accepts, DFA, DPA, NBA},
        congruence::RightCongruence,
        dot::Dottable,
        ts::{Deterministic, StateIndex, SymbolOf, DTS},
        AutomatonError,
    };
    pub use automata_core::prelude::*;
}
