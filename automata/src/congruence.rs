use automata_core::prelude::*;

use crate::{
    ts::{impl_deterministic_for_wrapper, StateIndex, DTS},
    AutomatonError,
};

/// A right congruence is a deterministic transition system with a designated initial state, in
/// which every state (class) is colored with a representative, which is a word leading into the
/// class from the initial state.
///
/// # Example
/// ```
/// use automata::prelude::*;
/// let mut ts = DTS::for_alphabet(CharAlphabet::of_size(2));
/// let q0 = ts.add_state(vec![]);
/// let q1 = ts.add_state(vec!['a']);
/// ts.add_edge(q0, 'a', q1).unwrap();
/// ts.add_edge(q0, 'b', q0).unwrap();
/// ts.add_edge(q1, 'a', q0).unwrap();
/// ts.add_edge(q1, 'b', q1).unwrap();
/// let cong = RightCongruence::from_parts(ts, q0).unwrap();
///
/// assert_eq!(cong.representative(q1), Ok(&['a'][..]));
/// assert_eq!(cong.class_of(&['b', 'a']), Ok(q1));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RightCongruence<A: Alphabet = CharAlphabet> {
    ts: DTS<A, Vec<A::Symbol>>,
    initial: StateIndex,
}

impl_deterministic_for_wrapper!(RightCongruence);

impl<A: Alphabet> RightCongruence<A> {
    /// Assembles a right congruence from a transition system whose states are colored with their
    /// representatives, and the initial class.
    pub fn from_parts(
        ts: DTS<A, Vec<A::Symbol>>,
        initial: StateIndex,
    ) -> Result<Self, AutomatonError> {
        if !ts.contains_state(initial) {
            return Err(AutomatonError::InvalidState(initial));
        }
        Ok(Self { ts, initial })
    }

    /// Returns a reference to the underlying transition system.
    pub fn ts(&self) -> &DTS<A, Vec<A::Symbol>> {
        &self.ts
    }

    /// Returns the representative of the class `state`.
    pub fn representative(&self, state: StateIndex) -> Result<&[A::Symbol], AutomatonError> {
        self.ts
            .state_color(state)
            .map(Vec::as_slice)
            .ok_or(AutomatonError::InvalidState(state))
    }

    /// Returns the class that the finite `word` belongs to.
    pub fn class_of(&self, word: &[A::Symbol]) -> Result<StateIndex, AutomatonError> {
        self.ts.try_reached_from(self.initial, word)
    }
}
