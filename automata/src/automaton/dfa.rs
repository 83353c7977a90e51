use automata_core::prelude::*;

use crate::{
    automaton::Accepts,
    ts::{impl_deterministic_for_wrapper, StateIndex, DTS},
    AutomatonError,
};

/// A deterministic finite automaton (DFA) is a deterministic transition system whose states
/// are colored with `true` (accepting) or `false` (rejecting), together with an initial
/// state. It accepts a finite word if the run on it ends in an accepting state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DFA<A: Alphabet = CharAlphabet> {
    ts: DTS<A, bool>,
    initial: StateIndex,
}

impl_deterministic_for_wrapper!(DFA);

impl<A: Alphabet> DFA<A> {
    /// Assembles a DFA from its transition system and initial state.
    pub fn from_parts(ts: DTS<A, bool>, initial: StateIndex) -> Result<Self, AutomatonError> {
        if !ts.contains_state(initial) {
            return Err(AutomatonError::InvalidState(initial));
        }
        Ok(Self { ts, initial })
    }

    /// Decomposes the DFA into transition system and initial state.
    pub fn into_parts(self) -> (DTS<A, bool>, StateIndex) {
        (self.ts, self.initial)
    }

    /// Returns a reference to the underlying transition system.
    pub fn ts(&self) -> &DTS<A, bool> {
        &self.ts
    }

    /// Returns whether `state` is accepting.
    pub fn is_accepting(&self, state: StateIndex) -> Result<bool, AutomatonError> {
        self.ts
            .state_color(state)
            .copied()
            .ok_or(AutomatonError::InvalidState(state))
    }

    /// Returns an iterator over the indices of all accepting states.
    pub fn accepting_states(&self) -> impl Iterator<Item = StateIndex> + '_ {
        self.ts
            .state_indices()
            .filter(|q| self.ts.state_color(*q) == Some(&true))
    }
}

impl<A: Alphabet> Accepts for DFA<A> {
    type Symbol = A::Symbol;

    fn accepts(&self, word: &[A::Symbol]) -> Result<bool, AutomatonError> {
        let reached = self.ts.try_reached_from(self.initial, word)?;
        self.is_accepting(reached)
    }

    fn accepts_lasso(&self, _: &[A::Symbol], _: &[A::Symbol]) -> Result<bool, AutomatonError> {
        Err(AutomatonError::Unsupported(
            "a DFA only decides finite words, infinite words are not in its domain",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ts::Deterministic;

    /// Accepts all words over `a`, `b` that end with `a`.
    fn ends_with_a() -> DFA {
        let mut ts = DTS::for_alphabet(CharAlphabet::of_size(2));
        let q0 = ts.add_state(false);
        let q1 = ts.add_state(true);
        for q in [q0, q1] {
            ts.add_edge(q, 'a', q1).unwrap();
            ts.add_edge(q, 'b', q0).unwrap();
        }
        DFA::from_parts(ts, q0).unwrap()
    }

    #[test_log::test]
    fn finite_acceptance() {
        let dfa = ends_with_a();
        assert_eq!(dfa.size(), 2);
        assert_eq!(dfa.accepts(&['a']), Ok(true));
        assert_eq!(dfa.accepts(&['b', 'a']), Ok(true));
        assert_eq!(dfa.accepts(&[]), Ok(false));
        assert_eq!(dfa.accepts(&['a', 'b']), Ok(false));
        assert!(matches!(
            dfa.accepts(&['c']),
            Err(AutomatonError::UnknownSymbol(_))
        ));
        assert_eq!(dfa.accepting_states().collect::<Vec<_>>(), vec![1]);
        assert_eq!(dfa.reached_state_index(&['a', 'b', 'a']), Some(1));
    }

    #[test_log::test]
    fn lasso_acceptance_is_unsupported() {
        let dfa = ends_with_a();
        assert!(matches!(
            dfa.accepts_lasso(&[], &['a']),
            Err(AutomatonError::Unsupported(_))
        ));
    }

    #[test_log::test]
    fn initial_state_must_exist() {
        let ts: DTS<CharAlphabet, bool> = DTS::for_alphabet(CharAlphabet::of_size(1));
        assert_eq!(
            DFA::from_parts(ts, 0),
            Err(AutomatonError::InvalidState(0))
        );
    }
}
