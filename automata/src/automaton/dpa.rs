use automata_core::prelude::*;
use bit_set::BitSet;

use crate::{
    acceptance::{infinity_set, ParityCondition},
    automaton::Accepts,
    ts::{impl_deterministic_for_wrapper, StateIndex, DTS},
    AutomatonError,
};

/// A deterministic parity automaton (DPA) with colors on its states and a min-even parity
/// condition. The coloring is kept apart from the transition structure, so that it can be
/// (re)assigned state by state through [`DPA::set_color`].
///
/// # Example
/// ```
/// use automata::prelude::*;
/// // accepts all infinite words with infinitely many `a`
/// let mut ts = DTS::for_alphabet(CharAlphabet::of_size(2));
/// let (q0, q1) = (ts.add_state(Void), ts.add_state(Void));
/// for q in [q0, q1] {
///     ts.add_edge(q, 'a', q1).unwrap();
///     ts.add_edge(q, 'b', q0).unwrap();
/// }
/// let mut dpa = DPA::from_parts(ts, q0).unwrap();
/// dpa.set_color(q0, 1).unwrap();
/// dpa.set_color(q1, 0).unwrap();
///
/// assert_eq!(dpa.accepts_omega(&upw!("ab")), Ok(true));
/// assert_eq!(dpa.accepts_omega(&upw!("a", "b")), Ok(false));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DPA<A: Alphabet = CharAlphabet> {
    ts: DTS<A, Void>,
    initial: StateIndex,
    condition: ParityCondition,
}

impl_deterministic_for_wrapper!(DPA);

impl<A: Alphabet> DPA<A> {
    /// Assembles a DPA from its transition system and initial state. No state is colored yet.
    pub fn from_parts(ts: DTS<A, Void>, initial: StateIndex) -> Result<Self, AutomatonError> {
        if !ts.contains_state(initial) {
            return Err(AutomatonError::InvalidState(initial));
        }
        let condition = ParityCondition::with_size(ts.size());
        Ok(Self {
            ts,
            initial,
            condition,
        })
    }

    /// Assembles a DPA and colors its states with the given colors, the `i`-th color is
    /// assigned to state `i`.
    pub fn from_colored_parts<I: IntoIterator<Item = Int>>(
        ts: DTS<A, Void>,
        initial: StateIndex,
        colors: I,
    ) -> Result<Self, AutomatonError> {
        let mut dpa = Self::from_parts(ts, initial)?;
        for (state, color) in colors.into_iter().enumerate() {
            dpa.set_color(state, color)?;
        }
        Ok(dpa)
    }

    /// Returns a reference to the underlying transition system.
    pub fn ts(&self) -> &DTS<A, Void> {
        &self.ts
    }

    /// Returns a reference to the parity condition.
    pub fn condition(&self) -> &ParityCondition {
        &self.condition
    }

    /// Assigns `color` to `state`, failing if the state does not exist.
    pub fn set_color(&mut self, state: StateIndex, color: Int) -> Result<(), AutomatonError> {
        self.condition.set_color(state, color)
    }

    /// Returns the color of `state`.
    pub fn color(&self, state: StateIndex) -> Result<Int, AutomatonError> {
        self.condition.color(state)
    }

    /// Returns the color of the state that is reached by reading the finite `word`.
    pub fn reached_color(&self, word: &[A::Symbol]) -> Result<Int, AutomatonError> {
        let state = self.ts.try_reached_from(self.initial, word)?;
        self.color(state)
    }

    /// Computes the states that the run on `prefix · period^ω` visits infinitely often.
    pub fn infinity_set(
        &self,
        prefix: &[A::Symbol],
        period: &[A::Symbol],
    ) -> Result<BitSet, AutomatonError> {
        infinity_set(&self.ts, self.initial, prefix, period)
    }

    /// Decides whether a run with the given set of infinitely often visited states is accepting.
    pub fn accepts_infinity_set(&self, states: &BitSet) -> Result<bool, AutomatonError> {
        self.condition.accepts_set(states.iter())
    }
}

impl<A: Alphabet> Accepts for DPA<A> {
    type Symbol = A::Symbol;

    fn accepts(&self, _: &[A::Symbol]) -> Result<bool, AutomatonError> {
        Err(AutomatonError::Unsupported(
            "finite-word acceptance is not defined for a parity automaton over infinite words",
        ))
    }

    fn accepts_lasso(
        &self,
        prefix: &[A::Symbol],
        period: &[A::Symbol],
    ) -> Result<bool, AutomatonError> {
        let infinite = self.infinity_set(prefix, period)?;
        self.accepts_infinity_set(&infinite)
    }
}
