use std::collections::VecDeque;

use automata_core::prelude::*;
use bit_set::BitSet;
use itertools::Itertools;
use tracing::trace;

use crate::{automaton::Accepts, ts::StateIndex, AutomatonError};

/// A nondeterministic Büchi automaton (NBA). States are either accepting or not, and an
/// infinite word is accepted if there is a run on it that visits some accepting state
/// infinitely often. In contrast to the deterministic automata, the transitions are kept
/// as adjacency lists since a state may have several successors on the same symbol.
///
/// Acceptance is only defined for ultimately periodic words, asking whether a finite word
/// is accepted results in an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NBA<A: Alphabet = CharAlphabet> {
    alphabet: A,
    accepting: Vec<bool>,
    edges: Vec<Vec<Vec<StateIndex>>>,
    initial: Vec<StateIndex>,
}

impl<A: Alphabet> NBA<A> {
    /// Creates an NBA without any states over the given alphabet.
    pub fn for_alphabet(alphabet: A) -> Self {
        Self {
            alphabet,
            accepting: vec![],
            edges: vec![],
            initial: vec![],
        }
    }

    /// Returns a reference to the alphabet.
    pub fn alphabet(&self) -> &A {
        &self.alphabet
    }

    /// Returns the number of states.
    pub fn size(&self) -> usize {
        self.accepting.len()
    }

    /// Adds a state which is accepting if `accepting` is true and returns its index.
    pub fn add_state(&mut self, accepting: bool) -> StateIndex {
        let id = self.accepting.len();
        self.accepting.push(accepting);
        self.edges.push(vec![vec![]; self.alphabet.size()]);
        id
    }

    /// Marks `state` as initial.
    pub fn add_initial(&mut self, state: StateIndex) -> Result<(), AutomatonError> {
        if state >= self.size() {
            return Err(AutomatonError::InvalidState(state));
        }
        if !self.initial.contains(&state) {
            self.initial.push(state);
        }
        Ok(())
    }

    /// Returns the initial states.
    pub fn initial_states(&self) -> &[StateIndex] {
        &self.initial
    }

    /// Returns whether `state` is accepting.
    pub fn is_accepting(&self, state: StateIndex) -> Result<bool, AutomatonError> {
        self.accepting
            .get(state)
            .copied()
            .ok_or(AutomatonError::InvalidState(state))
    }

    /// Adds the transition `source --symbol--> target`. Adding an existing transition twice
    /// has no effect.
    pub fn add_edge(
        &mut self,
        source: StateIndex,
        symbol: A::Symbol,
        target: StateIndex,
    ) -> Result<(), AutomatonError> {
        if target >= self.size() {
            return Err(AutomatonError::InvalidState(target));
        }
        let position = self.symbol_position(symbol)?;
        let targets = self
            .edges
            .get_mut(source)
            .ok_or(AutomatonError::InvalidState(source))?
            .get_mut(position)
            .ok_or_else(|| AutomatonError::UnknownSymbol(symbol.show()))?;
        if !targets.contains(&target) {
            targets.push(target);
        }
        Ok(())
    }

    /// Returns the successors of `state` on `symbol`.
    pub fn successors(
        &self,
        state: StateIndex,
        symbol: A::Symbol,
    ) -> Result<&[StateIndex], AutomatonError> {
        let position = self.symbol_position(symbol)?;
        self.edges
            .get(state)
            .map(|row| row[position].as_slice())
            .ok_or(AutomatonError::InvalidState(state))
    }

    /// Returns an iterator over all transitions as triples of source, symbol and target.
    pub fn transitions(&self) -> impl Iterator<Item = (StateIndex, A::Symbol, StateIndex)> + '_ {
        self.edges.iter().enumerate().flat_map(move |(source, row)| {
            self.alphabet
                .universe()
                .zip(row.iter())
                .flat_map(move |(symbol, targets)| {
                    targets.iter().map(move |&target| (source, symbol, target))
                })
        })
    }

    fn symbol_position(&self, symbol: A::Symbol) -> Result<usize, AutomatonError> {
        self.alphabet
            .index_of(symbol)
            .ok_or_else(|| AutomatonError::UnknownSymbol(symbol.show()))
    }
}

/// The positions of a lasso `u · v^ω` form a deterministic automaton: position `p` reads the
/// `p`-th symbol of `u · v` and moves on to `p + 1`, except for the last position which moves
/// back to `|u|`.
struct LassoPositions<S> {
    word: Vec<S>,
    loop_start: usize,
}

impl<S: Symbol> LassoPositions<S> {
    fn new(prefix: &[S], period: &[S]) -> Self {
        Self {
            word: prefix.iter().chain(period.iter()).copied().collect(),
            loop_start: prefix.len(),
        }
    }

    fn len(&self) -> usize {
        self.word.len()
    }

    fn step(&self, position: usize) -> (S, usize) {
        let next = if position + 1 == self.word.len() {
            self.loop_start
        } else {
            position + 1
        };
        (self.word[position], next)
    }
}

impl<A: Alphabet> NBA<A> {
    fn product_successors(
        &self,
        positions: &LassoPositions<A::Symbol>,
        node: usize,
    ) -> Result<Vec<usize>, AutomatonError> {
        let width = positions.len();
        let (state, position) = (node / width, node % width);
        let (symbol, next) = positions.step(position);
        Ok(self
            .successors(state, symbol)?
            .iter()
            .map(|&target| target * width + next)
            .collect())
    }

    fn reachable_from<I>(
        &self,
        positions: &LassoPositions<A::Symbol>,
        start: I,
    ) -> Result<BitSet, AutomatonError>
    where
        I: IntoIterator<Item = usize>,
    {
        let mut seen = BitSet::with_capacity(self.size() * positions.len());
        let mut queue: VecDeque<usize> = start.into_iter().collect();
        while let Some(node) = queue.pop_front() {
            if !seen.insert(node) {
                continue;
            }
            queue.extend(self.product_successors(positions, node)?);
        }
        Ok(seen)
    }
}

impl<A: Alphabet> Accepts for NBA<A> {
    type Symbol = A::Symbol;

    fn accepts(&self, _: &[A::Symbol]) -> Result<bool, AutomatonError> {
        Err(AutomatonError::Unsupported(
            "finite-word acceptance is not defined for a Büchi automaton over infinite words",
        ))
    }

    /// Searches the product of the automaton with the positions of the lasso for a reachable
    /// accepting node that lies on a cycle.
    fn accepts_lasso(
        &self,
        prefix: &[A::Symbol],
        period: &[A::Symbol],
    ) -> Result<bool, AutomatonError> {
        if period.is_empty() {
            return Err(AutomatonError::EmptyPeriod);
        }
        let positions = LassoPositions::new(prefix, period);
        let width = positions.len();

        let reachable = self.reachable_from(&positions, self.initial.iter().map(|q| q * width))?;
        let candidates = reachable
            .iter()
            .filter(|node| self.accepting[node / width] && node % width >= positions.loop_start)
            .collect_vec();
        trace!(
            "{} reachable product nodes, {} accepting candidates",
            reachable.len(),
            candidates.len()
        );

        for node in candidates {
            let successors = self.product_successors(&positions, node)?;
            if self.reachable_from(&positions, successors)?.contains(node) {
                trace!("found accepting cycle through product node {node}");
                return Ok(true);
            }
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Accepts the infinite words over `a`, `b` that start with `a`.
    fn starts_with_a() -> NBA {
        let mut nba = NBA::for_alphabet(CharAlphabet::of_size(2));
        let q0 = nba.add_state(false);
        let q1 = nba.add_state(true);
        nba.add_initial(q0).unwrap();
        nba.add_edge(q0, 'a', q1).unwrap();
        nba.add_edge(q1, 'a', q1).unwrap();
        nba.add_edge(q1, 'b', q1).unwrap();
        nba
    }

    #[test_log::test]
    fn deterministic_language() {
        let nba = starts_with_a();
        assert_eq!(nba.accepts_lasso(&['a'], &['b']), Ok(true));
        assert_eq!(nba.accepts_lasso(&[], &['a', 'b']), Ok(true));
        assert_eq!(nba.accepts_lasso(&[], &['b', 'a']), Ok(false));
        assert_eq!(nba.accepts_lasso(&['b'], &['a']), Ok(false));
        assert_eq!(nba.accepts_omega(&upw!("a", "ba")), Ok(true));
        assert_eq!(nba.transitions().count(), 3);
    }

    #[test_log::test]
    fn finitely_many_b() {
        // guesses the point from which on only `a` is read
        let mut nba = NBA::for_alphabet(CharAlphabet::of_size(2));
        let q0 = nba.add_state(false);
        let q1 = nba.add_state(true);
        nba.add_initial(q0).unwrap();
        nba.add_edge(q0, 'a', q0).unwrap();
        nba.add_edge(q0, 'b', q0).unwrap();
        nba.add_edge(q0, 'a', q1).unwrap();
        nba.add_edge(q1, 'a', q1).unwrap();
        assert_eq!(nba.successors(q0, 'a'), Ok(&[q0, q1][..]));

        assert_eq!(nba.accepts_lasso(&['b', 'b', 'a', 'b'], &['a']), Ok(true));
        assert_eq!(nba.accepts_lasso(&['a'], &['a', 'b']), Ok(false));
        assert_eq!(nba.accepts_lasso(&[], &['b']), Ok(false));
    }

    #[test_log::test]
    fn finite_words_and_empty_periods_are_errors() {
        let nba = starts_with_a();
        assert_eq!(
            nba.accepts(&['a']),
            Err(AutomatonError::Unsupported(
                "finite-word acceptance is not defined for a Büchi automaton over infinite words"
            ))
        );
        assert_eq!(
            nba.accepts_lasso(&['a'], &[]),
            Err(AutomatonError::EmptyPeriod)
        );
        assert!(matches!(
            nba.accepts_lasso(&['c'], &['a']),
            Err(AutomatonError::UnknownSymbol(_))
        ));
    }

    #[test_log::test]
    fn invalid_states_are_rejected() {
        let mut nba = starts_with_a();
        assert_eq!(nba.add_initial(5), Err(AutomatonError::InvalidState(5)));
        assert_eq!(nba.add_edge(0, 'a', 2), Err(AutomatonError::InvalidState(2)));
        assert_eq!(nba.add_edge(3, 'a', 0), Err(AutomatonError::InvalidState(3)));
    }
}
