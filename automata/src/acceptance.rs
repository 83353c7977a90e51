use automata_core::prelude::*;
use bit_set::BitSet;
use tracing::trace;

use crate::{
    ts::{StateIndex, DTS},
    AutomatonError,
};

/// A min-even parity condition on the states of a deterministic automaton. Every state is
/// assigned a color (priority) and an infinite run is accepting if and only if the least
/// color that is visited infinitely often is even. A Büchi condition is the special case
/// where only the colors `0` (accepting) and `1` (rejecting) are used.
///
/// Colors are stored in a vector indexed by the (dense) state indices. A state that has not
/// been given a color explicitly has none, asking for it is an error rather than defaulting
/// to some value.
///
/// # Example
/// ```
/// use automata::prelude::*;
/// let mut condition = ParityCondition::with_size(3);
/// condition.set_color(0, 1).unwrap();
/// condition.set_color(1, 2).unwrap();
/// condition.set_color(2, 3).unwrap();
/// assert_eq!(condition.accepts_set([0, 1, 2]), Ok(false));
/// assert_eq!(condition.accepts_set([1, 2]), Ok(true));
/// assert!(condition.set_color(3, 0).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParityCondition {
    colors: Vec<Option<Int>>,
}

impl ParityCondition {
    /// Creates a condition for `size` states, none of which is colored yet.
    pub fn with_size(size: usize) -> Self {
        Self {
            colors: vec![None; size],
        }
    }

    /// Returns the number of states this condition ranges over.
    pub fn size(&self) -> usize {
        self.colors.len()
    }

    /// Grows the condition to range over `size` states. Newly added states are uncolored,
    /// shrinking is not possible.
    pub fn resize(&mut self, size: usize) {
        if size > self.colors.len() {
            self.colors.resize(size, None);
        }
    }

    /// Assigns `color` to `state`. Fails if `state` is not a state of the automaton.
    pub fn set_color(&mut self, state: StateIndex, color: Int) -> Result<(), AutomatonError> {
        let slot = self
            .colors
            .get_mut(state)
            .ok_or(AutomatonError::InvalidState(state))?;
        *slot = Some(color);
        Ok(())
    }

    /// Returns the color of `state`. Fails if the state does not exist or has no color.
    pub fn color(&self, state: StateIndex) -> Result<Int, AutomatonError> {
        self.colors
            .get(state)
            .ok_or(AutomatonError::InvalidState(state))?
            .ok_or(AutomatonError::MissingColor(state))
    }

    /// Returns `true` if every state has been assigned a color.
    pub fn is_complete(&self) -> bool {
        self.colors.iter().all(Option::is_some)
    }

    /// Decides whether a run that visits exactly the given `states` infinitely often is
    /// accepting, i.e. whether the least of their colors is even.
    pub fn accepts_set<I>(&self, states: I) -> Result<bool, AutomatonError>
    where
        I: IntoIterator<Item = StateIndex>,
    {
        let mut least: Option<Int> = None;
        for state in states {
            let color = self.color(state)?;
            least = Some(least.map_or(color, |l| l.min(color)));
        }
        least
            .map(|c| c % 2 == 0)
            .ok_or(AutomatonError::EmptyInfinitySet)
    }
}

/// Computes the set of states that are visited infinitely often by the run of `ts` on the
/// ultimately periodic word `prefix · period^ω` starting in `from`.
///
/// After reading the prefix, the period is replayed block by block. The state in which each
/// block starts is stamped with the number of the block, and as soon as a block would start in
/// an already stamped state, the run has entered its loop. The infinity set then consists of all
/// states that are visited while replaying the blocks between the two visits. As there are only
/// finitely many states, this takes at most `ts.size()` blocks.
///
/// # Example
/// ```
/// use automata::prelude::*;
/// let mut ts = DTS::for_alphabet(CharAlphabet::of_size(2));
/// let q0 = ts.add_state(Void);
/// let q1 = ts.add_state(Void);
/// ts.add_edge(q0, 'a', q1).unwrap();
/// ts.add_edge(q0, 'b', q0).unwrap();
/// ts.add_edge(q1, 'a', q1).unwrap();
/// ts.add_edge(q1, 'b', q0).unwrap();
///
/// let infinite = infinity_set(&ts, q0, &['a'], &['b', 'a']).unwrap();
/// assert_eq!(infinite.iter().collect::<Vec<_>>(), vec![q0, q1]);
/// let infinite = infinity_set(&ts, q0, &['b'], &['a']).unwrap();
/// assert_eq!(infinite.iter().collect::<Vec<_>>(), vec![q1]);
/// ```
pub fn infinity_set<A: Alphabet, Q>(
    ts: &DTS<A, Q>,
    from: StateIndex,
    prefix: &[A::Symbol],
    period: &[A::Symbol],
) -> Result<BitSet, AutomatonError> {
    if period.is_empty() {
        return Err(AutomatonError::EmptyPeriod);
    }

    let mut stamps: Vec<Option<usize>> = vec![None; ts.size()];
    let mut block_starts: Vec<StateIndex> = Vec::new();
    let mut current = ts.try_reached_from(from, prefix)?;

    let first_block = loop {
        if let Some(block) = stamps[current] {
            break block;
        }
        stamps[current] = Some(block_starts.len());
        block_starts.push(current);
        current = ts.try_reached_from(current, period)?;
    };
    trace!(
        "loop entered after {first_block} blocks, cycle spans {} blocks",
        block_starts.len() - first_block
    );

    let mut infinite = BitSet::with_capacity(ts.size());
    let mut state = block_starts[first_block];
    for _ in first_block..block_starts.len() {
        for &symbol in period {
            infinite.insert(state);
            state = ts.try_successor(state, symbol)?;
        }
    }
    Ok(infinite)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn colored(colors: &[Int]) -> ParityCondition {
        let mut condition = ParityCondition::with_size(colors.len());
        for (state, color) in colors.iter().enumerate() {
            condition.set_color(state, *color).unwrap();
        }
        condition
    }

    #[test_log::test]
    fn min_even_acceptance() {
        let condition = colored(&[1, 2, 3]);
        assert_eq!(condition.accepts_set([0, 1, 2]), Ok(false));
        let condition = colored(&[0, 2, 4]);
        assert_eq!(condition.accepts_set([0, 1, 2]), Ok(true));
        let condition = colored(&[2, 4]);
        assert_eq!(condition.accepts_set([0, 1]), Ok(true));
        assert_eq!(condition.accepts_set([1]), Ok(true));
        assert_eq!(
            condition.accepts_set(std::iter::empty()),
            Err(AutomatonError::EmptyInfinitySet)
        );
    }

    #[test_log::test]
    fn colors_are_never_defaulted() {
        let mut condition = ParityCondition::with_size(2);
        condition.set_color(0, 0).unwrap();
        assert_eq!(condition.color(1), Err(AutomatonError::MissingColor(1)));
        assert_eq!(condition.color(2), Err(AutomatonError::InvalidState(2)));
        assert_eq!(
            condition.accepts_set([0, 1]),
            Err(AutomatonError::MissingColor(1))
        );
        assert!(!condition.is_complete());

        condition.resize(3);
        assert_eq!(condition.size(), 3);
        assert_eq!(condition.set_color(2, 5), Ok(()));
        assert_eq!(condition.set_color(3, 5), Err(AutomatonError::InvalidState(3)));
    }

    #[test_log::test]
    fn infinity_set_of_counter() {
        // counts the number of `a` modulo three, `b` resets
        let mut ts = DTS::for_alphabet(CharAlphabet::of_size(2));
        for _ in 0..3 {
            ts.add_state(Void);
        }
        for q in 0..3 {
            ts.add_edge(q, 'a', (q + 1) % 3).unwrap();
            ts.add_edge(q, 'b', 0).unwrap();
        }

        let all = infinity_set(&ts, 0, &[], &['a']).unwrap();
        assert_eq!(all.len(), 3);

        let reset = infinity_set(&ts, 0, &['a', 'a'], &['b']).unwrap();
        assert_eq!(reset.iter().collect::<Vec<_>>(), vec![0]);

        let two = infinity_set(&ts, 0, &['a'], &['a', 'b']).unwrap();
        assert_eq!(two.iter().collect::<Vec<_>>(), vec![0, 1]);

        assert_eq!(
            infinity_set(&ts, 0, &['a'], &[]),
            Err(AutomatonError::EmptyPeriod)
        );
    }

    #[test_log::test]
    fn infinity_set_requires_complete_run() {
        let mut ts = DTS::for_alphabet(CharAlphabet::of_size(2));
        let q = ts.add_state(Void);
        ts.add_edge(q, 'a', q).unwrap();
        assert_eq!(
            infinity_set(&ts, q, &[], &['a', 'b']),
            Err(AutomatonError::IncompleteTransition {
                state: q,
                symbol: "b".to_string()
            })
        );
    }
}
