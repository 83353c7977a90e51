use std::ops::Range;

use automata_core::prelude::*;
use tracing::trace;

use crate::AutomatonError;

/// State indices are dense and assigned in the order in which states are added, starting at zero.
pub type StateIndex = usize;

/// Gives the type of symbol that a [`Deterministic`] object reads.
pub type SymbolOf<D> = <<D as Deterministic>::Alphabet as Alphabet>::Symbol;

/// A deterministic transition system (DTS) that stores its transitions in a dense table with one
/// slot per pair of state and alphabet symbol. Each state carries a color of type `Q`.
///
/// As states can only be added and never removed, state indices are stable and can be used to
/// address per-state information (such as priorities) in plain vectors.
///
/// # Example
/// ```
/// use automata::prelude::*;
/// let mut ts = DTS::for_alphabet(CharAlphabet::of_size(2));
/// let q0 = ts.add_state(false);
/// let q1 = ts.add_state(true);
/// ts.add_edge(q0, 'a', q1).unwrap();
/// ts.add_edge(q0, 'b', q0).unwrap();
/// assert_eq!(ts.reached_from(q0, &['b', 'a']), Some(q1));
/// assert_eq!(ts.successor(q1, 'a'), None);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DTS<A: Alphabet = CharAlphabet, Q = Void> {
    alphabet: A,
    colors: Vec<Q>,
    edges: Vec<Option<StateIndex>>,
}

impl<A: Alphabet, Q> DTS<A, Q> {
    /// Creates an empty transition system over the given alphabet.
    pub fn for_alphabet(alphabet: A) -> Self {
        Self {
            alphabet,
            colors: vec![],
            edges: vec![],
        }
    }

    /// Creates an empty transition system, reserving space for `size` states.
    pub fn for_alphabet_size_hint(alphabet: A, size: usize) -> Self {
        let edges = Vec::with_capacity(size * alphabet.size());
        Self {
            alphabet,
            colors: Vec::with_capacity(size),
            edges,
        }
    }

    /// Returns a reference to the underlying alphabet.
    pub fn alphabet(&self) -> &A {
        &self.alphabet
    }

    /// Returns the number of states.
    pub fn size(&self) -> usize {
        self.colors.len()
    }

    /// Returns the range of all state indices.
    pub fn state_indices(&self) -> Range<StateIndex> {
        0..self.size()
    }

    /// Returns `true` if `state` is a valid index.
    pub fn contains_state(&self, state: StateIndex) -> bool {
        state < self.size()
    }

    /// Adds a new state with the given color and returns its index. The new state has no
    /// outgoing transitions.
    pub fn add_state(&mut self, color: Q) -> StateIndex {
        let id = self.colors.len();
        self.colors.push(color);
        self.edges
            .extend(std::iter::repeat(None).take(self.alphabet.size()));
        id
    }

    fn slot(&self, state: StateIndex, symbol: A::Symbol) -> Result<usize, AutomatonError> {
        if !self.contains_state(state) {
            return Err(AutomatonError::InvalidState(state));
        }
        let position = self
            .alphabet
            .index_of(symbol)
            .ok_or_else(|| AutomatonError::UnknownSymbol(symbol.show()))?;
        Ok(state * self.alphabet.size() + position)
    }

    /// Inserts the transition `source --symbol--> target`. Returns the previous target of the
    /// transition if it was already defined.
    pub fn add_edge(
        &mut self,
        source: StateIndex,
        symbol: A::Symbol,
        target: StateIndex,
    ) -> Result<Option<StateIndex>, AutomatonError> {
        if !self.contains_state(target) {
            return Err(AutomatonError::InvalidState(target));
        }
        let slot = self.slot(source, symbol)?;
        trace!("adding edge {source} --{}--> {target}", symbol.show());
        Ok(self.edges[slot].replace(target))
    }

    /// Returns the state that is reached from `state` on `symbol`, if such a transition exists.
    pub fn successor(&self, state: StateIndex, symbol: A::Symbol) -> Option<StateIndex> {
        self.slot(state, symbol).ok().and_then(|slot| self.edges[slot])
    }

    /// Like [`DTS::successor`], but distinguishes the reason why no successor exists.
    pub fn try_successor(
        &self,
        state: StateIndex,
        symbol: A::Symbol,
    ) -> Result<StateIndex, AutomatonError> {
        self.edges[self.slot(state, symbol)?].ok_or_else(|| AutomatonError::IncompleteTransition {
            state,
            symbol: symbol.show(),
        })
    }

    /// Runs `word` starting in `state` and returns the reached state, if the run exists.
    pub fn reached_from(&self, state: StateIndex, word: &[A::Symbol]) -> Option<StateIndex> {
        self.try_reached_from(state, word).ok()
    }

    /// Runs `word` starting in `state`, failing on the first missing transition.
    pub fn try_reached_from(
        &self,
        state: StateIndex,
        word: &[A::Symbol],
    ) -> Result<StateIndex, AutomatonError> {
        if !self.contains_state(state) {
            return Err(AutomatonError::InvalidState(state));
        }
        word.iter()
            .try_fold(state, |q, &symbol| self.try_successor(q, symbol))
    }

    /// Returns an iterator over the outgoing transitions of `state` as pairs of symbol and target.
    pub fn edges_from(
        &self,
        state: StateIndex,
    ) -> impl Iterator<Item = (A::Symbol, StateIndex)> + '_ {
        let width = self.alphabet.size();
        let row: &[Option<StateIndex>] = if self.contains_state(state) {
            &self.edges[state * width..(state + 1) * width]
        } else {
            &[]
        };
        self.alphabet
            .universe()
            .zip(row.iter())
            .filter_map(|(symbol, target)| target.map(|t| (symbol, t)))
    }

    /// Returns `true` if every state has a transition for every symbol.
    pub fn is_complete(&self) -> bool {
        self.edges.iter().all(Option::is_some)
    }

    /// Returns a reference to the color of `state`.
    pub fn state_color(&self, state: StateIndex) -> Option<&Q> {
        self.colors.get(state)
    }

    /// Consumes `self` and relabels every state color through `f`.
    pub fn map_state_colors<R, F: FnMut(Q) -> R>(self, f: F) -> DTS<A, R> {
        DTS {
            alphabet: self.alphabet,
            colors: self.colors.into_iter().map(f).collect(),
            edges: self.edges,
        }
    }

    /// Consumes `self` and replaces the state colors, the `i`-th color goes to state `i`. Fails
    /// unless there is precisely one color per state.
    pub fn with_state_colors<R>(self, colors: Vec<R>) -> Result<DTS<A, R>, AutomatonError> {
        if colors.len() < self.size() {
            return Err(AutomatonError::MissingColor(colors.len()));
        }
        if colors.len() > self.size() {
            return Err(AutomatonError::InvalidState(self.size()));
        }
        Ok(DTS {
            alphabet: self.alphabet,
            colors,
            edges: self.edges,
        })
    }
}

/// A deterministic object with a designated initial state. This is the capability that
/// learning algorithms need from a hypothesis: the initial state and the successor function.
pub trait Deterministic {
    /// The alphabet the object reads.
    type Alphabet: Alphabet;

    /// Returns a reference to the alphabet.
    fn alphabet(&self) -> &Self::Alphabet;

    /// Returns the designated initial state.
    fn initial(&self) -> StateIndex;

    /// Returns the number of states.
    fn size(&self) -> usize;

    /// Returns the successor of `state` on `symbol`, if it exists.
    fn successor(&self, state: StateIndex, symbol: SymbolOf<Self>) -> Option<StateIndex>;

    /// Runs `word` from `state` and returns the reached state, if the run exists.
    fn reached_state_index_from(
        &self,
        state: StateIndex,
        word: &[SymbolOf<Self>],
    ) -> Option<StateIndex> {
        word.iter()
            .try_fold(state, |q, &symbol| self.successor(q, symbol))
    }

    /// Runs `word` from the initial state and returns the reached state, if the run exists.
    fn reached_state_index(&self, word: &[SymbolOf<Self>]) -> Option<StateIndex> {
        self.reached_state_index_from(self.initial(), word)
    }
}

/// Implements [`Deterministic`] for a type that wraps a [`DTS`] in a field `ts` and stores its
/// initial state in a field `initial`.
macro_rules! impl_deterministic_for_wrapper {
    ($name:ident) => {
        impl<A: automata_core::alphabet::Alphabet> $crate::ts::Deterministic for $name<A> {
            type Alphabet = A;

            fn alphabet(&self) -> &A {
                self.ts.alphabet()
            }

            fn initial(&self) -> $crate::ts::StateIndex {
                self.initial
            }

            fn size(&self) -> usize {
                self.ts.size()
            }

            fn successor(
                &self,
                state: $crate::ts::StateIndex,
                symbol: A::Symbol,
            ) -> Option<$crate::ts::StateIndex> {
                self.ts.successor(state, symbol)
            }
        }
    };
}
pub(crate) use impl_deterministic_for_wrapper;
