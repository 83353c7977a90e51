use crate::{alphabet::Symbol, Show};

mod omega;
pub use omega::ReducedOmegaWord;

/// Helper methods for finite words, which are represented as slices of symbols. Out of
/// range positions saturate instead of panicking, so taking the suffix of a word from its
/// length (or beyond) gives the empty word.
///
/// # Example
/// ```
/// use automata_core::prelude::*;
/// let word = ['a', 'b', 'c'];
/// assert_eq!(word.prefix(2), &['a', 'b']);
/// assert_eq!(word.suffix(1), &['b', 'c']);
/// assert!(word.suffix(7).is_empty());
/// assert_eq!(word.concatenate(&['d']).as_string(), "abcd");
/// ```
pub trait FiniteWord<S: Symbol> {
    /// Returns the symbols of `self` as a slice.
    fn symbols(&self) -> &[S];

    /// Returns the prefix of `self` with the given `length`.
    fn prefix(&self, length: usize) -> &[S] {
        let symbols = self.symbols();
        &symbols[..length.min(symbols.len())]
    }

    /// Returns the suffix of `self` that starts at position `offset`.
    fn suffix(&self, offset: usize) -> &[S] {
        let symbols = self.symbols();
        &symbols[offset.min(symbols.len())..]
    }

    /// Returns the symbol at the given `position`, if it exists.
    fn letter(&self, position: usize) -> Option<S> {
        self.symbols().get(position).copied()
    }

    /// Builds the concatenation of `self` and `other` as a new vector.
    fn concatenate(&self, other: &[S]) -> Vec<S> {
        let mut out = Vec::with_capacity(self.symbols().len() + other.len());
        out.extend_from_slice(self.symbols());
        out.extend_from_slice(other);
        out
    }

    /// Builds the word obtained by appending a single symbol to `self`.
    fn extended_by(&self, symbol: S) -> Vec<S> {
        self.concatenate(&[symbol])
    }

    /// Renders the word, the empty word is displayed as `ε`.
    fn as_string(&self) -> String {
        self.symbols().show()
    }
}

impl<S: Symbol> FiniteWord<S> for [S] {
    fn symbols(&self) -> &[S] {
        self
    }
}

impl<S: Symbol> FiniteWord<S> for Vec<S> {
    fn symbols(&self) -> &[S] {
        self.as_slice()
    }
}

impl<S: Symbol, const N: usize> FiniteWord<S> for [S; N] {
    fn symbols(&self) -> &[S] {
        self.as_slice()
    }
}

/// This macro can be used to create a [`ReducedOmegaWord`] object from some representation, it is mainly interesting
/// for quickly constructing infinite words without having to go through the [`ReducedOmegaWord`] struct.
///
/// There are essentially two distinct variants of using this macro:
/// - `upw!(base, recur)` creates an ultimately periodic word with the representation of `base` followed by the representation of `recur`.
/// - `upw!(recur)` creates a periodic word that is the repetition of `recur`.
///
/// # Example:
/// ```
/// use automata_core::prelude::*;
/// let ultimately_periodic = upw!("ab", "bb"); // represents the ultimately periodic word `ab(bb)^ω`
/// assert_eq!(ultimately_periodic.spoke(), &['a']); // the spoke is normalized to just `a`
/// assert_eq!(ultimately_periodic.cycle(), &['b']); // while the loop normalizes to `b`
///
/// let periodic_word = upw!("bbbbb");
/// assert!(periodic_word.spoke().is_empty());
/// assert_eq!(periodic_word.cycle(), &['b']);
/// ```
#[macro_export]
macro_rules! upw {
    ($recur:expr) => {
        $crate::word::ReducedOmegaWord::periodic($recur.chars())
    };
    ($base:expr, $recur:expr) => {
        $crate::word::ReducedOmegaWord::ultimately_periodic($base.chars(), $recur.chars())
    };
}
