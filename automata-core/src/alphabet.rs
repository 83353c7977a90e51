use std::{fmt::Debug, hash::Hash};

use itertools::Itertools;

use crate::Show;

/// A symbol of an alphabet, which is also the type of label that is used for transitions.
/// Symbols are cheap to copy and totally ordered, which allows us to enumerate words in
/// length-lexicographic order.
pub trait Symbol: Copy + Eq + Ord + Hash + Debug + Show {}

impl<S: Copy + Eq + Ord + Hash + Debug + Show> Symbol for S {}

/// An alphabet is a finite, ordered collection of [`Symbol`]s. The position of a symbol
/// in the alphabet is used to address transitions in dense transition tables.
pub trait Alphabet: Clone + Debug + PartialEq + Eq {
    /// The type of symbol that makes up the alphabet.
    type Symbol: Symbol;

    /// Iterator over all symbols of the alphabet.
    type Universe<'this>: Iterator<Item = Self::Symbol>
    where
        Self: 'this;

    /// Returns an iterator over all symbols in the order in which they appear in the alphabet.
    fn universe(&self) -> Self::Universe<'_>;

    /// Returns the number of symbols.
    fn size(&self) -> usize;

    /// Returns the position of `symbol` in the alphabet, if it is present.
    fn index_of(&self, symbol: Self::Symbol) -> Option<usize>;

    /// Returns the symbol at position `index`, if it exists.
    fn nth(&self, index: usize) -> Option<Self::Symbol>;

    /// Returns `true` if and only if `symbol` belongs to the alphabet.
    fn contains(&self, symbol: Self::Symbol) -> bool {
        self.index_of(symbol).is_some()
    }
}

/// Represents an alphabet where a [`Symbol`] is just a single `char`.
///
/// # Example
/// ```
/// use automata_core::prelude::*;
/// let alphabet = CharAlphabet::of_size(3);
/// assert_eq!(alphabet.universe().collect::<String>(), "abc");
/// assert_eq!(alphabet.index_of('c'), Some(2));
/// ```
#[derive(Clone, Hash, PartialEq, Eq, Debug, PartialOrd, Ord)]
pub struct CharAlphabet(pub(crate) Vec<char>);

impl CharAlphabet {
    /// Creates a new [`CharAlphabet`] alphabet of the given size. The symbols are just the first `size` letters
    /// of the alphabet, i.e. 'a' to 'z'.
    pub fn of_size(size: usize) -> Self {
        assert!(size <= 26, "Alphabet is too large");
        Self((0..size).map(|i| (b'a' + i as u8) as char).collect())
    }

    /// Creates a new [`CharAlphabet`] from an iterator over the symbols. Duplicates are removed
    /// while the order of first occurrence is kept.
    pub fn new<I>(symbols: I) -> Self
    where
        I: IntoIterator<Item = char>,
    {
        Self(symbols.into_iter().unique().collect())
    }
}

impl std::ops::Index<usize> for CharAlphabet {
    type Output = char;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

/// Helper macro for creating a [`CharAlphabet`] alphabet. Is called simply with a list of symbols
/// that are separated by commata.
///
/// # Examples
/// ```
/// use automata_core::prelude::*;
/// let alphabet = alphabet!(simple 'a', 'b', 'c');
/// assert_eq!(alphabet.size(), 3);
/// ```
#[macro_export]
macro_rules! alphabet {
    (simple $($c:literal),*) => {
        $crate::alphabet::CharAlphabet::new(vec![$($c),*])
    };
}

impl From<Vec<char>> for CharAlphabet {
    fn from(value: Vec<char>) -> Self {
        Self::new(value)
    }
}

impl FromIterator<char> for CharAlphabet {
    fn from_iter<T: IntoIterator<Item = char>>(iter: T) -> Self {
        Self(iter.into_iter().unique().sorted().collect())
    }
}

impl Alphabet for CharAlphabet {
    type Symbol = char;

    type Universe<'this> = std::iter::Cloned<std::slice::Iter<'this, char>>
        where
            Self: 'this;

    fn universe(&self) -> Self::Universe<'_> {
        self.0.iter().cloned()
    }

    fn size(&self) -> usize {
        self.0.len()
    }

    fn index_of(&self, symbol: char) -> Option<usize> {
        self.0.iter().position(|c| *c == symbol)
    }

    fn nth(&self, index: usize) -> Option<char> {
        self.0.get(index).copied()
    }
}
