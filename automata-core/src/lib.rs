//! Core definitions that are shared between the automata and the learning crates. This
//! covers alphabets, finite words, ultimately periodic words and colors.
#![deny(missing_docs)]
use std::{fmt::Debug, hash::Hash};

/// Type aliases for the collections that are used throughout the workspace.
pub mod math;

mod show;
pub use show::{show_duration, Show};

/// Alphabets and their symbols.
#[macro_use]
pub mod alphabet;

/// Finite words and ultimately periodic omega words.
#[macro_use]
pub mod word;

/// Alias for the default integer type that is used for coloring states, most notably
/// for the priorities of a parity automaton.
pub type Int = u8;

/// A color is simply a type that can be used to color states or be the output of
/// a membership query.
pub trait Color: Clone + Eq + Hash + Debug {}

impl<T: Eq + Clone + Hash + Debug> Color for T {}

/// Represents the absence of a color. Transition systems that only carry structure
/// use this as their state color.
#[derive(Hash, Eq, PartialEq, PartialOrd, Ord, Clone, Copy, Default)]
pub struct Void;

impl Debug for Void {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#")
    }
}

/// Everything that is commonly needed, `use automata_core::prelude::*;` should suffice.
pub mod prelude {
    pub use super::{
        alphabet,
        alphabet::{Alphabet, CharAlphabet, Symbol},
        math, upw,
        word::{FiniteWord, ReducedOmegaWord},
        Color, Int, Show, Void,
    };
}
