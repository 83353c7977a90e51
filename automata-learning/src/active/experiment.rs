use automata::prelude::*;

use crate::LearningError;

/// An experiment labels a column of the observation table. Applied to the prefix `u` of a row,
/// a [`Experiment::Word`] `e` stands for the finite word `u·e`, while a [`Experiment::Lasso`]
/// with `left` part `x` and `right` part `y` stands for the infinite word `u·x·y^ω`.
///
/// Counterexamples are experiments as well. Their analysis walks through the finite part
/// (`e` resp. `x`) letter by letter, which is why [`Experiment::len`], [`Experiment::letter`]
/// and [`Experiment::suffix_from`] only consider the finite part and leave the period untouched.
///
/// # Example
/// ```
/// use automata_learning::prelude::*;
/// let lasso = Experiment::lasso(vec!['a', 'b'], vec!['c']).unwrap();
/// assert_eq!(lasso.len(), 2);
/// assert_eq!(lasso.letter(1), Some('b'));
/// assert_eq!(lasso.suffix_from(1).show(), "(b, c)");
/// assert_eq!(Experiment::<char>::empty().show(), "ε");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Experiment<S> {
    /// A plain suffix.
    Word(Vec<S>),
    /// An ultimately periodic suffix, `right` is never empty.
    Lasso {
        /// The finite part that is read before the period.
        left: Vec<S>,
        /// The period.
        right: Vec<S>,
    },
}

impl<S: Symbol> Experiment<S> {
    /// The empty word, which is a column of every table that learns a finite-word language.
    pub fn empty() -> Self {
        Self::Word(vec![])
    }

    /// Creates a plain word experiment.
    pub fn word<I: IntoIterator<Item = S>>(symbols: I) -> Self {
        Self::Word(symbols.into_iter().collect())
    }

    /// Creates a lasso experiment, fails if the period `right` is empty.
    pub fn lasso(left: Vec<S>, right: Vec<S>) -> Result<Self, LearningError> {
        if right.is_empty() {
            return Err(LearningError::EmptyPeriod);
        }
        Ok(Self::Lasso { left, right })
    }

    /// Returns the finite part, i.e. the word itself or the part of a lasso before the period.
    pub fn finite_part(&self) -> &[S] {
        match self {
            Experiment::Word(word) => word,
            Experiment::Lasso { left, .. } => left,
        }
    }

    /// Returns the period of a lasso experiment.
    pub fn period(&self) -> Option<&[S]> {
        match self {
            Experiment::Word(_) => None,
            Experiment::Lasso { right, .. } => Some(right),
        }
    }

    /// The length of the finite part.
    pub fn len(&self) -> usize {
        self.finite_part().len()
    }

    /// Returns `true` if the finite part is empty.
    pub fn is_empty(&self) -> bool {
        self.finite_part().is_empty()
    }

    /// Returns the `position`-th letter of the finite part.
    pub fn letter(&self, position: usize) -> Option<S> {
        self.finite_part().letter(position)
    }

    /// Drops the first `offset` letters of the finite part, the period is kept.
    pub fn suffix_from(&self, offset: usize) -> Self {
        match self {
            Experiment::Word(word) => Experiment::Word(word.suffix(offset).to_vec()),
            Experiment::Lasso { left, right } => Experiment::Lasso {
                left: left.suffix(offset).to_vec(),
                right: right.clone(),
            },
        }
    }

    /// Builds the query that this experiment poses for the row with the given `prefix`.
    pub fn applied_to(&self, prefix: &[S]) -> Self {
        match self {
            Experiment::Word(word) => Experiment::Word(prefix.concatenate(word)),
            Experiment::Lasso { left, right } => Experiment::Lasso {
                left: prefix.concatenate(left),
                right: right.clone(),
            },
        }
    }
}

impl<S: Symbol> Show for Experiment<S> {
    fn show(&self) -> String {
        match self {
            Experiment::Word(word) => word.show(),
            Experiment::Lasso { left, right } => format!("({}, {})", left.show(), right.show()),
        }
    }
}
