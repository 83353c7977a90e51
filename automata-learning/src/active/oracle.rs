use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
};

use automata::{core::math, prelude::*};
use itertools::Itertools;
use tracing::{debug, trace};

use super::{Counterexample, Experiment, LStarHypothesis, Value};
use crate::LearningError;

type SymbolOfOracle<O> = <<O as MembershipOracle>::Alphabet as Alphabet>::Symbol;

/// Answers membership queries. The output for a row with the given `prefix` and a column labelled
/// with `experiment` is the output for the word that the experiment denotes when applied to the
/// prefix (see [`Experiment::applied_to`]). Asking the same query twice must give the same answer.
///
/// This trait is designed in a generic way, allowing us to use it for learning a priority mapping,
/// which assigns finite words a value of type `Output`, as well as a regular language by using
/// `bool` as the `Output` type.
pub trait MembershipOracle {
    /// The alphabet over which queries are posed.
    type Alphabet: Alphabet;
    /// The result of a query.
    type Output: Value;

    /// Returns a reference to the alphabet.
    fn alphabet(&self) -> &Self::Alphabet;

    /// Answers the query for `prefix` combined with `experiment`.
    fn output(
        &self,
        prefix: &[SymbolOfOracle<Self>],
        experiment: &Experiment<SymbolOfOracle<Self>>,
    ) -> Result<Self::Output, LearningError>;
}

impl<O: MembershipOracle + ?Sized> MembershipOracle for &O {
    type Alphabet = O::Alphabet;
    type Output = O::Output;

    fn alphabet(&self) -> &Self::Alphabet {
        (**self).alphabet()
    }

    fn output(
        &self,
        prefix: &[SymbolOfOracle<O>],
        experiment: &Experiment<SymbolOfOracle<O>>,
    ) -> Result<Self::Output, LearningError> {
        (**self).output(prefix, experiment)
    }
}

/// Answers equivalence queries, either confirming that the hypothesis is correct by returning
/// `None` or giving a counterexample together with its correct value.
pub trait EquivalenceOracle<H: LStarHypothesis> {
    /// Checks `hypothesis` for equivalence with the target.
    fn equivalence(
        &self,
        hypothesis: &H,
    ) -> Result<Option<Counterexample<SymbolOf<H>, H::Value>>, LearningError>;
}

/// Wraps a membership oracle and remembers every answer, so that each distinct query is only
/// forwarded once. Queries are keyed by the word they denote, i.e. the prefix combined with the
/// experiment.
#[derive(Debug)]
pub struct CachedOracle<O: MembershipOracle> {
    inner: O,
    cache: RefCell<math::Map<Experiment<SymbolOfOracle<O>>, O::Output>>,
    queries: Cell<usize>,
}

impl<O: MembershipOracle> CachedOracle<O> {
    /// Wraps `inner` with an empty cache.
    pub fn new(inner: O) -> Self {
        Self {
            inner,
            cache: RefCell::new(math::Map::default()),
            queries: Cell::new(0),
        }
    }

    /// Returns a reference to the wrapped oracle.
    pub fn inner(&self) -> &O {
        &self.inner
    }

    /// Returns the number of distinct queries, which is the number of queries that were
    /// forwarded to the wrapped oracle.
    pub fn distinct_queries(&self) -> usize {
        self.cache.borrow().len()
    }

    /// Returns the number of queries that were posed, including those answered from the cache.
    pub fn total_queries(&self) -> usize {
        self.queries.get()
    }
}

impl<O: MembershipOracle> MembershipOracle for CachedOracle<O> {
    type Alphabet = O::Alphabet;
    type Output = O::Output;

    fn alphabet(&self) -> &Self::Alphabet {
        self.inner.alphabet()
    }

    fn output(
        &self,
        prefix: &[SymbolOfOracle<O>],
        experiment: &Experiment<SymbolOfOracle<O>>,
    ) -> Result<Self::Output, LearningError> {
        self.queries.set(self.queries.get() + 1);
        let query = experiment.applied_to(prefix);
        if let Some(value) = self.cache.borrow().get(&query).cloned() {
            return Ok(value);
        }

        let value = self.inner.output(prefix, experiment)?;
        trace!("membership query {} gives {}", query.show(), value.show());
        self.cache.borrow_mut().insert(query, value.clone());
        Ok(value)
    }
}

/// Searches the product of `target` and `hypothesis` breadth-first for a pair of states on
/// which `differ` holds, and returns the shortest word leading to such a pair.
fn product_search<T, H, F>(
    target: &T,
    hypothesis: &H,
    mut differ: F,
) -> Result<Option<Vec<SymbolOf<T>>>, LearningError>
where
    T: Deterministic,
    H: Deterministic<Alphabet = T::Alphabet>,
    F: FnMut(StateIndex, StateIndex) -> Result<bool, LearningError>,
{
    let start = (target.initial(), hypothesis.initial());
    let mut seen = math::Set::default();
    seen.insert(start);
    let mut queue = VecDeque::from([(start, vec![])]);

    while let Some(((p, q), word)) = queue.pop_front() {
        if differ(p, q)? {
            debug!("product search found disagreement on {}", word.show());
            return Ok(Some(word));
        }
        for letter in target.alphabet().universe() {
            let p1 = target.successor(p, letter).ok_or_else(|| {
                AutomatonError::IncompleteTransition {
                    state: p,
                    symbol: letter.show(),
                }
            })?;
            let q1 = hypothesis
                .successor(q, letter)
                .ok_or_else(|| LearningError::IncompleteHypothesis(q, letter.show()))?;
            if seen.insert((p1, q1)) {
                queue.push_back(((p1, q1), word.extended_by(letter)));
            }
        }
    }
    Ok(None)
}

/// An oracle based on a [`DFA`] instance. It answers membership queries by running the word
/// through the automaton. Equivalence queries are answered by a breadth-first search through
/// the product with the hypothesis, which gives a shortest counterexample.
#[derive(Debug, Clone)]
pub struct DFAOracle<A: Alphabet> {
    automaton: DFA<A>,
}

impl<A: Alphabet> DFAOracle<A> {
    /// Creates a new instance of a [`DFAOracle`] from the given automaton.
    pub fn new(automaton: DFA<A>) -> Self {
        Self { automaton }
    }

    /// Returns a reference to the target automaton.
    pub fn automaton(&self) -> &DFA<A> {
        &self.automaton
    }
}

impl<A: Alphabet> MembershipOracle for DFAOracle<A> {
    type Alphabet = A;
    type Output = bool;

    fn alphabet(&self) -> &A {
        self.automaton.alphabet()
    }

    fn output(
        &self,
        prefix: &[A::Symbol],
        experiment: &Experiment<A::Symbol>,
    ) -> Result<bool, LearningError> {
        match experiment {
            Experiment::Word(suffix) => Ok(self.automaton.accepts(&prefix.concatenate(suffix))?),
            Experiment::Lasso { .. } => Err(LearningError::UnsupportedExperiment(
                experiment.show(),
            )),
        }
    }
}

impl<A: Alphabet> EquivalenceOracle<DFA<A>> for DFAOracle<A> {
    fn equivalence(
        &self,
        hypothesis: &DFA<A>,
    ) -> Result<Option<Counterexample<A::Symbol, bool>>, LearningError> {
        let target = &self.automaton;
        let word = product_search(target, hypothesis, |p, q| {
            Ok(target.is_accepting(p)? != hypothesis.is_accepting(q)?)
        })?;
        match word {
            Some(word) => {
                let value = target.accepts(&word)?;
                Ok(Some(Counterexample::word(word, value)))
            }
            None => Ok(None),
        }
    }
}

/// An oracle based on a [`DPA`], whose states are seen as a priority mapping. The output on a
/// finite word is the color of the state that it reaches. Equivalence is decided on this mapping
/// as well, so the hypothesis is correct once it assigns the same colors to all finite words.
#[derive(Debug, Clone)]
pub struct PriorityOracle<A: Alphabet> {
    automaton: DPA<A>,
}

impl<A: Alphabet> PriorityOracle<A> {
    /// Creates a new instance of a [`PriorityOracle`] from the given automaton.
    pub fn new(automaton: DPA<A>) -> Self {
        Self { automaton }
    }

    /// Returns a reference to the target automaton.
    pub fn automaton(&self) -> &DPA<A> {
        &self.automaton
    }
}

impl<A: Alphabet> MembershipOracle for PriorityOracle<A> {
    type Alphabet = A;
    type Output = Int;

    fn alphabet(&self) -> &A {
        self.automaton.alphabet()
    }

    fn output(
        &self,
        prefix: &[A::Symbol],
        experiment: &Experiment<A::Symbol>,
    ) -> Result<Int, LearningError> {
        match experiment {
            Experiment::Word(suffix) => {
                Ok(self.automaton.reached_color(&prefix.concatenate(suffix))?)
            }
            Experiment::Lasso { .. } => Err(LearningError::UnsupportedExperiment(
                experiment.show(),
            )),
        }
    }
}

impl<A: Alphabet> EquivalenceOracle<DPA<A>> for PriorityOracle<A> {
    fn equivalence(
        &self,
        hypothesis: &DPA<A>,
    ) -> Result<Option<Counterexample<A::Symbol, Int>>, LearningError> {
        let target = &self.automaton;
        let word = product_search(target, hypothesis, |p, q| {
            Ok(target.color(p)? != hypothesis.color(q)?)
        })?;
        match word {
            Some(word) => {
                let value = target.reached_color(&word)?;
                Ok(Some(Counterexample::word(word, value)))
            }
            None => Ok(None),
        }
    }
}

/// An oracle for an ω-language, given by anything that decides acceptance of lassos. Membership
/// queries must be lasso experiments. Equivalence queries compare the classes of a right
/// congruence with the target: for every word `u` and non-empty period `v` up to the maximal
/// length, the words `u·v^ω` and `r·v^ω` must be classified in the same way, where `r` is the
/// representative of the class of `u`. Equivalence is thus only checked up to a bound.
#[derive(Debug, Clone)]
pub struct OmegaOracle<A: Alphabet, T> {
    alphabet: A,
    target: T,
    max_length: usize,
}

impl<A: Alphabet, T: Accepts<Symbol = A::Symbol>> OmegaOracle<A, T> {
    /// Creates an oracle for `target` which checks equivalence on words up to length `max_length`.
    pub fn new(alphabet: A, target: T, max_length: usize) -> Self {
        Self {
            alphabet,
            target,
            max_length,
        }
    }

    /// Returns a reference to the target.
    pub fn target(&self) -> &T {
        &self.target
    }

    /// Enumerates all words up to the maximal length, shorter ones first.
    fn words(&self) -> Vec<Vec<A::Symbol>> {
        let mut words = vec![vec![]];
        let mut frontier: Vec<Vec<A::Symbol>> = vec![vec![]];
        for _ in 0..self.max_length {
            frontier = frontier
                .iter()
                .flat_map(|word| self.alphabet.universe().map(move |a| word.extended_by(a)))
                .collect_vec();
            words.extend(frontier.iter().cloned());
        }
        words
    }
}

impl<A: Alphabet, T: Accepts<Symbol = A::Symbol>> MembershipOracle for OmegaOracle<A, T> {
    type Alphabet = A;
    type Output = bool;

    fn alphabet(&self) -> &A {
        &self.alphabet
    }

    fn output(
        &self,
        prefix: &[A::Symbol],
        experiment: &Experiment<A::Symbol>,
    ) -> Result<bool, LearningError> {
        match experiment {
            Experiment::Lasso { left, right } => Ok(self
                .target
                .accepts_lasso(&prefix.concatenate(left), right)?),
            Experiment::Word(_) => Err(LearningError::UnsupportedExperiment(
                experiment.show(),
            )),
        }
    }
}

impl<A: Alphabet, T: Accepts<Symbol = A::Symbol>> EquivalenceOracle<RightCongruence<A>>
    for OmegaOracle<A, T>
{
    fn equivalence(
        &self,
        hypothesis: &RightCongruence<A>,
    ) -> Result<Option<Counterexample<A::Symbol, bool>>, LearningError> {
        let words = self.words();
        for spoke in &words {
            let representative = hypothesis.representative(hypothesis.class_of(spoke)?)?;
            if representative == spoke.as_slice() {
                continue;
            }
            for cycle in words.iter().filter(|w| !w.is_empty()) {
                let actual = self.target.accepts_lasso(spoke, cycle)?;
                if actual != self.target.accepts_lasso(representative, cycle)? {
                    debug!(
                        "{} and {} are separated by {}",
                        spoke.show(),
                        representative.show(),
                        cycle.show()
                    );
                    return Ok(Some(Counterexample::lasso(
                        spoke.clone(),
                        cycle.clone(),
                        actual,
                    )?));
                }
            }
        }
        Ok(None)
    }
}

/// A membership oracle that is backed by a function. The function receives the word that a query
/// denotes, that is the prefix combined with the experiment.
#[derive(Clone)]
pub struct FnOracle<A, F> {
    alphabet: A,
    f: F,
}

impl<A: Alphabet, F> FnOracle<A, F> {
    /// Creates an oracle over `alphabet` that answers queries with `f`.
    pub fn new(alphabet: A, f: F) -> Self {
        Self { alphabet, f }
    }
}

impl<A, V, F> MembershipOracle for FnOracle<A, F>
where
    A: Alphabet,
    V: Value,
    F: Fn(&Experiment<A::Symbol>) -> V,
{
    type Alphabet = A;
    type Output = V;

    fn alphabet(&self) -> &A {
        &self.alphabet
    }

    fn output(
        &self,
        prefix: &[A::Symbol],
        experiment: &Experiment<A::Symbol>,
    ) -> Result<V, LearningError> {
        Ok((self.f)(&experiment.applied_to(prefix)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn cache_forwards_each_query_once() {
        let oracle = CachedOracle::new(DFAOracle::new(ends_with_a()));
        assert_eq!(oracle.output(&['b'], &Experiment::word(['a'])), Ok(true));
        // denotes the same word `ba`
        assert_eq!(oracle.output(&['b', 'a'], &Experiment::empty()), Ok(true));
        assert_eq!(oracle.output(&[], &Experiment::word(['a', 'b'])), Ok(false));
        assert_eq!(oracle.distinct_queries(), 2);
        assert_eq!(oracle.total_queries(), 3);
        assert!(matches!(
            oracle.output(&[], &Experiment::lasso(vec![], vec!['a']).unwrap()),
            Err(LearningError::UnsupportedExperiment(_))
        ));
    }

    #[test_log::test]
    fn dfa_equivalence_gives_shortest_counterexample() {
        let oracle = DFAOracle::new(ends_with_a());
        assert_eq!(oracle.equivalence(&ends_with_a()), Ok(None));

        let mut ts = DTS::for_alphabet(CharAlphabet::of_size(2));
        let q = ts.add_state(false);
        ts.add_edge(q, 'a', q).unwrap();
        ts.add_edge(q, 'b', q).unwrap();
        let empty = DFA::from_parts(ts, q).unwrap();
        assert_eq!(
            oracle.equivalence(&empty),
            Ok(Some(Counterexample::word(['a'], true)))
        );

        let mut ts = DTS::for_alphabet(CharAlphabet::of_size(2));
        let q = ts.add_state(false);
        ts.add_edge(q, 'a', q).unwrap();
        let incomplete = DFA::from_parts(ts, q).unwrap();
        assert!(matches!(
            oracle.equivalence(&incomplete),
            Err(LearningError::IncompleteHypothesis(0, _))
        ));
    }

    #[test_log::test]
    fn omega_oracle_answers_lassos() {
        let mut nba = NBA::for_alphabet(CharAlphabet::of_size(2));
        let q0 = nba.add_state(false);
        let q1 = nba.add_state(true);
        nba.add_initial(q0).unwrap();
        nba.add_edge(q0, 'a', q1).unwrap();
        nba.add_edge(q1, 'a', q1).unwrap();
        nba.add_edge(q1, 'b', q1).unwrap();
        let oracle = OmegaOracle::new(CharAlphabet::of_size(2), nba, 2);

        let b = Experiment::lasso(vec![], vec!['b']).unwrap();
        assert_eq!(oracle.output(&['a'], &b), Ok(true));
        assert_eq!(oracle.output(&['b', 'a'], &b), Ok(false));
        assert!(matches!(
            oracle.output(&['a'], &Experiment::empty()),
            Err(LearningError::UnsupportedExperiment(_))
        ));
        assert_eq!(oracle.words().len(), 7);

        let mut ts = DTS::for_alphabet(CharAlphabet::of_size(2));
        let e = ts.add_state(vec![]);
        ts.add_edge(e, 'a', e).unwrap();
        ts.add_edge(e, 'b', e).unwrap();
        let trivial = RightCongruence::from_parts(ts, e).unwrap();
        assert_eq!(
            oracle.equivalence(&trivial),
            Ok(Some(Counterexample::lasso(vec!['a'], vec!['b'], true).unwrap()))
        );
    }

    #[test_log::test]
    fn fn_oracle_sees_the_whole_word() {
        let oracle = FnOracle::new(CharAlphabet::of_size(2), |q: &Experiment<char>| {
            q.len() as Int
        });
        assert_eq!(oracle.output(&['a', 'b'], &Experiment::word(['a'])), Ok(3));
        let lasso = Experiment::lasso(vec!['b'], vec!['a', 'a']).unwrap();
        assert_eq!(oracle.output(&['a'], &lasso), Ok(2));
    }
}
