use automata::prelude::*;
use tracing::{debug, trace};

use super::{Experiment, MembershipOracle, StateLabels, Value};
use crate::LearningError;

/// A word that the hypothesis classifies wrongly, together with its correct classification.
/// For finite-word learners the word is an [`Experiment::Word`], for the leading congruence it
/// is an [`Experiment::Lasso`] whose finite part is analyzed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Counterexample<S, V> {
    experiment: Experiment<S>,
    value: V,
}

impl<S: Symbol, V: Value> Counterexample<S, V> {
    /// Creates a counterexample from the misclassified word and its correct value.
    pub fn new(experiment: Experiment<S>, value: V) -> Self {
        Self { experiment, value }
    }

    /// Creates a counterexample for a finite word.
    pub fn word<I: IntoIterator<Item = S>>(word: I, value: V) -> Self {
        Self::new(Experiment::word(word), value)
    }

    /// Creates a counterexample for the lasso `left · right^ω`.
    pub fn lasso(left: Vec<S>, right: Vec<S>, value: V) -> Result<Self, LearningError> {
        Ok(Self::new(Experiment::lasso(left, right)?, value))
    }

    /// Returns the misclassified word.
    pub fn experiment(&self) -> &Experiment<S> {
        &self.experiment
    }

    /// Returns the correct value.
    pub fn value(&self) -> &V {
        &self.value
    }

    /// The length of the part that is analyzed.
    pub fn len(&self) -> usize {
        self.experiment.len()
    }

    /// Returns `true` if there is nothing to analyze.
    pub fn is_empty(&self) -> bool {
        self.experiment.is_empty()
    }
}

impl<S: Symbol, V: Value> Show for Counterexample<S, V> {
    fn show(&self) -> String {
        format!("{} -> {}", self.experiment.show(), self.value.show())
    }
}

/// The outcome of analyzing a counterexample: the position at which the states of the hypothesis
/// stop agreeing with the oracle. Querying the label of `prev_state` with the rest of the
/// counterexample from `break_index` gives `prev_value`, while querying the label of `curr_state`
/// with the rest after `break_index` gives `curr_value`, and the two differ.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CeAnalysisResult<V> {
    /// Position of the letter that leads from `prev_state` to `curr_state`.
    pub break_index: usize,
    /// State reached after `break_index` letters.
    pub prev_state: StateIndex,
    /// State reached after `break_index + 1` letters.
    pub curr_state: StateIndex,
    /// The value obtained for `prev_state`.
    pub prev_value: V,
    /// The value obtained for `curr_state`.
    pub curr_value: V,
}

impl<V> CeAnalysisResult<V> {
    /// The experiment that distinguishes the two straddling states, it is added as new column.
    pub fn experiment<S: Symbol>(&self, counterexample: &Counterexample<S, V>) -> Experiment<S>
    where
        V: Value,
    {
        counterexample.experiment().suffix_from(self.break_index + 1)
    }
}

/// Locates the breakpoint in a counterexample in the manner of Rivest and Schapire.
///
/// Let `s_j` be the state that the hypothesis reaches after reading the first `j` letters of
/// the counterexample, and let `α(j)` be the output of the oracle on the label of `s_j` followed
/// by the counterexample without its first `j` letters. Then `α(0)` is the correct value of the
/// counterexample, while `α(n)` is the value that the hypothesis predicts. As the two differ,
/// there is some `i` with `α(i) ≠ α(i + 1)`, which is what the analyzer searches for. It does so
/// either by a linear scan, giving the least such `i`, or by a binary search that needs
/// logarithmically many queries.
pub struct CeAnalyzer<'a, H, L, O> {
    hypothesis: &'a H,
    labels: &'a L,
    oracle: &'a O,
}

impl<'a, H, L, O> CeAnalyzer<'a, H, L, O>
where
    H: Deterministic,
    L: StateLabels<SymbolOf<H>>,
    O: MembershipOracle<Alphabet = H::Alphabet>,
{
    /// Creates an analyzer for the given hypothesis, whose states are labelled by `labels`.
    pub fn new(hypothesis: &'a H, labels: &'a L, oracle: &'a O) -> Self {
        Self {
            hypothesis,
            labels,
            oracle,
        }
    }

    /// Analyzes the counterexample, with a binary search if `binary_search` is set and linearly
    /// otherwise.
    pub fn analyze(
        &self,
        counterexample: &Counterexample<SymbolOf<H>, O::Output>,
        binary_search: bool,
    ) -> Result<CeAnalysisResult<O::Output>, LearningError> {
        if binary_search {
            self.bisection(counterexample)
        } else {
            self.linear(counterexample)
        }
    }

    fn run(&self, word: &[SymbolOf<H>]) -> Result<Vec<StateIndex>, LearningError> {
        let mut states = Vec::with_capacity(word.len() + 1);
        let mut current = self.hypothesis.initial();
        states.push(current);
        for &letter in word {
            current = self
                .hypothesis
                .successor(current, letter)
                .ok_or_else(|| LearningError::IncompleteHypothesis(current, letter.show()))?;
            states.push(current);
        }
        Ok(states)
    }

    fn alpha(
        &self,
        counterexample: &Counterexample<SymbolOf<H>, O::Output>,
        states: &[StateIndex],
        j: usize,
    ) -> Result<O::Output, LearningError> {
        let label = self.labels.state_label(states[j])?;
        let value = self
            .oracle
            .output(label, &counterexample.experiment().suffix_from(j))?;
        trace!("α({j}) = {} for label {}", value.show(), label.show());
        Ok(value)
    }

    /// Checks the preconditions and returns the run of the hypothesis on the finite part
    /// together with `α(0)` and `α(n)`.
    #[allow(clippy::type_complexity)]
    fn prepare(
        &self,
        counterexample: &Counterexample<SymbolOf<H>, O::Output>,
    ) -> Result<(Vec<StateIndex>, O::Output, O::Output), LearningError> {
        if counterexample.is_empty() {
            return Err(LearningError::EmptyCounterexample);
        }
        let n = counterexample.len();
        let states = self.run(counterexample.experiment().finite_part())?;

        let last = self.alpha(counterexample, &states, n)?;
        if last.value_equal(counterexample.value()) {
            return Err(LearningError::NotACounterexample(counterexample.show()));
        }
        let first = self.alpha(counterexample, &states, 0)?;
        if !first.value_equal(counterexample.value()) {
            return Err(LearningError::InconsistentCounterexample(
                counterexample.show(),
            ));
        }
        Ok((states, first, last))
    }

    fn found(
        &self,
        states: &[StateIndex],
        i: usize,
        prev_value: O::Output,
        curr_value: O::Output,
    ) -> CeAnalysisResult<O::Output> {
        debug!("found breakpoint at index {i}");
        CeAnalysisResult {
            break_index: i,
            prev_state: states[i],
            curr_state: states[i + 1],
            prev_value,
            curr_value,
        }
    }

    /// Scans the counterexample from the left and returns the least breakpoint.
    pub fn linear(
        &self,
        counterexample: &Counterexample<SymbolOf<H>, O::Output>,
    ) -> Result<CeAnalysisResult<O::Output>, LearningError> {
        let (states, first, last) = self.prepare(counterexample)?;
        let n = counterexample.len();

        let mut prev = first;
        for i in 0..n {
            let curr = if i + 1 == n {
                last.clone()
            } else {
                self.alpha(counterexample, &states, i + 1)?
            };
            if !prev.value_equal(&curr) {
                return Ok(self.found(&states, i, prev, curr));
            }
            prev = curr;
        }
        Err(LearningError::NoBreakpoint(counterexample.show()))
    }

    /// Searches a breakpoint with a binary search over `0..n`. The search keeps a window in
    /// which `α` agrees with the correct value at the lower end and disagrees right after the
    /// upper end.
    pub fn bisection(
        &self,
        counterexample: &Counterexample<SymbolOf<H>, O::Output>,
    ) -> Result<CeAnalysisResult<O::Output>, LearningError> {
        let (states, _, _) = self.prepare(counterexample)?;
        let (mut low, mut high) = (0, counterexample.len() - 1);

        while low <= high {
            let mid = low + (high - low) / 2;
            let fst = self.alpha(counterexample, &states, mid)?;
            let snd = self.alpha(counterexample, &states, mid + 1)?;
            if !fst.value_equal(&snd) {
                return Ok(self.found(&states, mid, fst, snd));
            }
            if fst.value_equal(counterexample.value()) {
                low = mid + 1;
            } else if high == mid {
                break;
            } else {
                high = mid;
            }
        }
        Err(LearningError::NoBreakpoint(counterexample.show()))
    }
}

#[cfg(test)]
mod tests {
    use automata::random::{generate_random_dfa, generate_random_word};

    use super::*;
    use crate::active::{build_hypothesis, DFAOracle, LStarHypothesis, ObservationTable};

    /// A one state hypothesis with the empty label, which accepts nothing.
    fn trivial() -> (DFA, Vec<Vec<char>>) {
        let mut ts = DTS::for_alphabet(CharAlphabet::of_size(2));
        let q = ts.add_state(false);
        ts.add_edge(q, 'a', q).unwrap();
        ts.add_edge(q, 'b', q).unwrap();
        (DFA::from_parts(ts, q).unwrap(), vec![vec![]])
    }

    impl StateLabels<char> for Vec<Vec<char>> {
        fn state_label(&self, state: StateIndex) -> Result<&[char], LearningError> {
            self.get(state)
                .map(Vec::as_slice)
                .ok_or(LearningError::InvalidState(state))
        }
    }

    fn contains_aa() -> DFAOracle<CharAlphabet> {
        let mut ts = DTS::for_alphabet(CharAlphabet::of_size(2));
        let (q0, q1, q2) = (ts.add_state(false), ts.add_state(false), ts.add_state(true));
        ts.add_edge(q0, 'a', q1).unwrap();
        ts.add_edge(q0, 'b', q0).unwrap();
        ts.add_edge(q1, 'a', q2).unwrap();
        ts.add_edge(q1, 'b', q0).unwrap();
        ts.add_edge(q2, 'a', q2).unwrap();
        ts.add_edge(q2, 'b', q2).unwrap();
        DFAOracle::new(DFA::from_parts(ts, q0).unwrap())
    }

    #[test_log::test]
    fn both_modes_find_the_switch() {
        let (hypothesis, labels) = trivial();
        let oracle = contains_aa();
        let analyzer = CeAnalyzer::new(&hypothesis, &labels, &oracle);

        // α(j) is whether the suffix of `bbaa` from position j contains `aa`, so the values
        // are 1, 1, 1, 0, 0
        let ce = Counterexample::word("bbaa".chars(), true);
        let linear = analyzer.linear(&ce).unwrap();
        let bisection = analyzer.bisection(&ce).unwrap();
        assert_eq!(linear.break_index, 2);
        assert_eq!(linear, bisection);
        assert!(linear.prev_value);
        assert!(!linear.curr_value);
        assert_eq!(linear.experiment(&ce), Experiment::word(['a']));
    }

    #[test_log::test]
    fn preconditions_are_checked() {
        let (hypothesis, labels) = trivial();
        let oracle = contains_aa();
        let analyzer = CeAnalyzer::new(&hypothesis, &labels, &oracle);

        assert_eq!(
            analyzer.analyze(&Counterexample::word([], true), false),
            Err(LearningError::EmptyCounterexample)
        );
        assert!(matches!(
            analyzer.analyze(&Counterexample::word("ab".chars(), false), true),
            Err(LearningError::NotACounterexample(_))
        ));
        // `ba` does not contain `aa`
        assert!(matches!(
            analyzer.analyze(&Counterexample::word("ba".chars(), true), false),
            Err(LearningError::InconsistentCounterexample(_))
        ));
        assert!(matches!(
            analyzer.analyze(&Counterexample::word("c".chars(), true), false),
            Err(LearningError::IncompleteHypothesis(0, _))
        ));
    }

    /// Returns whether `i` is a breakpoint in the sense that the values straddling it differ.
    fn is_breakpoint<O>(
        oracle: &O,
        labels: &impl StateLabels<char>,
        ce: &Counterexample<char, bool>,
        result: &CeAnalysisResult<bool>,
    ) -> bool
    where
        O: MembershipOracle<Alphabet = CharAlphabet, Output = bool>,
    {
        let prev = oracle
            .output(
                labels.state_label(result.prev_state).unwrap(),
                &ce.experiment().suffix_from(result.break_index),
            )
            .unwrap();
        let curr = oracle
            .output(
                labels.state_label(result.curr_state).unwrap(),
                &ce.experiment().suffix_from(result.break_index + 1),
            )
            .unwrap();
        prev == result.prev_value && curr == result.curr_value && prev != curr
    }

    #[test_log::test]
    fn analyzer_agreement_on_random_automata() {
        let mut rng = fastrand::Rng::with_seed(0xC0FFEE);
        let mut analyzed = 0;

        for _ in 0..40 {
            let target = generate_random_dfa(&mut rng, 2, 0.4, 6).unwrap();
            let oracle = DFAOracle::new(target.clone());
            let mut table = ObservationTable::new(target.alphabet().clone());
            for experiment in DFA::<CharAlphabet>::mandatory_experiments(target.alphabet()) {
                table.add_column(experiment, &oracle).unwrap();
            }
            table.add_upper_row(vec![], &oracle).unwrap();
            table.close(&oracle).unwrap();
            let (hypothesis, labelling) = build_hypothesis::<DFA>(&table).unwrap();
            let analyzer = CeAnalyzer::new(&hypothesis, &labelling, &oracle);

            for _ in 0..20 {
                let word = generate_random_word(&mut rng, target.alphabet(), 1, 12);
                let correct = target.accepts(&word).unwrap();
                if hypothesis.accepts(&word).unwrap() == correct {
                    continue;
                }
                let ce = Counterexample::word(word.clone(), correct);
                let linear = analyzer.analyze(&ce, false).unwrap();
                let bisection = analyzer.analyze(&ce, true).unwrap();

                for result in [&linear, &bisection] {
                    assert!(result.break_index < word.len());
                    assert_ne!(result.prev_value, result.curr_value);
                    assert!(is_breakpoint(&oracle, &labelling, &ce, result));
                }
                // the linear scan finds the least breakpoint
                assert!(linear.break_index <= bisection.break_index);

                let switches = (0..=word.len())
                    .map(|j| {
                        let state = hypothesis.reached_state_index(&word[..j]).unwrap();
                        oracle
                            .output(
                                labelling.state_label(state).unwrap(),
                                &ce.experiment().suffix_from(j),
                            )
                            .unwrap()
                    })
                    .collect::<Vec<_>>()
                    .windows(2)
                    .filter(|pair| pair[0] != pair[1])
                    .count();
                if switches == 1 {
                    assert_eq!(linear, bisection);
                }
                analyzed += 1;
            }
        }
        assert!(analyzed > 0);
    }
}
