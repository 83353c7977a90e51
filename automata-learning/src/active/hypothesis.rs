use automata::{
    core::{math::Bijection, show_duration},
    prelude::*,
};
use tracing::debug;

use super::{Experiment, ObservationTable, RowIndex, Value};
use crate::LearningError;

/// Gives access to the label (an access word) of each state of a hypothesis. Counterexample
/// analysis queries the label of a state in place of the prefix that leads into it.
pub trait StateLabels<S> {
    /// Returns the label of `state`, failing if no such state exists.
    fn state_label(&self, state: StateIndex) -> Result<&[S], LearningError>;
}

/// Associates the states of a hypothesis with the upper rows of the table it was built from.
/// The label of a state is the prefix of its upper row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Labelling<S> {
    states: Bijection<StateIndex, usize>,
    labels: Vec<Vec<S>>,
}

impl<S> Labelling<S> {
    /// Returns the number of labelled states.
    pub fn size(&self) -> usize {
        self.labels.len()
    }

    /// Returns the upper row that owns `state`.
    pub fn upper_row(&self, state: StateIndex) -> Option<usize> {
        self.states.get_by_left(&state).copied()
    }

    /// Returns the state that is owned by the upper row `upper`.
    pub fn state_of(&self, upper: usize) -> Option<StateIndex> {
        self.states.get_by_right(&upper).copied()
    }
}

impl<S> StateLabels<S> for Labelling<S> {
    fn state_label(&self, state: StateIndex) -> Result<&[S], LearningError> {
        self.labels
            .get(state)
            .map(Vec::as_slice)
            .ok_or(LearningError::InvalidState(state))
    }
}

/// The kinds of automata that can be learned from an observation table. Each kind determines
/// which values the membership oracle produces, which experiments every table starts with and
/// how states are annotated from the values in their rows.
pub trait LStarHypothesis: Deterministic + Dottable + Clone + Sized {
    /// The output of a membership query.
    type Value: Value;

    /// The experiments that are added to the table before the first row.
    fn mandatory_experiments(alphabet: &Self::Alphabet) -> Vec<Experiment<SymbolOf<Self>>>;

    /// Assembles a hypothesis from the transition structure that was read off the table. The
    /// states of `ts` are colored with their labels and `rows[q]` holds the values of the row
    /// owning state `q`.
    fn from_table(
        ts: DTS<Self::Alphabet, Vec<SymbolOf<Self>>>,
        initial: StateIndex,
        experiments: &[Experiment<SymbolOf<Self>>],
        rows: &[&[Self::Value]],
    ) -> Result<Self, LearningError>;
}

/// Reads off the values in the column of the empty experiment, one per state.
fn empty_column<S: Symbol, V: Value>(
    experiments: &[Experiment<S>],
    rows: &[&[V]],
) -> Result<Vec<V>, LearningError> {
    let missing = || LearningError::MissingExperiment(Experiment::<S>::empty().show());
    let column = experiments
        .iter()
        .position(|e| e == &Experiment::empty())
        .ok_or_else(missing)?;
    rows.iter()
        .map(|row| row.get(column).cloned().ok_or_else(missing))
        .collect()
}

impl<A: Alphabet> LStarHypothesis for DFA<A> {
    type Value = bool;

    fn mandatory_experiments(_alphabet: &A) -> Vec<Experiment<A::Symbol>> {
        vec![Experiment::empty()]
    }

    fn from_table(
        ts: DTS<A, Vec<A::Symbol>>,
        initial: StateIndex,
        experiments: &[Experiment<A::Symbol>],
        rows: &[&[bool]],
    ) -> Result<Self, LearningError> {
        let accepting = empty_column(experiments, rows)?;
        Ok(DFA::from_parts(ts.with_state_colors(accepting)?, initial)?)
    }
}

/// Priority mappings are learned like Moore machines, the value of a word is the color of the
/// state that it reaches. The resulting DPA colors its states accordingly.
impl<A: Alphabet> LStarHypothesis for DPA<A> {
    type Value = Int;

    fn mandatory_experiments(_alphabet: &A) -> Vec<Experiment<A::Symbol>> {
        vec![Experiment::empty()]
    }

    fn from_table(
        ts: DTS<A, Vec<A::Symbol>>,
        initial: StateIndex,
        experiments: &[Experiment<A::Symbol>],
        rows: &[&[Int]],
    ) -> Result<Self, LearningError> {
        let colors = empty_column(experiments, rows)?;
        Ok(DPA::from_colored_parts(
            ts.map_state_colors(|_| Void),
            initial,
            colors,
        )?)
    }
}

/// The leading congruence of an ω-language is learned from lasso experiments only.
impl<A: Alphabet> LStarHypothesis for RightCongruence<A> {
    type Value = bool;

    fn mandatory_experiments(_alphabet: &A) -> Vec<Experiment<A::Symbol>> {
        vec![]
    }

    fn from_table(
        ts: DTS<A, Vec<A::Symbol>>,
        initial: StateIndex,
        _experiments: &[Experiment<A::Symbol>],
        _rows: &[&[bool]],
    ) -> Result<Self, LearningError> {
        Ok(RightCongruence::from_parts(ts, initial)?)
    }
}

/// Builds a hypothesis from a closed table. Its states are the distinct upper rows, where the
/// first upper row with a given vector of values owns the state, and states are numbered in the
/// order of their rows. The transition from the state of row `u` on `a` leads to the state
/// whose row is value-equal to the row of `ua`.
///
/// Fails with [`LearningError::TableNotClosed`] if some lower row has no matching upper row.
pub fn build_hypothesis<H: LStarHypothesis>(
    table: &ObservationTable<H::Alphabet, H::Value>,
) -> Result<(H, Labelling<SymbolOf<H>>), LearningError> {
    let start = std::time::Instant::now();
    if let Some(open) = table.find_open_row() {
        return Err(LearningError::TableNotClosed(
            table.prefix(RowIndex::Lower(open))?.show(),
        ));
    }

    let alphabet = table.alphabet().clone();
    let mut ts = DTS::for_alphabet_size_hint(alphabet.clone(), table.upper_len());
    let mut states = Bijection::new();
    let mut labels = vec![];
    let mut rows = vec![];

    for (upper, prefix) in table.upper_prefixes().enumerate() {
        let values = table.values(RowIndex::Upper(upper))?;
        if table.upper_row_matching(values) != Some(upper) {
            continue;
        }
        let state = ts.add_state(prefix.to_vec());
        states.insert(state, upper);
        labels.push(prefix.to_vec());
        rows.push(values);
    }

    for (&state, &upper) in states.iter() {
        for letter in alphabet.universe() {
            let successor = table.successor_row(upper, letter)?;
            let target = table
                .upper_row_matching(table.values(successor)?)
                .and_then(|row| states.get_by_right(&row))
                .ok_or_else(|| {
                    LearningError::TableNotClosed(labels[state].extended_by(letter).show())
                })?;
            ts.add_edge(state, letter, *target)?;
        }
    }

    let initial = match table.row_by_prefix(&[]) {
        Some(RowIndex::Upper(row)) => states.get_by_right(&row).copied(),
        _ => None,
    }
    .ok_or_else(|| LearningError::MissingRow(Experiment::<SymbolOf<H>>::empty().show()))?;

    debug!(
        "building hypothesis with {} states took {}",
        ts.size(),
        show_duration(start.elapsed())
    );
    let hypothesis = H::from_table(ts, initial, table.experiments(), &rows)?;
    Ok((hypothesis, Labelling { states, labels }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::active::{FnOracle, MembershipOracle};

    fn table_for<V: Value, F: Fn(&Experiment<char>) -> V>(
        oracle: &FnOracle<CharAlphabet, F>,
        experiments: Vec<Experiment<char>>,
    ) -> ObservationTable<CharAlphabet, V> {
        let mut table = ObservationTable::new(oracle.alphabet().clone());
        for experiment in experiments {
            table.add_column(experiment, oracle).unwrap();
        }
        table.add_upper_row(vec![], oracle).unwrap();
        table
    }

    #[test_log::test]
    fn dfa_from_closed_table() {
        let oracle = FnOracle::new(CharAlphabet::of_size(2), |q: &Experiment<char>| {
            q.finite_part().last() == Some(&'a')
        });
        let mut table = table_for(
            &oracle,
            DFA::<CharAlphabet>::mandatory_experiments(oracle.alphabet()),
        );

        assert!(matches!(
            build_hypothesis::<DFA>(&table),
            Err(LearningError::TableNotClosed(_))
        ));
        table.close(&oracle).unwrap();

        let (dfa, labelling) = build_hypothesis::<DFA>(&table).unwrap();
        assert_eq!(dfa.size(), 2);
        assert_eq!(dfa.initial(), 0);
        assert_eq!(dfa.accepts(&['b', 'a']), Ok(true));
        assert_eq!(dfa.accepts(&['a', 'b']), Ok(false));
        assert_eq!(labelling.state_label(1), Ok(&['a'][..]));
        assert_eq!(labelling.state_label(2), Err(LearningError::InvalidState(2)));
        assert_eq!(labelling.upper_row(1), Some(1));
        assert_eq!(labelling.state_of(0), Some(0));
    }

    #[test_log::test]
    fn dpa_from_priorities() {
        // the color of a word is 0 if it ends with `a` and 1 otherwise
        let oracle = FnOracle::new(CharAlphabet::of_size(2), |q: &Experiment<char>| {
            if q.finite_part().last() == Some(&'a') {
                0
            } else {
                1
            }
        });
        let mut table = table_for(&oracle, vec![Experiment::empty()]);
        table.close(&oracle).unwrap();
        let (dpa, _) = build_hypothesis::<DPA>(&table).unwrap();
        assert_eq!(dpa.size(), 2);
        assert_eq!(dpa.color(0), Ok(1));
        assert_eq!(dpa.color(1), Ok(0));
        assert_eq!(dpa.accepts_lasso(&['b'], &['a', 'b']), Ok(true));
        assert_eq!(dpa.accepts_lasso(&['a'], &['b']), Ok(false));
    }

    #[test_log::test]
    fn congruence_without_columns_is_trivial() {
        let oracle = FnOracle::new(CharAlphabet::of_size(2), |_: &Experiment<char>| true);
        let table = table_for(&oracle, vec![]);
        let (cong, labelling) = build_hypothesis::<RightCongruence>(&table).unwrap();
        assert_eq!(cong.size(), 1);
        assert_eq!(cong.class_of(&['a', 'b']), Ok(0));
        assert_eq!(labelling.state_label(0), Ok(&[][..]));
    }

    #[test_log::test]
    fn missing_mandatory_column() {
        let oracle = FnOracle::new(CharAlphabet::of_size(1), |_: &Experiment<char>| false);
        let table = table_for(&oracle, vec![Experiment::word(['a'])]);
        assert_eq!(
            build_hypothesis::<DFA>(&table).map(|_| ()),
            Err(LearningError::MissingExperiment("ε".to_string()))
        );
    }
}
