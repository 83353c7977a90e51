use std::fmt::Display;

use automata::{
    core::{math, show_duration},
    prelude::*,
};
use owo_colors::OwoColorize;
use tracing::{debug, trace};

use super::{Experiment, MembershipOracle, Value};
use crate::LearningError;

/// Addresses a row of an [`ObservationTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowIndex {
    /// A row in the upper part, these are the candidates for states.
    Upper(usize),
    /// A row in the lower part, the one-letter extensions of upper rows.
    Lower(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Row<S, V> {
    prefix: Vec<S>,
    values: Vec<V>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct LowerRow<S, V> {
    row: Row<S, V>,
    source: usize,
    letter: S,
}

/// An observation table consists of an ordered list of experiments (the columns) and two sets of
/// rows, each of which is identified by its prefix. For every row and every column, the table
/// stores the output of the membership oracle on the prefix combined with the experiment.
///
/// The upper rows are the candidates for states, while the lower rows are the one-letter
/// extensions of upper rows that are not upper rows themselves. The table is closed if every
/// lower row is value-equal to some upper row. Upper rows are only ever added by promoting open
/// lower rows, which keeps them pairwise distinct, so consistency never has to be checked.
///
/// Columns are only ever appended, so the position of a value in a row is stable. Upper rows are
/// additionally indexed by a hash of their values, which makes looking up the upper row matching
/// some lower row cheap.
#[derive(Debug, Clone)]
pub struct ObservationTable<A: Alphabet, V> {
    alphabet: A,
    experiments: Vec<Experiment<A::Symbol>>,
    upper: Vec<Row<A::Symbol, V>>,
    lower: Vec<LowerRow<A::Symbol, V>>,
    prefixes: math::Map<Vec<A::Symbol>, RowIndex>,
    index: math::Map<u64, Vec<usize>>,
}

impl<A: Alphabet, V: Value> ObservationTable<A, V> {
    /// Creates an empty table without rows or columns.
    pub fn new(alphabet: A) -> Self {
        Self {
            alphabet,
            experiments: vec![],
            upper: vec![],
            lower: vec![],
            prefixes: math::Map::default(),
            index: math::Map::default(),
        }
    }

    /// Returns a reference to the alphabet.
    pub fn alphabet(&self) -> &A {
        &self.alphabet
    }

    /// Returns the columns in the order in which they were added.
    pub fn experiments(&self) -> &[Experiment<A::Symbol>] {
        &self.experiments
    }

    /// Returns the number of upper rows.
    pub fn upper_len(&self) -> usize {
        self.upper.len()
    }

    /// Returns the number of lower rows.
    pub fn lower_len(&self) -> usize {
        self.lower.len()
    }

    /// Returns the prefixes of all upper rows, in the order in which they were added.
    pub fn upper_prefixes(&self) -> impl Iterator<Item = &[A::Symbol]> + '_ {
        self.upper.iter().map(|row| row.prefix.as_slice())
    }

    /// Returns the row that is identified by `prefix`, if it exists.
    pub fn row_by_prefix(&self, prefix: &[A::Symbol]) -> Option<RowIndex> {
        self.prefixes.get(prefix).copied()
    }

    fn row(&self, index: RowIndex) -> Result<&Row<A::Symbol, V>, LearningError> {
        match index {
            RowIndex::Upper(i) => self.upper.get(i),
            RowIndex::Lower(i) => self.lower.get(i).map(|lower| &lower.row),
        }
        .ok_or(LearningError::InvalidRow(index))
    }

    /// Returns the prefix of the given row.
    pub fn prefix(&self, index: RowIndex) -> Result<&[A::Symbol], LearningError> {
        Ok(self.row(index)?.prefix.as_slice())
    }

    /// Returns the values of the given row, one per column.
    pub fn values(&self, index: RowIndex) -> Result<&[V], LearningError> {
        Ok(self.row(index)?.values.as_slice())
    }

    /// Returns the upper row and the letter from which the given lower row arises.
    pub fn lower_source(&self, lower: usize) -> Result<(usize, A::Symbol), LearningError> {
        self.lower
            .get(lower)
            .map(|row| (row.source, row.letter))
            .ok_or(LearningError::InvalidRow(RowIndex::Lower(lower)))
    }

    /// Returns the row for the one-letter extension of the upper row `upper` by `letter`.
    pub fn successor_row(
        &self,
        upper: usize,
        letter: A::Symbol,
    ) -> Result<RowIndex, LearningError> {
        let prefix = self.prefix(RowIndex::Upper(upper))?.extended_by(letter);
        self.row_by_prefix(&prefix)
            .ok_or_else(|| LearningError::MissingRow(prefix.show()))
    }

    fn query<O>(
        oracle: &O,
        prefix: &[A::Symbol],
        experiments: &[Experiment<A::Symbol>],
    ) -> Result<Vec<V>, LearningError>
    where
        O: MembershipOracle<Alphabet = A, Output = V>,
    {
        experiments
            .iter()
            .map(|experiment| oracle.output(prefix, experiment))
            .collect()
    }

    fn rebuild_index(&mut self) {
        self.index.clear();
        for (i, row) in self.upper.iter().enumerate() {
            self.index
                .entry(math::hash64(&row.values))
                .or_default()
                .push(i);
        }
    }

    /// Appends `experiment` as a new column and queries its value for every existing row.
    /// Returns the position of the new column.
    pub fn add_column<O>(
        &mut self,
        experiment: Experiment<A::Symbol>,
        oracle: &O,
    ) -> Result<usize, LearningError>
    where
        O: MembershipOracle<Alphabet = A, Output = V>,
    {
        if self.experiments.contains(&experiment) {
            return Err(LearningError::DuplicateExperiment(experiment.show()));
        }
        trace!("adding column {}", experiment.show());

        // the table stays untouched if any query fails
        let values = self
            .upper
            .iter()
            .chain(self.lower.iter().map(|lower| &lower.row))
            .map(|row| oracle.output(&row.prefix, &experiment))
            .collect::<Result<Vec<_>, _>>()?;

        let rows = self
            .upper
            .iter_mut()
            .chain(self.lower.iter_mut().map(|lower| &mut lower.row));
        for (row, value) in rows.zip(values) {
            row.values.push(value);
        }
        self.experiments.push(experiment);
        self.rebuild_index();
        Ok(self.experiments.len() - 1)
    }

    /// Adds `prefix` as an upper row and returns its position. If the prefix already labels a
    /// lower row, that row is promoted, and if it is an upper row already, nothing changes.
    /// In any case, the one-letter extensions of the upper row are present afterwards.
    pub fn add_upper_row<O>(
        &mut self,
        prefix: Vec<A::Symbol>,
        oracle: &O,
    ) -> Result<usize, LearningError>
    where
        O: MembershipOracle<Alphabet = A, Output = V>,
    {
        match self.row_by_prefix(&prefix) {
            Some(RowIndex::Upper(i)) => Ok(i),
            Some(RowIndex::Lower(i)) => self.promote(i, oracle),
            None => {
                let values = Self::query(oracle, &prefix, &self.experiments)?;
                let frontier = self.query_frontier(&prefix, oracle)?;
                let position = self.insert_upper(Row { prefix, values });
                self.insert_frontier(position, frontier);
                Ok(position)
            }
        }
    }

    fn insert_upper(&mut self, row: Row<A::Symbol, V>) -> usize {
        let position = self.upper.len();
        trace!("adding upper row {}", row.prefix.show());
        self.index
            .entry(math::hash64(&row.values))
            .or_default()
            .push(position);
        self.prefixes
            .insert(row.prefix.clone(), RowIndex::Upper(position));
        self.upper.push(row);
        position
    }

    /// Queries the one-letter extensions of `base` that are not yet rows of the table.
    fn query_frontier<O>(
        &self,
        base: &[A::Symbol],
        oracle: &O,
    ) -> Result<Vec<(A::Symbol, Row<A::Symbol, V>)>, LearningError>
    where
        O: MembershipOracle<Alphabet = A, Output = V>,
    {
        let mut frontier = vec![];
        for letter in self.alphabet.universe() {
            let prefix = base.extended_by(letter);
            if self.prefixes.contains_key(&prefix) {
                continue;
            }
            let values = Self::query(oracle, &prefix, &self.experiments)?;
            frontier.push((letter, Row { prefix, values }));
        }
        Ok(frontier)
    }

    fn insert_frontier(&mut self, upper: usize, frontier: Vec<(A::Symbol, Row<A::Symbol, V>)>) {
        for (letter, row) in frontier {
            trace!("adding lower row {}", row.prefix.show());
            self.prefixes
                .insert(row.prefix.clone(), RowIndex::Lower(self.lower.len()));
            self.lower.push(LowerRow {
                row,
                source: upper,
                letter,
            });
        }
    }

    /// Moves the lower row at position `lower` into the upper part and adds its one-letter
    /// extensions as lower rows. Returns the position of the new upper row. Lower rows after
    /// `lower` move up by one.
    pub fn promote<O>(&mut self, lower: usize, oracle: &O) -> Result<usize, LearningError>
    where
        O: MembershipOracle<Alphabet = A, Output = V>,
    {
        let prefix = self.prefix(RowIndex::Lower(lower))?;
        let frontier = self.query_frontier(prefix, oracle)?;

        let LowerRow { row, .. } = self.lower.remove(lower);
        for (i, moved) in self.lower.iter().enumerate().skip(lower) {
            self.prefixes
                .insert(moved.row.prefix.clone(), RowIndex::Lower(i));
        }
        trace!("promoting {}", row.prefix.show());
        let position = self.insert_upper(row);
        self.insert_frontier(position, frontier);
        Ok(position)
    }

    /// Returns the first upper row whose values are value-equal to `values`.
    pub fn upper_row_matching(&self, values: &[V]) -> Option<usize> {
        self.index
            .get(&math::hash64(values))?
            .iter()
            .copied()
            .find(|&i| {
                let candidate = &self.upper[i].values;
                candidate.len() == values.len()
                    && candidate.iter().zip(values).all(|(x, y)| x.value_equal(y))
            })
    }

    /// Returns the position of the first lower row that does not match any upper row.
    pub fn find_open_row(&self) -> Option<usize> {
        let start = std::time::Instant::now();
        let open = self
            .lower
            .iter()
            .position(|lower| self.upper_row_matching(&lower.row.values).is_none());
        debug!(
            "closedness check took {}",
            show_duration(start.elapsed())
        );
        open
    }

    /// Returns `true` if every lower row matches some upper row.
    pub fn is_closed(&self) -> bool {
        self.find_open_row().is_none()
    }

    /// Promotes open lower rows until the table is closed and returns the number of promotions.
    pub fn close<O>(&mut self, oracle: &O) -> Result<usize, LearningError>
    where
        O: MembershipOracle<Alphabet = A, Output = V>,
    {
        let mut promotions = 0;
        while let Some(open) = self.find_open_row() {
            self.promote(open, oracle)?;
            promotions += 1;
        }
        Ok(promotions)
    }

    fn owns_state(&self, upper: usize) -> bool {
        self.upper_row_matching(&self.upper[upper].values) == Some(upper)
    }
}

/// Renders the upper rows, followed by a separator and the lower rows. Upper rows that own a
/// state of the hypothesis are marked with `*`.
impl<A: Alphabet, V: Value> Display for ObservationTable<A, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut builder = tabled::builder::Builder::default();
        builder.push_record(
            std::iter::once(String::new())
                .chain(self.experiments.iter().map(|e| e.show().bold().to_string())),
        );

        for (i, row) in self.upper.iter().enumerate() {
            let label = if self.owns_state(i) {
                format!("{} *", row.prefix.show().blue())
            } else {
                row.prefix.show()
            };
            builder.push_record(std::iter::once(label).chain(row.values.iter().map(Show::show)));
        }
        builder.push_record(
            std::iter::repeat("-".to_string()).take(self.experiments.len() + 1),
        );
        for lower in &self.lower {
            builder.push_record(
                std::iter::once(lower.row.prefix.show())
                    .chain(lower.row.values.iter().map(Show::show)),
            );
        }

        write!(f, "{}", builder.build())
    }
}

#[cfg(test)]
mod tests {
    use automata::random::generate_random_dfa;

    use super::*;
    use crate::active::{DFAOracle, FnOracle};

    fn ends_with_a() -> FnOracle<CharAlphabet, impl Fn(&Experiment<char>) -> bool> {
        FnOracle::new(CharAlphabet::of_size(2), |query: &Experiment<char>| {
            query.finite_part().last() == Some(&'a')
        })
    }

    #[test_log::test]
    fn rows_and_columns() {
        let oracle = ends_with_a();
        let mut table = ObservationTable::new(oracle.alphabet().clone());
        assert_eq!(table.add_column(Experiment::empty(), &oracle), Ok(0));
        assert_eq!(table.add_upper_row(vec![], &oracle), Ok(0));
        assert_eq!(table.upper_len(), 1);
        assert_eq!(table.lower_len(), 2);
        assert_eq!(table.row_by_prefix(&['a']), Some(RowIndex::Lower(0)));
        assert_eq!(table.lower_source(1), Ok((0, 'b')));

        assert_eq!(
            table.add_column(Experiment::empty(), &oracle),
            Err(LearningError::DuplicateExperiment("ε".to_string()))
        );
        assert_eq!(
            table.values(RowIndex::Lower(7)),
            Err(LearningError::InvalidRow(RowIndex::Lower(7)))
        );
    }

    #[test_log::test]
    fn closing_promotes_open_rows() {
        let oracle = ends_with_a();
        let mut table = ObservationTable::new(oracle.alphabet().clone());
        table.add_column(Experiment::empty(), &oracle).unwrap();
        table.add_upper_row(vec![], &oracle).unwrap();

        assert_eq!(table.find_open_row(), Some(0));
        assert!(!table.is_closed());
        assert_eq!(table.close(&oracle), Ok(1));
        assert!(table.is_closed());

        assert_eq!(table.row_by_prefix(&['a']), Some(RowIndex::Upper(1)));
        // `b` moved up after the promotion of `a`
        assert_eq!(table.row_by_prefix(&['b']), Some(RowIndex::Lower(0)));
        assert_eq!(table.successor_row(1, 'b'), Ok(RowIndex::Lower(2)));
        assert_eq!(table.upper_row_matching(&[true]), Some(1));
        assert_eq!(table.upper_row_matching(&[false]), Some(0));
    }

    #[test_log::test]
    fn promotions_bounded_by_target_size() {
        let mut rng = fastrand::Rng::with_seed(0xAB1E);
        for _ in 0..40 {
            let target = generate_random_dfa(&mut rng, 2, 0.4, 7).unwrap();
            let oracle = DFAOracle::new(target.clone());
            let mut table = ObservationTable::new(target.alphabet().clone());
            table.add_column(Experiment::empty(), &oracle).unwrap();
            for suffix in ["a", "b", "aa", "ab", "ba", "bb"] {
                table
                    .add_column(Experiment::word(suffix.chars()), &oracle)
                    .unwrap();
            }
            table.add_upper_row(vec![], &oracle).unwrap();

            // distinct upper rows lie in distinct classes of the minimal automaton
            let promotions = table.close(&oracle).unwrap();
            assert!(promotions < target.size());
            assert_eq!(table.upper_len(), promotions + 1);
            assert!(table.is_closed());
        }
    }

    /// Answers like `inner`, except for a single query which fails.
    struct FailingOn<O> {
        inner: O,
        prefix: Vec<char>,
        experiment: Experiment<char>,
    }

    impl<O: MembershipOracle<Alphabet = CharAlphabet>> MembershipOracle for FailingOn<O> {
        type Alphabet = CharAlphabet;
        type Output = O::Output;

        fn alphabet(&self) -> &CharAlphabet {
            self.inner.alphabet()
        }

        fn output(
            &self,
            prefix: &[char],
            experiment: &Experiment<char>,
        ) -> Result<O::Output, LearningError> {
            if prefix == self.prefix.as_slice() && experiment == &self.experiment {
                return Err(LearningError::UnsupportedExperiment(experiment.show()));
            }
            self.inner.output(prefix, experiment)
        }
    }

    fn assert_complete<V: Value>(table: &ObservationTable<CharAlphabet, V>) {
        for index in (0..table.upper_len())
            .map(RowIndex::Upper)
            .chain((0..table.lower_len()).map(RowIndex::Lower))
        {
            assert_eq!(table.values(index).unwrap().len(), table.experiments().len());
        }
        for i in 0..table.upper_len() {
            for letter in table.alphabet().universe() {
                assert!(table.successor_row(i, letter).is_ok());
            }
        }
    }

    #[test_log::test]
    fn failed_queries_leave_table_unchanged() {
        let failing = FailingOn {
            inner: ends_with_a(),
            prefix: vec!['b'],
            experiment: Experiment::word(['b']),
        };
        let mut table = ObservationTable::new(failing.alphabet().clone());
        table.add_column(Experiment::empty(), &failing).unwrap();
        table.add_upper_row(vec![], &failing).unwrap();
        let before = table.clone();

        assert!(table.add_column(Experiment::word(['b']), &failing).is_err());
        assert_eq!(table.experiments().len(), 1);
        assert_complete(&table);
        assert_eq!(table.to_string(), before.to_string());
        assert_eq!(table.upper_row_matching(&[false]), Some(0));

        // promoting `a` needs the row `ab`, whose value for `b` cannot be queried
        let failing = FailingOn {
            inner: ends_with_a(),
            prefix: vec!['a', 'b'],
            experiment: Experiment::empty(),
        };
        assert!(table.promote(0, &failing).is_err());
        assert!(table.add_upper_row(vec!['a'], &failing).is_err());
        assert_eq!(table.upper_len(), 1);
        assert_eq!(table.row_by_prefix(&['a']), Some(RowIndex::Lower(0)));
        assert_complete(&table);

        assert_eq!(table.close(&ends_with_a()), Ok(1));
        assert_complete(&table);
    }

    #[test_log::test]
    fn table_agrees_with_fresh_queries() {
        let oracle = ends_with_a();
        let mut table = ObservationTable::new(oracle.alphabet().clone());
        table.add_upper_row(vec![], &oracle).unwrap();
        table.add_column(Experiment::empty(), &oracle).unwrap();
        table.close(&oracle).unwrap();
        table.add_column(Experiment::word(['b']), &oracle).unwrap();
        table.add_upper_row(vec!['b', 'b'], &oracle).unwrap();

        for index in (0..table.upper_len())
            .map(RowIndex::Upper)
            .chain((0..table.lower_len()).map(RowIndex::Lower))
        {
            let prefix = table.prefix(index).unwrap();
            let values = table.values(index).unwrap();
            assert_eq!(values.len(), table.experiments().len());
            for (experiment, value) in table.experiments().iter().zip(values) {
                assert_eq!(oracle.output(prefix, experiment).as_ref(), Ok(value));
            }
        }
    }

    #[test_log::test]
    fn display_marks_states() {
        let oracle = ends_with_a();
        let mut table = ObservationTable::new(oracle.alphabet().clone());
        table.add_column(Experiment::empty(), &oracle).unwrap();
        table.add_upper_row(vec![], &oracle).unwrap();
        table.close(&oracle).unwrap();
        let rendered = table.to_string();
        assert!(rendered.contains('*'));
        assert!(rendered.contains("ab"));
        assert_eq!(rendered.matches(" *").count(), 2);
    }
}
