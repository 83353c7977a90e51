use std::time::Instant;

use automata::{core::show_duration, prelude::*};
use tracing::{debug, info, trace};

use super::{
    build_hypothesis, CachedOracle, CeAnalyzer, Counterexample, EquivalenceOracle, LStarHypothesis,
    Labelling, LearnerOptions, MembershipOracle, ObservationTable,
};
use crate::LearningError;

/// An implementation of the L* algorithm, where counterexamples are processed as proposed by
/// Rivest and Schapire: instead of adding all prefixes of a counterexample as rows, a single
/// suffix of it is added as a new column.
///
/// The kind of object that is learned is determined by `H`, see [`LStarHypothesis`]. All
/// membership queries go through a cache, so every distinct query reaches `O` only once.
pub struct LStar<H, O>
where
    H: LStarHypothesis,
    O: MembershipOracle<Alphabet = H::Alphabet, Output = H::Value>,
{
    table: ObservationTable<H::Alphabet, H::Value>,
    oracle: CachedOracle<O>,
    options: LearnerOptions,
    // the hypothesis of the current round, dropped whenever the table changes
    current: Option<(H, Labelling<SymbolOf<H>>)>,
    rounds: usize,
}

impl<H, O> LStar<H, O>
where
    H: LStarHypothesis,
    O: MembershipOracle<Alphabet = H::Alphabet, Output = H::Value>,
{
    /// Creates a learner with default options, see [`LearnerOptions`].
    pub fn new(oracle: O) -> Result<Self, LearningError> {
        Self::with_options(oracle, LearnerOptions::default())
    }

    /// Creates a learner whose table holds the mandatory experiments of `H` as columns and
    /// the empty word as its only upper row.
    pub fn with_options(oracle: O, options: LearnerOptions) -> Result<Self, LearningError> {
        let oracle = CachedOracle::new(oracle);
        let mut table = ObservationTable::new(oracle.alphabet().clone());
        for experiment in H::mandatory_experiments(table.alphabet()) {
            table.add_column(experiment, &oracle)?;
        }
        table.add_upper_row(vec![], &oracle)?;

        Ok(Self {
            table,
            oracle,
            options,
            current: None,
            rounds: 0,
        })
    }

    /// Learns the target. In each round the table is closed, a hypothesis is built from it and
    /// handed to `eq_oracle`. A counterexample is used to refine the table, otherwise the
    /// hypothesis is returned. Fails once the number of rounds exceeds the configured maximum.
    pub fn infer<T: EquivalenceOracle<H>>(&mut self, eq_oracle: &T) -> Result<H, LearningError> {
        let start = Instant::now();
        loop {
            if self.rounds >= self.options.max_iterations {
                return Err(LearningError::IterationThresholdExceeded(
                    self.options.max_iterations,
                ));
            }
            self.rounds += 1;

            let hypothesis = self.hypothesis()?.clone();
            debug!(
                "round {} yields hypothesis with {} states",
                self.rounds,
                hypothesis.size()
            );
            trace!("hypothesis\n{}", hypothesis.dot_representation());
            match eq_oracle.equivalence(&hypothesis)? {
                None => {
                    info!(
                        "learned {} states in {} rounds using {} membership queries, took {}",
                        hypothesis.size(),
                        self.rounds,
                        self.oracle.distinct_queries(),
                        show_duration(start.elapsed())
                    );
                    return Ok(hypothesis);
                }
                Some(counterexample) => {
                    info!("received counterexample {}", counterexample.show());
                    self.refine(&counterexample)?;
                }
            }
        }
    }

    /// Processes a counterexample to the current hypothesis by adding the distinguishing
    /// suffix that counterexample analysis yields as a new column.
    pub fn refine(
        &mut self,
        counterexample: &Counterexample<SymbolOf<H>, H::Value>,
    ) -> Result<(), LearningError> {
        let (hypothesis, labelling) = self.current()?.clone();
        let analysis = CeAnalyzer::new(&hypothesis, &labelling, &self.oracle)
            .analyze(counterexample, self.options.binary_search)?;
        let experiment = analysis.experiment(counterexample);
        debug!(
            "breakpoint at {} between states {} and {}, adding column {}",
            analysis.break_index,
            analysis.prev_state,
            analysis.curr_state,
            experiment.show()
        );

        self.table.add_column(experiment, &self.oracle)?;
        self.current = None;
        Ok(())
    }

    /// Returns the hypothesis for the current table, closing the table first if necessary.
    pub fn hypothesis(&mut self) -> Result<&H, LearningError> {
        self.current().map(|(hypothesis, _)| hypothesis)
    }

    /// Returns the labelling that belongs to [`LStar::hypothesis`].
    pub fn labelling(&mut self) -> Result<&Labelling<SymbolOf<H>>, LearningError> {
        self.current().map(|(_, labelling)| labelling)
    }

    fn current(&mut self) -> Result<&(H, Labelling<SymbolOf<H>>), LearningError> {
        let current = match self.current.take() {
            Some(current) => current,
            None => {
                let promotions = self.table.close(&self.oracle)?;
                trace!("closed table with {promotions} promotions\n{}", self.table);
                build_hypothesis(&self.table)?
            }
        };
        Ok(&*self.current.insert(current))
    }

    /// Returns a reference to the observation table.
    pub fn table(&self) -> &ObservationTable<H::Alphabet, H::Value> {
        &self.table
    }

    /// The number of equivalence queries that were posed so far.
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// The number of distinct membership queries that were posed so far.
    pub fn membership_queries(&self) -> usize {
        self.oracle.distinct_queries()
    }

    /// Returns the options the learner was created with.
    pub fn options(&self) -> &LearnerOptions {
        &self.options
    }

    /// Returns a reference to the membership oracle.
    pub fn oracle(&self) -> &O {
        self.oracle.inner()
    }
}
