use crate::LearningError;

/// The default bound on the number of learning rounds.
pub const ITERATION_THRESHOLD: usize = if cfg!(debug_assertions) { 300 } else { 200000 };

/// Settings of a learner. By default counterexamples are analyzed linearly and at most
/// [`ITERATION_THRESHOLD`] rounds are made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LearnerOptions {
    /// Analyze counterexamples with a binary search instead of a linear scan.
    pub binary_search: bool,
    /// The maximal number of equivalence queries before giving up.
    pub max_iterations: usize,
}

impl Default for LearnerOptions {
    fn default() -> Self {
        Self {
            binary_search: false,
            max_iterations: ITERATION_THRESHOLD,
        }
    }
}

impl LearnerOptions {
    /// Sets whether counterexamples are analyzed with a binary search.
    pub fn with_binary_search(mut self, binary_search: bool) -> Self {
        self.binary_search = binary_search;
        self
    }

    /// Sets the maximal number of rounds.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Reads the options from the environment variables `LSTAR_BINARY_SEARCH` and
    /// `MAX_ITERATIONS`, falling back to the defaults for unset variables.
    pub fn from_env() -> Result<Self, LearningError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`LearnerOptions::from_env`], but reads variables through `lookup`.
    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Result<Self, LearningError> {
        let mut options = Self::default();
        if let Some(value) = lookup("LSTAR_BINARY_SEARCH") {
            options.binary_search = match value.trim() {
                "true" | "1" => true,
                "false" | "0" => false,
                other => {
                    return Err(LearningError::InvalidConfiguration(format!(
                        "LSTAR_BINARY_SEARCH must be a boolean, got {other}"
                    )))
                }
            };
        }
        if let Some(value) = lookup("MAX_ITERATIONS") {
            options.max_iterations = value.trim().parse().map_err(|_| {
                LearningError::InvalidConfiguration(format!(
                    "MAX_ITERATIONS must be a number, got {value}"
                ))
            })?;
        }
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| {
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test_log::test]
    fn options_from_variables() {
        assert_eq!(LearnerOptions::from_lookup(lookup(&[])), Ok(LearnerOptions::default()));
        assert_eq!(
            LearnerOptions::from_lookup(lookup(&[
                ("LSTAR_BINARY_SEARCH", "1"),
                ("MAX_ITERATIONS", "12")
            ])),
            Ok(LearnerOptions::default()
                .with_binary_search(true)
                .with_max_iterations(12))
        );
        assert!(matches!(
            LearnerOptions::from_lookup(lookup(&[("LSTAR_BINARY_SEARCH", "yes")])),
            Err(LearningError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            LearnerOptions::from_lookup(lookup(&[("MAX_ITERATIONS", "-3")])),
            Err(LearningError::InvalidConfiguration(_))
        ));
    }
}
