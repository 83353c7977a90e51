use automata::prelude::*;

/// The result of a membership query. Two values are compared through [`Value::value_equal`],
/// which has to agree with the [`Hash`](std::hash::Hash) implementation, since rows of the
/// observation table are looked up by hashing their values.
pub trait Value: Color + Show {
    /// Decides whether `self` and `other` are the same result.
    fn value_equal(&self, other: &Self) -> bool {
        self == other
    }
}

impl Value for bool {}

/// Priorities, as they are used for learning parity automata.
impl Value for Int {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn values_compare_by_content() {
        assert!(true.value_equal(&true));
        assert!(!false.value_equal(&true));
        assert!(3u8.value_equal(&3));
        assert!(!Int::value_equal(&0, &1));
    }
}
