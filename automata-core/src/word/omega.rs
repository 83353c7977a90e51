use crate::{alphabet::Symbol, Show};

/// An ultimately periodic omega word `spoke · cycle^ω`, stored in its unique normalized
/// (reduced) representation. Normalization first deduplicates the cycle, i.e. replaces it
/// by its shortest root, and then rolls the spoke into the loop as far as possible. So the
/// word `abca(caca)^ω` is stored as `ab(ca)^ω`.
///
/// Because the representation is unique, structural equality coincides with equality of
/// the represented infinite words.
#[derive(Clone, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct ReducedOmegaWord<S> {
    word: Vec<S>,
    loop_index: usize,
}

impl<S: Symbol> ReducedOmegaWord<S> {
    /// Creates the normalized representation of `spoke · cycle^ω`.
    ///
    /// # Panics
    /// If `cycle` is empty, as this would not represent an infinite word.
    pub fn ultimately_periodic<I, J>(spoke: I, cycle: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = S>,
    {
        let mut spoke: Vec<S> = spoke.into_iter().collect();
        let cycle: Vec<S> = cycle.into_iter().collect();
        assert!(!cycle.is_empty(), "the cycle of an omega word must be non-empty");

        let mut cycle = primitive_root(&cycle).to_vec();
        while let (Some(&last), Some(&cycle_last)) = (spoke.last(), cycle.last()) {
            if last != cycle_last {
                break;
            }
            spoke.pop();
            cycle.rotate_right(1);
        }

        let loop_index = spoke.len();
        spoke.extend(cycle);
        Self {
            word: spoke,
            loop_index,
        }
    }

    /// Creates the normalized representation of the periodic word `cycle^ω`.
    pub fn periodic<J: IntoIterator<Item = S>>(cycle: J) -> Self {
        Self::ultimately_periodic(std::iter::empty(), cycle)
    }

    /// Returns the finite prefix that is read before the loop is entered.
    pub fn spoke(&self) -> &[S] {
        &self.word[..self.loop_index]
    }

    /// Returns the finite word that is repeated infinitely often.
    pub fn cycle(&self) -> &[S] {
        &self.word[self.loop_index..]
    }

    /// The length of the spoke.
    pub fn loop_index(&self) -> usize {
        self.loop_index
    }

    /// Returns the symbol at the given position of the infinite word.
    pub fn nth(&self, position: usize) -> S {
        if position < self.loop_index {
            self.word[position]
        } else {
            let cycle = self.cycle();
            cycle[(position - self.loop_index) % cycle.len()]
        }
    }

    /// Returns the omega word that is obtained by prepending `prefix` to `self`.
    pub fn prepend(&self, prefix: &[S]) -> Self {
        Self::ultimately_periodic(
            prefix.iter().chain(self.spoke()).copied(),
            self.cycle().iter().copied(),
        )
    }
}

/// Returns the shortest word `r` such that `word` is some power of `r`.
fn primitive_root<S: Eq>(word: &[S]) -> &[S] {
    let n = word.len();
    (1..n)
        .filter(|p| n % p == 0)
        .find(|&p| (p..n).all(|i| word[i] == word[i - p]))
        .map(|p| &word[..p])
        .unwrap_or(word)
}

impl<S: Symbol> Show for ReducedOmegaWord<S> {
    fn show(&self) -> String {
        if self.loop_index == 0 {
            format!("({})^ω", self.cycle().show())
        } else {
            format!("{}({})^ω", self.spoke().show(), self.cycle().show())
        }
    }
}
