//! Generation of random automata and words. All functions take a [`fastrand::Rng`], so that
//! results can be reproduced by seeding it.
use automata_core::prelude::*;
use fastrand::Rng;

use crate::{
    automaton::{DFA, DPA},
    ts::{StateIndex, DTS},
    AutomatonError,
};

/// Uses sprout-like algorithm to generate a random transition system. `symbols` determines the
/// number of distinct symbols in the [`CharAlphabet`]. `probability` determines the probability
/// of a back edge to some state being inserted. The algorithm is as follows:
/// 1. Start with a single state.
/// 2. For each symbol, go through the existing states in order and with probability `probability`
///    add a back edge that state.
/// 3. If no back edge to some state was added, we insert an edge to a new state.
/// 4. Repeat until all states and symbols have been treated.
///
/// The result is complete and every state is reachable from state `0`, which is returned as
/// the initial state. `max_size` bounds the number of states, once it is reached only back
/// edges are inserted.
pub fn generate_random_ts(
    rng: &mut Rng,
    symbols: usize,
    probability: f64,
    max_size: usize,
) -> Result<(DTS, StateIndex), AutomatonError> {
    let alphabet = CharAlphabet::of_size(symbols);
    let mut dts = DTS::for_alphabet(alphabet.clone());
    let mut current = dts.add_state(Void);

    while current < dts.size() {
        'symbols: for symbol in alphabet.universe() {
            for target in 0..=current {
                if rng.f64() < probability {
                    dts.add_edge(current, symbol, target)?;
                    continue 'symbols;
                }
            }
            let target = if dts.size() < max_size.max(1) {
                dts.add_state(Void)
            } else {
                rng.usize(..dts.size())
            };
            dts.add_edge(current, symbol, target)?;
        }
        current += 1;
    }

    Ok((dts, 0))
}

/// Works as [`generate_random_ts`], but returns a [`DFA`] instead by randomly coloring the states.
pub fn generate_random_dfa(
    rng: &mut Rng,
    symbols: usize,
    probability: f64,
    max_size: usize,
) -> Result<DFA, AutomatonError> {
    let (ts, initial) = generate_random_ts(rng, symbols, probability, max_size)?;
    DFA::from_parts(ts.map_state_colors(|_| rng.bool()), initial)
}

/// Generate a random deterministic transition system of size `size` by randomly drawing transitions.
/// `symbols` determines the number of distinct symbols in the [`CharAlphabet`].
/// Note that there may be states which are unreachable from the initial state `0`.
pub fn generate_random_ts_sized(
    rng: &mut Rng,
    symbols: usize,
    size: usize,
) -> Result<(DTS, StateIndex), AutomatonError> {
    let alphabet = CharAlphabet::of_size(symbols);
    let mut dts = DTS::for_alphabet_size_hint(alphabet.clone(), size.max(1));
    for _ in 0..size.max(1) {
        dts.add_state(Void);
    }
    for q in dts.state_indices() {
        for symbol in alphabet.universe() {
            let target = rng.usize(..dts.size());
            dts.add_edge(q, symbol, target)?;
        }
    }
    Ok((dts, 0))
}

/// Works as [`generate_random_ts_sized`], but returns a [`DPA`] instead by assigning each state
/// a priority drawn uniformly from `0..num_prios`.
pub fn generate_random_dpa(
    rng: &mut Rng,
    symbols: usize,
    size: usize,
    num_prios: Int,
) -> Result<DPA, AutomatonError> {
    let (ts, initial) = generate_random_ts_sized(rng, symbols, size)?;
    let colors = ts
        .state_indices()
        .map(|_| rng.u8(..num_prios.max(1)))
        .collect::<Vec<_>>();
    DPA::from_colored_parts(ts, initial, colors)
}

/// Generate a random word over the universe of the `alphabet`. Its length is drawn uniformly from
/// the range `min_len..=max_len`.
pub fn generate_random_word<A: Alphabet>(
    rng: &mut Rng,
    alphabet: &A,
    min_len: usize,
    max_len: usize,
) -> Vec<A::Symbol> {
    let symbols: Vec<_> = alphabet.universe().collect();
    if symbols.is_empty() {
        return vec![];
    }
    let length = rng.usize(min_len..=max_len.max(min_len));
    (0..length)
        .map(|_| symbols[rng.usize(..symbols.len())])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{automaton::Accepts, ts::Deterministic};

    #[test_log::test]
    fn sprouted_ts_is_complete_and_bounded() {
        let mut rng = Rng::with_seed(17);
        for _ in 0..20 {
            let (ts, initial) = generate_random_ts(&mut rng, 2, 0.4, 6).unwrap();
            assert!(ts.is_complete());
            assert!(ts.size() <= 6);
            assert_eq!(initial, 0);
        }
    }

    #[test_log::test]
    fn random_dfa_and_dpa_are_usable() {
        let mut rng = Rng::with_seed(3);
        let dfa = generate_random_dfa(&mut rng, 3, 0.5, 8).unwrap();
        let word = generate_random_word(&mut rng, dfa.alphabet(), 0, 10);
        assert!(word.len() <= 10);
        assert!(dfa.accepts(&word).is_ok());

        let dpa = generate_random_dpa(&mut rng, 2, 5, 4).unwrap();
        assert_eq!(dpa.size(), 5);
        assert!(dpa.condition().is_complete());
        assert!(dpa.accepts_lasso(&['a', 'b', 'b'], &['a']).is_ok());
    }
}
