use std::fmt::Display;

use automata_core::prelude::*;
use itertools::Itertools;

use crate::{
    automaton::{DFA, DPA, NBA},
    congruence::RightCongruence,
    ts::{Deterministic, StateIndex, DTS},
};

/// An attribute of a node in the DOT representation.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum DotStateAttribute {
    /// The label of a node
    Label(String),
    /// The shape of a node
    Shape(String),
}

impl Display for DotStateAttribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DotStateAttribute::Label(s) => write!(f, "label=\"{s}\""),
            DotStateAttribute::Shape(s) => write!(f, "shape = {s}"),
        }
    }
}

/// Objects that can be exported in the DOT format of graphviz. Nodes are named by their state
/// index, and an additional invisible node pointing to each initial state is emitted after all
/// states.
pub trait Dottable {
    /// The name of the graph, is prepended as a comment.
    fn dot_name(&self) -> String;

    /// Returns the states together with their attributes.
    fn dot_states(&self) -> Vec<(StateIndex, Vec<DotStateAttribute>)>;

    /// Returns the transitions as triples of source, label and target.
    fn dot_transitions(&self) -> Vec<(StateIndex, String, StateIndex)>;

    /// Returns the initial states.
    fn dot_initial(&self) -> Vec<StateIndex>;

    /// Compute the graphviz representation, for more information on the DOT format,
    /// see the [graphviz documentation](https://graphviz.org/doc/info/lang.html).
    fn dot_representation(&self) -> String {
        let states = self.dot_states();
        let pointer = states.iter().map(|(q, _)| q + 1).max().unwrap_or(0);

        let header = [format!("//{}", self.dot_name()), "digraph {".to_string()];
        let nodes = states
            .into_iter()
            .map(|(q, attributes)| format!("  {q} [{}];", attributes.iter().join(", ")));
        let edges = self
            .dot_transitions()
            .into_iter()
            .map(|(p, label, q)| format!("  {p} -> {q} [label=\"{label}\"];"));
        let initial = std::iter::once(format!("  {pointer} [label=\"\", shape = plaintext];"))
            .chain(
                self.dot_initial()
                    .into_iter()
                    .map(move |q| format!("  {pointer} -> {q} [label=\"\"];")),
            );

        header
            .into_iter()
            .chain(nodes)
            .chain(edges)
            .chain(initial)
            .chain(std::iter::once("}".to_string()))
            .join("\n")
    }
}

fn dts_transitions<A: Alphabet, Q>(ts: &DTS<A, Q>) -> Vec<(StateIndex, String, StateIndex)> {
    ts.state_indices()
        .flat_map(|p| {
            ts.edges_from(p)
                .map(move |(symbol, q)| (p, symbol.show(), q))
        })
        .collect()
}

fn circle(q: StateIndex, label: String, accepting: bool) -> (StateIndex, Vec<DotStateAttribute>) {
    let shape = if accepting { "doublecircle" } else { "circle" };
    (
        q,
        vec![
            DotStateAttribute::Label(label),
            DotStateAttribute::Shape(shape.to_string()),
        ],
    )
}

impl<A: Alphabet> Dottable for DFA<A> {
    fn dot_name(&self) -> String {
        "dfa".to_string()
    }

    fn dot_states(&self) -> Vec<(StateIndex, Vec<DotStateAttribute>)> {
        self.ts()
            .state_indices()
            .map(|q| circle(q, q.to_string(), self.is_accepting(q).unwrap_or(false)))
            .collect()
    }

    fn dot_transitions(&self) -> Vec<(StateIndex, String, StateIndex)> {
        dts_transitions(self.ts())
    }

    fn dot_initial(&self) -> Vec<StateIndex> {
        vec![self.initial()]
    }
}

impl<A: Alphabet> Dottable for DPA<A> {
    fn dot_name(&self) -> String {
        "dpa".to_string()
    }

    /// Uncolored states are labelled with `?`.
    fn dot_states(&self) -> Vec<(StateIndex, Vec<DotStateAttribute>)> {
        self.ts()
            .state_indices()
            .map(|q| {
                let color = self
                    .color(q)
                    .map(|c| c.to_string())
                    .unwrap_or_else(|_| "?".to_string());
                circle(q, format!("{q} | {color}"), false)
            })
            .collect()
    }

    fn dot_transitions(&self) -> Vec<(StateIndex, String, StateIndex)> {
        dts_transitions(self.ts())
    }

    fn dot_initial(&self) -> Vec<StateIndex> {
        vec![self.initial()]
    }
}

impl<A: Alphabet> Dottable for NBA<A> {
    fn dot_name(&self) -> String {
        "nba ".to_string()
    }

    fn dot_states(&self) -> Vec<(StateIndex, Vec<DotStateAttribute>)> {
        (0..self.size())
            .map(|q| circle(q, q.to_string(), self.is_accepting(q).unwrap_or(false)))
            .collect()
    }

    fn dot_transitions(&self) -> Vec<(StateIndex, String, StateIndex)> {
        self.transitions()
            .map(|(p, symbol, q)| (p, symbol.show(), q))
            .collect()
    }

    fn dot_initial(&self) -> Vec<StateIndex> {
        self.initial_states().to_vec()
    }
}

impl<A: Alphabet> Dottable for RightCongruence<A> {
    fn dot_name(&self) -> String {
        "congruence".to_string()
    }

    fn dot_states(&self) -> Vec<(StateIndex, Vec<DotStateAttribute>)> {
        self.ts()
            .state_indices()
            .map(|q| {
                let label = self
                    .representative(q)
                    .map(|word| format!("[{}]", word.show()))
                    .unwrap_or_default();
                circle(q, label, false)
            })
            .collect()
    }

    fn dot_transitions(&self) -> Vec<(StateIndex, String, StateIndex)> {
        dts_transitions(self.ts())
    }

    fn dot_initial(&self) -> Vec<StateIndex> {
        vec![self.initial()]
    }
}
