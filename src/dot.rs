//! DOT (Graphviz) rendering of generators, verifier graphs and diagnosers.
//!
//! # DOT Format
//!
//! - **States** are circles labelled with their name; the initial state gets
//!   an incoming arrow from an invisible point.
//! - **Generators**: solid edges for observable events, dashed for unobservable ones.
//! - **Verifier graphs**: confused states are filled, `Neg` edges are drawn in
//!   the configured color, and the blocking state is a square.
//! - **Diagnosers**: states are labelled with their diagnosis.
//!
//! # Examples
//!
//! ```
//! use codiag_rs::dot::ToDot;
//! use codiag_rs::generator::Generator;
//!
//! let mut g = Generator::new("g");
//! g.add_named_transition("s0", "a", "s1").unwrap();
//! g.set_init_state_by_name("s0");
//!
//! let dot = g.to_dot().unwrap();
//! assert!(dot.starts_with("digraph {"));
//! // Render with: dot -Tpng output.dot -o output.png
//! ```

use std::fmt::Write as _;

use crate::diagnoser::Diagnoser;
use crate::generator::Generator;
use crate::graph::{EdgeKind, VerifierGraph};

/// Configuration options for DOT output generation.
#[derive(Debug, Clone)]
pub struct DotConfig {
    /// Shape for states (default: "circle")
    pub state_shape: &'static str,
    /// Shape for the blocking state (default: "square")
    pub blocking_shape: &'static str,
    /// Style for observable (and `Tau`) edges (default: "solid")
    pub observable_edge_style: &'static str,
    /// Style for unobservable edges (default: "dashed")
    pub unobservable_edge_style: &'static str,
    /// Color for `Neg` edges (default: "red")
    pub neg_edge_color: &'static str,
    /// Fill color for confused states (default: "lightgray")
    pub confused_fill: &'static str,
}

impl Default for DotConfig {
    fn default() -> Self {
        Self {
            state_shape: "circle",
            blocking_shape: "square",
            observable_edge_style: "solid",
            unobservable_edge_style: "dashed",
            neg_edge_color: "red",
            confused_fill: "lightgray",
        }
    }
}

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

pub trait ToDot {
    fn to_dot_with_config(&self, config: &DotConfig) -> Result<String, std::fmt::Error>;

    fn to_dot(&self) -> Result<String, std::fmt::Error> {
        self.to_dot_with_config(&DotConfig::default())
    }
}

impl ToDot for Generator {
    fn to_dot_with_config(&self, config: &DotConfig) -> Result<String, std::fmt::Error> {
        let mut dot = String::new();
        writeln!(dot, "digraph {{")?;
        writeln!(dot, "label=\"{}\";", escape(self.name()))?;
        writeln!(dot, "node [shape={}];", config.state_shape)?;

        for state in self.states() {
            writeln!(dot, "{} [label=\"{}\"];", state.index(), escape(self.state_name(state)))?;
        }
        if let Some(init) = self.init_state() {
            writeln!(dot, "init [shape=point];")?;
            writeln!(dot, "init -> {};", init.index())?;
        }

        for state in self.states() {
            for (event, target) in self.transitions_from(state) {
                let style = if self.is_observable(event) {
                    config.observable_edge_style
                } else {
                    config.unobservable_edge_style
                };
                writeln!(
                    dot,
                    "{} -> {} [label=\"{}\", style={}];",
                    state.index(),
                    target.index(),
                    escape(event.name()),
                    style
                )?;
            }
        }

        writeln!(dot, "}}")?;
        Ok(dot)
    }
}

impl ToDot for VerifierGraph {
    fn to_dot_with_config(&self, config: &DotConfig) -> Result<String, std::fmt::Error> {
        let mut dot = String::new();
        writeln!(dot, "digraph {{")?;
        writeln!(dot, "node [shape={}];", config.state_shape)?;

        for node in self.nodes() {
            match self.state(node) {
                Some(state) if state.is_confused() => writeln!(
                    dot,
                    "{} [label=\"{}\", style=filled, fillcolor={}];",
                    node.index(),
                    state,
                    config.confused_fill
                )?,
                Some(state) => writeln!(dot, "{} [label=\"{}\"];", node.index(), state)?,
                // The blocking state is only drawn when something reaches it.
                None if self.is_blocking_reachable() => {
                    writeln!(dot, "{} [shape={}, label=\"{}\"];", node.index(), config.blocking_shape, node)?
                }
                None => {}
            }
        }
        writeln!(dot, "init [shape=point];")?;
        writeln!(dot, "init -> {};", self.initial().index())?;

        for (source, edge) in self.all_edges() {
            let events: Vec<&str> = edge.events.iter().map(|e| e.name()).collect();
            let label = escape(&format!("{} {}", edge.kind, events.join(",")));
            match edge.kind {
                EdgeKind::Tau => writeln!(
                    dot,
                    "{} -> {} [label=\"{}\", style={}];",
                    source.index(),
                    edge.target.index(),
                    label.trim_end(),
                    config.observable_edge_style
                )?,
                EdgeKind::Neg => writeln!(
                    dot,
                    "{} -> {} [label=\"{}\", color={}];",
                    source.index(),
                    edge.target.index(),
                    label.trim_end(),
                    config.neg_edge_color
                )?,
            }
        }

        writeln!(dot, "}}")?;
        Ok(dot)
    }
}

impl ToDot for Diagnoser {
    fn to_dot_with_config(&self, config: &DotConfig) -> Result<String, std::fmt::Error> {
        let mut dot = String::new();
        writeln!(dot, "digraph {{")?;
        writeln!(dot, "label=\"{}\";", escape(self.name()))?;
        writeln!(dot, "node [shape={}];", config.state_shape)?;

        for state in self.states() {
            writeln!(dot, "{} [label=\"{}\"];", state.index(), self.diagnosis(state))?;
        }
        writeln!(dot, "init [shape=point];")?;
        writeln!(dot, "init -> {};", self.init_state().index())?;

        for state in self.states() {
            for (event, target) in self.transitions_from(state) {
                writeln!(
                    dot,
                    "{} -> {} [label=\"{}\"];",
                    state.index(),
                    target.index(),
                    escape(event.name())
                )?;
            }
        }

        writeln!(dot, "}}")?;
        Ok(dot)
    }
}
