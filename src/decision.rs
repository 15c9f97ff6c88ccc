//! The co-diagnosability verdict.
//!
//! A system is not co-diagnosable iff its verifier graph reaches the blocking
//! state, or some strongly connected component contains a `Neg` edge whose
//! source and target both lie in the component (a confused cycle).

use std::fmt;

use log::{debug, info};

use crate::alphabet::Alphabet;
use crate::error::{CodiagError, Result};
use crate::generator::Generator;
use crate::graph::{Edge, EdgeKind, VerifierGraph};
use crate::scc::tarjan;
use crate::types::NodeId;
use crate::verifier::{ExplorationObserver, ExploreOptions, Exploration, NoopObserver, VerifierBuilder};

/// Why a system is not co-diagnosable.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Witness {
    /// A confused deadlock reaches the blocking state.
    Blocking { from: NodeId },
    /// A `Neg` edge inside a strongly connected component.
    ConfusedCycle {
        component: Vec<NodeId>,
        source: NodeId,
        edge: Edge,
    },
}

impl fmt::Display for Witness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Witness::Blocking { from } => write!(f, "confused deadlock at {}", from),
            Witness::ConfusedCycle {
                component,
                source,
                edge,
            } => {
                write!(f, "confused cycle through {} --", source)?;
                for (i, e) in edge.events.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", e)?;
                }
                write!(f, "--> {} in a component of {} states", edge.target, component.len())
            }
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Verdict {
    Codiagnosable,
    NotCodiagnosable(Witness),
    /// The exploration was aborted before the graph was complete.
    Undetermined { explored: usize },
}

impl Verdict {
    /// `Some(answer)` for a definitive verdict, `None` when undetermined.
    pub fn is_codiagnosable(&self) -> Option<bool> {
        match self {
            Verdict::Codiagnosable => Some(true),
            Verdict::NotCodiagnosable(_) => Some(false),
            Verdict::Undetermined { .. } => None,
        }
    }

    pub fn witness(&self) -> Option<&Witness> {
        match self {
            Verdict::NotCodiagnosable(witness) => Some(witness),
            _ => None,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Codiagnosable => write!(f, "co-diagnosable"),
            Verdict::NotCodiagnosable(witness) => write!(f, "not co-diagnosable ({})", witness),
            Verdict::Undetermined { explored } => write!(f, "undetermined after {} states", explored),
        }
    }
}

/// Strongly connected components of the verifier graph, over both edge kinds.
pub fn components(graph: &VerifierGraph) -> Vec<Vec<NodeId>> {
    tarjan(graph.num_nodes(), |v| {
        graph
            .edges(NodeId::new(v))
            .iter()
            .map(|e| e.target.index())
            .collect::<Vec<_>>()
    })
    .into_iter()
    .map(|c| c.into_iter().map(NodeId::new).collect())
    .collect()
}

/// Find a `Neg` edge with both ends in the same component.
fn find_confused_cycle(graph: &VerifierGraph, components: &[Vec<NodeId>]) -> Option<Witness> {
    let mut component_of = vec![0; graph.num_nodes()];
    for (c, component) in components.iter().enumerate() {
        for node in component {
            component_of[node.index()] = c;
        }
    }
    graph
        .all_edges()
        .filter(|(_, edge)| edge.kind == EdgeKind::Neg)
        .find(|(source, edge)| component_of[source.index()] == component_of[edge.target.index()])
        .map(|(source, edge)| Witness::ConfusedCycle {
            component: components[component_of[source.index()]].clone(),
            source,
            edge: edge.clone(),
        })
}

/// Decide co-diagnosability on a complete verifier graph. Blocking dominates cycles.
pub fn decide(graph: &VerifierGraph) -> Verdict {
    if graph.is_blocking_reachable() {
        let from = graph
            .all_edges()
            .find(|(_, edge)| edge.target.is_blocking())
            .map(|(source, _)| source)
            .unwrap_or(NodeId::BLOCKING);
        return Verdict::NotCodiagnosable(Witness::Blocking { from });
    }
    let components = components(graph);
    debug!("{} strongly connected components", components.len());
    match find_confused_cycle(graph, &components) {
        Some(witness) => Verdict::NotCodiagnosable(witness),
        None => Verdict::Codiagnosable,
    }
}

/// Summary of one co-diagnosability run, rendered with `Display`.
#[derive(Debug, Clone)]
pub struct CodiagReport {
    pub verdict: Verdict,
    pub graph: Option<VerifierGraph>,
}

impl CodiagReport {
    pub fn is_codiagnosable(&self) -> Option<bool> {
        self.verdict.is_codiagnosable()
    }
}

impl fmt::Display for CodiagReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(graph) = &self.graph {
            writeln!(f, "sites: {}", graph.sites())?;
            writeln!(f, "states: {}", graph.num_states())?;
            writeln!(f, "edges: {}", graph.num_edges())?;
            writeln!(f, "components: {}", components(graph).len())?;
            writeln!(f, "blocking reachable: {}", graph.is_blocking_reachable())?;
        }
        write!(f, "verdict: {}", self.verdict)
    }
}

/// Build the verifier and decide, keeping the graph for inspection.
pub fn analyze<O>(
    plant: &Generator,
    spec: &Generator,
    alphabets: &[Alphabet],
    options: &ExploreOptions,
    observer: &mut O,
) -> Result<CodiagReport>
where
    O: ExplorationObserver + ?Sized,
{
    let builder = VerifierBuilder::new(plant, spec, alphabets)?;
    let report = match builder.explore(options, observer) {
        Exploration::Complete(graph) => CodiagReport {
            verdict: decide(&graph),
            graph: Some(graph),
        },
        Exploration::Aborted { explored } => CodiagReport {
            verdict: Verdict::Undetermined { explored },
            graph: None,
        },
    };
    info!("'{}' w.r.t. '{}': {}", plant.name(), spec.name(), report.verdict);
    Ok(report)
}

/// Decide co-diagnosability within the given limits.
pub fn check_codiagnosability(
    plant: &Generator,
    spec: &Generator,
    alphabets: &[Alphabet],
    options: &ExploreOptions,
) -> Result<Verdict> {
    analyze(plant, spec, alphabets, options, &mut NoopObserver).map(|report| report.verdict)
}

/// Decide co-diagnosability of `plant` with respect to `spec` for the given
/// local alphabets, without resource limits.
pub fn is_codiagnosable(plant: &Generator, spec: &Generator, alphabets: &[Alphabet]) -> Result<bool> {
    match check_codiagnosability(plant, spec, alphabets, &ExploreOptions::default())? {
        Verdict::Undetermined { explored } => Err(CodiagError::Undetermined { explored }),
        verdict => Ok(verdict == Verdict::Codiagnosable),
    }
}
