//! The verifier graph.
//!
//! Nodes are composite states interned in a [`Table`], so the mapping between
//! node ids and [`CompositeState`] values is a bijection by construction. Every
//! edge carries an abstract [`EdgeKind`] used by the decision procedure, plus
//! the real events that produced it (kept for inspection only).
//!
//! Node 0 ([`NodeId::BLOCKING`]) occupies the table's sentinel slot and stands
//! for the absorbing blocking state. It has no composite state and no
//! outgoing edges.

use std::fmt;

use crate::composite::CompositeState;
use crate::table::Table;
use crate::types::{Event, NodeId};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum EdgeKind {
    /// Progress that neither introduces nor extends an unresolved deviation.
    Tau,
    /// A plant step during which an undetected deviation persists.
    Neg,
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeKind::Tau => write!(f, "0"),
            EdgeKind::Neg => write!(f, "-1"),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Edge {
    pub target: NodeId,
    pub kind: EdgeKind,
    /// Events that produced this edge. Empty for the edge into the blocking state.
    pub events: Vec<Event>,
}

#[derive(Debug, Clone)]
pub struct VerifierGraph {
    sites: usize,
    states: Table<CompositeState>,
    /// Outgoing edges, indexed by node id (slot 0 is the blocking node).
    edges: Vec<Vec<Edge>>,
    initial: NodeId,
    blocking_reachable: bool,
}

impl VerifierGraph {
    /// Create a graph holding only the initial composite state.
    pub(crate) fn new(initial: CompositeState) -> Self {
        let mut graph = Self {
            sites: initial.sites(),
            states: Table::default(),
            edges: vec![Vec::new()],
            initial: NodeId::BLOCKING,
            blocking_reachable: false,
        };
        let (node, _) = graph.intern(initial);
        graph.initial = node;
        graph
    }

    /// Look up a composite state by value, allocating a fresh node on a miss.
    ///
    /// Returns the node and `true` if it was freshly allocated.
    pub(crate) fn intern(&mut self, state: CompositeState) -> (NodeId, bool) {
        assert_eq!(
            state.sites(),
            self.sites,
            "Composite state has {} local specifications, expected {}",
            state.sites(),
            self.sites
        );
        let (index, new) = self.states.put(state);
        if new {
            self.edges.push(Vec::new());
        }
        (NodeId::new(index), new)
    }

    /// Add an edge, merging it with an existing edge of the same kind and target.
    pub(crate) fn add_edge(&mut self, from: NodeId, to: NodeId, kind: EdgeKind, event: Option<&Event>) {
        assert!(!from.is_blocking(), "The blocking state has no outgoing edges");
        let edges = &mut self.edges[from.index()];
        let i = match edges.iter().position(|e| e.target == to && e.kind == kind) {
            Some(i) => i,
            None => {
                edges.push(Edge {
                    target: to,
                    kind,
                    events: Vec::new(),
                });
                edges.len() - 1
            }
        };
        let edge = &mut edges[i];
        if let Some(event) = event {
            if !edge.events.contains(event) {
                edge.events.push(event.clone());
            }
        }
    }

    /// Connect a confused deadlock to the blocking state.
    pub(crate) fn connect_blocking(&mut self, from: NodeId) {
        self.add_edge(from, NodeId::BLOCKING, EdgeKind::Tau, None);
        self.blocking_reachable = true;
    }

    pub fn sites(&self) -> usize {
        self.sites
    }
    pub fn initial(&self) -> NodeId {
        self.initial
    }
    pub fn is_blocking_reachable(&self) -> bool {
        self.blocking_reachable
    }

    /// Number of composite states (the blocking node is not counted).
    pub fn num_states(&self) -> usize {
        self.states.len()
    }
    /// Number of node slots, including the blocking node.
    pub fn num_nodes(&self) -> usize {
        self.edges.len()
    }
    pub fn num_edges(&self) -> usize {
        self.edges.iter().map(|e| e.len()).sum()
    }

    /// All node ids, the blocking node first.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> {
        (0..self.edges.len()).map(NodeId::new)
    }

    /// The composite state of a node, `None` for the blocking node.
    pub fn state(&self, node: NodeId) -> Option<&CompositeState> {
        if node.is_blocking() {
            None
        } else {
            Some(&self.states[node.index()])
        }
    }

    /// The node holding a composite state, if it was reached.
    pub fn node_of(&self, state: &CompositeState) -> Option<NodeId> {
        self.states.get(state).map(NodeId::new)
    }

    pub fn edges(&self, node: NodeId) -> &[Edge] {
        &self.edges[node.index()]
    }

    /// Iterate over all edges as `(source, edge)` pairs.
    pub fn all_edges(&self) -> impl Iterator<Item = (NodeId, &Edge)> {
        self.edges
            .iter()
            .enumerate()
            .flat_map(|(i, es)| es.iter().map(move |e| (NodeId::new(i), e)))
    }
}
