///! Type-safe identifiers for events, automaton states and verifier nodes.
///!
///! This module provides newtype wrappers that keep the three kinds of
///! identifiers apart, so a plant state can never be passed where a verifier
///! node is expected.
use std::fmt;
use std::sync::Arc;

/// An event label.
///
/// Events are identified by name. Two events with the same name are the same
/// event, no matter which automaton they were created for. Cloning is cheap.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Event(Arc<str>);

impl Event {
    /// Creates an event with the given name.
    ///
    /// # Panics
    ///
    /// Panics if `name` is empty.
    pub fn new(name: &str) -> Self {
        assert!(!name.is_empty(), "Event names must not be empty");
        Event(Arc::from(name))
    }

    /// Returns the name of the event.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Event {
    fn from(name: &str) -> Self {
        Event::new(name)
    }
}

/// A state of a [`Generator`][crate::generator::Generator] (0-indexed).
///
/// State ids are local to the automaton that created them.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct StateId(u32);

impl StateId {
    /// Creates a state id with the given index.
    pub fn new(index: usize) -> Self {
        assert!(index <= u32::MAX as usize, "State index does not fit into u32");
        StateId(index as u32)
    }

    /// Returns the raw index as a `usize`.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

impl From<StateId> for usize {
    fn from(state: StateId) -> Self {
        state.index()
    }
}

/// A node of the [`VerifierGraph`][crate::graph::VerifierGraph].
///
/// # Invariants
///
/// - Node 0 is reserved for the blocking state ([`NodeId::BLOCKING`])
/// - Composite states are numbered from 1 in discovery order
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct NodeId(u32);

impl NodeId {
    /// The distinguished absorbing node reached from confused deadlocks.
    pub const BLOCKING: NodeId = NodeId(0);

    /// Creates a node id with the given index.
    pub fn new(index: usize) -> Self {
        assert!(index <= u32::MAX as usize, "Node index does not fit into u32");
        NodeId(index as u32)
    }

    /// Returns the raw index as a `usize`.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Checks if this is the blocking node.
    pub fn is_blocking(self) -> bool {
        self == NodeId::BLOCKING
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_blocking() {
            write!(f, "BLOCK")
        } else {
            write!(f, "v{}", self.0)
        }
    }
}

impl From<NodeId> for usize {
    fn from(node: NodeId) -> Self {
        node.index()
    }
}
