//! On-the-fly construction of the co-diagnosability verifier.
//!
//! The verifier explores the synchronous product of the plant, a global copy of
//! the specification, and one private copy of the specification per site. A
//! private copy only synchronises with the plant on events its site observes,
//! so it may follow any trace that looks the same to that site. The label of a
//! composite state becomes [`Label::Confused`] once the plant has left the
//! specification without any site noticing.
//!
//! # Transition rules
//!
//! For a composite state and an event `e` of the plant, the successors are:
//!
//! 1. **Local specification move.** Every site that does not observe `e` may
//!    advance its private copy alone. Label unchanged, edge `Tau`.
//! 2. **Unobservable plant move.** The plant advances. A normal state follows
//!    with the global specification, or becomes confused (edge `Neg`). In a
//!    confused state the global specification is frozen and the edge is `Neg`
//!    whenever the plant state changes.
//! 3. **Observable joint move.** Plant and global specification advance
//!    together, and so does the private copy of every site observing `e`. If
//!    any of those copies cannot follow, that site detects the deviation and
//!    the branch is dropped. Edge `Neg` iff the result is confused.
//! 4. **Blind sites.** During the joint move, sites not observing `e` keep
//!    their private state.
//! 5. **Blocking.** A confused state whose plant state is a dead end is
//!    connected to [`NodeId::BLOCKING`].
//!
//! Each rule is a separate method of [`VerifierBuilder`], so it can be tested
//! on a single composite state.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, trace};
use num_bigint::BigUint;

use crate::alphabet::Alphabet;
use crate::composite::{CompositeState, Label};
use crate::error::{CodiagError, Result};
use crate::generator::Generator;
use crate::graph::{EdgeKind, VerifierGraph};
use crate::types::{Event, NodeId, StateId};

/// A cooperative cancellation flag, shared between the caller and a running exploration.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// A fresh token, not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Every clone of this token observes it.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether [`cancel`][Self::cancel] was called on this token or one of its clones.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Resource limits of one exploration.
#[derive(Debug, Clone, Default)]
pub struct ExploreOptions {
    /// Maximum number of composite states to intern (`None`: unbounded).
    pub max_states: Option<usize>,
    /// Polled once per expanded state.
    pub cancellation: Option<CancellationToken>,
}

impl ExploreOptions {
    /// Stop after interning `max_states` composite states.
    pub fn with_max_states(mut self, max_states: usize) -> Self {
        self.max_states = Some(max_states);
        self
    }

    /// Stop as soon as `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation.as_ref().is_some_and(|t| t.is_cancelled())
    }
}

/// Callbacks invoked while the verifier graph is being built.
pub trait ExplorationObserver {
    fn on_expand(&mut self, _node: NodeId, _state: &CompositeState) {}
    fn on_edge(&mut self, _from: NodeId, _to: NodeId, _kind: EdgeKind, _event: &Event) {}
    fn on_blocking(&mut self, _node: NodeId) {}
    fn on_finish(&mut self, _graph: &VerifierGraph) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ExplorationObserver for NoopObserver {}

/// Observer that forwards every step to the `log` facade at `trace` level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl ExplorationObserver for LogObserver {
    fn on_expand(&mut self, node: NodeId, state: &CompositeState) {
        trace!("expand {} = {}", node, state);
    }
    fn on_edge(&mut self, from: NodeId, to: NodeId, kind: EdgeKind, event: &Event) {
        trace!("edge {} --{}/{}--> {}", from, event, kind, to);
    }
    fn on_blocking(&mut self, node: NodeId) {
        trace!("blocking state reachable from {}", node);
    }
    fn on_finish(&mut self, graph: &VerifierGraph) {
        trace!("finished: {} states, {} edges", graph.num_states(), graph.num_edges());
    }
}

/// Result of an exploration: a finished graph, or an abort before completion.
#[derive(Debug, Clone)]
pub enum Exploration {
    Complete(VerifierGraph),
    Aborted { explored: usize },
}

/// A successor produced by one transition rule.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Branch {
    pub state: CompositeState,
    pub kind: EdgeKind,
}

/// The transition structure explored by [`explore`].
pub trait TransitionRules {
    fn initial(&self) -> CompositeState;
    /// Events tried at every state, in order.
    fn events(&self) -> &Alphabet;
    fn successors(&self, state: &CompositeState, event: &Event) -> Vec<Branch>;
    fn is_blocking(&self, state: &CompositeState) -> bool;
}

/// Worklist exploration shared by every verifier construction.
///
/// Each composite state is expanded once. Successors are interned by value, so
/// states reached along different paths share a node.
pub fn explore<R, O>(rules: &R, options: &ExploreOptions, observer: &mut O) -> Exploration
where
    R: TransitionRules + ?Sized,
    O: ExplorationObserver + ?Sized,
{
    let mut graph = VerifierGraph::new(rules.initial());
    let mut waiting = vec![graph.initial()];
    let mut done = HashSet::new();

    while let Some(node) = waiting.pop() {
        if options.is_cancelled() {
            debug!("exploration cancelled after {} states", done.len());
            return Exploration::Aborted { explored: done.len() };
        }
        if !done.insert(node) {
            continue;
        }
        let state = match graph.state(node) {
            Some(state) => state.clone(),
            None => continue,
        };
        observer.on_expand(node, &state);

        for event in rules.events() {
            for branch in rules.successors(&state, event) {
                let (target, new) = graph.intern(branch.state);
                if new {
                    if options.max_states.is_some_and(|max| graph.num_states() > max) {
                        debug!("exploration budget of {} states exhausted", graph.num_states() - 1);
                        return Exploration::Aborted { explored: done.len() };
                    }
                    waiting.push(target);
                }
                graph.add_edge(node, target, branch.kind, Some(event));
                observer.on_edge(node, target, branch.kind, event);
            }
        }

        if rules.is_blocking(&state) {
            debug!("blocking state reachable from {} = {}", node, state);
            graph.connect_blocking(node);
            observer.on_blocking(node);
        }
    }

    observer.on_finish(&graph);
    Exploration::Complete(graph)
}

/// Whether a site takes part in an event.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Participation {
    /// The event is observable and in the site's local alphabet.
    Observing,
    /// The site cannot see the event.
    Blind,
}

/// Check the inputs of a co-diagnosability run.
pub(crate) fn validate_alphabets(plant: &Generator, alphabets: &[Alphabet]) -> Result<()> {
    if alphabets.is_empty() {
        return Err(CodiagError::NoSites);
    }
    for (site, alphabet) in alphabets.iter().enumerate() {
        let unknown = alphabet.difference(plant.alphabet());
        if !unknown.is_empty() {
            return Err(CodiagError::AlphabetNotInPlant { site, events: unknown });
        }
    }
    Ok(())
}

pub struct VerifierBuilder<'a> {
    plant: &'a Generator,
    spec: &'a Generator,
    alphabets: &'a [Alphabet],
    plant_init: StateId,
    spec_init: StateId,
}

impl<'a> VerifierBuilder<'a> {
    /// Validate the configuration and prepare a builder.
    pub fn new(plant: &'a Generator, spec: &'a Generator, alphabets: &'a [Alphabet]) -> Result<Self> {
        validate_alphabets(plant, alphabets)?;
        let plant_init = plant.require_init_state()?;
        let spec_init = spec.require_init_state()?;
        Ok(Self {
            plant,
            spec,
            alphabets,
            plant_init,
            spec_init,
        })
    }

    pub fn sites(&self) -> usize {
        self.alphabets.len()
    }

    pub fn participation(&self, site: usize, event: &Event) -> Participation {
        if self.plant.is_observable(event) && self.alphabets[site].contains(event) {
            Participation::Observing
        } else {
            Participation::Blind
        }
    }

    /// Upper bound on the number of composite states: `|P| * |K| * |K|^N * 2`.
    pub fn state_space_bound(&self) -> BigUint {
        let plant = BigUint::from(self.plant.num_states());
        let spec = BigUint::from(self.spec.num_states());
        plant * spec.pow(self.sites() as u32 + 1) * 2u32
    }

    /// Rule 1: private specification copies of blind sites move alone.
    pub fn local_spec_moves(&self, state: &CompositeState, event: &Event) -> Vec<Branch> {
        (0..self.sites())
            .filter(|&site| self.participation(site, event) == Participation::Blind)
            .filter_map(|site| {
                let local = self.spec.successor(state.local_specs[site], event)?;
                Some(Branch {
                    state: state.with_local_spec(site, local),
                    kind: EdgeKind::Tau,
                })
            })
            .collect()
    }

    /// Rule 2: the plant moves on an unobservable event.
    pub fn unobservable_plant_move(&self, state: &CompositeState, event: &Event) -> Option<Branch> {
        let plant = self.plant.successor(state.plant, event)?;
        let mut next = state.clone();
        next.plant = plant;
        let kind = match state.label {
            Label::Normal => match self.spec.successor(state.spec, event) {
                Some(spec) => {
                    next.spec = spec;
                    EdgeKind::Tau
                }
                None => {
                    next.label = Label::Confused;
                    EdgeKind::Neg
                }
            },
            // A plant self-loop does not extend the confused behaviour.
            Label::Confused if plant == state.plant => EdgeKind::Tau,
            Label::Confused => EdgeKind::Neg,
        };
        Some(Branch { state: next, kind })
    }

    /// Rules 3 and 4: the plant moves on an observable event, observing sites follow.
    pub fn observable_joint_move(&self, state: &CompositeState, event: &Event) -> Option<Branch> {
        let plant = self.plant.successor(state.plant, event)?;
        let mut next = state.clone();
        next.plant = plant;
        if state.label == Label::Normal {
            match self.spec.successor(state.spec, event) {
                Some(spec) => next.spec = spec,
                None => next.label = Label::Confused,
            }
        }
        for site in 0..self.sites() {
            match self.participation(site, event) {
                // A copy that cannot follow means the site detects the deviation here.
                Participation::Observing => {
                    next.local_specs[site] = self.spec.successor(state.local_specs[site], event)?;
                }
                Participation::Blind => {}
            }
        }
        let kind = if next.is_confused() { EdgeKind::Neg } else { EdgeKind::Tau };
        Some(Branch { state: next, kind })
    }

    /// Rule 5: a confused state whose plant has no move at all.
    pub fn is_confused_deadlock(&self, state: &CompositeState) -> bool {
        state.is_confused() && self.plant.is_dead_end(state.plant)
    }

    /// Build the complete verifier graph with the given limits.
    pub fn explore<O>(&self, options: &ExploreOptions, observer: &mut O) -> Exploration
    where
        O: ExplorationObserver + ?Sized,
    {
        debug!(
            "verifier: plant '{}' ({} states), spec '{}' ({} states), {} sites, bound {}",
            self.plant.name(),
            self.plant.num_states(),
            self.spec.name(),
            self.spec.num_states(),
            self.sites(),
            self.state_space_bound()
        );
        let exploration = explore(self, options, observer);
        if let Exploration::Complete(graph) = &exploration {
            debug!(
                "verifier: {} states, {} edges, blocking reachable: {}",
                graph.num_states(),
                graph.num_edges(),
                graph.is_blocking_reachable()
            );
        }
        exploration
    }

    /// Build the complete verifier graph without limits.
    pub fn build(&self) -> VerifierGraph {
        match self.explore(&ExploreOptions::default(), &mut NoopObserver) {
            Exploration::Complete(graph) => graph,
            Exploration::Aborted { .. } => unreachable!("Unbounded exploration cannot abort"),
        }
    }
}

impl TransitionRules for VerifierBuilder<'_> {
    fn initial(&self) -> CompositeState {
        CompositeState::initial(self.sites(), self.plant_init, self.spec_init)
    }

    fn events(&self) -> &Alphabet {
        self.plant.alphabet()
    }

    fn successors(&self, state: &CompositeState, event: &Event) -> Vec<Branch> {
        let mut branches = self.local_spec_moves(state, event);
        let plant_move = match self.plant.is_observable(event) {
            false => self.unobservable_plant_move(state, event),
            true => self.observable_joint_move(state, event),
        };
        branches.extend(plant_move);
        branches
    }

    fn is_blocking(&self, state: &CompositeState) -> bool {
        self.is_confused_deadlock(state)
    }
}
