//! Classical (single-site) language diagnosability.
//!
//! The verifier tracks one copy of the specification that follows what the
//! diagnoser sees (`spec1`) and one that follows the plant itself (`spec2`).
//! It reuses the composite-state layout of the co-diagnosability verifier with
//! a single local copy: `local_specs[0]` is `spec1`, `spec` is `spec2`.

use log::debug;

use crate::alphabet::Alphabet;
use crate::composite::{CompositeState, Label};
use crate::decision::{decide, Verdict};
use crate::error::{CodiagError, Result};
use crate::generator::Generator;
use crate::graph::EdgeKind;
use crate::types::{Event, StateId};
use crate::verifier::{explore, Branch, Exploration, ExploreOptions, NoopObserver, TransitionRules};

pub struct ClassicalVerifier<'a> {
    plant: &'a Generator,
    spec: &'a Generator,
    plant_init: StateId,
    spec_init: StateId,
}

impl<'a> ClassicalVerifier<'a> {
    pub fn new(plant: &'a Generator, spec: &'a Generator) -> Result<Self> {
        Ok(Self {
            plant,
            spec,
            plant_init: plant.require_init_state()?,
            spec_init: spec.require_init_state()?,
        })
    }

    fn observer_spec(state: &CompositeState) -> StateId {
        state.local_specs[0]
    }

    /// Unobservable event: either the observer copy moves alone, or the plant moves.
    fn unobservable(&self, state: &CompositeState, event: &Event) -> Vec<Branch> {
        let mut branches = Vec::new();
        if let Some(spec1) = self.spec.successor(Self::observer_spec(state), event) {
            branches.push(Branch {
                state: state.with_local_spec(0, spec1),
                kind: EdgeKind::Tau,
            });
        }
        if let Some(plant) = self.plant.successor(state.plant, event) {
            let mut next = state.clone();
            next.plant = plant;
            let kind = match (state.label, self.spec.successor(state.spec, event)) {
                (Label::Normal, Some(spec2)) => {
                    next.spec = spec2;
                    EdgeKind::Tau
                }
                (Label::Normal, None) => {
                    next.label = Label::Confused;
                    EdgeKind::Neg
                }
                (Label::Confused, _) if plant == state.plant => EdgeKind::Tau,
                (Label::Confused, _) => EdgeKind::Neg,
            };
            branches.push(Branch { state: next, kind });
        }
        branches
    }

    /// Observable event: the observer copy and the plant move together.
    fn observable(&self, state: &CompositeState, event: &Event) -> Option<Branch> {
        let spec1 = self.spec.successor(Self::observer_spec(state), event)?;
        let plant = self.plant.successor(state.plant, event)?;
        let mut next = state.with_local_spec(0, spec1);
        next.plant = plant;
        let spec2 = match state.label {
            Label::Normal => self.spec.successor(state.spec, event),
            Label::Confused => None,
        };
        let kind = match spec2 {
            Some(spec2) => {
                next.spec = spec2;
                EdgeKind::Tau
            }
            None => {
                next.label = Label::Confused;
                EdgeKind::Neg
            }
        };
        Some(Branch { state: next, kind })
    }
}

impl TransitionRules for ClassicalVerifier<'_> {
    fn initial(&self) -> CompositeState {
        CompositeState::initial(1, self.plant_init, self.spec_init)
    }

    fn events(&self) -> &Alphabet {
        self.plant.alphabet()
    }

    fn successors(&self, state: &CompositeState, event: &Event) -> Vec<Branch> {
        if self.plant.is_observable(event) {
            self.observable(state, event).into_iter().collect()
        } else {
            self.unobservable(state, event)
        }
    }

    fn is_blocking(&self, state: &CompositeState) -> bool {
        state.is_confused() && self.plant.is_dead_end(state.plant)
    }
}

/// Decide whether the violations of `spec` by `plant` are diagnosable from the
/// plant's observable events alone.
pub fn is_language_diagnosable(plant: &Generator, spec: &Generator) -> Result<bool> {
    let verifier = ClassicalVerifier::new(plant, spec)?;
    let verdict = match explore(&verifier, &ExploreOptions::default(), &mut NoopObserver) {
        Exploration::Complete(graph) => {
            debug!(
                "classical verifier: {} states, {} edges",
                graph.num_states(),
                graph.num_edges()
            );
            decide(&graph)
        }
        Exploration::Aborted { explored } => return Err(CodiagError::Undetermined { explored }),
    };
    debug!("'{}' w.r.t. '{}': {}", plant.name(), spec.name(), verdict);
    Ok(verdict == Verdict::Codiagnosable)
}
