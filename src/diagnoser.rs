//! Single-site diagnosers.
//!
//! A [`Diagnoser`] is a deterministic automaton over the observable events of
//! one site. Each of its states holds the set of hypotheses `(plant state,
//! spec state)` consistent with what the site has observed so far, where the
//! spec component becomes [`SpecState::Violated`] once the plant left the
//! specification. Hypothesis sets are interned by value, so equal knowledge
//! maps to the same diagnoser state.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use log::debug;

use crate::alphabet::Alphabet;
use crate::error::Result;
use crate::generator::Generator;
use crate::table::Table;
use crate::types::{Event, StateId};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum SpecState {
    Tracking(StateId),
    /// Absorbing: the plant already left the specification.
    Violated,
}

impl fmt::Display for SpecState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecState::Tracking(state) => write!(f, "{}", state),
            SpecState::Violated => write!(f, "F"),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Hypothesis {
    pub plant: StateId,
    pub spec: SpecState,
}

impl Hypothesis {
    pub fn is_violated(&self) -> bool {
        self.spec == SpecState::Violated
    }
}

/// Classification of a diagnoser state.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Diagnosis {
    /// No hypothesis has left the specification.
    Normal,
    /// Every hypothesis has left the specification.
    Faulty,
    Uncertain,
}

impl fmt::Display for Diagnosis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnosis::Normal => write!(f, "N"),
            Diagnosis::Faulty => write!(f, "F"),
            Diagnosis::Uncertain => write!(f, "U"),
        }
    }
}

pub type HypothesisSet = BTreeSet<Hypothesis>;

#[derive(Debug, Clone)]
pub struct Diagnoser {
    name: String,
    alphabet: Alphabet,
    /// Diagnoser state `StateId(i)` lives at table index `i + 1`.
    states: Table<HypothesisSet>,
    delta: Vec<BTreeMap<Event, StateId>>,
    init: StateId,
}

impl Diagnoser {
    fn new(name: &str, alphabet: Alphabet, init: HypothesisSet) -> Self {
        let mut diagnoser = Self {
            name: name.to_string(),
            alphabet,
            states: Table::default(),
            delta: Vec::new(),
            init: StateId::new(0),
        };
        let (init, _) = diagnoser.intern(init);
        diagnoser.init = init;
        diagnoser
    }

    fn intern(&mut self, hypotheses: HypothesisSet) -> (StateId, bool) {
        let (index, new) = self.states.put(hypotheses);
        if new {
            self.delta.push(BTreeMap::new());
        }
        (StateId::new(index - 1), new)
    }

    pub fn name(&self) -> &str {
        &self.name
    }
    /// Events this diagnoser reacts to.
    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }
    pub fn init_state(&self) -> StateId {
        self.init
    }
    pub fn num_states(&self) -> usize {
        self.states.len()
    }
    pub fn num_transitions(&self) -> usize {
        self.delta.iter().map(|d| d.len()).sum()
    }
    pub fn states(&self) -> impl Iterator<Item = StateId> {
        (0..self.states.len()).map(StateId::new)
    }

    pub fn hypotheses(&self, state: StateId) -> &HypothesisSet {
        &self.states[state.index() + 1]
    }

    pub fn diagnosis(&self, state: StateId) -> Diagnosis {
        let hypotheses = self.hypotheses(state);
        if hypotheses.iter().all(|h| h.is_violated()) {
            Diagnosis::Faulty
        } else if hypotheses.iter().any(|h| h.is_violated()) {
            Diagnosis::Uncertain
        } else {
            Diagnosis::Normal
        }
    }

    pub fn successor(&self, state: StateId, event: &Event) -> Option<StateId> {
        self.delta[state.index()].get(event).copied()
    }

    pub fn transitions_from(&self, state: StateId) -> impl Iterator<Item = (&Event, StateId)> {
        self.delta[state.index()].iter().map(|(e, &x)| (e, x))
    }

    /// Replay an observed trace from the initial state.
    ///
    /// Events outside the diagnoser's alphabet are invisible to it and skipped.
    /// Returns `None` if the trace cannot be produced by the plant.
    pub fn diagnose<'e, I>(&self, trace: I) -> Option<Diagnosis>
    where
        I: IntoIterator<Item = &'e Event>,
    {
        let mut state = self.init;
        for event in trace {
            if self.alphabet.contains(event) {
                state = self.successor(state, event)?;
            }
        }
        Some(self.diagnosis(state))
    }
}

impl fmt::Display for Diagnoser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "diagnoser '{}' over {}", self.name, self.alphabet)?;
        for state in self.states() {
            write!(f, "  {} [{}] {{", state, self.diagnosis(state))?;
            for (i, h) in self.hypotheses(state).iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}:{}", h.plant, h.spec)?;
            }
            writeln!(f, "}}")?;
            for (event, target) in self.transitions_from(state) {
                writeln!(f, "    --{}--> {}", event, target)?;
            }
        }
        Ok(())
    }
}

/// Builds a diagnoser for one plant/specification pair.
pub trait DiagnoserSynthesis {
    fn synthesize(&self, plant: &Generator, spec: &Generator) -> Result<Diagnoser>;
}

/// Diagnoser synthesis tracking the plant language against the specification.
///
/// The diagnoser observes the plant's observable events. A plant event the
/// specification cannot follow marks the hypothesis as violated.
#[derive(Debug, Default, Clone, Copy)]
pub struct LanguageDiagnoserSynthesis;

impl LanguageDiagnoserSynthesis {
    fn advance(plant: &Generator, spec: &Generator, h: Hypothesis, event: &Event) -> Option<Hypothesis> {
        let next_plant = plant.successor(h.plant, event)?;
        let next_spec = match h.spec {
            SpecState::Tracking(k) => match spec.successor(k, event) {
                Some(k) => SpecState::Tracking(k),
                None => SpecState::Violated,
            },
            SpecState::Violated => SpecState::Violated,
        };
        Some(Hypothesis {
            plant: next_plant,
            spec: next_spec,
        })
    }

    /// Close a hypothesis set over unobservable plant moves.
    fn unobservable_closure(plant: &Generator, spec: &Generator, hypotheses: &HypothesisSet) -> HypothesisSet {
        let mut closure = hypotheses.clone();
        let mut stack: Vec<Hypothesis> = hypotheses.iter().copied().collect();
        while let Some(h) = stack.pop() {
            for (event, _) in plant.transitions_from(h.plant) {
                if plant.is_observable(event) {
                    continue;
                }
                if let Some(next) = Self::advance(plant, spec, h, event) {
                    if closure.insert(next) {
                        stack.push(next);
                    }
                }
            }
        }
        closure
    }

    /// The hypotheses after observing `event`, empty if it cannot happen.
    pub fn step(plant: &Generator, spec: &Generator, hypotheses: &HypothesisSet, event: &Event) -> HypothesisSet {
        Self::unobservable_closure(plant, spec, hypotheses)
            .into_iter()
            .filter_map(|h| Self::advance(plant, spec, h, event))
            .collect()
    }
}

impl DiagnoserSynthesis for LanguageDiagnoserSynthesis {
    fn synthesize(&self, plant: &Generator, spec: &Generator) -> Result<Diagnoser> {
        let init = HypothesisSet::from([Hypothesis {
            plant: plant.require_init_state()?,
            spec: SpecState::Tracking(spec.require_init_state()?),
        }]);
        let alphabet = plant.observable_events().clone();
        let mut diagnoser = Diagnoser::new(plant.name(), alphabet.clone(), init);

        let mut waiting = vec![diagnoser.init_state()];
        while let Some(state) = waiting.pop() {
            let current = diagnoser.hypotheses(state).clone();
            for event in &alphabet {
                let next = Self::step(plant, spec, &current, event);
                if next.is_empty() {
                    continue;
                }
                let (target, new) = diagnoser.intern(next);
                if new {
                    waiting.push(target);
                }
                diagnoser.delta[state.index()].insert(event.clone(), target);
            }
        }

        debug!(
            "diagnoser for '{}' w.r.t. '{}': {} states, {} transitions",
            plant.name(),
            spec.name(),
            diagnoser.num_states(),
            diagnoser.num_transitions()
        );
        Ok(diagnoser)
    }
}
