//! Deterministic finite automata over named events.
//!
//! A [`Generator`] models both the plant (the possibly faulty system) and the
//! specification. Each generator carries an observable-event mask; only the
//! plant's mask matters for the co-diagnosability test, while diagnoser
//! synthesis reads the mask of whatever view of the plant it is handed.
//!
//! # Examples
//!
//! ```
//! use codiag_rs::alphabet::Alphabet;
//! use codiag_rs::generator::Generator;
//!
//! let mut g = Generator::new("machine");
//! g.add_named_transition("idle", "start", "busy").unwrap();
//! g.add_named_transition("busy", "stop", "idle").unwrap();
//! g.set_init_state_by_name("idle");
//! g.set_observable(&Alphabet::from_names(["start", "stop"]));
//!
//! let idle = g.init_state().unwrap();
//! let busy = g.successor(idle, &"start".into()).unwrap();
//! assert_eq!(g.state_name(busy), "busy");
//! ```

use std::collections::{BTreeMap, HashMap};

use crate::alphabet::Alphabet;
use crate::error::{CodiagError, Result};
use crate::types::{Event, StateId};

#[derive(Debug, Clone, Default)]
pub struct Generator {
    name: String,
    alphabet: Alphabet,
    observable: Alphabet,
    states: Vec<String>,
    by_name: HashMap<String, StateId>,
    delta: Vec<BTreeMap<Event, StateId>>,
    init: Option<StateId>,
}

impl Generator {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }
    pub fn observable_events(&self) -> &Alphabet {
        &self.observable
    }
    pub fn unobservable_events(&self) -> Alphabet {
        self.alphabet.difference(&self.observable)
    }
    pub fn is_observable(&self, event: &Event) -> bool {
        self.observable.contains(event)
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

    fn check_state(&self, state: StateId) {
        assert!(
            state.index() < self.states.len(),
            "State {} does not exist in '{}'",
            state,
            self.name
        );
    }

    pub fn state_name(&self, state: StateId) -> &str {
        self.check_state(state);
        &self.states[state.index()]
    }

    pub fn state_by_name(&self, name: &str) -> Option<StateId> {
        self.by_name.get(name).copied()
    }

    /// Insert an event into the alphabet. New events are unobservable.
    pub fn insert_event(&mut self, event: impl Into<Event>) -> Event {
        let event = event.into();
        self.alphabet.insert(event.clone());
        event
    }

    pub fn insert_events(&mut self, events: &Alphabet) {
        self.alphabet.extend(events.iter().cloned());
    }

    /// Insert an event into the alphabet and mark it observable.
    pub fn insert_observable_event(&mut self, event: impl Into<Event>) -> Event {
        let event = self.insert_event(event);
        self.observable.insert(event.clone());
        event
    }

    /// Replace the observable mask. Events outside the alphabet are ignored.
    pub fn set_observable(&mut self, events: &Alphabet) {
        self.observable = self.alphabet.intersection(events);
    }

    /// Copy of this generator with a different observable mask.
    pub fn with_observable(&self, events: &Alphabet) -> Generator {
        let mut g = self.clone();
        g.set_observable(events);
        g
    }

    /// Add a fresh state. Name lookup keeps resolving to the first state of that name.
    pub fn add_state(&mut self, name: &str) -> StateId {
        let state = StateId::new(self.states.len());
        self.states.push(name.to_string());
        self.by_name.entry(name.to_string()).or_insert(state);
        self.delta.push(BTreeMap::new());
        state
    }

    /// Insert a new state, or return the existing one with the same name.
    pub fn insert_state(&mut self, name: &str) -> StateId {
        match self.by_name.get(name) {
            Some(&state) => state,
            None => self.add_state(name),
        }
    }

    pub fn init_state(&self) -> Option<StateId> {
        self.init
    }

    pub fn set_init_state(&mut self, state: StateId) {
        self.check_state(state);
        self.init = Some(state);
    }

    pub fn set_init_state_by_name(&mut self, name: &str) {
        let state = self.insert_state(name);
        self.set_init_state(state);
    }

    /// Initial state, or a configuration error naming this automaton.
    pub fn require_init_state(&self) -> Result<StateId> {
        self.init.ok_or_else(|| CodiagError::MissingInitialState {
            automaton: self.name.clone(),
        })
    }

    /// Add the transition `from --event--> to`.
    ///
    /// The event is added to the alphabet if needed. Adding the same
    /// transition twice is a no-op; a second, different successor is an error.
    pub fn set_transition(&mut self, from: StateId, event: impl Into<Event>, to: StateId) -> Result<()> {
        self.check_state(from);
        self.check_state(to);
        let event = self.insert_event(event);
        match self.delta[from.index()].get(&event) {
            Some(&existing) if existing != to => Err(CodiagError::Nondeterministic {
                automaton: self.name.clone(),
                state: self.states[from.index()].clone(),
                event,
            }),
            _ => {
                self.delta[from.index()].insert(event, to);
                Ok(())
            }
        }
    }

    /// Add a transition between named states, creating the states if needed.
    pub fn add_named_transition(&mut self, from: &str, event: &str, to: &str) -> Result<()> {
        let from = self.insert_state(from);
        let to = self.insert_state(to);
        self.set_transition(from, event, to)
    }

    pub fn successor(&self, state: StateId, event: &Event) -> Option<StateId> {
        self.check_state(state);
        self.delta[state.index()].get(event).copied()
    }

    /// Outgoing transitions of `state`, in ascending event order.
    pub fn transitions_from(&self, state: StateId) -> impl Iterator<Item = (&Event, StateId)> {
        self.check_state(state);
        self.delta[state.index()].iter().map(|(e, &x)| (e, x))
    }

    /// Checks if `state` has no outgoing transition at all.
    pub fn is_dead_end(&self, state: StateId) -> bool {
        self.check_state(state);
        self.delta[state.index()].is_empty()
    }
}
