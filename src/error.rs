use thiserror::Error;

use crate::alphabet::Alphabet;
use crate::types::Event;

/// Errors reported by the co-diagnosability entry points.
///
/// Configuration errors are detected before any exploration starts.
/// Broken internal invariants are not reported here: they panic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodiagError {
    #[error("At least one observation site is required")]
    NoSites,

    #[error("Local alphabet of site {site} contains events unknown to the plant: {events}")]
    AlphabetNotInPlant { site: usize, events: Alphabet },

    #[error("Automaton '{automaton}' has no initial state")]
    MissingInitialState { automaton: String },

    #[error("Components {first} and {second} share events: {events}")]
    OverlappingComponents {
        first: usize,
        second: usize,
        events: Alphabet,
    },

    #[error("Component {component} has events unknown to the specification: {events}")]
    ComponentNotInSpec { component: usize, events: Alphabet },

    #[error("Automaton '{automaton}' already has a different transition from state '{state}' on '{event}'")]
    Nondeterministic {
        automaton: String,
        state: String,
        event: Event,
    },

    #[error("Exploration budget exhausted after {explored} composite states, verdict undetermined")]
    Undetermined { explored: usize },
}

pub type Result<T, E = CodiagError> = std::result::Result<T, E>;
