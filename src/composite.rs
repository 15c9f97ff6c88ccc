//! Composite states of the verifier automaton.
//!
//! A [`CompositeState`] bundles the plant state, the state of the global copy
//! of the specification, one private copy of the specification per site, and a
//! [`Label`] telling whether an undetected deviation has happened. It is a plain
//! value: equality, ordering and hashing are structural, which is what the
//! canonical node table relies on.

use std::fmt;

use crate::types::StateId;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Label {
    Normal,
    Confused,
}

impl Label {
    pub fn is_confused(self) -> bool {
        self == Label::Confused
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Normal => write!(f, "N"),
            Label::Confused => write!(f, "C"),
        }
    }
}

/// `(local specs, global spec, plant, label)`.
///
/// Field order matters: the derived `Ord` compares the local-spec vector
/// element-wise first, then the global spec, the plant, and the label.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct CompositeState {
    pub local_specs: Vec<StateId>,
    pub spec: StateId,
    pub plant: StateId,
    pub label: Label,
}

impl CompositeState {
    /// Initial composite state for `sites` observation sites.
    pub fn initial(sites: usize, plant: StateId, spec: StateId) -> Self {
        assert!(sites > 0, "At least one site is required");
        Self {
            local_specs: vec![spec; sites],
            spec,
            plant,
            label: Label::Normal,
        }
    }

    pub fn sites(&self) -> usize {
        self.local_specs.len()
    }

    pub fn is_confused(&self) -> bool {
        self.label.is_confused()
    }

    /// Copy with the local specification of `site` moved to `state`.
    pub fn with_local_spec(&self, site: usize, state: StateId) -> Self {
        let mut next = self.clone();
        next.local_specs[site] = state;
        next
    }
}

impl fmt::Display for CompositeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for local in &self.local_specs {
            write!(f, "{} ", local)?;
        }
        write!(f, "| {} | {} | {})", self.spec, self.plant, self.label)
    }
}
