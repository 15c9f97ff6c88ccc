//! Ordered sets of events.
//!
//! An [`Alphabet`] is used for the event set of an automaton, its observable
//! mask, and the local alphabet of each observation site. Iteration is always
//! in ascending event order, which keeps every algorithm of this crate
//! deterministic.

use std::collections::BTreeSet;
use std::fmt;

use crate::types::Event;

#[derive(Debug, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Alphabet {
    events: BTreeSet<Event>,
}

impl Alphabet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an alphabet from event names.
    pub fn from_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        names.into_iter().map(Event::new).collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn contains(&self, event: &Event) -> bool {
        self.events.contains(event)
    }

    /// Insert an event. Returns `true` if it was not present.
    pub fn insert(&mut self, event: Event) -> bool {
        self.events.insert(event)
    }

    pub fn remove(&mut self, event: &Event) -> bool {
        self.events.remove(event)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    pub fn is_subset(&self, other: &Alphabet) -> bool {
        self.events.is_subset(&other.events)
    }

    pub fn is_disjoint(&self, other: &Alphabet) -> bool {
        self.events.is_disjoint(&other.events)
    }

    pub fn union(&self, other: &Alphabet) -> Alphabet {
        self.events.union(&other.events).cloned().collect()
    }

    pub fn intersection(&self, other: &Alphabet) -> Alphabet {
        self.events.intersection(&other.events).cloned().collect()
    }

    pub fn difference(&self, other: &Alphabet) -> Alphabet {
        self.events.difference(&other.events).cloned().collect()
    }
}

impl FromIterator<Event> for Alphabet {
    fn from_iter<I: IntoIterator<Item = Event>>(iter: I) -> Self {
        Self {
            events: iter.into_iter().collect(),
        }
    }
}

impl Extend<Event> for Alphabet {
    fn extend<I: IntoIterator<Item = Event>>(&mut self, iter: I) {
        self.events.extend(iter)
    }
}

impl<'a> IntoIterator for &'a Alphabet {
    type Item = &'a Event;
    type IntoIter = std::collections::btree_set::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, event) in self.events.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", event)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_operations() {
        let ab = Alphabet::from_names(["a", "b"]);
        let bc = Alphabet::from_names(["b", "c"]);

        assert_eq!(ab.union(&bc), Alphabet::from_names(["a", "b", "c"]));
        assert_eq!(ab.intersection(&bc), Alphabet::from_names(["b"]));
        assert_eq!(ab.difference(&bc), Alphabet::from_names(["a"]));
        assert!(!ab.is_disjoint(&bc));
        assert!(Alphabet::from_names(["b"]).is_subset(&ab));
        assert!(!bc.is_subset(&ab));
    }

    #[test]
    fn test_display_is_ordered() {
        let alphabet = Alphabet::from_names(["gamma", "alpha", "beta"]);
        assert_eq!(alphabet.to_string(), "{alpha, beta, gamma}");
        assert_eq!(Alphabet::new().to_string(), "{}");
    }

    #[test]
    fn test_insert_remove() {
        let mut alphabet = Alphabet::new();
        assert!(alphabet.insert(Event::new("a")));
        assert!(!alphabet.insert(Event::new("a")));
        assert_eq!(alphabet.len(), 1);
        assert!(alphabet.remove(&Event::new("a")));
        assert!(alphabet.is_empty());
    }
}
