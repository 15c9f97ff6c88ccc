//! Synchronous composition and natural projection of generators.

use std::collections::{BTreeSet, HashMap};

use log::debug;

use crate::alphabet::Alphabet;
use crate::error::Result;
use crate::generator::Generator;
use crate::types::StateId;

/// Reachable synchronous product `g1 || g2`.
///
/// Shared events synchronise, private events interleave. An event is
/// observable in the product if it is observable in either operand.
pub fn parallel(g1: &Generator, g2: &Generator) -> Result<Generator> {
    let init1 = g1.require_init_state()?;
    let init2 = g2.require_init_state()?;
    let shared = g1.alphabet().intersection(g2.alphabet());

    let mut product = Generator::new(&format!("{}||{}", g1.name(), g2.name()));
    product.insert_events(g1.alphabet());
    product.insert_events(g2.alphabet());
    product.set_observable(&g1.observable_events().union(g2.observable_events()));

    let mut index = HashMap::new();
    let mut intern = |product: &mut Generator, waiting: &mut Vec<(StateId, StateId)>, pair: (StateId, StateId)| {
        *index.entry(pair).or_insert_with(|| {
            waiting.push(pair);
            product.add_state(&format!("{}|{}", g1.state_name(pair.0), g2.state_name(pair.1)))
        })
    };

    let events = product.alphabet().clone();
    let mut waiting = Vec::new();
    let init = intern(&mut product, &mut waiting, (init1, init2));
    product.set_init_state(init);

    while let Some((x1, x2)) = waiting.pop() {
        let from = intern(&mut product, &mut waiting, (x1, x2));
        for event in &events {
            let in1 = g1.alphabet().contains(event);
            let in2 = g2.alphabet().contains(event);
            let next = match (in1, in2) {
                _ if shared.contains(event) => g1.successor(x1, event).zip(g2.successor(x2, event)),
                (true, false) => g1.successor(x1, event).map(|y1| (y1, x2)),
                (false, true) => g2.successor(x2, event).map(|y2| (x1, y2)),
                _ => None,
            };
            if let Some(pair) = next {
                let to = intern(&mut product, &mut waiting, pair);
                product.set_transition(from, event.clone(), to)?;
            }
        }
    }

    debug!(
        "parallel '{}': {} states, {} transitions",
        product.name(),
        product.num_states(),
        product.num_transitions()
    );
    Ok(product)
}

/// States reachable from `states` using only events outside `kept`.
fn erased_closure(g: &Generator, kept: &Alphabet, states: BTreeSet<StateId>) -> BTreeSet<StateId> {
    let mut closure = states;
    let mut stack: Vec<StateId> = closure.iter().copied().collect();
    while let Some(x) = stack.pop() {
        for (event, y) in g.transitions_from(x) {
            if !kept.contains(event) && closure.insert(y) {
                stack.push(y);
            }
        }
    }
    closure
}

/// Natural projection of `g` onto `alphabet`, determinized.
///
/// Events outside `alphabet` are erased. Every event of the result is observable.
pub fn project(g: &Generator, alphabet: &Alphabet) -> Result<Generator> {
    let kept = g.alphabet().intersection(alphabet);
    let init = erased_closure(g, &kept, BTreeSet::from([g.require_init_state()?]));

    let mut result = Generator::new(&format!("P({})", g.name()));
    result.insert_events(&kept);
    result.set_observable(&kept);

    let name = |subset: &BTreeSet<StateId>| {
        let names: Vec<&str> = subset.iter().map(|&x| g.state_name(x)).collect();
        format!("{{{}}}", names.join(","))
    };

    let mut index: HashMap<BTreeSet<StateId>, StateId> = HashMap::new();
    let init_state = result.add_state(&name(&init));
    result.set_init_state(init_state);
    index.insert(init.clone(), init_state);
    let mut waiting = vec![init];

    while let Some(subset) = waiting.pop() {
        let from = index[&subset];
        for event in &kept {
            let step: BTreeSet<StateId> = subset.iter().filter_map(|&x| g.successor(x, event)).collect();
            if step.is_empty() {
                continue;
            }
            let next = erased_closure(g, &kept, step);
            let to = match index.get(&next) {
                Some(&to) => to,
                None => {
                    let to = result.add_state(&name(&next));
                    index.insert(next.clone(), to);
                    waiting.push(next);
                    to
                }
            };
            result.set_transition(from, event.clone(), to)?;
        }
    }

    debug!(
        "projection of '{}' onto {}: {} states",
        g.name(),
        kept,
        result.num_states()
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::types::Event;

    fn machine(name: &str, transitions: &[(&str, &str, &str)], observable: &[&str]) -> Generator {
        let mut g = Generator::new(name);
        for &(from, event, to) in transitions {
            g.add_named_transition(from, event, to).unwrap();
        }
        g.set_init_state_by_name(transitions[0].0);
        g.set_observable(&Alphabet::from_names(observable.iter().copied()));
        g
    }

    #[test]
    fn test_parallel_synchronises_shared_events() {
        let g1 = machine("g1", &[("0", "a", "1"), ("1", "s", "0")], &["a"]);
        let g2 = machine("g2", &[("0", "s", "1"), ("1", "b", "0")], &["s"]);
        let p = parallel(&g1, &g2).unwrap();

        assert_eq!(p.alphabet(), &Alphabet::from_names(["a", "b", "s"]));
        assert_eq!(p.observable_events(), &Alphabet::from_names(["a", "s"]));
        let init = p.init_state().unwrap();
        assert_eq!(p.state_name(init), "0|0");
        // `s` is blocked until g1 reaches state 1.
        assert_eq!(p.successor(init, &Event::new("s")), None);
        let x = p.successor(init, &Event::new("a")).unwrap();
        let y = p.successor(x, &Event::new("s")).unwrap();
        assert_eq!(p.state_name(y), "0|1");
        let z = p.successor(y, &Event::new("b")).unwrap();
        assert_eq!(z, init);
        assert_eq!(p.num_states(), 4);
    }

    #[test]
    fn test_parallel_only_reachable_states() {
        let g1 = machine("g1", &[("0", "s", "1")], &[]);
        let g2 = machine("g2", &[("0", "t", "1"), ("5", "s", "6")], &[]);
        let p = parallel(&g1, &g2).unwrap();
        // `s` never fires: g2 cannot do it from its initial part.
        assert_eq!(p.num_states(), 2);
    }

    #[test]
    fn test_parallel_requires_init_state() {
        let g1 = machine("g1", &[("0", "a", "1")], &[]);
        let g2 = Generator::new("g2");
        assert!(parallel(&g1, &g2).is_err());
    }

    #[test]
    fn test_project_erases_and_determinizes() {
        // 0 -u-> 1 -a-> 2, 0 -a-> 3: after projection `a` leads to {2,3}.
        let g = machine("g", &[("0", "u", "1"), ("1", "a", "2"), ("0", "a", "3")], &["a"]);
        let p = project(&g, &Alphabet::from_names(["a", "zzz"])).unwrap();

        assert_eq!(p.alphabet(), &Alphabet::from_names(["a"]));
        assert_eq!(p.observable_events(), p.alphabet());
        let init = p.init_state().unwrap();
        assert_eq!(p.state_name(init), "{0,1}");
        let next = p.successor(init, &Event::new("a")).unwrap();
        assert_eq!(p.state_name(next), "{2,3}");
        assert_eq!(p.num_states(), 2);
    }

    #[test]
    fn test_project_onto_full_alphabet_keeps_language() {
        let g = machine("g", &[("0", "a", "1"), ("1", "b", "0")], &[]);
        let p = project(&g, g.alphabet()).unwrap();
        assert_eq!(p.num_states(), 2);
        assert_eq!(p.num_transitions(), 2);
    }
}
