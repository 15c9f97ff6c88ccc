//! Per-site diagnosers for decentralized and modular architectures.
//!
//! Both architectures synthesize one diagnoser per site through the same
//! orchestration, [`local_diagnosers`]. They differ only in the [`SiteView`]:
//! what plant and specification each site's diagnoser is built from.

use std::borrow::Cow;

use log::info;

use crate::alphabet::Alphabet;
use crate::compose::{parallel, project};
use crate::decision::is_codiagnosable;
use crate::diagnoser::{Diagnoser, DiagnoserSynthesis, LanguageDiagnoserSynthesis};
use crate::error::{CodiagError, Result};
use crate::generator::Generator;
use crate::verifier::validate_alphabets;

/// Plant and specification as seen by one site.
#[derive(Debug, Clone)]
pub struct SiteModel<'a> {
    pub plant: Cow<'a, Generator>,
    pub spec: Cow<'a, Generator>,
}

pub trait SiteView {
    fn sites(&self) -> usize;
    fn view(&self, site: usize) -> Result<SiteModel<'_>>;
}

/// One monolithic plant, observed by each site through its local alphabet.
#[derive(Debug, Clone, Copy)]
pub struct DecentralizedView<'a> {
    pub plant: &'a Generator,
    pub spec: &'a Generator,
    pub alphabets: &'a [Alphabet],
}

impl SiteView for DecentralizedView<'_> {
    fn sites(&self) -> usize {
        self.alphabets.len()
    }

    /// The plant with its observable events set to exactly the site's local alphabet.
    fn view(&self, site: usize) -> Result<SiteModel<'_>> {
        Ok(SiteModel {
            plant: Cow::Owned(self.plant.with_observable(&self.alphabets[site])),
            spec: Cow::Borrowed(self.spec),
        })
    }
}

/// Event-disjoint component plants, one per site, sharing one specification.
#[derive(Debug, Clone, Copy)]
pub struct ModularView<'a> {
    pub components: &'a [Generator],
    pub spec: &'a Generator,
}

impl<'a> ModularView<'a> {
    /// Check that there is at least one component, that their alphabets are
    /// pairwise disjoint and that the specification knows every component event.
    pub fn new(components: &'a [Generator], spec: &'a Generator) -> Result<Self> {
        if components.is_empty() {
            return Err(CodiagError::NoSites);
        }
        for (first, g1) in components.iter().enumerate() {
            for (second, g2) in components.iter().enumerate().skip(first + 1) {
                let events = g1.alphabet().intersection(g2.alphabet());
                if !events.is_empty() {
                    return Err(CodiagError::OverlappingComponents { first, second, events });
                }
            }
        }
        for (component, g) in components.iter().enumerate() {
            let events = g.alphabet().difference(spec.alphabet());
            if !events.is_empty() {
                return Err(CodiagError::ComponentNotInSpec { component, events });
            }
        }
        Ok(Self { components, spec })
    }
}

impl SiteView for ModularView<'_> {
    fn sites(&self) -> usize {
        self.components.len()
    }

    /// The component itself, and the specification projected onto its alphabet.
    fn view(&self, site: usize) -> Result<SiteModel<'_>> {
        let component = &self.components[site];
        Ok(SiteModel {
            plant: Cow::Borrowed(component),
            spec: Cow::Owned(project(self.spec, component.alphabet())?),
        })
    }
}

/// Synthesize one diagnoser per site of `view`.
pub fn local_diagnosers<V, S>(view: &V, synthesis: &S) -> Result<Vec<Diagnoser>>
where
    V: SiteView + ?Sized,
    S: DiagnoserSynthesis + ?Sized,
{
    (0..view.sites())
        .map(|site| {
            let model = view.view(site)?;
            let diagnoser = synthesis.synthesize(&model.plant, &model.spec)?;
            info!(
                "site {}: diagnoser over {} with {} states",
                site,
                diagnoser.alphabet(),
                diagnoser.num_states()
            );
            Ok(diagnoser)
        })
        .collect()
}

/// Decide co-diagnosability and build one local diagnoser per site.
pub fn decentralized_diagnoser(
    plant: &Generator,
    spec: &Generator,
    alphabets: &[Alphabet],
) -> Result<(bool, Vec<Diagnoser>)> {
    let codiagnosable = is_codiagnosable(plant, spec, alphabets)?;
    let view = DecentralizedView { plant, spec, alphabets };
    let diagnosers = local_diagnosers(&view, &LanguageDiagnoserSynthesis)?;
    Ok((codiagnosable, diagnosers))
}

/// Build one diagnoser per event-disjoint component plant.
pub fn decentralized_modular_diagnoser(components: &[Generator], spec: &Generator) -> Result<Vec<Diagnoser>> {
    let view = ModularView::new(components, spec)?;
    local_diagnosers(&view, &LanguageDiagnoserSynthesis)
}

/// The monolithic plant of a modular system, with the local alphabet of each
/// component: its observable events.
pub fn compose_components(components: &[Generator]) -> Result<(Generator, Vec<Alphabet>)> {
    let (first, rest) = components.split_first().ok_or(CodiagError::NoSites)?;
    let plant = rest
        .iter()
        .try_fold(first.clone(), |plant, component| parallel(&plant, component))?;
    let alphabets: Vec<Alphabet> = components
        .iter()
        .map(|g| plant.observable_events().intersection(g.alphabet()))
        .collect();
    validate_alphabets(&plant, &alphabets)?;
    Ok((plant, alphabets))
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::diagnoser::Diagnosis;
    use crate::types::Event;

    fn fault_then_b() -> (Generator, Generator) {
        let mut plant = Generator::new("plant");
        plant.add_named_transition("p0", "a", "p0").unwrap();
        plant.add_named_transition("p0", "f", "p1").unwrap();
        plant.add_named_transition("p1", "b", "p1").unwrap();
        plant.set_init_state_by_name("p0");
        plant.set_observable(&Alphabet::from_names(["a", "b"]));

        let mut spec = Generator::new("spec");
        spec.add_named_transition("s0", "a", "s0").unwrap();
        spec.insert_event("b");
        spec.set_init_state_by_name("s0");
        (plant, spec)
    }

    #[test]
    fn test_decentralized_view_restricts_observation() {
        let (plant, spec) = fault_then_b();
        let alphabets = [Alphabet::from_names(["a", "f"]), Alphabet::from_names(["b"])];
        let view = DecentralizedView {
            plant: &plant,
            spec: &spec,
            alphabets: &alphabets,
        };
        assert_eq!(view.sites(), 2);
        let model = view.view(0).unwrap();
        // `f` is globally unobservable, but site 0 lists it.
        assert_eq!(model.plant.observable_events(), &Alphabet::from_names(["a", "f"]));
        assert!(matches!(model.spec, Cow::Borrowed(_)));

        let diagnoser = LanguageDiagnoserSynthesis.synthesize(&model.plant, &model.spec).unwrap();
        assert_eq!(diagnoser.diagnose(&[Event::new("f")]), Some(Diagnosis::Faulty));
        assert_eq!(diagnoser.diagnose(&[Event::new("a")]), Some(Diagnosis::Normal));
    }

    #[test]
    fn test_decentralized_diagnoser() {
        let (plant, spec) = fault_then_b();
        let alphabets = [Alphabet::from_names(["a"]), Alphabet::from_names(["b"])];
        let (codiagnosable, diagnosers) = decentralized_diagnoser(&plant, &spec, &alphabets).unwrap();
        assert!(codiagnosable);
        assert_eq!(diagnosers.len(), 2);

        let trace = [Event::new("a"), Event::new("b")];
        // Site 0 never sees `b`, and `a` cannot follow the fault.
        assert_eq!(diagnosers[0].diagnose(&trace), Some(Diagnosis::Normal));
        assert_eq!(diagnosers[1].diagnose(&trace), Some(Diagnosis::Faulty));
    }

    #[test]
    fn test_decentralized_diagnoser_rejects_bad_alphabet() {
        let (plant, spec) = fault_then_b();
        let alphabets = [Alphabet::from_names(["nope"])];
        assert!(matches!(
            decentralized_diagnoser(&plant, &spec, &alphabets),
            Err(CodiagError::AlphabetNotInPlant { site: 0, .. })
        ));
    }

    #[test]
    fn test_modular_view_rejects_overlap() {
        let mut g1 = Generator::new("g1");
        g1.add_named_transition("0", "a", "0").unwrap();
        g1.set_init_state_by_name("0");
        let mut g2 = Generator::new("g2");
        g2.add_named_transition("0", "a", "1").unwrap();
        g2.set_init_state_by_name("0");
        let components = [g1.clone(), g2];
        assert_eq!(
            ModularView::new(&components, &g1).err(),
            Some(CodiagError::OverlappingComponents {
                first: 0,
                second: 1,
                events: Alphabet::from_names(["a"])
            })
        );
        assert_eq!(ModularView::new(&[], &g1).err(), Some(CodiagError::NoSites));
    }

    #[test]
    fn test_modular_view_rejects_events_unknown_to_spec() {
        let mut g1 = Generator::new("g1");
        g1.add_named_transition("0", "a", "0").unwrap();
        g1.set_init_state_by_name("0");
        let mut g2 = Generator::new("g2");
        g2.add_named_transition("0", "b", "0").unwrap();
        g2.add_named_transition("0", "c", "1").unwrap();
        g2.set_init_state_by_name("0");
        let mut spec = Generator::new("spec");
        spec.add_named_transition("s0", "a", "s0").unwrap();
        spec.add_named_transition("s0", "b", "s0").unwrap();
        spec.set_init_state_by_name("s0");

        let components = [g1, g2];
        assert_eq!(
            ModularView::new(&components, &spec).err(),
            Some(CodiagError::ComponentNotInSpec {
                component: 1,
                events: Alphabet::from_names(["c"])
            })
        );
        assert!(matches!(
            decentralized_modular_diagnoser(&components, &spec),
            Err(CodiagError::ComponentNotInSpec { component: 1, .. })
        ));

        spec.insert_event("c");
        assert!(ModularView::new(&components, &spec).is_ok());
    }

    #[test]
    fn test_modular_view_projects_spec() {
        let mut g1 = Generator::new("g1");
        g1.add_named_transition("0", "a", "0").unwrap();
        g1.set_init_state_by_name("0");
        g1.set_observable(&Alphabet::from_names(["a"]));
        let mut g2 = Generator::new("g2");
        g2.add_named_transition("0", "b", "0").unwrap();
        g2.set_init_state_by_name("0");
        let spec = parallel(&g1, &g2).unwrap();

        let components = [g1, g2];
        let view = ModularView::new(&components, &spec).unwrap();
        let model = view.view(0).unwrap();
        assert!(matches!(model.plant, Cow::Borrowed(_)));
        assert_eq!(model.spec.alphabet(), &Alphabet::from_names(["a"]));
    }

    #[test]
    fn test_compose_components() {
        let mut g1 = Generator::new("g1");
        g1.add_named_transition("0", "a", "0").unwrap();
        g1.add_named_transition("0", "u", "0").unwrap();
        g1.set_init_state_by_name("0");
        g1.set_observable(&Alphabet::from_names(["a"]));
        let mut g2 = Generator::new("g2");
        g2.add_named_transition("0", "b", "0").unwrap();
        g2.set_init_state_by_name("0");
        g2.set_observable(&Alphabet::from_names(["b"]));

        let (plant, alphabets) = compose_components(&[g1, g2]).unwrap();
        assert_eq!(plant.num_states(), 1);
        assert_eq!(alphabets, vec![Alphabet::from_names(["a"]), Alphabet::from_names(["b"])]);
        assert_eq!(compose_components(&[]).err(), Some(CodiagError::NoSites));
    }
}
