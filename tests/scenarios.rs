use codiag_rs::alphabet::Alphabet;
use codiag_rs::compose::parallel;
use codiag_rs::decentralized::compose_components;
use codiag_rs::decision::{analyze, Verdict, Witness};
use codiag_rs::diagnoser::Diagnosis;
use codiag_rs::generator::Generator;
use codiag_rs::types::Event;
use codiag_rs::verifier::{ExploreOptions, LogObserver, VerifierBuilder};
use codiag_rs::{
    check_codiagnosability, decentralized_diagnoser, decentralized_modular_diagnoser, is_codiagnosable,
    CodiagError,
};

use test_log::test;

fn generator(name: &str, transitions: &[(&str, &str, &str)], observable: &[&str]) -> Generator {
    let mut g = Generator::new(name);
    for &(from, event, to) in transitions {
        g.add_named_transition(from, event, to).unwrap();
    }
    g.set_init_state_by_name(transitions[0].0);
    g.set_observable(&Alphabet::from_names(observable.iter().copied()));
    g
}

/// A specification with a single state that forbids every event in `forbidden`.
fn forbid(name: &str, forbidden: &[&str]) -> Generator {
    let mut g = Generator::new(name);
    g.insert_state("k");
    for &event in forbidden {
        g.insert_event(event);
    }
    g.set_init_state_by_name("k");
    g
}

fn trace(names: &[&str]) -> Vec<Event> {
    names.iter().map(|&n| Event::new(n)).collect()
}

/// Two sites, the fault is silent and the plant repeats `a` afterwards.
fn silent_fault() -> (Generator, Generator, Vec<Alphabet>) {
    let mut plant = generator("plant", &[("p0", "a", "p0"), ("p0", "f", "p1"), ("p1", "a", "p1")], &["a"]);
    plant.insert_observable_event("b");
    let spec = generator("spec", &[("s0", "a", "s0")], &[]);
    let alphabets = vec![Alphabet::from_names(["a"]), Alphabet::from_names(["b"])];
    (plant, spec, alphabets)
}

/// A sensor `sf` that may fail silently and then only jams, synchronised with a controller `c1`.
fn sensor_and_controller() -> (Generator, Generator) {
    let sensor = generator(
        "sf",
        &[("0", "start", "1"), ("1", "stop", "0"), ("0", "fault", "2"), ("2", "jam", "2")],
        &["start", "stop", "jam"],
    );
    let controller = generator(
        "c1",
        &[("0", "start", "1"), ("1", "ack", "2"), ("2", "stop", "0")],
        &["start", "ack", "stop"],
    );
    (sensor, controller)
}

#[test]
fn test_silent_repeatable_fault_is_not_codiagnosable() {
    let (plant, spec, alphabets) = silent_fault();
    assert_eq!(is_codiagnosable(&plant, &spec, &alphabets), Ok(false));

    let verdict = check_codiagnosability(&plant, &spec, &alphabets, &ExploreOptions::default()).unwrap();
    assert!(matches!(
        verdict,
        Verdict::NotCodiagnosable(Witness::ConfusedCycle { .. })
    ));
}

#[test]
fn test_sensor_with_controller_is_codiagnosable() {
    let (sensor, controller) = sensor_and_controller();
    let (plant, alphabets) = compose_components(&[sensor.clone(), controller.clone()]).unwrap();
    assert_eq!(alphabets[0], Alphabet::from_names(["jam", "start", "stop"]));
    assert_eq!(alphabets[1], Alphabet::from_names(["ack", "start", "stop"]));
    let spec = parallel(&plant, &forbid("K", &["fault"])).unwrap();

    assert_eq!(is_codiagnosable(&plant, &spec, &alphabets), Ok(true));

    let (codiagnosable, diagnosers) = decentralized_diagnoser(&plant, &spec, &alphabets).unwrap();
    assert!(codiagnosable);
    assert_eq!(diagnosers.len(), 2);
    assert_eq!(diagnosers[0].diagnose(&trace(&["start", "ack", "stop"])), Some(Diagnosis::Normal));
    assert_eq!(diagnosers[0].diagnose(&trace(&["start", "stop", "jam"])), Some(Diagnosis::Faulty));
    // The controller site never sees the jam.
    assert_eq!(diagnosers[1].diagnose(&trace(&["start", "ack", "stop"])), Some(Diagnosis::Normal));
}

#[test]
fn test_beta_only_deviation_is_not_codiagnosable() {
    let plant = generator("g", &[("p0", "alpha", "p0"), ("p0", "beta", "p0")], &["alpha"]);
    let spec = generator(
        "k",
        &[("s0", "alpha", "s0"), ("s0", "beta", "s1"), ("s1", "alpha", "s1")],
        &[],
    );
    // `beta` is unobservable, so site 0 listing it gains nothing: no site sees the deviation.
    let alphabets = [Alphabet::from_names(["alpha", "beta"]), Alphabet::from_names(["alpha"])];
    assert_eq!(is_codiagnosable(&plant, &spec, &alphabets), Ok(false));

    // Once `beta` is observable, site 0 catches the second `beta`.
    let mut plant = plant;
    plant.insert_observable_event("beta");
    assert_eq!(is_codiagnosable(&plant, &spec, &alphabets), Ok(true));
    assert_eq!(
        is_codiagnosable(&plant, &spec, &alphabets[1..]),
        Ok(false),
        "site 1 alone never sees `beta`"
    );
}

#[test]
fn test_fault_into_deadlock_is_not_codiagnosable() {
    let plant = generator("plant", &[("p0", "a", "p0"), ("p0", "f", "p1")], &["a"]);
    let spec = generator("spec", &[("s0", "a", "s0")], &[]);
    let alphabets = [Alphabet::from_names(["a"])];

    let verdict = check_codiagnosable_verdict(&plant, &spec, &alphabets);
    assert!(matches!(verdict, Verdict::NotCodiagnosable(Witness::Blocking { .. })));
}

fn check_codiagnosable_verdict(plant: &Generator, spec: &Generator, alphabets: &[Alphabet]) -> Verdict {
    check_codiagnosability(plant, spec, alphabets, &ExploreOptions::default()).unwrap()
}

#[test]
fn test_blocking_dominates_cycles() {
    // One fault leads to a silent loop, another one to a deadlock.
    let plant = generator(
        "plant",
        &[("p0", "a", "p0"), ("p0", "f", "p1"), ("p1", "a", "p1"), ("p0", "g", "p2")],
        &["a"],
    );
    let spec = generator("spec", &[("s0", "a", "s0")], &[]);
    let alphabets = [Alphabet::from_names(["a"])];
    assert!(matches!(
        check_codiagnosable_verdict(&plant, &spec, &alphabets),
        Verdict::NotCodiagnosable(Witness::Blocking { .. })
    ));
}

#[test]
fn test_repeated_runs_are_identical() {
    let (sensor, controller) = sensor_and_controller();
    let (plant, alphabets) = compose_components(&[sensor, controller]).unwrap();
    let spec = parallel(&plant, &forbid("K", &["fault"])).unwrap();
    let plant_before = format!("{:?}", plant);

    let builder = VerifierBuilder::new(&plant, &spec, &alphabets).unwrap();
    let g1 = builder.build();
    let g2 = builder.build();
    assert_eq!(g1.num_states(), g2.num_states());
    assert_eq!(g1.num_edges(), g2.num_edges());
    for node in g1.nodes() {
        assert_eq!(g1.state(node), g2.state(node));
        assert_eq!(g1.edges(node), g2.edges(node));
    }

    let v1 = check_codiagnosable_verdict(&plant, &spec, &alphabets);
    let v2 = check_codiagnosable_verdict(&plant, &spec, &alphabets);
    assert_eq!(v1, v2);
    assert_eq!(format!("{:?}", plant), plant_before);
}

#[test]
fn test_budget_gives_undetermined_not_false() {
    let (sensor, controller) = sensor_and_controller();
    let (plant, alphabets) = compose_components(&[sensor, controller]).unwrap();
    let spec = parallel(&plant, &forbid("K", &["fault"])).unwrap();

    let options = ExploreOptions::default().with_max_states(3);
    let report = analyze(&plant, &spec, &alphabets, &options, &mut LogObserver).unwrap();
    assert_eq!(report.is_codiagnosable(), None);
    assert!(report.graph.is_none());
    assert!(report.to_string().starts_with("verdict: undetermined"));
}

#[test]
fn test_configuration_errors() {
    let (plant, spec, _) = silent_fault();
    assert_eq!(is_codiagnosable(&plant, &spec, &[]), Err(CodiagError::NoSites));
    assert_eq!(
        is_codiagnosable(&plant, &spec, &[Alphabet::from_names(["a", "zz"])]),
        Err(CodiagError::AlphabetNotInPlant {
            site: 0,
            events: Alphabet::from_names(["zz"])
        })
    );
}

#[test]
fn test_modular_diagnosers() {
    let (sensor, _) = sensor_and_controller();
    let belt = generator(
        "belt",
        &[("0", "load", "1"), ("1", "unload", "0"), ("1", "slip", "2"), ("2", "stall", "2")],
        &["load", "unload", "stall"],
    );
    let plant = parallel(&sensor, &belt).unwrap();
    let spec = parallel(&plant, &forbid("K", &["fault", "slip"])).unwrap();

    let diagnosers = decentralized_modular_diagnoser(&[sensor, belt], &spec).unwrap();
    assert_eq!(diagnosers.len(), 2);
    assert_eq!(diagnosers[0].diagnose(&trace(&["start"])), Some(Diagnosis::Normal));
    assert_eq!(diagnosers[0].diagnose(&trace(&["start", "stop", "jam"])), Some(Diagnosis::Faulty));
    assert_eq!(diagnosers[1].diagnose(&trace(&["load", "unload"])), Some(Diagnosis::Normal));
    assert_eq!(diagnosers[1].diagnose(&trace(&["load", "stall"])), Some(Diagnosis::Faulty));
    // Belt events are invisible to the sensor's diagnoser.
    assert_eq!(diagnosers[0].diagnose(&trace(&["load", "jam"])), Some(Diagnosis::Faulty));
}

#[test]
fn test_modular_diagnosers_reject_shared_events() {
    let (sensor, controller) = sensor_and_controller();
    let spec = parallel(&sensor, &controller).unwrap();
    assert!(matches!(
        decentralized_modular_diagnoser(&[sensor, controller], &spec),
        Err(CodiagError::OverlappingComponents { first: 0, second: 1, .. })
    ));
}
