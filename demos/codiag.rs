use clap::{Parser, ValueEnum};

use codiag_rs::alphabet::Alphabet;
use codiag_rs::compose::parallel;
use codiag_rs::decentralized::{compose_components, decentralized_diagnoser};
use codiag_rs::decision::analyze;
use codiag_rs::dot::ToDot;
use codiag_rs::generator::Generator;
use codiag_rs::verifier::{ExploreOptions, LogObserver};

#[derive(Debug, Copy, Clone, ValueEnum)]
enum Scenario {
    /// A silent fault after which the plant keeps repeating an event.
    SilentFault,
    /// A failing sensor synchronised with its controller.
    Sensor,
    /// A deviation that only an unobservable event signals.
    Beta,
}

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Built-in system to analyze.
    #[arg(value_enum, default_value = "sensor")]
    scenario: Scenario,

    /// Maximum number of composite states to explore.
    #[clap(long, value_name = "INT")]
    max_states: Option<usize>,

    /// Write the verifier graph to this DOT file.
    #[clap(long, value_name = "FILE")]
    dot: Option<String>,

    /// Log every exploration step.
    #[clap(long)]
    trace: bool,
}

fn generator(name: &str, transitions: &[(&str, &str, &str)], observable: &[&str]) -> color_eyre::Result<Generator> {
    let mut g = Generator::new(name);
    for &(from, event, to) in transitions {
        g.add_named_transition(from, event, to)?;
    }
    g.set_init_state_by_name(transitions[0].0);
    g.set_observable(&Alphabet::from_names(observable.iter().copied()));
    Ok(g)
}

fn build(scenario: Scenario) -> color_eyre::Result<(Generator, Generator, Vec<Alphabet>)> {
    Ok(match scenario {
        Scenario::SilentFault => {
            let mut plant = generator("plant", &[("p0", "a", "p0"), ("p0", "f", "p1"), ("p1", "a", "p1")], &["a"])?;
            plant.insert_observable_event("b");
            let spec = generator("spec", &[("s0", "a", "s0")], &[])?;
            (plant, spec, vec![Alphabet::from_names(["a"]), Alphabet::from_names(["b"])])
        }
        Scenario::Sensor => {
            let sensor = generator(
                "sf",
                &[("0", "start", "1"), ("1", "stop", "0"), ("0", "fault", "2"), ("2", "jam", "2")],
                &["start", "stop", "jam"],
            )?;
            let controller = generator(
                "c1",
                &[("0", "start", "1"), ("1", "ack", "2"), ("2", "stop", "0")],
                &["start", "ack", "stop"],
            )?;
            let (plant, alphabets) = compose_components(&[sensor, controller])?;
            let mut no_fault = Generator::new("K");
            no_fault.insert_state("k");
            no_fault.insert_event("fault");
            no_fault.set_init_state_by_name("k");
            let spec = parallel(&plant, &no_fault)?;
            (plant, spec, alphabets)
        }
        Scenario::Beta => {
            // `beta` is unobservable: listing it in site 0's alphabet changes nothing.
            let plant = generator("g", &[("p0", "alpha", "p0"), ("p0", "beta", "p0")], &["alpha"])?;
            let spec = generator(
                "k",
                &[("s0", "alpha", "s0"), ("s0", "beta", "s1"), ("s1", "alpha", "s1")],
                &[],
            )?;
            let alphabets = vec![Alphabet::from_names(["alpha", "beta"]), Alphabet::from_names(["alpha"])];
            (plant, spec, alphabets)
        }
    })
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Cli::parse();

    simplelog::TermLogger::init(
        if args.trace {
            simplelog::LevelFilter::Trace
        } else {
            simplelog::LevelFilter::Debug
        },
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let time_total = std::time::Instant::now();
    println!("args = {:?}", args);

    let (plant, spec, alphabets) = build(args.scenario)?;
    println!(
        "plant '{}': {} states, {} transitions",
        plant.name(),
        plant.num_states(),
        plant.num_transitions()
    );
    for (i, alphabet) in alphabets.iter().enumerate() {
        println!("site {}: {}", i, alphabet);
    }

    let mut options = ExploreOptions::default();
    if let Some(max_states) = args.max_states {
        options = options.with_max_states(max_states);
    }
    let report = analyze(&plant, &spec, &alphabets, &options, &mut LogObserver)?;
    println!("{}", report);

    if let (Some(path), Some(graph)) = (&args.dot, &report.graph) {
        std::fs::write(path, graph.to_dot()?)?;
        println!("Wrote verifier graph to '{}'", path);
    }

    if report.is_codiagnosable().is_some() {
        let (_, diagnosers) = decentralized_diagnoser(&plant, &spec, &alphabets)?;
        for diagnoser in &diagnosers {
            print!("{}", diagnoser);
        }
    }

    println!("\nAll done in {:.3} s", time_total.elapsed().as_secs_f64());
    Ok(())
}
