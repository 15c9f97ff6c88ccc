//! # codiag-rs: Co-diagnosability of discrete-event systems
//!
//! **`codiag-rs`** decides whether a discrete-event process (the *plant*),
//! monitored by several independent, partially-observing *sites*, is
//! **co-diagnosable** with respect to a *specification*: every deviation from
//! the specification is eventually confirmed by at least one site, for every
//! possible continuation. It also builds, per site, a *diagnoser* that
//! classifies an observed trace as normal, faulty, or uncertain.
//!
//! ## How it works
//!
//! The [`verifier`] explores the synchronous product of the plant, a global
//! copy of the specification, and one private copy of the specification per
//! site. A state is *confused* once the plant left the specification without
//! any site noticing. The system is co-diagnosable iff no confused state can
//! deadlock and no cycle keeps extending a confusion forever ([`decision`]).
//!
//! Composite states are interned by value in a hash-consing [`table`], which
//! keeps the explored graph finite and its node numbering deterministic.
//!
//! ## Basic Usage
//!
//! ```rust
//! use codiag_rs::alphabet::Alphabet;
//! use codiag_rs::decision::is_codiagnosable;
//! use codiag_rs::generator::Generator;
//!
//! // The fault `f` is silent, and afterwards the plant keeps doing `a`.
//! let mut plant = Generator::new("plant");
//! plant.add_named_transition("p0", "a", "p0").unwrap();
//! plant.add_named_transition("p0", "f", "p1").unwrap();
//! plant.add_named_transition("p1", "a", "p1").unwrap();
//! plant.set_init_state_by_name("p0");
//! plant.set_observable(&Alphabet::from_names(["a"]));
//!
//! let mut spec = Generator::new("spec");
//! spec.add_named_transition("s0", "a", "s0").unwrap();
//! spec.set_init_state_by_name("s0");
//!
//! let sites = [Alphabet::from_names(["a"])];
//! assert_eq!(is_codiagnosable(&plant, &spec, &sites), Ok(false));
//! ```
//!
//! ## Core Components
//!
//! - **[`generator`]**: deterministic automata with an observable-event mask.
//! - **[`verifier`]**: the verifier construction, one function per transition rule.
//! - **[`decision`]**: the verdict and the human-readable report.
//! - **[`diagnoser`]** and **[`decentralized`]**: per-site diagnosers.
//! - **[`dot`]**: Graphviz output.

pub mod alphabet;
pub mod compose;
pub mod composite;
pub mod decentralized;
pub mod decision;
pub mod diagnosability;
pub mod diagnoser;
pub mod dot;
pub mod error;
pub mod generator;
pub mod graph;
pub mod scc;
pub mod table;
pub mod types;
pub mod verifier;

pub use decentralized::{decentralized_diagnoser, decentralized_modular_diagnoser};
pub use decision::{check_codiagnosability, is_codiagnosable, Verdict};
pub use diagnosability::is_language_diagnosable;
pub use error::{CodiagError, Result};
