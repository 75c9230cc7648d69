//! Evaluation, differentiation, simplification and rewriting of BTM expression trees.
//!
//! Most work happens in the context of an [`Environment`], which parses formulas against its
//! registered names and owns the random generator used for parameters and function stand-ins.
//!
//! ```
//! use btm_compute::{compare::CompareOptions, env::param::ParameterSpec, Environment};
//!
//! let mut env = Environment::new();
//! env.add_parameter("a", ParameterSpec::fixed(3.0)).unwrap();
//! env.add_variable("x");
//!
//! let f = env.parse_formula("a x^2 + 2x");
//! let df = env.derivative(&f, "x");
//! assert!(env.compare_expressions(df, "6x + 2", &CompareOptions::default()));
//! ```

pub mod compare;
pub mod compose;
pub mod derivative;
pub mod edit;
pub mod env;
pub mod error;
pub mod eval;
pub mod matching;
pub mod options;
pub mod rules;
pub mod simplify;
pub mod step_collector;

pub use compose::Substitution;
pub use env::Environment;
pub use eval::{Bindings, Eval};
pub use options::Options;
pub use rules::{Match, RuleCatalog};
pub use step_collector::StepCollector;
