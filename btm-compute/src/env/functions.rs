//! Definitions of the functions that are not builtin.
//!
//! A name such as `f` in `f(x)` has no meaning of its own. Each environment gives every such name
//! either a formula defined by the problem, or a fixed random stand-in so that expressions using
//! `f` can still be evaluated, differentiated and compared consistently.

use btm_parser::{expr::{BinOp, BUILTIN_FUNCTIONS}, Expr, Number};
use crate::{derivative::derivative, eval::{Bindings, Eval}};
use levenshtein::levenshtein;
use log::warn;
use std::{collections::HashMap, f64::consts::FRAC_PI_2};
use super::random::Random;

/// The number of sine terms in a stand-in.
const STAND_IN_TERMS: usize = 6;

/// A random trigonometric polynomial `c0 + c1 sin(x) + c2 sin(2x) + ... + c6 sin(6x)` used in
/// place of a function with no definition.
#[derive(Debug, Clone, PartialEq)]
pub struct StandIn {
    /// The constant term.
    pub constant: Number,

    /// The coefficient of `sin(i x)`, for `i = 1..`.
    pub coefficients: Vec<Number>,
}

impl StandIn {
    /// Draws a new stand-in from the generator.
    pub fn generate(rng: &mut Random) -> Self {
        let constant = rng.rand_rational((-20, 20), (1, 15));
        let coefficients = (0..STAND_IN_TERMS)
            .map(|_| rng.rand_rational((-20, 20), (1, 10)))
            .collect();
        Self { constant, coefficients }
    }

    /// Evaluates the `derivs`-th derivative of the stand-in at `x`.
    ///
    /// The `n`-th derivative of `sin(k x)` is `k^n sin(k x + n pi/2)`.
    pub fn eval(&self, derivs: usize, x: f64) -> f64 {
        let n = derivs as i32;
        let shift = derivs as f64 * FRAC_PI_2;
        let constant = if derivs == 0 { self.constant.value() } else { 0.0 };
        self.coefficients.iter()
            .enumerate()
            .fold(constant, |sum, (i, c)| {
                let k = (i + 1) as f64;
                sum + c.value() * k.powi(n) * (k * x + shift).sin()
            })
    }

    /// Writes the stand-in as a formula in the given input variable.
    pub fn formula(&self, input: &str) -> Expr {
        self.coefficients.iter()
            .enumerate()
            .fold(Expr::number(self.constant), |sum, (i, c)| {
                let arg = Expr::binary(BinOp::Mul, Expr::integer(i as i64 + 1), Expr::var(input));
                let term = Expr::binary(BinOp::Mul, Expr::number(*c), Expr::function("sin", arg));
                Expr::binary(BinOp::Add, sum, term)
            })
    }
}

/// The meaning given to a function name.
#[derive(Debug, Clone, PartialEq)]
pub enum FunctionDef {
    /// A formula written in terms of an input variable.
    Defined {
        /// The name of the input variable.
        input: String,

        /// The body of the function.
        formula: Expr,
    },

    /// A random stand-in.
    StandIn(StandIn),
}

impl FunctionDef {
    /// Evaluates the `derivs`-th derivative of the function at `x`. The remaining bindings are
    /// visible to a defined formula.
    pub fn eval(&self, derivs: usize, x: f64, bindings: &Bindings) -> Option<f64> {
        match self {
            FunctionDef::Defined { input, formula } => {
                let mut body = formula.clone();
                for _ in 0..derivs {
                    body = derivative(&body, input, bindings);
                }
                body.eval(&bindings.clone().with_var(input, x))
            },
            FunctionDef::StandIn(stand_in) => Some(stand_in.eval(derivs, x)),
        }
    }
}

/// The table of function definitions owned by an environment.
#[derive(Debug, Clone, Default)]
pub struct FunctionTable {
    defs: HashMap<String, FunctionDef>,
}

impl FunctionTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the definition of a function.
    pub fn get(&self, name: &str) -> Option<&FunctionDef> {
        self.defs.get(name)
    }

    /// Returns true if the function has a definition.
    pub fn contains(&self, name: &str) -> bool {
        self.defs.contains_key(name)
    }

    /// Defines a function by a formula, replacing any stand-in.
    pub fn define(&mut self, name: &str, input: &str, formula: Expr) {
        self.defs.insert(name.to_string(), FunctionDef::Defined {
            input: input.to_string(),
            formula,
        });
    }

    /// Gives the function a random stand-in if it has no definition yet. Returns true if a stand-in
    /// was created.
    pub fn ensure_stand_in(&mut self, name: &str, rng: &mut Random) -> bool {
        if self.defs.contains_key(name) {
            return false;
        }

        if let Some(similar) = similar_builtin(name) {
            warn!("function `{}` is not builtin; did you mean `{}`?", name, similar);
        }
        self.defs.insert(name.to_string(), FunctionDef::StandIn(StandIn::generate(rng)));
        true
    }

    /// Gives a stand-in to every unknown function called in the expression.
    pub fn register_calls(&mut self, expr: &Expr, rng: &mut Random) {
        for node in expr.iter() {
            if let Expr::Function(function) = node {
                if !function.is_builtin() {
                    self.ensure_stand_in(&function.name, rng);
                }
            }
        }
    }
}

/// Returns a builtin function whose name is one edit away from the given name.
fn similar_builtin(name: &str) -> Option<&'static str> {
    BUILTIN_FUNCTIONS.iter()
        .copied()
        .find(|builtin| levenshtein(builtin, name) < 2)
}

#[cfg(test)]
mod tests {
    use assert_float_eq::{
        afe_abs,
        afe_absolute_error_msg,
        afe_is_absolute_eq,
        assert_float_absolute_eq,
    };
    use btm_parser::parse;
    use pretty_assertions::assert_eq;
    use super::*;

    #[test]
    fn stand_in_matches_its_formula() {
        let stand_in = StandIn::generate(&mut Random::new(7));
        let formula = stand_in.formula("x");
        for x in [-1.5, 0.0, 0.3, 2.0] {
            let bindings = Bindings::new().with_var("x", x);
            assert_float_absolute_eq!(stand_in.eval(0, x), formula.eval(&bindings).unwrap(), 1e-9);

            let first = derivative(&formula, "x", &());
            assert_float_absolute_eq!(stand_in.eval(1, x), first.eval(&bindings).unwrap(), 1e-9);

            let second = derivative(&first, "x", &());
            assert_float_absolute_eq!(stand_in.eval(2, x), second.eval(&bindings).unwrap(), 1e-9);
        }
    }

    #[test]
    fn same_seed_same_stand_ins() {
        let mut a = FunctionTable::new();
        let mut b = FunctionTable::new();
        let expr = parse("f(x)+g(x)");
        a.register_calls(&expr, &mut Random::new(99));
        b.register_calls(&expr, &mut Random::new(99));
        assert_eq!(a.get("f"), b.get("f"));
        assert_eq!(a.get("g"), b.get("g"));
        assert!(a.get("f") != a.get("g"));
    }

    #[test]
    fn defined_functions() {
        let mut table = FunctionTable::new();
        table.define("f", "t", parse("t^3"));
        let bindings = Bindings::with_functions(&table).with_var("x", 2.0);
        assert_eq!(parse("f(x)").eval(&bindings), Some(8.0));
        assert_eq!(parse("f'(x)").eval(&bindings), Some(12.0));
        assert_eq!(parse("f''(x+1)").eval(&bindings), Some(18.0));
    }

    #[test]
    fn stand_ins_are_not_replaced() {
        let mut table = FunctionTable::new();
        let mut rng = Random::default();
        assert!(table.ensure_stand_in("f", &mut rng));
        let before = table.get("f").cloned();
        assert!(!table.ensure_stand_in("f", &mut rng));
        assert_eq!(table.get("f").cloned(), before);
    }
}
