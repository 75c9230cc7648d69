//! Numeric evaluation of expression trees.
//!
//! Evaluation never fails loudly. An unbound variable, a value outside the domain of a function,
//! or an unknown function produces [`None`], which propagates through every enclosing operation.
//! Division and powers follow floating-point semantics, so infinite and `NaN` values can appear
//! in a successful result.

pub mod builtin;

use btm_parser::{
    expr::{BinOp, Binary, Derivative, Function, Index, Multi, MultiOp, Unary, UnaryOp},
    Expr,
    NameScope,
};
use crate::{
    compose::{compose, Substitution},
    derivative::{closed_form, derivative},
    env::functions::FunctionTable,
};
use log::warn;
use std::collections::HashMap;

/// Values of the names that can appear in an expression being evaluated.
#[derive(Debug, Clone)]
pub struct Bindings<'a> {
    /// Scalar values.
    vars: HashMap<String, f64>,

    /// Sequences, referenced by indexed variables.
    sequences: HashMap<String, Vec<f64>>,

    /// Definitions of the functions that are not builtin.
    functions: Option<&'a FunctionTable>,

    /// Tolerance used to decide `=`.
    pub abs_tol: f64,
}

impl Default for Bindings<'_> {
    fn default() -> Self {
        Self {
            vars: HashMap::new(),
            sequences: HashMap::new(),
            functions: None,
            abs_tol: 1e-8,
        }
    }
}

impl<'a> Bindings<'a> {
    /// Creates bindings with no values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates bindings that evaluate unknown functions with the given table.
    pub fn with_functions(functions: &'a FunctionTable) -> Self {
        Self { functions: Some(functions), ..Self::default() }
    }

    /// Binds a name to a value, returning the bindings.
    pub fn with_var(mut self, name: &str, value: f64) -> Self {
        self.add_var(name, value);
        self
    }

    /// Binds a name to a value.
    pub fn add_var(&mut self, name: &str, value: f64) {
        self.vars.insert(name.to_string(), value);
    }

    /// Returns the value bound to a name.
    pub fn get_var(&self, name: &str) -> Option<f64> {
        self.vars.get(name).copied()
    }

    /// Binds a name to a sequence of values, referenced with `name[k]` starting from `k = 1`.
    pub fn add_sequence(&mut self, name: &str, values: Vec<f64>) {
        self.sequences.insert(name.to_string(), values);
    }

    /// Returns the sequence bound to a name.
    pub fn get_sequence(&self, name: &str) -> Option<&[f64]> {
        self.sequences.get(name).map(Vec::as_slice)
    }

    /// Returns the table of function definitions, if any.
    pub fn functions(&self) -> Option<&'a FunctionTable> {
        self.functions
    }
}

impl NameScope for Bindings<'_> {
    fn is_bound(&self, name: &str) -> bool {
        self.vars.contains_key(name) || self.sequences.contains_key(name)
    }

    fn bound_names(&self) -> Vec<&str> {
        self.vars.keys().chain(self.sequences.keys()).map(String::as_str).collect()
    }
}

/// Any type that can be evaluated to produce a number.
pub trait Eval {
    /// Evaluates the expression with the given bindings. Returns [`None`] if the value is
    /// undefined.
    fn eval(&self, bindings: &Bindings) -> Option<f64>;

    /// Evaluates the expression with no bindings.
    fn eval_default(&self) -> Option<f64> {
        self.eval(&Bindings::default())
    }
}

/// Returns `1` for true and `0` for false.
fn truth(b: bool) -> f64 {
    if b { 1.0 } else { 0.0 }
}

/// Evaluates a variable, falling back to the special constants.
fn eval_variable(name: &str, bindings: &Bindings) -> Option<f64> {
    if let Some(value) = bindings.get_var(name) {
        return Some(value);
    }
    match name {
        "e" => Some(std::f64::consts::E),
        "pi" => Some(std::f64::consts::PI),
        "inf" => Some(f64::INFINITY),
        "dne" => Some(f64::NAN),
        _ => None,
    }
}

impl Eval for Index {
    fn eval(&self, bindings: &Bindings) -> Option<f64> {
        let sequence = bindings.get_sequence(&self.name)?;
        let position = match self.symbol() {
            // the index symbol falls back to the current row
            Some(symbol) if bindings.get_var(&symbol).is_none() => {
                let row = bindings.get_var("row")?;
                self.index.eval(&bindings.clone().with_var(&symbol, row))?
            },
            _ => self.index.eval(bindings)?,
        };

        let position = position.round();
        if position < 1.0 {
            return None;
        }
        sequence.get(position as usize - 1).copied()
    }
}

impl Eval for Unary {
    fn eval(&self, bindings: &Bindings) -> Option<f64> {
        let value = self.operand.eval(bindings)?;
        Some(match self.op {
            UnaryOp::Plus => value,
            UnaryOp::Neg => -value,
            UnaryOp::Recip => 1.0 / value,
        })
    }
}

impl Eval for Binary {
    fn eval(&self, bindings: &Bindings) -> Option<f64> {
        let a = self.lhs.eval(bindings)?;
        let b = self.rhs.eval(bindings)?;
        Some(match self.op {
            BinOp::Add => a + b,
            BinOp::Sub => a - b,
            BinOp::Mul => a * b,
            BinOp::Div => a / b,
            BinOp::Pow => {
                if self.rhs.is_constant() && (a >= 0.0 || b.fract() == 0.0) {
                    a.powf(b)
                } else {
                    (b * a.ln()).exp()
                }
            },
            BinOp::Eq => truth((a - b).abs() < bindings.abs_tol),
            BinOp::And => truth(a != 0.0 && b != 0.0),
            BinOp::Or => truth(a != 0.0 || b != 0.0),
        })
    }
}

impl Eval for Multi {
    fn eval(&self, bindings: &Bindings) -> Option<f64> {
        let mut result = self.op.identity() as f64;
        for operand in &self.operands {
            let value = operand.eval(bindings)?;
            match self.op {
                MultiOp::Add => result += value,
                MultiOp::Mul => result *= value,
            }
        }
        Some(result)
    }
}

impl Eval for Function {
    fn eval(&self, bindings: &Bindings) -> Option<f64> {
        let x = self.arg.eval(bindings)?;

        if self.is_builtin() {
            if self.derivs == 0 {
                return builtin::apply(&self.name, x);
            }

            let chain = closed_form(&self.name, self.derivs, &Expr::var("x"));
            return chain.eval(&Bindings::new().with_var("x", x));
        }

        match bindings.functions().and_then(|table| table.get(&self.name)) {
            Some(def) => def.eval(self.derivs, x, bindings),
            None => {
                warn!("function `{}` has no definition", self.name);
                None
            },
        }
    }
}

impl Eval for Derivative {
    fn eval(&self, bindings: &Bindings) -> Option<f64> {
        let known = bindings.bound_names()
            .into_iter()
            .filter(|name| *name != self.var)
            .map(str::to_string)
            .collect::<std::collections::HashSet<_>>();
        let deriv = derivative(&self.expr, &self.var, &known);

        match &self.at {
            Some(at) => {
                let point = HashMap::from([(self.var.clone(), Substitution::Expr((**at).clone()))]);
                compose(&deriv, &point, &()).eval(bindings)
            },
            None => deriv.eval(bindings),
        }
    }
}

impl Eval for Expr {
    fn eval(&self, bindings: &Bindings) -> Option<f64> {
        match self {
            Expr::Scalar(number) => Some(number.value()),
            Expr::Variable(var) => eval_variable(&var.name, bindings),
            Expr::Index(index) => index.eval(bindings),
            Expr::Unary(unary) => unary.eval(bindings),
            Expr::Binary(binary) => binary.eval(bindings),
            Expr::Multi(multi) => multi.eval(bindings),
            Expr::Function(function) => function.eval(bindings),
            Expr::Derivative(deriv) => deriv.eval(bindings),
            Expr::Invalid(_) => None,
        }
    }
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

    fn eval_x(source: &str, x: f64) -> Option<f64> {
        parse(source).eval(&Bindings::new().with_var("x", x))
    }

    #[test]
    fn arithmetic() {
        assert_eq!(parse("1+2*3").eval_default(), Some(7.0));
        assert_eq!(parse("3*-5/8+6").eval_default(), Some(4.125));
        assert_eq!(parse("((1+9)/5)*3").eval_default(), Some(6.0));
        assert_eq!(parse("2(3)").eval_default(), Some(6.0));
        assert_eq!(parse("|-5|").eval_default(), Some(5.0));
    }

    #[test]
    fn reparsed_display_evaluates_the_same() {
        use rand::{rngs::StdRng, Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(7);
        for source in [
            "-x^2",
            "x-(-y)",
            "2^-x*3",
            "/x^2",
            "x/-y",
            "|x|-|y|",
            "x^-2^2",
            "x-(y-x)/(2x)",
            "-(x+y)*sin(-x)",
            "(x*y)^(1/3)+2x*y",
        ] {
            let expr = parse(source);
            assert!(!expr.has_parsing_error(), "{}", source);
            let reparsed = parse(&expr.to_string());
            assert!(!reparsed.has_parsing_error(), "{} -> {}", source, expr);

            for _ in 0..25 {
                let bindings = Bindings::new()
                    .with_var("x", rng.gen_range(-3.0..3.0))
                    .with_var("y", rng.gen_range(-3.0..3.0));
                let a = expr.eval(&bindings).unwrap_or(f64::NAN);
                let b = reparsed.eval(&bindings).unwrap_or(f64::NAN);
                assert!(
                    (a.is_nan() && b.is_nan()) || a == b || (a - b).abs() <= 1e-9 * a.abs().max(1.0),
                    "`{}` printed as `{}`: {} != {}", source, expr, a, b,
                );
            }
        }
    }

    #[test]
    fn identity_laws() {
        for x in [-3.5, -1.0, 0.25, 2.0, 17.0] {
            assert_eq!(eval_x("x+0", x), Some(x));
            assert_eq!(eval_x("x*0", x), Some(0.0));
            assert_eq!(eval_x("x^0", x), Some(1.0));
            assert_eq!(eval_x("x/x", x), Some(1.0));
        }
        assert!(eval_x("x/x", 0.0).unwrap().is_nan());
    }

    #[test]
    fn undefined_propagates() {
        assert_eq!(parse("x+1").eval_default(), None);
        assert_eq!(eval_x("arcsin(x)+1", 2.0), None);
        assert_eq!(eval_x("sqrt(x)*0", -1.0), None);
    }

    #[test]
    fn special_constants() {
        assert_float_absolute_eq!(parse("2pi").eval_default().unwrap(), std::f64::consts::TAU);
        assert_eq!(parse("inf").eval_default(), Some(f64::INFINITY));
        assert!(parse("dne").eval_default().unwrap().is_nan());
        assert_eq!(parse("1/0").eval_default(), Some(f64::INFINITY));
    }

    #[test]
    fn powers() {
        assert_eq!(parse("(-2)^3").eval_default(), Some(-8.0));
        assert!(parse("(-8)^(1/3)").eval_default().unwrap().is_nan());
        assert_float_absolute_eq!(eval_x("2^x", 3.0).unwrap(), 8.0);
        assert!(eval_x("x^x", -2.0).unwrap().is_nan());
    }

    #[test]
    fn logic() {
        assert_eq!(eval_x("x=2", 2.0), Some(1.0));
        assert_eq!(eval_x("x=2", 2.1), Some(0.0));
        assert_eq!(eval_x("x=2&x=3", 2.0), Some(0.0));
        assert_eq!(eval_x("x=2$x=3", 3.0), Some(1.0));
    }

    #[test]
    fn builtin_derivatives() {
        assert_float_absolute_eq!(eval_x("sin'(x)", 0.0).unwrap(), 1.0);
        assert_float_absolute_eq!(eval_x("sin''(x)", 1.0).unwrap(), -(1.0f64.sin()));
        assert_float_absolute_eq!(eval_x("ln'(x)", 4.0).unwrap(), 0.25);
    }

    #[test]
    fn derivative_operator() {
        assert_eq!(eval_x("D(x^2,x)", 3.0), Some(6.0));
        assert_float_absolute_eq!(eval_x("D(x^3+2*x,x)", 2.0).unwrap(), 14.0);
        assert_float_absolute_eq!(parse("D(sin(x),x,0)").eval_default().unwrap(), 1.0);
        // `y` is a known constant while differentiating with respect to `x`
        let bindings = Bindings::new().with_var("x", 2.0).with_var("y", 5.0);
        assert_float_absolute_eq!(parse("D(x*y,x)").eval(&bindings).unwrap(), 5.0);
    }

    #[test]
    fn sequences() {
        let mut bindings = Bindings::new();
        bindings.add_sequence("a", vec![10.0, 20.0, 30.0]);
        assert_eq!(parse("a[2]").eval(&bindings), Some(20.0));
        assert_eq!(parse("a[4]").eval(&bindings), None);

        bindings.add_var("row", 2.0);
        assert_eq!(parse("a[k+1]").eval(&bindings), Some(30.0));
        bindings.add_var("k", 0.0);
        assert_eq!(parse("a[k+1]").eval(&bindings), Some(10.0));
    }

    #[test]
    fn unknown_function_without_table() {
        assert_eq!(eval_x("f(x)", 1.0), None);
    }
}
