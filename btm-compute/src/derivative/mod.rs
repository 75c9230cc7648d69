//! Symbolic differentiation.
//!
//! [`derivative`] applies the sum, product, quotient, power and chain rules structurally. Products
//! and sums are assembled with [`MultBuilder`] and [`SumBuilder`], which drop factors of one,
//! collapse products containing zero, and skip zero terms, so that results stay readable without a
//! separate simplification pass.

mod function;

pub(crate) use function::closed_form;

use btm_parser::{
    expr::{BinOp, Binary, Derivative, MultiOp, UnaryOp},
    Expr,
    NameScope,
};
use crate::compose::{compose, Substitution};
use std::collections::HashMap;

/// Returns `true` if the given [`Expr`] is clearly zero. This cleans up the trees built while
/// differentiating and is not mathematically rigorous.
fn is_trivially_zero(e: &Expr) -> bool {
    match e {
        Expr::Scalar(n) => n.is_zero(),
        Expr::Unary(unary) => unary.op != UnaryOp::Recip && is_trivially_zero(&unary.operand),
        Expr::Multi(multi) => match multi.op {
            MultiOp::Add => multi.operands.iter().all(is_trivially_zero),
            MultiOp::Mul => multi.operands.iter().any(is_trivially_zero),
        },
        Expr::Binary(Binary { op: BinOp::Mul, lhs, rhs }) => is_trivially_zero(lhs) || is_trivially_zero(rhs),
        _ => false,
    }
}

/// Returns `true` if the given [`Expr`] is clearly one.
fn is_trivially_unity(e: &Expr) -> bool {
    match e {
        Expr::Scalar(n) => n.is_one(),
        Expr::Multi(multi) if multi.op == MultiOp::Mul => multi.operands.iter().all(is_trivially_unity),
        _ => false,
    }
}

/// Helper struct to build a product of expressions. If any of the factors are zero, the product is
/// reduced to zero.
#[derive(Default)]
pub(crate) struct MultBuilder(Vec<Expr>);

impl From<MultBuilder> for Expr {
    fn from(value: MultBuilder) -> Self {
        let mut factors = value.0;
        match factors.len() {
            0 => Expr::integer(1),
            1 => factors.remove(0),
            _ => Expr::multi(MultiOp::Mul, factors),
        }
    }
}

impl MultBuilder {
    pub(crate) fn mult(&mut self, e: Expr) {
        if is_trivially_zero(&e) || self.0.first().is_some_and(is_trivially_zero) {
            self.0 = vec![Expr::integer(0)];
            return;
        }

        if !is_trivially_unity(&e) {
            self.0.push(e)
        }
    }

    fn with(mut self, e: Expr) -> Self {
        self.mult(e);
        self
    }
}

/// Helper struct to build a sum of expressions. Only non-zero expressions are added to the sum.
#[derive(Default)]
pub(crate) struct SumBuilder(Vec<Expr>);

impl From<SumBuilder> for Expr {
    fn from(value: SumBuilder) -> Self {
        let mut terms = value.0;
        match terms.len() {
            0 => Expr::integer(0),
            1 => terms.remove(0),
            _ => Expr::multi(MultiOp::Add, terms),
        }
    }
}

impl SumBuilder {
    pub(crate) fn add(&mut self, e: Expr) {
        if !is_trivially_zero(&e) {
            self.0.push(e)
        }
    }
}

/// Negates an expression, keeping zero as zero.
pub(crate) fn negate(e: Expr) -> Expr {
    if is_trivially_zero(&e) {
        return Expr::integer(0);
    }
    match e {
        Expr::Scalar(n) => Expr::number(-n),
        Expr::Unary(unary) if unary.op == UnaryOp::Neg => *unary.operand,
        e => Expr::unary(UnaryOp::Neg, e),
    }
}

/// `a^n`, skipping the trivial exponents zero and one.
pub(crate) fn power(base: Expr, exponent: Expr) -> Expr {
    match exponent.as_number() {
        Some(n) if n.is_zero() => Expr::integer(1),
        Some(n) if n.is_one() => base,
        _ => Expr::binary(BinOp::Pow, base, exponent),
    }
}

/// `a / b`, skipping division by one.
pub(crate) fn quotient(numer: Expr, denom: Expr) -> Expr {
    if is_trivially_zero(&numer) {
        return Expr::integer(0);
    }
    if is_trivially_unity(&denom) {
        return numer;
    }
    Expr::binary(BinOp::Div, numer, denom)
}

/// A scope that binds one more name than another scope.
struct WithName<'a, S: ?Sized> {
    scope: &'a S,
    name: &'a str,
}

impl<S: NameScope + ?Sized> NameScope for WithName<'_, S> {
    fn is_bound(&self, name: &str) -> bool {
        name == self.name || self.scope.is_bound(name)
    }

    fn bound_names(&self) -> Vec<&str> {
        let mut names = self.scope.bound_names();
        names.push(self.name);
        names
    }
}

/// Returns true if the expression cannot change with the given variable: every free symbol in it
/// is a known constant other than the variable itself.
fn is_independent<S: NameScope + ?Sized>(e: &Expr, var: &str, known: &S) -> bool {
    !matches!(e, Expr::Invalid(_))
        && e.dependencies().iter().all(|name| name != var && known.is_bound(name))
}

/// `(f + g)' = f' + g'`
fn sum_rule<S: NameScope + ?Sized>(terms: &[Expr], var: &str, known: &S) -> Expr {
    let mut sum = SumBuilder::default();
    for term in terms {
        sum.add(derivative(term, var, known));
    }
    sum.into()
}

/// `(f * g * h)' = f' * g * h + f * g' * h + f * g * h'`
fn product_rule<S: NameScope + ?Sized>(factors: &[Expr], var: &str, known: &S) -> Expr {
    let mut outer_sum = SumBuilder::default();
    for derivative_index in 0..factors.len() {
        let mut inner_mult = MultBuilder::default();
        for (term_index, factor) in factors.iter().enumerate() {
            if derivative_index == term_index {
                inner_mult.mult(derivative(factor, var, known));
            } else {
                inner_mult.mult(factor.clone());
            }
        }
        outer_sum.add(inner_mult.into());
    }
    outer_sum.into()
}

fn binary_derivative<S: NameScope + ?Sized>(binary: &Binary, var: &str, known: &S) -> Expr {
    let (u, v) = (&*binary.lhs, &*binary.rhs);
    match binary.op {
        BinOp::Add => sum_rule(&[u.clone(), v.clone()], var, known),
        BinOp::Sub => {
            let du = derivative(u, var, known);
            let dv = derivative(v, var, known);
            match (is_trivially_zero(&du), is_trivially_zero(&dv)) {
                (_, true) => du,
                (true, false) => negate(dv),
                (false, false) => Expr::binary(BinOp::Sub, du, dv),
            }
        },
        BinOp::Mul => {
            if is_independent(u, var, known) {
                MultBuilder::default().with(u.clone()).with(derivative(v, var, known)).into()
            } else if is_independent(v, var, known) {
                MultBuilder::default().with(derivative(u, var, known)).with(v.clone()).into()
            } else {
                product_rule(&[u.clone(), v.clone()], var, known)
            }
        },
        BinOp::Div => {
            let v_squared = power(v.clone(), Expr::integer(2));
            if is_independent(v, var, known) {
                quotient(derivative(u, var, known), v.clone())
            } else if is_independent(u, var, known) {
                let numer = MultBuilder::default().with(u.clone()).with(derivative(v, var, known));
                negate(quotient(numer.into(), v_squared))
            } else {
                let left = MultBuilder::default().with(derivative(u, var, known)).with(v.clone());
                let right = MultBuilder::default().with(u.clone()).with(derivative(v, var, known));
                let numer = match (left.into(), right.into()) {
                    (l, r) if is_trivially_zero(&r) => l,
                    (l, r) if is_trivially_zero(&l) => negate(r),
                    (l, r) => Expr::binary(BinOp::Sub, l, r),
                };
                quotient(numer, v_squared)
            }
        },
        BinOp::Pow => {
            if !is_independent(v, var, known) {
                // u^v = exp(v ln u)
                let exponent = Expr::binary(BinOp::Mul, v.clone(), Expr::function("ln", u.clone()));
                return derivative(&Expr::function("exp", exponent), var, known);
            }

            let reduced = match v.as_number() {
                Some(n) => Expr::number(n - btm_parser::Number::integer(1)),
                None => Expr::binary(BinOp::Sub, v.clone(), Expr::integer(1)),
            };
            let mut mult = MultBuilder::default()
                .with(v.clone())
                .with(power(u.clone(), reduced));
            if u.as_variable() != Some(var) {
                mult.mult(derivative(u, var, known));
            }
            mult.into()
        },
        // truth values are piecewise constant
        BinOp::Eq | BinOp::And | BinOp::Or => Expr::integer(0),
    }
}

fn derivative_of_derivative<S: NameScope + ?Sized>(inner: &Derivative, var: &str, known: &S) -> Expr {
    // the outer variable is held fixed while differentiating with respect to the inner one
    let first = if inner.var == var {
        derivative(&inner.expr, &inner.var, known)
    } else {
        // a trait object keeps nested operators from instantiating a new scope type per level
        let scope: &dyn NameScope = &WithName { scope: known, name: var };
        derivative(&inner.expr, &inner.var, scope)
    };
    let first = match &inner.at {
        Some(at) => {
            let point = HashMap::from([(inner.var.clone(), Substitution::Expr((**at).clone()))]);
            compose(&first, &point, &())
        },
        None => first,
    };
    derivative(&first, var, known)
}

/// Computes the derivative of an expression with respect to `var`.
///
/// Names bound in `known` are constants. Any other free name is assumed to depend on `var`, so
/// that `y` differentiates to `y'`. A part of the tree that could not be parsed is returned as is.
pub fn derivative<S: NameScope + ?Sized>(f: &Expr, var: &str, known: &S) -> Expr {
    if let Expr::Invalid(_) = f {
        return f.clone();
    }
    if is_independent(f, var, known) {
        return Expr::integer(0);
    }

    match f {
        Expr::Scalar(_) | Expr::Index(_) => Expr::integer(0),
        Expr::Variable(v) => {
            if v.name == var {
                Expr::integer(1)
            } else {
                Expr::var(format!("{}'", v.name))
            }
        },
        Expr::Unary(unary) => {
            let du = derivative(&unary.operand, var, known);
            match unary.op {
                UnaryOp::Plus => du,
                UnaryOp::Neg => negate(du),
                UnaryOp::Recip => {
                    let square = Expr::binary(BinOp::Mul, (*unary.operand).clone(), (*unary.operand).clone());
                    negate(quotient(du, square))
                },
            }
        },
        Expr::Binary(binary) => binary_derivative(binary, var, known),
        Expr::Multi(multi) => match multi.op {
            MultiOp::Add => sum_rule(&multi.operands, var, known),
            MultiOp::Mul => product_rule(&multi.operands, var, known),
        },
        Expr::Function(func) => function::function_derivative(func, var, known),
        Expr::Derivative(inner) => derivative_of_derivative(inner, var, known),
        Expr::Invalid(_) => f.clone(),
    }
}

#[cfg(test)]
mod tests {
    use btm_parser::parse;
    use crate::eval::{Bindings, Eval};
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;
    use super::*;

    /// Evaluates an expression with `x` bound.
    fn eval_x(e: &Expr, x: f64) -> f64 {
        e.eval(&Bindings::new().with_var("x", x)).unwrap_or(f64::NAN)
    }

    /// Central finite difference approximation of the derivative.
    fn finite_difference(e: &Expr, x: f64) -> f64 {
        const DX: f64 = 1e-5;
        (eval_x(e, x + DX) - eval_x(e, x - DX)) / (2.0 * DX)
    }

    fn test_for_function(function: &'static str, points: impl IntoIterator<Item = f64>) {
        const TOL: f64 = 1e-4;

        let expr = parse(function);
        assert!(!expr.has_parsing_error(), "{}", function);
        let symbolic = derivative(&expr, "x", &());

        for point in points {
            let symbolically_computed = eval_x(&symbolic, point);
            let numerically_computed = finite_difference(&expr, point);

            assert!(
                (symbolically_computed - numerically_computed).abs() < TOL * numerically_computed.abs().max(1.0),
                "For \"{function}\" at x={point}, symbolic derivative `{symbolic}` was {symbolically_computed} but the finite difference was {numerically_computed}",
            );
        }
    }

    #[test]
    fn power_rule() {
        test_for_function("x^2 + x + 1", [0., 1., 2., 5., 8.]);
        test_for_function("x^3+2*x", [-2., 0.5, 2.]);
        test_for_function("(2x+1)^5", [-1., 0.3, 1.]);
        test_for_function("x^(1/2)", [0.5, 2., 9.]);
    }

    #[test]
    fn exponents_with_the_variable() {
        test_for_function("2^x", [-1., 0., 3.]);
        test_for_function("x^x", [0.5, 1., 2.]);
    }

    #[test]
    fn products_and_quotients() {
        test_for_function("x*sin(x)", [0., 1., 2.]);
        test_for_function("3/x", [0.5, 2.]);
        test_for_function("x/(x^2+1)", [-1., 0., 2.]);
        test_for_function("(x+1)/4", [0., 3.]);
        test_for_function("/x", [0.5, 3.]);
        test_for_function("-(x^2)+x-x^3", [1., 2.]);
    }

    #[test]
    fn chain_rule() {
        test_for_function("sin(x^2)", [0., 0.5, 1.2]);
        test_for_function("cos(3x)", [0., 0.5, 1.2]);
        test_for_function("tan(x)", [0., 0.5]);
        test_for_function("csc(x)+sec(x)+cot(x)", [0.4, 1.1]);
        test_for_function("arcsin(x/2)+arccos(x/3)", [-0.5, 0.2, 0.9]);
        test_for_function("arctan(x)+arccot(2x)", [0.3, 1.5]);
        test_for_function("arcsec(x)+arccsc(x)", [1.5, -2.5]);
        test_for_function("sqrt(x^2+1)", [-1., 0., 2.]);
        test_for_function("abs(x-1)", [-1., 3.]);
        test_for_function("exp(2x)+ln(x)+log10(x)", [0.5, 2.]);
    }

    #[test]
    fn builtin_with_order() {
        test_for_function("sin'(2x)", [0., 0.7]);
        test_for_function("ln''(x)", [1., 3.]);
    }

    #[test]
    fn exact_results() {
        assert_eq!(derivative(&parse("x^2"), "x", &()).to_string(), "2*x");
        assert_eq!(derivative(&parse("sin(x)"), "x", &()).to_string(), "cos(x)");
        assert_eq!(derivative(&parse("5"), "x", &()).to_string(), "0");
        assert_eq!(derivative(&parse("x"), "x", &()).to_string(), "1");
    }

    #[test]
    fn dependent_and_known_names() {
        assert_eq!(derivative(&parse("y"), "x", &()).to_string(), "y'");
        assert_eq!(derivative(&parse("f(x)"), "x", &()).to_string(), "f'(x)");
        assert_eq!(derivative(&parse("f'(2x)"), "x", &()).to_string(), "f''(2*x)*2");

        let known = HashSet::from(["a".to_string()]);
        assert_eq!(derivative(&parse("a*b"), "x", &known).to_string(), "a*b'");
        assert_eq!(derivative(&parse("sin(a)"), "x", &known).to_string(), "0");
        assert_eq!(derivative(&parse("pi*e"), "x", &()).to_string(), "0");
    }

    #[test]
    fn nested_derivative_operator() {
        // d/dx [ D(t^2 x, t, 3) ] = d/dx [ 6x ] = 6
        let expr = parse("D(t^2*x,t,3)");
        let result = derivative(&expr, "x", &());
        assert_eq!(result.eval_default(), Some(6.0));
    }

    #[test]
    fn doubly_nested_derivative_operators() {
        // D(s t^2 x, s, 1) = t^2 x, then d/dt at t=2 gives 4x
        let expr = parse("D(D(s*t^2*x,s,1),t,2)");
        let known = HashSet::from(["a".to_string()]);
        assert_eq!(derivative(&expr, "x", &known).eval_default(), Some(4.0));
        assert_eq!(derivative(&expr, "x", &()).eval_default(), Some(4.0));

        // the derivative variable is fixed, so the result is 0
        assert_eq!(derivative(&parse("D(x^3,x,2)"), "x", &()).to_string(), "0");
    }

    #[test]
    fn invalid_is_kept() {
        let expr = parse("(x+");
        let result = derivative(&expr, "x", &());
        assert!(result.has_parsing_error());
    }
}
