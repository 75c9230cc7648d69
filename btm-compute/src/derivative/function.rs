//! Symbolic derivatives of the builtin functions.

use btm_parser::{expr::{BinOp, Function}, Expr, NameScope};
use crate::compose::{compose, Substitution};
use std::collections::HashMap;
use super::{derivative, negate, power, quotient, MultBuilder};

fn call(name: &str, u: &Expr) -> Expr {
    Expr::function(name, u.clone())
}

fn mul(a: Expr, b: Expr) -> Expr {
    Expr::binary(BinOp::Mul, a, b)
}

fn square(u: &Expr) -> Expr {
    power(u.clone(), Expr::integer(2))
}

/// `abs(u) * sqrt(u^2 - 1)`
fn arcsec_denominator(u: &Expr) -> Expr {
    let root = call("sqrt", &Expr::binary(BinOp::Sub, square(u), Expr::integer(1)));
    mul(call("abs", u), root)
}

/// Returns the derivative of the builtin `name` with respect to its argument, written in terms of
/// the argument `u`.
fn outer_derivative(name: &str, u: &Expr) -> Option<Expr> {
    let one = || Expr::integer(1);
    Some(match name {
        "sin" => call("cos", u),
        "cos" => negate(call("sin", u)),
        "tan" => square(&call("sec", u)),
        "csc" => negate(mul(call("csc", u), call("cot", u))),
        "sec" => mul(call("sec", u), call("tan", u)),
        "cot" => negate(square(&call("csc", u))),
        "arcsin" => quotient(one(), call("sqrt", &Expr::binary(BinOp::Sub, one(), square(u)))),
        "arccos" => negate(quotient(one(), call("sqrt", &Expr::binary(BinOp::Sub, one(), square(u))))),
        "arctan" => quotient(one(), Expr::binary(BinOp::Add, one(), square(u))),
        "arccot" => negate(quotient(one(), Expr::binary(BinOp::Add, one(), square(u)))),
        "arcsec" => quotient(one(), arcsec_denominator(u)),
        "arccsc" => negate(quotient(one(), arcsec_denominator(u))),
        "sqrt" => quotient(one(), mul(Expr::integer(2), call("sqrt", u))),
        "abs" => quotient(call("abs", u), u.clone()),
        "exp" | "expb" => call(name, u),
        "ln" => quotient(one(), u.clone()),
        "log10" => quotient(call("log10", &Expr::var("e")), u.clone()),
        _ => return None,
    })
}

/// Returns the closed form of the `derivs`-th derivative of a builtin, in terms of `u`.
pub(crate) fn closed_form(name: &str, derivs: usize, u: &Expr) -> Expr {
    let mut chain = Expr::function(name, Expr::var("x"));
    for _ in 0..derivs {
        chain = derivative(&chain, "x", &());
    }
    if u.as_variable() == Some("x") {
        return chain;
    }
    let point = HashMap::from([("x".to_string(), Substitution::Expr(u.clone()))]);
    compose(&chain, &point, &())
}

/// Computes the derivative of a function call and applies the chain rule.
pub(super) fn function_derivative<S: NameScope + ?Sized>(func: &Function, var: &str, known: &S) -> Expr {
    let u = &*func.arg;

    if func.is_builtin() && func.derivs > 0 {
        return derivative(&closed_form(&func.name, func.derivs, u), var, known);
    }

    let outer = if func.is_builtin() {
        outer_derivative(&func.name, u)
    } else {
        None
    };
    let outer = outer.unwrap_or_else(|| Expr::Function(Function {
        name: func.name.clone(),
        derivs: func.derivs + 1,
        arg: func.arg.clone(),
    }));

    let mut mult_group = MultBuilder::default();
    mult_group.mult(outer);
    if u.as_variable() != Some(var) {
        mult_group.mult(derivative(u, var, known));
    }
    mult_group.into()
}
