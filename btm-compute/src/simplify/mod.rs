//! Constant folding and normalization of expression trees.
//!
//! [`simplify_constants`] folds operations on literals into a single literal and removes trivial
//! identities such as `x+0` or `x^1`. [`flatten`] rewrites chains of sums and products as n-ary
//! nodes. Both are idempotent.

mod flatten;

pub use flatten::{flatten, flattened_operands};

use btm_parser::{
    expr::{BinOp, Binary, Derivative, Function, Index, Multi, MultiOp, UnaryOp},
    Expr,
    Number,
};
use crate::options::Options;

/// Returns the value of a literal: a number, or the negation of a number.
pub(crate) fn literal(e: &Expr) -> Option<Number> {
    match e {
        Expr::Scalar(n) => Some(*n),
        Expr::Unary(unary) if unary.op == UnaryOp::Neg => unary.operand.as_number().map(|n| -n),
        _ => None,
    }
}

/// Writes a number as a literal, using a negation of a positive literal when negative literals
/// are not allowed.
pub(crate) fn make_literal(n: Number, options: &Options) -> Expr {
    if !options.negative_numbers && n.is_negative() {
        Expr::unary(UnaryOp::Neg, Expr::number(-n))
    } else {
        Expr::number(n)
    }
}

fn is_literal(e: &Expr, value: i64) -> bool {
    literal(e).is_some_and(|n| n == Number::integer(value))
}

/// Folds a binary operation on two literals.
fn fold_binary(op: BinOp, a: Number, b: Number) -> Option<Number> {
    Some(match op {
        BinOp::Add => a + b,
        BinOp::Sub => a - b,
        BinOp::Mul => a * b,
        BinOp::Div => a / b,
        BinOp::Pow if b.is_integer() => a.pow_exact(b.value() as i64)?,
        _ => return None,
    })
}

/// Removes an identity element or absorbing element from a binary operation, if there is one.
fn collapse_identity(op: BinOp, lhs: Expr, rhs: Expr) -> Expr {
    match op {
        BinOp::Add if is_literal(&lhs, 0) => rhs,
        BinOp::Add if is_literal(&rhs, 0) => lhs,
        BinOp::Sub if is_literal(&rhs, 0) => lhs,
        BinOp::Sub if is_literal(&lhs, 0) => Expr::unary(UnaryOp::Neg, rhs),
        BinOp::Mul if is_literal(&lhs, 0) || is_literal(&rhs, 0) => Expr::integer(0),
        BinOp::Mul if is_literal(&lhs, 1) => rhs,
        BinOp::Mul if is_literal(&rhs, 1) => lhs,
        BinOp::Div if is_literal(&rhs, 1) => lhs,
        BinOp::Div if is_literal(&lhs, 1) => Expr::unary(UnaryOp::Recip, rhs),
        BinOp::Pow if is_literal(&rhs, 0) => Expr::integer(1),
        BinOp::Pow if is_literal(&lhs, 0) && !literal(&rhs).is_some_and(|n| n.is_negative()) => {
            Expr::integer(0)
        },
        BinOp::Pow if is_literal(&lhs, 1) => Expr::integer(1),
        BinOp::Pow if is_literal(&rhs, 1) => lhs,
        _ => Expr::binary(op, lhs, rhs),
    }
}

fn simplify_binary(binary: &Binary, options: &Options) -> Expr {
    let lhs = simplify_constants(&binary.lhs, options);
    let rhs = simplify_constants(&binary.rhs, options);

    if let (Some(a), Some(b)) = (literal(&lhs), literal(&rhs)) {
        if let Some(n) = fold_binary(binary.op, a, b) {
            return make_literal(n, options);
        }
    }
    collapse_identity(binary.op, lhs, rhs)
}

fn simplify_multi(multi: &Multi, options: &Options) -> Expr {
    let mut constant: Option<Number> = None;
    let mut rest = Vec::new();
    for operand in &multi.operands {
        let operand = simplify_constants(operand, options);
        match literal(&operand) {
            Some(n) => {
                constant = Some(match (constant, multi.op) {
                    (None, _) => n,
                    (Some(c), MultiOp::Add) => c + n,
                    (Some(c), MultiOp::Mul) => c * n,
                });
            },
            None => rest.push(operand),
        }
    }

    match (constant, multi.op) {
        (Some(c), MultiOp::Mul) if c.is_zero() => return Expr::integer(0),
        (Some(c), MultiOp::Add) if c.is_zero() && !rest.is_empty() => {},
        (Some(c), MultiOp::Mul) if c.is_one() && !rest.is_empty() => {},
        (Some(c), MultiOp::Add) => rest.push(make_literal(c, options)),
        (Some(c), MultiOp::Mul) => rest.insert(0, make_literal(c, options)),
        (None, _) => {},
    }

    match rest.len() {
        0 => Expr::integer(multi.op.identity()),
        1 => rest.remove(0),
        _ => Expr::multi(multi.op, rest),
    }
}

/// Folds every operation on literals into a single literal, and collapses identities such as
/// `x+0`, `1*x`, `x/1`, `x^0` and `x^1`.
///
/// Rational literals stay exact, including integer powers of rationals. In a sum, the folded
/// constant is placed last; in a product it is placed first.
pub fn simplify_constants(expr: &Expr, options: &Options) -> Expr {
    match expr {
        Expr::Scalar(n) => make_literal(*n, options),
        Expr::Variable(_) | Expr::Invalid(_) => expr.clone(),
        Expr::Index(index) => Expr::Index(Index {
            name: index.name.clone(),
            index: Box::new(simplify_constants(&index.index, options)),
        }),
        Expr::Unary(unary) => {
            let operand = simplify_constants(&unary.operand, options);
            match (unary.op, literal(&operand)) {
                (UnaryOp::Plus, _) => operand,
                (UnaryOp::Neg, Some(n)) => make_literal(-n, options),
                (UnaryOp::Recip, Some(n)) => make_literal(n.mult_inverse(), options),
                (op, None) => Expr::unary(op, operand),
            }
        },
        Expr::Binary(binary) => simplify_binary(binary, options),
        Expr::Multi(multi) => simplify_multi(multi, options),
        Expr::Function(function) => Expr::Function(Function {
            name: function.name.clone(),
            derivs: function.derivs,
            arg: Box::new(simplify_constants(&function.arg, options)),
        }),
        Expr::Derivative(derivative) => Expr::Derivative(Derivative {
            expr: Box::new(simplify_constants(&derivative.expr, options)),
            var: derivative.var.clone(),
            at: derivative.at.as_ref().map(|at| Box::new(simplify_constants(at, options))),
        }),
    }
}

#[cfg(test)]
mod tests {
    use btm_parser::parse;
    use pretty_assertions::assert_eq;
    use super::*;

    fn simplify(source: &str) -> String {
        simplify_constants(&parse(source), &Options::default()).to_string()
    }

    #[test]
    fn folds_literals() {
        assert_eq!(simplify("2+3*4"), "14");
        assert_eq!(simplify("1/3+1/6"), "1/2");
        assert_eq!(simplify("(2/3)^3"), "8/27");
        assert_eq!(simplify("2^-2"), "1/4");
        assert_eq!(simplify("x+2*3"), "x+6");
        assert_eq!(simplify("-(3)"), "-3");
        assert_eq!(simplify("/4"), "1/4");
    }

    #[test]
    fn keeps_irrational_powers() {
        assert_eq!(simplify("2^(1/2)"), "2^(1/2)");
        assert_eq!(simplify("0^(-1)"), "0^-1");
    }

    #[test]
    fn identities() {
        assert_eq!(simplify("x+0"), "x");
        assert_eq!(simplify("0+x"), "x");
        assert_eq!(simplify("0-x"), "-x");
        assert_eq!(simplify("x-0"), "x");
        assert_eq!(simplify("x*0"), "0");
        assert_eq!(simplify("0*x"), "0");
        assert_eq!(simplify("1*x"), "x");
        assert_eq!(simplify("x/1"), "x");
        assert_eq!(simplify("1/x"), "/x");
        assert_eq!(simplify("x^0"), "1");
        assert_eq!(simplify("x^1"), "x");
        assert_eq!(simplify("1^x"), "1");
        assert_eq!(simplify("0^x"), "0");
        assert_eq!(simplify("sin(x*(2-1))"), "sin(x)");
    }

    #[test]
    fn gathers_constants_in_multiops() {
        let sum = flatten(&parse("2+x+3+y"));
        assert_eq!(simplify_constants(&sum, &Options::default()).to_string(), "x+y+5");
        let product = flatten(&parse("x*2*y*3"));
        assert_eq!(simplify_constants(&product, &Options::default()).to_string(), "6*x*y");
        let zero = flatten(&parse("x*0*y"));
        assert_eq!(simplify_constants(&zero, &Options::default()), Expr::integer(0));
    }

    #[test]
    fn without_negative_numbers() {
        let options = Options { negative_numbers: false, ..Options::default() };
        let result = simplify_constants(&parse("2-5"), &options);
        assert_eq!(result, Expr::unary(UnaryOp::Neg, Expr::integer(3)));
        assert_eq!(simplify_constants(&result, &options), result);
    }

    #[test]
    fn idempotent() {
        for source in ["2+3*x-0", "x^1*(4/2)", "(1+1)*y+0*z", "-(-(3))+/x", "D(x^(1+1),x)"] {
            let once = simplify_constants(&parse(source), &Options::default());
            let twice = simplify_constants(&once, &Options::default());
            assert_eq!(once, twice, "{}", source);
        }
    }
}
