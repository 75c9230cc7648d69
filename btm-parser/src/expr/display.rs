//! Canonical, input-style formatting of expressions. The output of [`Display`] parses back into
//! an equivalent expression.

use std::fmt::{Display, Formatter, Result};
use super::{BinOp, Expr, ExprKind, Precedence};

/// Returns true if the literal must be grouped when it is an operand of an operator with the
/// given precedence, since its text contains a `/`.
fn is_fraction_literal(expr: &Expr, parent: Precedence) -> bool {
    match expr {
        Expr::Scalar(number) => !number.is_integer() && number.is_rational() && Precedence::Factor <= parent,
        _ => false,
    }
}

/// Returns true if the operand needs parentheses when written as the left operand (or the only
/// operand) of an operator with the given precedence.
pub(super) fn needs_parens_left(expr: &Expr, parent: Precedence) -> bool {
    (expr.kind() >= ExprKind::Unary && expr.precedence() < parent)
        || is_fraction_literal(expr, parent)
}

/// Returns true if the operand needs parentheses when written as the right operand of an
/// operator with the given precedence.
pub(super) fn needs_parens_right(expr: &Expr, parent: Precedence) -> bool {
    (expr.kind() >= ExprKind::Unary && expr.precedence() <= parent)
        || is_fraction_literal(expr, parent)
}

/// Returns true if the expression is a negative literal, which reads as a negation when written
/// as the base of a power.
pub(super) fn is_negative_literal(expr: &Expr) -> bool {
    matches!(expr, Expr::Scalar(number) if number.is_negative())
}

/// Writes the expression, wrapped in parentheses if requested.
fn fmt_grouped(f: &mut Formatter, expr: &Expr, grouped: bool) -> Result {
    if grouped {
        write!(f, "({})", expr)
    } else {
        write!(f, "{}", expr)
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            Expr::Scalar(number) => write!(f, "{}", number),
            Expr::Variable(var) => write!(f, "{}", var.name),
            Expr::Index(index) => write!(f, "{}[{}]", index.name, index.index),
            Expr::Unary(unary) => {
                write!(f, "{}", unary.op)?;
                fmt_grouped(f, &unary.operand, needs_parens_left(&unary.operand, unary.op.precedence()))
            },
            Expr::Binary(binary) => {
                let prec = binary.op.precedence();
                let left_grouped = needs_parens_left(&binary.lhs, prec)
                    || (binary.op == BinOp::Pow && is_negative_literal(&binary.lhs));
                fmt_grouped(f, &binary.lhs, left_grouped)?;
                write!(f, "{}", binary.op)?;
                fmt_grouped(f, &binary.rhs, needs_parens_right(&binary.rhs, prec))
            },
            Expr::Multi(multi) => {
                if multi.operands.is_empty() {
                    return write!(f, "{}", multi.op.identity());
                }
                let prec = multi.op.precedence();
                for (i, operand) in multi.operands.iter().enumerate() {
                    if i > 0 {
                        write!(f, "{}", multi.op)?;
                    }
                    fmt_grouped(f, operand, needs_parens_right(operand, prec))?;
                }
                Ok(())
            },
            Expr::Function(function) => write!(f, "{}({})", function.full_name(), function.arg),
            Expr::Derivative(derivative) => {
                write!(f, "D({},{}", derivative.expr, derivative.var)?;
                if let Some(at) = &derivative.at {
                    write!(f, ",{}", at)?;
                }
                write!(f, ")")
            },
            Expr::Invalid(invalid) => match &invalid.partial {
                Some(partial) => write!(f, "{}", partial),
                None => write!(f, "?"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use crate::{expr::{MultiOp, UnaryOp}, number::Number};
    use super::*;

    fn x() -> Expr {
        Expr::var("x")
    }

    #[test]
    fn minimal_parentheses() {
        // (x + 1) * x
        let expr = Expr::binary(
            BinOp::Mul,
            Expr::binary(BinOp::Add, x(), Expr::integer(1)),
            x(),
        );
        assert_eq!(expr.to_string(), "(x+1)*x");

        // x - (x - 1)
        let expr = Expr::binary(
            BinOp::Sub,
            x(),
            Expr::binary(BinOp::Sub, x(), Expr::integer(1)),
        );
        assert_eq!(expr.to_string(), "x-(x-1)");

        // (x - x) - 1
        let expr = Expr::binary(
            BinOp::Sub,
            Expr::binary(BinOp::Sub, x(), x()),
            Expr::integer(1),
        );
        assert_eq!(expr.to_string(), "x-x-1");
    }

    #[test]
    fn fraction_literals() {
        let expr = Expr::binary(BinOp::Mul, Expr::number(Number::rational(1, 2)), x());
        assert_eq!(expr.to_string(), "(1/2)*x");

        let expr = Expr::binary(BinOp::Add, Expr::number(Number::rational(1, 2)), x());
        assert_eq!(expr.to_string(), "1/2+x");
    }

    #[test]
    fn negative_base() {
        let expr = Expr::binary(BinOp::Pow, Expr::integer(-3), Expr::integer(2));
        assert_eq!(expr.to_string(), "(-3)^2");

        let expr = Expr::binary(BinOp::Pow, Expr::unary(UnaryOp::Neg, x()), Expr::integer(2));
        assert_eq!(expr.to_string(), "(-x)^2");
    }

    #[test]
    fn multi() {
        let expr = Expr::multi(MultiOp::Mul, vec![
            Expr::integer(2),
            Expr::multi(MultiOp::Add, vec![x(), Expr::integer(1)]),
            Expr::unary(UnaryOp::Neg, x()),
        ]);
        assert_eq!(expr.to_string(), "2*(x+1)*(-x)");
        assert_eq!(Expr::multi(MultiOp::Mul, vec![]).to_string(), "1");
    }

    #[test]
    fn functions_and_derivatives() {
        let expr = Expr::function("f''", Expr::binary(BinOp::Mul, Expr::integer(2), x()));
        assert_eq!(expr.to_string(), "f''(2*x)");

        let expr = Expr::derivative(Expr::binary(BinOp::Pow, x(), Expr::integer(2)), "x", Some(Expr::integer(3)));
        assert_eq!(expr.to_string(), "D(x^2,x,3)");
    }
}
