use btm_parser::{
    expr::{Derivative, Function, Index, MultiOp, UnaryOp},
    Expr,
};

/// The inverse used when an operand is moved out of a subtracted or divided group.
fn inverse(family: MultiOp) -> UnaryOp {
    match family {
        MultiOp::Add => UnaryOp::Neg,
        MultiOp::Mul => UnaryOp::Recip,
    }
}

/// Applies the inverse of the family to an operand, cancelling a double inverse.
fn invert(e: Expr, family: MultiOp) -> Expr {
    let op = inverse(family);
    match e {
        Expr::Unary(unary) if unary.op == op => *unary.operand,
        e => Expr::unary(op, e),
    }
}

/// Pushes the flattened operands of `e` that belong to the given family onto `out`.
fn collect(e: &Expr, family: MultiOp, out: &mut Vec<Expr>) {
    match e {
        Expr::Binary(binary) if binary.op.family() == Some(family) => {
            collect(&binary.lhs, family, out);
            if binary.op == family.as_binary() {
                collect(&binary.rhs, family, out);
            } else {
                // distribute the inverse over a subtracted or divided group
                match flatten(&binary.rhs) {
                    Expr::Multi(multi) if multi.op == family => {
                        out.extend(multi.operands.into_iter().map(|operand| invert(operand, family)));
                    },
                    rhs => out.push(invert(rhs, family)),
                }
            }
        },
        Expr::Multi(multi) if multi.op == family => {
            for operand in &multi.operands {
                collect(operand, family, out);
            }
        },
        _ => match flatten(e) {
            Expr::Multi(multi) if multi.op == family => out.extend(multi.operands),
            e => out.push(e),
        },
    }
}

/// Builds the n-ary node for a family from its operands.
fn build(family: MultiOp, mut operands: Vec<Expr>) -> Expr {
    if family == MultiOp::Mul {
        // stable, so that operands of the same kind keep their order
        operands.sort_by_key(Expr::kind);
    }
    match operands.len() {
        0 => Expr::integer(family.identity()),
        1 => operands.remove(0),
        _ => Expr::multi(family, operands),
    }
}

/// Rewrites chains of `+`/`-` and `*`/`/` as n-ary sums and products.
///
/// A subtracted group has its negation distributed over its terms, and a divided group has its
/// reciprocal distributed over its factors: `a-(b+c)` flattens to the sum of `a`, `-b` and `-c`.
/// The factors of a product are sorted by the kind of node they are.
pub fn flatten(expr: &Expr) -> Expr {
    match expr {
        Expr::Scalar(_) | Expr::Variable(_) | Expr::Invalid(_) => expr.clone(),
        Expr::Binary(binary) => match binary.op.family() {
            Some(family) => {
                let mut operands = Vec::new();
                collect(expr, family, &mut operands);
                build(family, operands)
            },
            None => Expr::binary(binary.op, flatten(&binary.lhs), flatten(&binary.rhs)),
        },
        Expr::Multi(multi) => {
            let mut operands = Vec::new();
            collect(expr, multi.op, &mut operands);
            build(multi.op, operands)
        },
        Expr::Unary(unary) => Expr::unary(unary.op, flatten(&unary.operand)),
        Expr::Index(index) => Expr::Index(Index {
            name: index.name.clone(),
            index: Box::new(flatten(&index.index)),
        }),
        Expr::Function(function) => Expr::Function(Function {
            name: function.name.clone(),
            derivs: function.derivs,
            arg: Box::new(flatten(&function.arg)),
        }),
        Expr::Derivative(derivative) => Expr::Derivative(Derivative {
            expr: Box::new(flatten(&derivative.expr)),
            var: derivative.var.clone(),
            at: derivative.at.as_ref().map(|at| Box::new(flatten(at))),
        }),
    }
}

/// Returns the operands of the top-level sum or product of a flattened expression. Any other
/// expression is its own single operand.
pub fn flattened_operands(expr: &Expr) -> Vec<Expr> {
    match flatten(expr) {
        Expr::Multi(multi) => multi.operands,
        e => vec![e],
    }
}

#[cfg(test)]
mod tests {
    use btm_parser::parse;
    use pretty_assertions::assert_eq;
    use super::*;

    #[test]
    fn sums() {
        let expr = flatten(&parse("a+(b+c)+d"));
        assert_eq!(expr, Expr::multi(MultiOp::Add, vec![
            Expr::var("a"),
            Expr::var("b"),
            Expr::var("c"),
            Expr::var("d"),
        ]));
    }

    #[test]
    fn subtraction_distributes() {
        let expr = flatten(&parse("a-(b+c-d)"));
        assert_eq!(expr.to_string(), "a+-b+-c+d");
    }

    #[test]
    fn division_distributes() {
        let expr = flatten(&parse("a/(b*c)"));
        assert_eq!(expr, Expr::multi(MultiOp::Mul, vec![
            Expr::var("a"),
            Expr::unary(UnaryOp::Recip, Expr::var("b")),
            Expr::unary(UnaryOp::Recip, Expr::var("c")),
        ]));
    }

    #[test]
    fn products_sort_by_kind() {
        let expr = flatten(&parse("(x+1)*sin(x)*y*3"));
        assert_eq!(expr.to_string(), "3*y*sin(x)*(x+1)");
    }

    #[test]
    fn nested_inside_other_nodes() {
        let expr = flatten(&parse("sin(a+b+c)^(x*y*z)"));
        assert_eq!(expr.to_string(), "sin(a+b+c)^(x*y*z)");
        assert!(matches!(&expr, Expr::Binary(b) if matches!(&*b.rhs, Expr::Multi(_))));
    }

    #[test]
    fn idempotent() {
        for source in ["a-(b-(c+d))", "x/(y/z)*w", "2*(a+b)-3*(c-d)", "-(a+b)/(c*d*e)"] {
            let once = flatten(&parse(source));
            assert_eq!(flatten(&once), once, "{}", source);
        }
    }
}
