//! Substitution of expressions for the free names of another expression.

use btm_parser::{
    expr::{BinOp, Derivative, Function, Index},
    Expr,
    NameScope,
    Parser,
    ParserConfig,
};
use std::collections::HashMap;

/// The value substituted for a name.
#[derive(Debug, Clone, PartialEq)]
pub enum Substitution {
    /// A formula, parsed when it is substituted.
    Text(String),

    /// An expression tree.
    Expr(Expr),
}

impl From<Expr> for Substitution {
    fn from(expr: Expr) -> Self {
        Substitution::Expr(expr)
    }
}

impl From<&str> for Substitution {
    fn from(text: &str) -> Self {
        Substitution::Text(text.to_string())
    }
}

impl From<String> for Substitution {
    fn from(text: String) -> Self {
        Substitution::Text(text)
    }
}

impl Substitution {
    /// Returns the substituted expression, parsing text with the names bound in `scope`.
    pub fn to_expr<S: NameScope + ?Sized>(&self, scope: &S) -> Expr {
        match self {
            Substitution::Text(text) => Parser::new(scope, ParserConfig::default()).parse(text),
            Substitution::Expr(expr) => expr.clone(),
        }
    }
}

/// Applies an arithmetic operator to two literals.
fn fold_literals(op: BinOp, lhs: &Expr, rhs: &Expr) -> Option<Expr> {
    let (a, b) = (lhs.as_number()?, rhs.as_number()?);
    let number = match op {
        BinOp::Add => a + b,
        BinOp::Sub => a - b,
        BinOp::Mul => a * b,
        BinOp::Div => a / b,
        _ => return None,
    };
    Some(Expr::number(number))
}

/// Returns a new expression in which every free name bound in `bindings` is replaced by its
/// substitution.
///
/// Sums, differences, products and quotients of two literals that result from the substitution
/// are folded into one literal. The variable of a derivative operator is not substituted inside
/// the expression being differentiated.
pub fn compose<S: NameScope + ?Sized>(expr: &Expr, bindings: &HashMap<String, Substitution>, scope: &S) -> Expr {
    match expr {
        Expr::Scalar(_) | Expr::Invalid(_) => expr.clone(),
        Expr::Variable(var) => match bindings.get(&var.name) {
            Some(substitution) => substitution.to_expr(scope),
            None => expr.clone(),
        },
        Expr::Index(index) => Expr::Index(Index {
            name: index.name.clone(),
            index: Box::new(compose(&index.index, bindings, scope)),
        }),
        Expr::Unary(unary) => Expr::unary(unary.op, compose(&unary.operand, bindings, scope)),
        Expr::Binary(binary) => {
            let lhs = compose(&binary.lhs, bindings, scope);
            let rhs = compose(&binary.rhs, bindings, scope);
            fold_literals(binary.op, &lhs, &rhs)
                .unwrap_or_else(|| Expr::binary(binary.op, lhs, rhs))
        },
        Expr::Multi(multi) => {
            let mut operands = multi.operands.iter()
                .map(|operand| compose(operand, bindings, scope))
                .collect::<Vec<_>>();
            match operands.len() {
                0 => Expr::integer(multi.op.identity()),
                1 => operands.remove(0),
                _ => Expr::multi(multi.op, operands),
            }
        },
        Expr::Function(function) => Expr::Function(Function {
            name: function.name.clone(),
            derivs: function.derivs,
            arg: Box::new(compose(&function.arg, bindings, scope)),
        }),
        Expr::Derivative(derivative) => {
            let inner = if bindings.contains_key(&derivative.var) {
                let mut inner = bindings.clone();
                inner.remove(&derivative.var);
                compose(&derivative.expr, &inner, scope)
            } else {
                compose(&derivative.expr, bindings, scope)
            };
            Expr::Derivative(Derivative {
                expr: Box::new(inner),
                var: derivative.var.clone(),
                at: derivative.at.as_ref().map(|at| Box::new(compose(at, bindings, scope))),
            })
        },
    }
}

#[cfg(test)]
mod tests {
    use btm_parser::{expr::MultiOp, parse};
    use pretty_assertions::assert_eq;
    use super::*;

    fn bind(pairs: &[(&str, Substitution)]) -> HashMap<String, Substitution> {
        pairs.iter().map(|(name, s)| (name.to_string(), s.clone())).collect()
    }

    #[test]
    fn text_is_parsed() {
        let bindings = bind(&[("x", "y+1".into())]);
        assert_eq!(compose(&parse("2*x"), &bindings, &()).to_string(), "2*(y+1)");
    }

    #[test]
    fn literals_fold() {
        let bindings = bind(&[("a", Expr::integer(2).into()), ("b", Expr::integer(3).into())]);
        assert_eq!(compose(&parse("a*b+x"), &bindings, &()).to_string(), "6+x");
        assert_eq!(compose(&parse("a/b"), &bindings, &()).to_string(), "2/3");
        assert_eq!(compose(&parse("a^b"), &bindings, &()).to_string(), "2^3");
    }

    #[test]
    fn multi_collapses() {
        let expr = Expr::multi(MultiOp::Add, vec![Expr::var("x")]);
        let bindings = bind(&[("x", "sin(t)".into())]);
        assert_eq!(compose(&expr, &bindings, &()).to_string(), "sin(t)");
        assert_eq!(compose(&Expr::multi(MultiOp::Mul, vec![]), &bindings, &()), Expr::integer(1));
    }

    #[test]
    fn derivative_variable_is_not_substituted() {
        let bindings = bind(&[("x", Expr::integer(2).into()), ("a", Expr::integer(5).into())]);
        let expr = compose(&parse("D(a*x^2,x,x)"), &bindings, &());
        assert_eq!(expr.to_string(), "D(5*x^2,x,2)");
    }
}
