use super::Expr;

/// An iterator that traverses the tree of expressions in left-to-right pre-order (i.e. each node
/// is visited before its children).
///
/// This iterator is created by [`Expr::iter`].
pub struct ExprIter<'a> {
    stack: Vec<&'a Expr>,
}

impl<'a> ExprIter<'a> {
    /// Creates a new iterator that traverses the tree of expressions in left-to-right pre-order.
    pub fn new(expr: &'a Expr) -> Self {
        Self { stack: vec![expr] }
    }
}

impl<'a> Iterator for ExprIter<'a> {
    type Item = &'a Expr;

    fn next(&mut self) -> Option<Self::Item> {
        let expr = self.stack.pop()?;
        for child in expr.children().into_iter().rev() {
            self.stack.push(child);
        }
        Some(expr)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::super::{BinOp, UnaryOp};
    use super::*;

    #[test]
    fn pre_order() {
        // (a + -b) * c
        let expr = Expr::binary(
            BinOp::Mul,
            Expr::binary(BinOp::Add, Expr::var("a"), Expr::unary(UnaryOp::Neg, Expr::var("b"))),
            Expr::var("c"),
        );
        let names = expr.iter()
            .filter_map(|expr| expr.as_variable())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(expr.iter().count(), 6);
    }
}
