//! The expression tree produced by the parser.
//!
//! An [`Expr`] is a closed set of node variants. Every other component of the engine (evaluation,
//! differentiation, simplification, pattern matching) dispatches over this enum exhaustively.
//!
//! Parse problems are part of the tree: an [`Expr::Invalid`] node stands in for the part of the
//! formula that could not be understood, carrying the [`ParseIssue`] and whatever partial
//! expression could be recovered. Use [`Expr::has_parsing_error`] before trusting a tree.

mod display;
mod iter;
mod mathml;
pub mod op;
mod tex;

pub use iter::ExprIter;
pub use op::{BinOp, MultiOp, Precedence, UnaryOp, ValueType};

use crate::{number::Number, parser::error::ParseIssue};
use once_cell::sync::Lazy;
use std::collections::HashSet;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Names of variables that represent mathematical constants instead of free symbols.
pub const SPECIAL_CONSTANTS: [&str; 4] = ["e", "pi", "inf", "dne"];

/// Names of the builtin functions.
pub static BUILTIN_FUNCTIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "sin", "cos", "tan", "csc", "sec", "cot",
        "arcsin", "arccos", "arctan", "arcsec", "arccsc", "arccot",
        "sqrt", "abs", "exp", "expb", "ln", "log10",
    ].into_iter().collect()
});

/// Returns the canonical name of a function, resolving aliases such as `asin` or `log`.
pub fn canonical_function_name(name: &str) -> &str {
    match name {
        "asin" => "arcsin",
        "acos" => "arccos",
        "atan" => "arctan",
        "asec" => "arcsec",
        "acsc" => "arccsc",
        "acot" => "arccot",
        "log" => "ln",
        _ => name,
    }
}

/// The different kinds of nodes, in the order used to decide parenthesization and to sort the
/// factors of a flattened product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ExprKind {
    Number,
    Variable,
    Function,
    Unary,
    Binary,
    Multi,
    Operator,
}

/// A named value, such as `x`, `pi`, or `y'`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Variable {
    /// The name of the variable, including any trailing primes.
    pub name: String,
}

impl Variable {
    /// Creates a new variable.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Returns true if the variable is one of the special constants `e`, `pi`, `inf` or `dne`.
    pub fn is_special(&self) -> bool {
        SPECIAL_CONSTANTS.contains(&self.name.as_str())
    }

    /// Returns the number of trailing primes on the name.
    pub fn primes(&self) -> usize {
        self.name.chars().rev().take_while(|&c| c == '\'').count()
    }
}

/// A reference into a sequence, such as `a[k+1]`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Index {
    /// The name of the sequence.
    pub name: String,

    /// The index expression. It depends on at most one symbol.
    pub index: Box<Expr>,
}

impl Index {
    /// Returns the symbol the index depends on, if any.
    pub fn symbol(&self) -> Option<String> {
        self.index.dependencies().into_iter().next()
    }
}

/// A unary operation, such as `-x` or `/x`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Unary {
    pub op: UnaryOp,
    pub operand: Box<Expr>,
}

/// A binary operation, such as `x^2` or `a = b`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Binary {
    pub op: BinOp,
    pub lhs: Box<Expr>,
    pub rhs: Box<Expr>,
}

/// A sum or product over any number of operands.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Multi {
    pub op: MultiOp,
    pub operands: Vec<Expr>,
}

/// A call to a named function of one argument, such as `sin(x)` or `f''(t)`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Function {
    /// The canonical name of the function, without primes.
    pub name: String,

    /// The number of derivatives taken of the function.
    pub derivs: usize,

    /// The argument.
    pub arg: Box<Expr>,
}

impl Function {
    /// Creates a function call. Trailing primes on the name set the derivative order, and aliases
    /// such as `log` resolve to their canonical name.
    pub fn new(name: &str, arg: Expr) -> Self {
        let base = name.trim_end_matches('\'');
        let derivs = name.len() - base.len();
        Self {
            name: canonical_function_name(base).to_string(),
            derivs,
            arg: Box::new(arg),
        }
    }

    /// Returns true if this is one of the builtin functions.
    pub fn is_builtin(&self) -> bool {
        BUILTIN_FUNCTIONS.contains(self.name.as_str())
    }

    /// Returns the name of the function including its primes.
    pub fn full_name(&self) -> String {
        format!("{}{}", self.name, "'".repeat(self.derivs))
    }
}

/// The derivative operator, `D(expr, var)` or `D(expr, var, at)`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Derivative {
    /// The expression to differentiate.
    pub expr: Box<Expr>,

    /// The independent variable.
    pub var: String,

    /// The point at which the derivative is evaluated, if any.
    pub at: Option<Box<Expr>>,
}

/// A part of the formula that could not be parsed.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Invalid {
    /// The problem that was found.
    pub issue: ParseIssue,

    /// The part of the expression that could still be recovered.
    pub partial: Option<Box<Expr>>,
}

/// An expression tree.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Expr {
    /// A numeric literal.
    Scalar(Number),

    /// A named value.
    Variable(Variable),

    /// A reference into a sequence.
    Index(Index),

    /// A unary operation.
    Unary(Unary),

    /// A binary operation.
    Binary(Binary),

    /// A flattened sum or product.
    Multi(Multi),

    /// A function call.
    Function(Function),

    /// The derivative operator.
    Derivative(Derivative),

    /// A part of the formula that could not be parsed.
    Invalid(Invalid),
}

impl Default for Expr {
    fn default() -> Self {
        Expr::integer(0)
    }
}

impl From<Number> for Expr {
    fn from(number: Number) -> Self {
        Expr::Scalar(number)
    }
}

impl Expr {
    /// Creates a numeric literal.
    pub fn number(number: Number) -> Self {
        Expr::Scalar(number)
    }

    /// Creates an integer literal.
    pub fn integer(n: i64) -> Self {
        Expr::Scalar(Number::integer(n))
    }

    /// Creates a variable.
    pub fn var(name: impl Into<String>) -> Self {
        Expr::Variable(Variable::new(name))
    }

    /// Creates a unary operation.
    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Expr::Unary(Unary { op, operand: Box::new(operand) })
    }

    /// Creates a binary operation.
    pub fn binary(op: BinOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary(Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) })
    }

    /// Creates a sum or product over the given operands.
    pub fn multi(op: MultiOp, operands: Vec<Expr>) -> Self {
        Expr::Multi(Multi { op, operands })
    }

    /// Creates a function call, resolving primes and aliases in the name.
    pub fn function(name: &str, arg: Expr) -> Self {
        Expr::Function(Function::new(name, arg))
    }

    /// Creates a derivative operator.
    pub fn derivative(expr: Expr, var: impl Into<String>, at: Option<Expr>) -> Self {
        Expr::Derivative(Derivative {
            expr: Box::new(expr),
            var: var.into(),
            at: at.map(Box::new),
        })
    }

    /// Creates a node recording a parse issue.
    pub fn invalid(issue: ParseIssue, partial: Option<Expr>) -> Self {
        Expr::Invalid(Invalid { issue, partial: partial.map(Box::new) })
    }

    /// Returns the kind of this node.
    pub fn kind(&self) -> ExprKind {
        match self {
            Expr::Scalar(_) => ExprKind::Number,
            Expr::Variable(_) | Expr::Index(_) => ExprKind::Variable,
            Expr::Function(_) => ExprKind::Function,
            Expr::Unary(_) => ExprKind::Unary,
            Expr::Binary(_) => ExprKind::Binary,
            Expr::Multi(_) => ExprKind::Multi,
            Expr::Derivative(_) => ExprKind::Operator,
            Expr::Invalid(invalid) => invalid.partial.as_ref()
                .map(|partial| partial.kind())
                .unwrap_or(ExprKind::Number),
        }
    }

    /// Returns the precedence of the operation at the root of this node.
    pub fn precedence(&self) -> Precedence {
        match self {
            Expr::Unary(unary) => unary.op.precedence(),
            Expr::Binary(binary) => binary.op.precedence(),
            Expr::Multi(multi) => multi.op.precedence(),
            Expr::Invalid(Invalid { partial: Some(partial), .. }) => partial.precedence(),
            _ => Precedence::Function,
        }
    }

    /// Returns the kind of value this expression produces.
    pub fn value_type(&self) -> ValueType {
        match self {
            Expr::Binary(binary) => binary.op.value_type(),
            _ => ValueType::Numeric,
        }
    }

    /// Returns the number, if this expression is a numeric literal.
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Expr::Scalar(number) => Some(*number),
            _ => None,
        }
    }

    /// Returns the name, if this expression is a variable.
    pub fn as_variable(&self) -> Option<&str> {
        match self {
            Expr::Variable(var) => Some(&var.name),
            _ => None,
        }
    }

    /// Returns the operator family of this expression, if it is a sum, difference, product or
    /// quotient.
    pub fn family(&self) -> Option<MultiOp> {
        match self {
            Expr::Binary(binary) => binary.op.family(),
            Expr::Multi(multi) => Some(multi.op),
            _ => None,
        }
    }

    /// Returns the direct children of this node, in order.
    pub fn children(&self) -> Vec<&Expr> {
        match self {
            Expr::Scalar(_) | Expr::Variable(_) => Vec::new(),
            Expr::Index(index) => vec![&*index.index],
            Expr::Unary(unary) => vec![&*unary.operand],
            Expr::Binary(binary) => vec![&*binary.lhs, &*binary.rhs],
            Expr::Multi(multi) => multi.operands.iter().collect(),
            Expr::Function(function) => vec![&*function.arg],
            Expr::Derivative(derivative) => {
                let mut children = vec![&*derivative.expr];
                if let Some(at) = &derivative.at {
                    children.push(&**at);
                }
                children
            },
            Expr::Invalid(invalid) => invalid.partial.iter().map(|partial| &**partial).collect(),
        }
    }

    /// Returns mutable references to the direct children of this node, in order.
    pub fn children_mut(&mut self) -> Vec<&mut Expr> {
        match self {
            Expr::Scalar(_) | Expr::Variable(_) => Vec::new(),
            Expr::Index(index) => vec![&mut *index.index],
            Expr::Unary(unary) => vec![&mut *unary.operand],
            Expr::Binary(binary) => vec![&mut *binary.lhs, &mut *binary.rhs],
            Expr::Multi(multi) => multi.operands.iter_mut().collect(),
            Expr::Function(function) => vec![&mut *function.arg],
            Expr::Derivative(derivative) => {
                let mut children = vec![&mut *derivative.expr];
                if let Some(at) = &mut derivative.at {
                    children.push(&mut **at);
                }
                children
            },
            Expr::Invalid(invalid) => invalid.partial.iter_mut().map(|partial| &mut **partial).collect(),
        }
    }

    /// Returns true if the roots of both expressions are the same kind of node with the same
    /// operator, so that their children can be compared pairwise.
    pub fn same_head(&self, other: &Expr) -> bool {
        match (self, other) {
            (Expr::Scalar(a), Expr::Scalar(b)) => a == b,
            (Expr::Variable(a), Expr::Variable(b)) => a.name == b.name,
            (Expr::Index(a), Expr::Index(b)) => a.name == b.name,
            (Expr::Unary(a), Expr::Unary(b)) => a.op == b.op,
            (Expr::Binary(a), Expr::Binary(b)) => a.op == b.op,
            (Expr::Multi(a), Expr::Multi(b)) => a.op == b.op,
            (Expr::Function(a), Expr::Function(b)) => a.name == b.name && a.derivs == b.derivs,
            (Expr::Derivative(a), Expr::Derivative(b)) => {
                a.var == b.var && a.at.is_some() == b.at.is_some()
            },
            _ => false,
        }
    }

    /// Returns an iterator that traverses the tree in pre-order.
    pub fn iter(&self) -> ExprIter<'_> {
        ExprIter::new(self)
    }

    /// Returns true if this expression or any of its descendants could not be parsed.
    pub fn has_parsing_error(&self) -> bool {
        self.parsing_error().is_some()
    }

    /// Returns the first parse issue found in a pre-order traversal of the tree.
    pub fn parsing_error(&self) -> Option<&ParseIssue> {
        self.iter().find_map(|expr| match expr {
            Expr::Invalid(invalid) => Some(&invalid.issue),
            _ => None,
        })
    }

    /// Returns the free symbols this expression depends on, in order of first appearance.
    ///
    /// The special constants are not free symbols. A derivative evaluated at a point does not
    /// depend on its own variable.
    pub fn dependencies(&self) -> Vec<String> {
        let mut deps = Vec::new();
        self.collect_dependencies(&mut deps);
        deps
    }

    fn collect_dependencies(&self, deps: &mut Vec<String>) {
        match self {
            Expr::Variable(var) => {
                if !var.is_special() && !deps.contains(&var.name) {
                    deps.push(var.name.clone());
                }
            },
            Expr::Derivative(Derivative { expr, var, at: Some(at) }) => {
                let mut inner = Vec::new();
                expr.collect_dependencies(&mut inner);
                at.collect_dependencies(&mut inner);
                for name in inner {
                    if &name != var && !deps.contains(&name) {
                        deps.push(name);
                    }
                }
            },
            _ => {
                for child in self.children() {
                    child.collect_dependencies(deps);
                }
            },
        }
    }

    /// Returns true if the expression has the same value regardless of any bindings.
    pub fn is_constant(&self) -> bool {
        match self {
            Expr::Scalar(_) => true,
            Expr::Variable(var) => var.is_special(),
            Expr::Index(_) | Expr::Invalid(_) => false,
            _ => self.children().into_iter().all(Expr::is_constant),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    fn x() -> Expr {
        Expr::var("x")
    }

    #[test]
    fn function_names() {
        let f = Function::new("asin", x());
        assert_eq!(f.name, "arcsin");
        assert!(f.is_builtin());

        let g = Function::new("g''", x());
        assert_eq!(g.name, "g");
        assert_eq!(g.derivs, 2);
        assert_eq!(g.full_name(), "g''");
        assert!(!g.is_builtin());
    }

    #[test]
    fn dependencies_in_order() {
        let expr = Expr::binary(
            BinOp::Add,
            Expr::binary(BinOp::Mul, Expr::var("b"), Expr::var("pi")),
            Expr::function("sin", Expr::binary(BinOp::Mul, Expr::var("a"), Expr::var("b"))),
        );
        assert_eq!(expr.dependencies(), vec!["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn derivative_at_point_hides_variable() {
        let expr = Expr::derivative(
            Expr::binary(BinOp::Mul, x(), Expr::var("y")),
            "x",
            Some(Expr::integer(2)),
        );
        assert_eq!(expr.dependencies(), vec!["y".to_string()]);
    }

    #[test]
    fn constants() {
        assert!(Expr::binary(BinOp::Pow, Expr::var("e"), Expr::integer(2)).is_constant());
        assert!(!Expr::binary(BinOp::Pow, x(), Expr::integer(2)).is_constant());
        assert!(Expr::multi(MultiOp::Add, vec![]).is_constant());
    }

    #[test]
    fn value_types() {
        assert_eq!(Expr::binary(BinOp::Eq, x(), x()).value_type(), ValueType::Boolean);
        assert_eq!(Expr::binary(BinOp::Sub, x(), x()).value_type(), ValueType::Numeric);
    }

    #[test]
    fn kind_ordering() {
        assert!(ExprKind::Number < ExprKind::Variable);
        assert!(ExprKind::Function < ExprKind::Unary);
        assert!(ExprKind::Multi < ExprKind::Operator);
        assert!(Precedence::Term < Precedence::Factor);
    }
}
