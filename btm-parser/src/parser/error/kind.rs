use ariadne::Fmt;
use btm_attrs::ErrorKind;
use btm_error::EXPR;

/// An operator was missing one of its operands.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("incomplete formula: missing value for `{}`", op),
    labels = [format!("this operator needs another {}", "value".fg(EXPR))],
)]
pub struct MissingValue {
    /// The operator that is missing an operand.
    pub op: char,
}

/// Two operators appeared next to each other.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "consecutive operators",
    labels = ["this operator follows another operator"],
    help = format!("only `{}` and `{}` may directly follow another operator", "-".fg(EXPR), "/".fg(EXPR)),
)]
pub struct ConsecutiveOperators;

/// A subscript contained another pair of brackets.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "nested brackets used for subscripts are not supported",
    labels = ["this subscript"],
)]
pub struct NestedSubscript;

/// A decimal number was written where only whole numbers are allowed.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "whole numbers only",
    labels = ["this number has a decimal point"],
    help = "no decimal values are allowed here",
)]
pub struct WholeNumbersOnly;

/// The index of an array reference depended on more than one symbol.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "an array reference can only have one index variable",
    labels = [format!("this index depends on {}", names.join(", ").fg(EXPR))],
)]
pub struct MultipleIndexVariables {
    /// The symbols the index depends on.
    pub names: Vec<String>,
}

/// A grouping symbol was never closed.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("unbalanced grouping: missing `{}`", close),
    labels = ["this group is not closed"],
    help = format!("add a closing `{}` somewhere after this", close.fg(EXPR)),
)]
pub struct Unbalanced {
    /// The missing closing symbol.
    pub close: char,
}

/// A symbol that has no meaning in a formula.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("unrecognized symbol `{}`", symbol),
    labels = ["here"],
)]
pub struct UnrecognizedSymbol {
    /// The symbol that was found.
    pub symbol: String,
}

/// The second argument of the derivative operator was not a variable name.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "the derivative operator needs a variable name",
    labels = ["expected a variable here"],
    help = format!("write the derivative as {}", "D(expression, variable)".fg(EXPR)),
)]
pub struct DerivativeVariable;

/// There was nothing to parse.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "incomplete formula: missing expression",
    labels = [format!("add an {} here", "expression".fg(EXPR))],
)]
pub struct EmptyExpression;

/// A formula parsed in a numeric context depended on variables.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "the expression should be a constant but depends on variables",
    labels = ["this expression"],
)]
pub struct NotConstant;
