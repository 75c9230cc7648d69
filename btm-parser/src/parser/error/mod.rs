//! Problems found while parsing a formula.
//!
//! Parsing never fails outright. Each problem is recorded as a [`ParseIssue`] on an
//! [`Expr::Invalid`](crate::expr::Expr::Invalid) node in the resulting tree, and parsing continues
//! around it. An issue can be turned into a reportable [`Error`] with [`ParseIssue::to_error`].

pub mod kind;

use btm_error::Error;
use std::{fmt, ops::Range};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The kind of problem that was found.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum IssueKind {
    /// An operator was missing an operand.
    MissingValue { op: char },

    /// Two operators appeared next to each other.
    ConsecutiveOperators,

    /// A subscript contained nested brackets.
    NestedSubscript,

    /// A decimal number appeared where only whole numbers are allowed.
    WholeNumbersOnly,

    /// An index depended on more than one symbol.
    MultipleIndexVariables { names: Vec<String> },

    /// A grouping symbol was never closed.
    Unbalanced { close: char },

    /// A symbol with no meaning appeared.
    UnrecognizedSymbol { symbol: String },

    /// The derivative operator was given something other than a variable name.
    DerivativeVariable,

    /// There was nothing to parse.
    EmptyExpression,

    /// A formula expected to be constant depended on variables.
    NotConstant,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::MissingValue { op } => write!(f, "Incomplete formula: missing value for {}", op),
            Self::ConsecutiveOperators => write!(f, "Error: consecutive operators"),
            Self::NestedSubscript => write!(f, "Nested brackets used for subscripts are not supported."),
            Self::WholeNumbersOnly => write!(f, "Whole numbers only. No decimal values are allowed."),
            Self::MultipleIndexVariables { .. } => write!(f, "An array reference can only have one index variable."),
            Self::Unbalanced { close } => write!(f, "Unbalanced grouping: missing {}", close),
            Self::UnrecognizedSymbol { symbol } => write!(f, "Unrecognized symbol {}", symbol),
            Self::DerivativeVariable => write!(f, "The derivative operator needs a variable name"),
            Self::EmptyExpression => write!(f, "Incomplete formula: missing expression"),
            Self::NotConstant => write!(f, "The expression should be a constant but depends on variables."),
        }
    }
}

/// A problem found while parsing, along with the region of the source it was found in.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParseIssue {
    /// The region of the source text that caused the issue.
    pub span: Range<usize>,

    /// The kind of issue.
    pub kind: IssueKind,
}

impl ParseIssue {
    /// Creates a new issue.
    pub fn new(span: Range<usize>, kind: IssueKind) -> Self {
        Self { span, kind }
    }

    /// Converts the issue into an error that can be rendered with [`ariadne`].
    pub fn to_error(&self) -> Error {
        let span = self.span.clone();
        match &self.kind {
            IssueKind::MissingValue { op } => Error::at(span, kind::MissingValue { op: *op }),
            IssueKind::ConsecutiveOperators => Error::at(span, kind::ConsecutiveOperators),
            IssueKind::NestedSubscript => Error::at(span, kind::NestedSubscript),
            IssueKind::WholeNumbersOnly => Error::at(span, kind::WholeNumbersOnly),
            IssueKind::MultipleIndexVariables { names } => {
                Error::at(span, kind::MultipleIndexVariables { names: names.clone() })
            },
            IssueKind::Unbalanced { close } => Error::at(span, kind::Unbalanced { close: *close }),
            IssueKind::UnrecognizedSymbol { symbol } => {
                Error::at(span, kind::UnrecognizedSymbol { symbol: symbol.clone() })
            },
            IssueKind::DerivativeVariable => Error::at(span, kind::DerivativeVariable),
            IssueKind::EmptyExpression => Error::at(span, kind::EmptyExpression),
            IssueKind::NotConstant => Error::at(span, kind::NotConstant),
        }
    }
}

impl fmt::Display for ParseIssue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.kind.fmt(f)
    }
}
