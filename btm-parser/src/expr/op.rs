//! Operators that can appear in an expression tree, and their precedences.

use std::fmt;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The precedence of an operation, in order from lowest precedence (evaluated last) to highest
/// precedence (evaluated first).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precedence {
    /// Precedence of logical or (`$`).
    Disjunction,

    /// Precedence of logical and (`&`).
    Conjunction,

    /// Precedence of equality (`=`).
    Equality,

    /// Precedence of addition (`+`) and subtraction (`-`), which separate terms.
    Term,

    /// Precedence of multiplication (`*`) and division (`/`), which separate factors. Unary `+`
    /// and `-` share this precedence.
    Factor,

    /// Precedence of exponentiation (`^`) and the unary reciprocal (`/`).
    Power,

    /// Precedence of function application. Leaf expressions also report this precedence.
    Function,
}

impl PartialOrd for Precedence {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        let left = *self as u8;
        let right = *other as u8;
        left.partial_cmp(&right)
    }
}

/// The value produced by an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ValueType {
    /// A number.
    Numeric,

    /// A truth value, produced by `=`, `&` and `$`.
    Boolean,
}

/// The unary operation that is being performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum UnaryOp {
    /// Identity, `+a`.
    Plus,

    /// Negation, `-a`.
    Neg,

    /// Reciprocal, `/a`.
    Recip,
}

impl UnaryOp {
    /// Returns the precedence of the unary operation.
    pub fn precedence(&self) -> Precedence {
        match self {
            Self::Plus | Self::Neg => Precedence::Factor,
            Self::Recip => Precedence::Power,
        }
    }

    /// Returns the character used to write this operator.
    pub fn symbol(&self) -> char {
        match self {
            Self::Plus => '+',
            Self::Neg => '-',
            Self::Recip => '/',
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// The binary operation that is being performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Eq,
    And,
    Or,
}

impl BinOp {
    /// Returns the precedence of the binary operation.
    pub fn precedence(&self) -> Precedence {
        match self {
            Self::Add | Self::Sub => Precedence::Term,
            Self::Mul | Self::Div => Precedence::Factor,
            Self::Pow => Precedence::Power,
            Self::Eq => Precedence::Equality,
            Self::And => Precedence::Conjunction,
            Self::Or => Precedence::Disjunction,
        }
    }

    /// Returns the character used to write this operator.
    pub fn symbol(&self) -> char {
        match self {
            Self::Add => '+',
            Self::Sub => '-',
            Self::Mul => '*',
            Self::Div => '/',
            Self::Pow => '^',
            Self::Eq => '=',
            Self::And => '&',
            Self::Or => '$',
        }
    }

    /// Returns the kind of value produced by the operation.
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Eq | Self::And | Self::Or => ValueType::Boolean,
            _ => ValueType::Numeric,
        }
    }

    /// Returns the associative operator family this operator belongs to, if any. Subtraction
    /// belongs to addition, and division to multiplication.
    pub fn family(&self) -> Option<MultiOp> {
        match self {
            Self::Add | Self::Sub => Some(MultiOp::Add),
            Self::Mul | Self::Div => Some(MultiOp::Mul),
            _ => None,
        }
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// An associative operator that can take any number of operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MultiOp {
    Add,
    Mul,
}

impl MultiOp {
    /// Returns the precedence of the operation.
    pub fn precedence(&self) -> Precedence {
        match self {
            Self::Add => Precedence::Term,
            Self::Mul => Precedence::Factor,
        }
    }

    /// Returns the character used to write this operator.
    pub fn symbol(&self) -> char {
        match self {
            Self::Add => '+',
            Self::Mul => '*',
        }
    }

    /// Returns the result of applying the operation to no operands.
    pub fn identity(&self) -> i64 {
        match self {
            Self::Add => 0,
            Self::Mul => 1,
        }
    }

    /// Returns the binary operator with the same meaning.
    pub fn as_binary(&self) -> BinOp {
        match self {
            Self::Add => BinOp::Add,
            Self::Mul => BinOp::Mul,
        }
    }
}

impl fmt::Display for MultiOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}
