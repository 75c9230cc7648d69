//! Configuration errors raised while setting up an environment.
//!
//! These indicate a mistake in the setup of a problem (a malformed rule, a parameter that cannot
//! be computed) rather than in a learner's input. They are logged when detected and returned to
//! the caller as [`btm_error::Error`].

use ariadne::Fmt;
use btm_attrs::ErrorKind;
use btm_error::EXPR;

/// A rule equation did not contain exactly one `==`.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "invalid equation in identity list",
    labels = [format!("found {} `==` separators", separators)],
    help = format!("write the rule as {}", "pattern == replacement".fg(EXPR)),
)]
pub struct MalformedRule {
    /// The number of `==` separators that were found.
    pub separators: usize,
}

/// A parameter formula in number context depended on something other than known parameters.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("parameter `{}` does not evaluate to a number", name),
    labels = ["this formula"],
    note = "only previously defined parameters can appear in a calculated parameter",
)]
pub struct UndefinedParameter {
    /// The name of the parameter.
    pub name: String,
}

/// An object registered as a number was not constant.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("`{}` was registered as a number but depends on variables", name),
    labels = ["this formula"],
)]
pub struct NotANumber {
    /// The name of the object.
    pub name: String,
}
