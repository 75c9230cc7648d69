//! Equivalence of expressions by sampling.
//!
//! Two expressions are considered equal when they evaluate to the same value at every point of a
//! grid spanning the free variables of both. The grid has a fixed number of points per variable,
//! so the check is a heuristic: expressions that agree on the grid but differ elsewhere compare
//! equal.

use btm_parser::Expr;
use crate::{
    eval::{Bindings, Eval},
    simplify::flattened_operands,
};
use log::trace;
use std::{collections::HashMap, ops::Range};

/// Two finite values smaller than this in magnitude are always equal.
const NEAR_ZERO: f64 = 1e-12;

/// Options for [`compare`].
#[derive(Debug, Clone, PartialEq)]
pub struct CompareOptions {
    /// Relative tolerance for two finite values.
    pub rel_tol: f64,

    /// The sampling domain of specific variables.
    pub domains: HashMap<String, Range<f64>>,

    /// The sampling domain of every other variable.
    pub default_domain: Range<f64>,

    /// The number of sample points per variable.
    pub points: usize,

    /// Also require both expressions to have the same top-level operator family, with operands
    /// that pair off one to one.
    pub match_shape: bool,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            rel_tol: 1e-8,
            domains: HashMap::new(),
            default_domain: -2.0..2.0,
            points: 11,
            match_shape: false,
        }
    }
}

impl CompareOptions {
    /// Samples the given variable in the given domain.
    pub fn with_domain(mut self, name: &str, domain: Range<f64>) -> Self {
        self.domains.insert(name.to_string(), domain);
        self
    }

    /// Sets whether the shape of the expressions must match.
    pub fn with_shape(mut self, match_shape: bool) -> Self {
        self.match_shape = match_shape;
        self
    }

    /// Returns the sample points of a variable. The last point is exactly the end of the domain.
    fn grid(&self, name: &str) -> Vec<f64> {
        let domain = self.domains.get(name).unwrap_or(&self.default_domain);
        let n = self.points.max(2) - 1;
        let step = (domain.end - domain.start) / n as f64;
        (0..n)
            .map(|j| domain.start + j as f64 * step)
            .chain(std::iter::once(domain.end))
            .collect()
    }
}

/// Returns true if two sampled values agree. Undefined values count as `NaN`.
///
/// A finite value never agrees with a non-finite one. Two `NaN`s agree, and infinities agree when
/// their signs do.
fn values_agree(a: f64, b: f64, rel_tol: f64) -> bool {
    match (a.is_finite(), b.is_finite()) {
        (true, true) => (a.abs() < NEAR_ZERO && b.abs() < NEAR_ZERO) || (a - b).abs() / a.abs() <= rel_tol,
        (false, false) => (a.is_nan() && b.is_nan()) || a == b,
        _ => false,
    }
}

/// Collects the variables to sample, in order of first appearance. Names already bound in the
/// base bindings keep their value.
fn free_variables(a: &Expr, b: &Expr, base: &Bindings) -> Vec<String> {
    let mut names = Vec::new();
    for name in a.dependencies().into_iter().chain(b.dependencies()) {
        if base.get_var(&name).is_none() && !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

/// Compares the values of two expressions at every point of the sampling grid.
fn values_match(a: &Expr, b: &Expr, options: &CompareOptions, base: &Bindings) -> bool {
    let names = free_variables(a, b, base);
    let grids = names.iter().map(|name| options.grid(name)).collect::<Vec<_>>();

    // odometer: the first variable changes fastest, and the count ends when the last one overflows
    let mut odometer = vec![0; names.len()];
    loop {
        let mut bindings = base.clone();
        for ((name, grid), &i) in names.iter().zip(&grids).zip(&odometer) {
            bindings.add_var(name, grid[i]);
        }

        let y1 = a.eval(&bindings).unwrap_or(f64::NAN);
        let y2 = b.eval(&bindings).unwrap_or(f64::NAN);
        trace!("sample {:?}: {} vs {}", odometer, y1, y2);
        if !values_agree(y1, y2, options.rel_tol) {
            return false;
        }

        let mut digit = 0;
        loop {
            if digit == odometer.len() {
                return true;
            }
            odometer[digit] += 1;
            if odometer[digit] < grids[digit].len() {
                break;
            }
            odometer[digit] = 0;
            digit += 1;
        }
    }
}

/// Returns true if both expressions have the same top-level operator family and their operands
/// pair off, one to one, as equal expressions.
///
/// The pairing is greedy: each operand of `b` takes the first unpaired operand of `a` equal to it.
fn shapes_match(a: &Expr, b: &Expr, options: &CompareOptions, base: &Bindings) -> bool {
    if a.family() != b.family() {
        return false;
    }
    if a.family().is_none() {
        return true;
    }

    let (operands_a, operands_b) = (flattened_operands(a), flattened_operands(b));
    if operands_a.len() != operands_b.len() {
        return false;
    }

    let inner = CompareOptions { match_shape: false, ..options.clone() };
    let mut paired = vec![false; operands_a.len()];
    operands_b.iter().all(|operand_b| {
        let found = operands_a.iter()
            .enumerate()
            .find(|(j, operand_a)| !paired[*j] && values_match(operand_a, operand_b, &inner, base))
            .map(|(j, _)| j);
        match found {
            Some(j) => {
                paired[j] = true;
                true
            },
            None => false,
        }
    })
}

/// Returns true if the two expressions are equal at every sample point, and, if requested, have
/// the same shape.
pub fn compare(a: &Expr, b: &Expr, options: &CompareOptions, base: &Bindings) -> bool {
    values_match(a, b, options, base) && (!options.match_shape || shapes_match(a, b, options, base))
}

#[cfg(test)]
mod tests {
    use btm_parser::parse;
    use pretty_assertions::assert_eq;
    use super::*;

    fn same(a: &str, b: &str) -> bool {
        compare(&parse(a), &parse(b), &CompareOptions::default(), &Bindings::new())
    }

    fn same_shape(a: &str, b: &str) -> bool {
        let options = CompareOptions::default().with_shape(true);
        compare(&parse(a), &parse(b), &options, &Bindings::new())
    }

    #[test]
    fn grid_points() {
        let options = CompareOptions::default().with_domain("t", 0.0..1.0);
        let grid = options.grid("t");
        assert_eq!(grid.len(), 11);
        assert_eq!(grid[0], 0.0);
        assert_eq!(grid[10], 1.0);
        assert_eq!(options.grid("x")[5], 0.0);
    }

    #[test]
    fn equivalent_expressions() {
        assert!(same("(x+1)^2", "x^2+2*x+1"));
        assert!(same("2(x+y)", "2y+2x"));
        assert!(same("sin(x)^2+cos(x)^2", "1"));
        assert!(same("4", "2+2"));
    }

    #[test]
    fn different_expressions() {
        assert!(!same("x+1", "x+2"));
        assert!(!same("2*x+3*y", "3*x+2*y"));
        assert!(!same("x", "y"));
    }

    #[test]
    fn undefined_values() {
        // both undefined at x = 0
        assert!(same("x/x", "1/x*x"));
        // defined against undefined
        assert!(!same("sqrt(x)^2", "x"));
        assert!(same("sqrt(x^2)", "abs(x)"));
    }

    #[test]
    fn finiteness_must_agree() {
        assert!(values_agree(f64::NAN, f64::NAN, 1e-8));
        assert!(values_agree(f64::INFINITY, f64::INFINITY, 1e-8));
        assert!(!values_agree(f64::INFINITY, f64::NEG_INFINITY, 1e-8));
        assert!(!values_agree(f64::NAN, 1.0, 1e-8));
        assert!(!values_agree(2.0, f64::NAN, 1e-8));
        assert!(!values_agree(f64::NAN, f64::INFINITY, 1e-8));
        assert!(!values_agree(0.0, f64::INFINITY, 1e-8));

        // undefined for x < 0 on one side only
        assert!(!same("sqrt(x)^2", "x"));
        assert!(!same("ln(x^2)", "2*ln(x)"));
    }

    #[test]
    fn restricted_domain() {
        let options = CompareOptions::default().with_domain("x", 0.0..4.0);
        assert!(compare(&parse("sqrt(x)^2"), &parse("x"), &options, &Bindings::new()));
    }

    #[test]
    fn bound_names_are_fixed() {
        let base = Bindings::new().with_var("a", 3.0);
        let options = CompareOptions::default();
        assert!(compare(&parse("a*x"), &parse("3*x"), &options, &base));
        assert!(!compare(&parse("a*x"), &parse("2*x"), &options, &base));
    }

    #[test]
    fn shapes() {
        assert!(!same_shape("2*x+3*y", "3*x+2*y"));
        assert!(same_shape("2*x+3*y", "3*y+2*x"));
        assert!(same("x*(x+1)", "x^2+x"));
        assert!(!same_shape("x*(x+1)", "x^2+x"));
        assert!(same_shape("x*(x+1)", "(1+x)*x"));
        assert!(!same_shape("x+x+x", "2*x+x"));
    }
}
