//! Structural matching of a pattern against an expression.
//!
//! The free names of a pattern are wildcards. Matching produces a map from each wildcard to the
//! canonical string of the sub-expression it stands for. A wildcard that appears more than once
//! must stand for sub-expressions with identical strings.

use btm_parser::{
    expr::{Multi, Unary, ValueType},
    Expr,
};
use crate::{options::Options, simplify::simplify_constants};
use std::collections::HashMap;

/// The sub-expressions bound to the wildcards of a pattern, written in canonical form.
pub type MatchBindings = HashMap<String, String>;

/// Matches children pairwise once the roots are known to agree.
fn match_children(pattern: &Expr, expr: &Expr, mut bindings: MatchBindings) -> Option<MatchBindings> {
    let (pattern_children, expr_children) = (pattern.children(), expr.children());
    if pattern_children.len() != expr_children.len() {
        return None;
    }
    for (p, e) in pattern_children.into_iter().zip(expr_children) {
        bindings = match_pattern(p, e, bindings)?;
    }
    Some(bindings)
}

/// The default rule: same kind of node with the same operator, then the children in order.
fn match_generic(pattern: &Expr, expr: &Expr, bindings: MatchBindings) -> Option<MatchBindings> {
    if pattern.same_head(expr) {
        match_children(pattern, expr, bindings)
    } else {
        None
    }
}

fn match_scalar(pattern: &Expr, expr: &Expr, bindings: MatchBindings) -> Option<MatchBindings> {
    match expr {
        Expr::Scalar(n) => (pattern.as_number() == Some(*n)).then_some(bindings),
        _ if expr.is_constant() => {
            let folded = simplify_constants(expr, &Options::default());
            (folded.to_string() == pattern.to_string()).then_some(bindings)
        },
        _ => None,
    }
}

fn match_variable(name: &str, is_special: bool, expr: &Expr, mut bindings: MatchBindings) -> Option<MatchBindings> {
    let text = expr.to_string();
    if is_special {
        return (text == name).then_some(bindings);
    }

    match bindings.get(name) {
        None if expr.value_type() == ValueType::Numeric => {
            bindings.insert(name.to_string(), text);
            Some(bindings)
        },
        Some(bound) if *bound == text => Some(bindings),
        _ => None,
    }
}

fn match_unary(unary: &Unary, pattern: &Expr, expr: &Expr, bindings: MatchBindings) -> Option<MatchBindings> {
    if !(pattern.is_constant() && expr.is_constant()) {
        return match_generic(pattern, expr, bindings);
    }

    let options = Options::default();
    let folded_expr = simplify_constants(expr, &options);
    let folded_pattern = simplify_constants(&Expr::Unary(unary.clone()), &options);
    let same_number = matches!(
        (folded_pattern.as_number(), folded_expr.as_number()),
        (Some(a), Some(b)) if a == b
    );
    (same_number || folded_expr.to_string() == folded_pattern.to_string()).then_some(bindings)
}

/// Matches an n-ary pattern against an n-ary expression with at least as many operands, grouping
/// the excess operands at the end into the last slot. If that fails, the excess operands at the
/// start are grouped into the first slot instead.
///
/// The grouping is greedy and does not try every split of the operands.
fn match_multi(multi: &Multi, expr: &Expr, bindings: MatchBindings) -> Option<MatchBindings> {
    let Expr::Multi(target) = expr else {
        return None;
    };
    let (n, m) = (multi.operands.len(), target.operands.len());
    if target.op != multi.op || n > m || n == 0 {
        return None;
    }

    let pattern = Expr::Multi(multi.clone());
    let grouped = |operands: &[Expr]| match operands {
        [single] => single.clone(),
        _ => Expr::multi(target.op, operands.to_vec()),
    };

    // trailing operands grouped into the last slot
    let mut trailing = target.operands[..n - 1].to_vec();
    trailing.push(grouped(&target.operands[n - 1..]));
    let result = match_generic(&pattern, &Expr::multi(target.op, trailing), bindings.clone());
    if result.is_some() || n == m {
        return result;
    }

    // leading operands grouped into the first slot
    let diff = m - n;
    let mut leading = vec![grouped(&target.operands[..=diff])];
    leading.extend(target.operands[diff + 1..].iter().cloned());
    match_generic(&pattern, &Expr::multi(target.op, leading), bindings)
}

/// Matches the pattern against the expression, extending the given bindings. Returns [`None`] if
/// the expression does not have the shape of the pattern.
pub fn match_pattern(pattern: &Expr, expr: &Expr, bindings: MatchBindings) -> Option<MatchBindings> {
    if let Expr::Invalid(_) = expr {
        return None;
    }

    match pattern {
        Expr::Scalar(_) => match_scalar(pattern, expr, bindings),
        Expr::Variable(var) => match_variable(&var.name, var.is_special(), expr, bindings),
        Expr::Unary(unary) => match_unary(unary, pattern, expr, bindings),
        Expr::Multi(multi) => match_multi(multi, expr, bindings),
        Expr::Invalid(_) => None,
        Expr::Index(_) | Expr::Binary(_) | Expr::Function(_) | Expr::Derivative(_) => {
            match_generic(pattern, expr, bindings)
        },
    }
}

/// Matches the pattern against the expression with no prior bindings.
pub fn matches(pattern: &Expr, expr: &Expr) -> Option<MatchBindings> {
    match_pattern(pattern, expr, MatchBindings::new())
}

#[cfg(test)]
mod tests {
    use btm_parser::parse;
    use crate::simplify::flatten;
    use pretty_assertions::assert_eq;
    use super::*;

    fn bindings(pairs: &[(&str, &str)]) -> MatchBindings {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn wildcards_bind_subexpressions() {
        let result = matches(&parse("a*(b+c)"), &parse("2*(x+3)"));
        assert_eq!(result, Some(bindings(&[("a", "2"), ("b", "x"), ("c", "3")])));
    }

    #[test]
    fn repeated_wildcards_must_agree() {
        assert_eq!(matches(&parse("x-x"), &parse("(y+1)-(y+1)")), Some(bindings(&[("x", "y+1")])));
        assert_eq!(matches(&parse("x-x"), &parse("y-z")), None);
    }

    #[test]
    fn operators_must_agree() {
        assert_eq!(matches(&parse("a+b"), &parse("x*y")), None);
        assert_eq!(matches(&parse("sin(a)"), &parse("cos(x)")), None);
        assert!(matches(&parse("sin(a)"), &parse("sin(2x)")).is_some());
    }

    #[test]
    fn scalars_match_folded_constants() {
        assert!(matches(&parse("0+x"), &parse("0+y")).is_some());
        assert!(matches(&parse("0+x"), &parse("(1-1)+y")).is_some());
        assert_eq!(matches(&parse("0+x"), &parse("1+y")), None);
        assert_eq!(matches(&parse("1^x"), &parse("a^x")), None);
    }

    #[test]
    fn constants_and_booleans() {
        assert!(matches(&parse("pi*x"), &parse("pi*3")).is_some());
        assert_eq!(matches(&parse("pi*x"), &parse("e*3")), None);
        // a wildcard only stands for a number
        assert_eq!(matches(&parse("x&y"), &parse("(a=1)&(b=2)")), None);
    }

    #[test]
    fn unary_constants() {
        assert!(matches(&parse("-(-x)"), &parse("-(-y)")).is_some());
        assert!(matches(&parse("/(/x)"), &parse("/(/y)")).is_some());
    }

    #[test]
    fn multiop_grouping() {
        let pattern = flatten(&parse("a+b"));
        let expr = flatten(&parse("x+y+z"));
        assert_eq!(
            matches(&pattern, &expr),
            Some(bindings(&[("a", "x"), ("b", "y+z")])),
        );

        // the trailing grouping fails, so the leading operands are grouped instead
        let pattern = flatten(&parse("a+2"));
        let expr = flatten(&parse("x+y+2"));
        assert_eq!(matches(&pattern, &expr), Some(bindings(&[("a", "x+y")])));

        let pattern = flatten(&parse("a*b*c"));
        assert_eq!(matches(&pattern, &flatten(&parse("x*y"))), None);
    }

    #[test]
    fn invalid_never_matches() {
        assert_eq!(matches(&parse("x"), &parse("(1+")), None);
    }
}
