//! Rewrite rules ("identities") and the reduction of expressions with them.
//!
//! A rule is written as an equation `pattern == replacement`. The free names of the pattern are
//! wildcards (see [`crate::matching`]); the replacement is instantiated with the sub-expressions
//! they matched. Names that appear only in the replacement cannot be determined by matching, and
//! are exposed as numbered `inputN` placeholders for the caller to fill in.

pub mod catalog;

use btm_error::Error;
use btm_parser::{
    expr::ValueType,
    Expr,
    Parser,
    ParserConfig,
};
use crate::{
    compose::{compose, Substitution},
    error::MalformedRule,
    matching::{match_pattern, matches, MatchBindings},
    options::Options,
    simplify::{flatten, simplify_constants},
    step_collector::StepCollector,
};
use log::{debug, error, warn};
use std::collections::HashMap;

/// The number of rewrites [`reduce`] applies at one node before giving up.
const MAX_REWRITES: usize = 256;

/// An equation that can be used to rewrite expressions.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    /// The side that is matched against expressions.
    pub pattern: Expr,

    /// The side that replaces a matched expression.
    pub replacement: Expr,

    /// A human-readable description of the rule.
    pub description: String,

    /// Whether the rule preserves equivalence.
    pub valid: bool,

    /// Inactive rules are kept in the catalog but never match.
    pub active: bool,

    /// A stable identifier, starting from 1 in each catalog.
    pub id: usize,
}

/// A rule that matched an expression, along with the replacement it offers.
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    /// The replacement, with matched sub-expressions and placeholders substituted.
    replacement: Expr,

    /// The replacement in canonical form.
    pub sub_str: String,

    /// The replacement in TeX.
    pub sub_tex: String,

    /// The description of the rule.
    pub name: String,

    /// The rule written as TeX, `pattern=replacement`, or `pattern \iff replacement` for a rule
    /// between truth values.
    pub equation: String,

    /// What each name of the rule stands for, including the placeholders.
    pub bindings: MatchBindings,

    /// The number of `inputN` placeholders in the replacement.
    pub num_inputs: usize,

    /// The identifier of the rule.
    pub rule_id: usize,
}

impl Match {
    /// Instantiates the replacement side of a rule.
    fn new(rule: &Identity, mut bindings: MatchBindings) -> Self {
        let missing = rule.replacement.dependencies()
            .into_iter()
            .filter(|name| !bindings.contains_key(name))
            .collect::<Vec<_>>();
        for (i, name) in missing.iter().enumerate() {
            bindings.insert(name.clone(), format!("input{}", i + 1));
        }

        let substitutions = bindings.iter()
            .map(|(name, text)| (name.clone(), Substitution::Text(text.clone())))
            .collect::<HashMap<_, _>>();
        let replacement = compose(&rule.replacement, &substitutions, &());

        let is_boolean = matches!(&replacement, Expr::Binary(binary) if binary.op.value_type() == ValueType::Boolean);
        let equation = if is_boolean {
            format!("{} \\iff {}", rule.pattern.to_tex(), rule.replacement.to_tex())
        } else {
            format!("{}={}", rule.pattern.to_tex(), rule.replacement.to_tex())
        };

        Self {
            sub_str: replacement.to_string(),
            sub_tex: replacement.to_tex(),
            replacement,
            name: rule.description.clone(),
            equation,
            bindings,
            num_inputs: missing.len(),
            rule_id: rule.id,
        }
    }

    /// Returns the replacement expression.
    pub fn substitution(&self) -> &Expr {
        &self.replacement
    }
}

/// A step taken by [`reduce`].
#[derive(Debug, Clone, PartialEq)]
pub struct ReductionStep {
    /// The description of the rule that was applied.
    pub rule: String,

    /// The identifier of the rule that was applied.
    pub rule_id: usize,

    /// The expression before the rewrite.
    pub before: String,

    /// The expression after the rewrite.
    pub after: String,
}

/// An ordered list of rules.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleCatalog {
    rules: Vec<Identity>,
}

impl RuleCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the rules of the catalog, including inactive ones.
    pub fn rules(&self) -> &[Identity] {
        &self.rules
    }

    /// Returns the number of rules in the catalog.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if the catalog has no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Parses one side of a rule. The names of a rule are wildcards, so none of them are bound.
    fn parse_side(source: &str, options: &Options) -> Expr {
        let config = ParserConfig { negative_numbers: options.negative_numbers, no_decimals: false };
        let expr = Parser::new(&(), config).parse(source);
        if options.flatten_on_parse {
            flatten(&expr)
        } else {
            expr
        }
    }

    /// Adds a rule written as `pattern == replacement`. Unless `one_way` is set, the reversed rule
    /// `replacement == pattern` is added as well.
    ///
    /// A rule whose pattern is the same as the pattern of a rule already in the catalog, up to the
    /// names of the wildcards, is skipped.
    pub fn add_rule(
        &mut self,
        equation: &str,
        description: &str,
        valid: bool,
        one_way: bool,
        options: &Options,
    ) -> Result<(), Error> {
        let sides = equation.split("==").collect::<Vec<_>>();
        if sides.len() != 2 {
            error!("invalid equation in identity list: {}", equation);
            return Err(Error::at(0..equation.len(), MalformedRule { separators: sides.len().saturating_sub(1) }));
        }

        let directions: &[(usize, usize)] = if one_way { &[(0, 1)] } else { &[(0, 1), (1, 0)] };
        for &(from, to) in directions {
            let pattern = Self::parse_side(sides[from], options);
            let replacement = Self::parse_side(sides[to], options);
            if let Some(issue) = pattern.parsing_error().or_else(|| replacement.parsing_error()) {
                error!("invalid equation in identity list: {}: {}", equation, issue);
                return Err(issue.to_error());
            }

            let duplicate = self.rules.iter().any(|rule| {
                matches(&rule.pattern, &pattern).is_some() && matches(&pattern, &rule.pattern).is_some()
            });
            if duplicate {
                debug!("skipping rule `{}`: its pattern is already in the catalog", sides[from].trim());
                continue;
            }

            let id = self.rules.len() + 1;
            debug!("rule {}: {} == {} ({})", id, pattern, replacement, description);
            self.rules.push(Identity {
                pattern,
                replacement,
                description: description.to_string(),
                valid,
                active: true,
                id,
            });
        }
        Ok(())
    }

    /// Deactivates every rule whose pattern matches the left side of the given equation. The rules
    /// stay in the catalog.
    pub fn disable_rule(&mut self, equation: &str, options: &Options) -> Result<usize, Error> {
        let sides = equation.split("==").collect::<Vec<_>>();
        if sides.len() > 2 {
            error!("invalid equation in identity list: {}", equation);
            return Err(Error::at(0..equation.len(), MalformedRule { separators: sides.len() - 1 }));
        }

        let target = Self::parse_side(sides[0], options);
        let mut disabled = 0;
        for rule in self.rules.iter_mut() {
            if matches(&rule.pattern, &target).is_some() {
                rule.active = false;
                disabled += 1;
            }
        }
        debug!("disabled {} rule(s) matching `{}`", disabled, sides[0].trim());
        Ok(disabled)
    }

    /// Returns every active rule whose pattern matches the expression. With `strict`, rules not
    /// marked valid are skipped.
    pub fn find_match_rules(&self, expr: &Expr, strict: bool) -> Vec<Match> {
        self.rules.iter()
            .filter(|rule| rule.active && (rule.valid || !strict))
            .filter_map(|rule| {
                match_pattern(&rule.pattern, expr, MatchBindings::new())
                    .map(|bindings| Match::new(rule, bindings))
            })
            .collect()
    }
}

/// Returns every active rule of the catalog whose pattern matches the expression.
pub fn find_match_rules(catalog: &RuleCatalog, expr: &Expr, strict: bool) -> Vec<Match> {
    catalog.find_match_rules(expr, strict)
}

/// Reduces an expression with the rules of a catalog.
///
/// Constants are folded first, then each child is reduced, then the first matching rule is
/// applied to the whole expression until no rule matches. Rules that would introduce
/// placeholders are never applied. Each rewrite is pushed to the step collector.
pub fn reduce(
    expr: &Expr,
    catalog: &RuleCatalog,
    options: &Options,
    steps: &mut dyn StepCollector<ReductionStep>,
) -> Expr {
    let mut work = simplify_constants(expr, options);
    for child in work.children_mut() {
        *child = reduce(child, catalog, options, steps);
    }

    for _ in 0..MAX_REWRITES {
        let next = catalog.find_match_rules(&work, true)
            .into_iter()
            .find(|m| m.num_inputs == 0);
        let Some(rewrite) = next else {
            return work;
        };

        debug!("{} => {} ({})", work, rewrite.sub_str, rewrite.name);
        steps.push(ReductionStep {
            rule: rewrite.name.clone(),
            rule_id: rewrite.rule_id,
            before: work.to_string(),
            after: rewrite.sub_str.clone(),
        });
        work = rewrite.replacement;
    }

    warn!("reduction of `{}` did not terminate after {} rewrites", work, MAX_REWRITES);
    work
}
