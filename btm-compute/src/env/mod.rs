//! The context in which formulas are parsed, evaluated and rewritten.
//!
//! An [`Environment`] is created once per problem. During setup it is given parameters (numbers
//! chosen at random or computed), variables, named expressions and function definitions. It owns
//! the seeded random generator, so two environments created with the same seed choose the same
//! parameters and the same stand-ins for unknown functions.

pub mod functions;
pub mod param;
pub mod random;

use btm_error::Error;
use btm_parser::{
    parser::error::{IssueKind, ParseIssue},
    Expr,
    NameScope,
    Number,
    Parser,
    ParserConfig,
};
use crate::{
    compare::{compare, CompareOptions},
    compose::{compose, Substitution},
    derivative::derivative,
    error::{NotANumber, UndefinedParameter},
    eval::{Bindings, Eval},
    options::Options,
    rules::{catalog, reduce, Match, ReductionStep, RuleCatalog},
    simplify::{flatten, simplify_constants},
    step_collector::StepCollector,
};
use functions::FunctionTable;
use log::{debug, error, warn};
use param::{round_to, ParameterMode, ParameterSpec};
use random::{Random, DEFAULT_SEED};
use std::collections::HashMap;

/// The number of draws made for a nonzero random parameter before giving up.
const MAX_DRAWS: usize = 1000;

/// What a parsed formula should turn into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Context {
    /// Any formula.
    #[default]
    Formula,

    /// A formula that must fold to a single number, using only parameters.
    Number,
}

/// Options for a single call to [`Environment::parse`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// What the formula should turn into.
    pub context: Context,

    /// Reject numbers with a decimal point.
    pub no_decimals: bool,

    /// Flatten the parsed formula. Falls back to [`Options::flatten_on_parse`].
    pub flatten: Option<bool>,
}

impl ParseOptions {
    /// Options for a formula that must be a number.
    pub fn number() -> Self {
        Self { context: Context::Number, ..Self::default() }
    }
}

/// One of the rule catalogs of an environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogKind {
    /// General identities, used by [`Environment::reduce`].
    Reductions,

    /// Identities for sums.
    Sums,

    /// Identities for products and powers.
    Products,
}

/// The objects registered in an environment.
#[derive(Debug, Clone, Default)]
struct Objects {
    params: HashMap<String, Number>,
    variables: Vec<String>,
    expressions: HashMap<String, Expr>,
}

impl Objects {
    fn contains(&self, name: &str) -> bool {
        self.params.contains_key(name)
            || self.expressions.contains_key(name)
            || self.variables.iter().any(|var| var == name)
    }
}

/// The context of a problem.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Tolerances and display switches.
    pub options: Options,

    rng: Random,
    functions: FunctionTable,
    objects: Objects,
    reductions: RuleCatalog,
    sum_reductions: RuleCatalog,
    product_reductions: RuleCatalog,
}

impl Default for Environment {
    fn default() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }
}

impl NameScope for Environment {
    fn is_bound(&self, name: &str) -> bool {
        self.objects.contains(name)
    }

    fn bound_names(&self) -> Vec<&str> {
        self.objects.params.keys()
            .chain(self.objects.expressions.keys())
            .chain(self.objects.variables.iter())
            .map(String::as_str)
            .collect()
    }
}

impl Environment {
    /// Creates an environment with the default seed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an environment with the given seed.
    pub fn with_seed(seed: u64) -> Self {
        let options = Options::default();
        Self {
            rng: Random::new(seed),
            functions: FunctionTable::new(),
            objects: Objects::default(),
            reductions: catalog::default_reductions(&options),
            sum_reductions: catalog::sum_reductions(&options),
            product_reductions: catalog::product_reductions(&options),
            options,
        }
    }

    /// Creates an environment with a textual seed.
    pub fn with_seed_str(seed: &str) -> Self {
        Self::with_seed(random::seed_from_str(seed))
    }

    /// Parses a formula, reading names against the objects of the environment.
    ///
    /// Every unknown function called in the formula is given a stand-in. In [`Context::Number`],
    /// the formula is folded to a single number, or records [`IssueKind::NotConstant`] if it
    /// depends on anything other than parameters.
    pub fn parse(&mut self, source: &str, options: ParseOptions) -> Expr {
        let config = ParserConfig {
            negative_numbers: self.options.negative_numbers,
            no_decimals: options.no_decimals,
        };
        let mut expr = Parser::new(&*self, config).parse(source);
        if expr.has_parsing_error() {
            return expr;
        }

        self.functions.register_calls(&expr, &mut self.rng);
        if options.context == Context::Number {
            expr = self.fold_number(expr, 0..source.len());
        }
        if options.flatten.unwrap_or(self.options.flatten_on_parse) {
            expr = flatten(&expr);
        }
        expr
    }

    /// Parses a formula with the default options.
    pub fn parse_formula(&mut self, source: &str) -> Expr {
        self.parse(source, ParseOptions::default())
    }

    /// Folds a formula that only uses parameters to a single number.
    fn fold_number(&self, expr: Expr, span: std::ops::Range<usize>) -> Expr {
        if expr.dependencies().iter().any(|name| !self.objects.params.contains_key(name)) {
            return Expr::invalid(ParseIssue::new(span, IssueKind::NotConstant), Some(expr));
        }

        let params = self.objects.params.iter()
            .map(|(name, value)| (name.clone(), Substitution::Expr(Expr::number(*value))))
            .collect::<HashMap<_, _>>();
        let folded = simplify_constants(&compose(&expr, &params, self), &self.options);
        match folded {
            Expr::Scalar(_) => folded,
            other => match other.eval(&self.bindings()) {
                Some(value) => Expr::number(Number::from_f64(value)),
                None => Expr::number(Number::real(f64::NAN)),
            },
        }
    }

    /// Substitutes expressions for names in an expression. Text is parsed against the objects of
    /// the environment.
    pub fn compose(&self, expr: &Expr, bindings: &HashMap<String, Substitution>) -> Expr {
        compose(expr, bindings, self)
    }

    /// Differentiates an expression. Parameters are constants; every other free name depends on
    /// the variable.
    pub fn derivative(&self, expr: &Expr, var: &str) -> Expr {
        derivative(expr, var, &self.objects.params)
    }

    /// Defines a function by a formula in terms of an input variable, replacing any stand-in
    /// given to it.
    pub fn define_function(&mut self, name: &str, input: &str, formula: &str) -> Result<(), Error> {
        let body = self.parse_formula(formula);
        if let Some(issue) = body.parsing_error() {
            return Err(issue.to_error());
        }
        debug!("defined {}({}) = {}", name, input, body);
        self.functions.define(name, input, body);
        Ok(())
    }

    /// Gives a stand-in to every unknown function called in the expression.
    pub fn register_functions(&mut self, expr: &Expr) {
        self.functions.register_calls(expr, &mut self.rng);
    }

    /// Returns the function definitions of the environment.
    pub fn functions(&self) -> &FunctionTable {
        &self.functions
    }

    /// Returns the random generator of the environment.
    pub fn rng(&mut self) -> &mut Random {
        &mut self.rng
    }

    /// Returns bindings holding the value of every parameter, and the function definitions.
    pub fn bindings(&self) -> Bindings<'_> {
        let mut bindings = Bindings::with_functions(&self.functions);
        bindings.abs_tol = self.options.abs_tol;
        for (name, value) in &self.objects.params {
            bindings.add_var(name, value.value());
        }
        bindings
    }

    /// Chooses the value of a parameter and registers it.
    pub fn add_parameter(&mut self, name: &str, spec: ParameterSpec) -> Result<Number, Error> {
        let value = match &spec.mode {
            ParameterMode::Random { min, max, by, nonzero } => {
                Number::from_f64(self.draw(*min, *max, *by, *nonzero))
            },
            ParameterMode::Calculate { formula } => {
                let expr = self.parse(formula, ParseOptions::number());
                match expr {
                    Expr::Scalar(n) if !n.is_nan() => n,
                    _ => {
                        error!("parameter `{}` could not be calculated from `{}`", name, formula);
                        return Err(Error::at(0..formula.len(), UndefinedParameter { name: name.to_string() }));
                    },
                }
            },
            ParameterMode::Rational { numer, denom } => Number::rational(*numer, *denom),
            ParameterMode::Static { value } => Number::from_f64(*value),
        };
        let value = match spec.prec {
            Some(prec) => Number::from_f64(round_to(value.value(), prec)),
            None => value,
        };

        debug!("parameter {} = {}", name, value);
        self.objects.params.insert(name.to_string(), value);
        Ok(value)
    }

    /// Draws a value from a discrete range.
    fn draw(&mut self, min: f64, max: f64, by: f64, nonzero: bool) -> f64 {
        let count = ((max - min) / by).floor() as i64 + 1;
        let mut value = min + by * self.rng.rand_int(0, count - 1) as f64;
        let mut draws = 1;
        while nonzero && value.abs() < self.options.abs_tol {
            if draws == MAX_DRAWS {
                warn!("no nonzero value found in {}..={} by {}", min, max, by);
                break;
            }
            value = min + by * self.rng.rand_int(0, count - 1) as f64;
            draws += 1;
        }
        value
    }

    /// Returns the value of a parameter.
    pub fn parameter(&self, name: &str) -> Option<Number> {
        self.objects.params.get(name).copied()
    }

    /// Registers a variable.
    pub fn add_variable(&mut self, name: &str) -> Expr {
        if !self.objects.variables.iter().any(|var| var == name) {
            self.objects.variables.push(name.to_string());
        }
        Expr::var(name)
    }

    /// Returns the registered variables, in order of registration.
    pub fn variables(&self) -> &[String] {
        &self.objects.variables
    }

    /// Decodes and parses a formula, and registers it under a name.
    pub fn add_expression(&mut self, name: &str, formula: &str) -> Result<Expr, Error> {
        let decoded = self.decode_formula(formula, false);
        let expr = self.parse_formula(&decoded);
        if let Some(issue) = expr.parsing_error() {
            return Err(issue.to_error());
        }
        debug!("expression {} = {}", name, expr);
        self.objects.expressions.insert(name.to_string(), expr.clone());
        Ok(expr)
    }

    /// Returns a registered expression.
    pub fn expression(&self, name: &str) -> Option<&Expr> {
        self.objects.expressions.get(name)
    }

    /// Registers a constant expression as a parameter.
    pub fn add_number(&mut self, name: &str, expr: &Expr) -> Result<Number, Error> {
        match self.fold_number(expr.clone(), 0..0) {
            Expr::Scalar(n) => {
                self.objects.params.insert(name.to_string(), n);
                Ok(n)
            },
            _ => {
                error!("`{}` was registered as a number but is `{}`", name, expr);
                Err(Error::at(0..0, NotANumber { name: name.to_string() }))
            },
        }
    }

    /// Returns the canonical or TeX form of a registered object.
    fn object_text(&self, name: &str, display: bool) -> Option<String> {
        let expr = if let Some(value) = self.objects.params.get(name) {
            Expr::number(*value)
        } else if let Some(expr) = self.objects.expressions.get(name) {
            expr.clone()
        } else if self.objects.variables.iter().any(|var| var == name) {
            Expr::var(name)
        } else {
            return None;
        };
        Some(if display {
            format!("{{{}}}", expr.to_tex())
        } else {
            format!("({})", expr)
        })
    }

    /// Replaces every `{{name}}` that refers to a registered object with the object, written as
    /// `(canonical form)`, or `{TeX form}` when `display` is set. Unknown names are left alone.
    pub fn decode_formula(&self, statement: &str, display: bool) -> String {
        let mut out = String::with_capacity(statement.len());
        let mut rest = statement;
        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let name_len = after
                .char_indices()
                .find(|&(i, c)| !(c.is_ascii_alphanumeric() || c == '_') || (i == 0 && !c.is_ascii_alphabetic()))
                .map_or(after.len(), |(i, _)| i);
            let name = &after[..name_len];

            match (after[name_len..].starts_with("}}"), self.object_text(name, display)) {
                (true, Some(text)) => {
                    out.push_str(&text);
                    rest = &after[name_len + 2..];
                },
                _ => {
                    out.push_str("{{");
                    rest = after;
                },
            }
        }
        out.push_str(rest);
        out
    }

    /// Evaluates a formula or an expression with the parameters of the environment and the given
    /// values.
    pub fn evaluate_object(&mut self, object: impl Into<Substitution>, values: &HashMap<String, f64>) -> Option<f64> {
        let expr = match object.into() {
            Substitution::Text(text) => {
                let decoded = self.decode_formula(&text, false);
                self.parse_formula(&decoded)
            },
            Substitution::Expr(expr) => {
                self.register_functions(&expr);
                expr
            },
        };
        let mut bindings = self.bindings();
        for (name, value) in values {
            bindings.add_var(name, *value);
        }
        expr.eval(&bindings)
    }

    /// Returns true if the two formulas or expressions are equivalent.
    pub fn compare_expressions(
        &mut self,
        a: impl Into<Substitution>,
        b: impl Into<Substitution>,
        options: &CompareOptions,
    ) -> bool {
        let a = self.object_expr(a.into());
        let b = self.object_expr(b.into());
        compare(&a, &b, options, &self.bindings())
    }

    fn object_expr(&mut self, object: Substitution) -> Expr {
        match object {
            Substitution::Text(text) => self.parse_formula(&text),
            Substitution::Expr(expr) => {
                self.register_functions(&expr);
                expr
            },
        }
    }

    /// Returns one of the rule catalogs.
    pub fn catalog(&self, kind: CatalogKind) -> &RuleCatalog {
        match kind {
            CatalogKind::Reductions => &self.reductions,
            CatalogKind::Sums => &self.sum_reductions,
            CatalogKind::Products => &self.product_reductions,
        }
    }

    fn catalog_mut(&mut self, kind: CatalogKind) -> &mut RuleCatalog {
        match kind {
            CatalogKind::Reductions => &mut self.reductions,
            CatalogKind::Sums => &mut self.sum_reductions,
            CatalogKind::Products => &mut self.product_reductions,
        }
    }

    /// Adds a rule to the reduction catalog.
    pub fn add_reduction_rule(&mut self, equation: &str, description: &str, one_way: bool) -> Result<(), Error> {
        self.add_rule(CatalogKind::Reductions, equation, description, one_way)
    }

    /// Deactivates the rules of the reduction catalog matching the left side of the equation.
    pub fn disable_reduction_rule(&mut self, equation: &str) -> Result<usize, Error> {
        let options = self.options;
        self.reductions.disable_rule(equation, &options)
    }

    /// Adds a rule to one of the catalogs.
    pub fn add_rule(
        &mut self,
        kind: CatalogKind,
        equation: &str,
        description: &str,
        one_way: bool,
    ) -> Result<(), Error> {
        let options = self.options;
        self.catalog_mut(kind).add_rule(equation, description, true, one_way, &options)
    }

    /// Returns the rules of a catalog that match the expression.
    pub fn find_match_rules(&self, kind: CatalogKind, expr: &Expr, strict: bool) -> Vec<Match> {
        self.catalog(kind).find_match_rules(expr, strict)
    }

    /// Reduces an expression with the reduction catalog.
    pub fn reduce(&self, expr: &Expr, steps: &mut dyn StepCollector<ReductionStep>) -> Expr {
        reduce(expr, &self.reductions, &self.options, steps)
    }
}
