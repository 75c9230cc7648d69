//! The commands understood by the shell, and how they run against an environment.

use btm_compute::{
    compare::CompareOptions,
    env::{CatalogKind, ParseOptions},
    rules::ReductionStep,
    simplify::{flatten, simplify_constants},
    Environment,
    Eval,
};
use btm_parser::Expr;
use crate::error::Error;

/// The text printed by `:help`.
pub const HELP: &str = "\
<expr>                  evaluate an expression
:tex <expr>             write an expression as TeX
:mathml <expr>          write an expression as MathML
:d <var> <expr>         differentiate with respect to a variable
:simplify <expr>        fold constants
:flatten <expr>         flatten sums and products
:reduce <expr>          apply the reduction rules, showing each step
:compare <a> ;; <b>     check whether two expressions are equivalent
:shape <a> ;; <b>       same, also requiring the same shape
:rules <expr>           list the rules that match an expression
:let <name> = <value>   define a parameter
:var <name>             declare a variable
:expr <name> = <expr>   define a named expression
:help                   show this message";

/// A parsed line of input.
#[derive(Debug, Clone, PartialEq)]
pub enum Command<'a> {
    Eval(&'a str),
    Tex(&'a str),
    MathMl(&'a str),
    Derivative { var: &'a str, expr: &'a str },
    Simplify(&'a str),
    Flatten(&'a str),
    Reduce(&'a str),
    Compare { a: &'a str, b: &'a str, shape: bool },
    Rules(&'a str),
    Let { name: &'a str, value: &'a str },
    Var(&'a str),
    Expr { name: &'a str, formula: &'a str },
    Help,
}

/// Splits `name = value`.
fn assignment<'a>(rest: &'a str, usage: &str) -> Result<(&'a str, &'a str), Error> {
    let (name, value) = rest.split_once('=')
        .ok_or_else(|| Error::Usage(format!("usage: {}", usage)))?;
    let name = name.trim();
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(Error::Usage(format!("`{}` is not a valid name", name)));
    }
    Ok((name, value.trim()))
}

/// Splits `a ;; b`.
fn pair<'a>(rest: &'a str, usage: &str) -> Result<(&'a str, &'a str), Error> {
    rest.split_once(";;")
        .map(|(a, b)| (a.trim(), b.trim()))
        .ok_or_else(|| Error::Usage(format!("usage: {}", usage)))
}

impl<'a> Command<'a> {
    /// Parses a line of input.
    pub fn parse(line: &'a str) -> Result<Self, Error> {
        let line = line.trim();
        let Some(command) = line.strip_prefix(':') else {
            return Ok(Command::Eval(line));
        };

        let (name, rest) = command.split_once(char::is_whitespace).unwrap_or((command, ""));
        let rest = rest.trim();
        Ok(match name {
            "tex" => Command::Tex(rest),
            "mathml" => Command::MathMl(rest),
            "d" => {
                let (var, expr) = rest.split_once(char::is_whitespace)
                    .ok_or_else(|| Error::Usage("usage: :d <var> <expr>".to_string()))?;
                Command::Derivative { var, expr: expr.trim() }
            },
            "simplify" => Command::Simplify(rest),
            "flatten" => Command::Flatten(rest),
            "reduce" => Command::Reduce(rest),
            "compare" | "shape" => {
                let (a, b) = pair(rest, ":compare <a> ;; <b>")?;
                Command::Compare { a, b, shape: name == "shape" }
            },
            "rules" => Command::Rules(rest),
            "let" => {
                let (name, value) = assignment(rest, ":let <name> = <value>")?;
                Command::Let { name, value }
            },
            "var" if !rest.is_empty() => Command::Var(rest),
            "expr" => {
                let (name, formula) = assignment(rest, ":expr <name> = <expr>")?;
                Command::Expr { name, formula }
            },
            "help" => Command::Help,
            _ => return Err(Error::Usage(format!("unknown command `:{}`; try :help", name))),
        })
    }

    /// Runs the command, returning the text to print.
    pub fn run(&self, env: &mut Environment) -> Result<String, Error> {
        Ok(match *self {
            Command::Eval(source) => {
                let expr = parse(env, source)?;
                match expr.eval(&env.bindings()) {
                    Some(value) => format!("{} = {}", expr, value),
                    None => format!("{} = undefined", expr),
                }
            },
            Command::Tex(source) => parse(env, source)?.to_tex(),
            Command::MathMl(source) => parse(env, source)?.to_mathml(),
            Command::Derivative { var, expr } => {
                let expr = parse(env, expr)?;
                let deriv = env.derivative(&expr, var);
                simplify_constants(&deriv, &env.options).to_string()
            },
            Command::Simplify(source) => {
                let expr = parse(env, source)?;
                simplify_constants(&expr, &env.options).to_string()
            },
            Command::Flatten(source) => flatten(&parse(env, source)?).to_string(),
            Command::Reduce(source) => {
                let expr = parse(env, source)?;
                let mut steps: Vec<ReductionStep> = Vec::new();
                let result = env.reduce(&expr, &mut steps);
                let mut out = steps.iter()
                    .map(|step| format!("{} => {}    ({})\n", step.before, step.after, step.rule))
                    .collect::<String>();
                out.push_str(&result.to_string());
                out
            },
            Command::Compare { a, b, shape } => {
                let a = parse(env, a)?;
                let b = parse(env, b)?;
                let options = CompareOptions::default().with_shape(shape);
                env.compare_expressions(a, b, &options).to_string()
            },
            Command::Rules(source) => {
                let expr = parse(env, source)?;
                let catalogs = [
                    ("reductions", CatalogKind::Reductions),
                    ("sums", CatalogKind::Sums),
                    ("products", CatalogKind::Products),
                ];
                let lines = catalogs.iter()
                    .flat_map(|(label, kind)| {
                        env.find_match_rules(*kind, &expr, true)
                            .into_iter()
                            .map(move |found| format!("[{} #{}] {}: {}", label, found.rule_id, found.name, found.sub_str))
                    })
                    .collect::<Vec<_>>();
                if lines.is_empty() {
                    "no rules match".to_string()
                } else {
                    lines.join("\n")
                }
            },
            Command::Let { name, value } => {
                let expr = env.parse(value, ParseOptions::number());
                if let Some(issue) = expr.parsing_error() {
                    return Err(Error::report(value, issue.to_error()));
                }
                let number = env.add_number(name, &expr)
                    .map_err(|err| Error::report(value, err))?;
                format!("{} = {}", name, number)
            },
            Command::Var(name) => env.add_variable(name).to_string(),
            Command::Expr { name, formula } => {
                let expr = env.add_expression(name, formula)
                    .map_err(|err| Error::report(formula, err))?;
                format!("{} = {}", name, expr)
            },
            Command::Help => HELP.to_string(),
        })
    }
}

/// Parses a formula, turning the first parse issue into an error.
fn parse(env: &mut Environment, source: &str) -> Result<Expr, Error> {
    let expr = env.parse_formula(source);
    match expr.parsing_error() {
        Some(issue) => Err(Error::report(source, issue.to_error())),
        None => Ok(expr),
    }
}
