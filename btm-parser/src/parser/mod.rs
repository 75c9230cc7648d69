//! A two-stack operator precedence parser for formulas.
//!
//! Operands and pending operators are pushed onto separate stacks as the tokens are scanned left
//! to right. Pushing an operator first reduces every pending operator that binds at least as
//! tightly into a compound operand. Grouping symbols (`(..)`, `|..|`, `[..]` and function call
//! arguments) are parsed recursively.
//!
//! Parsing never fails. Problems are recorded on [`Expr::Invalid`] nodes; see [`error`].

pub mod error;
pub mod scope;

use crate::{
    expr::{BinOp, Expr, Index, Precedence, UnaryOp},
    number::Number,
    tokenizer::{tokenize_complete, Token, TokenKind},
};
use error::{IssueKind, ParseIssue};
pub use scope::{split_name, NameScope};
use std::ops::Range;

/// Options that change how the parser reads a formula.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParserConfig {
    /// Fold a negation applied to a numeric literal into a negative literal.
    pub negative_numbers: bool,

    /// Reject numeric literals with a decimal point.
    pub no_decimals: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self { negative_numbers: true, no_decimals: false }
    }
}

/// An operator waiting on the operator stack.
#[derive(Debug, Clone)]
struct PendingOp {
    kind: PendingKind,
    span: Range<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum PendingKind {
    Unary(UnaryOp),
    Binary(BinOp),
}

impl PendingOp {
    /// Returns the precedence used while resolving the stack. Every unary operator resolves at
    /// the precedence of multiplication.
    fn precedence(&self) -> Precedence {
        match self.kind {
            PendingKind::Unary(_) => Precedence::Factor,
            PendingKind::Binary(op) => op.precedence(),
        }
    }

    fn symbol(&self) -> char {
        match self.kind {
            PendingKind::Unary(op) => op.symbol(),
            PendingKind::Binary(op) => op.symbol(),
        }
    }

    fn missing_value(&self, partial: Option<Expr>) -> Expr {
        let issue = ParseIssue::new(self.span.clone(), IssueKind::MissingValue { op: self.symbol() });
        Expr::invalid(issue, partial)
    }
}

/// What the last scanned element was.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Element {
    Operand,
    Operator,
}

/// The operand and operator stacks of a single grouping level.
struct Stacks<'c> {
    operands: Vec<Expr>,
    operators: Vec<PendingOp>,
    last: Option<Element>,
    config: &'c ParserConfig,
}

impl<'c> Stacks<'c> {
    fn new(config: &'c ParserConfig) -> Self {
        Self { operands: Vec::new(), operators: Vec::new(), last: None, config }
    }

    /// Reduces pending operators into operands until one is found that binds less tightly than
    /// `new_op`, then pushes `new_op`. With no new operator, the whole operator stack is reduced.
    fn resolve(&mut self, new_op: Option<PendingOp>) {
        while let Some(old_op) = self.operators.pop() {
            if let Some(new_op) = &new_op {
                let is_unary = matches!(new_op.kind, PendingKind::Unary(_));
                if is_unary || old_op.precedence() < new_op.precedence() {
                    self.operators.push(old_op);
                    break;
                }
            }

            let expr = match old_op.kind {
                PendingKind::Unary(op) => match self.operands.pop() {
                    Some(Expr::Scalar(number)) if op == UnaryOp::Neg && self.config.negative_numbers => {
                        Expr::Scalar(-number)
                    },
                    Some(operand) => Expr::unary(op, operand),
                    None => old_op.missing_value(None),
                },
                PendingKind::Binary(op) => {
                    if self.operands.len() >= 2 {
                        let rhs = self.operands.pop().unwrap_or_default();
                        let lhs = self.operands.pop().unwrap_or_default();
                        Expr::binary(op, lhs, rhs)
                    } else {
                        old_op.missing_value(self.operands.pop())
                    }
                },
            };
            self.operands.push(expr);
        }

        if let Some(new_op) = new_op {
            self.operators.push(new_op);
        }
    }

    /// Pushes an operand, inserting an implicit multiplication if it directly follows another
    /// operand.
    fn push_operand(&mut self, expr: Expr, span: &Range<usize>) {
        if self.last == Some(Element::Operand) {
            self.resolve(Some(PendingOp {
                kind: PendingKind::Binary(BinOp::Mul),
                span: span.start..span.start,
            }));
        }
        self.operands.push(expr);
        self.last = Some(Element::Operand);
    }
}

/// Returns the index of the token closing the group opened at `start`.
fn find_close(tokens: &[Token], start: usize, open: TokenKind, close: TokenKind) -> Option<usize> {
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate().skip(start) {
        if token.kind == open {
            depth += 1;
        } else if token.kind == close {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}

/// Returns the index of the bar closing the absolute value opened at `start`.
///
/// A bar directly after an operator (or an opening bar) opens a nested absolute value; any other
/// bar closes the innermost one. `|2|x-3|-5|` is therefore read as `|2|*x-3*|-5|`, and an explicit
/// operator must be written to nest, as in `|2*|x-3|-5|`.
fn find_abs_close(tokens: &[Token], start: usize) -> Option<usize> {
    let mut depth = 1usize;
    let mut was_op = true;
    for (i, token) in tokens.iter().enumerate().skip(start + 1) {
        match token.kind {
            TokenKind::Bar if was_op => depth += 1,
            TokenKind::Bar => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            },
            TokenKind::Add
                | TokenKind::Sub
                | TokenKind::Mul
                | TokenKind::Div
                | TokenKind::OpenParen
                | TokenKind::OpenBracket => was_op = true,
            _ => was_op = false,
        }
    }
    None
}

/// Splits the tokens at every comma that is not nested inside a group.
fn split_arguments<'a, 's>(tokens: &'a [Token<'s>]) -> Vec<&'a [Token<'s>]> {
    let mut args = Vec::new();
    let mut depth = 0isize;
    let mut start = 0;
    for (i, token) in tokens.iter().enumerate() {
        match token.kind {
            TokenKind::OpenParen | TokenKind::OpenBracket => depth += 1,
            TokenKind::CloseParen | TokenKind::CloseBracket => depth -= 1,
            TokenKind::Comma if depth == 0 => {
                args.push(&tokens[start..i]);
                start = i + 1;
            },
            _ => (),
        }
    }
    args.push(&tokens[start..]);
    args
}

/// Returns the region covered by the tokens, or `fallback` if there are none.
fn span_of(tokens: &[Token], fallback: &Range<usize>) -> Range<usize> {
    match (tokens.first(), tokens.last()) {
        (Some(first), Some(last)) => first.span.start..last.span.end,
        _ => fallback.clone(),
    }
}

/// A parser for formulas, reading names against a [`NameScope`].
pub struct Parser<'a, S: NameScope + ?Sized> {
    scope: &'a S,
    config: ParserConfig,
}

impl<'a, S: NameScope + ?Sized> Parser<'a, S> {
    /// Creates a parser that reads names against the given scope.
    pub fn new(scope: &'a S, config: ParserConfig) -> Self {
        Self { scope, config }
    }

    /// Parses the source text into an expression tree.
    pub fn parse(&self, source: &str) -> Expr {
        let tokens = tokenize_complete(source)
            .into_vec()
            .into_iter()
            .filter(|token| !token.is_whitespace())
            .collect::<Vec<_>>();
        self.parse_tokens(&tokens, 0..source.len())
    }

    /// Parses a slice of tokens. `outer` is the region the tokens were taken from, used to point
    /// at empty groups.
    fn parse_tokens(&self, mut tokens: &[Token], outer: Range<usize>) -> Expr {
        let mut outer = outer;
        while tokens.len() >= 2
            && tokens[0].kind == TokenKind::OpenParen
            && find_close(tokens, 0, TokenKind::OpenParen, TokenKind::CloseParen) == Some(tokens.len() - 1)
        {
            outer = tokens[0].span.end..tokens[tokens.len() - 1].span.start;
            tokens = &tokens[1..tokens.len() - 1];
        }

        if tokens.is_empty() {
            return Expr::invalid(ParseIssue::new(outer, IssueKind::EmptyExpression), None);
        }

        let mut stacks = Stacks::new(&self.config);
        let mut issue = None;
        let mut i = 0;
        while i < tokens.len() {
            let token = &tokens[i];
            match token.kind {
                TokenKind::CloseParen => {
                    // an unmatched closing paren ends an implicit group that started at the left
                    stacks.resolve(None);
                    if !stacks.operands.is_empty() {
                        stacks.last = Some(Element::Operand);
                    }
                },
                TokenKind::OpenParen => {
                    let (expr, end) = self.parse_group(
                        tokens,
                        i,
                        find_close(tokens, i, TokenKind::OpenParen, TokenKind::CloseParen),
                        ')',
                        &outer,
                    );
                    stacks.push_operand(expr, &token.span);
                    i = end;
                },
                TokenKind::Bar => {
                    let (expr, end) = self.parse_group(tokens, i, find_abs_close(tokens, i), '|', &outer);
                    stacks.push_operand(Expr::function("abs", expr), &token.span);
                    i = end;
                },
                TokenKind::Number => {
                    stacks.push_operand(self.parse_number(token), &token.span);
                },
                TokenKind::Name => {
                    i = self.parse_name(tokens, i, &mut stacks, &outer);
                },
                kind if kind.is_operator() => {
                    let op = match kind {
                        TokenKind::Add => BinOp::Add,
                        TokenKind::Sub => BinOp::Sub,
                        TokenKind::Mul => BinOp::Mul,
                        TokenKind::Div => BinOp::Div,
                        TokenKind::Exp => BinOp::Pow,
                        TokenKind::Eq => BinOp::Eq,
                        TokenKind::And => BinOp::And,
                        _ => BinOp::Or,
                    };
                    let mut pending = PendingOp { kind: PendingKind::Binary(op), span: token.span.clone() };
                    if stacks.last != Some(Element::Operand) {
                        match op {
                            BinOp::Sub => pending.kind = PendingKind::Unary(UnaryOp::Neg),
                            BinOp::Div => pending.kind = PendingKind::Unary(UnaryOp::Recip),
                            _ => {
                                issue.get_or_insert_with(|| {
                                    ParseIssue::new(token.span.clone(), IssueKind::ConsecutiveOperators)
                                });
                            },
                        }
                    }
                    stacks.resolve(Some(pending));
                    stacks.last = Some(Element::Operator);
                },
                _ => {
                    issue.get_or_insert_with(|| {
                        ParseIssue::new(
                            token.span.clone(),
                            IssueKind::UnrecognizedSymbol { symbol: token.lexeme.to_string() },
                        )
                    });
                },
            }
            i += 1;
        }

        stacks.resolve(None);
        let expr = stacks.operands.pop().unwrap_or_else(|| {
            Expr::invalid(ParseIssue::new(outer.clone(), IssueKind::EmptyExpression), None)
        });
        match issue {
            Some(issue) => Expr::invalid(issue, Some(expr)),
            None => expr,
        }
    }

    /// Parses the contents of a group opened at `start`. If the group is never closed, everything
    /// up to the end of the tokens is parsed and the issue is recorded. Returns the expression and
    /// the index of the last consumed token.
    fn parse_group(
        &self,
        tokens: &[Token],
        start: usize,
        close: Option<usize>,
        close_symbol: char,
        outer: &Range<usize>,
    ) -> (Expr, usize) {
        let open = &tokens[start];
        match close {
            Some(end) => {
                let inner = open.span.end..tokens[end].span.start;
                (self.parse_tokens(&tokens[start + 1..end], inner), end)
            },
            None => {
                let inner = open.span.end..outer.end;
                let expr = self.parse_tokens(&tokens[start + 1..], inner);
                let issue = ParseIssue::new(open.span.clone(), IssueKind::Unbalanced { close: close_symbol });
                (Expr::invalid(issue, Some(expr)), tokens.len() - 1)
            },
        }
    }

    /// Parses a numeric literal.
    fn parse_number(&self, token: &Token) -> Expr {
        let value = token.lexeme.parse::<f64>().unwrap_or(f64::NAN);
        let number = Expr::number(Number::from_f64(value));
        if self.config.no_decimals && token.lexeme.contains('.') {
            let issue = ParseIssue::new(token.span.clone(), IssueKind::WholeNumbersOnly);
            Expr::invalid(issue, Some(number))
        } else {
            number
        }
    }

    /// Parses a name starting at the token at index `start`: a variable, a composite of bound
    /// names, a function call, a derivative or an indexed variable. Returns the index of the last
    /// consumed token.
    fn parse_name(&self, tokens: &[Token], start: usize, stacks: &mut Stacks, outer: &Range<usize>) -> usize {
        let token = &tokens[start];
        let mut name = token.lexeme;
        let mut offset = token.span.start;

        if !self.scope.is_bound(name) {
            if let Some(parts) = split_name(name, self.scope) {
                if let Some((last, rest)) = parts.split_last() {
                    for part in rest {
                        let span = offset..offset + part.len();
                        stacks.push_operand(Expr::var(*part), &span);
                        offset = span.end;
                    }
                    name = *last;
                }
            }
        }

        let span = offset..token.span.end;
        let next = tokens.get(start + 1).filter(|next| next.span.start == token.span.end);
        match next.map(|next| next.kind) {
            Some(TokenKind::OpenParen) if !self.scope.is_bound(name) => {
                let close = find_close(tokens, start + 1, TokenKind::OpenParen, TokenKind::CloseParen);
                let end = close.unwrap_or(tokens.len());
                let args = &tokens[start + 2..end];
                let args_span = tokens[start + 1].span.end..close.map_or(outer.end, |close| tokens[close].span.start);

                let mut expr = if name == "D" {
                    self.parse_derivative(args, &args_span)
                } else {
                    Expr::function(name, self.parse_tokens(args, args_span))
                };
                if close.is_none() {
                    let issue = ParseIssue::new(tokens[start + 1].span.clone(), IssueKind::Unbalanced { close: ')' });
                    expr = Expr::invalid(issue, Some(expr));
                }
                stacks.push_operand(expr, &span);
                end.min(tokens.len() - 1)
            },
            Some(TokenKind::OpenBracket) => {
                let (expr, end) = self.parse_index(name, tokens, start + 1, outer);
                stacks.push_operand(expr, &span);
                end
            },
            _ => {
                stacks.push_operand(Expr::var(name), &span);
                start
            },
        }
    }

    /// Parses the arguments of the derivative operator, `D(expr)`, `D(expr, var)` or
    /// `D(expr, var, at)`. The variable defaults to `x`.
    fn parse_derivative(&self, args: &[Token], args_span: &Range<usize>) -> Expr {
        let parts = split_arguments(args);
        let expr = match parts.first() {
            Some(part) => self.parse_tokens(part, span_of(part, args_span)),
            None => Expr::invalid(ParseIssue::new(args_span.clone(), IssueKind::EmptyExpression), None),
        };
        let at = parts.get(2).map(|part| self.parse_tokens(part, span_of(part, args_span)));

        match parts.get(1) {
            None => Expr::derivative(expr, "x", at),
            Some([var]) if var.kind == TokenKind::Name => Expr::derivative(expr, var.lexeme, at),
            Some(part) => {
                let issue = ParseIssue::new(span_of(part, args_span), IssueKind::DerivativeVariable);
                Expr::invalid(issue, Some(Expr::derivative(expr, "x", at)))
            },
        }
    }

    /// Parses an indexed variable whose opening bracket is at index `open`. Returns the expression
    /// and the index of the last consumed token.
    fn parse_index(&self, name: &str, tokens: &[Token], open: usize, outer: &Range<usize>) -> (Expr, usize) {
        let close = find_close(tokens, open, TokenKind::OpenBracket, TokenKind::CloseBracket);
        let end = close.unwrap_or(tokens.len());
        let inner = &tokens[open + 1..end];
        let bracket_span = tokens[open].span.start..close.map_or(outer.end, |close| tokens[close].span.end);
        let last = end.min(tokens.len() - 1);

        if inner.iter().any(|token| token.kind == TokenKind::OpenBracket) {
            let issue = ParseIssue::new(bracket_span, IssueKind::NestedSubscript);
            return (Expr::invalid(issue, Some(Expr::var(name))), last);
        }

        let inner_span = tokens[open].span.end..close.map_or(outer.end, |close| tokens[close].span.start);
        let index = self.parse_tokens(inner, inner_span);
        let names = index.dependencies();
        let expr = Expr::Index(Index { name: name.to_string(), index: Box::new(index) });

        let expr = if close.is_none() {
            let issue = ParseIssue::new(tokens[open].span.clone(), IssueKind::Unbalanced { close: ']' });
            Expr::invalid(issue, Some(expr))
        } else if names.len() > 1 {
            let issue = ParseIssue::new(bracket_span, IssueKind::MultipleIndexVariables { names });
            Expr::invalid(issue, Some(expr))
        } else {
            expr
        };
        (expr, last)
    }
}

/// Parses the source text with no bound names and the default configuration.
pub fn parse(source: &str) -> Expr {
    Parser::new(&(), ParserConfig::default()).parse(source)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    /// Parses the source and compares the canonical form of the result.
    fn roundtrip(source: &str, expected: &str) {
        let expr = parse(source);
        assert!(!expr.has_parsing_error(), "{:?}", expr.parsing_error());
        assert_eq!(expr.to_string(), expected);
    }

    fn issue_of(source: &str) -> IssueKind {
        match parse(source).parsing_error() {
            Some(issue) => issue.kind.clone(),
            None => panic!("no issue in `{}`", source),
        }
    }

    #[test]
    fn precedence() {
        roundtrip("1+2*3", "1+2*3");
        roundtrip("(1+2)*3", "(1+2)*3");
        roundtrip("2^3^2", "2^3^2");
        roundtrip("2^(3^2)", "2^(3^2)");
        roundtrip("a=b & c=d $ e", "a=b&c=d$e");
    }

    #[test]
    fn left_associative() {
        let expr = parse("x-y-z");
        let Expr::Binary(binary) = &expr else { panic!("{:?}", expr) };
        assert_eq!(binary.op, BinOp::Sub);
        assert_eq!(binary.rhs.to_string(), "z");
        assert_eq!(binary.lhs.to_string(), "x-y");
    }

    #[test]
    fn implicit_multiplication() {
        let expr = parse("2(3)");
        assert_eq!(
            expr,
            Expr::binary(BinOp::Mul, Expr::integer(2), Expr::integer(3)),
        );
        roundtrip("2x^2", "2*x^2");
        roundtrip("(x+1)(x-1)", "(x+1)*(x-1)");
    }

    #[test]
    fn redundant_parens_are_stripped() {
        roundtrip("((x+1))", "x+1");
        roundtrip("(x)(y)", "x*y");
    }

    #[test]
    fn unary_operators() {
        assert_eq!(parse("-5"), Expr::integer(-5));
        assert_eq!(parse("2^-3"), Expr::binary(BinOp::Pow, Expr::integer(2), Expr::integer(-3)));
        assert_eq!(parse("-x"), Expr::unary(UnaryOp::Neg, Expr::var("x")));
        assert_eq!(parse("/x"), Expr::unary(UnaryOp::Recip, Expr::var("x")));
        roundtrip("-x^2", "-x^2");
        roundtrip("-3^2", "-3^2");
    }

    #[test]
    fn negative_numbers_off() {
        let config = ParserConfig { negative_numbers: false, ..Default::default() };
        let expr = Parser::new(&(), config).parse("-5");
        assert_eq!(expr, Expr::unary(UnaryOp::Neg, Expr::integer(5)));
    }

    #[test]
    fn absolute_value() {
        assert_eq!(parse("|-5|"), Expr::function("abs", Expr::integer(-5)));
        roundtrip("|2*|x-3|-5|", "abs(2*abs(x-3)-5)");
        roundtrip("|2|x-3|-5|", "abs(2)*x-3*abs(-5)");
    }

    #[test]
    fn functions() {
        roundtrip("sin(x)cos(x)", "sin(x)*cos(x)");
        roundtrip("log(x)", "ln(x)");
        roundtrip("f''(2x)", "f''(2*x)");
        roundtrip("sin (x)", "sin*x");
    }

    #[test]
    fn bound_names_are_not_functions() {
        let scope: &[&str] = &["a", "x"];
        let expr = Parser::new(scope, ParserConfig::default()).parse("a(x+1)");
        assert_eq!(expr.to_string(), "a*(x+1)");
    }

    #[test]
    fn composite_names() {
        let scope: &[&str] = &["a", "b", "c"];
        let expr = Parser::new(scope, ParserConfig::default()).parse("abc+1");
        assert_eq!(expr.to_string(), "a*b*c+1");

        let expr = Parser::new(scope, ParserConfig::default()).parse("abd");
        assert_eq!(expr, Expr::var("abd"));
    }

    #[test]
    fn derivatives() {
        assert_eq!(
            parse("D(x^2,x)"),
            Expr::derivative(Expr::binary(BinOp::Pow, Expr::var("x"), Expr::integer(2)), "x", None),
        );
        assert_eq!(parse("D(t^2)"), Expr::derivative(
            Expr::binary(BinOp::Pow, Expr::var("t"), Expr::integer(2)),
            "x",
            None,
        ));
        roundtrip("D(sin(t), t, 2*pi)", "D(sin(t),t,2*pi)");
        assert_eq!(issue_of("D(x^2, 2)"), IssueKind::DerivativeVariable);
    }

    #[test]
    fn indexed_variables() {
        roundtrip("a[k+1]*2", "a[k+1]*2");
        assert_eq!(issue_of("a[a[1]]"), IssueKind::NestedSubscript);
        assert_eq!(
            issue_of("a[j+k]"),
            IssueKind::MultipleIndexVariables { names: vec!["j".to_string(), "k".to_string()] },
        );
    }

    #[test]
    fn unbalanced_groups() {
        let expr = parse("(2+3");
        assert!(expr.has_parsing_error());
        assert_eq!(issue_of("(2+3"), IssueKind::Unbalanced { close: ')' });
        assert_eq!(issue_of("|x"), IssueKind::Unbalanced { close: '|' });
        assert_eq!(issue_of("sin(x"), IssueKind::Unbalanced { close: ')' });
    }

    #[test]
    fn unmatched_close_paren() {
        roundtrip("1+2)*3", "(1+2)*3");
    }

    #[test]
    fn missing_values() {
        assert_eq!(issue_of("x+"), IssueKind::MissingValue { op: '+' });
        assert_eq!(issue_of("-"), IssueKind::MissingValue { op: '-' });
        assert_eq!(issue_of(""), IssueKind::EmptyExpression);
        assert_eq!(issue_of("()"), IssueKind::EmptyExpression);
    }

    #[test]
    fn consecutive_operators() {
        let expr = parse("2*+3");
        let issue = expr.parsing_error().cloned();
        assert_eq!(issue, Some(ParseIssue::new(2..3, IssueKind::ConsecutiveOperators)));
    }

    #[test]
    fn decimals() {
        assert_eq!(parse("2.5"), Expr::number(Number::real(2.5)));
        assert_eq!(parse("2.0"), Expr::integer(2));
        assert_eq!(parse("1e3"), Expr::integer(1000));

        let config = ParserConfig { no_decimals: true, ..Default::default() };
        let expr = Parser::new(&(), config).parse("1.5");
        assert_eq!(expr.parsing_error().map(|issue| issue.kind.clone()), Some(IssueKind::WholeNumbersOnly));
    }

    #[test]
    fn unrecognized_symbols() {
        assert_eq!(issue_of("2 # 3"), IssueKind::UnrecognizedSymbol { symbol: "#".to_string() });
    }
}
