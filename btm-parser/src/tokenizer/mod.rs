pub mod token;

use logos::{Lexer, Logos};
pub use token::{Token, TokenKind};

/// Returns an iterator over the token kinds produced by the tokenizer.
pub fn tokenize(input: &str) -> Lexer<TokenKind> {
    TokenKind::lexer(input)
}

/// Returns an owned array containing all of the tokens produced by the tokenizer. Characters the
/// lexer cannot classify become [`TokenKind::Symbol`] tokens.
pub fn tokenize_complete(input: &str) -> Box<[Token]> {
    let mut lexer = tokenize(input);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        tokens.push(Token {
            span: lexer.span(),
            kind: result.unwrap_or(TokenKind::Symbol),
            lexeme: lexer.slice(),
        });
    }

    tokens.into_boxed_slice()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    /// Compares the tokens produced by the tokenizer to the raw expected tokens.
    fn compare_tokens<'source, const N: usize>(input: &'source str, expected: [(TokenKind, &'source str); N]) {
        let mut lexer = tokenize(input);

        for (expected_kind, expected_lexeme) in expected.into_iter() {
            assert_eq!(lexer.next(), Some(Ok(expected_kind)));
            assert_eq!(lexer.slice(), expected_lexeme);
        }

        assert_eq!(lexer.next(), None);
    }

    #[test]
    fn basic_expr() {
        compare_tokens(
            "1 + 2x",
            [
                (TokenKind::Number, "1"),
                (TokenKind::Whitespace, " "),
                (TokenKind::Add, "+"),
                (TokenKind::Whitespace, " "),
                (TokenKind::Number, "2"),
                (TokenKind::Name, "x"),
            ],
        );
    }

    #[test]
    fn numbers() {
        compare_tokens(
            "3.25e-4 .5 7.",
            [
                (TokenKind::Number, "3.25e-4"),
                (TokenKind::Whitespace, " "),
                (TokenKind::Number, ".5"),
                (TokenKind::Whitespace, " "),
                (TokenKind::Number, "7."),
            ],
        );
    }

    #[test]
    fn names_with_primes() {
        compare_tokens(
            "f''(x_1)*a[k]",
            [
                (TokenKind::Name, "f''"),
                (TokenKind::OpenParen, "("),
                (TokenKind::Name, "x_1"),
                (TokenKind::CloseParen, ")"),
                (TokenKind::Mul, "*"),
                (TokenKind::Name, "a"),
                (TokenKind::OpenBracket, "["),
                (TokenKind::Name, "k"),
                (TokenKind::CloseBracket, "]"),
            ],
        );
    }

    #[test]
    fn logic_and_bars() {
        compare_tokens(
            "|x|=1 $ y & z #",
            [
                (TokenKind::Bar, "|"),
                (TokenKind::Name, "x"),
                (TokenKind::Bar, "|"),
                (TokenKind::Eq, "="),
                (TokenKind::Number, "1"),
                (TokenKind::Whitespace, " "),
                (TokenKind::Or, "$"),
                (TokenKind::Whitespace, " "),
                (TokenKind::Name, "y"),
                (TokenKind::Whitespace, " "),
                (TokenKind::And, "&"),
                (TokenKind::Whitespace, " "),
                (TokenKind::Name, "z"),
                (TokenKind::Whitespace, " "),
                (TokenKind::Symbol, "#"),
            ],
        );
    }

    #[test]
    fn complete_skips_nothing() {
        let tokens = tokenize_complete("2 @x");
        let kinds = tokens.iter().map(|token| token.kind).collect::<Vec<_>>();
        assert_eq!(kinds, vec![TokenKind::Number, TokenKind::Whitespace, TokenKind::Symbol, TokenKind::Name]);
        assert_eq!(tokens[2].span, 2..3);
    }
}
