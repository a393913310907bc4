use logos::Logos;
use std::fmt;

use crate::Span;

#[derive(Logos, Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[logos(skip r"\s+")] // Skip whitespace
#[logos(skip r"//[^\n]*")] // Skip line comments
#[logos(skip r"%[^%]*%?")] // Skip %delimited% comments, unterminated ones run to the end
pub enum TokenKind {
    #[token("var")]
    Var,
    #[token("out")]
    Out,
    #[token("if")]
    #[token("ifdude")]
    If,
    #[token("else")]
    Else,
    #[token("fordude")]
    ForDude,
    #[token("in")]
    In,
    #[token("range")]
    Range,
    #[token("=")]
    Assign,
    #[token("+")]
    Plus,
    #[token("->")]
    Arrow,
    #[token("==")]
    EqualEqual,
    #[token("!=")]
    NotEqual,
    #[token(">")]
    Greater,
    #[token("<")]
    Less,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    // No escapes; an unterminated string swallows the rest of the input.
    #[regex(r#""[^"]*"?"#)]
    String,
    #[regex(r"[0-9]+", priority = 3)]
    Number,
    #[regex(r#"[^\s=(){}<>+"%/!\-]+"#)]
    Identifier,
    // A '-', '!' or '/' that doesn't start '->', '!=' or '//'.
    #[regex(r"[-!/]")]
    Illegal,
}

impl TokenKind {
    pub fn is_keyword(self) -> bool {
        matches!(
            self,
            TokenKind::Var
                | TokenKind::Out
                | TokenKind::If
                | TokenKind::Else
                | TokenKind::ForDude
                | TokenKind::In
                | TokenKind::Range
        )
    }
}

// Used in parser messages: "expected '(' ..."
impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Var => write!(f, "'var'"),
            TokenKind::Out => write!(f, "'out'"),
            TokenKind::If => write!(f, "'if'"),
            TokenKind::Else => write!(f, "'else'"),
            TokenKind::ForDude => write!(f, "'fordude'"),
            TokenKind::In => write!(f, "'in'"),
            TokenKind::Range => write!(f, "'range'"),
            TokenKind::Assign => write!(f, "'='"),
            TokenKind::Plus => write!(f, "'+'"),
            TokenKind::Arrow => write!(f, "'->'"),
            TokenKind::EqualEqual => write!(f, "'=='"),
            TokenKind::NotEqual => write!(f, "'!='"),
            TokenKind::Greater => write!(f, "'>'"),
            TokenKind::Less => write!(f, "'<'"),
            TokenKind::LParen => write!(f, "'('"),
            TokenKind::RParen => write!(f, "')'"),
            TokenKind::LBrace => write!(f, "'{{'"),
            TokenKind::RBrace => write!(f, "'}}'"),
            TokenKind::String => write!(f, "string literal"),
            TokenKind::Number => write!(f, "number literal"),
            TokenKind::Identifier => write!(f, "identifier"),
            TokenKind::Illegal => write!(f, "illegal character"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text of the token; for strings, the contents between the quotes.
    pub text: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, span: Span) -> Self {
        Token {
            kind,
            text: text.into(),
            span,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::String => write!(f, "\"{}\"", self.text),
            _ => write!(f, "{}", self.text),
        }
    }
}

fn string_contents(slice: &str) -> &str {
    let inner = slice.strip_prefix('"').unwrap_or(slice);
    inner.strip_suffix('"').unwrap_or(inner)
}

/// Scans `input` into tokens.
///
/// Scanning never fails: unterminated strings and comments run to the end of
/// the input, and characters that start no token come out as
/// [`TokenKind::Illegal`] for the parser to deal with.
pub fn tokenize(input: &str) -> Vec<Token> {
    TokenKind::lexer(input)
        .spanned()
        .map(|(result, range)| {
            let slice = &input[range.clone()];
            match result {
                Ok(TokenKind::String) => {
                    Token::new(TokenKind::String, string_contents(slice), range.into())
                }
                Ok(kind) => Token::new(kind, slice, range.into()),
                Err(()) => Token::new(TokenKind::Illegal, slice, range.into()),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Helper to simplify testing token sequences
    fn assert_tokens(input: &str, expected: Vec<TokenKind>) {
        let kinds: Vec<TokenKind> = tokenize(input).into_iter().map(|t| t.kind).collect();
        assert_eq!(kinds, expected, "Input: '{}'", input);
    }

    // Checks kinds and texts together
    fn assert_token_texts(input: &str, expected: Vec<(TokenKind, &str)>) {
        let tokens: Vec<(TokenKind, String)> = tokenize(input)
            .into_iter()
            .map(|t| (t.kind, t.text))
            .collect();
        let expected: Vec<(TokenKind, String)> = expected
            .into_iter()
            .map(|(kind, text)| (kind, text.to_string()))
            .collect();
        assert_eq!(tokens, expected, "Input: '{}'", input);
    }

    #[test]
    fn test_empty_input() {
        assert_tokens("", vec![]);
        assert_tokens("  \n\t  ", vec![]);
    }

    #[test]
    fn test_keywords() {
        assert_tokens(
            "var out if ifdude else fordude in range",
            vec![
                TokenKind::Var,
                TokenKind::Out,
                TokenKind::If,
                TokenKind::If,
                TokenKind::Else,
                TokenKind::ForDude,
                TokenKind::In,
                TokenKind::Range,
            ],
        );
    }

    #[test]
    fn test_keyword_prefixes_are_identifiers() {
        assert_token_texts(
            "variable output iffy index ranger",
            vec![
                (TokenKind::Identifier, "variable"),
                (TokenKind::Identifier, "output"),
                (TokenKind::Identifier, "iffy"),
                (TokenKind::Identifier, "index"),
                (TokenKind::Identifier, "ranger"),
            ],
        );
    }

    #[test]
    fn test_operators_and_brackets() {
        assert_tokens(
            "= + -> == != > < ( ) { }",
            vec![
                TokenKind::Assign,
                TokenKind::Plus,
                TokenKind::Arrow,
                TokenKind::EqualEqual,
                TokenKind::NotEqual,
                TokenKind::Greater,
                TokenKind::Less,
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::LBrace,
                TokenKind::RBrace,
            ],
        );
    }

    #[test]
    fn test_two_char_operators_win() {
        assert_tokens("===", vec![TokenKind::EqualEqual, TokenKind::Assign]);
        assert_tokens("->>", vec![TokenKind::Arrow, TokenKind::Greater]);
    }

    #[test]
    fn test_numbers_and_identifiers() {
        assert_token_texts(
            "42 007 x1 12abc _tmp",
            vec![
                (TokenKind::Number, "42"),
                (TokenKind::Number, "007"),
                (TokenKind::Identifier, "x1"),
                (TokenKind::Identifier, "12abc"),
                (TokenKind::Identifier, "_tmp"),
            ],
        );
    }

    #[test]
    fn test_delimiters_end_words() {
        assert_token_texts(
            "out->x",
            vec![
                (TokenKind::Out, "out"),
                (TokenKind::Arrow, "->"),
                (TokenKind::Identifier, "x"),
            ],
        );
        assert_token_texts(
            "var(name=value)",
            vec![
                (TokenKind::Var, "var"),
                (TokenKind::LParen, "("),
                (TokenKind::Identifier, "name"),
                (TokenKind::Assign, "="),
                (TokenKind::Identifier, "value"),
                (TokenKind::RParen, ")"),
            ],
        );
        assert_token_texts(
            "a!=b",
            vec![
                (TokenKind::Identifier, "a"),
                (TokenKind::NotEqual, "!="),
                (TokenKind::Identifier, "b"),
            ],
        );
    }

    #[test]
    fn test_strings_are_verbatim() {
        assert_token_texts(r#""hello""#, vec![(TokenKind::String, "hello")]);
        assert_token_texts(r#""""#, vec![(TokenKind::String, "")]);
        assert_token_texts(
            r#""no \n escapes // here""#,
            vec![(TokenKind::String, r"no \n escapes // here")],
        );
        assert_token_texts(
            "\"two\nlines\"",
            vec![(TokenKind::String, "two\nlines")],
        );
    }

    #[test]
    fn test_unterminated_string_runs_to_end() {
        assert_token_texts(
            "out->\"hello world",
            vec![
                (TokenKind::Out, "out"),
                (TokenKind::Arrow, "->"),
                (TokenKind::String, "hello world"),
            ],
        );
        assert_token_texts("\"", vec![(TokenKind::String, "")]);
    }

    #[test]
    fn test_line_comments() {
        let input = "
            var(x=10) // define x
            // a whole comment line
            out->x // print it";
        assert_tokens(
            input,
            vec![
                TokenKind::Var,
                TokenKind::LParen,
                TokenKind::Identifier,
                TokenKind::Assign,
                TokenKind::Number,
                TokenKind::RParen,
                TokenKind::Out,
                TokenKind::Arrow,
                TokenKind::Identifier,
            ],
        );
        assert_tokens("// only a comment", vec![]);
    }

    #[test]
    fn test_delimited_comments() {
        assert_tokens(
            "out %this is\nskipped% ->1",
            vec![TokenKind::Out, TokenKind::Arrow, TokenKind::Number],
        );
        assert_tokens("%%", vec![]);
        assert_tokens("x % never closed out->1", vec![TokenKind::Identifier]);
    }

    #[test]
    fn test_stray_characters_are_illegal() {
        assert_token_texts(
            "a-b !c /",
            vec![
                (TokenKind::Identifier, "a"),
                (TokenKind::Illegal, "-"),
                (TokenKind::Identifier, "b"),
                (TokenKind::Illegal, "!"),
                (TokenKind::Identifier, "c"),
                (TokenKind::Illegal, "/"),
            ],
        );
    }

    #[test]
    fn test_program_tokens() {
        let input = r#"fordude i in range(3) { if i == 1 { out->"one" } }"#;
        assert_tokens(
            input,
            vec![
                TokenKind::ForDude,
                TokenKind::Identifier,
                TokenKind::In,
                TokenKind::Range,
                TokenKind::LParen,
                TokenKind::Number,
                TokenKind::RParen,
                TokenKind::LBrace,
                TokenKind::If,
                TokenKind::Identifier,
                TokenKind::EqualEqual,
                TokenKind::Number,
                TokenKind::LBrace,
                TokenKind::Out,
                TokenKind::Arrow,
                TokenKind::String,
                TokenKind::RBrace,
                TokenKind::RBrace,
            ],
        );
    }

    #[test]
    fn test_tokenize_spans() {
        let tokens = tokenize("out->\"hi\"");

        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].span, Span::new(0, 3));
        assert_eq!(tokens[1].span, Span::new(3, 5));
        // String spans cover the quotes even though the text doesn't.
        assert_eq!(tokens[2].span, Span::new(5, 9));
        assert_eq!(tokens[2].text, "hi");
    }

    #[test]
    fn test_unicode_identifiers() {
        assert_token_texts(
            "var(café=\"☕\")",
            vec![
                (TokenKind::Var, "var"),
                (TokenKind::LParen, "("),
                (TokenKind::Identifier, "café"),
                (TokenKind::Assign, "="),
                (TokenKind::String, "☕"),
                (TokenKind::RParen, ")"),
            ],
        );
    }
}
