use crate::Span;
use crate::ast::{Block, CompareOp, Condition, Expr, ExprKind, Range, Stmt, StmtKind};
use crate::lexer::{Token, TokenKind};
use std::iter::Peekable;
use std::vec::IntoIter; // To iterate over Vec<Token>

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Parse Error [at {}]: Unexpected token '{}', expected {expected}", .found.span, .found)]
    UnexpectedToken { found: Token, expected: String },
    #[error("Parse Error: Unexpected end of input. Expected {0}")]
    UnexpectedEof(String),
    #[error("Parse Error [at {span}]: Invalid number '{text}'")]
    InvalidNumber { text: String, span: Span },
    #[error("Parse Error [at {span}]: Blocks nested more than {} deep", MAX_NESTING)]
    TooDeep { span: Span },
}

/// Deepest block nesting the parser accepts.
pub const MAX_NESTING: usize = 256;

// Result type alias for convenience
pub type ParseResult<T> = Result<T, ParseError>;

/// Recursive-descent parser over a token stream, one token of lookahead.
///
/// Inside a production every mismatch is fatal and aborts the whole parse.
/// Only [`Parser::parse`] is lenient: at the top level, tokens that cannot
/// start a statement are skipped.
pub struct Parser {
    // We iterate over owned Tokens, consuming them.
    tokens: Peekable<IntoIter<Token>>,
    // Blocks currently open.
    depth: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser {
            tokens: tokens.into_iter().peekable(),
            depth: 0,
        }
    }

    // Kind of the current token, without consuming it.
    fn current_kind(&mut self) -> Option<TokenKind> {
        self.tokens.peek().map(|token| token.kind)
    }

    // Consumes the current token.
    fn advance(&mut self) -> Option<Token> {
        self.tokens.next()
    }

    // Builds the error for "the current token is not what this rule needs".
    fn unexpected(&mut self, expected: &str) -> ParseError {
        match self.tokens.peek() {
            Some(found) => ParseError::UnexpectedToken {
                found: found.clone(),
                expected: expected.to_string(),
            },
            None => ParseError::UnexpectedEof(expected.to_string()),
        }
    }

    // Consumes the current token if it has the given kind.
    fn expect(&mut self, kind: TokenKind, expected: &str) -> ParseResult<Token> {
        match self.tokens.next_if(|token| token.kind == kind) {
            Some(token) => Ok(token),
            None => Err(self.unexpected(expected)),
        }
    }

    /// Parses the whole token stream into the ordered list of top-level
    /// statements.
    pub fn parse(mut self) -> ParseResult<Vec<Stmt>> {
        let mut statements = Vec::new();
        while let Some(kind) = self.current_kind() {
            if starts_statement(kind) {
                statements.push(self.parse_statement()?);
            } else {
                self.advance();
            }
        }
        Ok(statements)
    }

    /// Statement := PrintStmt | VarDecl | ForLoop | IfStmt | Block
    pub fn parse_statement(&mut self) -> ParseResult<Stmt> {
        match self.current_kind() {
            Some(TokenKind::Out) => self.parse_print(),
            Some(TokenKind::Var) => self.parse_var_decl(),
            Some(TokenKind::ForDude) => self.parse_for_loop(),
            Some(TokenKind::If) => self.parse_if(),
            Some(TokenKind::LBrace) => {
                let block = self.parse_block()?;
                let span = block.span;
                Ok(Stmt::new(StmtKind::Block(block), span))
            }
            _ => Err(self.unexpected("a statement ('out', 'var', 'fordude', 'if' or '{')")),
        }
    }

    /// PrintStmt := 'out' '->' Expr ( '+' Expr )?
    fn parse_print(&mut self) -> ParseResult<Stmt> {
        let out = self.expect(TokenKind::Out, "'out'")?;
        self.expect(TokenKind::Arrow, "'->' after 'out'")?;
        let value = self.parse_expression()?;

        let addend = if self
            .tokens
            .next_if(|token| token.kind == TokenKind::Plus)
            .is_some()
        {
            Some(self.parse_expression()?)
        } else {
            None
        };

        let end = addend.as_ref().unwrap_or(&value).span;
        Ok(Stmt::new(
            StmtKind::Print { value, addend },
            out.span.merge(end),
        ))
    }

    /// VarDecl := 'var' '(' Identifier '=' Expr ')'
    fn parse_var_decl(&mut self) -> ParseResult<Stmt> {
        let var = self.expect(TokenKind::Var, "'var'")?;
        self.expect(TokenKind::LParen, "'(' after 'var'")?;
        let name = self.expect(TokenKind::Identifier, "a variable name")?;
        self.expect(TokenKind::Assign, "'=' after the variable name")?;
        let value = self.parse_expression()?;
        let rparen = self.expect(TokenKind::RParen, "')' to close the declaration")?;

        Ok(Stmt::new(
            StmtKind::VarDecl {
                name: name.text,
                value,
            },
            var.span.merge(rparen.span),
        ))
    }

    /// IfStmt := 'if' Condition Block ( 'else' Block )?
    fn parse_if(&mut self) -> ParseResult<Stmt> {
        let keyword = self.expect(TokenKind::If, "'if'")?;
        let condition = self.parse_condition()?;
        let body = self.parse_block()?;

        let else_body = if self
            .tokens
            .next_if(|token| token.kind == TokenKind::Else)
            .is_some()
        {
            Some(self.parse_block()?)
        } else {
            None
        };

        let end = else_body.as_ref().unwrap_or(&body).span;
        Ok(Stmt::new(
            StmtKind::If {
                condition,
                body,
                else_body,
            },
            keyword.span.merge(end),
        ))
    }

    /// ForLoop := 'fordude' Identifier 'in' 'range' '(' Number ')' Block
    fn parse_for_loop(&mut self) -> ParseResult<Stmt> {
        let keyword = self.expect(TokenKind::ForDude, "'fordude'")?;
        let var = self.expect(TokenKind::Identifier, "a loop variable name")?;
        self.expect(TokenKind::In, "'in' after the loop variable")?;
        let range_keyword = self.expect(TokenKind::Range, "'range'")?;
        self.expect(TokenKind::LParen, "'(' after 'range'")?;
        let limit = self.expect(TokenKind::Number, "a number literal")?;
        let limit_value = parse_integer(&limit)?;
        let rparen = self.expect(TokenKind::RParen, "')' to close the range")?;
        let body = self.parse_block()?;

        let span = keyword.span.merge(body.span);
        Ok(Stmt::new(
            StmtKind::ForLoop {
                var: var.text,
                range: Range {
                    limit: limit_value,
                    span: range_keyword.span.merge(rparen.span),
                },
                body,
            },
            span,
        ))
    }

    /// Block := '{' Statement* '}'
    fn parse_block(&mut self) -> ParseResult<Block> {
        let lbrace = self.expect(TokenKind::LBrace, "'{' to open a block")?;
        if self.depth >= MAX_NESTING {
            return Err(ParseError::TooDeep { span: lbrace.span });
        }
        self.depth += 1;
        let block = self.parse_block_body(lbrace.span);
        self.depth -= 1;
        block
    }

    fn parse_block_body(&mut self, open: Span) -> ParseResult<Block> {
        let mut statements = Vec::new();
        loop {
            match self.current_kind() {
                Some(TokenKind::RBrace) => break,
                None => return Err(ParseError::UnexpectedEof("'}' to close the block".to_string())),
                Some(_) => statements.push(self.parse_statement()?),
            }
        }

        let rbrace = self.expect(TokenKind::RBrace, "'}' to close the block")?;
        Ok(Block {
            statements,
            span: open.merge(rbrace.span),
        })
    }

    /// Condition := Primary Operator Primary
    fn parse_condition(&mut self) -> ParseResult<Condition> {
        let left = self.parse_primary()?;
        let op = self.parse_operator()?;
        let right = self.parse_primary()?;
        let span = left.span.merge(right.span);
        Ok(Condition {
            left,
            op,
            right,
            span,
        })
    }

    fn parse_operator(&mut self) -> ParseResult<CompareOp> {
        let op = match self.current_kind() {
            Some(TokenKind::EqualEqual) => CompareOp::Equals,
            Some(TokenKind::NotEqual) => CompareOp::NotEquals,
            Some(TokenKind::Greater) => CompareOp::GreaterThan,
            Some(TokenKind::Less) => CompareOp::LessThan,
            _ => {
                return Err(self.unexpected("a comparison operator ('==', '!=', '>' or '<')"));
            }
        };
        self.advance();
        Ok(op)
    }

    /// Primary := Number | Identifier
    fn parse_primary(&mut self) -> ParseResult<Expr> {
        match self.current_kind() {
            Some(TokenKind::Number) | Some(TokenKind::Identifier) => self.parse_expression(),
            _ => Err(self.unexpected("a number or identifier")),
        }
    }

    /// Expr := String | Number | Identifier
    fn parse_expression(&mut self) -> ParseResult<Expr> {
        match self.current_kind() {
            Some(TokenKind::String) | Some(TokenKind::Number) | Some(TokenKind::Identifier) => {}
            _ => return Err(self.unexpected("an expression (string, number or identifier)")),
        }
        let token = self
            .advance()
            .ok_or_else(|| ParseError::UnexpectedEof("an expression".to_string()))?;

        let kind = match token.kind {
            TokenKind::String => ExprKind::StringLiteral(token.text),
            TokenKind::Number => ExprKind::NumberLiteral(parse_integer(&token)?),
            _ => ExprKind::Identifier(token.text),
        };
        Ok(Expr::new(kind, token.span))
    }
}

fn starts_statement(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Out | TokenKind::Var | TokenKind::ForDude | TokenKind::If | TokenKind::LBrace
    )
}

fn parse_integer(token: &Token) -> ParseResult<i64> {
    token
        .text
        .parse::<i64>()
        .map_err(|_| ParseError::InvalidNumber {
            text: token.text.clone(),
            span: token.span,
        })
}

// Helper function to lex and parse a string directly (useful for tests and REPL)
pub fn parse_str(input: &str) -> ParseResult<Vec<Stmt>> {
    let tokens = crate::lexer::tokenize(input);
    Parser::new(tokens).parse()
}
