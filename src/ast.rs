use crate::source::Span;
use std::fmt; // For rendering nodes back to source

/// An expression: the right-hand side of a declaration, a print operand, or a
/// condition operand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprKind {
    StringLiteral(String),
    NumberLiteral(i64),
    Identifier(String),
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }

    pub fn new_string(s: &str, span: Span) -> Self {
        Expr::new(ExprKind::StringLiteral(s.to_string()), span)
    }

    pub fn new_number(n: i64, span: Span) -> Self {
        Expr::new(ExprKind::NumberLiteral(n), span)
    }

    pub fn new_identifier(name: &str, span: Span) -> Self {
        Expr::new(ExprKind::Identifier(name.to_string()), span)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CompareOp {
    Equals,
    NotEquals,
    GreaterThan,
    LessThan,
}

impl CompareOp {
    pub fn as_str(self) -> &'static str {
        match self {
            CompareOp::Equals => "==",
            CompareOp::NotEquals => "!=",
            CompareOp::GreaterThan => ">",
            CompareOp::LessThan => "<",
        }
    }
}

/// `left op right`, as found after `if`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub left: Expr,
    pub op: CompareOp,
    pub right: Expr,
    pub span: Span,
}

/// The iteration count of a `fordude` loop: `range(limit)`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Range {
    pub limit: i64,
    pub span: Span,
}

/// A braced statement list. Runs in its own scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stmt {
    pub kind: StmtKind, // The statement itself
    pub span: Span,     // The source span it covers
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StmtKind {
    /// `out->value` or `out->value+addend`
    Print {
        value: Expr,
        addend: Option<Expr>,
    },
    /// `var(name=value)`
    VarDecl { name: String, value: Expr },
    If {
        condition: Condition,
        body: Block,
        else_body: Option<Block>,
    },
    ForLoop {
        var: String,
        range: Range,
        body: Block,
    },
    Block(Block),
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Stmt { kind, span }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::StringLiteral(s) => write!(f, "\"{}\"", s),
            ExprKind::NumberLiteral(n) => write!(f, "{}", n),
            ExprKind::Identifier(name) => write!(f, "{}", name),
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.left, self.op, self.right)
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.statements.is_empty() {
            return write!(f, "{{ }}");
        }
        write!(f, "{{ ")?;
        for stmt in &self.statements {
            write!(f, "{} ", stmt)?;
        }
        write!(f, "}}")
    }
}

// Renders the statement as canonical source, which lexes and parses back to
// the same tree.
impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            StmtKind::Print { value, addend } => match addend {
                Some(addend) => write!(f, "out->{}+{}", value, addend),
                None => write!(f, "out->{}", value),
            },
            StmtKind::VarDecl { name, value } => write!(f, "var({}={})", name, value),
            StmtKind::If {
                condition,
                body,
                else_body,
            } => {
                write!(f, "if {} {}", condition, body)?;
                if let Some(else_body) = else_body {
                    write!(f, " else {}", else_body)?;
                }
                Ok(())
            }
            StmtKind::ForLoop { var, range, body } => {
                write!(f, "fordude {} in range({}) {}", var, range.limit, body)
            }
            StmtKind::Block(block) => write!(f, "{}", block),
        }
    }
}
