use crate::ast::{Block, CompareOp, Condition, Expr, ExprKind, Range, Stmt, StmtKind};
use crate::environment::{EnvError, Environment};
use crate::source::Span;
use crate::value::Value;
use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

// --- Evaluation Error ---
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("{0}")]
    EnvError(#[from] EnvError), // Errors from environment lookup
    #[error(
        "Evaluation Error [at {span}]: '{operator}' expects {expected}, but got {}",
        .found.type_name()
    )]
    TypeMismatch {
        operator: &'static str,
        expected: &'static str,
        found: Value,
        span: Span,
    },
    #[error("Output Error: {0}")]
    Output(String), // Writing a printed line failed
}

// Result type alias for convenience
pub type EvalResult<T = ()> = Result<T, EvalError>;

// --- Interpret ---

/// Runs a program's top-level statements in order, in the given environment.
/// Stops at the first error; lines printed before it stay printed.
pub fn interpret<W: Write>(
    program: &[Stmt],
    env: Rc<RefCell<Environment>>,
    out: &mut W,
) -> EvalResult {
    for stmt in program {
        execute(stmt, env.clone(), out)?;
    }
    Ok(())
}

/// Executes a single statement within the specified environment.
pub fn execute<W: Write>(stmt: &Stmt, env: Rc<RefCell<Environment>>, out: &mut W) -> EvalResult {
    match &stmt.kind {
        StmtKind::VarDecl { name, value } => {
            let value = evaluate(value, &env)?;
            env.borrow_mut().set(name.as_str(), value);
            Ok(())
        }
        StmtKind::Print { value, addend } => execute_print(value, addend.as_ref(), &env, out),
        StmtKind::Block(block) => execute_block(block, env, out),
        StmtKind::ForLoop { var, range, body } => execute_for_loop(var, range, body, env, out),
        StmtKind::If {
            condition,
            body,
            else_body,
        } => {
            if evaluate_condition(condition, &env)? {
                execute_block(body, env, out)
            } else if let Some(else_body) = else_body {
                execute_block(else_body, env, out)
            } else {
                Ok(())
            }
        }
    }
}

/// Evaluates an expression to a value.
pub fn evaluate(expr: &Expr, env: &Rc<RefCell<Environment>>) -> EvalResult<Value> {
    match &expr.kind {
        ExprKind::StringLiteral(s) => Ok(Value::Text(s.clone())),
        ExprKind::NumberLiteral(n) => Ok(Value::Integer(*n)),
        // Use the identifier's span for error reporting if lookup fails
        ExprKind::Identifier(name) => Ok(env.borrow().get(name, expr.span)?),
    }
}

fn execute_print<W: Write>(
    value: &Expr,
    addend: Option<&Expr>,
    env: &Rc<RefCell<Environment>>,
    out: &mut W,
) -> EvalResult {
    let first = evaluate(value, env)?;
    let line = match addend {
        None => first.to_string(),
        Some(addend) => {
            let second = evaluate(addend, env)?;
            match (first, second) {
                (Value::Text(left), Value::Text(right)) => left + &right,
                (Value::Text(_), found) => return Err(expected_string(found, addend.span)),
                (found, _) => return Err(expected_string(found, value.span)),
            }
        }
    };
    writeln!(out, "{}", line).map_err(|err| EvalError::Output(err.to_string()))
}

fn expected_string(found: Value, span: Span) -> EvalError {
    EvalError::TypeMismatch {
        operator: "+",
        expected: "string operands",
        found,
        span,
    }
}

// A block always gets a fresh scope; its bindings are gone once it exits.
fn execute_block<W: Write>(
    block: &Block,
    env: Rc<RefCell<Environment>>,
    out: &mut W,
) -> EvalResult {
    let block_env = Environment::new_enclosed(env);
    for stmt in &block.statements {
        execute(stmt, block_env.clone(), out)?;
    }
    Ok(())
}

fn execute_for_loop<W: Write>(
    var: &str,
    range: &Range,
    body: &Block,
    env: Rc<RefCell<Environment>>,
    out: &mut W,
) -> EvalResult {
    // One scope holds the loop variable for the whole loop; the body gets a
    // new scope inside it on every iteration.
    let loop_env = Environment::new_enclosed(env);
    for i in 0..range.limit {
        loop_env.borrow_mut().set(var, Value::Integer(i));
        execute_block(body, loop_env.clone(), out)?;
    }
    Ok(())
}

fn evaluate_condition(condition: &Condition, env: &Rc<RefCell<Environment>>) -> EvalResult<bool> {
    let left = evaluate(&condition.left, env)?;
    let right = evaluate(&condition.right, env)?;

    match condition.op {
        CompareOp::Equals => Ok(left == right),
        CompareOp::NotEquals => Ok(left != right),
        CompareOp::GreaterThan => {
            let (left, right) = integer_operands(condition, left, right)?;
            Ok(left > right)
        }
        CompareOp::LessThan => {
            let (left, right) = integer_operands(condition, left, right)?;
            Ok(left < right)
        }
    }
}

// Ordering comparisons are only defined on integers.
fn integer_operands(condition: &Condition, left: Value, right: Value) -> EvalResult<(i64, i64)> {
    let mismatch = |found: Value, span: Span| EvalError::TypeMismatch {
        operator: condition.op.as_str(),
        expected: "integer operands",
        found,
        span,
    };
    match (left, right) {
        (Value::Integer(left), Value::Integer(right)) => Ok((left, right)),
        (Value::Integer(_), found) => Err(mismatch(found, condition.right.span)),
        (found, _) => Err(mismatch(found, condition.left.span)),
    }
}
