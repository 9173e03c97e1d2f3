//! Statement execution and expression evaluation.
//!
//! Runtime failures here (undefined variable, division by zero, a `+`
//! between incompatible operand shapes) are never fatal: each is logged at
//! `warn!` and the offending (sub)expression evaluates to `Value::Null`,
//! per the non-fatal half of the error taxonomy. There is no `Result` in
//! this module's public surface for that reason.

use crate::ast::{BinaryOp, Block, Expr, ResponseBody, Stmt};
use crate::environment::Environment;
use crate::value::Value;

/// What a route body produced, ready to be framed as an HTTP response.
pub struct EvalOutput {
    pub content_type: &'static str,
    pub body: String,
}

/// Executes a route body's statements in order. Returns `None` if the body
/// never reaches a `response` statement — the dispatcher treats that as an
/// empty, `text/plain` 200.
pub fn execute_block(block: &Block, env: &mut Environment) -> Option<EvalOutput> {
    for stmt in &block.statements {
        match stmt {
            Stmt::Assignment { name, value } => {
                let v = eval_expr(value, env);
                env.set(name, v);
            }
            Stmt::Response(response) => return Some(execute_response(response, env)),
            Stmt::Identifier(_) => {
                // A no-op outside an `html` block's expression position.
            }
        }
    }
    None
}

fn execute_response(response: &crate::ast::Response, env: &mut Environment) -> EvalOutput {
    match &response.body {
        ResponseBody::Block(block) => {
            let rendered = eval_html_block(block, env);
            EvalOutput {
                content_type: "text/html",
                body: format!("<html><body>{rendered}</body></html>\n"),
            }
        }
        ResponseBody::Expr(expr) => {
            let value = eval_expr(expr, env);
            EvalOutput {
                content_type: "text/plain",
                body: format!("{value}\n"),
            }
        }
    }
}

/// A block reached only as an `html` response body is not executed as
/// statements: each `Identifier` statement contributes its looked-up,
/// stringified value; any other statement kind in this position is ignored.
fn eval_html_block(block: &Block, env: &Environment) -> String {
    let mut out = String::new();
    for stmt in &block.statements {
        if let Stmt::Identifier(name) = stmt {
            out.push_str(&lookup(name, env).to_string());
        }
    }
    out
}

fn lookup(name: &str, env: &Environment) -> Value {
    match env.get(name) {
        Some(value) => value.clone(),
        None => {
            tracing::warn!(variable = name, "undefined variable");
            Value::Null
        }
    }
}

pub fn eval_expr(expr: &Expr, env: &Environment) -> Value {
    match expr {
        Expr::String(s) => Value::String(s.clone()),
        Expr::Number(n) => Value::Number(*n),
        Expr::Identifier(name) => lookup(name, env),
        Expr::Binary { op, left, right } => {
            let l = eval_expr(left, env);
            let r = eval_expr(right, env);
            eval_binary(*op, l, r)
        }
    }
}

fn eval_binary(op: BinaryOp, left: Value, right: Value) -> Value {
    use BinaryOp::*;
    match op {
        Add => match (&left, &right) {
            (Value::String(_), _) | (_, Value::String(_)) => {
                Value::String(format!("{left}{right}"))
            }
            (Value::Number(a), Value::Number(b)) => Value::Number(a + b),
            _ => {
                tracing::warn!(
                    left = left.type_name(),
                    right = right.type_name(),
                    "'+' between incompatible operands"
                );
                Value::Null
            }
        },
        Sub => numeric(left, right, |a, b| a - b),
        Mul => numeric(left, right, |a, b| a * b),
        Div => match (left, right) {
            (Value::Number(a), Value::Number(b)) => {
                if b == 0.0 {
                    tracing::warn!("division by zero");
                    Value::Null
                } else {
                    Value::Number(a / b)
                }
            }
            (left, right) => {
                tracing::warn!(
                    left = left.type_name(),
                    right = right.type_name(),
                    "'/' between non-numeric operands"
                );
                Value::Null
            }
        },
        Lt => compare(left, right, |o| o.is_lt()),
        Gt => compare(left, right, |o| o.is_gt()),
        Le => compare(left, right, |o| o.is_le()),
        Ge => compare(left, right, |o| o.is_ge()),
        Eq => Value::Bool(values_equal(&left, &right)),
        Ne => Value::Bool(!values_equal(&left, &right)),
        And => Value::Bool(left.is_truthy() && right.is_truthy()),
        Or => Value::Bool(left.is_truthy() || right.is_truthy()),
    }
}

fn numeric(left: Value, right: Value, f: impl Fn(f64, f64) -> f64) -> Value {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Value::Number(f(a, b)),
        (left, right) => {
            tracing::warn!(
                left = left.type_name(),
                right = right.type_name(),
                "arithmetic between non-numeric operands"
            );
            Value::Null
        }
    }
}

fn compare(left: Value, right: Value, f: impl Fn(std::cmp::Ordering) -> bool) -> Value {
    match (&left, &right) {
        (Value::Number(a), Value::Number(b)) => match a.partial_cmp(b) {
            Some(ord) => Value::Bool(f(ord)),
            None => Value::Bool(false),
        },
        (Value::String(a), Value::String(b)) => Value::Bool(f(a.cmp(b))),
        _ => {
            tracing::warn!(
                left = left.type_name(),
                right = right.type_name(),
                "ordered comparison between incomparable operands"
            );
            Value::Bool(false)
        }
    }
}

fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        _ => false,
    }
}
