//! Embedded expression evaluation
//!
//! The expression language is deliberately small: a bare identifier
//! resolves as a shell variable, and trailing dot-separated segments
//! traverse JSON members, array elements, and response fields.

use crate::context::ShellContext;
use settee_core::{ShellError, Value};

pub(crate) fn eval_expr(shell: &mut ShellContext, expr: &str) -> Result<Value, ShellError> {
    let expr = expr.trim();
    let mut segments = expr.split('.');
    let root = segments.next().unwrap_or("");
    if !is_identifier(root) {
        return Err(ShellError::InvalidExpression(expr.to_string()));
    }
    let mut value = shell.lookup_var(root)?;
    for segment in segments {
        if segment.is_empty() {
            return Err(ShellError::InvalidExpression(expr.to_string()));
        }
        value = value
            .get(segment)
            .ok_or_else(|| ShellError::User(format!("no member `{segment}'")))?;
    }
    Ok(value)
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
