//! Embedded `$(...)` expression interpolation

use settee_core::ShellError;

/// Expand `$(expr)` spans in `template` by calling `evaluate` on each
/// captured expression text.
///
/// `\` escapes the next character. A `$` not followed by `(` is emitted
/// verbatim. Spans do not nest: the first unescaped `)` closes the span,
/// so expressions cannot contain literal parentheses. A span left open at
/// the end of input is an `UnterminatedExpression` error.
pub fn interpolate<F>(template: &str, mut evaluate: F) -> Result<String, ShellError>
where
    F: FnMut(&str) -> Result<String, ShellError>,
{
    let mut out = String::new();
    let mut escape = false;
    let mut dollar = false;
    let mut expr: Option<String> = None;

    for c in template.chars() {
        if escape {
            out.push(c);
            escape = false;
            continue;
        } else if c == '\\' {
            escape = true;
        } else if c == '$' {
            dollar = true;
            continue;
        } else if c == '(' {
            if dollar {
                expr = Some(String::new());
            } else {
                out.push('(');
            }
        } else if c == ')' {
            if let Some(captured) = expr.take() {
                out.push_str(&evaluate(&captured)?);
            } else {
                out.push(')');
            }
        } else if dollar {
            // the pending `$` did not open a span; emit it and process the
            // current character as usual
            out.push('$');
            if let Some(captured) = expr.as_mut() {
                captured.push(c);
            } else {
                out.push(c);
            }
        } else if let Some(captured) = expr.as_mut() {
            captured.push(c);
        } else {
            out.push(c);
        }
        dollar = false;
    }

    if expr.is_some() {
        return Err(ShellError::UnterminatedExpression);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upper(expr: &str) -> Result<String, ShellError> {
        Ok(expr.to_uppercase())
    }

    #[test]
    fn test_plain_text_passes_through() {
        assert_eq!(interpolate("hello world", upper).unwrap(), "hello world");
        assert_eq!(interpolate("", upper).unwrap(), "");
    }

    #[test]
    fn test_single_span() {
        assert_eq!(interpolate("a$(x)b", upper).unwrap(), "aXb");
    }

    #[test]
    fn test_multiple_spans() {
        assert_eq!(interpolate("$(a)-$(b)", upper).unwrap(), "A-B");
    }

    #[test]
    fn test_escaped_dollar_is_literal() {
        assert_eq!(interpolate("a\\$(x)b", upper).unwrap(), "a$(x)b");
    }

    #[test]
    fn test_bare_dollar_is_verbatim() {
        assert_eq!(interpolate("$b", upper).unwrap(), "$b");
        assert_eq!(interpolate("a$", upper).unwrap(), "a");
    }

    #[test]
    fn test_parens_without_dollar_are_literal() {
        assert_eq!(interpolate("f(x)", upper).unwrap(), "f(x)");
    }

    #[test]
    fn test_spans_do_not_nest() {
        // the inner `$(` restarts the capture and the first `)` closes it
        assert_eq!(interpolate("$(a$(b)c)", upper).unwrap(), "Bc)");
    }

    #[test]
    fn test_escape_inside_span_emits_to_output() {
        // an escaped character bypasses the capture and lands in the output
        assert_eq!(interpolate("$(a\\zb)", upper).unwrap(), "zAB");
    }

    #[test]
    fn test_dollar_inside_span_lands_in_output() {
        // a `$` inside a span that opens no new span is emitted, not captured
        assert_eq!(interpolate("$(a$b)", upper).unwrap(), "$AB");
    }

    #[test]
    fn test_unterminated_span_is_an_error() {
        assert!(matches!(
            interpolate("a$(x", upper),
            Err(ShellError::UnterminatedExpression)
        ));
    }

    #[test]
    fn test_evaluation_error_propagates() {
        let result = interpolate("$(x)", |_| Err(ShellError::user("boom")));
        assert!(matches!(result, Err(ShellError::User(msg)) if msg == "boom"));
    }
}
