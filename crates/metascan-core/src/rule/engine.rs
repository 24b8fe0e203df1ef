//! Expression evaluation for rule templates.
//!
//! Expressions are delimited by `[!` and `!]` and are limited to integer
//! addition and subtraction, applied strictly left to right. Placeholder
//! substitution happens before this pass, so an expression may be built
//! from substituted numeric values such as `[!%size%-%scale%!]`.
//!
//! Example: `DECIMAL([!10+4!],[!10-4!])` evaluates to `DECIMAL(14,6)`.

use crate::error::{ImportError, Result};

const EXPR_BEGIN: &str = "[!";
const EXPR_END: &str = "!]";

/// Replace each embedded expression in `rule` with its evaluated value.
///
/// A template without expressions is returned unchanged. An unterminated
/// or misplaced delimiter fails with the full rule text; a malformed
/// expression fails with the expression text.
pub fn process_rule(rule: &str) -> Result<String> {
    if !rule.contains(EXPR_BEGIN) {
        return Ok(rule.to_string());
    }

    let mut out = String::new();
    let mut from = 0;
    while from < rule.len() {
        let Some(start) = rule[from..].find(EXPR_BEGIN).map(|i| i + from) else {
            break;
        };
        // An expression has begun; without a terminator after it the rule
        // is invalid.
        let end = match rule[from..].find(EXPR_END).map(|i| i + from) {
            Some(end) if end >= start + EXPR_BEGIN.len() => end,
            _ => return Err(ImportError::InvalidRule(rule.to_string())),
        };
        let value = evaluate_expression(&rule[start + EXPR_BEGIN.len()..end])?;
        out.push_str(&rule[from..start]);
        out.push_str(&value);
        from = end + EXPR_END.len();
    }
    out.push_str(&rule[from..]);
    Ok(out)
}

/// Evaluate an addition/subtraction expression left to right.
pub fn evaluate_expression(expr: &str) -> Result<String> {
    if !is_valid(expr) {
        return Err(ImportError::InvalidExpression(expr.to_string()));
    }

    let mut total: i64 = 0;
    let mut term: i64 = 0;
    let mut sign: i64 = 1;
    for ch in expr.chars() {
        match ch {
            '0'..='9' => term = term * 10 + i64::from(ch as u8 - b'0'),
            '+' => {
                total += sign * term;
                term = 0;
                sign = 1;
            }
            '-' => {
                total += sign * term;
                term = 0;
                sign = -1;
            }
            _ => unreachable!("validated above"),
        }
    }
    total += sign * term;
    Ok(total.to_string())
}

/// Validate an expression against the grammar
///
/// ```text
/// expr     ::= integer | expr operator expr
/// integer  ::= digit | integer digit
/// operator ::= '+' | '-'
/// ```
///
/// in other words, one or more digits followed by zero or more of an
/// operator and one or more digits.
pub fn is_valid(expr: &str) -> bool {
    let mut expect_digit = true;
    let mut prev_digit = false;
    for ch in expr.chars() {
        match ch {
            '0'..='9' => {
                prev_digit = true;
                expect_digit = false;
            }
            '+' | '-' if prev_digit => {
                prev_digit = false;
                expect_digit = true;
            }
            _ => return false,
        }
    }
    !expect_digit
}
