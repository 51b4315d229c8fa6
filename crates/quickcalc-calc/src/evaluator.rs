//! Expression evaluation.
//!
//! The state machine only depends on [`ExpressionEvaluator`]; the default
//! implementation wraps `meval`, which evaluates in IEEE doubles.

use crate::error::EvaluationError;

/// Evaluates an arithmetic expression string to a number.
///
/// Implementations report syntax problems as [`EvaluationError::Malformed`].
/// Non-finite values are returned as-is; the caller decides what they mean.
pub trait ExpressionEvaluator {
    fn evaluate(&self, expression: &str) -> Result<f64, EvaluationError>;
}

impl<F> ExpressionEvaluator for F
where
    F: Fn(&str) -> Result<f64, EvaluationError>,
{
    fn evaluate(&self, expression: &str) -> Result<f64, EvaluationError> {
        self(expression)
    }
}

/// Default evaluator backed by `meval`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MevalEvaluator;

impl MevalEvaluator {
    pub fn new() -> Self {
        Self
    }
}

impl ExpressionEvaluator for MevalEvaluator {
    fn evaluate(&self, expression: &str) -> Result<f64, EvaluationError> {
        let prepared = complete_decimals(expression);
        meval::eval_str(&prepared).map_err(|e| EvaluationError::Malformed {
            expression: expression.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Pads bare decimal points with zeros (`.5` -> `0.5`, `3.` -> `3.0`).
///
/// The keypad allows both forms; `meval` only accepts fully written literals.
fn complete_decimals(expression: &str) -> String {
    let chars: Vec<char> = expression.chars().collect();
    let mut out = String::with_capacity(expression.len() + 2);

    for (i, &c) in chars.iter().enumerate() {
        if c == '.' {
            let digit_before = i > 0 && chars[i - 1].is_ascii_digit();
            let digit_after = chars.get(i + 1).is_some_and(|n| n.is_ascii_digit());
            if !digit_before {
                out.push('0');
            }
            out.push('.');
            if !digit_after {
                out.push('0');
            }
        } else {
            out.push(c);
        }
    }

    out
}
