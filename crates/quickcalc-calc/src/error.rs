//! Calculator-specific error types.

use quickcalc_core::{AppError, CalcError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationError {
    #[error("Malformed expression '{expression}': {reason}")]
    Malformed { expression: String, reason: String },

    #[error("Expression '{expression}' produced a non-finite result")]
    NonFinite { expression: String, value: f64 },
}

impl EvaluationError {
    /// The expression handed to the evaluator.
    pub fn expression(&self) -> &str {
        match self {
            Self::Malformed { expression, .. } | Self::NonFinite { expression, .. } => expression,
        }
    }
}

impl From<EvaluationError> for AppError {
    fn from(e: EvaluationError) -> Self {
        match e {
            EvaluationError::Malformed { expression, .. } => {
                AppError::Calc(CalcError::InvalidExpression(expression))
            }
            EvaluationError::NonFinite { expression, .. } => {
                AppError::Calc(CalcError::NonFinite(expression))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maps_into_app_error() {
        let err = EvaluationError::NonFinite {
            expression: "1/0".into(),
            value: f64::INFINITY,
        };
        let app: AppError = err.into();
        assert!(matches!(app, AppError::Calc(CalcError::NonFinite(ref e)) if e == "1/0"));
        assert_eq!(app.user_message(), "Error");
    }

    #[test]
    fn test_expression_accessor() {
        let err = EvaluationError::Malformed {
            expression: "2*".into(),
            reason: "unexpected end".into(),
        };
        assert_eq!(err.expression(), "2*");
        assert!(err.to_string().contains("unexpected end"));
    }
}
