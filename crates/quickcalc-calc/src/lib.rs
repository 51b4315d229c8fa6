//! Calculator engine for QuickCalc
//!
//! Holds the keypad input state machine, the result formatting policy, the
//! expression evaluator seam and the quick-calculation formulas that write
//! straight to the display.

pub mod error;
pub mod evaluator;
pub mod format;
pub mod keys;
pub mod machine;
pub mod quick;

pub use error::EvaluationError;
pub use evaluator::{ExpressionEvaluator, MevalEvaluator};
pub use format::{format_fixed, format_result, DEFAULT_FRACTION_DIGITS};
pub use keys::{Digit, Key, Operator};
pub use machine::{CalcState, Calculator, ERROR_DISPLAY};
pub use quick::{QuickCalcDialog, QuickCalcField, QuickCalcForm, QuickCalcKind, QuickResult};
