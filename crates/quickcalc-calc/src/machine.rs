//! Keypad input state machine.
//!
//! [`CalcState`] is the whole machine: a display string, the equation typed
//! so far and two flags. Every transition takes the state by value and returns
//! the next one, so sequences of presses can be replayed without a UI.
//! [`Calculator`] pairs a state with an evaluator for callers that just want
//! to feed keys.

use crate::error::EvaluationError;
use crate::evaluator::{ExpressionEvaluator, MevalEvaluator};
use crate::format::{format_result, DEFAULT_FRACTION_DIGITS};
use crate::keys::{Digit, Key, Operator};

/// Display text after a failed evaluation.
pub const ERROR_DISPLAY: &str = "Error";

const INITIAL_DISPLAY: &str = "0";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalcState {
    /// Primary readout: the current operand, a result, or `Error`
    pub display: String,
    /// Full expression accumulated since the last result or clear
    pub equation: String,
    /// Set right after `=` until the next entry
    pub has_result: bool,
    /// Set right after an operator so the next digit replaces the display
    pub last_was_operator: bool,
}

impl Default for CalcState {
    fn default() -> Self {
        Self {
            display: INITIAL_DISPLAY.to_string(),
            equation: String::new(),
            has_result: false,
            last_was_operator: false,
        }
    }
}

impl CalcState {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if nothing has been entered since the last clear.
    pub fn is_initial(&self) -> bool {
        *self == Self::default()
    }

    /// True if the display shows the evaluation error marker.
    pub fn is_error(&self) -> bool {
        self.display == ERROR_DISPLAY
    }

    pub fn digit(mut self, d: Digit) -> Self {
        let c = d.as_char();

        if self.has_result {
            // Fresh expression after a result
            self.display = c.to_string();
            self.equation = c.to_string();
            self.has_result = false;
        } else {
            if self.last_was_operator || self.display == INITIAL_DISPLAY {
                self.display = c.to_string();
            } else {
                self.display.push(c);
            }
            self.equation.push(c);
        }

        self.last_was_operator = false;
        self
    }

    /// Append an operator, or replace a trailing one.
    ///
    /// Ignored while the equation is empty: expressions cannot start with an
    /// operator. The display keeps showing the last operand.
    pub fn operator(mut self, op: Operator) -> Self {
        if self.equation.is_empty() {
            tracing::debug!("Ignoring operator {} on empty equation", op.as_char());
            return self;
        }

        if self.equation.ends_with(Operator::is_operator_char) {
            self.equation.pop();
        }
        self.equation.push(op.as_char());

        self.has_result = false;
        self.last_was_operator = true;
        self
    }

    /// Add a decimal point to the current operand, at most once.
    pub fn decimal(mut self) -> Self {
        if self.has_result {
            self.display = "0.".to_string();
            self.equation = "0.".to_string();
            self.has_result = false;
        } else if !self.display.contains('.') {
            self.display.push('.');
            self.equation.push('.');
        }

        self.last_was_operator = false;
        self
    }

    pub fn clear(self) -> Self {
        Self::default()
    }

    /// Evaluate the equation, dropping one trailing operator first.
    ///
    /// On success the formatted result replaces both display and equation so
    /// arithmetic can continue from it. A malformed expression or a
    /// non-finite value shows [`ERROR_DISPLAY`] and empties the equation.
    pub fn evaluate<E>(self, evaluator: &E, fraction_digits: u32) -> Self
    where
        E: ExpressionEvaluator + ?Sized,
    {
        match self.try_evaluate(evaluator, fraction_digits) {
            Ok(Some(next)) => next,
            Ok(None) => self,
            Err(e) => {
                tracing::debug!("Evaluation failed: {}", e);
                Self {
                    display: ERROR_DISPLAY.to_string(),
                    equation: String::new(),
                    has_result: true,
                    last_was_operator: false,
                }
            }
        }
    }

    /// Like [`CalcState::evaluate`] but reports the failure instead of
    /// folding it into the state. `Ok(None)` means the equation was empty.
    pub fn try_evaluate<E>(
        &self,
        evaluator: &E,
        fraction_digits: u32,
    ) -> Result<Option<Self>, EvaluationError>
    where
        E: ExpressionEvaluator + ?Sized,
    {
        if self.equation.is_empty() {
            return Ok(None);
        }

        let expression = self.clean_equation();
        let value = evaluator.evaluate(expression)?;
        if !value.is_finite() {
            return Err(EvaluationError::NonFinite {
                expression: expression.to_string(),
                value,
            });
        }

        let formatted = format_result(value, fraction_digits);
        tracing::debug!("{} = {}", expression, formatted);

        Ok(Some(Self {
            display: formatted.clone(),
            equation: formatted,
            has_result: true,
            last_was_operator: false,
        }))
    }

    /// Write a quick-calculation result straight to the readout.
    ///
    /// Only display and equation change. Both flags keep their values, so
    /// the next key behaves as it would have before the write.
    pub fn with_quick_result(self, display: String, equation: String) -> Self {
        Self {
            display,
            equation,
            ..self
        }
    }

    /// Apply a single key press.
    pub fn apply<E>(self, key: Key, evaluator: &E, fraction_digits: u32) -> Self
    where
        E: ExpressionEvaluator + ?Sized,
    {
        match key {
            Key::Digit(d) => self.digit(d),
            Key::Operator(op) => self.operator(op),
            Key::Decimal => self.decimal(),
            Key::Clear => self.clear(),
            Key::Equals => self.evaluate(evaluator, fraction_digits),
        }
    }

    /// The equation with at most one trailing operator removed.
    fn clean_equation(&self) -> &str {
        self.equation
            .strip_suffix(Operator::is_operator_char)
            .unwrap_or(&self.equation)
    }
}

/// A calculator instance: current state plus the evaluator it uses.
#[derive(Debug, Clone)]
pub struct Calculator<E = MevalEvaluator> {
    state: CalcState,
    evaluator: E,
    fraction_digits: u32,
}

impl Default for Calculator<MevalEvaluator> {
    fn default() -> Self {
        Self::new(MevalEvaluator::new())
    }
}

impl<E: ExpressionEvaluator> Calculator<E> {
    pub fn new(evaluator: E) -> Self {
        Self {
            state: CalcState::default(),
            evaluator,
            fraction_digits: DEFAULT_FRACTION_DIGITS,
        }
    }

    pub fn with_fraction_digits(mut self, fraction_digits: u32) -> Self {
        self.fraction_digits = fraction_digits;
        self
    }

    pub fn press(&mut self, key: Key) {
        let state = std::mem::take(&mut self.state);
        self.state = state.apply(key, &self.evaluator, self.fraction_digits);
    }

    /// Press every key in order.
    pub fn press_all(&mut self, keys: impl IntoIterator<Item = Key>) {
        for key in keys {
            self.press(key);
        }
    }

    pub fn reset(&mut self) {
        self.state = CalcState::default();
    }

    pub fn write_quick_result(&mut self, display: String, equation: String) {
        let state = std::mem::take(&mut self.state);
        self.state = state.with_quick_result(display, equation);
    }

    pub fn state(&self) -> &CalcState {
        &self.state
    }

    pub fn display(&self) -> &str {
        &self.state.display
    }

    pub fn equation(&self) -> &str {
        &self.state.equation
    }
}
