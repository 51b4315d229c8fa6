//! Quick-calculation dialogs: tip, simple interest, BMI and heat index.
//!
//! Each formula reads its inputs from a transient form, and on success writes
//! a result straight to the calculator readout, bypassing the keypad state
//! machine. Inputs that do not parse as finite numbers leave everything as it
//! was and keep the dialog open.

use std::collections::HashMap;

use crate::evaluator::ExpressionEvaluator;
use crate::format::format_fixed;
use crate::machine::Calculator;

/// Bill total including the tip.
pub fn tip_total(amount: f64, percentage: f64) -> f64 {
    amount + amount * (percentage / 100.0)
}

/// Principal plus simple interest over `time` years.
pub fn simple_interest_total(principal: f64, rate: f64, time: f64) -> f64 {
    principal * (1.0 + rate / 100.0 * time)
}

/// Body mass index from kilograms and centimetres.
pub fn bmi(weight_kg: f64, height_cm: f64) -> f64 {
    let height_m = height_cm / 100.0;
    weight_kg / (height_m * height_m)
}

/// Rothfusz regression for the heat index, in °F.
///
/// No clamping: outside roughly t >= 80°F and r >= 40% the value is
/// numerically fine but physically meaningless.
pub fn heat_index(temperature_f: f64, humidity: f64) -> f64 {
    let t = temperature_f;
    let r = humidity;
    -42.379 + 2.049_015_23 * t + 10.143_331_27 * r
        - 0.224_755_41 * t * r
        - 0.006_837_83 * t * t
        - 0.054_817_17 * r * r
        + 0.001_228_74 * t * t * r
        + 0.000_852_82 * t * r * r
        - 0.000_001_99 * t * t * r * r
}

/// Input fields used by the dialogs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuickCalcField {
    Amount,
    Percentage,
    Principal,
    Rate,
    Time,
    Weight,
    Height,
    Temperature,
    Humidity,
}

impl QuickCalcField {
    pub fn label(self) -> &'static str {
        match self {
            Self::Amount => "Bill Amount",
            Self::Percentage => "Tip Percentage",
            Self::Principal => "Principal Amount",
            Self::Rate => "Interest Rate (%)",
            Self::Time => "Time (years)",
            Self::Weight => "Weight (kg)",
            Self::Height => "Height (cm)",
            Self::Temperature => "Temperature (°F)",
            Self::Humidity => "Relative Humidity (%)",
        }
    }
}

/// Which quick calculation a dialog runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickCalcKind {
    Tip,
    Interest,
    Bmi,
    HeatIndex,
}

impl QuickCalcKind {
    pub fn title(self) -> &'static str {
        match self {
            Self::Tip => "Calculate Tip",
            Self::Interest => "Calculate Simple Interest",
            Self::Bmi => "Calculate BMI",
            Self::HeatIndex => "Calculate Heat Index",
        }
    }

    /// Fields in the order the dialog presents them.
    pub fn fields(self) -> &'static [QuickCalcField] {
        use QuickCalcField::*;
        match self {
            Self::Tip => &[Amount, Percentage],
            Self::Interest => &[Principal, Rate, Time],
            Self::Bmi => &[Weight, Height],
            Self::HeatIndex => &[Temperature, Humidity],
        }
    }

    /// Run the formula against the form.
    ///
    /// Returns `None` if any input is missing, unparsable or non-finite, or
    /// if the formula itself produces a non-finite value.
    pub fn compute(self, form: &QuickCalcForm) -> Option<QuickResult> {
        use QuickCalcField::*;
        let result = match self {
            Self::Tip => {
                let amount = form.number(Amount)?;
                let percentage = form.number(Percentage)?;
                QuickResult::new(
                    tip_total(amount, percentage),
                    2,
                    format!("{} + ({} × {}%)", amount, amount, percentage),
                )
            }
            Self::Interest => {
                let principal = form.number(Principal)?;
                let rate = form.number(Rate)?;
                let time = form.number(Time)?;
                QuickResult::new(
                    simple_interest_total(principal, rate, time),
                    2,
                    format!("{} × (1 + {}% × {})", principal, rate, time),
                )
            }
            Self::Bmi => {
                let weight = form.number(Weight)?;
                let height = form.number(Height)?;
                QuickResult::new(
                    bmi(weight, height),
                    1,
                    format!("{} ÷ ({}/100)²", weight, height),
                )
            }
            Self::HeatIndex => {
                let t = form.number(Temperature)?;
                let r = form.number(Humidity)?;
                QuickResult::new(heat_index(t, r), 1, format!("HI({}°F, {}%)", t, r))
            }
        };

        result.value.is_finite().then_some(result)
    }
}

/// Output of a quick calculation, ready for the readout.
#[derive(Debug, Clone, PartialEq)]
pub struct QuickResult {
    pub value: f64,
    pub display: String,
    pub equation: String,
}

impl QuickResult {
    fn new(value: f64, digits: usize, equation: String) -> Self {
        Self {
            value,
            display: format_fixed(value, digits),
            equation,
        }
    }
}

/// Raw text typed into the dialog fields.
#[derive(Debug, Clone, Default)]
pub struct QuickCalcForm {
    values: HashMap<QuickCalcField, String>,
}

impl QuickCalcForm {
    pub fn set(&mut self, field: QuickCalcField, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    /// Raw text for a field; empty if never set.
    pub fn get(&self, field: QuickCalcField) -> &str {
        self.values.get(&field).map(String::as_str).unwrap_or("")
    }

    /// Parsed value of a field, if it is a finite number.
    pub fn number(&self, field: QuickCalcField) -> Option<f64> {
        self.get(field)
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.values.values().all(|v| v.is_empty())
    }
}

/// Dialog state: whether it is open, which calculation, and its form.
#[derive(Debug, Clone, Default)]
pub struct QuickCalcDialog {
    kind: Option<QuickCalcKind>,
    form: QuickCalcForm,
}

impl QuickCalcDialog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, kind: QuickCalcKind) {
        tracing::debug!("Opening quick calculation: {}", kind.title());
        self.kind = Some(kind);
    }

    pub fn is_open(&self) -> bool {
        self.kind.is_some()
    }

    pub fn kind(&self) -> Option<QuickCalcKind> {
        self.kind
    }

    pub fn form(&self) -> &QuickCalcForm {
        &self.form
    }

    pub fn set_input(&mut self, field: QuickCalcField, value: impl Into<String>) {
        self.form.set(field, value);
    }

    /// Run the open dialog's formula and write the result to `calculator`.
    ///
    /// Returns `true` if the result was written; the dialog is then closed
    /// and its form cleared. On invalid input nothing changes.
    pub fn calculate<E: ExpressionEvaluator>(&mut self, calculator: &mut Calculator<E>) -> bool {
        let Some(kind) = self.kind else {
            return false;
        };

        match kind.compute(&self.form) {
            Some(result) => {
                tracing::debug!("{}: {} = {}", kind.title(), result.equation, result.display);
                calculator.write_quick_result(result.display, result.equation);
                self.close();
                true
            }
            None => {
                tracing::debug!("{}: inputs did not parse, dialog stays open", kind.title());
                false
            }
        }
    }

    /// Close the dialog, discarding its inputs and resetting the calculator.
    pub fn cancel<E: ExpressionEvaluator>(&mut self, calculator: &mut Calculator<E>) {
        self.close();
        calculator.reset();
    }

    fn close(&mut self) {
        self.kind = None;
        self.form.clear();
    }
}
