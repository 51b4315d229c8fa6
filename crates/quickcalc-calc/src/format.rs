//! Result formatting policy.
//!
//! Results are written back into the equation buffer as text, so whatever
//! these functions produce has to parse again as a plain numeric literal.

/// Fraction digits kept for non-integer results.
pub const DEFAULT_FRACTION_DIGITS: u32 = 8;

/// Format an evaluation result for the display and equation buffer.
///
/// Integers render without a decimal point. Anything else is rounded to
/// `fraction_digits` places and rendered in its shortest round-trip form,
/// so `0.1 + 0.2` shows as `0.3`. Negative zero renders as `0`.
pub fn format_result(value: f64, fraction_digits: u32) -> String {
    if value.fract() == 0.0 {
        return integer_text(value);
    }

    let rounded: f64 = match format!("{:.*}", fraction_digits as usize, value).parse() {
        Ok(v) => v,
        Err(_) => value,
    };

    if rounded.fract() == 0.0 {
        integer_text(rounded)
    } else {
        rounded.to_string()
    }
}

/// Fixed-point formatting with exactly `digits` fraction digits.
pub fn format_fixed(value: f64, digits: usize) -> String {
    let text = format!("{:.*}", digits, value);
    // "-0.00" is not a useful readout
    match text.strip_prefix('-') {
        Some(rest) if rest.chars().all(|c| c == '0' || c == '.') => rest.to_string(),
        _ => text,
    }
}

fn integer_text(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else {
        format!("{}", value)
    }
}
