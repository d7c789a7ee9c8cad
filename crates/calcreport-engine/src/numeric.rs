//! Numeric rounding and notation.

use serde::{Deserialize, Serialize};

/// How numeric values are spelled in the typeset output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumericFormatter {
    /// `3.5 \times 10 ^ {2}` style exponents.
    #[default]
    Latex,
    /// `3.5e2` style exponents.
    Plain,
}

/// Round to `precision` decimal places.
pub fn round_value(value: f64, precision: usize) -> f64 {
    let factor = 10f64.powi(precision as i32);
    (value * factor).round() / factor
}

/// Render a value in normalized mantissa-exponent form, the mantissa
/// rounded to `precision` decimal places.
pub fn format_scientific(value: f64, precision: usize, formatter: NumericFormatter) -> String {
    if value == 0.0 || !value.is_finite() {
        return round_value(value, precision).to_string();
    }
    let exponent = value.abs().log10().floor() as i32;
    let mut mantissa = round_value(value / 10f64.powi(exponent), precision);
    let mut exponent = exponent;
    // Rounding can push the mantissa out of [1, 10).
    if mantissa.abs() >= 10.0 {
        mantissa /= 10.0;
        exponent += 1;
    }
    match formatter {
        NumericFormatter::Latex => format!("{mantissa} \\times 10 ^ {{{exponent}}}"),
        NumericFormatter::Plain => format!("{mantissa}e{exponent}"),
    }
}

/// Replace the `.` decimal point of a formatted numeric token with the
/// configured separator.
pub fn swap_decimal_separator(token: &str, separator: &str) -> String {
    if separator == "." {
        return token.to_string();
    }
    token.replace('.', separator)
}
