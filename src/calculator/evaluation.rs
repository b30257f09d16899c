//! Mode-aware expression evaluation and result formatting.
//!
//! Dispatches a normalized expression to one of three backends behind a
//! single seam:
//! - developer mode runs on fasteval, which natively speaks the developer
//!   dialect (`^`, `%`, `&&`/`||` with numeric truthiness) and needs no
//!   override scope;
//! - advanced-mode expressions that mention units run on fend, the
//!   unit-aware backend, without overrides so its native degree/radian
//!   handling applies (no double conversion);
//! - everything else runs on meval with the mode's [`FunctionScope`]
//!   compiled into the evaluation context.

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;
use tracing::debug;

use crate::calculator::Mode;
use crate::calculator::scope::FunctionScope;

/// Sentinel shown for any failed evaluation.
pub const ERROR_DISPLAY: &str = "Error";

/// Numeric or unit-tagged outcome of a successful evaluation.
#[derive(Clone, Debug, PartialEq)]
pub enum CalcValue {
    /// Plain numeric result.
    Number(f64),
    /// Unit-tagged result from the unit-aware backend, e.g. `3.4 m`.
    Measure(String),
}

impl CalcValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CalcValue::Number(value) => Some(*value),
            CalcValue::Measure(_) => None,
        }
    }
}

/// Result of evaluating a normalized expression.
///
/// There is no way to build a success without a value or an error with
/// one, so "raw is the error sentinel exactly when the display is" holds
/// by construction.
#[derive(Clone, Debug, PartialEq)]
pub enum CalcResult {
    /// Successful calculation with a valid result.
    Success {
        /// The normalized expression that was evaluated.
        expression: String,
        /// The raw value.
        value: CalcValue,
        /// Mode-specific display string.
        display: String,
    },
    /// Evaluation failed; the attempted expression is kept for display.
    Error { expression: String, message: String },
}

impl CalcResult {
    /// The expression that was evaluated.
    pub fn expression(&self) -> &str {
        match self {
            Self::Success { expression, .. } => expression,
            Self::Error { expression, .. } => expression,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The display string (result or error sentinel).
    pub fn display(&self) -> &str {
        match self {
            Self::Success { display, .. } => display,
            Self::Error { message, .. } => message,
        }
    }

    /// The raw value for successful results.
    pub fn value(&self) -> Option<&CalcValue> {
        match self {
            Self::Success { value, .. } => Some(value),
            Self::Error { .. } => None,
        }
    }

    pub(crate) fn error(expression: impl Into<String>) -> Self {
        CalcResult::Error {
            expression: expression.into(),
            message: ERROR_DISPLAY.to_string(),
        }
    }
}

#[derive(Debug, Error)]
enum EvalError {
    #[error("backend rejected expression: {0}")]
    Backend(String),
    #[error("result is not a finite number")]
    NonFinite,
}

lazy_static! {
    /// Unit vocabulary that routes advanced-mode input to the unit-aware
    /// backend instead of the degree-override scope.
    static ref UNIT_CUE: Regex =
        Regex::new(r"(?i)\b(deg|rad|grad)\b|°|\b\d+(?:\.\d+)?\s*(m|cm|km|kg|g)\b").unwrap();
}

/// Evaluate an already-normalized expression under `mode` and format the
/// result for display. Backend failures and non-finite results map to the
/// `"Error"` sentinel; the offending expression is retained.
pub fn evaluate_normalized(expr: &str, mode: Mode) -> CalcResult {
    match run_backend(expr, mode) {
        Ok(value) => {
            let display = format_value(&value, mode);
            CalcResult::Success {
                expression: expr.to_string(),
                value,
                display,
            }
        }
        Err(err) => {
            debug!("evaluation of {expr:?} in {mode} mode failed: {err}");
            CalcResult::error(expr)
        }
    }
}

fn run_backend(expr: &str, mode: Mode) -> Result<CalcValue, EvalError> {
    match mode {
        Mode::Developer => eval_native(expr).map(CalcValue::Number),
        Mode::Advanced if UNIT_CUE.is_match(expr) => eval_with_units(expr),
        _ => eval_scoped(expr, FunctionScope::from(mode)).map(CalcValue::Number),
    }
}

/// Scoped backend: meval with the mode's override functions.
fn eval_scoped(expr: &str, scope: FunctionScope) -> Result<f64, EvalError> {
    let parsed: meval::Expr = expr
        .parse()
        .map_err(|err: meval::Error| EvalError::Backend(err.to_string()))?;
    let value = parsed
        .eval_with_context(scope.build_context())
        .map_err(|err| EvalError::Backend(err.to_string()))?;
    ensure_finite(value)
}

/// Native backend for the developer dialect: fasteval with an empty
/// variable namespace plus a shim for the spellings it lacks (`sqrt`,
/// `ln`, and the bare constants `pi`/`e`, which fasteval itself writes
/// `pi()` and `e()`). The shim is a dialect adapter, not a mode scope.
fn eval_native(expr: &str) -> Result<f64, EvalError> {
    let mut shim = |name: &str, args: Vec<f64>| -> Option<f64> {
        match (name, args.as_slice()) {
            ("sqrt", [x]) => Some(x.sqrt()),
            ("ln", [x]) => Some(x.ln()),
            ("pi", []) => Some(std::f64::consts::PI),
            ("e", []) => Some(std::f64::consts::E),
            _ => None,
        }
    };
    let value =
        fasteval::ez_eval(expr, &mut shim).map_err(|err| EvalError::Backend(format!("{err:?}")))?;
    ensure_finite(value)
}

/// Unit-aware backend: fend. Unitless results are parsed back into plain
/// numbers; anything else is kept as the backend's native display string.
fn eval_with_units(expr: &str) -> Result<CalcValue, EvalError> {
    let mut ctx = fend_core::Context::new();
    let result = fend_core::evaluate(expr, &mut ctx).map_err(EvalError::Backend)?;
    let text = result.get_main_result().trim().to_string();
    if text.is_empty() {
        return Err(EvalError::Backend("empty result".into()));
    }
    match parse_plain_number(&text) {
        Some(value) => ensure_finite(value).map(CalcValue::Number),
        None => Ok(CalcValue::Measure(text)),
    }
}

/// Parse a unitless fend result, tolerating the `approx.` marker and
/// exact fraction output like `1/3`.
fn parse_plain_number(text: &str) -> Option<f64> {
    let text = text.strip_prefix("approx.").unwrap_or(text).trim();
    if let Ok(value) = text.parse::<f64>() {
        return Some(value);
    }
    let (numerator, denominator) = text.split_once('/')?;
    let numerator: f64 = numerator.trim().parse().ok()?;
    let denominator: f64 = denominator.trim().parse().ok()?;
    Some(numerator / denominator)
}

fn ensure_finite(value: f64) -> Result<f64, EvalError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EvalError::NonFinite)
    }
}

fn format_value(value: &CalcValue, mode: Mode) -> String {
    match (value, mode) {
        (CalcValue::Measure(text), _) => text.clone(),
        (CalcValue::Number(v), Mode::Finance) => format_finance(*v),
        (CalcValue::Number(v), Mode::Basic) => format_basic(*v),
        (CalcValue::Number(v), _) => format!("{v}"),
    }
}

/// Finance display: rounded to 2 decimals, German grouping, trailing
/// `,00` dropped, currency suffix appended.
pub(crate) fn format_finance(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    let formatted = if rounded.fract() == 0.0 && rounded.abs() < 1e15 {
        group_thousands(rounded as i64)
    } else {
        let fixed = format!("{:.2}", rounded.abs());
        let (int_part, dec_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
        let sign = if rounded < 0.0 { "-" } else { "" };
        let grouped = group_thousands(int_part.parse::<i64>().unwrap_or(0));
        format!("{sign}{grouped},{dec_part}")
    };
    format!("{formatted} €")
}

/// Basic display: adaptive precision by magnitude, trailing zeros trimmed
/// via a numeric round-trip.
pub(crate) fn format_basic(value: f64) -> String {
    let abs = value.abs();
    let digits: usize = if abs == 0.0 {
        0
    } else if abs >= 1000.0 {
        0
    } else if abs >= 100.0 {
        1
    } else if abs >= 1.0 {
        3
    } else {
        4
    };
    let fixed = format!("{value:.digits$}");
    match fixed.parse::<f64>() {
        Ok(v) => format!("{v}"),
        Err(_) => fixed,
    }
}

/// Group an integer with German thousands separators.
fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    let grouped: String = grouped.chars().rev().collect();
    if value < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number(result: &CalcResult) -> f64 {
        result
            .value()
            .and_then(CalcValue::as_number)
            .expect("numeric result")
    }

    #[test]
    fn test_basic_percentage() {
        let result = evaluate_normalized("(20/100)*50", Mode::Basic);
        assert!((number(&result) - 10.0).abs() < 1e-9);
        assert_eq!(result.display(), "10");
    }

    #[test]
    fn test_basic_division_precision() {
        let result = evaluate_normalized("50/7", Mode::Basic);
        assert!((number(&result) - 50.0 / 7.0).abs() < 1e-9);
        assert_eq!(result.display(), "7.143");
    }

    #[test]
    fn test_basic_degree_trig_and_log() {
        let result = evaluate_normalized("sin(30)", Mode::Basic);
        assert!((number(&result) - 0.5).abs() < 1e-9);
        let result = evaluate_normalized("log(1000)", Mode::Basic);
        assert!((number(&result) - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_developer_dialect() {
        let result = evaluate_normalized("2^5", Mode::Developer);
        assert_eq!(number(&result), 32.0);
        let result = evaluate_normalized("255&&1", Mode::Developer);
        assert!(result.is_success());
        let result = evaluate_normalized("sqrt(9)+1", Mode::Developer);
        assert_eq!(number(&result), 4.0);
    }

    #[test]
    fn test_advanced_units_route_to_unit_backend() {
        let result = evaluate_normalized("sin(30 deg)", Mode::Advanced);
        assert!((number(&result) - 0.5).abs() < 1e-9);

        let result = evaluate_normalized("3 m+40 cm", Mode::Advanced);
        match result.value() {
            Some(CalcValue::Measure(text)) => assert!(text.contains('m'), "got {text:?}"),
            other => panic!("expected a measure, got {other:?}"),
        }
    }

    #[test]
    fn test_advanced_without_units_uses_degree_scope() {
        let result = evaluate_normalized("sin(30)", Mode::Advanced);
        assert!((number(&result) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_finance_npv_formatting() {
        let result = evaluate_normalized("npv(0.08,-1000,400,400,400)", Mode::Finance);
        assert_eq!(result.display(), "28,55 €");
        assert!(result.display().ends_with(" €"));
    }

    #[test]
    fn test_finance_grouping_and_integer_amounts() {
        assert_eq!(format_finance(1157.625), "1.157,63 €");
        assert_eq!(format_finance(141.61), "141,61 €");
        assert_eq!(format_finance(1000000.0), "1.000.000 €");
        assert_eq!(format_finance(-1234.5), "-1.234,50 €");
        assert_eq!(format_finance(100.0), "100 €");
    }

    #[test]
    fn test_basic_formatting_precision_ladder() {
        assert_eq!(format_basic(1234.56), "1235");
        assert_eq!(format_basic(123.456), "123.5");
        assert_eq!(format_basic(7.142857142857143), "7.143");
        assert_eq!(format_basic(0.123456), "0.1235");
        assert_eq!(format_basic(14.000000000000002), "14");
        assert_eq!(format_basic(0.0), "0");
    }

    #[test]
    fn test_error_sentinel() {
        let result = evaluate_normalized("2+*2", Mode::Basic);
        assert!(!result.is_success());
        assert_eq!(result.display(), ERROR_DISPLAY);
        assert_eq!(result.value(), None);
        assert_eq!(result.expression(), "2+*2");
    }

    #[test]
    fn test_non_finite_is_error() {
        let result = evaluate_normalized("1/0", Mode::Basic);
        assert!(!result.is_success());
        assert_eq!(result.display(), ERROR_DISPLAY);
    }

    #[test]
    fn test_unknown_identifier_is_error() {
        let result = evaluate_normalized("npv(0.08,100)", Mode::Basic);
        assert!(!result.is_success(), "npv is finance-scope only");
    }
}
