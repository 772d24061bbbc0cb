//! Result shapes and the explanation formatter.
//!
//! Every operation ends here: a [`VerificationResult`] (or, for free
//! evaluation, an [`EvaluationResult`]) with a definite verdict and a
//! non-empty explanation. Failure constructors force `verdict = false`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Input text did not have the expected shape.
    InvalidFormat,
    /// A number was present but unusable (infinite, NaN, zero denominator).
    InvalidValue,
    /// The symbolic capability could not evaluate or transform the input.
    EvaluationFailed,
    /// Validity could not be confirmed.
    VerificationFailed,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::InvalidFormat => "INVALID_FORMAT",
            ErrorKind::InvalidValue => "INVALID_VALUE",
            ErrorKind::EvaluationFailed => "EVALUATION_FAILED",
            ErrorKind::VerificationFailed => "VERIFICATION_FAILED",
        };
        f.write_str(name)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    EquationSolution,
    AlgebraicStep,
    Calculation,
    Derivative,
    Integral,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationKind::EquationSolution => "equation solution",
            OperationKind::AlgebraicStep => "algebraic step",
            OperationKind::Calculation => "calculation",
            OperationKind::Derivative => "derivative",
            OperationKind::Integral => "integral",
        };
        f.write_str(name)
    }
}

/// A sample point where two expressions were found to differ.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Counterexample {
    pub assignments: BTreeMap<String, f64>,
    /// `left - right` at the sample point.
    pub difference: f64,
}

impl fmt::Display for Counterexample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let point = self
            .assignments
            .iter()
            .map(|(name, value)| format!("{} = {}", name, format_number(*value)))
            .collect::<Vec<_>>()
            .join(", ");
        write!(
            f,
            "at {} the two sides differ by {}",
            point,
            format_number(self.difference)
        )
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct VerificationResult {
    pub operation: OperationKind,
    pub verdict: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub primary_value: Option<String>,
    pub explanation: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<ErrorKind>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub left_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub right_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub corrected_expression: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub correct_result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub correct_derivative: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub correct_integral: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub counterexample: Option<Counterexample>,
}

impl VerificationResult {
    pub fn new(operation: OperationKind, verdict: bool, explanation: impl Into<String>) -> Self {
        Self {
            operation,
            verdict,
            primary_value: None,
            explanation: non_empty(explanation.into(), operation),
            error: None,
            left_value: None,
            right_value: None,
            corrected_expression: None,
            correct_result: None,
            correct_derivative: None,
            correct_integral: None,
            counterexample: None,
        }
    }

    /// A failed check. The verdict is always `false`.
    pub fn failure(operation: OperationKind, kind: ErrorKind, explanation: impl Into<String>) -> Self {
        Self {
            error: Some(kind),
            ..Self::new(operation, false, explanation)
        }
    }

    pub fn with_primary_value(mut self, value: impl Into<String>) -> Self {
        self.primary_value = Some(value.into());
        self
    }

    pub fn with_values(mut self, left: f64, right: f64) -> Self {
        self.left_value = Some(left);
        self.right_value = Some(right);
        self
    }

    pub fn with_corrected_expression(mut self, expr: Option<String>) -> Self {
        self.corrected_expression = expr;
        self
    }

    pub fn with_correct_result(mut self, value: impl Into<String>) -> Self {
        self.correct_result = Some(value.into());
        self
    }

    pub fn with_correct_derivative(mut self, expr: Option<String>) -> Self {
        self.correct_derivative = expr;
        self
    }

    pub fn with_correct_integral(mut self, expr: Option<String>) -> Self {
        self.correct_integral = expr;
        self
    }

    pub fn with_counterexample(mut self, counterexample: Option<Counterexample>) -> Self {
        self.counterexample = counterexample;
        self
    }
}

/// Output of free evaluation. There is no claim, so there is no verdict.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EvaluationResult {
    pub result: String,
    pub explanation: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<ErrorKind>,
}

impl EvaluationResult {
    pub fn value(result: impl Into<String>, explanation: impl Into<String>) -> Self {
        Self {
            result: result.into(),
            explanation: explanation.into(),
            error: None,
        }
    }

    pub fn failure(kind: ErrorKind, explanation: impl Into<String>) -> Self {
        let explanation = explanation.into();
        Self {
            result: String::new(),
            explanation: if explanation.trim().is_empty() {
                format!("The expression could not be evaluated ({}).", kind)
            } else {
                explanation
            },
            error: Some(kind),
        }
    }
}

fn non_empty(explanation: String, operation: OperationKind) -> String {
    if explanation.trim().is_empty() {
        format!("The {} could not be checked.", operation)
    } else {
        explanation
    }
}

/// Render a number the way a student would write it: integers without a
/// decimal point, everything else with at most ten decimals.
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let rounded = value.round();
    if (value - rounded).abs() < 1e-9 && rounded.abs() < 1e15 {
        // avoids "-0"
        return format!("{}", rounded as i64);
    }
    let fixed = format!("{:.10}", value);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(40.0), "40");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(1.0 / 3.0), "0.3333333333");
        assert_eq!(format_number(14.000000000001), "14");
        assert_eq!(format_number(-1e-12), "0");
    }

    #[test]
    fn test_failure_forces_false_verdict() {
        let r = VerificationResult::failure(OperationKind::Calculation, ErrorKind::InvalidValue, "bad");
        assert!(!r.verdict);
        assert_eq!(r.error, Some(ErrorKind::InvalidValue));
    }

    #[test]
    fn test_explanation_is_never_empty() {
        let r = VerificationResult::failure(OperationKind::Integral, ErrorKind::EvaluationFailed, "  ");
        assert_eq!(r.explanation, "The integral could not be checked.");
        let e = EvaluationResult::failure(ErrorKind::InvalidFormat, "");
        assert!(!e.explanation.is_empty());
    }

    #[test]
    fn test_serialized_shape() {
        let r = VerificationResult::new(OperationKind::Calculation, true, "8 * 5 = 40")
            .with_primary_value("40")
            .with_correct_result("40");
        let json = serde_json::to_value(&r).expect("serialize");
        assert_eq!(json["operation"], "calculation");
        assert_eq!(json["verdict"], true);
        assert_eq!(json["correct_result"], "40");
        assert!(json.get("error").is_none());
        assert!(json.get("counterexample").is_none());

        let failed = VerificationResult::failure(OperationKind::EquationSolution, ErrorKind::InvalidFormat, "x");
        let json = serde_json::to_value(&failed).expect("serialize");
        assert_eq!(json["error"], "INVALID_FORMAT");
    }

    #[test]
    fn test_counterexample_display() {
        let ce = Counterexample {
            assignments: BTreeMap::from([("x".to_string(), 2.0)]),
            difference: -4.0,
        };
        assert_eq!(ce.to_string(), "at x = 2 the two sides differ by -4");
    }
}
