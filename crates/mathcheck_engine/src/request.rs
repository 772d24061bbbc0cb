//! Typed requests and outcomes for the orchestrator boundary.

use crate::capability::Substitutions;
use crate::report::{EvaluationResult, VerificationResult};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VerificationRequest {
    EquationSolution {
        equation: String,
        claimed_solution: String,
    },
    AlgebraicStep {
        original: String,
        resulting: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        operation: Option<String>,
    },
    Calculation {
        expression: String,
        claimed_result: String,
    },
    Derivative {
        function: String,
        claimed_derivative: String,
    },
    Integral {
        function: String,
        claimed_integral: String,
    },
    Evaluate {
        expression: String,
        #[serde(default)]
        substitutions: Substitutions,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum VerificationOutcome {
    Verification(VerificationResult),
    Evaluation(EvaluationResult),
}

impl VerificationOutcome {
    /// The verdict, or `None` for a free evaluation.
    pub fn verdict(&self) -> Option<bool> {
        match self {
            VerificationOutcome::Verification(r) => Some(r.verdict),
            VerificationOutcome::Evaluation(_) => None,
        }
    }

    pub fn explanation(&self) -> &str {
        match self {
            VerificationOutcome::Verification(r) => &r.explanation,
            VerificationOutcome::Evaluation(r) => &r.explanation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_tagged_request() {
        let json = r#"{"kind": "algebraic_step", "original": "2x = 4", "resulting": "x = 2"}"#;
        let request: VerificationRequest = serde_json::from_str(json).expect("valid request");
        assert_eq!(
            request,
            VerificationRequest::AlgebraicStep {
                original: "2x = 4".to_string(),
                resulting: "x = 2".to_string(),
                operation: None,
            }
        );

        let json = r#"{"kind": "evaluate", "expression": "x^2", "substitutions": {"x": 3}}"#;
        let request: VerificationRequest = serde_json::from_str(json).expect("valid request");
        assert!(matches!(
            request,
            VerificationRequest::Evaluate { ref substitutions, .. } if substitutions["x"] == 3.0
        ));
    }

    #[test]
    fn test_malformed_requests_are_rejected() {
        for json in [
            r#"{"kind": "derivative", "function": "x^2"}"#,
            r#"{"kind": "limit", "expression": "x"}"#,
            r#"{"equation": "x = 1", "claimed_solution": "x = 1"}"#,
            r#"{"kind": "calculation", "expression": "1", "claimed_result": 40}"#,
        ] {
            assert!(serde_json::from_str::<VerificationRequest>(json).is_err(), "{}", json);
        }
    }
}
