use super::{literal, OpContext};
use crate::capability::{Substitutions, SymbolicCapability};
use crate::normalize::{normalize, parse_assignment, split_relation, substitute_word};
use crate::report::{format_number, ErrorKind, OperationKind, VerificationResult};
use tracing::debug;

const OP: OperationKind = OperationKind::EquationSolution;

/// Does `claimed_solution` (`x = 4`) satisfy `equation`?
///
/// Without a relation sign the equation is read as an expression that must
/// vanish (or the literal `true`) at the claimed value.
pub fn verify_equation_solution<C: SymbolicCapability + ?Sized>(
    cx: &OpContext<'_, C>,
    equation: &str,
    claimed_solution: &str,
) -> VerificationResult {
    let (var, value) = match parse_assignment(claimed_solution) {
        Ok(assignment) => assignment,
        Err(kind) => {
            let explanation = match kind {
                ErrorKind::InvalidValue => format!(
                    "The value in '{}' is not a finite number.",
                    claimed_solution.trim()
                ),
                _ => format!(
                    "The claimed solution '{}' should look like 'x = 4'.",
                    claimed_solution.trim()
                ),
            };
            return VerificationResult::failure(OP, kind, explanation);
        }
    };
    let shown = format_number(value);
    let assignment = format!("{} = {}", var, shown);
    let normalized = normalize(equation);

    let relation = match split_relation(normalized.as_str()) {
        Ok(relation) => relation,
        Err(kind) => {
            return VerificationResult::failure(
                OP,
                kind,
                format!("'{}' must contain exactly one relation sign.", normalized),
            )
            .with_primary_value(shown)
        }
    };

    let value_text = literal(value);
    let none = Substitutions::new();
    let evaluation_failed = |err: String| {
        VerificationResult::failure(
            OP,
            ErrorKind::EvaluationFailed,
            format!("Could not evaluate '{}' at {}: {}", normalized, assignment, err),
        )
        .with_primary_value(shown.clone())
    };

    match relation {
        Some(relation) => {
            let lhs = substitute_word(&relation.lhs, &var, &value_text);
            let rhs = substitute_word(&relation.rhs, &var, &value_text);
            let left = match cx.judge.evaluate_number(&lhs, &none) {
                Ok(v) => v,
                Err(err) => return evaluation_failed(err.to_string()),
            };
            let right = match cx.judge.evaluate_number(&rhs, &none) {
                Ok(v) => v,
                Err(err) => return evaluation_failed(err.to_string()),
            };
            let holds = relation.op.holds(left, right, cx.judge.tolerance());
            debug!(target: "mathcheck::ops", equation = %normalized, %assignment, left, right, holds, "equation solution");

            let explanation = format!(
                "With {} the left side is {} and the right side is {}, so {} {} {}.",
                assignment,
                format_number(left),
                format_number(right),
                assignment,
                if holds { "satisfies" } else { "does not satisfy" },
                normalized,
            );
            VerificationResult::new(OP, holds, explanation)
                .with_primary_value(shown)
                .with_values(left, right)
        }
        None => {
            let substituted = substitute_word(normalized.as_str(), &var, &value_text);
            if substituted.trim() == "true" {
                return VerificationResult::new(OP, true, format!("'{}' is true.", normalized))
                    .with_primary_value(shown.clone());
            }
            let value = match cx.judge.evaluate_number(&substituted, &none) {
                Ok(v) => v,
                Err(err) => return evaluation_failed(err.to_string()),
            };
            let holds = cx.judge.is_negligible(value);
            let explanation = format!(
                "With {} the expression {} evaluates to {}, which is {}zero.",
                assignment,
                normalized,
                format_number(value),
                if holds { "" } else { "not " },
            );
            VerificationResult::new(OP, holds, explanation)
                .with_primary_value(shown)
                .with_values(value, 0.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::ops::test_support::context;
    use mathcheck_symbolic::Cas;

    fn check(equation: &str, claim: &str) -> VerificationResult {
        let cas = Cas::default();
        let config = EngineConfig::default();
        verify_equation_solution(&context(&cas, &config), equation, claim)
    }

    #[test]
    fn test_correct_and_incorrect_solutions() {
        let r = check("2x + 3 = 11", "x = 4");
        assert!(r.verdict);
        assert_eq!(r.left_value, Some(11.0));
        assert_eq!(r.right_value, Some(11.0));
        assert_eq!(r.primary_value.as_deref(), Some("4"));
        assert!(r.explanation.contains("satisfies"));

        let r = check("2x + 3 = 11", "x = 5");
        assert!(!r.verdict);
        assert_eq!(r.error, None);
        assert_eq!(r.left_value, Some(13.0));
    }

    #[test]
    fn test_negative_and_fractional_values() {
        assert!(check("x^2 = 9", "x = -3").verdict);
        assert!(check("3x = 1", "x = 1/3").verdict);
        assert!(check("x² − 4 = 0", "x = 2").verdict);
    }

    #[test]
    fn test_malformed_claim() {
        let r = check("2x + 3 = 11", "4");
        assert!(!r.verdict);
        assert_eq!(r.error, Some(ErrorKind::InvalidFormat));
        assert!(!r.explanation.is_empty());

        let r = check("2x + 3 = 11", "x = NaN");
        assert_eq!(r.error, Some(ErrorKind::InvalidValue));
    }

    #[test]
    fn test_relation_shape() {
        assert_eq!(check("x = 1 = 1", "x = 1").error, Some(ErrorKind::InvalidFormat));
        assert!(check("x^2 - 4", "x = 2").verdict);
        assert!(!check("x^2 - 4", "x = 3").verdict);
        assert!(check("2x > 3", "x = 2").verdict);
    }

    #[test]
    fn test_evaluation_failure() {
        let r = check("1 / (x - 2) = 1", "x = 2");
        assert_eq!(r.error, Some(ErrorKind::EvaluationFailed));
        assert!(!r.verdict);
        let r = check("x + y = 3", "x = 1");
        assert_eq!(r.error, Some(ErrorKind::EvaluationFailed));
    }
}
