use super::OpContext;
use crate::capability::{Substitutions, SymbolicCapability};
use crate::normalize::{normalize, parse_number};
use crate::report::{format_number, ErrorKind, OperationKind, VerificationResult};
use tracing::debug;

const OP: OperationKind = OperationKind::Calculation;

/// Is `claimed_result` the value of `expression`?
pub fn verify_calculation<C: SymbolicCapability + ?Sized>(
    cx: &OpContext<'_, C>,
    expression: &str,
    claimed_result: &str,
) -> VerificationResult {
    let claimed = match parse_number(claimed_result) {
        Ok(value) => value,
        Err(kind) => {
            let explanation = match kind {
                ErrorKind::InvalidValue => {
                    format!("The claimed result '{}' is not a finite number.", claimed_result.trim())
                }
                _ => format!("The claimed result '{}' is not a number.", claimed_result.trim()),
            };
            return VerificationResult::failure(OP, kind, explanation);
        }
    };
    let normalized = normalize(expression);

    let actual = match cx.judge.evaluate_number(normalized.as_str(), &Substitutions::new()) {
        Ok(value) => value,
        Err(err) => {
            return VerificationResult::failure(
                OP,
                ErrorKind::EvaluationFailed,
                format!("Could not evaluate '{}': {}", normalized, err),
            )
            .with_primary_value(format_number(claimed))
        }
    };

    let correct = format_number(actual);
    let matches = cx.judge.is_negligible(actual - claimed);
    debug!(target: "mathcheck::ops", expression = %normalized, actual, claimed, matches, "calculation");

    let explanation = if matches {
        format!("{} = {}, which matches the claimed {}.", normalized, correct, format_number(claimed))
    } else {
        format!("{} = {}, not {}.", normalized, correct, format_number(claimed))
    };
    VerificationResult::new(OP, matches, explanation)
        .with_primary_value(format_number(claimed))
        .with_correct_result(correct)
}
