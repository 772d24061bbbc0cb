use super::OpContext;
use crate::capability::SymbolicCapability;
use crate::normalize::normalize;
use crate::report::{ErrorKind, OperationKind, VerificationResult};
use tracing::debug;

const OP: OperationKind = OperationKind::Derivative;

/// Is `claimed_derivative` the derivative of `function`?
///
/// The variable is discovered from `function`. Once the true derivative is
/// known it is always reported, even if the comparison itself fails.
pub fn verify_derivative<C: SymbolicCapability + ?Sized>(
    cx: &OpContext<'_, C>,
    function: &str,
    claimed_derivative: &str,
) -> VerificationResult {
    let function = normalize(function);
    let var = function.variable_or(&cx.config.default_variable).to_string();

    let derivative = cx
        .capability
        .parse(function.as_str())
        .and_then(|f| cx.capability.differentiate(&f, &var));
    let correct = match derivative {
        Ok(d) => cx.capability.stringify(&d),
        Err(err) => {
            return VerificationResult::failure(
                OP,
                ErrorKind::EvaluationFailed,
                format!("Could not differentiate '{}' with respect to {}: {}", function, var, err),
            )
        }
    };

    let claimed = normalize(claimed_derivative);
    let verdict = match cx.judge.equivalent(claimed.as_str(), &correct) {
        Ok(verdict) => verdict,
        Err(err) => {
            debug!(target: "mathcheck::ops", function = %function, claimed = %claimed, %err, "derivative comparison failed");
            return VerificationResult::new(
                OP,
                false,
                format!(
                    "Could not compare '{}' with the derivative of {}, which is {}.",
                    claimed, function, correct
                ),
            )
            .with_primary_value(claimed.into_string())
            .with_correct_derivative(Some(correct));
        }
    };

    let explanation = if verdict.equivalent {
        format!("The derivative of {} with respect to {} is {}, which matches {}.", function, var, correct, claimed)
    } else {
        let example = verdict
            .counterexample
            .as_ref()
            .map(|ce| format!(" For example, {}.", ce))
            .unwrap_or_default();
        format!(
            "The derivative of {} with respect to {} is {}, not {}.{}",
            function, var, correct, claimed, example
        )
    };
    VerificationResult::new(OP, verdict.equivalent, explanation)
        .with_primary_value(claimed.into_string())
        .with_correct_derivative(Some(correct))
        .with_counterexample(verdict.counterexample)
}
