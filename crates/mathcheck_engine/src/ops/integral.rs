use super::OpContext;
use crate::capability::SymbolicCapability;
use crate::error::EngineError;
use crate::judge::EquivalenceVerdict;
use crate::normalize::{canonicalize, normalize, strip_integration_constant};
use crate::report::{ErrorKind, OperationKind, VerificationResult};
use serde::Serialize;
use std::fmt;
use tracing::debug;

const OP: OperationKind = OperationKind::Integral;

/// Ways to check a claimed antiderivative, tried in [`IntegralStrategy::ORDER`].
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IntegralStrategy {
    /// Differentiate the claim and compare with the integrand.
    DerivativeOfClaim,
    /// Compare the claim with our own antiderivative.
    DirectComparison,
}

impl IntegralStrategy {
    pub const ORDER: [IntegralStrategy; 2] = [
        IntegralStrategy::DerivativeOfClaim,
        IntegralStrategy::DirectComparison,
    ];
}

impl fmt::Display for IntegralStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegralStrategy::DerivativeOfClaim => f.write_str("differentiating the claim"),
            IntegralStrategy::DirectComparison => f.write_str("comparing with the computed antiderivative"),
        }
    }
}

/// What a strategy found out.
struct Finding {
    verdict: EquivalenceVerdict,
    /// The expression the claim was compared against, for the explanation.
    compared: String,
}

/// Is `claimed_integral` an antiderivative of `function`? A trailing
/// constant of integration on the claim is ignored.
pub fn verify_integral<C: SymbolicCapability + ?Sized>(
    cx: &OpContext<'_, C>,
    function: &str,
    claimed_integral: &str,
) -> VerificationResult {
    let function = normalize(function);
    let var = function.variable_or(&cx.config.default_variable).to_string();
    let claim = strip_integration_constant(&canonicalize(claimed_integral));

    let own = cx
        .capability
        .parse(function.as_str())
        .and_then(|f| cx.capability.integrate(&f, &var))
        .map(|integral| cx.capability.stringify(&integral));
    let correct_integral = own.as_ref().ok().map(|s| format!("{} + C", s));

    if claim.is_empty() {
        return VerificationResult::failure(OP, ErrorKind::InvalidFormat, "The claimed integral is empty.")
            .with_correct_integral(correct_integral);
    }

    let mut last_error = None;
    for strategy in IntegralStrategy::ORDER {
        let attempt = match strategy {
            IntegralStrategy::DerivativeOfClaim => derivative_of_claim(cx, &claim, function.as_str(), &var),
            IntegralStrategy::DirectComparison => match &own {
                Ok(own) => cx.judge.equivalent(&claim, own).map(|verdict| Finding {
                    verdict,
                    compared: format!("{} + C", own),
                }),
                Err(err) => Err(EngineError::from(err.clone())),
            },
        };

        match attempt {
            Ok(finding) => {
                debug!(target: "mathcheck::ops", function = %function, claim, ?strategy, equivalent = finding.verdict.equivalent, "integral decided");
                return report(strategy, finding, &function.to_string(), &claim, correct_integral);
            }
            Err(err) => {
                debug!(target: "mathcheck::ops", function = %function, claim, ?strategy, %err, "strategy could not decide");
                last_error = Some(err);
            }
        }
    }

    let reason = last_error
        .map(|err| err.to_string())
        .unwrap_or_else(|| "no strategy applied".to_string());
    VerificationResult::failure(
        OP,
        ErrorKind::EvaluationFailed,
        format!("Could not check '{}' as an integral of {}: {}", claim, function, reason),
    )
    .with_primary_value(claim)
    .with_correct_integral(correct_integral)
}

fn derivative_of_claim<C: SymbolicCapability + ?Sized>(
    cx: &OpContext<'_, C>,
    claim: &str,
    function: &str,
    var: &str,
) -> Result<Finding, EngineError> {
    let derivative = cx
        .capability
        .parse(claim)
        .and_then(|c| cx.capability.differentiate(&c, var))
        .map(|d| cx.capability.stringify(&d))?;
    let verdict = cx.judge.equivalent(&derivative, function)?;
    Ok(Finding {
        verdict,
        compared: derivative,
    })
}

fn report(
    strategy: IntegralStrategy,
    finding: Finding,
    function: &str,
    claim: &str,
    correct_integral: Option<String>,
) -> VerificationResult {
    let Finding { verdict, compared } = finding;
    let explanation = match (strategy, verdict.equivalent) {
        (IntegralStrategy::DerivativeOfClaim, true) => format!(
            "The derivative of {} is {}, which matches {} (checked by {}).",
            claim, compared, function, strategy
        ),
        (IntegralStrategy::DerivativeOfClaim, false) => format!(
            "The derivative of {} is {}, not {} (checked by {}).{}",
            claim,
            compared,
            function,
            strategy,
            hint(&correct_integral)
        ),
        (IntegralStrategy::DirectComparison, true) => format!(
            "{} matches {} up to a constant (checked by {}).",
            claim, compared, strategy
        ),
        (IntegralStrategy::DirectComparison, false) => format!(
            "{} does not match {} (checked by {}).",
            claim, compared, strategy
        ),
    };
    VerificationResult::new(OP, verdict.equivalent, explanation)
        .with_primary_value(claim)
        .with_correct_integral(correct_integral)
        .with_counterexample(verdict.counterexample)
}

fn hint(correct_integral: &Option<String>) -> String {
    correct_integral
        .as_ref()
        .map(|c| format!(" An antiderivative is {}.", c))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::ops::test_support::context;
    use mathcheck_symbolic::Cas;

    fn check(function: &str, claim: &str) -> VerificationResult {
        let cas = Cas::default();
        let config = EngineConfig::default();
        verify_integral(&context(&cas, &config), function, claim)
    }

    #[test]
    fn test_constant_of_integration_is_ignored() {
        let with_c = check("2x + 3", "x^2 + 3x + C");
        let without_c = check("2x + 3", "x^2 + 3x");
        assert!(with_c.verdict);
        assert!(without_c.verdict);
        assert_eq!(with_c.correct_integral.as_deref(), Some("x^2 + 3 * x + C"));
        assert!(with_c.explanation.contains("differentiating the claim"));
        assert!(check("2x + 3", "x^2 + 3x + 7").verdict);
    }

    #[test]
    fn test_wrong_integral() {
        let r = check("2x + 3", "x^2 + 2x + C");
        assert!(!r.verdict);
        assert_eq!(r.error, None);
        assert!(r.explanation.contains("An antiderivative is x^2 + 3 * x + C"));
    }

    #[test]
    fn test_transcendental() {
        assert!(check("cos(x)", "sin(x) + C").verdict);
        assert!(check("1/x", "ln(x) + C1").verdict);
        assert!(check("e^(2x)", "e^(2x)/2 + C").verdict);
        assert!(!check("sin(x)", "cos(x) + C").verdict);
    }

    #[test]
    fn test_claim_without_our_antiderivative() {
        // no rule for x*sin(x), but the claim can still be differentiated
        let r = check("x * sin(x)", "sin(x) - x*cos(x) + C");
        assert!(r.verdict);
        assert_eq!(r.correct_integral, None);
    }

    #[test]
    fn test_unreadable_claim() {
        let r = check("2x", "x^2 +* 1");
        assert!(!r.verdict);
        assert_eq!(r.error, Some(ErrorKind::EvaluationFailed));
        assert_eq!(r.correct_integral.as_deref(), Some("x^2 + C"));

        let r = check("2x", "+ C");
        assert_eq!(r.error, Some(ErrorKind::InvalidFormat));
    }

    #[test]
    fn test_strategy_order() {
        assert_eq!(
            IntegralStrategy::ORDER,
            [IntegralStrategy::DerivativeOfClaim, IntegralStrategy::DirectComparison]
        );
    }
}
