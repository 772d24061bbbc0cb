use crate::capability::{Substitutions, SymbolicCapability};
use crate::config::EngineConfig;
use crate::judge::EquivalenceJudge;
use crate::ops::{self, OpContext};
use crate::report::{EvaluationResult, VerificationResult};
use crate::request::{VerificationOutcome, VerificationRequest};
use mathcheck_symbolic::Cas;
use tracing::debug;

/// Stateless front door: each call is independent, so one engine can be
/// shared across threads.
#[derive(Debug, Clone)]
pub struct VerificationEngine<C = Cas> {
    capability: C,
    config: EngineConfig,
}

impl VerificationEngine<Cas> {
    /// The in-tree algebra system, configured from `config`.
    pub fn from_config(config: EngineConfig) -> Self {
        Self::new(Cas::new(config.cas_options()), config)
    }
}

impl Default for VerificationEngine<Cas> {
    fn default() -> Self {
        Self::from_config(EngineConfig::default())
    }
}

impl<C: SymbolicCapability> VerificationEngine<C> {
    pub fn new(capability: C, config: EngineConfig) -> Self {
        Self { capability, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn capability(&self) -> &C {
        &self.capability
    }

    fn context(&self) -> OpContext<'_, C> {
        OpContext {
            capability: &self.capability,
            judge: EquivalenceJudge::new(
                &self.capability,
                self.config.tolerance,
                &self.config.sample_values,
            ),
            config: &self.config,
        }
    }

    pub fn verify_equation_solution(&self, equation: &str, claimed_solution: &str) -> VerificationResult {
        ops::equation::verify_equation_solution(&self.context(), equation, claimed_solution)
    }

    pub fn verify_algebraic_step(
        &self,
        original: &str,
        resulting: &str,
        operation: Option<&str>,
    ) -> VerificationResult {
        ops::algebra::verify_algebraic_step(&self.context(), original, resulting, operation)
    }

    pub fn verify_calculation(&self, expression: &str, claimed_result: &str) -> VerificationResult {
        ops::calculation::verify_calculation(&self.context(), expression, claimed_result)
    }

    pub fn verify_derivative(&self, function: &str, claimed_derivative: &str) -> VerificationResult {
        ops::derivative::verify_derivative(&self.context(), function, claimed_derivative)
    }

    pub fn verify_integral(&self, function: &str, claimed_integral: &str) -> VerificationResult {
        ops::integral::verify_integral(&self.context(), function, claimed_integral)
    }

    pub fn evaluate_expression(&self, expression: &str, substitutions: &Substitutions) -> EvaluationResult {
        ops::evaluate::evaluate_expression(&self.context(), expression, substitutions)
    }

    /// Dispatch a typed request to its operation.
    pub fn verify(&self, request: &VerificationRequest) -> VerificationOutcome {
        debug!(target: "mathcheck::engine", ?request, "verify");
        match request {
            VerificationRequest::EquationSolution {
                equation,
                claimed_solution,
            } => VerificationOutcome::Verification(self.verify_equation_solution(equation, claimed_solution)),
            VerificationRequest::AlgebraicStep {
                original,
                resulting,
                operation,
            } => VerificationOutcome::Verification(self.verify_algebraic_step(
                original,
                resulting,
                operation.as_deref(),
            )),
            VerificationRequest::Calculation {
                expression,
                claimed_result,
            } => VerificationOutcome::Verification(self.verify_calculation(expression, claimed_result)),
            VerificationRequest::Derivative {
                function,
                claimed_derivative,
            } => VerificationOutcome::Verification(self.verify_derivative(function, claimed_derivative)),
            VerificationRequest::Integral {
                function,
                claimed_integral,
            } => VerificationOutcome::Verification(self.verify_integral(function, claimed_integral)),
            VerificationRequest::Evaluate {
                expression,
                substitutions,
            } => VerificationOutcome::Evaluation(self.evaluate_expression(expression, substitutions)),
        }
    }

    /// [`Self::verify`] over a batch, in order.
    pub fn verify_all(&self, requests: &[VerificationRequest]) -> Vec<VerificationOutcome> {
        requests.iter().map(|r| self.verify(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_dispatch() {
        let engine = VerificationEngine::<Cas>::default();
        let outcome = engine.verify(&VerificationRequest::Calculation {
            expression: "8 * 5".to_string(),
            claimed_result: "40".to_string(),
        });
        assert_eq!(outcome.verdict(), Some(true));

        let outcome = engine.verify(&VerificationRequest::Evaluate {
            expression: "x^2 + 5x".to_string(),
            substitutions: Substitutions::from([("x".to_string(), 2.0)]),
        });
        assert_eq!(outcome.verdict(), None);
        match outcome {
            VerificationOutcome::Evaluation(r) => assert_eq!(r.result, "14"),
            other => panic!("expected evaluation, got {:?}", other),
        }
    }

    #[test]
    fn test_verify_all_keeps_order() {
        let engine = VerificationEngine::<Cas>::default();
        let requests = vec![
            VerificationRequest::Derivative {
                function: "x^2 + 3x".to_string(),
                claimed_derivative: "2x + 3".to_string(),
            },
            VerificationRequest::Derivative {
                function: "x^2 + 3x".to_string(),
                claimed_derivative: "2x + 5".to_string(),
            },
        ];
        let verdicts: Vec<_> = engine.verify_all(&requests).iter().map(|o| o.verdict()).collect();
        assert_eq!(verdicts, vec![Some(true), Some(false)]);
    }

    #[test]
    fn test_shared_capability() {
        let cas = Arc::new(Cas::default());
        let engine = VerificationEngine::new(Arc::clone(&cas), EngineConfig::default());
        assert!(engine.verify_integral("2x + 3", "x^2 + 3x + C").verdict);
    }

    #[test]
    fn test_custom_tolerance() {
        let config = EngineConfig {
            tolerance: 0.01,
            ..EngineConfig::default()
        };
        let engine = VerificationEngine::from_config(config);
        assert!(engine.verify_calculation("2 * pi", "6.28").verdict);
        assert!(!VerificationEngine::<Cas>::default().verify_calculation("2 * pi", "6.28").verdict);
    }
}
