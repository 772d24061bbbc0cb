use super::{literal, OpContext};
use crate::capability::{Evaluated, Substitutions, SymbolicCapability};
use crate::error::EngineError;
use crate::normalize::{normalize, substitute_word};
use crate::report::{format_number, ErrorKind, EvaluationResult};
use tracing::debug;

/// Evaluate `expression` after replacing each named variable with its value.
/// Falls back to the simplified expression when variables remain.
pub fn evaluate_expression<C: SymbolicCapability + ?Sized>(
    cx: &OpContext<'_, C>,
    expression: &str,
    substitutions: &Substitutions,
) -> EvaluationResult {
    let normalized = normalize(expression);
    let mut text = normalized.as_str().to_string();
    for (name, value) in substitutions {
        if !value.is_finite() {
            return EvaluationResult::failure(
                ErrorKind::InvalidValue,
                format!("The value given for {} is not a finite number.", name),
            );
        }
        text = substitute_word(&text, name, &literal(*value));
    }

    let given = substitutions
        .iter()
        .map(|(name, value)| format!("{} = {}", name, format_number(*value)))
        .collect::<Vec<_>>()
        .join(", ");
    let context = if given.is_empty() {
        normalized.to_string()
    } else {
        format!("{} with {}", normalized, given)
    };

    match cx.judge.evaluate(&text, &Substitutions::new()) {
        Ok(Evaluated::Number(value)) => {
            let result = format_number(value);
            EvaluationResult::value(result.clone(), format!("{} evaluates to {}.", context, result))
        }
        Ok(Evaluated::Symbolic(expr)) => {
            let result = cx.capability.stringify(&expr);
            EvaluationResult::value(
                result.clone(),
                format!("{} simplifies to {}; it still contains free variables.", context, result),
            )
        }
        Err(err) => {
            debug!(target: "mathcheck::ops", expression = %text, %err, "evaluation failed");
            let err = EngineError::from(err);
            EvaluationResult::failure(err.kind(), format!("Could not evaluate {}: {}", context, err))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::ops::test_support::context;
    use mathcheck_symbolic::Cas;

    fn eval(expression: &str, subs: &[(&str, f64)]) -> EvaluationResult {
        let cas = Cas::default();
        let config = EngineConfig::default();
        let subs: Substitutions = subs.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        evaluate_expression(&context(&cas, &config), expression, &subs)
    }

    #[test]
    fn test_numeric() {
        let r = eval("x^2 + 5x", &[("x", 2.0)]);
        assert_eq!(r.result, "14");
        assert_eq!(r.error, None);
        assert_eq!(r.explanation, "x^2 + 5x with x = 2 evaluates to 14.");
        assert_eq!(eval("1/4 + 1/4", &[]).result, "0.5");
    }

    #[test]
    fn test_symbolic_fallback() {
        let r = eval("x * y + y", &[("x", 3.0)]);
        assert_eq!(r.result, "4 * y");
        assert_eq!(r.error, None);
    }

    #[test]
    fn test_errors() {
        let r = eval("1 / (x - 2)", &[("x", 2.0)]);
        assert_eq!(r.error, Some(ErrorKind::EvaluationFailed));
        assert_eq!(r.result, "");
        assert_eq!(eval("2 +* 3", &[]).error, Some(ErrorKind::InvalidFormat));
        assert_eq!(eval("x", &[("x", f64::NAN)]).error, Some(ErrorKind::InvalidValue));
    }
}
