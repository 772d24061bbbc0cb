use super::OpContext;
use crate::capability::{CapabilityError, Evaluated, Substitutions, SymbolicCapability};
use crate::error::EngineError;
use crate::normalize::{free_variables, normalize, split_relation};
use crate::report::{ErrorKind, OperationKind, VerificationResult};
use crate::sampling::sample_points;
use mathcheck_ast::RelOp;
use tracing::debug;

const OP: OperationKind = OperationKind::AlgebraicStep;

/// One side of a step: an equation moved to `(lhs) - (rhs)`, or a bare
/// expression.
#[derive(Debug)]
struct Side {
    text: String,
    relation: Option<RelOp>,
}

impl Side {
    fn read(text: &str) -> Result<Self, ErrorKind> {
        let normalized = normalize(text);
        Ok(match split_relation(normalized.as_str())? {
            Some(relation) => Side {
                text: format!("({}) - ({})", relation.lhs, relation.rhs),
                relation: Some(relation.op),
            },
            None => Side {
                text: normalized.into_string(),
                relation: None,
            },
        })
    }
}

fn mirrored(op: RelOp) -> RelOp {
    match op {
        RelOp::Lt => RelOp::Gt,
        RelOp::Gt => RelOp::Lt,
        RelOp::Leq => RelOp::Geq,
        RelOp::Geq => RelOp::Leq,
        other => other,
    }
}

/// Whether scaling a relation by `factor` turns `from` into `to`.
fn scaling_preserves(from: RelOp, to: RelOp, factor: f64) -> bool {
    match from {
        RelOp::Eq | RelOp::Neq => to == from,
        _ if factor > 0.0 => to == from,
        _ => to == mirrored(from),
    }
}

/// Is `resulting` a valid rewrite of `original`?
///
/// Besides an unchanged residue, a step between equations is accepted when
/// the new residue `lhs - rhs` is a non-zero constant multiple of the old
/// one. This extends plain equivalence on purpose, so multiplying through
/// (`x + 1 = 3` to `2x + 2 = 6`) is a valid step. Inequalities flip when the
/// constant is negative. The optional `operation` text is only echoed back.
pub fn verify_algebraic_step<C: SymbolicCapability + ?Sized>(
    cx: &OpContext<'_, C>,
    original: &str,
    resulting: &str,
    operation: Option<&str>,
) -> VerificationResult {
    let note = operation
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!(" ({})", s))
        .unwrap_or_default();
    let (before, after) = match (Side::read(original), Side::read(resulting)) {
        (Ok(before), Ok(after)) => (before, after),
        _ => {
            return VerificationResult::failure(
                OP,
                ErrorKind::VerificationFailed,
                format!(
                    "Could not confirm the step from '{}' to '{}'{}: each side must be an expression or a single equation.",
                    original.trim(),
                    resulting.trim(),
                    note
                ),
            )
        }
    };

    match decide(cx, &before, &after) {
        Ok(Decision::Same) => VerificationResult::new(
            OP,
            true,
            format!("'{}' follows from '{}'{}.", resulting.trim(), original.trim(), note),
        ),
        Ok(Decision::Scaled(factor)) => VerificationResult::new(
            OP,
            true,
            format!(
                "'{}' follows from '{}'{}: it is the same equation multiplied by {}.",
                resulting.trim(),
                original.trim(),
                note,
                crate::report::format_number(factor)
            ),
        ),
        Ok(Decision::Different(counterexample)) => {
            let reason = counterexample
                .as_ref()
                .map(|ce| format!(" For example, {}.", ce))
                .unwrap_or_default();
            VerificationResult::new(
                OP,
                false,
                format!(
                    "'{}' does not follow from '{}'{}.{}",
                    resulting.trim(),
                    original.trim(),
                    note,
                    reason
                ),
            )
            .with_corrected_expression(corrected(cx, &before))
            .with_counterexample(counterexample)
        }
        Err(err) => {
            debug!(target: "mathcheck::ops", original, resulting, %err, "step could not be checked");
            VerificationResult::failure(
                OP,
                ErrorKind::VerificationFailed,
                format!(
                    "Could not confirm the step from '{}' to '{}'{}: {}",
                    original.trim(),
                    resulting.trim(),
                    note,
                    err
                ),
            )
            .with_corrected_expression(corrected(cx, &before))
        }
    }
}

enum Decision {
    Same,
    Scaled(f64),
    Different(Option<crate::report::Counterexample>),
}

fn decide<C: SymbolicCapability + ?Sized>(
    cx: &OpContext<'_, C>,
    before: &Side,
    after: &Side,
) -> Result<Decision, EngineError> {
    let verdict = cx.judge.equivalent(&before.text, &after.text)?;
    let same_relation = match (before.relation, after.relation) {
        (Some(a), Some(b)) => scaling_preserves(a, b, 1.0),
        _ => true,
    };
    if verdict.equivalent && same_relation {
        return Ok(Decision::Same);
    }

    if let (Some(from), Some(to)) = (before.relation, after.relation) {
        if let Some(factor) = constant_ratio(cx, &after.text, &before.text)? {
            if scaling_preserves(from, to, factor) {
                return Ok(Decision::Scaled(factor));
            }
        }
    }
    Ok(Decision::Different(verdict.counterexample))
}

/// `Some(c)` when `a / b` is the same non-zero number wherever it is defined.
fn constant_ratio<C: SymbolicCapability + ?Sized>(
    cx: &OpContext<'_, C>,
    a: &str,
    b: &str,
) -> Result<Option<f64>, CapabilityError> {
    let ratio = cx.capability.parse(&format!("({}) / ({})", a, b))?;
    let simplified = match cx.capability.evaluate(&ratio, &Substitutions::new()) {
        Ok(Evaluated::Number(value)) => {
            return Ok(Some(value).filter(|v| !cx.judge.is_negligible(*v)))
        }
        Ok(Evaluated::Symbolic(expr)) => expr,
        // 0/0 when both residues are identically zero
        Err(_) => return Ok(None),
    };

    let vars = free_variables(&cx.capability.stringify(&simplified));
    let mut first: Option<f64> = None;
    for point in sample_points(&vars, &cx.config.sample_values) {
        let Ok(Evaluated::Number(value)) = cx.capability.evaluate(&simplified, &point) else {
            continue;
        };
        match first {
            None => first = Some(value),
            Some(c) if cx.judge.is_negligible(value - c) => {}
            Some(_) => return Ok(None),
        }
    }
    Ok(first.filter(|v| !cx.judge.is_negligible(*v)))
}

/// The original moved to one side and simplified.
fn corrected<C: SymbolicCapability + ?Sized>(cx: &OpContext<'_, C>, before: &Side) -> Option<String> {
    let simplified = cx.judge.simplified_text(&before.text).ok()?;
    Some(match before.relation {
        Some(op) => format!("{} {} 0", simplified, op),
        None => simplified,
    })
}
