//! Numeric sampling of a symbolic residue.
//!
//! When `a - b` does not simplify to a number, the residue is evaluated at a
//! fixed table of points. Points where the residue is undefined (division by
//! zero, logarithm of a negative) are skipped.

use crate::capability::{Evaluated, Substitutions, SymbolicCapability};
use crate::report::Counterexample;
use std::f64::consts::{E, FRAC_1_SQRT_2, PI, SQRT_2};
use tracing::trace;

/// Small integers, simple fractions and a few irrationals, no randomness.
pub const DEFAULT_SAMPLE_VALUES: [f64; 20] = [
    0.0,
    1.0,
    -1.0,
    2.0,
    -2.0,
    0.5,
    -0.5,
    3.0,
    -3.0,
    0.25,
    0.1,
    -0.1,
    PI,
    E,
    1.5,
    -1.5,
    4.0,
    5.0,
    FRAC_1_SQRT_2,
    SQRT_2,
];

const GRID_SIDE: usize = 10;
const ROTATIONS: usize = 50;

#[derive(Debug, Clone, PartialEq)]
pub struct SampleOutcome {
    /// Points at which the residue had a numeric value.
    pub defined: usize,
    /// First defined point whose value was outside the tolerance.
    pub counterexample: Option<Counterexample>,
}

impl SampleOutcome {
    /// Zero everywhere it was defined, and defined somewhere.
    pub fn vanishes(&self) -> bool {
        self.defined > 0 && self.counterexample.is_none()
    }
}

/// Sample assignments for `vars`: every value for one variable, a grid for
/// two, a rotating selection for more.
pub fn sample_points(vars: &[String], values: &[f64]) -> Vec<Substitutions> {
    match vars {
        [] => vec![Substitutions::new()],
        [only] => values
            .iter()
            .map(|v| Substitutions::from([(only.clone(), *v)]))
            .collect(),
        [first, second] => {
            let side = &values[..values.len().min(GRID_SIDE)];
            side.iter()
                .flat_map(|v1| {
                    side.iter().map(move |v2| {
                        Substitutions::from([(first.clone(), *v1), (second.clone(), *v2)])
                    })
                })
                .collect()
        }
        _ => (0..ROTATIONS)
            .map(|i| {
                vars.iter()
                    .enumerate()
                    .map(|(j, var)| (var.clone(), values[(i + j) % values.len()]))
                    .collect()
            })
            .collect(),
    }
}

/// Evaluate `residue` at each sample point and stop at the first one that is
/// not within `tolerance` of zero.
pub fn sample_residue<C: SymbolicCapability + ?Sized>(
    capability: &C,
    residue: &C::Expr,
    vars: &[String],
    values: &[f64],
    tolerance: f64,
) -> SampleOutcome {
    let mut defined = 0;
    if values.is_empty() {
        return SampleOutcome {
            defined,
            counterexample: None,
        };
    }

    for point in sample_points(vars, values) {
        match capability.evaluate(residue, &point) {
            Ok(Evaluated::Number(value)) => {
                defined += 1;
                if value.abs() >= tolerance {
                    trace!(target: "mathcheck::sampling", ?point, value, "counterexample");
                    return SampleOutcome {
                        defined,
                        counterexample: Some(Counterexample {
                            assignments: point,
                            difference: value,
                        }),
                    };
                }
            }
            Ok(Evaluated::Symbolic(_)) => {
                trace!(target: "mathcheck::sampling", ?point, "residue still symbolic");
            }
            Err(err) => {
                trace!(target: "mathcheck::sampling", ?point, %err, "undefined at point");
            }
        }
    }

    SampleOutcome {
        defined,
        counterexample: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mathcheck_symbolic::Cas;

    fn vars(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_sample_point_counts() {
        let values = DEFAULT_SAMPLE_VALUES;
        assert_eq!(sample_points(&vars(&["x"]), &values).len(), 20);
        assert_eq!(sample_points(&vars(&["x", "y"]), &values).len(), 100);
        assert_eq!(sample_points(&vars(&["a", "b", "c"]), &values).len(), 50);
        assert_eq!(sample_points(&[], &values).len(), 1);
    }

    #[test]
    fn test_identity_has_no_counterexample() {
        let cas = Cas::default();
        let residue = cas.parse("sin(x)^2 + cos(x)^2 - 1").expect("parse");
        let outcome = sample_residue(&cas, &residue, &vars(&["x"]), &DEFAULT_SAMPLE_VALUES, 1e-4);
        assert!(outcome.vanishes());
        assert_eq!(outcome.defined, 20);
    }

    #[test]
    fn test_first_failing_point_is_reported() {
        let cas = Cas::default();
        let residue = cas.parse("x * (x - 1)").expect("parse");
        let outcome = sample_residue(&cas, &residue, &vars(&["x"]), &DEFAULT_SAMPLE_VALUES, 1e-4);
        let ce = outcome.counterexample.expect("counterexample");
        assert_eq!(ce.assignments.get("x"), Some(&-1.0));
        assert_eq!(ce.difference, 2.0);
    }

    #[test]
    fn test_undefined_points_are_skipped() {
        let cas = Cas::default();
        let residue = cas.parse("ln(x) - ln(x)").expect("parse");
        // ln(-1) is a domain error, so only x = 2 counts
        let outcome = sample_residue(&cas, &residue, &vars(&["x"]), &[-1.0, 2.0], 1e-4);
        assert!(outcome.vanishes());
        assert_eq!(outcome.defined, 1);

        let residue = cas.parse("sqrt(x) - sqrt(x) + 1/x - 1/x").expect("parse");
        let outcome = sample_residue(&cas, &residue, &vars(&["x"]), &[0.0], 1e-4);
        assert_eq!(outcome.defined, 0);
        assert!(!outcome.vanishes());
    }
}
