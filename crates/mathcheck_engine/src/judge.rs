//! The Equivalence Judge.
//!
//! Two expressions are the same answer when their difference vanishes. The
//! difference is tried first; only if the capability cannot produce it are
//! the two sides evaluated separately and compared.

use crate::capability::{CapabilityError, Evaluated, Substitutions, SymbolicCapability};
use crate::error::EngineError;
use crate::normalize::free_variables;
use crate::sampling::sample_residue;
use crate::report::Counterexample;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonMode {
    /// Decided by comparing numbers.
    Numeric,
    /// Decided on an expression with free variables.
    Symbolic,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EquivalenceVerdict {
    pub equivalent: bool,
    pub left_value: Option<f64>,
    pub right_value: Option<f64>,
    pub mode: ComparisonMode,
    pub counterexample: Option<Counterexample>,
}

impl EquivalenceVerdict {
    fn new(equivalent: bool, mode: ComparisonMode) -> Self {
        Self {
            equivalent,
            left_value: None,
            right_value: None,
            mode,
            counterexample: None,
        }
    }
}

pub struct EquivalenceJudge<'a, C: ?Sized> {
    capability: &'a C,
    tolerance: f64,
    sample_values: &'a [f64],
}

impl<'a, C: SymbolicCapability + ?Sized> EquivalenceJudge<'a, C> {
    pub fn new(capability: &'a C, tolerance: f64, sample_values: &'a [f64]) -> Self {
        Self {
            capability,
            tolerance,
            sample_values,
        }
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Strictly below the tolerance counts as zero.
    pub fn is_negligible(&self, value: f64) -> bool {
        value.abs() < self.tolerance
    }

    /// Decide whether `a` and `b` denote the same value.
    pub fn equivalent(&self, a: &str, b: &str) -> Result<EquivalenceVerdict, EngineError> {
        match self.by_difference(a, b) {
            Ok(verdict) => {
                debug!(target: "mathcheck::judge", a, b, equivalent = verdict.equivalent, mode = ?verdict.mode, "difference strategy");
                Ok(verdict)
            }
            Err(err) => {
                debug!(target: "mathcheck::judge", a, b, %err, "difference failed, comparing values");
                self.by_evaluation(a, b)
            }
        }
    }

    fn by_difference(&self, a: &str, b: &str) -> Result<EquivalenceVerdict, CapabilityError> {
        let residue = self.capability.parse(&format!("({}) - ({})", a, b))?;
        let has_variables = !free_variables(&self.capability.stringify(&residue)).is_empty();
        let mode = if has_variables {
            ComparisonMode::Symbolic
        } else {
            ComparisonMode::Numeric
        };

        match self.capability.evaluate(&residue, &Substitutions::new())? {
            Evaluated::Number(value) => Ok(EquivalenceVerdict::new(self.is_negligible(value), mode)),
            Evaluated::Symbolic(simplified) => Ok(self.judge_residue(&simplified)),
        }
    }

    /// Decide a residue with free variables by sampling it.
    pub fn judge_residue(&self, residue: &C::Expr) -> EquivalenceVerdict {
        let text = self.capability.stringify(residue);
        if text == "0" {
            return EquivalenceVerdict::new(true, ComparisonMode::Symbolic);
        }
        let vars = free_variables(&text);
        let outcome = sample_residue(
            self.capability,
            residue,
            &vars,
            self.sample_values,
            self.tolerance,
        );
        debug!(target: "mathcheck::judge", residue = %text, defined = outcome.defined, vanishes = outcome.vanishes(), "sampled residue");
        EquivalenceVerdict {
            equivalent: outcome.vanishes(),
            counterexample: outcome.counterexample,
            ..EquivalenceVerdict::new(false, ComparisonMode::Symbolic)
        }
    }

    fn by_evaluation(&self, a: &str, b: &str) -> Result<EquivalenceVerdict, EngineError> {
        let left = self.evaluate(a, &Substitutions::new())?;
        let right = self.evaluate(b, &Substitutions::new())?;
        match (left, right) {
            (Evaluated::Number(l), Evaluated::Number(r)) => Ok(EquivalenceVerdict {
                left_value: Some(l),
                right_value: Some(r),
                ..EquivalenceVerdict::new(self.is_negligible(l - r), ComparisonMode::Numeric)
            }),
            _ => Ok(EquivalenceVerdict::new(false, ComparisonMode::Symbolic)),
        }
    }

    /// Parse and evaluate `text` under `substitutions`.
    pub fn evaluate(
        &self,
        text: &str,
        substitutions: &Substitutions,
    ) -> Result<Evaluated<C::Expr>, CapabilityError> {
        let expr = self.capability.parse(text)?;
        self.capability.evaluate(&expr, substitutions)
    }

    /// Like [`Self::evaluate`] but a leftover variable is an error.
    pub fn evaluate_number(&self, text: &str, substitutions: &Substitutions) -> Result<f64, CapabilityError> {
        match self.evaluate(text, substitutions)? {
            Evaluated::Number(value) => Ok(value),
            Evaluated::Symbolic(rest) => Err(CapabilityError::Evaluation(format!(
                "'{}' still depends on {}",
                self.capability.stringify(&rest),
                free_variables(&self.capability.stringify(&rest)).join(", ")
            ))),
        }
    }

    /// Parse, simplify and print, for explanations and corrected answers.
    pub fn simplified_text(&self, text: &str) -> Result<String, CapabilityError> {
        Ok(match self.evaluate(text, &Substitutions::new())? {
            Evaluated::Number(value) => crate::report::format_number(value),
            Evaluated::Symbolic(expr) => self.capability.stringify(&expr),
        })
    }
}
