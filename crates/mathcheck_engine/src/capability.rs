//! The computer-algebra seam.
//!
//! The engine never touches an expression tree directly. Everything symbolic
//! goes through [`SymbolicCapability`], so a different algebra system can be
//! plugged in at construction time. [`mathcheck_symbolic::Cas`] is the
//! in-tree implementation.

use mathcheck_symbolic::{Cas, CasError, Expression};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Variable name to value.
pub type Substitutions = BTreeMap<String, f64>;

/// Result of evaluating an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluated<E> {
    Number(f64),
    /// Free variables remained after substitution.
    Symbolic(E),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    #[error("Could not parse expression: {0}")]
    Parse(String),
    #[error("Invalid value: {0}")]
    InvalidValue(String),
    #[error("Evaluation failed: {0}")]
    Evaluation(String),
    #[error("Unsupported: {0}")]
    Unsupported(String),
}

pub trait SymbolicCapability: Send + Sync {
    type Expr: Clone + fmt::Debug + Send + Sync;

    fn parse(&self, text: &str) -> Result<Self::Expr, CapabilityError>;

    /// Canonical text of an expression. A symbolic zero must print as `0`.
    fn stringify(&self, expr: &Self::Expr) -> String;

    fn evaluate(
        &self,
        expr: &Self::Expr,
        substitutions: &Substitutions,
    ) -> Result<Evaluated<Self::Expr>, CapabilityError>;

    fn differentiate(&self, expr: &Self::Expr, var: &str) -> Result<Self::Expr, CapabilityError>;

    /// Antiderivative without a constant of integration.
    fn integrate(&self, expr: &Self::Expr, var: &str) -> Result<Self::Expr, CapabilityError>;
}

impl From<CasError> for CapabilityError {
    fn from(err: CasError) -> Self {
        match err {
            CasError::Parse(inner) => CapabilityError::Parse(inner.to_string()),
            CasError::NotDifferentiable(_) | CasError::NoIntegral(_) | CasError::UnknownFunction(_) => {
                CapabilityError::Unsupported(err.to_string())
            }
            other => CapabilityError::Evaluation(other.to_string()),
        }
    }
}

impl SymbolicCapability for Cas {
    type Expr = Expression;

    fn parse(&self, text: &str) -> Result<Expression, CapabilityError> {
        Ok(Cas::parse(self, text)?)
    }

    fn stringify(&self, expr: &Expression) -> String {
        expr.to_string()
    }

    fn evaluate(
        &self,
        expr: &Expression,
        substitutions: &Substitutions,
    ) -> Result<Evaluated<Expression>, CapabilityError> {
        if let Some((name, value)) = substitutions.iter().find(|(_, v)| !v.is_finite()) {
            return Err(CapabilityError::InvalidValue(format!("{} = {}", name, value)));
        }
        Ok(match Cas::evaluate(self, expr, substitutions)? {
            mathcheck_symbolic::Evaluated::Number(v) => Evaluated::Number(v),
            mathcheck_symbolic::Evaluated::Symbolic(e) => Evaluated::Symbolic(e),
        })
    }

    fn differentiate(&self, expr: &Expression, var: &str) -> Result<Expression, CapabilityError> {
        Ok(Cas::differentiate(self, expr, var)?)
    }

    fn integrate(&self, expr: &Expression, var: &str) -> Result<Expression, CapabilityError> {
        Ok(Cas::integrate(self, expr, var)?)
    }
}

macro_rules! forward_capability {
    ($($wrapper:ty),*) => {$(
        impl<C: SymbolicCapability + ?Sized> SymbolicCapability for $wrapper {
            type Expr = C::Expr;

            fn parse(&self, text: &str) -> Result<Self::Expr, CapabilityError> {
                (**self).parse(text)
            }

            fn stringify(&self, expr: &Self::Expr) -> String {
                (**self).stringify(expr)
            }

            fn evaluate(
                &self,
                expr: &Self::Expr,
                substitutions: &Substitutions,
            ) -> Result<Evaluated<Self::Expr>, CapabilityError> {
                (**self).evaluate(expr, substitutions)
            }

            fn differentiate(&self, expr: &Self::Expr, var: &str) -> Result<Self::Expr, CapabilityError> {
                (**self).differentiate(expr, var)
            }

            fn integrate(&self, expr: &Self::Expr, var: &str) -> Result<Self::Expr, CapabilityError> {
                (**self).integrate(expr, var)
            }
        }
    )*};
}

forward_capability!(&C, Arc<C>, Box<C>);
