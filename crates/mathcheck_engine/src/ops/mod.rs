//! The six verification operations.
//!
//! Each operation is a total function: whatever the capability does, the
//! caller gets a definite verdict and a non-empty explanation back.

pub mod algebra;
pub mod calculation;
pub mod derivative;
pub mod equation;
pub mod evaluate;
pub mod integral;

use crate::config::EngineConfig;
use crate::judge::EquivalenceJudge;

/// What every operation needs: the capability, a judge over it, and the
/// active configuration.
pub struct OpContext<'a, C: ?Sized> {
    pub capability: &'a C,
    pub judge: EquivalenceJudge<'a, C>,
    pub config: &'a EngineConfig,
}

/// A number as text the parser reads back exactly.
pub(crate) fn literal(value: f64) -> String {
    format!("{}", value)
}
