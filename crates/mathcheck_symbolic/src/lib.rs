//! Symbolic math capability used by the verification engine.
//!
//! [`Cas`] is stateless: every [`Expression`] owns its own arena, so a single
//! `Cas` can be shared across threads without locking.

pub mod cas;
pub mod differentiation;
pub mod error;
pub mod evaluator;
pub mod expression;
pub mod integration;
mod poly;
pub mod simplify;

pub use cas::{Cas, CasOptions, Evaluated};
pub use error::CasError;
pub use evaluator::eval_f64;
pub use expression::Expression;
