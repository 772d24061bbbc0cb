//! Verification engine for student mathematics.
//!
//! [`VerificationEngine`] answers six questions about free-form student input
//! (is this the solution, is this step valid, is this the right number, the
//! right derivative, the right antiderivative, what does this evaluate to) and
//! returns a structured verdict with a plain-language explanation. Symbolic
//! work is delegated to a [`SymbolicCapability`], by default
//! [`mathcheck_symbolic::Cas`].

pub mod capability;
pub mod config;
pub mod engine;
pub mod error;
pub mod judge;
pub mod normalize;
pub mod ops;
pub mod report;
pub mod request;
pub mod sampling;

pub use capability::{CapabilityError, Evaluated, Substitutions, SymbolicCapability};
pub use config::EngineConfig;
pub use engine::VerificationEngine;
pub use error::{ConfigError, EngineError};
pub use judge::{ComparisonMode, EquivalenceJudge, EquivalenceVerdict};
pub use normalize::NormalizedExpression;
pub use ops::integral::IntegralStrategy;
pub use report::{Counterexample, ErrorKind, EvaluationResult, OperationKind, VerificationResult};
pub use request::{VerificationOutcome, VerificationRequest};
