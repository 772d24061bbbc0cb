use mathcheck_parser::ParseError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CasError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("Division by zero")]
    DivisionByZero,
    #[error("Domain error in {function}: {detail}")]
    Domain { function: String, detail: String },
    #[error("Variable '{0}' has no value")]
    UnboundVariable(String),
    #[error("Unknown function '{0}'")]
    UnknownFunction(String),
    #[error("Cannot differentiate '{0}'")]
    NotDifferentiable(String),
    #[error("No closed-form antiderivative found for '{0}'")]
    NoIntegral(String),
    #[error("Result is not a finite number")]
    NonFinite,
    #[error("Expression nesting exceeds {0} levels")]
    TooDeep(usize),
    #[error("Exponent {0} is too large to expand")]
    Overflow(String),
}

impl CasError {
    pub(crate) fn domain(function: &str, detail: impl Into<String>) -> Self {
        CasError::Domain {
            function: function.to_string(),
            detail: detail.into(),
        }
    }
}
