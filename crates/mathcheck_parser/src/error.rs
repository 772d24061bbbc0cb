use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Parse error: {0}")]
    NomError(String),
    #[error("Unconsumed input: {0}")]
    UnconsumedInput(String),
    #[error("Empty input")]
    Empty,
    #[error("Expression nests deeper than {0} levels")]
    TooDeep(usize),
    #[error("Expression has more than {0} nodes")]
    TooLarge(usize),
}
