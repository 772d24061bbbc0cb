pub mod error;
pub mod parser;

pub use error::ParseError;
pub use parser::{parse, parse_statement, parse_with_limits, ParseLimits, Statement};
