pub mod display;
pub mod eq;
pub mod error;
pub mod expression;
pub mod traversal;

pub use display::{is_zero_literal, render, DisplayExpr};
pub use eq::{Equation, RelOp};
pub use error::AstError;
pub use expression::{Constant, Context, Expr, ExprId};
pub use traversal::{
    additive_chain, collect_variables, contains_named_var, count_all_nodes, multiplicative_chain,
    rebuild_chain, substitute_variable, ChainOp,
};
