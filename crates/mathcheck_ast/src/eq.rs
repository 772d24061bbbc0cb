//! Relational statements (`lhs = rhs`, `lhs < rhs`, ...).

use crate::{Context, Expr, ExprId};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelOp {
    Eq,  // =
    Neq, // !=
    Lt,  // <
    Gt,  // >
    Leq, // <=
    Geq, // >=
}

impl fmt::Display for RelOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelOp::Eq => write!(f, "="),
            RelOp::Neq => write!(f, "!="),
            RelOp::Lt => write!(f, "<"),
            RelOp::Gt => write!(f, ">"),
            RelOp::Leq => write!(f, "<="),
            RelOp::Geq => write!(f, ">="),
        }
    }
}

impl RelOp {
    /// Decide the relation for two already-evaluated sides.
    pub fn holds(self, lhs: f64, rhs: f64, tolerance: f64) -> bool {
        let close = (lhs - rhs).abs() < tolerance;
        match self {
            RelOp::Eq => close,
            RelOp::Neq => !close,
            RelOp::Lt => lhs < rhs && !close,
            RelOp::Gt => lhs > rhs && !close,
            RelOp::Leq => lhs < rhs || close,
            RelOp::Geq => lhs > rhs || close,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Equation {
    pub lhs: ExprId,
    pub rhs: ExprId,
    pub op: RelOp,
}

impl Equation {
    /// Move everything to one side: `lhs - rhs`.
    pub fn residual(&self, ctx: &mut Context) -> ExprId {
        ctx.add(Expr::Sub(self.lhs, self.rhs))
    }
}
