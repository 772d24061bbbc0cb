use mathcheck_ast::{collect_variables, AstError, Context, DisplayExpr, ExprId};
use std::collections::BTreeSet;
use std::fmt;

/// A self-contained expression: an arena plus the root of one tree in it.
#[derive(Debug, Clone)]
pub struct Expression {
    ctx: Context,
    root: ExprId,
}

impl Expression {
    pub fn new(ctx: Context, root: ExprId) -> Result<Self, AstError> {
        ctx.try_get(root)?;
        Ok(Self { ctx, root })
    }

    pub(crate) fn from_parts(ctx: Context, root: ExprId) -> Self {
        Self { ctx, root }
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn root(&self) -> ExprId {
        self.root
    }

    pub fn into_parts(self) -> (Context, ExprId) {
        (self.ctx, self.root)
    }

    pub fn variables(&self) -> BTreeSet<String> {
        collect_variables(&self.ctx, self.root)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            DisplayExpr {
                context: &self.ctx,
                id: self.root
            }
        )
    }
}
