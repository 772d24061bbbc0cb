use crate::differentiation::differentiate;
use crate::error::CasError;
use crate::evaluator::eval_f64;
use crate::expression::Expression;
use crate::integration::integrate;
use crate::simplify::Simplifier;
use mathcheck_ast::{substitute_variable, Context, Expr};
use mathcheck_parser::{parse_with_limits, ParseLimits};
use num_rational::BigRational;
use num_traits::ToPrimitive;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CasOptions {
    /// Integer powers of sums up to this exponent are expanded.
    pub max_expand_exponent: u32,
    /// Nesting budget shared by simplification and evaluation.
    pub max_depth: usize,
    /// Deepest grouping the parser accepts.
    pub max_nesting: usize,
    /// Largest parsed tree, in nodes.
    pub max_nodes: usize,
}

impl Default for CasOptions {
    fn default() -> Self {
        Self {
            max_expand_exponent: 16,
            max_depth: 200,
            max_nesting: 64,
            max_nodes: 4_000,
        }
    }
}

/// Outcome of [`Cas::evaluate`].
#[derive(Debug, Clone)]
pub enum Evaluated {
    Number(f64),
    /// Free variables remain; this is the simplified expression.
    Symbolic(Expression),
}

/// Stateless computer-algebra front end.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cas {
    options: CasOptions,
}

impl Cas {
    pub fn new(options: CasOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> CasOptions {
        self.options
    }

    fn simplifier(&self) -> Simplifier {
        Simplifier::new(self.options.max_expand_exponent, self.options.max_depth)
    }

    pub fn parse(&self, text: &str) -> Result<Expression, CasError> {
        let mut ctx = Context::new();
        let limits = ParseLimits {
            max_nesting: self.options.max_nesting,
            max_nodes: self.options.max_nodes,
        };
        let root = parse_with_limits(text, &mut ctx, limits)?;
        Ok(Expression::from_parts(ctx, root))
    }

    pub fn simplify(&self, expr: &Expression) -> Result<Expression, CasError> {
        self.simplifier().simplify(expr)
    }

    /// Substitute the given values, simplify, and reduce to a number when no
    /// free variable is left.
    pub fn evaluate(
        &self,
        expr: &Expression,
        substitutions: &BTreeMap<String, f64>,
    ) -> Result<Evaluated, CasError> {
        let mut ctx = expr.context().clone();
        let mut root = expr.root();
        for (name, value) in substitutions {
            let exact = BigRational::from_float(*value).ok_or(CasError::NonFinite)?;
            let replacement = ctx.rational(exact);
            root = substitute_variable(&mut ctx, root, name, replacement);
        }

        let simplified = self.simplify(&Expression::from_parts(ctx, root))?;
        if let Expr::Number(n) = simplified.context().get(simplified.root()) {
            return n
                .to_f64()
                .filter(|v| v.is_finite())
                .map(Evaluated::Number)
                .ok_or(CasError::NonFinite);
        }
        if simplified.variables().is_empty() {
            let value = eval_f64(
                simplified.context(),
                simplified.root(),
                &HashMap::new(),
                self.options.max_depth,
            )?;
            return Ok(Evaluated::Number(value));
        }
        Ok(Evaluated::Symbolic(simplified))
    }

    pub fn differentiate(&self, expr: &Expression, var: &str) -> Result<Expression, CasError> {
        let mut ctx = expr.context().clone();
        let derivative = differentiate(&mut ctx, expr.root(), var)?;
        let result = self.simplify(&Expression::from_parts(ctx, derivative))?;
        debug!(target: "mathcheck::calculus", function = %expr, var, derivative = %result, "differentiated");
        Ok(result)
    }

    /// Antiderivative without a constant of integration.
    pub fn integrate(&self, expr: &Expression, var: &str) -> Result<Expression, CasError> {
        let (mut ctx, root) = self.simplify(expr)?.into_parts();
        let antiderivative = integrate(&mut ctx, root, var).map_err(|err| {
            debug!(target: "mathcheck::calculus", function = %expr, var, %err, "no antiderivative");
            err
        })?;
        let result = self.simplify(&Expression::from_parts(ctx, antiderivative))?;
        debug!(target: "mathcheck::calculus", function = %expr, var, integral = %result, "integrated");
        Ok(result)
    }
}
