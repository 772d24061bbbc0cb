//! Direct subcommands, one per verification operation.

use anyhow::{anyhow, Result};
use clap::{Args, Subcommand};
use mathcheck_engine::normalize::parse_assignment;
use mathcheck_engine::{Substitutions, VerificationEngine, VerificationRequest};

use crate::json_types::CommandOutput;

#[derive(Subcommand, Debug)]
pub enum CheckCommand {
    /// Check a claimed solution of an equation
    Equation(EquationArgs),
    /// Check one algebraic step
    Step(StepArgs),
    /// Check an arithmetic result
    Calc(CalcArgs),
    /// Check a derivative
    Derivative(DerivativeArgs),
    /// Check an antiderivative (a trailing "+ C" is optional)
    Integral(IntegralArgs),
    /// Evaluate an expression, optionally substituting values
    Eval(EvalArgs),
}

#[derive(Args, Debug)]
pub struct EquationArgs {
    /// Equation, e.g. "2x + 3 = 11"
    pub equation: String,
    /// Claimed solution, e.g. "x = 4"
    pub claimed_solution: String,
}

#[derive(Args, Debug)]
pub struct StepArgs {
    /// Expression or equation before the step
    pub original: String,
    /// Expression or equation after the step
    pub resulting: String,
    /// What the student says they did (echoed, not checked)
    #[arg(long)]
    pub operation: Option<String>,
}

#[derive(Args, Debug)]
pub struct CalcArgs {
    pub expression: String,
    pub claimed_result: String,
}

#[derive(Args, Debug)]
pub struct DerivativeArgs {
    pub function: String,
    pub claimed_derivative: String,
}

#[derive(Args, Debug)]
pub struct IntegralArgs {
    pub function: String,
    pub claimed_integral: String,
}

#[derive(Args, Debug)]
pub struct EvalArgs {
    pub expression: String,
    /// Substitution "name=value"; repeatable
    #[arg(long = "sub", value_parser = parse_substitution)]
    pub substitutions: Vec<(String, f64)>,
}

fn parse_substitution(text: &str) -> Result<(String, f64), String> {
    parse_assignment(text).map_err(|kind| format!("expected name=number ({})", kind))
}

impl CheckCommand {
    pub fn into_request(self) -> Result<VerificationRequest> {
        Ok(match self {
            CheckCommand::Equation(args) => VerificationRequest::EquationSolution {
                equation: args.equation,
                claimed_solution: args.claimed_solution,
            },
            CheckCommand::Step(args) => VerificationRequest::AlgebraicStep {
                original: args.original,
                resulting: args.resulting,
                operation: args.operation,
            },
            CheckCommand::Calc(args) => VerificationRequest::Calculation {
                expression: args.expression,
                claimed_result: args.claimed_result,
            },
            CheckCommand::Derivative(args) => VerificationRequest::Derivative {
                function: args.function,
                claimed_derivative: args.claimed_derivative,
            },
            CheckCommand::Integral(args) => VerificationRequest::Integral {
                function: args.function,
                claimed_integral: args.claimed_integral,
            },
            CheckCommand::Eval(args) => {
                let mut substitutions = Substitutions::new();
                for (name, value) in args.substitutions {
                    if substitutions.insert(name.clone(), value).is_some() {
                        return Err(anyhow!("Variable {} is substituted more than once", name));
                    }
                }
                VerificationRequest::Evaluate {
                    expression: args.expression,
                    substitutions,
                }
            }
        })
    }
}

/// Run one direct check.
pub fn run(command: CheckCommand, engine: &VerificationEngine) -> Result<CommandOutput> {
    let request = command.into_request()?;
    Ok(CommandOutput::Single(engine.verify(&request)))
}
