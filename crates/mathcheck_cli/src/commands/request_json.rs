//! `request` and `batch`: typed JSON requests in, outcomes out.

use anyhow::{Context, Result};
use clap::Args;
use mathcheck_engine::{VerificationEngine, VerificationRequest};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use tracing::debug;

use crate::json_types::CommandOutput;

#[derive(Args, Debug)]
pub struct RequestArgs {
    /// One request object, e.g. {"kind": "calculation", ...}; read from stdin when absent
    pub json: Option<String>,
}

#[derive(Args, Debug)]
pub struct BatchArgs {
    /// File holding a JSON array of requests; read from stdin when absent
    #[arg(long)]
    pub file: Option<PathBuf>,
}

fn read_stdin() -> Result<String> {
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("Could not read standard input")?;
    Ok(input)
}

pub fn read_request_input(args: &RequestArgs) -> Result<String> {
    match &args.json {
        Some(json) => Ok(json.clone()),
        None => read_stdin(),
    }
}

pub fn read_batch_input(args: &BatchArgs) -> Result<String> {
    match &args.file {
        Some(path) => fs::read_to_string(path).with_context(|| format!("Could not read {}", path.display())),
        None => read_stdin(),
    }
}

pub fn run_request(input: &str, engine: &VerificationEngine) -> Result<CommandOutput> {
    let request: VerificationRequest =
        serde_json::from_str(input).context("Invalid verification request")?;
    Ok(CommandOutput::Single(engine.verify(&request)))
}

pub fn run_batch(input: &str, engine: &VerificationEngine) -> Result<CommandOutput> {
    let requests: Vec<VerificationRequest> =
        serde_json::from_str(input).context("Invalid batch: expected a JSON array of requests")?;
    debug!(target: "mathcheck::cli", count = requests.len(), "batch");
    Ok(CommandOutput::Batch(engine.verify_all(&requests)))
}
