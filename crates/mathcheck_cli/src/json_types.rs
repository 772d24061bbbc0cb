//! JSON envelopes printed by every subcommand.

use mathcheck_engine::VerificationOutcome;
use serde::Serialize;

/// Bumped when the envelope shape changes.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Serialize, Debug)]
#[serde(untagged)]
pub enum CommandOutput {
    Single(VerificationOutcome),
    Batch(Vec<VerificationOutcome>),
}

/// A successful run. `ok` is about the request, not the student's answer:
/// a wrong answer is still `ok: true` with `verdict: false`.
#[derive(Serialize, Debug)]
pub struct OutputEnvelope {
    pub schema_version: u32,
    pub ok: bool,
    pub result: CommandOutput,
}

impl OutputEnvelope {
    pub fn new(result: CommandOutput) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            ok: true,
            result,
        }
    }
}

/// A request that never reached the engine.
#[derive(Serialize, Debug)]
pub struct ErrorJsonOutput {
    pub schema_version: u32,
    pub ok: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
}

impl ErrorJsonOutput {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            ok: false,
            error: error.into(),
            input: None,
        }
    }

    pub fn with_input(error: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            input: Some(input.into()),
            ..Self::new(error)
        }
    }
}

pub fn print_pretty_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => {
            eprintln!("JSON serialization error: {}", e);
            println!("{{\"ok\":false,\"error\":\"JSON_SERIALIZATION_FAILED\"}}");
        }
    }
}
