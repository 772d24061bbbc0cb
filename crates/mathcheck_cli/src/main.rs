//! mathcheck: verify student math answers from the command line.
//!
//! Usage:
//!   mathcheck calc "8 * 5" 40
//!   mathcheck equation "2x + 3 = 11" "x = 4"
//!   mathcheck integral "2x + 3" "x^2 + 3x + C"
//!   mathcheck eval "x^2 + 5x" --sub x=2
//!   echo '{"kind": "derivative", ...}' | mathcheck request

mod commands;
mod json_types;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::check::CheckCommand;
use commands::request_json::{BatchArgs, RequestArgs};
use json_types::{print_pretty_json, CommandOutput, ErrorJsonOutput, OutputEnvelope};

#[derive(Parser, Debug)]
#[command(name = "mathcheck")]
#[command(about = "Check equation solutions, algebra steps, calculations, derivatives and integrals", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Engine config file (TOML); defaults apply when the file is missing
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(flatten)]
    Check(CheckCommand),

    /// Verify one JSON request
    Request(RequestArgs),

    /// Verify a JSON array of requests
    Batch(BatchArgs),

    /// Print the effective engine configuration as TOML
    Config,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("mathcheck=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn show_config(path: Option<&Path>) -> ExitCode {
    match commands::load_config(path).and_then(|config| commands::config::render(&config)) {
        Ok(toml) => {
            print!("{}", toml);
            ExitCode::SUCCESS
        }
        Err(e) => {
            print_pretty_json(&ErrorJsonOutput::new(format!("{:#}", e)));
            ExitCode::FAILURE
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.config.as_deref();
    // raw JSON of `request`/`batch`, echoed back on error
    let mut input: Option<String> = None;
    let result: Result<CommandOutput> = match cli.command {
        Commands::Config => return show_config(config),
        Commands::Check(command) => {
            commands::load_engine(config).and_then(|engine| commands::check::run(command, &engine))
        }
        Commands::Request(args) => commands::request_json::read_request_input(&args).and_then(|json| {
            let json: &str = input.insert(json);
            let engine = commands::load_engine(config)?;
            commands::request_json::run_request(json, &engine)
        }),
        Commands::Batch(args) => commands::request_json::read_batch_input(&args).and_then(|json| {
            let json: &str = input.insert(json);
            let engine = commands::load_engine(config)?;
            commands::request_json::run_batch(json, &engine)
        }),
    };

    match result {
        Ok(output) => {
            print_pretty_json(&OutputEnvelope::new(output));
            ExitCode::SUCCESS
        }
        Err(e) => {
            let message = format!("{:#}", e);
            let error = match input {
                Some(input) => ErrorJsonOutput::with_input(message, input),
                None => ErrorJsonOutput::new(message),
            };
            print_pretty_json(&error);
            ExitCode::FAILURE
        }
    }
}
