use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod inspect;
mod run;
mod validate;

#[derive(Parser)]
#[command(
    name = "dtc-check",
    about = "Evaluate DTC snapshots and diagnostic responses against YAML test plans"
)]
struct Cli {
    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run every case of one or more plans and write JSON reports
    Run {
        /// Plan files (.yml/.yaml)
        #[arg(required = true)]
        plans: Vec<PathBuf>,

        /// Report output directory
        #[arg(short, long, default_value = "reports")]
        output: PathBuf,
    },

    /// Validate a plan file (schema, semantics, parse)
    Validate {
        /// Plan file to validate
        input: PathBuf,

        /// Suppress individual error output
        #[arg(short, long)]
        quiet: bool,

        /// Print summary count only
        #[arg(short, long)]
        summary: bool,
    },

    /// Classify a single diagnostic response and print the verdict as JSON
    CheckResponse {
        /// Request bytes, e.g. "0x22 0xF1 0x90"
        #[arg(long)]
        request: String,

        /// Received bytes; omit for no response
        #[arg(long, default_value = "")]
        actual: String,

        /// none, positive, negative, ln(N) or explicit bytes
        #[arg(long)]
        expected: String,

        /// Display name (defaults to the request bytes)
        #[arg(long)]
        name: Option<String>,
    },

    /// Print the eight flags of a DTC status byte
    DecodeStatus {
        /// Status value: 0x2F, 0b00101111, 47 or any
        value: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cli.log_level))
        .init();

    match cli.command {
        Command::Run { plans, output } => run::run_plans(&plans, &output),

        Command::Validate {
            input,
            quiet,
            summary,
        } => validate::run_validate(&input, quiet, summary),

        Command::CheckResponse {
            request,
            actual,
            expected,
            name,
        } => inspect::run_check_response(&request, &actual, &expected, name.as_deref()),

        Command::DecodeStatus { value } => inspect::run_decode_status(&value),
    }
}
