#![forbid(unsafe_code)]
#![deny(unused_must_use, dead_code, missing_debug_implementations)]
#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro
)]

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

pub mod cli;
mod common;
pub mod config;
pub mod source;
pub mod writer;

/// Crates whose records a plain `SOCG_LOG` level applies to.
const LOG_TARGETS: [&str; 2] = ["socg_core", "socg_cli"];

#[derive(Parser)]
#[command(
    name = "socg",
    version,
    about = "\x1b[33msocg\x1b[0m compiles OpenAPI documents into typed TypeScript request modules"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Download a document and print or save it as JSON
    Fetch(cli::fetch::FetchArgs),
    /// Compile only the model module
    Model(cli::model::ModelArgs),
    /// Compile the model module and one module per tag
    Generate(cli::generate::GenerateArgs),
}

/// Run the command line with `args` (program name first) and return the exit
/// code.
pub fn run_cli(args: Vec<String>) -> i32 {
    init_tracing();

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("Failed to create tokio runtime: {err}");
            return 1;
        }
    };

    runtime.block_on(run_cli_async(args))
}

async fn run_cli_async(args: Vec<String>) -> i32 {
    match Cli::try_parse_from(args) {
        Ok(cli) => match cli.command {
            Some(Commands::Fetch(args)) => cli::fetch::run(args).await,
            Some(Commands::Model(args)) => cli::model::run(args).await,
            Some(Commands::Generate(args)) => cli::generate::run(args).await,
            None => {
                let mut cmd = Cli::command();
                let _ = cmd.print_help();
                println!();
                0
            }
        },
        Err(e) => {
            let code = e.exit_code();
            let _ = e.print();
            code
        }
    }
}

/// Install the stderr subscriber.
///
/// SOCG_LOG takes a plain level ("trace" to "error"), applied to the socg
/// crates, or a full filter spec like "socg_core=debug,reqwest=warn".
pub fn init_tracing() {
    let filter = match std::env::var("SOCG_LOG") {
        Ok(level) if is_plain_level(&level) => targets_at(&level),
        Ok(spec) => spec,
        Err(_) => targets_at("info"),
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_filter(EnvFilter::new(filter));

    if tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        eprintln!("Warning: tracing subscriber already initialized");
    }
}

fn targets_at(level: &str) -> String {
    LOG_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

fn is_plain_level(s: &str) -> bool {
    matches!(
        s.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    )
}
