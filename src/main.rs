use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::{ValidateArgs, validate_command};

#[derive(Parser)]
#[command(
    name = "file-validator",
    about = "Validates JSON, YAML, CSV and container metadata against a JSON Schema",
    version,
    author,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output (use -vv for debug output)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a file or container metadata against a schema
    Validate(ValidateArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbose flag
    init_logging(cli.verbose);

    match cli.command {
        Commands::Validate(args) => validate_command(args),
    }
}

fn init_logging(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let filter = match verbose {
        0 => EnvFilter::new("file_validator=warn"), // Default: warnings and errors only
        1 => EnvFilter::new("file_validator=info"), // -v: info messages
        _ => EnvFilter::new("file_validator=debug"), // -vv or more: full debug
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}
