use std::fs;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use thiserror::Error;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use constconf::{convert, ParseOptions, SyntaxError, DEFAULT_MAX_DEPTH};

/// Convert a constant-assignment configuration file to XML.
#[derive(Parser)]
#[command(name = "constconf", about = "Configuration language to XML converter")]
struct Cli {
    /// Input configuration file.
    #[arg(short, long)]
    input: PathBuf,

    /// Output XML file.
    #[arg(short, long)]
    output: PathBuf,

    /// Deepest allowed nesting of arrays and constant expressions.
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Log progress to stderr (RUST_LOG overrides the level).
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

fn main() {
    let cli = Cli::parse();

    if cli.verbose || std::env::var("RUST_LOG").is_ok() {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::new("debug")
        };
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    match run(&cli) {
        Ok(()) => {
            println!(
                "Conversion complete. Result saved to {}",
                cli.output.display()
            );
        }
        Err(CliError::Syntax(e)) => {
            println!("Syntax error: {}", e);
            process::exit(1);
        }
        Err(e) => {
            println!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let input = fs::read_to_string(&cli.input).map_err(|source| CliError::Read {
        path: cli.input.clone(),
        source,
    })?;
    debug!(path = %cli.input.display(), bytes = input.len(), "read input");

    let options = ParseOptions {
        max_depth: cli.max_depth,
    };
    let xml = convert(&input, options)?;

    fs::write(&cli.output, xml).map_err(|source| CliError::Write {
        path: cli.output.clone(),
        source,
    })?;
    info!(path = %cli.output.display(), "wrote output");
    Ok(())
}
