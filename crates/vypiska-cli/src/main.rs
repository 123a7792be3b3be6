mod commands;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use vypiska_core::extraction::lines::DEFAULT_Y_GRANULARITY;
use vypiska_core::ledger::DEFAULT_DEDUP_PREFIX_CHARS;

#[derive(Parser)]
#[command(
    name = "vypiska",
    version,
    about = "Extract transactions from bank statement PDFs"
)]
struct Cli {
    /// Log parsing decisions (-v debug, -vv also every parsed line)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse one or more statement PDFs into a single ledger
    Parse {
        /// Paths to statement PDF files
        #[arg(required = true)]
        input_files: Vec<PathBuf>,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Write the ledger as a CSV export to this file
        #[arg(short = 'E', long = "export", value_name = "FILE")]
        export: Option<PathBuf>,

        /// Vertical grid size for grouping text into lines
        #[arg(long, default_value_t = DEFAULT_Y_GRANULARITY)]
        y_granularity: f64,

        /// Description characters compared when removing duplicates
        #[arg(long, default_value_t = DEFAULT_DEDUP_PREFIX_CHARS)]
        dedup_prefix: usize,
    },
    /// Print the text lines reconstructed from a PDF, page by page
    Lines {
        /// Path to a statement PDF file
        input_file: PathBuf,

        /// Vertical grid size for grouping text into lines
        #[arg(long, default_value_t = DEFAULT_Y_GRANULARITY)]
        y_granularity: f64,
    },
}

/// Log level used when `RUST_LOG` is unset: `warn`, or `debug` with `-v`.
fn default_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    }
}

fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Parse {
            input_files,
            output,
            export,
            y_granularity,
            dedup_prefix,
        } => commands::parse::run(input_files, &output, export, y_granularity, dedup_prefix),
        Commands::Lines {
            input_file,
            y_granularity,
        } => commands::lines::run(input_file, y_granularity),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
