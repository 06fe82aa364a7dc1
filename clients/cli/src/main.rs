//! Hashchain CLI
//!
//! Create, extend, verify, inspect and convert exported hash chain files.

use clap::{Parser, Subcommand};
use hashchain_core::SerializerRegistry;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

mod commands;
mod config;

use config::CliConfig;

/// Hashchain - append-only, tamper-evident ledgers
#[derive(Parser)]
#[command(name = "hashchain")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Chain format (json or xml); inferred from the file extension if omitted
    #[arg(short, long, global = true)]
    format: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new chain file
    New {
        /// Output file
        file: PathBuf,
        /// Payloads to append after the genesis link
        payloads: Vec<String>,
    },

    /// Append payloads to an existing chain file
    Append {
        /// Chain file
        file: PathBuf,
        /// Payloads to append
        #[arg(required = true)]
        payloads: Vec<String>,
    },

    /// Validate a chain file
    Verify {
        /// Chain file
        file: PathBuf,
    },

    /// Show the links of a chain file
    Show {
        /// Chain file
        file: PathBuf,
        /// Decode JSON payloads
        #[arg(short, long)]
        decode: bool,
    },

    /// Convert a chain file to another format
    Convert {
        /// Input file
        input: PathBuf,
        /// Output file
        output: PathBuf,
        /// Output format (json or xml); inferred from the output extension if omitted
        #[arg(long)]
        to: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    // Load config
    let config_path = cli.config.unwrap_or_else(CliConfig::default_path);
    let config = CliConfig::load_or_default(&config_path)?;
    let registry = SerializerRegistry::from_config(&config.serializer_config())?;
    let format = cli.format.as_deref();

    match cli.command {
        Commands::New { file, payloads } => {
            let format = commands::resolve_format(format, &file, &config);
            let chain = commands::create(&file, &format, &payloads, &registry, &config)?;
            println!("{}", chain.tail().hash());
        }
        Commands::Append { file, payloads } => {
            let format = commands::resolve_format(format, &file, &config);
            for hash in commands::append(&file, &format, &payloads, &registry)? {
                println!("{}", hash);
            }
        }
        Commands::Verify { file } => {
            let format = commands::resolve_format(format, &file, &config);
            let chain = commands::load_chain(&file, &registry, &format)?;
            info!("Chain {} is valid ({} links)", chain.chain_id(), chain.len());
            println!("OK {}", chain.chain_id());
        }
        Commands::Show { file, decode } => {
            let format = commands::resolve_format(format, &file, &config);
            let chain = commands::load_chain(&file, &registry, &format)?;
            print!("{}", commands::render(&chain, decode));
        }
        Commands::Convert { input, output, to } => {
            let input_format = commands::resolve_format(format, &input, &config);
            let output_format = commands::resolve_format(to.as_deref(), &output, &config);
            commands::convert(&input, &input_format, &output, &output_format, &registry)?;
        }
    }

    Ok(())
}
