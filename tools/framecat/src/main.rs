mod commands;
mod source;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use commands::{corr::CorrArgs, describe::DescribeArgs, schema::SchemaArgs, show::ShowArgs};
use tracing_subscriber::{EnvFilter, filter::LevelFilter};

#[derive(Parser)]
#[command(name = "framecat", about = "Inspect CSV and JSON-lines files")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print rows as a table
    Show(ShowArgs),
    /// Print the inferred schema tree
    Schema(SchemaArgs),
    /// Print count, mean, stddev, min and max per column
    Describe(DescribeArgs),
    /// Print the Pearson correlation of two numeric columns
    Corr(CorrArgs),
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Show(args) => args.run(),
        Commands::Schema(args) => args.run(),
        Commands::Describe(args) => args.run(),
        Commands::Corr(args) => args.run(),
    }
}
