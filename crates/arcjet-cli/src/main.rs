mod commands;
mod progress;
mod summary;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "arcjet", about = "Arcjet test video analysis tool")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show frame source dimensions and cached video metadata
    Info(commands::info::InfoArgs),
    /// Segment a frame range into a records file
    Process(commands::process::ProcessArgs),
    /// Reduce a records file to a calibrated CSV table
    Reduce(commands::reduce::ReduceArgs),
    /// Fit every reduced metric over a time window
    Fit(commands::fit::FitArgs),
    /// Print or save a default analysis config
    Config(commands::config::ConfigArgs),
    /// Run the full analysis from a config file
    Run(commands::run::RunArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match &cli.command {
        Commands::Info(args) => commands::info::run(args),
        Commands::Process(args) => commands::process::run(args),
        Commands::Reduce(args) => commands::reduce::run(args),
        Commands::Fit(args) => commands::fit::run(args),
        Commands::Config(args) => commands::config::run(args),
        Commands::Run(args) => commands::run::run(args),
    }
}
