mod cli;

use clap::{Parser, Subcommand};
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity of the program:
    /// -v for info, -vv for debug, and -vvv for trace
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract and count Met-aromatic bridges
    Bridges(cli::bridges::Args),
    /// Compare bridges against chains of adjacent TYR/TRP residues
    Relations(cli::relations::Args),
    /// Measure methionine / ligand / surface triangles for each bridge
    Scalene(cli::scalene::Args),
}

fn setup_logging(verbosity: u8) {
    let level_filter = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    tracing_subscriber::registry()
        .with(level_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();
}

fn main() {
    let app = Cli::parse();
    setup_logging(app.verbose);

    match &app.command {
        Commands::Bridges(args) => cli::bridges::run(args),
        Commands::Relations(args) => cli::relations::run(args),
        Commands::Scalene(args) => cli::scalene::run(args),
    }
}
