use super::{load, resolve_paths, save};
use metbridge::{analyze_batch, relationships_to_df, run_with_threads, DataFrameFileType, Settings};
use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, error, info, trace, warn};

#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub(crate) struct Args {
    /// Path to the interaction table (csv, parquet, json or ndjson)
    #[arg(short, long)]
    input: PathBuf,

    /// Path to the table of adjacent residue pairs (code, res_a, res_b)
    #[arg(short, long)]
    chains: PathBuf,

    /// Output directory
    #[arg(short, long)]
    output: PathBuf,

    /// Name of the output file
    #[arg(short = 'f', long = "filename", default_value_t = String::from("relations"))]
    filename: String,

    /// Output file type
    #[arg(short = 't', long, default_value_t = DataFrameFileType::Csv)]
    output_format: DataFrameFileType,

    /// Number of aromatic residues per bridge
    #[arg(short = 'n', long, default_value_t = 2)]
    order: usize,

    /// Number of threads to use for parallel processing (0 for all cores)
    #[arg(short = 'j', long = "num-threads", default_value_t = 0)]
    num_threads: usize,
}

pub(crate) fn run(args: &Args) {
    trace!("{args:?}");

    let Some((input_path, output_path)) = resolve_paths(&args.input, &args.output) else {
        return;
    };
    let chains_path = match args.chains.canonicalize() {
        Ok(path) => path,
        Err(e) => {
            error!("Failed to retrieve chain table: {}", e);
            return;
        }
    };
    let settings = Settings {
        order: args.order,
        ..Default::default()
    };

    let Some((entries, _)) = load(&input_path, Some(&chains_path), None, None) else {
        return;
    };
    let report = match run_with_threads(args.num_threads, || {
        debug!("Using {} thread(s)", rayon::current_num_threads());
        analyze_batch(entries, &settings)
    }) {
        Ok(Ok(report)) => report,
        Ok(Err(e)) | Err(e) => {
            error!("{e}");
            return;
        }
    };

    let summary = &report.relationships;
    if summary.entries_compared == 0 {
        warn!("No entry has both chains and bridges to compare");
    }
    info!(
        "Compared {} entries: {}",
        summary.entries_compared,
        summary
            .counts
            .iter()
            .map(|(r, n)| format!("{r}={n}"))
            .collect::<Vec<_>>()
            .join(", ")
    );

    save(
        relationships_to_df(&report.relationship_records()),
        &output_path,
        &args.filename,
        args.output_format,
    );
}
