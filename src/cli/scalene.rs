use super::{load, resolve_paths, save};
use metbridge::{analyze_batch, run_with_threads, scalene_to_df, DataFrameFileType, Settings};
use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, error, info, trace};

#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub(crate) struct Args {
    /// Path to the interaction table (csv, parquet, json or ndjson)
    #[arg(short, long)]
    input: PathBuf,

    /// Path to the table of solvent-exposed atoms
    #[arg(short, long)]
    surface: PathBuf,

    /// Path to the table of SD and metal/ligand anchor coordinates
    #[arg(short, long)]
    anchors: PathBuf,

    /// Output directory
    #[arg(short, long)]
    output: PathBuf,

    /// Name of the output file
    #[arg(short = 'f', long = "filename", default_value_t = String::from("scalene"))]
    filename: String,

    /// Output file type
    #[arg(short = 't', long, default_value_t = DataFrameFileType::Csv)]
    output_format: DataFrameFileType,

    /// Number of aromatic residues per bridge
    #[arg(short = 'n', long, default_value_t = 2)]
    order: usize,

    /// Only use transition metals (Sc to Zn) as anchors
    #[arg(long = "metals-only", default_value_t = false)]
    metals_only: bool,

    /// Number of threads to use for parallel processing (0 for all cores)
    #[arg(short = 'j', long = "num-threads", default_value_t = 0)]
    num_threads: usize,
}

pub(crate) fn run(args: &Args) {
    trace!("{args:?}");

    let Some((input_path, output_path)) = resolve_paths(&args.input, &args.output) else {
        return;
    };
    let (surface_path, anchors_path) =
        match (args.surface.canonicalize(), args.anchors.canonicalize()) {
            (Ok(s), Ok(a)) => (s, a),
            (Err(e), _) | (_, Err(e)) => {
                error!("Failed to retrieve surface or anchor table: {}", e);
                return;
            }
        };
    let settings = Settings {
        order: args.order,
        metals_only: args.metals_only,
        ..Default::default()
    };

    let Some((entries, _)) = load(
        &input_path,
        None,
        Some(&surface_path),
        Some(&anchors_path),
    ) else {
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

    let records = report.scalene_records();
    info!(
        "Measured {} triangle(s) over {} entries",
        records.len(),
        report.entries.len()
    );

    save(
        scalene_to_df(&records),
        &output_path,
        &args.filename,
        args.output_format,
    );
}
