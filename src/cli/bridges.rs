use super::{load, resolve_paths, save};
use metbridge::{
    analyze_batch, bridges_to_df, counts_to_df, grouped_counts_to_df, multiplicity_to_df,
    run_with_threads, DataFrameFileType, Settings,
};
use clap::Parser;
use polars::prelude::*;
use std::path::PathBuf;
use tracing::{debug, error, info, trace};

#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub(crate) struct Args {
    /// Path to the interaction table (csv, parquet, json or ndjson)
    #[arg(short, long)]
    input: PathBuf,

    /// Output directory
    #[arg(short, long)]
    output: PathBuf,

    /// Name of the output file, also used as prefix for the count tables
    #[arg(short = 'f', long = "filename", default_value_t = String::from("bridges"))]
    filename: String,

    /// Output file type
    #[arg(short = 't', long, default_value_t = DataFrameFileType::Csv)]
    output_format: DataFrameFileType,

    /// Number of aromatic residues per bridge
    #[arg(short = 'n', long, default_value_t = 2)]
    order: usize,

    /// Count bridges separately for each top-level EC class
    #[arg(long = "by-ec", default_value_t = false)]
    by_ec: bool,

    /// Number of threads to use for parallel processing (0 for all cores)
    #[arg(short = 'j', long = "num-threads", default_value_t = 0)]
    num_threads: usize,
}

pub(crate) fn run(args: &Args) {
    trace!("{args:?}");

    let Some((input_path, output_path)) = resolve_paths(&args.input, &args.output) else {
        return;
    };
    let settings = Settings {
        order: args.order,
        group_by_ec: args.by_ec,
        ..Default::default()
    };
    if let Err(e) = settings.validate() {
        error!("{e}");
        return;
    }

    let Some((entries, rejected)) = load(&input_path, None, None, None) else {
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

    let bridges = report.bridges();
    info!(
        "Found {} {}-bridge(s) in {} entries, {} entries failed",
        bridges.len(),
        settings.order,
        report.entries.len(),
        report.failures.len() + rejected.len()
    );

    // Log the most common bridge types
    if let Ok(df_bridges) = bridges_to_df(&bridges) {
        let summary = df_bridges
            .lazy()
            .group_by([col("label")])
            .agg([len().alias("count")])
            .sort(
                ["count"],
                SortMultipleOptions::default().with_order_descending(true),
            )
            .collect();
        match summary {
            Ok(df) => info!("Bridge types\n{df}"),
            Err(e) => debug!("Could not summarize bridge types: {e}"),
        }
    }

    save(
        bridges_to_df(&bridges),
        &output_path,
        &args.filename,
        args.output_format,
    );
    let df_counts = if settings.group_by_ec {
        grouped_counts_to_df(&report.grouped_counts, settings.order)
    } else {
        counts_to_df(&report.counts, settings.order)
    };
    save(
        df_counts,
        &output_path,
        &format!("{}_counts", args.filename),
        args.output_format,
    );
    save(
        multiplicity_to_df(&report.multiplicity),
        &output_path,
        &format!("{}_multiplicity", args.filename),
        args.output_format,
    );
}
