pub(crate) mod bridges;
pub(crate) mod relations;
pub(crate) mod scalene;

use metbridge::{
    load_entries, output_file_path, write_df_to_file, DataFrameFileType, EntryFailure, EntryInput,
};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Resolve the input table and output directory, logging any failure.
pub(crate) fn resolve_paths(input: &Path, output: &Path) -> Option<(PathBuf, PathBuf)> {
    let input_path = match input.canonicalize() {
        Ok(path) => path,
        Err(e) => {
            error!("Failed to retrieve input file: {}", e);
            return None;
        }
    };
    let output_path = match std::path::absolute(output) {
        Ok(path) => path,
        Err(e) => {
            error!("Failed to resolve the output directory: {}", e);
            return None;
        }
    };
    if let Err(e) = std::fs::create_dir_all(&output_path) {
        error!("Failed to create the output directory: {}", e);
        return None;
    }
    Some((input_path, output_path))
}

/// Load all entries, logging entries that had to be rejected.
pub(crate) fn load(
    interactions: &Path,
    proximity: Option<&Path>,
    surface: Option<&Path>,
    anchors: Option<&Path>,
) -> Option<(Vec<EntryInput>, Vec<EntryFailure>)> {
    match load_entries(interactions, proximity, surface, anchors) {
        Ok((entries, rejected)) => {
            for f in &rejected {
                warn!("Rejected entry {}: {}", f.code, f.error);
            }
            info!("Loaded {} entries", entries.len());
            Some((entries, rejected))
        }
        Err(e) => {
            error!("Failed to load input tables: {}", e);
            None
        }
    }
}

/// Write one result table into `output_dir`.
pub(crate) fn save(
    df: PolarsResult<DataFrame>,
    output_dir: &Path,
    name: &str,
    file_type: DataFrameFileType,
) {
    let mut df = match df {
        Ok(df) => df,
        Err(e) => {
            error!("Failed to build table {name}: {}", e);
            return;
        }
    };
    let output_file = output_file_path(output_dir, name, file_type);
    match write_df_to_file(&mut df, &output_file, file_type) {
        Ok(()) => info!("Results saved to {}", output_file.display()),
        Err(e) => error!("Failed to write {}: {}", output_file.display(), e),
    }
}
