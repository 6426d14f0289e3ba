use crate::bridges::InteractionRecord;
use crate::error::BridgeError;
use crate::pipeline::{EntryFailure, EntryInput};
use crate::residues::ResidueNode;
use crate::scalene::{LigandAnchor, SurfaceAtom};

use nalgebra as na;
use polars::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Run `f` inside a dedicated rayon pool.
///
/// `num_threads` of 0 means use all available cores.
pub fn run_with_threads<F, R>(num_threads: usize, f: F) -> Result<R, BridgeError>
where
    F: FnOnce() -> R + Send,
    R: Send,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()
        .map_err(|e| BridgeError::InvalidConfiguration(e.to_string()))?;
    Ok(pool.install(f))
}

/// Read a table from disk, picking the reader from the file extension.
///
/// CSV columns are all read as text, so codes such as `2000` or `1e10` keep
/// their spelling. Numeric fields are cast when the entries are assembled.
pub fn read_table(path: &Path) -> Result<DataFrame, BridgeError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    let df = match extension.as_str() {
        "csv" => CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish()?,
        "parquet" => ParquetReader::new(std::fs::File::open(path)?).finish()?,
        "json" => JsonReader::new(std::fs::File::open(path)?).finish()?,
        "ndjson" | "jsonl" => JsonLineReader::new(std::fs::File::open(path)?).finish()?,
        _ => {
            return Err(BridgeError::InvalidConfiguration(format!(
                "Unsupported table format: {}",
                path.display()
            )))
        }
    };
    debug!("Read {} row(s) from {}", df.height(), path.display());
    Ok(df)
}

fn get_column<'a>(
    df: &'a DataFrame,
    table: &'static str,
    column: &'static str,
) -> Result<&'a Column, BridgeError> {
    df.column(column)
        .map_err(|_| BridgeError::MissingColumn { table, column })
}

fn str_values(
    df: &DataFrame,
    table: &'static str,
    column: &'static str,
) -> Result<Vec<Option<String>>, BridgeError> {
    let values = get_column(df, table, column)?.cast(&DataType::String)?;
    Ok(values
        .str()?
        .into_iter()
        .map(|v| v.map(|s| s.trim().to_string()))
        .collect())
}

fn i64_values(
    df: &DataFrame,
    table: &'static str,
    column: &'static str,
) -> Result<Vec<Option<i64>>, BridgeError> {
    let values = get_column(df, table, column)?.cast(&DataType::Int64)?;
    Ok(values.i64()?.into_iter().collect())
}

/// Nulls become NaN, which is caught later as malformed coordinates.
fn f64_values(
    df: &DataFrame,
    table: &'static str,
    column: &'static str,
) -> Result<Vec<f64>, BridgeError> {
    let values = get_column(df, table, column)?.cast(&DataType::Float64)?;
    Ok(values
        .f64()?
        .into_iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect())
}

fn points(df: &DataFrame, table: &'static str) -> Result<Vec<na::Point3<f64>>, BridgeError> {
    let x = f64_values(df, table, "x")?;
    let y = f64_values(df, table, "y")?;
    let z = f64_values(df, table, "z")?;
    Ok(x.into_iter()
        .zip(y)
        .zip(z)
        .map(|((x, y), z)| na::Point3::new(x, y, z))
        .collect())
}

/// Collects per-entry inputs and remembers which entries had unusable rows.
#[derive(Default)]
struct EntryCollector {
    entries: BTreeMap<String, EntryInput>,
    rejected: BTreeMap<String, BridgeError>,
}

impl EntryCollector {
    fn entry(&mut self, code: &str) -> &mut EntryInput {
        self.entries
            .entry(code.to_string())
            .or_insert_with(|| EntryInput::new(code))
    }

    fn reject(&mut self, code: &str, error: BridgeError) {
        self.rejected.entry(code.to_string()).or_insert(error);
    }

    fn add_interactions(&mut self, df: &DataFrame) -> Result<(), BridgeError> {
        const TABLE: &str = "interactions";
        let codes = str_values(df, TABLE, "code")?;
        let aro = str_values(df, TABLE, "aro")?;
        let arores = i64_values(df, TABLE, "arores")?;
        let met = str_values(df, TABLE, "met")?;
        let metres = i64_values(df, TABLE, "metres")?;
        let norm = f64_values(df, TABLE, "norm")?;
        let met_theta = f64_values(df, TABLE, "met_theta")?;
        let met_phi = f64_values(df, TABLE, "met_phi")?;
        let ec = match df.column("ec") {
            Ok(_) => str_values(df, TABLE, "ec")?,
            Err(_) => vec![None; df.height()],
        };
        let chain = match df.column("chain") {
            Ok(_) => str_values(df, TABLE, "chain")?,
            Err(_) => vec![None; df.height()],
        };

        for i in 0..df.height() {
            let Some(code) = codes[i].as_deref() else {
                warn!("Skipping interaction row {i} without an entry code");
                continue;
            };
            let chain = chain[i].as_deref().unwrap_or("");
            let nodes = match (&aro[i], arores[i], &met[i], metres[i]) {
                (Some(aro), Some(arores), Some(met), Some(metres)) => {
                    ResidueNode::from_parts(aro, arores, chain)
                        .and_then(|a| Ok((a, ResidueNode::from_parts(met, metres, chain)?)))
                }
                _ => Err(BridgeError::InvalidResidue(format!(
                    "incomplete residue fields in interaction row {i}"
                ))),
            };
            let (aromatic, methionine) = match nodes {
                Ok(nodes) => nodes,
                Err(e) => {
                    self.reject(code, e);
                    continue;
                }
            };

            let ec = ec[i].clone().filter(|s| !s.is_empty());
            let entry = self.entry(code);
            if entry.ec.is_none() {
                entry.ec = ec.clone();
            }
            entry.interactions.push(InteractionRecord {
                code: code.to_string(),
                ec,
                aromatic,
                methionine,
                norm: norm[i],
                met_theta: met_theta[i],
                met_phi: met_phi[i],
            });
        }
        Ok(())
    }

    fn add_proximity(&mut self, df: &DataFrame) -> Result<(), BridgeError> {
        const TABLE: &str = "proximity";
        let codes = str_values(df, TABLE, "code")?;
        let res_a = str_values(df, TABLE, "res_a")?;
        let res_b = str_values(df, TABLE, "res_b")?;
        for ((code, a), b) in codes.into_iter().zip(res_a).zip(res_b) {
            if let (Some(code), Some(a), Some(b)) = (code, a, b) {
                self.entry(&code).proximity.push((a, b));
            }
        }
        Ok(())
    }

    fn add_surface(&mut self, df: &DataFrame) -> Result<(), BridgeError> {
        const TABLE: &str = "surface";
        let codes = str_values(df, TABLE, "code")?;
        let chain = str_values(df, TABLE, "chain")?;
        let resi = i64_values(df, TABLE, "resi")?;
        let atomn = str_values(df, TABLE, "atomn")?;
        let positions = points(df, TABLE)?;

        for (i, position) in positions.into_iter().enumerate() {
            let Some(code) = codes[i].as_deref() else {
                warn!("Skipping surface row {i} without an entry code");
                continue;
            };
            let Some(resi) = resi[i] else {
                warn!("Surface row {i} of {code} has no residue number");
                self.reject(
                    code,
                    BridgeError::InvalidResidue(format!("missing residue number in surface row {i}")),
                );
                continue;
            };
            let atom = SurfaceAtom {
                chain: chain[i].clone().unwrap_or_default(),
                resi,
                atomn: atomn[i].clone().unwrap_or_default(),
                position,
            };
            self.entry(code).surface.push(atom);
        }
        Ok(())
    }

    fn add_anchors(&mut self, df: &DataFrame) -> Result<(), BridgeError> {
        const TABLE: &str = "anchors";
        let codes = str_values(df, TABLE, "code")?;
        let kind = str_values(df, TABLE, "kind")?;
        let label = str_values(df, TABLE, "label")?;
        let element = str_values(df, TABLE, "element")?;
        let positions = points(df, TABLE)?;

        for (i, position) in positions.into_iter().enumerate() {
            let Some(code) = codes[i].as_deref() else {
                continue;
            };
            let label = label[i].clone().unwrap_or_default();
            match kind[i].as_deref().map(|k| k.to_uppercase()).as_deref() {
                Some("SD") => match label.parse::<ResidueNode>() {
                    Ok(met) => {
                        self.entry(code).sulfurs.insert(met, position);
                    }
                    Err(e) => self.reject(code, e),
                },
                Some("MT") => {
                    let anchor = LigandAnchor {
                        label,
                        element: element[i].clone().unwrap_or_default(),
                        position,
                    };
                    self.entry(code).ligands.push(anchor);
                }
                other => warn!("Skipping anchor row {i} of {code} with kind {other:?}"),
            }
        }
        Ok(())
    }

    fn finish(mut self) -> (Vec<EntryInput>, Vec<EntryFailure>) {
        let failures = self
            .rejected
            .into_iter()
            .map(|(code, error)| {
                self.entries.remove(&code);
                EntryFailure { code, error }
            })
            .collect();
        (self.entries.into_values().collect(), failures)
    }
}

/// Assemble per-entry inputs from the host tables.
///
/// Only the interaction table is required. Entries are returned sorted by
/// code. An entry with an unparseable residue is left out and reported as a
/// failure instead, while a missing column fails the whole load.
pub fn entries_from_tables(
    interactions: &DataFrame,
    proximity: Option<&DataFrame>,
    surface: Option<&DataFrame>,
    anchors: Option<&DataFrame>,
) -> Result<(Vec<EntryInput>, Vec<EntryFailure>), BridgeError> {
    let mut collector = EntryCollector::default();
    collector.add_interactions(interactions)?;
    if let Some(df) = proximity {
        collector.add_proximity(df)?;
    }
    if let Some(df) = surface {
        collector.add_surface(df)?;
    }
    if let Some(df) = anchors {
        collector.add_anchors(df)?;
    }
    Ok(collector.finish())
}

/// Read the host tables from disk and assemble per-entry inputs.
pub fn load_entries(
    interactions: &Path,
    proximity: Option<&Path>,
    surface: Option<&Path>,
    anchors: Option<&Path>,
) -> Result<(Vec<EntryInput>, Vec<EntryFailure>), BridgeError> {
    let interactions = read_table(interactions)?;
    let proximity = proximity.map(read_table).transpose()?;
    let surface = surface.map(read_table).transpose()?;
    let anchors = anchors.map(read_table).transpose()?;
    entries_from_tables(
        &interactions,
        proximity.as_ref(),
        surface.as_ref(),
        anchors.as_ref(),
    )
}

/// Path of a result table named `name` inside `output_dir`.
///
/// The format suffix is appended, so dots inside `name` are kept.
pub fn output_file_path(output_dir: &Path, name: &str, file_type: DataFrameFileType) -> PathBuf {
    output_dir.join(format!("{name}.{file_type}"))
}

/// Write a DataFrame to `file_path` in the given format.
pub fn write_df_to_file(
    df: &mut DataFrame,
    file_path: &Path,
    file_type: DataFrameFileType,
) -> Result<(), BridgeError> {
    let mut file = std::fs::File::create(file_path)?;
    match file_type {
        DataFrameFileType::Csv => {
            CsvWriter::new(&mut file).finish(df)?;
        }
        DataFrameFileType::Parquet => {
            ParquetWriter::new(&mut file).finish(df)?;
        }
        DataFrameFileType::Json => {
            JsonWriter::new(&mut file)
                .with_json_format(JsonFormat::Json)
                .finish(df)?;
        }
        DataFrameFileType::NDJson => {
            JsonWriter::new(&mut file)
                .with_json_format(JsonFormat::JsonLines)
                .finish(df)?;
        }
    }
    Ok(())
}

/// File format for writing DataFrames.
#[derive(clap::ValueEnum, Clone, Debug, Copy)]
pub enum DataFrameFileType {
    /// Comma-separated values
    Csv,
    /// Parquet columnar storage
    Parquet,
    /// Standard JSON
    Json,
    /// Newline-delimited JSON
    NDJson,
}

impl std::fmt::Display for DataFrameFileType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            DataFrameFileType::Csv => write!(f, "csv"),
            DataFrameFileType::Parquet => write!(f, "parquet"),
            DataFrameFileType::Json => write!(f, "json"),
            DataFrameFileType::NDJson => write!(f, "ndjson"),
        }
    }
}
