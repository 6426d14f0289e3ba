#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

//! # Metbridge Library
//!
//! This library extracts Met-aromatic bridges from per-structure interaction
//! records, classifies them against chains of adjacent TYR/TRP residues,
//! aggregates them into pair-type count tables, and measures the scalene
//! triangle between a bridging methionine, a metal or ligand atom and the
//! protein surface.
//!
//! Tabular results are returned as Polars DataFrames, which can be written to
//! CSV, Parquet or JSON with [`write_df_to_file`].

pub mod bridges;
pub mod chains;
pub mod counts;
mod error;
pub mod pipeline;
pub mod relations;
pub mod residues;
pub mod scalene;
pub mod settings;
mod utils;

// Re-export key public types
pub use bridges::{bridges_to_df, extract_bridges, Bridge, InteractionRecord};
pub use chains::{build_chains, ChainComponent};
pub use counts::{
    count_bridges, count_bridges_by_ec, counts_to_df, grouped_counts_to_df, multiplicity_to_df,
    BridgeCountTable, GroupedCounts,
};
pub use error::BridgeError;
pub use pipeline::{
    analyze_batch, analyze_entry, BatchReport, EntryFailure, EntryInput, EntryReport,
};
pub use relations::{classify, compare_networks, relationships_to_df, Relationship};
pub use residues::{ResidueKind, ResidueNode};
pub use scalene::{nearest_surface, scalene_to_df, SurfaceIndex, Triangle};
pub use settings::Settings;
pub use utils::{
    entries_from_tables, load_entries, output_file_path, read_table, run_with_threads,
    write_df_to_file, DataFrameFileType,
};
