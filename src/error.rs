use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors raised while extracting, classifying or measuring bridges.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Settings that make the whole run meaningless, e.g. a bridge order below 2
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A (chain, bridge) pair that matched none of the relationship rules
    #[error("Could not classify chain {chain:?} against bridge {bridge:?}")]
    AmbiguousClassification {
        /// Labels of the chain members
        chain: Vec<String>,
        /// Labels of the bridge aromatics
        bridge: Vec<String>,
    },

    /// A residue label that could not be parsed or has the wrong residue type
    #[error("Invalid residue: {0}")]
    InvalidResidue(String),

    /// Non-finite or otherwise unusable coordinates in a structure entry
    #[error("Malformed coordinates in entry {code}: {detail}")]
    MalformedCoordinates {
        /// Structure entry identifier
        code: String,
        /// What was wrong with the coordinates
        detail: String,
    },

    /// A required column is absent from an input table
    #[error("Missing column '{column}' in {table} table")]
    MissingColumn {
        /// Name of the input table
        table: &'static str,
        /// Name of the missing column
        column: &'static str,
    },

    /// Failure while reading or building a data frame
    #[error("Table error: {source}")]
    Polars {
        /// Underlying polars error
        #[from]
        source: PolarsError,
    },

    /// Failure while touching the file system
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error
        #[from]
        source: std::io::Error,
    },
}
