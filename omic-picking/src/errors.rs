use thiserror::Error;

use omic_core::ReferenceError;

use crate::config::PickingConfigError;

/// Error type for variant picking.
#[derive(Error, Debug)]
pub enum PickingError {
    /// A data line could not be parsed. Fatal for the whole merge: a
    /// partially read source would silently bias support counts.
    #[error("Malformed record in source '{source_name}' at line {line_number} ({reason}): {line}")]
    MalformedRecord {
        source_name: String,
        line_number: usize,
        line: String,
        reason: String,
    },

    /// A retained variant sits on a chromosome the reference doesn't list.
    #[error("Chromosome '{chrom}' of retained variant {key} is not in the reference contig index")]
    UnknownContig { chrom: String, key: String },

    #[error("Can't open source '{source_name}': {reason}")]
    SourceOpen { source_name: String, reason: String },

    #[error("Failed reading source '{source_name}' after line {line_number}: {reason}")]
    SourceRead {
        source_name: String,
        line_number: usize,
        reason: String,
    },

    #[error("Source name '{0}' was given more than once")]
    DuplicateSource(String),

    #[error("Failed to write merged output {path}: {reason}")]
    OutputWrite { path: String, reason: String },

    #[error("Can't build a pool of {threads} reader threads: {reason}")]
    ThreadPool { threads: usize, reason: String },

    #[error(transparent)]
    Config(#[from] PickingConfigError),

    #[error(transparent)]
    Reference(#[from] ReferenceError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type alias for picking operations.
pub type Result<T> = std::result::Result<T, PickingError>;
