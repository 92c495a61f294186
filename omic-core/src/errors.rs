use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReferenceError {
    #[error("Can't read reference file: {0}")]
    FileReadError(String),

    #[error("Sequence data found before any FASTA header in {0}")]
    MissingHeader(String),

    #[error("Malformed fai line {line_number} in {path}: {line}")]
    MalformedFaiLine {
        path: String,
        line_number: usize,
        line: String,
    },

    #[error("Contig {0} is listed more than once in the reference")]
    DuplicateContig(String),

    #[error("Corrupted reference. 0 contigs found in the file: {0}")]
    EmptyReference(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
