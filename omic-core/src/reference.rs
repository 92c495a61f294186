//! Reference contig index.
//!
//! Defines the genome's contig ordering, used to sort variant records the way
//! the reference lists its sequences (so `chr2` sorts before `chr10`). The
//! index can be built from a samtools-style `.fai`, or by scanning the FASTA
//! itself when no index is present.

use std::io::BufRead;
use std::path::{Path, PathBuf};

use fxhash::FxHashMap as HashMap;

use crate::errors::ReferenceError;
use crate::utils::{FileType, get_dynamic_reader, get_file_info};

/// A named reference sequence and its length in bases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contig {
    pub name: String,
    pub length: u64,
}

/// Ordered list of reference contigs with O(1) rank lookup.
#[derive(Debug, Clone, Default)]
pub struct ReferenceIndex {
    contigs: Vec<Contig>,
    ranks: HashMap<String, usize>,
}

impl ReferenceIndex {
    ///
    /// Build an index from contigs given in genome order.
    ///
    pub fn from_contigs(contigs: Vec<Contig>) -> Result<Self, ReferenceError> {
        let mut ranks = HashMap::default();
        ranks.reserve(contigs.len());
        for (rank, contig) in contigs.iter().enumerate() {
            if ranks.insert(contig.name.clone(), rank).is_some() {
                return Err(ReferenceError::DuplicateContig(contig.name.clone()));
            }
        }
        Ok(ReferenceIndex { contigs, ranks })
    }

    ///
    /// Load the contig order for a reference.
    ///
    /// `path` may point at a `.fai` directly, or at a FASTA (plain or gzipped).
    /// For a FASTA with a sibling `<fasta>.fai`, the index file is used instead
    /// of scanning the sequence.
    ///
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ReferenceError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ReferenceError::FileReadError(path.display().to_string()));
        }

        let index = match get_file_info(path).file_type {
            FileType::FAI => Self::from_fai(path)?,
            // anything else is read as FASTA, whatever its extension
            FileType::FASTA | FileType::UNKNOWN => {
                let fai = sibling_fai(path);
                if fai.exists() {
                    Self::from_fai(&fai)?
                } else {
                    Self::from_fasta(path)?
                }
            }
        };

        if index.is_empty() {
            return Err(ReferenceError::EmptyReference(path.display().to_string()));
        }
        Ok(index)
    }

    ///
    /// Read contig names and lengths from a `.fai` (first two columns).
    ///
    pub fn from_fai(path: &Path) -> Result<Self, ReferenceError> {
        let reader = get_dynamic_reader(path)
            .map_err(|e| ReferenceError::FileReadError(format!("{}: {}", path.display(), e)))?;

        let mut contigs = Vec::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let mut fields = line.split('\t');
            let name = fields.next().filter(|n| !n.is_empty());
            let length = fields.next().and_then(|l| l.trim().parse::<u64>().ok());
            match (name, length) {
                (Some(name), Some(length)) => contigs.push(Contig {
                    name: name.to_string(),
                    length,
                }),
                _ => {
                    return Err(ReferenceError::MalformedFaiLine {
                        path: path.display().to_string(),
                        line_number: i + 1,
                        line,
                    });
                }
            }
        }

        Self::from_contigs(contigs)
    }

    ///
    /// Scan a FASTA, recording each `>name` (first whitespace-delimited token)
    /// and its sequence length, in file order.
    ///
    pub fn from_fasta(path: &Path) -> Result<Self, ReferenceError> {
        let reader = get_dynamic_reader(path)
            .map_err(|e| ReferenceError::FileReadError(format!("{}: {}", path.display(), e)))?;

        let mut contigs: Vec<Contig> = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if let Some(header) = line.strip_prefix('>') {
                let name = header.split_whitespace().next().unwrap_or_default();
                contigs.push(Contig {
                    name: name.to_string(),
                    length: 0,
                });
            } else {
                let bases = line.trim_end().len() as u64;
                if bases == 0 {
                    continue;
                }
                match contigs.last_mut() {
                    Some(contig) => contig.length += bases,
                    None => return Err(ReferenceError::MissingHeader(path.display().to_string())),
                }
            }
        }

        Self::from_contigs(contigs)
    }

    /// Position of `name` in genome order, if the reference has it.
    pub fn rank(&self, name: &str) -> Option<usize> {
        self.ranks.get(name).copied()
    }

    pub fn contigs(&self) -> &[Contig] {
        &self.contigs
    }

    pub fn len(&self) -> usize {
        self.contigs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contigs.is_empty()
    }
}

fn sibling_fai(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".fai");
    PathBuf::from(name)
}
