use std::fs::File;
use std::io::prelude::*;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use flate2::read::MultiGzDecoder;

#[derive(Debug, Clone, PartialEq)]
#[allow(clippy::upper_case_acronyms)]
pub enum FileType {
    FASTA,
    FAI,
    UNKNOWN,
}

impl FromStr for FileType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fa" | "fasta" | "fna" => Ok(FileType::FASTA),
            "fai" => Ok(FileType::FAI),
            _ => Ok(FileType::UNKNOWN),
        }
    }
}

pub struct FileInfo {
    pub file_type: FileType,
    pub is_gzipped: bool,
}

/// Compression suffixes we transparently decompress. `.bgz` is BGZF, which
/// is a valid multi-member gzip stream.
fn is_gzip_name(filename: &str) -> bool {
    filename.ends_with(".gz") || filename.ends_with(".bgz")
}

pub fn get_file_info(path: &Path) -> FileInfo {
    let mut file_type = FileType::UNKNOWN;
    let mut is_gzipped = false;

    if let Some(filename) = path.file_name().and_then(|f| f.to_str()) {
        let base_filename = if is_gzip_name(filename) {
            is_gzipped = true;
            filename
                .strip_suffix(".gz")
                .or_else(|| filename.strip_suffix(".bgz"))
                .unwrap_or(filename)
        } else {
            filename
        };

        if let Some(ext) = PathBuf::from(base_filename)
            .extension()
            .and_then(|e| e.to_str())
        {
            file_type = FileType::from_str(ext).unwrap_or(FileType::UNKNOWN);
        }
    }

    FileInfo {
        file_type,
        is_gzipped,
    }
}

///
/// Get a reader for either a gzip'd or non-gzip'd file.
///
/// # Arguments
///
/// - path: path to the file to read
///
pub fn get_dynamic_reader(path: &Path) -> Result<BufReader<Box<dyn Read + Send>>> {
    let is_gzipped = get_file_info(path).is_gzipped;
    let file = File::open(path).with_context(|| format!("Failed to open file: {:?}", path))?;
    let file: Box<dyn Read + Send> = match is_gzipped {
        true => Box::new(MultiGzDecoder::new(file)),
        false => Box::new(file),
    };

    // 256KB buffer, call sets can be large
    Ok(BufReader::with_capacity(256 * 1024, file))
}

///
/// Derive a short name for a file: everything before the first `.` in the
/// file name, so `/data/mutect2.filtered.vcf.gz` becomes `mutect2`.
///
pub fn file_stem_before_first_dot(path: &Path) -> Option<String> {
    let filename = path.file_name()?.to_str()?;
    let stem = filename.split('.').next()?;
    if stem.is_empty() {
        None
    } else {
        Some(stem.to_string())
    }
}
