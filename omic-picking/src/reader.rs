//! VCF source reading.
//!
//! Reads one caller's VCF (plain text or gzipped/bgzf) as a lazy, single-pass
//! stream of [`RawCall`]s. Multi-allelic lines are split into one call per
//! allele, all sharing the line's annotations.

use std::collections::VecDeque;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::sync::Arc;

use log::debug;

use omic_core::utils::get_dynamic_reader;

use crate::errors::{PickingError, Result};
use crate::models::{Annotations, RawCall};

/// Meta-information lines (`##...`) and the `#CHROM` column line of a source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceHeader {
    pub meta_lines: Vec<String>,
    pub column_line: Option<String>,
}

impl SourceHeader {
    /// Number of columns declared by the `#CHROM` line, if present.
    pub fn column_count(&self) -> Option<usize> {
        self.column_line.as_ref().map(|l| l.split('\t').count())
    }
}

/// Streaming reader over one source's data lines.
pub struct VcfSourceReader {
    source_name: String,
    reader: BufReader<Box<dyn Read + Send>>,
    header: SourceHeader,
    line_buf: Vec<u8>,
    line_number: usize,
    /// First data line, read while consuming the header.
    peeked: Option<String>,
    pending: VecDeque<RawCall>,
    finished: bool,
}

impl VcfSourceReader {
    ///
    /// Open a source and consume its header.
    ///
    /// # Arguments
    /// - source_name: name used in error messages
    /// - path: VCF path; `.gz`/`.bgz` names are decompressed
    ///
    pub fn open<P: AsRef<Path>>(source_name: &str, path: P) -> Result<Self> {
        let path = path.as_ref();
        let reader = get_dynamic_reader(path).map_err(|e| PickingError::SourceOpen {
            source_name: source_name.to_string(),
            reason: format!("{:#}", e),
        })?;

        let mut vcf = VcfSourceReader {
            source_name: source_name.to_string(),
            reader,
            header: SourceHeader::default(),
            line_buf: Vec::with_capacity(1024),
            line_number: 0,
            peeked: None,
            pending: VecDeque::new(),
            finished: false,
        };
        vcf.read_header()?;
        Ok(vcf)
    }

    pub fn header(&self) -> &SourceHeader {
        &self.header
    }

    fn read_header(&mut self) -> Result<()> {
        while let Some(line) = self.read_line()? {
            if line.starts_with("##") {
                self.header.meta_lines.push(line);
            } else if line.starts_with('#') {
                self.header.column_line = Some(line);
            } else {
                self.peeked = Some(line);
                break;
            }
        }
        Ok(())
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        self.line_buf.clear();
        let read = self
            .reader
            .read_until(b'\n', &mut self.line_buf)
            .map_err(|e| PickingError::SourceRead {
                source_name: self.source_name.clone(),
                line_number: self.line_number,
                reason: e.to_string(),
            })?;
        if read == 0 {
            return Ok(None);
        }
        self.line_number += 1;

        let mut bytes = self.line_buf.as_slice();
        while let [rest @ .., b'\n' | b'\r'] = bytes {
            bytes = rest;
        }
        match std::str::from_utf8(bytes) {
            Ok(line) => Ok(Some(line.to_string())),
            Err(e) => Err(PickingError::MalformedRecord {
                source_name: self.source_name.clone(),
                line_number: self.line_number,
                line: String::from_utf8_lossy(bytes).into_owned(),
                reason: format!("line is not valid UTF-8 ({})", e),
            }),
        }
    }

    fn next_line(&mut self) -> Result<Option<String>> {
        match self.peeked.take() {
            Some(line) => Ok(Some(line)),
            None => self.read_line(),
        }
    }
}

impl Iterator for VcfSourceReader {
    type Item = Result<RawCall>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(call) = self.pending.pop_front() {
                return Some(Ok(call));
            }
            if self.finished {
                return None;
            }

            let line = match self.next_line() {
                Ok(Some(line)) => line,
                Ok(None) => {
                    self.finished = true;
                    return None;
                }
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
            };

            if line.starts_with('#') || line.trim().is_empty() {
                continue;
            }

            match parse_record(&self.source_name, self.line_number, &line) {
                Ok(calls) => self.pending.extend(calls),
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

/// Largest POS a VCF may carry (2^31 - 1).
pub const MAX_POS: u64 = i32::MAX as u64;

fn is_valid_allele(allele: &str) -> bool {
    allele == "-"
        || (!allele.is_empty()
            && allele
                .bytes()
                .all(|b| matches!(b.to_ascii_uppercase(), b'A' | b'C' | b'G' | b'T' | b'N')))
}

/// No-call, spanning deletion, symbolic and breakend alleles carry no
/// sequence to compare.
fn is_non_sequence_alt(alt: &str) -> bool {
    alt == "." || alt == "*" || alt.starts_with('<') || alt.contains('[') || alt.contains(']')
}

fn or_missing(field: Option<&&str>) -> String {
    match field {
        Some(f) if !f.is_empty() => f.to_string(),
        _ => ".".to_string(),
    }
}

///
/// Parse one tab-separated data line into one call per ALT allele.
///
pub fn parse_record(source_name: &str, line_number: usize, line: &str) -> Result<Vec<RawCall>> {
    let malformed = |reason: String| PickingError::MalformedRecord {
        source_name: source_name.to_string(),
        line_number,
        line: line.to_string(),
        reason,
    };

    // CHROM POS ID REF ALT QUAL FILTER INFO, then FORMAT + samples kept whole
    let fields: Vec<&str> = line.splitn(9, '\t').collect();
    if fields.len() < 5 {
        return Err(malformed(format!(
            "expected at least 5 columns, found {}",
            fields.len()
        )));
    }

    let chrom = fields[0];
    if chrom.is_empty() {
        return Err(malformed("missing CHROM".to_string()));
    }

    let pos = fields[1]
        .parse::<u64>()
        .ok()
        .filter(|p| (1..=MAX_POS).contains(p))
        .ok_or_else(|| {
            malformed(format!(
                "POS '{}' is not an integer in 1..={}",
                fields[1], MAX_POS
            ))
        })?;

    let ref_allele = fields[3];
    if !is_valid_allele(ref_allele) {
        return Err(malformed(format!("invalid REF allele '{}'", ref_allele)));
    }

    let alt_field = fields[4];
    if alt_field.is_empty() {
        return Err(malformed("missing ALT".to_string()));
    }

    let annotations = Arc::new(Annotations {
        id: or_missing(fields.get(2)),
        qual: or_missing(fields.get(5)),
        filter: or_missing(fields.get(6)),
        info: or_missing(fields.get(7)),
        genotypes: fields.get(8).map(|g| g.to_string()),
    });

    let mut calls = Vec::with_capacity(1);
    for alt in alt_field.split(',') {
        if is_non_sequence_alt(alt) {
            debug!(
                "{}: skipping non-sequence ALT '{}' at line {}",
                source_name, alt, line_number
            );
            continue;
        }
        if !is_valid_allele(alt) {
            return Err(malformed(format!("invalid ALT allele '{}'", alt)));
        }
        if ref_allele == "-" && alt == "-" {
            return Err(malformed("REF and ALT are both empty".to_string()));
        }
        calls.push(RawCall {
            chrom: chrom.to_string(),
            pos,
            ref_allele: ref_allele.to_string(),
            alt_allele: alt.to_string(),
            annotations: Arc::clone(&annotations),
            line_number,
        });
    }

    Ok(calls)
}
