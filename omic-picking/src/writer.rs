//! Ordered VCF writing.
//!
//! Sorts retained variants into reference contig order and writes them with
//! `SUPPORT`/`CALLERS` annotations. Output is written to a temporary file next
//! to the destination and renamed into place only once complete, so a failed
//! run never leaves a file that looks finished.

use std::io::{BufWriter, Write};
use std::path::Path;

use flate2::Compression;
use flate2::write::GzEncoder;

use omic_core::ReferenceIndex;
use omic_core::utils::get_file_info;

use crate::errors::{PickingError, Result};
use crate::header::{CALLERS_ID, SUPPORT_ID, VcfHeader};
use crate::models::{MergedVariant, SupportSet};

///
/// Sort variants by contig rank, then the POS written to the output (the
/// representative's own position), then normalized position, alt and ref.
/// Records are written verbatim, so ordering on the written POS keeps the
/// file coordinate-sorted even when a representative carries padding.
///
/// Fails with `UnknownContig` if any variant's chromosome is missing from the
/// reference; nothing is dropped silently.
///
pub fn sort_variants(
    variants: Vec<MergedVariant>,
    reference: &ReferenceIndex,
) -> Result<Vec<MergedVariant>> {
    let mut ranked = Vec::with_capacity(variants.len());
    let mut unknown: Option<MergedVariant> = None;

    for variant in variants {
        match reference.rank(&variant.key.chrom) {
            Some(rank) => ranked.push((rank, variant)),
            None => {
                // report the same offender on every run regardless of map order
                let replace = match &unknown {
                    Some(current) => {
                        (&variant.key.chrom, variant.key.pos, &variant.key.alt_allele)
                            < (&current.key.chrom, current.key.pos, &current.key.alt_allele)
                    }
                    None => true,
                };
                if replace {
                    unknown = Some(variant);
                }
            }
        }
    }

    if let Some(variant) = unknown {
        return Err(PickingError::UnknownContig {
            chrom: variant.key.chrom.clone(),
            key: variant.key.to_string(),
        });
    }

    ranked.sort_by(|(rank_a, a), (rank_b, b)| {
        rank_a
            .cmp(rank_b)
            .then(a.representative.pos.cmp(&b.representative.pos))
            .then(a.key.pos.cmp(&b.key.pos))
            .then_with(|| a.key.alt_allele.cmp(&b.key.alt_allele))
            .then_with(|| a.key.ref_allele.cmp(&b.key.ref_allele))
    });

    Ok(ranked.into_iter().map(|(_, variant)| variant).collect())
}

///
/// Append `SUPPORT=<n>;CALLERS=<a,b>` to an INFO field, replacing any earlier
/// SUPPORT/CALLERS entries and a missing (`.`) INFO.
///
pub fn annotate_info(info: &str, support: &SupportSet, source_names: &[String]) -> String {
    let mut entries: Vec<&str> = info
        .split(';')
        .filter(|entry| !entry.is_empty() && *entry != ".")
        .filter(|entry| {
            let key = entry.split('=').next().unwrap_or(*entry);
            key != SUPPORT_ID && key != CALLERS_ID
        })
        .collect();

    let support_entry = format!("{}={}", SUPPORT_ID, support.len());
    let callers = support.names(source_names).collect::<Vec<_>>().join(",");
    let callers_entry = format!("{}={}", CALLERS_ID, callers);
    entries.push(&support_entry);
    entries.push(&callers_entry);

    entries.join(";")
}

/// One output line for a merged variant, from its representative call.
pub fn format_record(variant: &MergedVariant, source_names: &[String]) -> String {
    let call = &variant.representative;
    let ann = &call.annotations;
    let mut line = format!(
        "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
        call.chrom,
        call.pos,
        ann.id,
        call.ref_allele,
        call.alt_allele,
        ann.qual,
        ann.filter,
        annotate_info(&ann.info, &variant.support, source_names),
    );
    if let Some(genotypes) = &ann.genotypes {
        line.push('\t');
        line.push_str(genotypes);
    }
    line
}

/// A sorted, annotated call set ready to be written.
#[derive(Debug, Clone)]
pub struct MergedCallSet {
    pub header: VcfHeader,
    pub variants: Vec<MergedVariant>,
    pub source_names: Vec<String>,
}

impl MergedCallSet {
    fn write_lines<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        for line in &self.header.lines {
            writeln!(out, "{}", line)?;
        }
        for variant in &self.variants {
            writeln!(out, "{}", format_record(variant, &self.source_names))?;
        }
        Ok(())
    }
}

pub trait VcfWrite {
    ///
    /// Write data to disk as a vcf file, gzip-compressed if the path ends in
    /// `.gz`. The file appears at `path` only if writing completes.
    ///
    /// # Arguments
    /// - path: the path to the file to dump to
    fn write_vcf<T: AsRef<Path>>(&self, path: T) -> Result<()>;
}

impl VcfWrite for MergedCallSet {
    fn write_vcf<T: AsRef<Path>>(&self, path: T) -> Result<()> {
        let path = path.as_ref();
        let output_error = |reason: String| PickingError::OutputWrite {
            path: path.display().to_string(),
            reason,
        };

        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent)?;

        let tmp = tempfile::Builder::new()
            .prefix(".omic-picking-")
            .suffix(".tmp")
            .tempfile_in(parent)
            .map_err(|e| output_error(e.to_string()))?;

        if get_file_info(path).is_gzipped {
            let mut encoder = GzEncoder::new(BufWriter::new(tmp.as_file()), Compression::default());
            self.write_lines(&mut encoder)?;
            encoder.finish()?.flush()?;
        } else {
            let mut writer = BufWriter::new(tmp.as_file());
            self.write_lines(&mut writer)?;
            writer.flush()?;
        }

        tmp.persist(path).map_err(|e| output_error(e.error.to_string()))?;
        Ok(())
    }
}
