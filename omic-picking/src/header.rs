//! Merged VCF header.

use fxhash::FxHashSet as HashSet;
use log::warn;

use omic_core::ReferenceIndex;

use crate::reader::SourceHeader;

pub const FILE_FORMAT: &str = "##fileformat=VCFv4.2";
pub const SUPPORT_ID: &str = "SUPPORT";
pub const CALLERS_ID: &str = "CALLERS";

const FIXED_COLUMNS: [&str; 8] = ["CHROM", "POS", "ID", "REF", "ALT", "QUAL", "FILTER", "INFO"];

/// The header lines of the merged output, in write order.
#[derive(Debug, Clone, PartialEq)]
pub struct VcfHeader {
    pub lines: Vec<String>,
}

/// `##INFO=<ID=DP,...>` -> `Some(("INFO", "DP"))`
fn structured_id(line: &str) -> Option<(&str, &str)> {
    let body = line.strip_prefix("##")?;
    let (kind, rest) = body.split_once("=<")?;
    let id = rest.strip_prefix("ID=")?;
    let end = id.find([',', '>']).unwrap_or(id.len());
    Some((kind, &id[..end]))
}

fn has_sample_columns(header: &SourceHeader) -> bool {
    header.column_count().unwrap_or(0) > FIXED_COLUMNS.len()
}

///
/// Column lines with sample columns that differ from the first such line.
/// Records keep their own source's FORMAT and sample fields, so these
/// sources' samples end up under another source's column names.
///
pub fn conflicting_column_lines<'a>(sources: &[&'a SourceHeader]) -> Vec<&'a str> {
    let mut with_samples = sources
        .iter()
        .copied()
        .filter(|h| has_sample_columns(h))
        .filter_map(|h| h.column_line.as_deref());
    let Some(first) = with_samples.next() else {
        return Vec::new();
    };
    with_samples.filter(|line| *line != first).collect()
}

impl VcfHeader {
    ///
    /// Merge source headers, given in priority order.
    ///
    /// Contig lines come from the reference, never from sources. Source
    /// meta lines are de-duplicated: structured lines by (type, ID), the rest
    /// verbatim, first occurrence wins. The column line is taken from the
    /// highest-priority source with sample columns; a warning is logged for
    /// every source whose sample columns differ from it.
    ///
    pub fn merge<'a, I>(reference: &ReferenceIndex, sources: I) -> Self
    where
        I: IntoIterator<Item = &'a SourceHeader>,
    {
        let sources: Vec<&SourceHeader> = sources.into_iter().collect();

        let mut lines = vec![FILE_FORMAT.to_string()];
        for contig in reference.contigs() {
            lines.push(format!("##contig=<ID={},length={}>", contig.name, contig.length));
        }

        let mut seen: HashSet<String> = HashSet::default();
        for header in &sources {
            for line in &header.meta_lines {
                if line.starts_with("##fileformat=") || line.starts_with("##contig=") {
                    continue;
                }
                let dedup_key = match structured_id(line) {
                    Some(("INFO", SUPPORT_ID)) | Some(("INFO", CALLERS_ID)) => continue,
                    Some((kind, id)) => format!("{}\t{}", kind, id),
                    None => line.clone(),
                };
                if seen.insert(dedup_key) {
                    lines.push(line.clone());
                }
            }
        }

        let column_line = sources
            .iter()
            .find(|h| has_sample_columns(h))
            .and_then(|h| h.column_line.clone());
        for conflict in conflicting_column_lines(&sources) {
            warn!(
                "Sample columns differ between sources; records from this source will not match the output header: {}",
                conflict
            );
        }

        lines.push(format!(
            "##INFO=<ID={},Number=1,Type=Integer,Description=\"Number of variant callers detecting this variant\">",
            SUPPORT_ID
        ));
        lines.push(format!(
            "##INFO=<ID={},Number=.,Type=String,Description=\"Variant callers detecting this variant\">",
            CALLERS_ID
        ));
        lines.push(column_line.unwrap_or_else(|| format!("#{}", FIXED_COLUMNS.join("\t"))));

        VcfHeader { lines }
    }
}
