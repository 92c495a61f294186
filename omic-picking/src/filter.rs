//! Threshold filtering and representative selection.

use log::warn;

use crate::aggregate::ConsensusAggregator;
use crate::models::{MergedVariant, VariantKind};

/// Minimum number of supporting sources, per variant kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub min_snv: usize,
    pub min_indel: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            min_snv: 1,
            min_indel: 1,
        }
    }
}

impl Thresholds {
    ///
    /// Build thresholds from user values. Every key has at least one
    /// supporting source, so anything below 1 is clamped to 1 with a warning.
    ///
    pub fn new(min_snv: i64, min_indel: i64) -> Self {
        Thresholds {
            min_snv: clamp("SNV", min_snv),
            min_indel: clamp("indel", min_indel),
        }
    }

    pub fn minimum_for(&self, kind: VariantKind) -> usize {
        match kind {
            VariantKind::Snv => self.min_snv,
            VariantKind::Indel => self.min_indel,
        }
    }
}

fn clamp(label: &str, value: i64) -> usize {
    if value < 1 {
        warn!(
            "Invalid minimum {} caller count {}; using 1 instead",
            label, value
        );
        1
    } else {
        value as usize
    }
}

///
/// Keep keys whose support reaches the threshold for their kind, each with
/// one representative call: the first call from the highest-priority
/// supporting source. Output order is unspecified; the writer sorts.
///
pub fn filter(aggregator: ConsensusAggregator, thresholds: &Thresholds) -> Vec<MergedVariant> {
    aggregator
        .into_entries()
        .filter(|(_, entry)| entry.support.len() >= thresholds.minimum_for(entry.kind))
        .filter_map(|(key, entry)| {
            // min_by_key returns the first of equal minima, i.e. file order
            let (source, call) = entry.calls.into_iter().min_by_key(|(source, _)| *source)?;
            Some(MergedVariant {
                key,
                kind: entry.kind,
                support: entry.support,
                representative: call,
                representative_source: source,
            })
        })
        .collect()
}
