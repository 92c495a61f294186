//! Multi-caller consensus merge.
//!
//! Source reader -> key normalizer -> consensus aggregator -> threshold filter
//! -> ordered writer. Sources are read and normalized in parallel, one shard
//! per source, then folded into the aggregator in priority order on the
//! calling thread so the result never depends on read scheduling.

use std::path::{Path, PathBuf};

use fxhash::FxHashSet as HashSet;
use indicatif::ProgressBar;
use log::{info, warn};
use rayon::prelude::*;

use omic_core::ReferenceIndex;

use crate::aggregate::{ConsensusAggregator, SourceShard};
use crate::config::PickingConfig;
use crate::errors::{PickingError, Result};
use crate::filter::filter;
use crate::header::VcfHeader;
use crate::models::{Source, VariantKind};
use crate::writer::{MergedCallSet, VcfWrite, sort_variants};

/// Counts describing one merge run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MergeSummary {
    pub sources: usize,
    pub raw_calls: usize,
    pub distinct_keys: usize,
    pub retained_snvs: usize,
    pub retained_indels: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    pub path: PathBuf,
    pub summary: MergeSummary,
}

///
/// Merge call sets from several callers into one consensus VCF.
///
/// # Arguments
/// - reference: contig order used to sort the output
/// - sources: (name, path) pairs in priority order; the first source that
///   supports a variant provides its output fields
/// - min_snv_support: minimum distinct callers for an SNV (values < 1 mean 1)
/// - min_indel_support: minimum distinct callers for an indel (values < 1 mean 1)
/// - output: destination VCF (`.gz` for gzip)
///
pub fn merge<P: AsRef<Path>>(
    reference: &ReferenceIndex,
    sources: &[Source],
    min_snv_support: i64,
    min_indel_support: i64,
    output: P,
) -> Result<MergeOutcome> {
    let config = PickingConfig {
        min_snv_callers: min_snv_support,
        min_indel_callers: min_indel_support,
        threads: None,
    };
    merge_with_config(reference, sources, &config, output)
}

/// [`merge`] driven by a [`PickingConfig`].
pub fn merge_with_config<P: AsRef<Path>>(
    reference: &ReferenceIndex,
    sources: &[Source],
    config: &PickingConfig,
    output: P,
) -> Result<MergeOutcome> {
    let output = output.as_ref();
    check_unique_names(sources)?;
    let thresholds = config.thresholds();

    if sources.is_empty() {
        warn!("No variant call sets supplied; the output will contain a header only");
    }

    let shards = read_sources(sources, config.threads)?;

    let mut aggregator = ConsensusAggregator::new();
    let mut headers = Vec::with_capacity(shards.len());
    for mut shard in shards {
        info!(
            "{}: {} calls",
            sources[shard.source].name,
            shard.calls.len()
        );
        headers.push(std::mem::take(&mut shard.header));
        aggregator.add_shard(shard);
    }

    let raw_calls = aggregator.raw_calls();
    let distinct_keys = aggregator.len();

    let retained = filter(aggregator, &thresholds);
    let variants = sort_variants(retained, reference)?;

    let retained_snvs = variants
        .iter()
        .filter(|v| v.kind == VariantKind::Snv)
        .count();
    let summary = MergeSummary {
        sources: sources.len(),
        raw_calls,
        distinct_keys,
        retained_snvs,
        retained_indels: variants.len() - retained_snvs,
    };

    let call_set = MergedCallSet {
        header: VcfHeader::merge(reference, &headers),
        variants,
        source_names: sources.iter().map(|s| s.name.clone()).collect(),
    };
    call_set.write_vcf(output)?;

    info!(
        "Picked {} SNVs (min {} callers) and {} indels (min {} callers) from {} distinct variants; written to {}",
        summary.retained_snvs,
        thresholds.min_snv,
        summary.retained_indels,
        thresholds.min_indel,
        summary.distinct_keys,
        output.display()
    );

    Ok(MergeOutcome {
        path: output.to_path_buf(),
        summary,
    })
}

fn check_unique_names(sources: &[Source]) -> Result<()> {
    let mut seen = HashSet::default();
    for source in sources {
        if !seen.insert(source.name.as_str()) {
            return Err(PickingError::DuplicateSource(source.name.clone()));
        }
    }
    Ok(())
}

///
/// Read every source into a shard, in parallel. Shards come back in
/// priority order; if several sources fail, the highest-priority error wins.
///
fn read_sources(sources: &[Source], threads: Option<usize>) -> Result<Vec<SourceShard>> {
    let bar = ProgressBar::new(sources.len() as u64);

    let read_all = || {
        sources
            .par_iter()
            .enumerate()
            .map(|(id, source)| {
                let shard = SourceShard::read(id, source);
                bar.inc(1);
                shard
            })
            .collect::<Vec<Result<SourceShard>>>()
    };

    let results = match threads {
        Some(n) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|e| PickingError::ThreadPool {
                    threads: n,
                    reason: e.to_string(),
                })?;
            pool.install(read_all)
        }
        None => read_all(),
    };
    bar.finish_and_clear();

    results.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    use omic_core::Contig;

    fn reference() -> ReferenceIndex {
        ReferenceIndex::from_contigs(vec![Contig {
            name: "chr1".to_string(),
            length: 1000,
        }])
        .unwrap()
    }

    #[rstest]
    fn test_duplicate_source_names_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let sources = vec![
            Source::new("lofreq", dir.path().join("a.vcf")),
            Source::new("lofreq", dir.path().join("b.vcf")),
        ];
        let result = merge(&reference(), &sources, 1, 1, dir.path().join("out.vcf"));
        assert!(matches!(result, Err(PickingError::DuplicateSource(name)) if name == "lofreq"));
    }

    #[rstest]
    fn test_missing_source_file() {
        let dir = tempfile::tempdir().unwrap();
        let sources = vec![Source::new("muse", dir.path().join("missing.vcf"))];
        let output = dir.path().join("out.vcf");
        let result = merge(&reference(), &sources, 1, 1, &output);
        assert!(matches!(result, Err(PickingError::SourceOpen { .. })));
        assert!(!output.exists());
    }

    #[rstest]
    fn test_explicit_thread_pool() {
        let dir = tempfile::tempdir().unwrap();
        let vcf = dir.path().join("lofreq.vcf");
        std::fs::write(&vcf, "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\nchr1\t5\t.\tA\tC\t.\t.\t.\n")
            .unwrap();

        let config = PickingConfig {
            threads: Some(2),
            ..PickingConfig::default()
        };
        let outcome = merge_with_config(
            &reference(),
            &[Source::new("lofreq", &vcf)],
            &config,
            dir.path().join("out.vcf"),
        )
        .unwrap();
        assert_eq!(
            outcome.summary,
            MergeSummary {
                sources: 1,
                raw_calls: 1,
                distinct_keys: 1,
                retained_snvs: 1,
                retained_indels: 0,
            }
        );
    }
}
