use std::path::Path;

use anyhow::{Context, Result};
use clap::ArgMatches;
use log::info;

use omic_core::ReferenceIndex;
use omic_picking::{PickingConfig, Source, merge_with_config};

use super::cli::CALLER_FLAGS;

///
/// Collect sources in priority order: named caller flags first, then
/// `--source NAME=PATH`, then `--vcf PATH`.
///
pub fn collect_sources(matches: &ArgMatches) -> Result<Vec<Source>> {
    let mut sources = Vec::new();

    for caller in CALLER_FLAGS {
        if let Some(path) = matches.get_one::<String>(caller) {
            sources.push(Source::new(caller, path));
        }
    }

    if let Some(values) = matches.get_many::<String>("source") {
        for value in values {
            let (name, path) = value
                .split_once('=')
                .filter(|(name, path)| !name.is_empty() && !path.is_empty())
                .with_context(|| format!("--source must look like NAME=PATH, got '{}'", value))?;
            sources.push(Source::new(name, path));
        }
    }

    if let Some(values) = matches.get_many::<String>("vcf") {
        for path in values {
            let source = Source::from_path(path)
                .with_context(|| format!("Can't derive a caller name from '{}'", path))?;
            sources.push(source);
        }
    }

    Ok(sources)
}

///
/// Settings from `--config` (if any) overridden by explicit flags.
///
pub fn build_config(matches: &ArgMatches) -> Result<PickingConfig> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => PickingConfig::try_from(Path::new(path))
            .with_context(|| format!("Failed to load picking config: {}", path))?,
        None => PickingConfig::default(),
    };

    if let Some(n) = matches.get_one::<i64>("min-snv-callers") {
        config.min_snv_callers = *n;
    }
    if let Some(n) = matches.get_one::<i64>("min-indel-callers") {
        config.min_indel_callers = *n;
    }
    if let Some(n) = matches.get_one::<usize>("threads") {
        config.threads = Some(*n);
    }

    Ok(config)
}

pub fn run_picking(matches: &ArgMatches) -> Result<()> {
    let ref_fa = matches
        .get_one::<String>("ref-fa")
        .expect("--ref-fa is required");
    let output_vcf = matches
        .get_one::<String>("output-vcf")
        .expect("--output-vcf is required");

    let sources = collect_sources(matches)?;
    let config = build_config(matches)?;

    let reference = ReferenceIndex::from_path(ref_fa)
        .with_context(|| format!("Failed to load reference contigs from {}", ref_fa))?;

    info!(
        "Picking variants from {} caller(s): {}",
        sources.len(),
        sources
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let outcome = merge_with_config(&reference, &sources, &config, output_vcf)
        .context("Variant picking failed")?;

    info!(
        "{} variants written to {}",
        outcome.summary.retained_snvs + outcome.summary.retained_indels,
        outcome.path.display()
    );

    Ok(())
}
