//! # Consensus variant picking
//!
//! Combines variant calls made independently by several callers on the same
//! sample into one call set. A variant is kept only when enough distinct
//! callers report it, with separate thresholds for SNVs and indels.
//!
//! Calls are compared by a normalized (chrom, pos, ref, alt) key, so padding
//! and multi-allelic encoding differences between callers don't split
//! support. Output is sorted in reference contig order and every record
//! carries `SUPPORT` and `CALLERS` INFO fields.
//!
//! ```no_run
//! use omic_core::ReferenceIndex;
//! use omic_picking::{Source, merge};
//!
//! let reference = ReferenceIndex::from_path("hg38.fa").unwrap();
//! let sources = vec![
//!     Source::new("mutect2", "mutect2.vcf.gz"),
//!     Source::new("lofreq", "lofreq.vcf.gz"),
//! ];
//! let outcome = merge(&reference, &sources, 2, 1, "picked.vcf").unwrap();
//! println!("{} SNVs kept", outcome.summary.retained_snvs);
//! ```

pub mod aggregate;
pub mod config;
pub mod errors;
pub mod filter;
pub mod header;
pub mod merge;
pub mod models;
pub mod normalize;
pub mod reader;
pub mod writer;

pub use aggregate::{ConsensusAggregator, SourceShard};
pub use config::{PickingConfig, PickingConfigError};
pub use errors::{PickingError, Result};
pub use filter::{Thresholds, filter};
pub use merge::{MergeOutcome, MergeSummary, merge, merge_with_config};
pub use models::{CanonicalKey, MergedVariant, RawCall, Source, SupportSet, VariantKind};
pub use normalize::normalize;
pub use reader::VcfSourceReader;
