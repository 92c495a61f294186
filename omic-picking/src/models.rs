//! Record model for consensus picking.
//!
//! A [`RawCall`] is one allele of one caller's VCF line. Calls reduce to a
//! [`CanonicalKey`] for comparison across callers, and every distinct key
//! collects a [`SupportSet`] of the callers that reported it.

use std::collections::BTreeSet;
use std::fmt::{self, Display};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use omic_core::utils::file_stem_before_first_dot;

/// Position of a source in the caller-supplied priority order. Lower is
/// higher priority.
pub type SourceId = usize;

///
/// One caller's call set: a display name (used in `CALLERS=`) and the path to
/// its VCF.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub name: String,
    pub path: PathBuf,
}

impl Source {
    pub fn new<S: Into<String>, P: Into<PathBuf>>(name: S, path: P) -> Self {
        Source {
            name: name.into(),
            path: path.into(),
        }
    }

    ///
    /// Name a source after its file: `lofreq.vcf.gz` becomes `lofreq`.
    ///
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let path = path.as_ref();
        let name = file_stem_before_first_dot(path)?;
        Some(Source::new(name, path))
    }
}

/// Fields of a VCF line that are carried through untouched. Shared between
/// the alleles of a split multi-allelic line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Annotations {
    pub id: String,
    pub qual: String,
    pub filter: String,
    pub info: String,
    /// FORMAT and sample columns, tab-joined, if the line has any.
    pub genotypes: Option<String>,
}

/// A single-allele call exactly as the caller wrote it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCall {
    pub chrom: String,
    /// 1-based
    pub pos: u64,
    pub ref_allele: String,
    pub alt_allele: String,
    pub annotations: Arc<Annotations>,
    /// Line of the source file this call came from.
    pub line_number: usize,
}

impl RawCall {
    pub fn new(chrom: &str, pos: u64, ref_allele: &str, alt_allele: &str) -> Self {
        RawCall {
            chrom: chrom.to_string(),
            pos,
            ref_allele: ref_allele.to_string(),
            alt_allele: alt_allele.to_string(),
            annotations: Arc::new(Annotations {
                id: ".".to_string(),
                qual: ".".to_string(),
                filter: ".".to_string(),
                info: ".".to_string(),
                genotypes: None,
            }),
            line_number: 0,
        }
    }
}

///
/// Normalized (chrom, pos, ref, alt). Alleles are upper-case; an empty allele
/// is the anchor-free side of an indel.
///
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalKey {
    pub chrom: String,
    pub pos: u64,
    pub ref_allele: String,
    pub alt_allele: String,
}

impl CanonicalKey {
    pub fn kind(&self) -> VariantKind {
        VariantKind::of(&self.ref_allele, &self.alt_allele)
    }
}

impl Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |allele: &str| if allele.is_empty() { "-".to_string() } else { allele.to_string() };
        write!(
            f,
            "{}:{} {}>{}",
            self.chrom,
            self.pos,
            show(&self.ref_allele),
            show(&self.alt_allele)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariantKind {
    Snv,
    /// Insertion, deletion or multi-base substitution.
    Indel,
}

impl VariantKind {
    /// Classify normalized alleles. Only meaningful after normalization.
    pub fn of(ref_allele: &str, alt_allele: &str) -> Self {
        if ref_allele.len() == 1 && alt_allele.len() == 1 {
            VariantKind::Snv
        } else {
            VariantKind::Indel
        }
    }
}

impl Display for VariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariantKind::Snv => write!(f, "SNV"),
            VariantKind::Indel => write!(f, "indel"),
        }
    }
}

///
/// Distinct sources supporting a key. Iterates in priority order.
///
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SupportSet(BTreeSet<SourceId>);

impl SupportSet {
    pub fn new() -> Self {
        SupportSet(BTreeSet::new())
    }

    /// Returns `false` if the source was already a member.
    pub fn insert(&mut self, source: SourceId) -> bool {
        self.0.insert(source)
    }

    pub fn contains(&self, source: SourceId) -> bool {
        self.0.contains(&source)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = SourceId> + '_ {
        self.0.iter().copied()
    }

    /// Source names in priority order.
    pub fn names<'a>(&'a self, source_names: &'a [String]) -> impl Iterator<Item = &'a str> + 'a {
        self.iter().map(move |id| source_names[id].as_str())
    }
}

///
/// A retained key with its support and the one call chosen to populate the
/// output record.
///
#[derive(Debug, Clone)]
pub struct MergedVariant {
    pub key: CanonicalKey,
    pub kind: VariantKind,
    pub support: SupportSet,
    pub representative: RawCall,
    pub representative_source: SourceId,
}
