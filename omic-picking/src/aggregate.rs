//! Consensus aggregation.
//!
//! Builds the union of canonical keys over all sources and records, per key,
//! which sources support it and every call that produced it.

use fxhash::FxHashMap as HashMap;
use log::debug;

use crate::errors::Result;
use crate::models::{CanonicalKey, RawCall, Source, SourceId, SupportSet, VariantKind};
use crate::normalize::normalize;
use crate::reader::{SourceHeader, VcfSourceReader};

/// Everything one source contributes, normalized but not yet aggregated.
/// Built independently per source so sources can be read in parallel.
#[derive(Debug, Clone)]
pub struct SourceShard {
    pub source: SourceId,
    pub header: SourceHeader,
    pub calls: Vec<(CanonicalKey, RawCall)>,
}

impl SourceShard {
    ///
    /// Read and normalize a whole source. Any malformed line fails the shard.
    ///
    pub fn read(id: SourceId, source: &Source) -> Result<Self> {
        let reader = VcfSourceReader::open(&source.name, &source.path)?;
        let header = reader.header().clone();

        let mut calls = Vec::new();
        for call in reader {
            let call = call?;
            calls.push((normalize(&call), call));
        }
        debug!("{}: {} calls read", source.name, calls.len());

        Ok(SourceShard {
            source: id,
            header,
            calls,
        })
    }
}

/// Per-key aggregation state.
#[derive(Debug, Clone)]
pub struct KeyEntry {
    pub kind: VariantKind,
    pub support: SupportSet,
    /// Contributing calls in arrival order.
    pub calls: Vec<(SourceId, RawCall)>,
}

///
/// Owns the key -> support mapping for one merge run.
///
#[derive(Debug, Default)]
pub struct ConsensusAggregator {
    entries: HashMap<CanonicalKey, KeyEntry>,
    raw_calls: usize,
}

impl ConsensusAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    ///
    /// Record a normalized call. A source already supporting the key keeps a
    /// single membership; the call itself is still kept.
    ///
    pub fn add(&mut self, source: SourceId, key: CanonicalKey, call: RawCall) {
        self.raw_calls += 1;
        let entry = self.entries.entry(key).or_insert_with_key(|key| KeyEntry {
            kind: key.kind(),
            support: SupportSet::new(),
            calls: Vec::with_capacity(1),
        });
        entry.support.insert(source);
        entry.calls.push((source, call));
    }

    /// Normalize and record a raw call.
    pub fn add_call(&mut self, source: SourceId, call: RawCall) {
        let key = normalize(&call);
        self.add(source, key, call);
    }

    /// Fold a whole shard in, preserving its file order.
    pub fn add_shard(&mut self, shard: SourceShard) {
        let source = shard.source;
        self.entries.reserve(shard.calls.len());
        for (key, call) in shard.calls {
            self.add(source, key, call);
        }
    }

    pub fn get(&self, key: &CanonicalKey) -> Option<&KeyEntry> {
        self.entries.get(key)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of calls recorded, counting duplicates.
    pub fn raw_calls(&self) -> usize {
        self.raw_calls
    }

    pub fn into_entries(self) -> impl Iterator<Item = (CanonicalKey, KeyEntry)> {
        self.entries.into_iter()
    }
}
