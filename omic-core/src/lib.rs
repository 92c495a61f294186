//! # Core utilities for omic
//!
//! Shared plumbing for the omic variant-calling pipeline tools: transparent
//! plain/gzip readers, file-name helpers and the reference contig index that
//! defines genomic sort order.
//!
pub mod errors;
pub mod reference;
pub mod utils;

pub use errors::ReferenceError;
pub use reference::{Contig, ReferenceIndex};
