//! Allele normalization.
//!
//! Reduces a call to a parsimonious, padding-free [`CanonicalKey`] so that
//! callers writing the same event with different padding collapse together.
//! Operates on `&[u8]` slices; the only allocation is the key itself.

use crate::models::{CanonicalKey, RawCall};

/// Placeholder some callers write for an empty allele.
const EMPTY_ALLELE: &[u8] = b"-";

fn allele_bytes(allele: &str) -> &[u8] {
    match allele.as_bytes() {
        EMPTY_ALLELE => &[],
        bytes => bytes,
    }
}

/// Count shared trailing bases that can go while both alleles keep at least one base.
fn trim_right(ref_allele: &[u8], alt_allele: &[u8]) -> usize {
    let mut trimmed = 0;
    while ref_allele.len() - trimmed > 1 && alt_allele.len() - trimmed > 1 {
        let r = ref_allele[ref_allele.len() - 1 - trimmed];
        let a = alt_allele[alt_allele.len() - 1 - trimmed];
        if !r.eq_ignore_ascii_case(&a) {
            break;
        }
        trimmed += 1;
    }
    trimmed
}

/// Count shared leading bases that can go while both alleles keep at least one base.
fn trim_left(ref_allele: &[u8], alt_allele: &[u8]) -> usize {
    let mut trimmed = 0;
    while ref_allele.len() - trimmed > 1 && alt_allele.len() - trimmed > 1 {
        if !ref_allele[trimmed].eq_ignore_ascii_case(&alt_allele[trimmed]) {
            break;
        }
        trimmed += 1;
    }
    trimmed
}

/// An indel with one single-base side keeps a shared anchor base after
/// trimming.
fn is_anchored_indel(ref_allele: &[u8], alt_allele: &[u8]) -> bool {
    !ref_allele.is_empty()
        && !alt_allele.is_empty()
        && ref_allele.len() != alt_allele.len()
        && (ref_allele.len() == 1 || alt_allele.len() == 1)
}

/// Left-padded indel (`AT>A`, `A>AT`): the anchor is the first base.
fn has_left_anchor(ref_allele: &[u8], alt_allele: &[u8]) -> bool {
    is_anchored_indel(ref_allele, alt_allele) && ref_allele[0].eq_ignore_ascii_case(&alt_allele[0])
}

/// Right-padded indel (`AT>T`, `T>AT`): the anchor is the last base.
fn has_right_anchor(ref_allele: &[u8], alt_allele: &[u8]) -> bool {
    is_anchored_indel(ref_allele, alt_allele)
        && ref_allele[ref_allele.len() - 1].eq_ignore_ascii_case(&alt_allele[alt_allele.len() - 1])
}

fn to_upper_string(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).to_ascii_uppercase()
}

///
/// Normalize raw alleles at a 1-based position.
///
/// 1. Trim shared trailing bases (position unchanged).
/// 2. Trim shared leading bases, advancing the position.
/// 3. Drop the anchor base of a padded indel: a leading anchor advances the
///    position, a trailing one does not. When both ends match, the leading
///    base is taken as the anchor.
///
/// Steps 1 and 2 stop as soon as either allele is down to one base. Bases
/// compare case-insensitively and the key is upper-case. `-` means an empty
/// allele.
///
pub fn normalize_alleles(pos: u64, ref_allele: &str, alt_allele: &str) -> (u64, String, String) {
    let mut r = allele_bytes(ref_allele);
    let mut a = allele_bytes(alt_allele);
    let mut pos = pos;

    let right = trim_right(r, a);
    r = &r[..r.len() - right];
    a = &a[..a.len() - right];

    let left = trim_left(r, a);
    r = &r[left..];
    a = &a[left..];
    pos = pos.saturating_add(left as u64);

    if has_left_anchor(r, a) {
        r = &r[1..];
        a = &a[1..];
        pos = pos.saturating_add(1);
    } else if has_right_anchor(r, a) {
        r = &r[..r.len() - 1];
        a = &a[..a.len() - 1];
    }

    (pos, to_upper_string(r), to_upper_string(a))
}

/// Reduce a call to its canonical comparison key. Pure and idempotent.
pub fn normalize(call: &RawCall) -> CanonicalKey {
    let (pos, ref_allele, alt_allele) =
        normalize_alleles(call.pos, &call.ref_allele, &call.alt_allele);
    CanonicalKey {
        chrom: call.chrom.clone(),
        pos,
        ref_allele,
        alt_allele,
    }
}
