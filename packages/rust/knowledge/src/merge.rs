//! Field-level merge rules shared by every variant.

use std::collections::BTreeSet;

/// First non-empty value wins: `candidate` is taken only while `base` is
/// still blank.
pub fn merge_scalar(base: &mut String, candidate: String) {
    if base.trim().is_empty() && !candidate.trim().is_empty() {
        *base = candidate;
    }
}

/// Set union; `BTreeSet` keeps the result deduplicated and sorted.
pub fn merge_set(base: &mut BTreeSet<String>, candidate: BTreeSet<String>) {
    base.extend(candidate);
}

/// Append-only list merge in fragment order.
pub fn merge_list<T>(base: &mut Vec<T>, candidate: Vec<T>) {
    base.extend(candidate);
}
