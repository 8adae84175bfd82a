//! Dotted version comparison for Content Hub packages

use std::cmp::Ordering;

/// Numeric components of a dotted version
///
/// Components that are not plain digits (`0-beta`, `x`) are skipped.
pub fn version_parts(version: &str) -> Vec<u64> {
    version
        .trim()
        .split('.')
        .filter(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()))
        .filter_map(|part| part.parse().ok())
        .collect()
}

/// Compare two versions component by component, padding the shorter with zeros
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let (a, b) = (version_parts(a), version_parts(b));
    let len = a.len().max(b.len());

    (0..len)
        .map(|i| {
            let left = a.get(i).copied().unwrap_or(0);
            let right = b.get(i).copied().unwrap_or(0);
            left.cmp(&right)
        })
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// True when `available` is strictly newer than `current`
pub fn is_newer(current: &str, available: &str) -> bool {
    compare_versions(available, current) == Ordering::Greater
}
