//! Dotted version comparison.
//!
//! Versions are dot-separated non-negative integers of any length. Missing
//! trailing components count as `0`, so `1.2` and `1.2.0` are equal, and a
//! component that does not parse (`"1.x"`) also counts as `0`.

use std::cmp::Ordering;

fn component(part: &str) -> u64 {
    part.trim().parse().unwrap_or(0)
}

/// Compares two version strings component by component.
pub fn compare(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.').map(component);
    let mut right = b.split('.').map(component);

    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (l, r) => match l.unwrap_or(0).cmp(&r.unwrap_or(0)) {
                Ordering::Equal => continue,
                ord => return ord,
            },
        }
    }
}

/// [`compare`] as `-1`, `0` or `1`.
pub fn compare_i32(a: &str, b: &str) -> i32 {
    match compare(a, b) {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    }
}

/// Returns true if `candidate` is strictly newer than `current`.
pub fn is_newer(candidate: &str, current: &str) -> bool {
    compare(candidate, current) == Ordering::Greater
}

/// Strips one leading non-numeric marker from a release tag (`v1.2.0` → `1.2.0`).
pub fn strip_version_prefix(tag: &str) -> &str {
    let tag = tag.trim();
    match tag.chars().next() {
        Some(c) if !c.is_ascii_digit() => &tag[c.len_utf8()..],
        _ => tag,
    }
}
