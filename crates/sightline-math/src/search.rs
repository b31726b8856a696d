//! Binary search over an ordered sequence with an encoded miss result.
//!
//! Unlike the standard library's `binary_search_by`, a miss is reported
//! as the bitwise complement of the insertion point, so a single signed
//! value carries both outcomes: `>= 0` is an exact match index, `< 0`
//! decodes with `!` to the index where the target would be inserted to
//! keep the sequence ordered.

use std::cmp::Ordering;

/// Search a sorted slice using `probe`, which compares an element
/// against the implicit target (`Less` when the element sorts before
/// the target).
///
/// Returns the index of an exact match, or `!p` where `p` is the
/// insertion point. With duplicate matches, any matching index may be
/// returned.
pub fn search_by<T, F>(items: &[T], mut probe: F) -> isize
where
    F: FnMut(&T) -> Ordering,
{
    let mut lo: usize = 0;
    let mut hi: usize = items.len();
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        match probe(&items[mid]) {
            Ordering::Less => lo = mid + 1,
            Ordering::Greater => hi = mid,
            Ordering::Equal => return mid as isize,
        }
    }
    !(lo as isize)
}

/// Decode a negative result of [`search_by`] back to its insertion point.
pub fn decode_insertion(encoded: isize) -> usize {
    debug_assert!(encoded < 0);
    !encoded as usize
}
