// Arg-min over the children of a heap node.
//
// Sibling slices are at most `HEAP_ARITY` (8) long, so instead of a linear
// scan we run a small fixed tournament. Independent comparisons within a
// round don't depend on each other, which keeps the CPU busy.
//
// Ties go to the left-most candidate, so the result matches a linear scan
// that keeps the first minimum.

#[inline(always)]
#[must_use]
fn fight<T: PartialOrd>(a: &[T], l: usize, r: usize) -> usize {
    if a[l] <= a[r] { l } else { r }
}

// 0   1   2   3
// *   *   *   *
//  \ /     \ /
//   *       *
//    \     /
//       *
#[inline(always)]
#[must_use]
fn derank_4<T: PartialOrd>(a: &[T]) -> usize {
    fight(a, fight(a, 0, 1), fight(a, 2, 3))
}

/// Index of the smallest element of a sibling slice (1 to 8 elements).
///
/// ```
/// use astar::derank::derank;
/// assert_eq!(derank(&[3u8]), 0);
/// assert_eq!(derank(&[3u8, 1u8, 2u8]), 1);
/// assert_eq!(derank(&[3u8, 1u8, 2u8, 1u8, 9u8, 0u8, 7u8, 0u8]), 5);
/// ```
#[inline(always)]
#[must_use]
pub fn derank<T: PartialOrd>(a: &[T]) -> usize {
    debug_assert!(!a.is_empty(), "Can't derank an empty slice");
    match a.len() {
        1 => 0usize,
        2 => fight(a, 0, 1),
        3 => fight(a, fight(a, 0, 1), 2),
        4 => derank_4(a),
        5 => fight(a, derank_4(a), 4),
        6 => fight(a, derank_4(a), fight(a, 4, 5)),
        7 => fight(a, derank_4(a), fight(a, fight(a, 4, 5), 6)),
        8 => fight(a, derank_4(a), 4 + derank_4(&a[4..8])),
        _ => linear_min_index(a),
    }
}

pub fn linear_min_index<T: PartialOrd>(xs: &[T]) -> usize {
    assert!(!xs.is_empty());

    let mut min_i = 0;
    for (i, x) in xs.iter().enumerate() {
        if *x < xs[min_i] {
            min_i = i;
        }
    }
    min_i
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_linear_scan_on_every_length() {
        let a = [6u8, 5u8, 7u8, 2u8, 4u8, 1u8, 3u8, 0u8];
        for len in 1..=a.len() {
            assert_eq!(derank(&a[..len]), linear_min_index(&a[..len]), "len={len}");
        }
    }

    #[test]
    fn ties_go_left() {
        assert_eq!(derank(&[1u8, 0u8, 0u8]), 1);
        assert_eq!(derank(&[0u8, 0u8, 0u8, 0u8, 0u8, 0u8, 0u8, 0u8]), 0);
        assert_eq!(derank(&[2u8, 2u8, 2u8, 2u8, 1u8, 2u8, 1u8, 1u8]), 4);
    }

    #[test]
    fn longer_slices_fall_back() {
        let a = vec![
            1u8, 5u8, 0u8, 5u8, 0u8, 4u8, 4u8, 6u8, 3u8, 7u8, 2u8, 1u8, 6u8, 3u8, 7u8, 2u8,
        ];
        assert_eq!(derank(&a), linear_min_index(&a));
    }
}
