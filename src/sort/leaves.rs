//! §4.5.1/§4.5.2 leaf strategies: insertion sort for small ranges and a
//! fixed Batcher odd-even sorting network for exactly 8 elements.
//!
//! Both leaves come in two flavors: a plain one that works for any movable
//! `T` (used by [`super::net_sort`]), and a `Relocatable`-only one that
//! swaps via [`cond_swap`]'s branchless byte blend instead of a
//! data-dependent branch (used by [`super::net_sort_relocatable`], §9).

use crate::relocatable::Relocatable;
use core::cmp::Ordering;
use core::mem::size_of;

const STAGES: &[&[(usize, usize)]] = &[
    &[(0, 1), (2, 3), (4, 5), (6, 7)],
    &[(0, 2), (1, 3), (4, 6), (5, 7)],
    &[(1, 2), (5, 6)],
    &[(0, 4), (1, 5), (2, 6), (3, 7)],
    &[(2, 4), (3, 5)],
    &[(1, 2), (3, 4), (5, 6)],
];

/// Branchless-ish conditional swap (§4.5.3): swaps `a` and `b` byte-by-byte
/// using an XOR mask instead of a data-dependent branch, which keeps the
/// sort kernel's inner loop free of hard-to-predict conditional jumps on
/// `Relocatable` element types.
pub(crate) fn cond_swap<T: Relocatable>(a: &mut T, b: &mut T, swap: bool) {
    let mask: u8 = if swap { 0xFF } else { 0x00 };
    let n = size_of::<T>();
    unsafe {
        let ap = a as *mut T as *mut u8;
        let bp = b as *mut T as *mut u8;
        for i in 0..n {
            let av = *ap.add(i);
            let bv = *bp.add(i);
            let x = (av ^ bv) & mask;
            *ap.add(i) = av ^ x;
            *bp.add(i) = bv ^ x;
        }
    }
}

/// Stable insertion sort. Used for ranges shorter than 16 elements (§4.5.1)
/// and as the fallback leaf for sizes other than exactly 8.
pub(crate) fn insertion_sort<T, F>(slice: &mut [T], cmp: &mut F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    for i in 1..slice.len() {
        let mut j = i;
        while j > 0 && cmp(&slice[j - 1], &slice[j]) == Ordering::Greater {
            slice.swap(j - 1, j);
            j -= 1;
        }
    }
}

/// Batcher odd-even sorting network for exactly 8 elements (19
/// compare-exchanges), used in place of insertion sort for size-8 leaves
/// since its comparator sequence has no data-dependent branches.
fn sort8_network<T, F>(slice: &mut [T], cmp: &mut F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    debug_assert_eq!(slice.len(), 8);
    for stage in STAGES {
        for &(i, j) in *stage {
            if cmp(&slice[i], &slice[j]) == Ordering::Greater {
                slice.swap(i, j);
            }
        }
    }
}

/// Same network as [`sort8_network`], but the compare-exchange at each step
/// uses [`cond_swap`]'s branchless byte blend rather than a data-dependent
/// `slice.swap`. Only sound for `Relocatable` elements.
fn sort8_network_relocatable<T: Relocatable, F>(slice: &mut [T], cmp: &mut F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    debug_assert_eq!(slice.len(), 8);
    for stage in STAGES {
        for &(i, j) in *stage {
            let should_swap = cmp(&slice[i], &slice[j]) == Ordering::Greater;
            let (head, tail) = slice.split_at_mut(j);
            cond_swap(&mut head[i], &mut tail[0], should_swap);
        }
    }
}

/// Leaf dispatcher: the sorting network for exactly 8 elements, insertion
/// sort otherwise.
pub(crate) fn sort_small<T, F>(slice: &mut [T], cmp: &mut F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    if slice.len() == 8 {
        sort8_network(slice, cmp);
    } else {
        insertion_sort(slice, cmp);
    }
}

/// Like [`sort_small`], but dispatches to [`sort8_network_relocatable`] for
/// the size-8 case.
pub(crate) fn sort_small_relocatable<T: Relocatable, F>(slice: &mut [T], cmp: &mut F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    if slice.len() == 8 {
        sort8_network_relocatable(slice, cmp);
    } else {
        insertion_sort(slice, cmp);
    }
}
