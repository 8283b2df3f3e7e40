//! §4.5 stable merge-sort kernel. Generic over any `&mut [T]` with a total
//! order; operates on any movable type, not just `Relocatable` ones (§9
//! "model it as a trait 'relocatable' ...; fall back to conditional-swap /
//! forward merge for all others"). Grounded on
//! `examples/other_examples/3eef187c_dureuill-sort-research-rs__..._hoare_block_butterfly.rs.rs`
//! for the unsafe/branchless idiom, and on
//! `examples/original_source/seq/algorithm.hpp` for the overall kernel
//! shape (leaves → adaptive merge → ping-pong k-way combine → wave
//! short-circuit).
//!
//! There are two entry points. [`net_sort`] is the general one: its leaf
//! step is a plain compare-then-`slice.swap`, and its merge passes move
//! elements via `ptr::read`/`ptr::write` exactly the way `Vec::remove`
//! does internally — sound for any `T`, `Relocatable` or not. [`net_sort_relocatable`]
//! additionally swaps the leading 8-element network through
//! [`leaves::cond_swap`]'s branchless byte blend, which is only sound when
//! `T`'s bytes alone determine its value.

mod leaves;
mod merge;
mod pingpong;
mod wave;

pub use crate::config::BufferHint;

use crate::relocatable::Relocatable;
use core::cmp::Ordering;

/// Sorts `slice` in place, stably, using `cmp` as the ordering and `hint`
/// to tune how much scratch memory the internal adaptive merges may use.
/// Works for any movable `T`, including types with a custom `Drop` (e.g.
/// `String`, `Vec<u8>`): every internal relocation is a genuine move (a
/// `ptr::read` paired with never re-reading the source), never a
/// byte-level reinterpretation.
pub fn net_sort<T, F>(slice: &mut [T], hint: BufferHint, mut cmp: F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    if slice.len() < 2 {
        return;
    }
    if wave::try_wave_sort(slice, hint, &mut cmp) {
        return;
    }
    sort_quarters(slice, hint, &mut cmp);
}

fn sort_quarters<T, F>(slice: &mut [T], hint: BufferHint, cmp: &mut F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    let len = slice.len();
    if len <= 8 {
        leaves::sort_small(slice, cmp);
        return;
    }
    if len < 16 {
        leaves::insertion_sort(slice, cmp);
        return;
    }

    let q = len / 4;
    let (s0, rest) = slice.split_at_mut(q);
    let (s1, rest) = rest.split_at_mut(q);
    let (s2, s3) = rest.split_at_mut(q);

    sort_quarters(s0, hint, cmp);
    sort_quarters(s1, hint, cmp);
    sort_quarters(s2, hint, cmp);
    sort_quarters(s3, hint, cmp);

    let b0 = s0.len();
    let b1 = b0 + s1.len();
    let b2 = b1 + s2.len();
    pingpong::merge4(slice, &[b0, b1, b2], cmp);
}

/// Like [`net_sort`], but for `T: Relocatable` elements: the size-8 leaf
/// network swaps via a branchless byte blend ([`leaves::cond_swap`])
/// instead of a data-dependent branch, trading a slightly larger code path
/// for predictable branching on POD-shaped data (§9's relocatable fast
/// path). Everything else — the wave short-circuit, the quarter
/// recursion's non-leaf levels, and all merge passes — is shared with
/// `net_sort`, since none of them depend on byte-level relocation.
pub fn net_sort_relocatable<T, F>(slice: &mut [T], hint: BufferHint, mut cmp: F)
where
    T: Relocatable,
    F: FnMut(&T, &T) -> Ordering,
{
    if slice.len() < 2 {
        return;
    }
    if wave::try_wave_sort(slice, hint, &mut cmp) {
        return;
    }
    sort_quarters_relocatable(slice, hint, &mut cmp);
}

fn sort_quarters_relocatable<T: Relocatable, F>(slice: &mut [T], hint: BufferHint, cmp: &mut F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    let len = slice.len();
    if len <= 8 {
        leaves::sort_small_relocatable(slice, cmp);
        return;
    }
    if len < 16 {
        leaves::insertion_sort(slice, cmp);
        return;
    }

    let q = len / 4;
    let (s0, rest) = slice.split_at_mut(q);
    let (s1, rest) = rest.split_at_mut(q);
    let (s2, s3) = rest.split_at_mut(q);

    sort_quarters_relocatable(s0, hint, cmp);
    sort_quarters_relocatable(s1, hint, cmp);
    sort_quarters_relocatable(s2, hint, cmp);
    sort_quarters_relocatable(s3, hint, cmp);

    let b0 = s0.len();
    let b1 = b0 + s1.len();
    let b2 = b1 + s2.len();
    pingpong::merge4(slice, &[b0, b1, b2], cmp);
}

/// Merges two already-sorted runs `slice[..mid]` / `slice[mid..]` in
/// place, choosing a buffered or buffer-free strategy per `hint` (§4.5.6).
/// Exposed for direct use (e.g. merging two independently-sorted buckets)
/// without re-sorting already-ordered input through [`net_sort`].
pub fn merge_adaptive<T, F>(slice: &mut [T], mid: usize, hint: BufferHint, mut cmp: F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    merge::merge_adaptive(slice, mid, hint, &mut cmp)
}
