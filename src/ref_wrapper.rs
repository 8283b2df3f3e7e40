//! §4.3.4 "Ref Wrapper": a lazy `(bucket, slot)` handle into a [`CVec`]
//! that only attaches/decompresses its bucket's context when actually
//! dereferenced.
//!
//! A C++ reference can alias two live mutable views of the same
//! container; Rust's borrow rules don't allow that, so a pairwise
//! compare/swap between two `RefWrapper`s here is realized as two short,
//! non-overlapping attach calls against `&mut CVec` (see
//! `CVec::compare_swap` in `crate::cvec`) rather than as two simultaneous
//! `&mut T` borrows. The `exclude` hint threaded through
//! [`crate::pool::ContextPool::attach_excluding`] is what keeps attaching
//! the second operand from evicting the first one's just-attached context.
///
/// [`CVec`]: crate::cvec::CVec
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RefWrapper {
    pub(crate) bucket: usize,
    pub(crate) slot: usize,
}

impl RefWrapper {
    #[inline]
    pub(crate) fn of(index: usize, block_size: usize) -> Self {
        Self {
            bucket: index / block_size,
            slot: index % block_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decomposes_index_into_bucket_and_slot() {
        assert_eq!(RefWrapper::of(0, 256), RefWrapper { bucket: 0, slot: 0 });
        assert_eq!(RefWrapper::of(255, 256), RefWrapper { bucket: 0, slot: 255 });
        assert_eq!(RefWrapper::of(256, 256), RefWrapper { bucket: 1, slot: 0 });
        assert_eq!(RefWrapper::of(1000, 256), RefWrapper { bucket: 3, slot: 232 });
    }
}
