//! §3 "Context": a `B`-slot scratch holding a bucket's live, decompressed
//! elements.
//!
//! Storage is kept as a raw byte buffer (`B * BPP` bytes) rather than
//! `Vec<T>` so the codec can operate on it directly without an
//! intermediate copy; single-element access goes through `ptr::read`/
//! `ptr::write` guarded by the `Relocatable` bound. This mirrors the
//! teacher's `Bucket<T>` (`src/bucket.rs`) holding a fixed-capacity
//! `entries: Vec<T>`, generalized to a byte-addressable scratch because the
//! codec, not `Vec<T>`'s own growth, owns this memory's layout.

use crate::relocatable::Relocatable;
use alloc::vec;
use alloc::vec::Vec;
use core::marker::PhantomData;
use core::mem::size_of;
use core::ptr;

pub(crate) type ContextId = usize;

pub(crate) struct Context<T> {
    storage: Vec<u8>,
    /// Number of valid elements. `BLOCK_SIZE` for every context except one
    /// attached to the container's partial last bucket (§3 invariant 5).
    pub(crate) size: usize,
    pub(crate) dirty: bool,
    pub(crate) bucket_index: usize,
    pub(crate) left: Option<ContextId>,
    pub(crate) right: Option<ContextId>,
    _marker: PhantomData<T>,
}

impl<T: Relocatable> Context<T> {
    pub(crate) fn new(block_size: usize, bucket_index: usize) -> Self {
        Self {
            storage: vec![0u8; block_size * size_of::<T>()],
            size: 0,
            dirty: false,
            bucket_index,
            left: None,
            right: None,
            _marker: PhantomData,
        }
    }

    #[inline]
    fn slot_ptr(&self, slot: usize) -> *const T {
        debug_assert!(slot * size_of::<T>() + size_of::<T>() <= self.storage.len());
        unsafe { self.storage.as_ptr().add(slot * size_of::<T>()) as *const T }
    }

    #[inline]
    fn slot_ptr_mut(&mut self, slot: usize) -> *mut T {
        debug_assert!(slot * size_of::<T>() + size_of::<T>() <= self.storage.len());
        unsafe { self.storage.as_mut_ptr().add(slot * size_of::<T>()) as *mut T }
    }

    /// Reads the element at `slot`. `slot` must be `< self.size`.
    pub(crate) fn get(&self, slot: usize) -> &T {
        debug_assert!(slot < self.size);
        unsafe { &*self.slot_ptr(slot) }
    }

    pub(crate) fn get_mut(&mut self, slot: usize) -> &mut T {
        debug_assert!(slot < self.size);
        unsafe { &mut *self.slot_ptr_mut(slot) }
    }

    /// Writes `value` into a slot that holds no live element yet (`slot >=`
    /// the size at time of call, e.g. `push_back`'s new last slot). Does
    /// not run any destructor on the slot's previous bytes.
    pub(crate) fn init(&mut self, slot: usize, value: T) {
        unsafe { ptr::write(self.slot_ptr_mut(slot), value) };
    }

    /// Overwrites the element at `slot`, which must already hold a live
    /// element; the old value is dropped first.
    pub(crate) fn assign(&mut self, slot: usize, value: T) {
        debug_assert!(slot < self.size);
        let ptr = self.slot_ptr_mut(slot);
        unsafe {
            ptr::drop_in_place(ptr);
            ptr::write(ptr, value);
        }
    }

    /// Moves the element at `slot` out. The caller is responsible for
    /// shrinking `size` so the slot is never read again without a new
    /// `init`.
    pub(crate) fn take(&mut self, slot: usize) -> T {
        debug_assert!(slot < self.size);
        unsafe { ptr::read(self.slot_ptr(slot)) }
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.storage
    }

    pub(crate) fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.storage
    }

    pub(crate) fn byte_len(&self) -> usize {
        self.storage.len()
    }
}

impl<T> Drop for Context<T> {
    fn drop(&mut self) {
        for slot in 0..self.size {
            unsafe {
                ptr::drop_in_place(self.storage.as_mut_ptr().add(slot * size_of::<T>()) as *mut T);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_then_get() {
        let mut ctx: Context<u32> = Context::new(256, 0);
        ctx.init(0, 7u32);
        ctx.size = 1;
        assert_eq!(*ctx.get(0), 7);
    }

    #[test]
    fn assign_overwrites() {
        let mut ctx: Context<u32> = Context::new(256, 0);
        ctx.init(0, 7u32);
        ctx.size = 1;
        ctx.assign(0, 9u32);
        assert_eq!(*ctx.get(0), 9);
    }

    #[test]
    fn take_moves_out() {
        let mut ctx: Context<u32> = Context::new(256, 0);
        ctx.init(0, 11u32);
        ctx.size = 1;
        let v = ctx.take(0);
        ctx.size = 0;
        assert_eq!(v, 11);
    }

    #[test]
    fn byte_view_round_trips_through_codec_layer() {
        let mut ctx: Context<u32> = Context::new(256, 0);
        for i in 0..256 {
            ctx.init(i, (i as u32) * 3);
        }
        ctx.size = 256;
        let bytes = ctx.as_bytes().to_vec();
        let mut ctx2: Context<u32> = Context::new(256, 0);
        ctx2.as_bytes_mut().copy_from_slice(&bytes);
        ctx2.size = 256;
        for i in 0..256 {
            assert_eq!(*ctx2.get(i), (i as u32) * 3);
        }
    }
}
