//! §4.3 context pool: a bounded, intrusively-linked set of decompression
//! scratch buffers shared across all of a container's buckets.
//!
//! Modeled as an arena of [`Context`]s (`slots`) plus a doubly linked list
//! of arena indices (`head`/`tail`, and each context's own `left`/`right`)
//! rather than raw pointers, per `SPEC_FULL.md`'s note on avoiding
//! self-referential structures in safe Rust. `head` is the most-recently
//! touched context; eviction scans from `tail`. Grounded on the teacher's
//! own `Vec<Bucket<T>>` arena-of-fixed-slots shape (`src/lib.rs`), extended
//! with the intrusive-list bookkeeping `other_examples` LRU-cache-shaped
//! files (e.g. slab/slotmap-style arenas) use for the same purpose.

use crate::bucket::Bucket;
use crate::codec::{Codec, BLOCK_LEN};
use crate::context::{Context, ContextId};
use crate::error::ContainerError;
use crate::relocatable::Relocatable;
use alloc::vec::Vec;

pub(crate) struct ContextPool<T> {
    slots: Vec<Option<Context<T>>>,
    free: Vec<ContextId>,
    head: Option<ContextId>,
    tail: Option<ContextId>,
    live: usize,
    /// §4.3.3 dispersion heuristic: `+512` per decompression (a cache
    /// miss worth attaching), `-4` per write (churn that erodes the
    /// benefit of keeping contexts resident). Negative values make the
    /// pool shrink harder than strictly necessary when it next has to
    /// steal a slot.
    dispersion: i16,
}

impl<T: Relocatable> ContextPool<T> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            live: 0,
            dispersion: 0,
        }
    }

    pub(crate) fn live_count(&self) -> usize {
        self.live
    }

    fn unlink(&mut self, id: ContextId) {
        let (left, right) = {
            let ctx = self.slots[id].as_ref().unwrap();
            (ctx.left, ctx.right)
        };
        match left {
            Some(l) => self.slots[l].as_mut().unwrap().right = right,
            None => self.head = right,
        }
        match right {
            Some(r) => self.slots[r].as_mut().unwrap().left = left,
            None => self.tail = left,
        }
        let ctx = self.slots[id].as_mut().unwrap();
        ctx.left = None;
        ctx.right = None;
    }

    fn push_front(&mut self, id: ContextId) {
        let old_head = self.head;
        {
            let ctx = self.slots[id].as_mut().unwrap();
            ctx.left = None;
            ctx.right = old_head;
        }
        if let Some(h) = old_head {
            self.slots[h].as_mut().unwrap().left = Some(id);
        }
        self.head = Some(id);
        if self.tail.is_none() {
            self.tail = Some(id);
        }
    }

    /// Moves `id` to the front (most-recently-used position).
    fn touch(&mut self, id: ContextId) {
        self.unlink(id);
        self.push_front(id);
    }

    fn alloc_slot(&mut self, bucket_index: usize) -> ContextId {
        let ctx = Context::new(BLOCK_LEN, bucket_index);
        if let Some(id) = self.free.pop() {
            self.slots[id] = Some(ctx);
            id
        } else {
            self.slots.push(Some(ctx));
            self.slots.len() - 1
        }
    }

    fn free_slot(&mut self, id: ContextId) {
        self.slots[id] = None;
        self.free.push(id);
    }

    pub(crate) fn get(&self, id: ContextId) -> &Context<T> {
        self.slots[id].as_ref().expect("dangling context id")
    }

    pub(crate) fn get_mut(&mut self, id: ContextId) -> &mut Context<T> {
        self.slots[id].as_mut().expect("dangling context id")
    }

    /// Tries to evict exactly one context from the tail whose owning
    /// bucket's lock is currently acquirable (§5: never steal a bucket an
    /// external caller holds). Recompresses it first if dirty. Returns
    /// whether a context was evicted.
    fn evict_one<C: Codec>(
        &mut self,
        buckets: &mut [Bucket],
        bpp: usize,
        acceleration: u8,
    ) -> Result<bool, ContainerError> {
        self.evict_one_excluding::<C>(buckets, bpp, acceleration, None)
    }

    /// Like `evict_one`, but never steals `exclude` (§4.3.4: the pairwise
    /// `compare`/`swap` used by the sort kernel attaches two bucket
    /// contexts in turn and must not let attaching the second one evict
    /// the first).
    fn evict_one_excluding<C: Codec>(
        &mut self,
        buckets: &mut [Bucket],
        bpp: usize,
        acceleration: u8,
        exclude: Option<ContextId>,
    ) -> Result<bool, ContainerError> {
        let mut cursor = self.tail;
        while let Some(id) = cursor {
            cursor = self.get(id).left;
            if Some(id) == exclude {
                continue;
            }
            let ctx = self.get(id);
            if ctx.size != 0 && ctx.size != BLOCK_LEN {
                // Partial-last-bucket context (§4.3.2 "Evictable" is
                // `size ∈ {0, B}`): its compressed form must not exist
                // (Data Model Invariant 5), so it can never be evicted.
                continue;
            }
            let bucket_index = ctx.bucket_index;
            if buckets[bucket_index].lock.try_write().is_none() {
                continue;
            }
            self.evict_id::<C>(id, buckets, bpp, acceleration)?;
            return Ok(true);
        }
        Ok(false)
    }

    fn evict_id<C: Codec>(
        &mut self,
        id: ContextId,
        buckets: &mut [Bucket],
        bpp: usize,
        acceleration: u8,
    ) -> Result<(), ContainerError> {
        self.sync_to_bucket::<C>(id, buckets, bpp, acceleration)?;
        let bucket_index = self.get(id).bucket_index;
        self.unlink(id);
        self.free_slot(id);
        self.live -= 1;
        buckets[bucket_index].ctx = None;
        Ok(())
    }

    /// Recompresses a dirty context's contents back into its bucket's
    /// `compressed` field. No-op if the context is clean.
    fn sync_to_bucket<C: Codec>(
        &mut self,
        id: ContextId,
        buckets: &mut [Bucket],
        bpp: usize,
        acceleration: u8,
    ) -> Result<(), ContainerError> {
        let ctx = self.get_mut(id);
        if !ctx.dirty {
            return Ok(());
        }
        let bucket_index = ctx.bucket_index;
        let live_size = ctx.size;
        let src = &self.get(id).as_bytes()[..live_size * bpp];
        // A partial block (the container's still-open last bucket) can
        // never go through the codec: its transpose step assumes exactly
        // `BLOCK_LEN` elements. Stored raw unconditionally (§6).
        let encoded = if live_size < BLOCK_LEN {
            src.to_vec()
        } else {
            let max_len = crate::codec::max_encoded_len(bpp);
            let mut dst = alloc::vec![0u8; max_len];
            match C::encode(src, bpp, acceleration, &mut dst) {
                Ok(n) => {
                    dst.truncate(n);
                    dst
                }
                Err(_) => {
                    tracing::debug!(bucket_index, "codec overflow on evict, storing raw");
                    src.to_vec()
                }
            }
        };
        buckets[bucket_index].compressed = encoded;
        let ctx = self.get_mut(id);
        ctx.dirty = false;
        Ok(())
    }

    /// Ensures `bucket_index`'s context is attached and at the front of
    /// the LRU list, decompressing it if necessary. Evicts from the tail
    /// (recompressing dirty victims) and, when the pool's dispersion
    /// heuristic (§4.3.3) is negative, shrinks one slot further than
    /// strictly needed.
    pub(crate) fn attach<C: Codec>(
        &mut self,
        bucket_index: usize,
        buckets: &mut [Bucket],
        bpp: usize,
        acceleration: u8,
        ceiling: usize,
    ) -> Result<ContextId, ContainerError> {
        self.attach_excluding::<C>(bucket_index, buckets, bpp, acceleration, ceiling, None)
    }

    /// Like `attach`, but the context identified by `exclude` (if any,
    /// typically the other operand of a pairwise compare/swap) is never
    /// chosen as an eviction victim to make room for this attach.
    pub(crate) fn attach_excluding<C: Codec>(
        &mut self,
        bucket_index: usize,
        buckets: &mut [Bucket],
        bpp: usize,
        acceleration: u8,
        ceiling: usize,
        exclude: Option<ContextId>,
    ) -> Result<ContextId, ContainerError> {
        if let Some(id) = buckets[bucket_index].ctx {
            self.touch(id);
            return Ok(id);
        }

        let mut target_ceiling = ceiling.max(1);
        if self.dispersion < 0 && target_ceiling > 1 {
            target_ceiling -= 1;
        }
        while self.live >= target_ceiling {
            if !self.evict_one_excluding::<C>(buckets, bpp, acceleration, exclude)? {
                break;
            }
        }

        let id = self.alloc_slot(bucket_index);
        let size = buckets[bucket_index].size;
        {
            let ctx = self.get_mut(id);
            ctx.size = size;
            let compressed = &buckets[bucket_index].compressed;
            if compressed.is_empty() {
                // Bucket has never been compressed (freshly created last
                // bucket): its scratch is already zero-initialized, and
                // there is nothing to restore.
            } else if size < BLOCK_LEN {
                // Partial blocks are always stored raw (§6).
                let needed = ctx_byte_len_raw(size, bpp);
                ctx.as_bytes_mut()[..needed].copy_from_slice(compressed);
            } else {
                let needed = ctx_byte_len_raw(size, bpp);
                let dst = &mut ctx.as_bytes_mut()[..needed];
                C::decode(compressed, bpp, dst).map_err(ContainerError::from)?;
            }
        }
        self.live += 1;
        self.push_front(id);
        buckets[bucket_index].ctx = Some(id);
        self.dispersion = self.dispersion.saturating_add(512);
        tracing::trace!(bucket_index, live = self.live, "context attached");
        Ok(id)
    }

    pub(crate) fn mark_write(&mut self, id: ContextId) {
        self.get_mut(id).dirty = true;
        self.dispersion = self.dispersion.saturating_sub(4);
    }

    /// Forces every live context back down to `ceiling`, recompressing
    /// dirty ones (§4.3.5 `shrink_to_fit`).
    pub(crate) fn shrink_to<C: Codec>(
        &mut self,
        buckets: &mut [Bucket],
        bpp: usize,
        acceleration: u8,
        ceiling: usize,
    ) -> Result<(), ContainerError> {
        while self.live > ceiling.max(1) {
            if !self.evict_one::<C>(buckets, bpp, acceleration)? {
                break;
            }
        }
        Ok(())
    }

    /// Recompresses and detaches every live context (used when the
    /// container itself is dropped or fully cleared).
    pub(crate) fn evict_all<C: Codec>(
        &mut self,
        buckets: &mut [Bucket],
        bpp: usize,
        acceleration: u8,
    ) -> Result<(), ContainerError> {
        while self.evict_one::<C>(buckets, bpp, acceleration)? {}
        Ok(())
    }

    /// Discards a single live context without recompressing, dropping its
    /// contained elements (used when the container's trailing empty bucket
    /// is popped off, e.g. by `CVec::pop_back`).
    pub(crate) fn discard_one(&mut self, id: ContextId) {
        self.unlink(id);
        self.free_slot(id);
        self.live -= 1;
    }

    /// Discards every live context without recompressing, dropping their
    /// contained elements along the way (used by `CVec::clear`).
    pub(crate) fn discard_all(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
        self.live = 0;
        self.dispersion = 0;
    }

    /// Total bytes held by live contexts' scratch buffers, for
    /// `CVec::memory_footprint`.
    pub(crate) fn live_context_bytes(&self) -> usize {
        self.slots
            .iter()
            .filter_map(|s| s.as_ref())
            .map(|c| c.byte_len())
            .sum()
    }
}

fn ctx_byte_len_raw(size: usize, bpp: usize) -> usize {
    size * bpp
}
