//! §3 "Bucket": one block's compressed storage plus its optional attached
//! [`Context`](crate::context::Context). Generalizes the teacher's
//! `Bucket<T>` (a fixed-capacity `Vec<T>`) into a compressed byte blob with
//! a lazily-attached decompression scratch.

use crate::context::ContextId;
use parking_lot::RwLock;

/// Externally-visible per-bucket lock (§5): `CVec`'s own operations never
/// block on it, but callers that partition work by bucket index can take
/// it to coordinate among themselves. Exposed as a contract the container
/// consumes (via `try_write` during eviction, so a bucket an external
/// caller is holding is never stolen), not a synchronization primitive the
/// container depends on for its own correctness.
pub(crate) type BucketLock = RwLock<()>;

pub(crate) struct Bucket {
    /// Last-synced compressed bytes. Authoritative whenever `ctx` is `None`
    /// or the attached context is clean; may be behind the context's live
    /// contents while the context is dirty.
    pub(crate) compressed: alloc::vec::Vec<u8>,
    /// Number of valid elements in this bucket (`BLOCK_SIZE` except
    /// possibly the container's last bucket, §3 invariant 5).
    pub(crate) size: usize,
    /// The attached scratch context, if any (§4.3).
    pub(crate) ctx: Option<ContextId>,
    pub(crate) lock: BucketLock,
}

impl Bucket {
    pub(crate) fn new_empty() -> Self {
        Self {
            compressed: alloc::vec::Vec::new(),
            size: 0,
            ctx: None,
            lock: RwLock::new(()),
        }
    }

    pub(crate) fn is_full(&self, block_size: usize) -> bool {
        self.size >= block_size
    }
}
