//! §3/§4.3/§6: the `CVec` container itself — a bucket table, a shared
//! context pool, and the wire format that ties them to storage.

use crate::bucket::Bucket;
use crate::codec::{ActiveCodec, BLOCK_LEN};
use crate::config::CVecConfig;
use crate::error::{ContainerError, Result};
use crate::pool::ContextPool;
use crate::ref_wrapper::RefWrapper;
use crate::relocatable::{bpp, Relocatable};
use crate::varint;
use alloc::vec::Vec;
use core::cell::Cell;
use core::cmp::Ordering;
use core::marker::PhantomData;
use core::mem::size_of;

/// A random-access sequence that stores its elements compressed in fixed
/// `BLOCK_LEN`-element buckets and decompresses only a bounded number of
/// them at a time into a shared context pool (§4.3).
pub struct CVec<T, C: CVecConfig = crate::config::DefaultConfig> {
    buckets: Vec<Bucket>,
    pool: ContextPool<T>,
    len: usize,
    /// Largest `memory_footprint()` ever observed, per `original_source`'s
    /// own high-water-mark counter (not used for any control-flow
    /// decision, only reporting).
    peak_footprint: Cell<usize>,
    _config: PhantomData<fn() -> C>,
}

impl<T: Relocatable, C: CVecConfig> Default for CVec<T, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Relocatable, C: CVecConfig> CVec<T, C> {
    pub fn new() -> Self {
        debug_assert_eq!(
            C::BLOCK_SIZE,
            BLOCK_LEN,
            "CVecConfig::BLOCK_SIZE must match the codec's fixed block width"
        );
        Self {
            buckets: Vec::new(),
            pool: ContextPool::new(),
            len: 0,
            peak_footprint: Cell::new(0),
            _config: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of live decompressed contexts currently resident (§4.3.2).
    pub fn resident_contexts(&self) -> usize {
        self.pool.live_count()
    }

    /// The per-bucket lock (§5): external callers that partition work by
    /// bucket index can take this to coordinate among themselves; `CVec`'s
    /// own operations only ever `try_write` it during eviction and never
    /// block on it.
    ///
    /// # Panics
    /// If `bucket >= ` the current bucket count.
    pub fn bucket_lock(&self, bucket: usize) -> &parking_lot::RwLock<()> {
        &self.buckets[bucket].lock
    }

    /// Returns an iterator that clones out each element in order (see
    /// `crate::iter::Iter` for why this yields owned values, not
    /// references).
    pub fn iter(&mut self) -> crate::iter::Iter<'_, T, C>
    where
        T: Clone,
    {
        crate::iter::Iter::new(self)
    }

    fn ceiling(&self) -> usize {
        C::MAX_CONTEXTS.resolve(self.buckets.len().max(1))
    }

    fn attach(&mut self, bucket: usize) -> Result<usize> {
        let ceiling = self.ceiling();
        self.pool
            .attach::<ActiveCodec<C>>(bucket, &mut self.buckets, bpp::<T>(), C::ACCELERATION, ceiling)
    }

    fn attach_excluding(&mut self, bucket: usize, exclude_bucket: usize) -> Result<usize> {
        let ceiling = self.ceiling();
        let exclude_id = self.buckets[exclude_bucket].ctx;
        self.pool.attach_excluding::<ActiveCodec<C>>(
            bucket,
            &mut self.buckets,
            bpp::<T>(),
            C::ACCELERATION,
            ceiling,
            exclude_id,
        )
    }

    /// Calls `f` with a reference to the element at `index`. This is the
    /// basic random-access primitive and, unlike [`Self::at`], does not
    /// require `T: Clone` (§3: "elements must be movable; copyability is
    /// optional") — `Context::get` already hands back a plain reference.
    ///
    /// # Panics
    /// If `index >= self.len()`.
    pub fn with_at<R>(&mut self, index: usize, f: impl FnOnce(&T) -> R) -> Result<R> {
        assert!(index < self.len, "CVec::with_at: index out of bounds");
        let rw = RefWrapper::of(index, BLOCK_LEN);
        let id = self.attach(rw.bucket)?;
        Ok(f(self.pool.get(id).get(rw.slot)))
    }

    /// Like [`Self::with_at`], but `f` sees a mutable reference and the
    /// context is marked dirty. Does not require `T: Clone`.
    ///
    /// # Panics
    /// If `index >= self.len()`.
    pub fn with_at_mut<R>(&mut self, index: usize, f: impl FnOnce(&mut T) -> R) -> Result<R> {
        assert!(index < self.len, "CVec::with_at_mut: index out of bounds");
        let rw = RefWrapper::of(index, BLOCK_LEN);
        let id = self.attach(rw.bucket)?;
        let result = f(self.pool.get_mut(id).get_mut(rw.slot));
        self.pool.mark_write(id);
        Ok(result)
    }

    /// Returns a clone of the element at `index`. Convenience wrapper
    /// around [`Self::with_at`] for `Clone` types; move-only types should
    /// use `with_at` directly.
    ///
    /// # Panics
    /// If `index >= self.len()`.
    pub fn at(&mut self, index: usize) -> Result<T>
    where
        T: Clone,
    {
        self.with_at(index, |v| v.clone())
    }

    /// Overwrites the element at `index`.
    ///
    /// # Panics
    /// If `index >= self.len()`.
    pub fn set(&mut self, index: usize, value: T) -> Result<()> {
        assert!(index < self.len, "CVec::set: index out of bounds");
        let rw = RefWrapper::of(index, BLOCK_LEN);
        let id = self.attach(rw.bucket)?;
        self.pool.get_mut(id).assign(rw.slot, value);
        self.pool.mark_write(id);
        Ok(())
    }

    pub fn front(&mut self) -> Result<T>
    where
        T: Clone,
    {
        self.at(0)
    }

    pub fn back(&mut self) -> Result<T>
    where
        T: Clone,
    {
        self.at(self.len - 1)
    }

    /// Appends `value` to the end (§4.3.5).
    ///
    /// Unlike the teacher's `push` (which panics on allocator failure via
    /// plain `Vec::push`), growing the bucket table here goes through
    /// `try_reserve` first so an allocation failure surfaces as
    /// `ContainerError::Alloc` instead of aborting (§7's basic-guarantee
    /// requirement).
    pub fn push_back(&mut self, value: T) -> Result<()> {
        if self.buckets.last().map_or(true, |b| b.is_full(BLOCK_LEN)) {
            self.buckets
                .try_reserve(1)
                .map_err(|_| ContainerError::Alloc)?;
            self.buckets.push(Bucket::new_empty());
        }
        let bucket = self.buckets.len() - 1;
        let id = self.attach(bucket)?;
        let slot = self.buckets[bucket].size;
        self.pool.get_mut(id).init(slot, value);
        self.pool.get_mut(id).size += 1;
        self.pool.mark_write(id);
        self.buckets[bucket].size += 1;
        self.len += 1;
        Ok(())
    }

    /// Removes and returns the last element, if any.
    pub fn pop_back(&mut self) -> Result<Option<T>> {
        if self.len == 0 {
            return Ok(None);
        }
        let bucket = self.buckets.len() - 1;
        let id = self.attach(bucket)?;
        let slot = self.buckets[bucket].size - 1;
        let value = self.pool.get_mut(id).take(slot);
        self.pool.get_mut(id).size -= 1;
        self.buckets[bucket].size -= 1;
        self.len -= 1;
        self.drop_empty_last_bucket();
        Ok(Some(value))
    }

    fn drop_empty_last_bucket(&mut self) {
        if let Some(last) = self.buckets.last() {
            if last.size == 0 {
                if let Some(id) = last.ctx {
                    self.pool.discard_one(id);
                }
                self.buckets.pop();
            }
        }
    }

    /// Inserts `value` at `index`, shifting everything at and after it
    /// one position to the right. `O(len - index)`.
    ///
    /// # Panics
    /// If `index > self.len()`.
    pub fn insert(&mut self, index: usize, value: T) -> Result<()>
    where
        T: Clone,
    {
        assert!(index <= self.len, "CVec::insert: index out of bounds");
        self.push_back(value.clone())?;
        let mut i = self.len - 1;
        while i > index {
            let v = self.at(i - 1)?;
            self.set(i, v)?;
            i -= 1;
        }
        self.set(index, value)?;
        Ok(())
    }

    /// Inserts every element yielded by `values` starting at `index`,
    /// shifting the existing tail right by the number of inserted elements
    /// (§6 External Interfaces: `insert(it, first, last)`). A no-op if
    /// `values` yields nothing. Returns `index`, the position of the first
    /// inserted element (or where one would have gone, if none were).
    ///
    /// # Panics
    /// If `index > self.len()`.
    pub fn insert_range<I>(&mut self, index: usize, values: I) -> Result<usize>
    where
        T: Clone,
        I: IntoIterator<Item = T>,
    {
        assert!(index <= self.len, "CVec::insert_range: index out of bounds");
        let mut i = index;
        for value in values {
            self.insert(i, value)?;
            i += 1;
        }
        Ok(index)
    }

    /// Removes and returns the element at `index`, shifting everything
    /// after it one position to the left. `O(len - index)`.
    ///
    /// # Panics
    /// If `index >= self.len()`.
    pub fn erase(&mut self, index: usize) -> Result<T>
    where
        T: Clone,
    {
        assert!(index < self.len, "CVec::erase: index out of bounds");
        let removed = self.at(index)?;
        for i in index + 1..self.len {
            let v = self.at(i)?;
            self.set(i - 1, v)?;
        }
        self.pop_back()?;
        Ok(removed)
    }

    /// Removes the half-open range `[start, end)`, shifting everything
    /// after `end` left to close the gap. A no-op when `start == end`.
    ///
    /// # Panics
    /// If `end < start` or `end > self.len()`.
    pub fn erase_range(&mut self, start: usize, end: usize) -> Result<()>
    where
        T: Clone,
    {
        assert!(start <= end, "CVec::erase_range: start must not exceed end");
        assert!(end <= self.len, "CVec::erase_range: end out of bounds");
        if start == end {
            return Ok(());
        }
        let removed = end - start;
        for i in end..self.len {
            let v = self.at(i)?;
            self.set(i - removed, v)?;
        }
        for _ in 0..removed {
            self.pop_back()?;
        }
        Ok(())
    }

    /// Grows or shrinks the container to `new_len`, filling new slots with
    /// clones of `value`.
    pub fn resize(&mut self, new_len: usize, value: T) -> Result<()>
    where
        T: Clone,
    {
        while self.len < new_len {
            self.push_back(value.clone())?;
        }
        while self.len > new_len {
            self.pop_back()?;
        }
        Ok(())
    }

    /// Removes every element, dropping any live decompressed contexts
    /// along the way (their contained elements are dropped exactly once,
    /// by `Context`'s own `Drop` impl).
    pub fn clear(&mut self) {
        self.pool.discard_all();
        self.buckets.clear();
        self.len = 0;
    }

    /// Forces every live context back down to the configured ceiling,
    /// recompressing dirty ones.
    pub fn shrink_to_fit(&mut self) -> Result<()> {
        let ceiling = self.ceiling();
        self.pool
            .shrink_to::<ActiveCodec<C>>(&mut self.buckets, bpp::<T>(), C::ACCELERATION, ceiling)
    }

    /// Total bytes currently resident: compressed bucket storage plus
    /// live decompressed scratch contexts. Also updates the high-water
    /// mark returned by `peak_memory_footprint`.
    pub fn memory_footprint(&self) -> usize {
        let compressed: usize = self.buckets.iter().map(|b| b.compressed.len()).sum();
        let current = compressed + self.pool.live_context_bytes();
        if current > self.peak_footprint.get() {
            self.peak_footprint.set(current);
        }
        current
    }

    /// Largest `memory_footprint()` this container has ever reported.
    pub fn peak_memory_footprint(&self) -> usize {
        self.memory_footprint();
        self.peak_footprint.get()
    }

    /// `memory_footprint() / (len * size_of::<T>())`, i.e. how much of the
    /// raw uncompressed size this container currently occupies. `1.0` for
    /// an empty container.
    pub fn compression_ratio(&self) -> f64 {
        let raw = self.len * size_of::<T>();
        if raw == 0 {
            return 1.0;
        }
        self.memory_footprint() as f64 / raw as f64
    }

    /// Compares the elements at `i` and `j`, swapping them if `less`
    /// indicates `j`'s is ordered before `i`'s. This is the container-side
    /// half of §4.3.4's pairwise Ref Wrapper compare/swap: both buckets are
    /// attached (excluding each other from eviction) for the duration of
    /// the comparator call, exactly as §8 scenario 6 requires. Both
    /// elements are moved out via `Context::take` and back via
    /// `Context::init`, so no `T: Clone` bound is needed — this is the
    /// principal primitive the merge-sort kernel (§4.5/[`Self::sort_by`])
    /// drives directly, and it is exposed for callers building their own
    /// sort/selection kernels over a `CVec` without materializing it into
    /// a buffer first.
    ///
    /// Returns whether a swap occurred.
    pub fn compare_swap<F>(&mut self, i: usize, j: usize, mut less: F) -> Result<bool>
    where
        F: FnMut(&T, &T) -> bool,
    {
        if i == j {
            return Ok(false);
        }
        let ri = RefWrapper::of(i, BLOCK_LEN);
        let rj = RefWrapper::of(j, BLOCK_LEN);
        let (id_i, id_j) = if ri.bucket == rj.bucket {
            let id = self.attach(ri.bucket)?;
            (id, id)
        } else {
            let id_i = self.attach(ri.bucket)?;
            let id_j = self.attach_excluding(rj.bucket, ri.bucket)?;
            (id_i, id_j)
        };
        let vi = self.pool.get_mut(id_i).take(ri.slot);
        let vj = self.pool.get_mut(id_j).take(rj.slot);
        let swap = less(&vj, &vi);
        if swap {
            self.pool.get_mut(id_i).init(ri.slot, vj);
            self.pool.get_mut(id_j).init(rj.slot, vi);
            self.pool.mark_write(id_i);
            self.pool.mark_write(id_j);
        } else {
            self.pool.get_mut(id_i).init(ri.slot, vi);
            self.pool.get_mut(id_j).init(rj.slot, vj);
        }
        Ok(swap)
    }

    /// Sorts the container's elements by `Ord`, stably, using the merge-sort
    /// kernel (§4.5).
    pub fn sort(&mut self) -> Result<()>
    where
        T: Clone + Ord,
    {
        self.sort_by(|a, b| a.cmp(b))
    }

    /// Like [`Self::sort`], with a custom comparator. The principal
    /// algorithmic client of `CVec`'s mutable access path (§4.5): leaf
    /// ranges are sorted entirely through [`Self::compare_swap`], which
    /// attaches both buckets involved in each comparison for its duration
    /// (§4.3.4, §8 scenario 6), and larger ranges are split, recursed, and
    /// merged with a scratch buffer sized to the shorter half rather than
    /// the whole container — `O(n log n)` comparisons and element moves,
    /// never a full-container flatten.
    pub fn sort_by<F>(&mut self, mut cmp: F) -> Result<()>
    where
        T: Clone,
        F: FnMut(&T, &T) -> Ordering,
    {
        if self.len < 2 {
            return Ok(());
        }
        self.sort_range(0, self.len, &mut cmp)
    }

    /// Ranges at or below this length are sorted by repeated
    /// [`Self::compare_swap`] rather than split further.
    const SORT_INSERTION_THRESHOLD: usize = 20;

    fn sort_range<F>(&mut self, start: usize, end: usize, cmp: &mut F) -> Result<()>
    where
        T: Clone,
        F: FnMut(&T, &T) -> Ordering,
    {
        let len = end - start;
        if len < 2 {
            return Ok(());
        }
        if len <= Self::SORT_INSERTION_THRESHOLD {
            return self.insertion_sort_range(start, end, cmp);
        }
        let mid = start + len / 2;
        self.sort_range(start, mid, cmp)?;
        self.sort_range(mid, end, cmp)?;
        self.merge_range(start, mid, end, cmp)
    }

    /// Stable adjacent-swap insertion sort over `[start, end)`, driven
    /// entirely by `compare_swap` so every comparison attaches both
    /// buckets involved (§8 scenario 6).
    fn insertion_sort_range<F>(&mut self, start: usize, end: usize, cmp: &mut F) -> Result<()>
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        for i in (start + 1)..end {
            let mut j = i;
            while j > start {
                if !self.compare_swap(j - 1, j, |a, b| cmp(a, b) == Ordering::Less)? {
                    break;
                }
                j -= 1;
            }
        }
        Ok(())
    }

    /// Merges the two already-sorted sub-ranges `[start, mid)` and
    /// `[mid, end)` in place. Copies whichever half is shorter into a
    /// scratch buffer (bounded to that half, never the whole container)
    /// and merges back from the end that keeps the untouched half intact
    /// until it's needed — the same left/right-buffer technique as
    /// `crate::sort::merge`, adapted to `CVec`'s `at`/`set` primitives.
    fn merge_range<F>(&mut self, start: usize, mid: usize, end: usize, cmp: &mut F) -> Result<()>
    where
        T: Clone,
        F: FnMut(&T, &T) -> Ordering,
    {
        let left_len = mid - start;
        let right_len = end - mid;
        if left_len <= right_len {
            let mut buf = Vec::with_capacity(left_len);
            for i in start..mid {
                buf.push(self.at(i)?);
            }
            let mut bi = 0usize;
            let mut ri = mid;
            let mut out = start;
            while bi < buf.len() && ri < end {
                let r = self.at(ri)?;
                if cmp(&buf[bi], &r) != Ordering::Greater {
                    self.set(out, buf[bi].clone())?;
                    bi += 1;
                } else {
                    self.set(out, r)?;
                    ri += 1;
                }
                out += 1;
            }
            while bi < buf.len() {
                self.set(out, buf[bi].clone())?;
                bi += 1;
                out += 1;
            }
        } else {
            let mut buf = Vec::with_capacity(right_len);
            for i in mid..end {
                buf.push(self.at(i)?);
            }
            let mut li = mid as isize - 1;
            let mut bi = right_len as isize - 1;
            let mut out = end as isize - 1;
            while li >= start as isize && bi >= 0 {
                let l = self.at(li as usize)?;
                if cmp(&l, &buf[bi as usize]) == Ordering::Greater {
                    self.set(out as usize, l)?;
                    li -= 1;
                } else {
                    self.set(out as usize, buf[bi as usize].clone())?;
                    bi -= 1;
                }
                out -= 1;
            }
            while bi >= 0 {
                self.set(out as usize, buf[bi as usize].clone())?;
                bi -= 1;
                out -= 1;
            }
        }
        Ok(())
    }

    /// Serializes the container to `out` (§6): a varint element count `N`,
    /// then each bucket as a varint-length-prefixed blob (raw bytes for the
    /// partial last bucket, codec output for every other bucket); the
    /// bucket count is not written, since it is always derivable from `N`
    /// and `BLOCK_LEN`. Flushes every live context first.
    pub fn serialize(&mut self, out: &mut Vec<u8>) -> Result<()> {
        self.pool
            .evict_all::<ActiveCodec<C>>(&mut self.buckets, bpp::<T>(), C::ACCELERATION)?;
        varint::write_u64(out, self.len as u64);
        for bucket in &self.buckets {
            varint::write_u64(out, bucket.compressed.len() as u64);
            out.extend_from_slice(&bucket.compressed);
        }
        Ok(())
    }

    /// Reconstructs a container previously written by `serialize`. Bucket
    /// blobs are kept compressed and only decompressed lazily on first
    /// access, same as a container that was never serialized. The bucket
    /// count is derived from `len`/`BLOCK_LEN` rather than read from the
    /// wire, since the format (§6) does not carry it.
    pub fn deserialize(src: &[u8]) -> Result<Self> {
        use crate::error::CodecError;
        let malformed = || ContainerError::from(CodecError::Corrupted);

        let mut pos = 0usize;
        let (len, n) = varint::read_u64(&src[pos..]).ok_or_else(malformed)?;
        pos += n;
        let len = len as usize;

        let bucket_count = if len == 0 {
            0
        } else {
            (len + BLOCK_LEN - 1) / BLOCK_LEN
        };

        let mut buckets = Vec::with_capacity(bucket_count);
        let mut remaining = len;
        for i in 0..bucket_count {
            let (blob_len, n) = varint::read_u64(&src[pos..]).ok_or_else(malformed)?;
            pos += n;
            let blob_len = blob_len as usize;
            if src.len() < pos + blob_len {
                return Err(malformed());
            }
            let mut bucket = Bucket::new_empty();
            bucket.compressed = src[pos..pos + blob_len].to_vec();
            pos += blob_len;
            let is_last = i + 1 == bucket_count;
            bucket.size = if is_last {
                remaining
            } else {
                BLOCK_LEN.min(remaining)
            };
            remaining = remaining.saturating_sub(bucket.size);
            buckets.push(bucket);
        }

        Ok(Self {
            buckets,
            pool: ContextPool::new(),
            len,
            peak_footprint: Cell::new(0),
            _config: PhantomData,
        })
    }

    /// Writes the §6 wire format to a `std::io::Write` sink.
    #[cfg(feature = "std")]
    pub fn serialize_writer<W: std::io::Write>(&mut self, writer: &mut W) -> Result<()> {
        let mut buf = Vec::new();
        self.serialize(&mut buf)?;
        writer
            .write_all(&buf)
            .map_err(|_| ContainerError::Alloc)?;
        Ok(())
    }

    /// Reads the §6 wire format from a `std::io::Read` source to the end.
    #[cfg(feature = "std")]
    pub fn deserialize_reader<R: std::io::Read>(reader: &mut R) -> Result<Self> {
        let mut buf = Vec::new();
        reader
            .read_to_end(&mut buf)
            .map_err(|_| ContainerError::Alloc)?;
        Self::deserialize(&buf)
    }
}

impl<T, C: CVecConfig> Drop for CVec<T, C> {
    fn drop(&mut self) {
        // Any bucket whose elements are non-trivially destructible must be
        // decompressed before the container goes away so their
        // destructors run (§3 lifecycle). `discard_all` drops every live
        // context's contained elements via `Context`'s own `Drop`.
        self.pool.discard_all();
    }
}
