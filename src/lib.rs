//! # `cvec`
//!
//! A vector-like data structure that stores its elements compressed in
//! fixed-size blocks and decompresses only a bounded number of blocks at a
//! time into a shared pool of scratch buffers.
//!
//! ## Description
//!
//! Elements are appended to a trailing partial block same as a `Vec<T>`
//! grows its backing buffer; once a block reaches `BLOCK_SIZE` elements
//! (256, fixed) it is eligible for compression. Random access (`at`/`set`)
//! decompresses the owning block's 256 elements into a scratch "context"
//! taken from a pool bounded by `CVecConfig::MAX_CONTEXTS`; once the pool
//! is full, attaching one more context evicts the least-recently-touched
//! one, recompressing it back into its block first if it was written to.
//!
//! This trades some access latency (an occasional decompress/recompress
//! round trip) for holding large, largely append-only or sequentially
//! scanned sequences in a fraction of their raw `size_of::<T>() * len()`
//! footprint.
//!
//! ## Under the Hood
//!
//! - [`codec`] implements the block codec: a 256-element transpose
//!   followed by a per-row, then per-sub-row, plain/delta/RLE/raw scheme
//!   selection.
//! - [`context`] and [`pool`] implement the scratch-buffer arena and its
//!   bounded, intrusively-linked LRU list.
//! - [`cvec`] ties block table, pool, and wire format together into the
//!   public [`CVec`] type.
//! - [`sort`] implements a standalone stable merge-sort kernel over plain
//!   slices ([`sort::net_sort`] / [`sort::net_sort_relocatable`]).
//!   `CVec::sort`/`sort_by` drive their own range-based merge sort directly
//!   over `compare_swap`/`at`/`set` instead of calling into `sort` — see
//!   `cvec::CVec::sort_by`.
//!
//! ## Example
//!
//! ```
//! use cvec::CVec;
//!
//! let mut v: CVec<u64> = CVec::new();
//! for i in 0..10_000u64 {
//!     v.push_back(i).unwrap();
//! }
//! assert_eq!(v.at(9_999).unwrap(), 9_999);
//! assert!(v.compression_ratio() < 1.0);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod bucket;
mod codec;
pub mod config;
mod context;
mod cvec;
pub mod error;
pub mod iter;
mod pool;
mod ref_wrapper;
pub mod relocatable;
pub mod sort;
mod varint;

#[cfg(test)]
mod tests;

pub use self::{
    codec::{Codec, DefaultCodec, NullCodec},
    config::{BufferHint, CVecConfig, ContextCeiling, DefaultConfig, EagerConfig, MemoryTightConfig, NullCodecConfig},
    cvec::CVec,
    error::{CodecError, ContainerError, Result},
    relocatable::Relocatable,
};
