//! §4.2 block codec: compresses/decompresses a 256-element block. Grounded
//! on `examples/original_source/seq/internal/block_codec.{h,cpp}` for the
//! transpose-then-per-row-then-per-sub-row pipeline shape.

mod row;
mod subrow;

pub use subrow::SubrowPlan;

use crate::error::CodecError;
use crate::simd::transpose;
use alloc::vec::Vec;

/// Elements per block (`B` in the spec's notation). Fixed, matching
/// spec.md §3.
pub const BLOCK_LEN: usize = transpose::BLOCK_LEN;

/// Upper bound on a compressed block's size for a given element size,
/// per §8 property 2: `B * BPP + BPP + ceil(BPP / 2)`.
pub fn max_encoded_len(bpp: usize) -> usize {
    BLOCK_LEN * bpp + bpp + (bpp + 1) / 2
}

/// A symmetric codec operating on fixed-size blocks of `BLOCK_LEN`
/// elements. Implementations must be total on decode of a buffer they
/// themselves produced, and must never write past `dst`.
pub trait Codec {
    /// `src` holds `BLOCK_LEN * bpp` bytes in row-major (element-major)
    /// order. Returns the number of bytes written to `dst`, or
    /// `DstOverflow` if the encoding would not fit.
    fn encode(src: &[u8], bpp: usize, acceleration: u8, dst: &mut [u8]) -> Result<usize, CodecError>;

    /// Inverse of `encode`. `dst` must be at least `BLOCK_LEN * bpp` bytes.
    /// Returns the number of bytes of `src` consumed.
    fn decode(src: &[u8], bpp: usize, dst: &mut [u8]) -> Result<usize, CodecError>;
}

/// The default codec: transpose, then per-row `ALL_SAME`/`ALL_RAW`/`NORMAL`
/// selection, then per-sub-row plain/delta/RLE/raw selection (§4.2).
pub struct DefaultCodec;

impl Codec for DefaultCodec {
    fn encode(src: &[u8], bpp: usize, acceleration: u8, dst: &mut [u8]) -> Result<usize, CodecError> {
        debug_assert_eq!(src.len(), BLOCK_LEN * bpp);
        let mut rows = alloc::vec![0u8; BLOCK_LEN * bpp];
        transpose::to_rows(src, bpp, &mut rows);

        let header_len = (bpp + 1) / 2;
        let mut selector_nibbles = alloc::vec![0u8; header_len];
        let mut body = Vec::with_capacity(bpp * 4);

        for k in 0..bpp {
            let row = &rows[k * BLOCK_LEN..(k + 1) * BLOCK_LEN];
            let plan = row::plan_row(row, acceleration);
            let sel = row::selector(&plan);
            if k % 2 == 0 {
                selector_nibbles[k / 2] |= sel;
            } else {
                selector_nibbles[k / 2] |= sel << 4;
            }
            row::encode_row(row, &plan, &mut body);
        }

        let total_len = selector_nibbles.len() + body.len();
        if total_len > dst.len() {
            tracing::debug!(total_len, dst_cap = dst.len(), "codec encode overflow");
            return Err(CodecError::DstOverflow);
        }
        dst[..selector_nibbles.len()].copy_from_slice(&selector_nibbles);
        dst[selector_nibbles.len()..total_len].copy_from_slice(&body);
        tracing::trace!(bpp, total_len, "codec encode");
        Ok(total_len)
    }

    fn decode(src: &[u8], bpp: usize, dst: &mut [u8]) -> Result<usize, CodecError> {
        debug_assert!(dst.len() >= BLOCK_LEN * bpp);
        let header_len = (bpp + 1) / 2;
        if src.len() < header_len {
            return Err(CodecError::Corrupted);
        }
        let mut rows = alloc::vec![0u8; BLOCK_LEN * bpp];
        let mut pos = header_len;
        for k in 0..bpp {
            let byte = src[k / 2];
            let sel = if k % 2 == 0 { byte & 0x0F } else { byte >> 4 };
            let row_out = &mut rows[k * BLOCK_LEN..(k + 1) * BLOCK_LEN];
            let consumed = row::decode_row(sel, &src[pos..], row_out)?;
            pos += consumed;
        }
        transpose::from_rows(&rows, bpp, &mut dst[..BLOCK_LEN * bpp]);
        tracing::trace!(bpp, consumed = pos, "codec decode");
        Ok(pos)
    }
}

/// §4.2.5 null codec: `csize = BLOCK_LEN * bpp`, `restore = memcpy`. Used
/// by `CVecConfig::USE_NULL_CODEC` to exercise the container pipeline with
/// an O(1) "uncompressed" backend.
pub struct NullCodec;

impl Codec for NullCodec {
    fn encode(src: &[u8], bpp: usize, _acceleration: u8, dst: &mut [u8]) -> Result<usize, CodecError> {
        let len = BLOCK_LEN * bpp;
        debug_assert_eq!(src.len(), len);
        if dst.len() < len {
            return Err(CodecError::DstOverflow);
        }
        dst[..len].copy_from_slice(src);
        Ok(len)
    }

    fn decode(src: &[u8], bpp: usize, dst: &mut [u8]) -> Result<usize, CodecError> {
        let len = BLOCK_LEN * bpp;
        if src.len() < len || dst.len() < len {
            return Err(CodecError::Corrupted);
        }
        dst[..len].copy_from_slice(&src[..len]);
        Ok(len)
    }
}

/// Dispatches to [`NullCodec`] or [`DefaultCodec`] depending on
/// `C::USE_NULL_CODEC`, so [`crate::pool::ContextPool`]'s methods (generic
/// over a single `Codec` type) don't need to pick between the two at every
/// call site.
pub(crate) struct ActiveCodec<C>(core::marker::PhantomData<C>);

impl<C: crate::config::CVecConfig> Codec for ActiveCodec<C> {
    fn encode(src: &[u8], bpp: usize, acceleration: u8, dst: &mut [u8]) -> Result<usize, CodecError> {
        if C::USE_NULL_CODEC {
            NullCodec::encode(src, bpp, acceleration, dst)
        } else {
            DefaultCodec::encode(src, bpp, acceleration, dst)
        }
    }

    fn decode(src: &[u8], bpp: usize, dst: &mut [u8]) -> Result<usize, CodecError> {
        if C::USE_NULL_CODEC {
            NullCodec::decode(src, bpp, dst)
        } else {
            DefaultCodec::decode(src, bpp, dst)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip_with<C: Codec>(elements: &[u8], bpp: usize, acceleration: u8) {
        let cap = max_encoded_len(bpp);
        let mut dst = alloc::vec![0u8; cap];
        let size = C::encode(elements, bpp, acceleration, &mut dst).unwrap();
        assert!(size <= cap);
        let mut back = alloc::vec![0u8; BLOCK_LEN * bpp];
        let consumed = C::decode(&dst[..size], bpp, &mut back).unwrap();
        assert_eq!(consumed, size);
        assert_eq!(back, elements);
    }

    #[test]
    fn all_equal_u32_compresses_tiny() {
        let bpp = 4;
        let mut elements = alloc::vec![0u8; BLOCK_LEN * bpp];
        for chunk in elements.chunks_mut(bpp) {
            chunk.copy_from_slice(&42u32.to_le_bytes());
        }
        let cap = max_encoded_len(bpp);
        let mut dst = alloc::vec![0u8; cap];
        let size = DefaultCodec::encode(&elements, bpp, 1, &mut dst).unwrap();
        assert!((size as f64) < 0.01 * (BLOCK_LEN * bpp) as f64);
        round_trip_with::<DefaultCodec>(&elements, bpp, 1);
    }

    #[test]
    fn ascending_u64_round_trips_and_compresses() {
        let bpp = 8;
        let mut elements = alloc::vec![0u8; BLOCK_LEN * bpp];
        for (i, chunk) in elements.chunks_mut(bpp).enumerate() {
            chunk.copy_from_slice(&(i as u64).to_le_bytes());
        }
        let cap = max_encoded_len(bpp);
        let mut dst = alloc::vec![0u8; cap];
        let size = DefaultCodec::encode(&elements, bpp, 1, &mut dst).unwrap();
        assert!((size as f64) < 0.04 * (BLOCK_LEN * bpp) as f64);
        round_trip_with::<DefaultCodec>(&elements, bpp, 1);
    }

    #[test]
    fn random_bytes_round_trip_with_overflow_fallback() {
        let bpp = 8;
        let mut x: u64 = 0xDEAD_BEEF_CAFE_F00D;
        let elements: Vec<u8> = (0..BLOCK_LEN * bpp)
            .map(|_| {
                x ^= x << 13;
                x ^= x >> 7;
                x ^= x << 17;
                (x & 0xFF) as u8
            })
            .collect();
        round_trip_with::<DefaultCodec>(&elements, bpp, 1);

        // A destination too small forces DstOverflow, which the container
        // handles by storing the block raw instead (exercised here at the
        // codec level directly).
        let mut tiny = [0u8; 4];
        assert_eq!(
            DefaultCodec::encode(&elements, bpp, 1, &mut tiny),
            Err(CodecError::DstOverflow)
        );
    }

    #[test]
    fn null_codec_round_trips() {
        let bpp = 4;
        let elements: Vec<u8> = (0..BLOCK_LEN * bpp).map(|i| i as u8).collect();
        round_trip_with::<NullCodec>(&elements, bpp, 0);
    }

    #[test]
    fn decode_rejects_truncated_input() {
        let bpp = 4;
        let mut elements = alloc::vec![0u8; BLOCK_LEN * bpp];
        let mut x: u32 = 1;
        for b in elements.iter_mut() {
            x = x.wrapping_mul(1103515245).wrapping_add(12345);
            *b = (x >> 16) as u8;
        }
        let cap = max_encoded_len(bpp);
        let mut dst = alloc::vec![0u8; cap];
        let size = DefaultCodec::encode(&elements, bpp, 1, &mut dst).unwrap();
        let mut back = alloc::vec![0u8; BLOCK_LEN * bpp];
        assert!(DefaultCodec::decode(&dst[..size.saturating_sub(1)], bpp, &mut back).is_err()
            || size == 0);
    }
}
