//! §4.4 integer packing primitives: `pack16`/`unpack16` write/read 16 lanes
//! of `bits ∈ [0, 8]` bits each (exactly `2 * bits` bytes, since
//! `16 * bits` is always a multiple of 8). These are the hot path of the
//! codec's sub-row encode/decode (§4.2.1) and are kept branch-predictor
//! friendly by dispatching on `bits` through a single small accumulator
//! loop rather than a per-`bits` specialization table — grounded on
//! `examples/original_source/seq/internal/block_codec.cpp`'s
//! `write_16`/`read_16_bits`, which use the same deposit-accumulator shape
//! in place of a hardware bit-deposit instruction.

use crate::error::CodecError;

/// Number of output bytes `pack16`/`unpack16` consume for a given `bits`.
#[inline]
pub const fn packed_len(bits: u8) -> usize {
    2 * bits as usize
}

/// Packs 16 lanes of `bits` bits each into `out`. `out` must be exactly
/// `packed_len(bits)` bytes. Total for `bits ∈ [0, 8]`; never fails.
pub fn pack16(vals: &[u8; 16], bits: u8, out: &mut [u8]) {
    debug_assert_eq!(out.len(), packed_len(bits));
    if bits == 0 {
        return;
    }
    let mut acc: u32 = 0;
    let mut acc_bits: u32 = 0;
    let mut out_idx = 0usize;
    let bits = bits as u32;
    for &v in vals.iter() {
        acc |= (v as u32) << acc_bits;
        acc_bits += bits;
        while acc_bits >= 8 {
            out[out_idx] = (acc & 0xFF) as u8;
            out_idx += 1;
            acc >>= 8;
            acc_bits -= 8;
        }
    }
    debug_assert_eq!(acc_bits, 0);
    debug_assert_eq!(out_idx, out.len());
}

/// Inverse of [`pack16`]. Returns `Err(CodecError::Corrupted)` if `src` is
/// shorter than `packed_len(bits)` rather than reading past its end.
pub fn unpack16(src: &[u8], bits: u8, vals: &mut [u8; 16]) -> Result<(), CodecError> {
    let need = packed_len(bits);
    if src.len() < need {
        return Err(CodecError::Corrupted);
    }
    if bits == 0 {
        *vals = [0u8; 16];
        return Ok(());
    }
    let mask: u32 = (1u32 << bits) - 1;
    let bits = bits as u32;
    let mut acc: u32 = 0;
    let mut acc_bits: u32 = 0;
    let mut in_idx = 0usize;
    for v in vals.iter_mut() {
        while acc_bits < bits {
            acc |= (src[in_idx] as u32) << acc_bits;
            in_idx += 1;
            acc_bits += 8;
        }
        *v = (acc & mask) as u8;
        acc >>= bits;
        acc_bits -= bits;
    }
    debug_assert_eq!(in_idx, need);
    Ok(())
}

/// `ceil(log2(x + 1))` clamped to `[0, 8]`: the number of bits needed to
/// represent every value in `0..=x`. Used to turn a `(min, max)` pair into
/// `bits = ceil_log2(max - min + 1)` (§4.2.1).
#[inline]
pub fn ceil_log2_clamped(x: u8) -> u8 {
    if x == 0 {
        0
    } else {
        8 - x.leading_zeros() as u8
    }
}
