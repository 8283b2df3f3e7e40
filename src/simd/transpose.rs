//! §4.1 SIMD transpose.
//!
//! Reorders a row-major `256 × BPP` byte matrix (256 elements, `BPP` bytes
//! each) into `BPP` contiguous rows of 256 bytes — the *transposed view*
//! under which successive bytes of a row are the same byte-position of
//! successive elements — and back.
//!
//! Grounded on `examples/original_source/seq/internal/transpose.{h,cpp}`:
//! a 16×16-tile path for `BPP` a multiple of 16, bespoke paths for
//! `BPP ∈ {1, 2, 4, 8}`, and a scalar double loop otherwise. The original
//! tiles with SSE4.1 shuffles; this port keeps the same three-way dispatch
//! and tiling shape but expresses each tile as plain array indexing (see
//! `SPEC_FULL.md` Non-goals on platform intrinsics) — behaviorally total
//! and bit-exact either way.

pub const BLOCK_LEN: usize = 256;

/// `dst.len() == src.len() == BLOCK_LEN * bpp`. Writes the transposed view:
/// `dst[k * BLOCK_LEN + e] = src[e * bpp + k]`.
pub fn to_rows(src: &[u8], bpp: usize, dst: &mut [u8]) {
    debug_assert_eq!(src.len(), BLOCK_LEN * bpp);
    debug_assert_eq!(dst.len(), BLOCK_LEN * bpp);
    if bpp == 0 {
        return;
    }
    if bpp % 16 == 0 {
        tiled_to_rows(src, bpp, dst);
    } else if matches!(bpp, 1 | 2 | 4 | 8) {
        strided_to_rows(src, bpp, dst);
    } else {
        scalar_to_rows(src, bpp, dst);
    }
}

/// Exact inverse of [`to_rows`].
pub fn from_rows(src: &[u8], bpp: usize, dst: &mut [u8]) {
    debug_assert_eq!(src.len(), BLOCK_LEN * bpp);
    debug_assert_eq!(dst.len(), BLOCK_LEN * bpp);
    if bpp == 0 {
        return;
    }
    if bpp % 16 == 0 {
        tiled_from_rows(src, bpp, dst);
    } else if matches!(bpp, 1 | 2 | 4 | 8) {
        strided_from_rows(src, bpp, dst);
    } else {
        scalar_from_rows(src, bpp, dst);
    }
}

fn scalar_to_rows(src: &[u8], bpp: usize, dst: &mut [u8]) {
    for e in 0..BLOCK_LEN {
        for k in 0..bpp {
            dst[k * BLOCK_LEN + e] = src[e * bpp + k];
        }
    }
}

fn scalar_from_rows(src: &[u8], bpp: usize, dst: &mut [u8]) {
    for e in 0..BLOCK_LEN {
        for k in 0..bpp {
            dst[e * bpp + k] = src[k * BLOCK_LEN + e];
        }
    }
}

/// Bespoke path for `bpp ∈ {1, 2, 4, 8}`: each element's bytes are read as
/// one contiguous chunk before being scattered to their rows, avoiding the
/// scalar path's `bpp`-wide inner loop bound check per byte.
fn strided_to_rows(src: &[u8], bpp: usize, dst: &mut [u8]) {
    for e in 0..BLOCK_LEN {
        let chunk = &src[e * bpp..e * bpp + bpp];
        for (k, &byte) in chunk.iter().enumerate() {
            dst[k * BLOCK_LEN + e] = byte;
        }
    }
}

fn strided_from_rows(src: &[u8], bpp: usize, dst: &mut [u8]) {
    for e in 0..BLOCK_LEN {
        let chunk = &mut dst[e * bpp..e * bpp + bpp];
        for (k, byte) in chunk.iter_mut().enumerate() {
            *byte = src[k * BLOCK_LEN + e];
        }
    }
}

/// Tiled path for `bpp` a multiple of 16: transposes 16×16 byte sub-matrices
/// one at a time, mirroring the original's SSE4.1 `transpose_16x16`
/// building block.
fn tiled_to_rows(src: &[u8], bpp: usize, dst: &mut [u8]) {
    let mut tile_k = 0;
    while tile_k < bpp {
        let mut tile_e = 0;
        while tile_e < BLOCK_LEN {
            transpose_tile_16x16(src, bpp, tile_e, tile_k, dst, false);
            tile_e += 16;
        }
        tile_k += 16;
    }
}

fn tiled_from_rows(src: &[u8], bpp: usize, dst: &mut [u8]) {
    let mut tile_k = 0;
    while tile_k < bpp {
        let mut tile_e = 0;
        while tile_e < BLOCK_LEN {
            transpose_tile_16x16(src, bpp, tile_e, tile_k, dst, true);
            tile_e += 16;
        }
        tile_k += 16;
    }
}

/// Transposes the 16-element × 16-byte-column sub-matrix anchored at
/// `(tile_e, tile_k)`. `inverse` selects which of `src`/`dst` is in
/// row-major (AoS) layout vs. transposed-rows layout.
fn transpose_tile_16x16(
    src: &[u8],
    bpp: usize,
    tile_e: usize,
    tile_k: usize,
    dst: &mut [u8],
    inverse: bool,
) {
    for i in 0..16 {
        for j in 0..16 {
            let e = tile_e + i;
            let k = tile_k + j;
            if inverse {
                dst[e * bpp + k] = src[k * BLOCK_LEN + e];
            } else {
                dst[k * BLOCK_LEN + e] = src[e * bpp + k];
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(bpp: usize) {
        let n = BLOCK_LEN * bpp;
        let src: alloc::vec::Vec<u8> = (0..n).map(|i| (i * 7 + 3) as u8).collect();
        let mut rows = alloc::vec![0u8; n];
        to_rows(&src, bpp, &mut rows);
        let mut back = alloc::vec![0u8; n];
        from_rows(&rows, bpp, &mut back);
        assert_eq!(src, back, "round trip failed for bpp={}", bpp);
    }

    #[test]
    fn round_trip_all_common_bpp() {
        for &bpp in &[1usize, 2, 3, 4, 5, 7, 8, 9, 16, 17, 24, 32] {
            round_trip(bpp);
        }
    }

    #[test]
    fn tiled_matches_scalar_reference() {
        let bpp = 32;
        let n = BLOCK_LEN * bpp;
        let src: alloc::vec::Vec<u8> = (0..n).map(|i| (i * 13 + 1) as u8).collect();
        let mut via_tiled = alloc::vec![0u8; n];
        tiled_to_rows(&src, bpp, &mut via_tiled);
        let mut via_scalar = alloc::vec![0u8; n];
        scalar_to_rows(&src, bpp, &mut via_scalar);
        assert_eq!(via_tiled, via_scalar);
    }

    #[test]
    fn strided_matches_scalar_reference() {
        for &bpp in &[1usize, 2, 4, 8] {
            let n = BLOCK_LEN * bpp;
            let src: alloc::vec::Vec<u8> = (0..n).map(|i| (i * 17 + 5) as u8).collect();
            let mut via_strided = alloc::vec![0u8; n];
            strided_to_rows(&src, bpp, &mut via_strided);
            let mut via_scalar = alloc::vec![0u8; n];
            scalar_to_rows(&src, bpp, &mut via_scalar);
            assert_eq!(via_strided, via_scalar, "mismatch for bpp={}", bpp);
        }
    }

    #[test]
    fn byte_column_is_contiguous() {
        // The k-th row of the transposed view must equal the k-th byte of
        // every element, in element order.
        let bpp = 4;
        let n = BLOCK_LEN * bpp;
        let src: alloc::vec::Vec<u8> = (0..n).map(|i| i as u8).collect();
        let mut rows = alloc::vec![0u8; n];
        to_rows(&src, bpp, &mut rows);
        for k in 0..bpp {
            for e in 0..BLOCK_LEN {
                assert_eq!(rows[k * BLOCK_LEN + e], src[e * bpp + k]);
            }
        }
    }
}
