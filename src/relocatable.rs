//! The `Relocatable` marker trait and the blanket impls that back it.
//!
//! A type is relocatable when moving an instance to a new address by a raw
//! byte copy, without running any destructor on the source, is equivalent to
//! move-constructing at the destination and then dropping the source. Every
//! `Copy` type trivially satisfies this. A handful of common POD-shaped
//! aggregates (tuples and arrays of relocatable types) also satisfy it.
//!
//! The codec (§4.1/§4.2) relies on this property load-bearingly: evicting a
//! context copies its live bytes into a bucket's compressed blob and later
//! copies them back into a fresh context, which is only sound when `T`'s
//! bytes alone determine its value. `CVec<T, C>` therefore requires
//! `T: Relocatable` throughout, including under the null codec (§4.2.5),
//! which still does a byte-for-byte copy on evict/restore.
//!
//! The standalone merge-sort kernel (`crate::sort`) does not share this
//! requirement: its moves are genuine (`ptr::read` paired with never
//! re-reading the source), which is sound for any movable `T`. `net_sort`
//! is the fallback that works for any `T`; `net_sort_relocatable` is an
//! additional fast path for `Relocatable` types whose size-8 leaf network
//! swaps via a branchless byte blend (§9) instead of a data-dependent
//! branch.
pub unsafe trait Relocatable {}

unsafe impl Relocatable for u8 {}
unsafe impl Relocatable for u16 {}
unsafe impl Relocatable for u32 {}
unsafe impl Relocatable for u64 {}
unsafe impl Relocatable for u128 {}
unsafe impl Relocatable for usize {}
unsafe impl Relocatable for i8 {}
unsafe impl Relocatable for i16 {}
unsafe impl Relocatable for i32 {}
unsafe impl Relocatable for i64 {}
unsafe impl Relocatable for i128 {}
unsafe impl Relocatable for isize {}
unsafe impl Relocatable for f32 {}
unsafe impl Relocatable for f64 {}
unsafe impl Relocatable for bool {}
unsafe impl Relocatable for char {}

unsafe impl<T: Relocatable> Relocatable for core::num::Wrapping<T> {}

unsafe impl<T: Relocatable, const N: usize> Relocatable for [T; N] {}

macro_rules! impl_reloc_tuple {
    ($($name:ident),+) => {
        unsafe impl<$($name: Relocatable),+> Relocatable for ($($name,)+) {}
    };
}

impl_reloc_tuple!(A);
impl_reloc_tuple!(A, B);
impl_reloc_tuple!(A, B, C);
impl_reloc_tuple!(A, B, C, D);
impl_reloc_tuple!(A, B, C, D, E);
impl_reloc_tuple!(A, B, C, D, E, F);

/// Byte size of `T`, i.e. `BPP` in the spec's notation.
#[inline]
pub const fn bpp<T>() -> usize {
    core::mem::size_of::<T>()
}
