//! Error types surfaced by the codec and the container.
//!
//! Grounded on `thiserror` as used throughout this corpus for library error
//! enums (e.g. `other_examples/88009938_ChainSafe-forest_..._car_backed_blockstore.rs.rs`).
//! Under the `std` feature these derive `std::error::Error`; without it they
//! still implement `Display` by hand so the crate keeps working `no_std`.

#[cfg(feature = "std")]
use thiserror::Error;

/// Errors returned by the block codec (§4.2.3 / §4.2.4 / §6).
#[cfg_attr(feature = "std", derive(Error))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecError {
    /// The encoded block would not fit in the destination buffer. Always
    /// recoverable: the caller stores the block raw instead (§4.2.3).
    #[cfg_attr(feature = "std", error("encoded block does not fit in destination buffer"))]
    DstOverflow,
    /// The compressed input is malformed: an invalid sub-row/row header, or
    /// a length that would overrun `src`/`dst`. Fatal for the operation that
    /// observed it (§7).
    #[cfg_attr(feature = "std", error("compressed block is corrupted"))]
    Corrupted,
}

#[cfg(not(feature = "std"))]
impl core::fmt::Display for CodecError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            CodecError::DstOverflow => write!(f, "encoded block does not fit in destination buffer"),
            CodecError::Corrupted => write!(f, "compressed block is corrupted"),
        }
    }
}

/// Errors returned by `CVec`'s public operations.
#[cfg_attr(feature = "std", derive(Error))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerError {
    /// Propagated from the codec. Only reachable from `deserialize`, since
    /// every other codec call site substitutes the null codec on
    /// `DstOverflow` and never feeds it attacker-controlled bytes.
    #[cfg_attr(feature = "std", error("codec error: {0}"))]
    Codec(CodecError),
    /// The backing allocator could not satisfy a request. Operations that
    /// return this leave the container in the state it was in before the
    /// call (basic guarantee, §7).
    #[cfg_attr(feature = "std", error("allocation failure"))]
    Alloc,
}

#[cfg(not(feature = "std"))]
impl core::fmt::Display for ContainerError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ContainerError::Codec(e) => write!(f, "codec error: {}", e),
            ContainerError::Alloc => write!(f, "allocation failure"),
        }
    }
}

impl From<CodecError> for ContainerError {
    fn from(e: CodecError) -> Self {
        ContainerError::Codec(e)
    }
}

/// Result alias used throughout the container layer.
pub type Result<T> = core::result::Result<T, ContainerError>;
