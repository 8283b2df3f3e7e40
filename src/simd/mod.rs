//! §4.1 transpose and §4.4 bit-packing primitives. Both are total (never
//! fail) and operate on explicit caller-provided buffers rather than
//! process-global scratch, per `SPEC_FULL.md` §9's "no global mutable
//! state" note.

pub mod pack;
pub mod transpose;
