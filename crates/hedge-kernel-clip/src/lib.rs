#![warn(missing_docs)]

//! The plane-clipping engine: the kernel's central algorithm, on top of
//! which the boolean and extrude operations are built.

pub mod clip;

pub use clip::{clip, ClipError, KeepMode};
