#![warn(missing_docs)]

//! Per-vertex mitered offset (inset/outset) of 2D
//! [`hedge_kernel_primitives::Polygon`] faces.

pub mod offset;

pub use offset::{offset, OffsetMode};
