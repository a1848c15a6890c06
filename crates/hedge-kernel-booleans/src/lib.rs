#![warn(missing_docs)]

//! CSG boolean operations (union, intersection, difference) on closed
//! [`hedge_kernel_primitives::Polyhedron`] solids, built on top of
//! [`hedge_kernel_clip`].

pub mod boolean;

pub use boolean::{boolean_op, intersect, subtract, union, BooleanError, BooleanOp};
