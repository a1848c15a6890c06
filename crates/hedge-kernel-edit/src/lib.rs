#![warn(missing_docs)]

//! Mesh-editing operations that fill missing faces, weld coincident
//! vertices, and split shared ones back apart, for
//! [`hedge_kernel_primitives::Polyhedron`].

pub mod edit;

pub use edit::{fill, fuse, fuse_many, unique_points};
