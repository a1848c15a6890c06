#![warn(missing_docs)]

//! `Polyhedron`, `Polygon`, and `Polyline` shape types built on the
//! half-edge graph in `hedge-kernel-topo`, plus the `IsContain` point test.

pub mod contain;
pub mod face;
pub mod polygon;
pub mod polyhedron;
pub mod polyline;

pub use contain::is_contain;
pub use face::{Face, FaceId, IndexedFace};
pub use polygon::Polygon;
pub use polyhedron::{FacePlaneStatus, Polyhedron};
pub use polyline::{Polyline, DEFAULT_FUSE_DISTANCE};
