#![warn(missing_docs)]

//! Extrude a marked subset of a polyhedron's faces into a boss, pocket, or
//! floating cap pair, per the combination of front/side/back stages chosen.

pub mod extrude;

pub use extrude::{extrude, ExtrudeError, ExtrudeFlags};
