//! The `Face` value record shared by [`crate::polygon::Polygon`] (2D) and
//! [`crate::polyhedron::Polyhedron`] (3D): one border loop plus zero or
//! more hole loops.

use hedge_kernel_topo::{LoopId, TopoId};

slotmap::new_key_type! {
    /// Handle for a face.
    pub struct FaceId;
}

/// One face of an indexed-face build input, shared by the 2D and 3D
/// builders: an ordered border plus any hole loops, each a list of indices
/// into the shared vertex array.
#[derive(Debug, Clone)]
pub struct IndexedFace {
    /// Identity to adopt for this face's border loop, if any.
    pub topo_id: Option<TopoId>,
    /// Ordered vertex indices of the outer boundary.
    pub border: Vec<usize>,
    /// Ordered vertex indices of each hole loop.
    pub holes: Vec<Vec<usize>>,
}

impl IndexedFace {
    /// A face with the given border and no holes, minting a fresh id.
    pub fn new(border: Vec<usize>) -> Self {
        IndexedFace {
            topo_id: None,
            border,
            holes: Vec::new(),
        }
    }
}

/// A face: a border loop and its holes.
///
/// `Face` is a plain value referencing [`LoopId`]s — the loops themselves
/// live in the mesh's loop list. A face container must therefore always be
/// cleared *before* the loop list it references is torn down.
#[derive(Debug, Clone)]
pub struct Face {
    /// Outer boundary loop.
    pub border: LoopId,
    /// Inner (hole) loops, if any.
    pub holes: Vec<LoopId>,
}

impl Face {
    /// A face with no holes.
    pub fn new(border: LoopId) -> Self {
        Face {
            border,
            holes: Vec::new(),
        }
    }

    /// A face with the given border and holes.
    pub fn with_holes(border: LoopId, holes: Vec<LoopId>) -> Self {
        Face { border, holes }
    }
}
