//! JSON wire format for polyhedra and polygons: a flat vertex array plus
//! one entry per face (border indices, plus hole index lists).
//!
//! The kernel's own types don't derive `Serialize`/`Deserialize` — they
//! carry `TopoId`s and live arena handles that have no stable meaning
//! across a process boundary. `MeshDoc`/`PolygonDoc` are the boundary
//! representation a file or another process actually sees.

use hedge_kernel_math::{Vec2, Vec3};
use hedge_kernel_primitives::{IndexedFace, Polygon, Polyhedron};
use serde::{Deserialize, Serialize};

/// One face: an ordered border index list plus any hole index lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaceDoc {
    pub border: Vec<usize>,
    #[serde(default)]
    pub holes: Vec<Vec<usize>>,
}

impl From<IndexedFace> for FaceDoc {
    fn from(f: IndexedFace) -> Self {
        FaceDoc { border: f.border, holes: f.holes }
    }
}

impl From<FaceDoc> for IndexedFace {
    fn from(f: FaceDoc) -> Self {
        let mut out = IndexedFace::new(f.border);
        out.holes = f.holes;
        out
    }
}

/// A 3D polyhedron, as shared vertex positions plus indexed faces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshDoc {
    pub positions: Vec<[f64; 3]>,
    pub faces: Vec<FaceDoc>,
}

impl MeshDoc {
    pub fn from_polyhedron(poly: &Polyhedron) -> Self {
        let (positions, faces) = poly.dump();
        MeshDoc {
            positions: positions.iter().map(|p| [p.x, p.y, p.z]).collect(),
            faces: faces.into_iter().map(FaceDoc::from).collect(),
        }
    }

    pub fn into_polyhedron(self) -> Polyhedron {
        let positions: Vec<Vec3> = self.positions.iter().map(|p| Vec3::new(p[0], p[1], p[2])).collect();
        let faces: Vec<IndexedFace> = self.faces.into_iter().map(IndexedFace::from).collect();
        Polyhedron::from_indexed_faces(&positions, faces)
    }
}

/// A 2D polygon, as shared vertex positions plus indexed faces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolygonDoc {
    pub positions: Vec<[f64; 2]>,
    pub faces: Vec<FaceDoc>,
}

impl PolygonDoc {
    pub fn from_polygon(poly: &Polygon) -> Self {
        let (positions, faces) = poly.dump();
        PolygonDoc {
            positions: positions.iter().map(|p| [p.x, p.y]).collect(),
            faces: faces.into_iter().map(FaceDoc::from).collect(),
        }
    }

    pub fn into_polygon(self) -> Polygon {
        let positions: Vec<Vec2> = self.positions.iter().map(|p| Vec2::new(p[0], p[1])).collect();
        let faces: Vec<IndexedFace> = self.faces.into_iter().map(IndexedFace::from).collect();
        Polygon::from_indexed_faces(&positions, faces)
    }
}
