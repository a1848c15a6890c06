//! hedge-kernel CLI - drives the half-edge kernel's mesh operations from
//! the command line, reading and writing JSON [`mesh_doc::MeshDoc`]/
//! [`mesh_doc::PolygonDoc`] files.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use nalgebra::Point3;

use hedge_kernel_booleans::{boolean_op, BooleanOp};
use hedge_kernel_clip::{clip, KeepMode};
use hedge_kernel_extrude::{extrude, ExtrudeFlags};
use hedge_kernel_math::Plane;
use hedge_kernel_offset::{offset, OffsetMode};
use hedge_kernel_primitives::is_contain;

mod mesh_doc;
use mesh_doc::{MeshDoc, PolygonDoc};

#[derive(Parser)]
#[command(name = "hedge-kernel")]
#[command(about = "Drive the hedge half-edge kernel's mesh operations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Emit a sample axis-aligned box as a MeshDoc.
    Cube {
        #[arg(long, default_value = "-1,-1,-1")]
        min: String,
        #[arg(long, default_value = "1,1,1")]
        max: String,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Cut a mesh by a plane.
    Clip {
        input: PathBuf,
        /// "nx,ny,nz,dist"
        #[arg(long)]
        plane: String,
        #[arg(long, value_enum, default_value = "above")]
        keep: KeepArg,
        #[arg(long)]
        cap: bool,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Union / intersect / subtract two closed meshes.
    Boolean {
        a: PathBuf,
        b: PathBuf,
        #[arg(long, value_enum)]
        op: BooleanArg,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Extrude a set of faces (by index into the dumped face list).
    Extrude {
        input: PathBuf,
        /// Comma-separated face indices.
        #[arg(long)]
        faces: String,
        #[arg(long)]
        distance: f64,
        #[arg(long)]
        front: bool,
        #[arg(long)]
        back: bool,
        #[arg(long)]
        side: bool,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Cap every open boundary with a fresh (unattached) loop.
    Fill {
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Weld vertices within a distance threshold.
    Fuse {
        input: PathBuf,
        #[arg(long, default_value_t = 1e-3)]
        distance: f64,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Split every shared vertex so each half-edge owns a distinct origin.
    UniquePoints {
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Test whether a point lies inside a convex mesh.
    IsContain {
        input: PathBuf,
        /// "x,y,z"
        #[arg(long)]
        point: String,
    },
    /// Offset (inset/outset) a 2D polygon.
    Offset {
        input: PathBuf,
        #[arg(long)]
        distance: f64,
        #[arg(long, value_enum, default_value = "keep-border")]
        mode: OffsetArg,
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(Clone, clap::ValueEnum)]
enum KeepArg {
    Above,
    Below,
    All,
}

impl From<KeepArg> for KeepMode {
    fn from(a: KeepArg) -> Self {
        match a {
            KeepArg::Above => KeepMode::Above,
            KeepArg::Below => KeepMode::Below,
            KeepArg::All => KeepMode::All,
        }
    }
}

#[derive(Clone, clap::ValueEnum)]
enum BooleanArg {
    Union,
    Intersection,
    Difference,
}

impl From<BooleanArg> for BooleanOp {
    fn from(a: BooleanArg) -> Self {
        match a {
            BooleanArg::Union => BooleanOp::Union,
            BooleanArg::Intersection => BooleanOp::Intersection,
            BooleanArg::Difference => BooleanOp::Difference,
        }
    }
}

#[derive(Clone, clap::ValueEnum)]
enum OffsetArg {
    KeepInside,
    KeepBorder,
    KeepAll,
}

impl From<OffsetArg> for OffsetMode {
    fn from(a: OffsetArg) -> Self {
        match a {
            OffsetArg::KeepInside => OffsetMode::KeepInside,
            OffsetArg::KeepBorder => OffsetMode::KeepBorder,
            OffsetArg::KeepAll => OffsetMode::KeepAll,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Cube { min, max, output } => cmd_cube(&min, &max, &output),
        Commands::Clip { input, plane, keep, cap, output } => cmd_clip(&input, &plane, keep.into(), cap, &output),
        Commands::Boolean { a, b, op, output } => cmd_boolean(&a, &b, op.into(), &output),
        Commands::Extrude { input, faces, distance, front, back, side, output } => {
            cmd_extrude(&input, &faces, distance, front, back, side, &output)
        }
        Commands::Fill { input, output } => cmd_fill(&input, &output),
        Commands::Fuse { input, distance, output } => cmd_fuse(&input, distance, &output),
        Commands::UniquePoints { input, output } => cmd_unique_points(&input, &output),
        Commands::IsContain { input, point } => cmd_is_contain(&input, &point),
        Commands::Offset { input, distance, mode, output } => cmd_offset(&input, distance, mode.into(), &output),
    }
}

fn parse3(s: &str) -> Result<[f64; 3]> {
    let parts: Vec<f64> = s.split(',').map(|v| v.trim().parse::<f64>()).collect::<Result<_, _>>()?;
    if parts.len() != 3 {
        bail!("expected \"x,y,z\", got {s:?}");
    }
    Ok([parts[0], parts[1], parts[2]])
}

fn parse_indices(s: &str) -> Result<Vec<usize>> {
    Ok(s.split(',').map(|v| v.trim().parse::<usize>()).collect::<Result<_, _>>()?)
}

fn read_mesh(path: &PathBuf) -> Result<MeshDoc> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(serde_json::from_str(&text)?)
}

fn write_mesh(doc: &MeshDoc, path: &PathBuf) -> Result<()> {
    fs::write(path, serde_json::to_string_pretty(doc)?).with_context(|| format!("writing {}", path.display()))
}

fn cmd_cube(min: &str, max: &str, output: &PathBuf) -> Result<()> {
    let min = parse3(min)?;
    let max = parse3(max)?;
    let cube = hedge_kernel_primitives::Polyhedron::from_aabb(
        Point3::new(min[0], min[1], min[2]),
        Point3::new(max[0], max[1], max[2]),
    );
    write_mesh(&MeshDoc::from_polyhedron(&cube), output)
}

fn cmd_clip(input: &PathBuf, plane: &str, keep: KeepMode, cap: bool, output: &PathBuf) -> Result<()> {
    let parts: Vec<f64> = plane.split(',').map(|v| v.trim().parse::<f64>()).collect::<Result<_, _>>()?;
    if parts.len() != 4 {
        bail!("expected \"nx,ny,nz,dist\", got {plane:?}");
    }
    let plane = Plane { normal: hedge_kernel_math::Vec3::new(parts[0], parts[1], parts[2]), dist: parts[3] };
    let mut poly = read_mesh(input)?.into_polyhedron();
    let changed = clip(&mut poly, &plane, keep, cap)?;
    if !changed {
        eprintln!("clip: plane missed the mesh, output is unchanged");
    }
    write_mesh(&MeshDoc::from_polyhedron(&poly), output)
}

fn cmd_boolean(a: &PathBuf, b: &PathBuf, op: BooleanOp, output: &PathBuf) -> Result<()> {
    let a = read_mesh(a)?.into_polyhedron();
    let b = read_mesh(b)?.into_polyhedron();
    let fragments = boolean_op(&a, &b, op)?;
    let docs: Vec<MeshDoc> = fragments.iter().map(MeshDoc::from_polyhedron).collect();
    fs::write(output, serde_json::to_string_pretty(&docs)?)?;
    Ok(())
}

fn cmd_extrude(
    input: &PathBuf,
    faces: &str,
    distance: f64,
    front: bool,
    back: bool,
    side: bool,
    output: &PathBuf,
) -> Result<()> {
    let mut poly = read_mesh(input)?.into_polyhedron();
    let by_index: Vec<_> = poly.faces.keys().collect();
    let indices = parse_indices(faces)?;
    let mut marked = Vec::with_capacity(indices.len());
    for i in indices {
        let id = by_index.get(i).copied().with_context(|| format!("face index {i} out of range"))?;
        marked.push(id);
    }
    extrude(&mut poly, &marked, distance, ExtrudeFlags { front, back, side })?;
    write_mesh(&MeshDoc::from_polyhedron(&poly), output)
}

fn cmd_fill(input: &PathBuf, output: &PathBuf) -> Result<()> {
    let mut poly = read_mesh(input)?.into_polyhedron();
    let new_loops = hedge_kernel_edit::fill(&mut poly);
    eprintln!("fill: closed {} boundary loop(s)", new_loops.len());
    write_mesh(&MeshDoc::from_polyhedron(&poly), output)
}

fn cmd_fuse(input: &PathBuf, distance: f64, output: &PathBuf) -> Result<()> {
    let mut poly = read_mesh(input)?.into_polyhedron();
    hedge_kernel_edit::fuse(&mut poly, distance);
    write_mesh(&MeshDoc::from_polyhedron(&poly), output)
}

fn cmd_unique_points(input: &PathBuf, output: &PathBuf) -> Result<()> {
    let mut poly = read_mesh(input)?.into_polyhedron();
    hedge_kernel_edit::unique_points(&mut poly);
    write_mesh(&MeshDoc::from_polyhedron(&poly), output)
}

fn cmd_is_contain(input: &PathBuf, point: &str) -> Result<()> {
    let point = parse3(point)?;
    let poly = read_mesh(input)?.into_polyhedron();
    let inside = is_contain(&poly, Point3::new(point[0], point[1], point[2]));
    println!("{inside}");
    Ok(())
}

fn cmd_offset(input: &PathBuf, distance: f64, mode: OffsetMode, output: &PathBuf) -> Result<()> {
    let text = fs::read_to_string(input).with_context(|| format!("reading {}", input.display()))?;
    let doc: PolygonDoc = serde_json::from_str(&text)?;
    let mut poly = doc.into_polygon();
    offset(&mut poly, distance, mode);
    fs::write(output, serde_json::to_string_pretty(&PolygonDoc::from_polygon(&poly))?)?;
    Ok(())
}
