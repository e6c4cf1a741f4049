//! Collision model and .ncp driver.
//!
//! A collision file is a list of convex polyhedra, each bounded by 4 to 6
//! planes, optionally followed by the lookup grid that maps XZ cells to
//! candidate polyhedra. The grid is derived, never hand-authored: encode
//! rebuilds it from the polyhedron footprints when grid export is on.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::binary::{BinaryReader, BinaryWriter};
use crate::error::{DecodeError, EncodeError};
use crate::flags::{pack_surface, unpack_surface, CollisionFlags};
use crate::geom::{Plane, Rect, Vector3};
use crate::lookup::{self, LookupGrid};
use crate::mesh::{Mesh, Polygon};

pub const MIN_PLANES: usize = 4;
pub const MAX_PLANES: usize = 6;

/// Corner coincidence tolerance when intersecting plane triples.
const CORNER_EPSILON: f32 = 0.01;

/// One convex collision volume. Immutable once built.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Polyhedron {
    pub material: u8,
    pub flags: CollisionFlags,
    /// 4 to 6 bounding planes; the face plane comes first.
    pub planes: Vec<Plane>,
}

impl Polyhedron {
    /// Builds the plane set for one collision polygon: the face plane,
    /// one outward skirt plane per edge, and the mirrored face plane for
    /// double-sided collision.
    pub fn from_polygon(
        mesh: &Mesh,
        poly: &Polygon,
        material: u8,
        flags: CollisionFlags,
    ) -> Result<Polyhedron, EncodeError> {
        let mut corners = Vec::with_capacity(poly.corner_count());
        for &i in poly.used_indices() {
            let vertex =
                mesh.vertices
                    .get(i as usize)
                    .ok_or(EncodeError::IndexOutOfRange {
                        index: i as i64,
                        limit: mesh.vertices.len(),
                    })?;
            corners.push(vertex.position);
        }

        let face = Plane::from_points(&corners[0], &corners[1], &corners[2])
            .ok_or(EncodeError::DegenerateGeometry {
                what: "collision polygon",
            })?;

        let mut planes = vec![face];
        if flags.contains(CollisionFlags::DOUBLE_SIDED) {
            planes.push(face.flipped());
        }
        for (i, a) in corners.iter().enumerate() {
            let b = &corners[(i + 1) % corners.len()];
            let edge = b.sub(a);
            let normal = edge
                .cross(&face.normal)
                .normalized()
                .ok_or(EncodeError::DegenerateGeometry {
                    what: "collision polygon edge",
                })?;
            planes.push(Plane {
                normal,
                distance: -normal.dot(a),
            });
        }
        debug_assert!(planes.len() >= MIN_PLANES && planes.len() <= MAX_PLANES);

        Ok(Polyhedron {
            material,
            flags,
            planes,
        })
    }

    /// Corner points of the bounded region: every plane-triple
    /// intersection that lies on the non-positive side of all planes.
    pub fn corners(&self) -> Vec<Vector3> {
        let n = self.planes.len();
        let mut points: Vec<Vector3> = Vec::new();
        for i in 0..n {
            for j in i + 1..n {
                for k in j + 1..n {
                    let Some(p) = intersect_planes(&self.planes[i], &self.planes[j], &self.planes[k])
                    else {
                        continue;
                    };
                    if self
                        .planes
                        .iter()
                        .all(|plane| plane.signed_distance(&p) <= CORNER_EPSILON)
                        && !points.iter().any(|q| q.sub(&p).length() < CORNER_EPSILON)
                    {
                        points.push(p);
                    }
                }
            }
        }
        points
    }

    /// XZ extent of the corner set; empty when the region is unbounded or
    /// degenerate (the grid builder clamps that case).
    pub fn footprint(&self) -> Rect {
        let mut rect = Rect::empty();
        for p in self.corners() {
            rect.expand(p.x, p.z);
        }
        rect
    }
}

/// Solves the three-plane intersection point, `None` for near-parallel
/// configurations.
fn intersect_planes(a: &Plane, b: &Plane, c: &Plane) -> Option<Vector3> {
    let bc = b.normal.cross(&c.normal);
    let det = a.normal.dot(&bc);
    if det.abs() < 1e-6 {
        return None;
    }
    let ca = c.normal.cross(&a.normal);
    let ab = a.normal.cross(&b.normal);
    let p = bc
        .scale(-a.distance)
        .add(&ca.scale(-b.distance))
        .add(&ab.scale(-c.distance));
    Some(p.scale(1.0 / det))
}

/// In-memory .ncp contents.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Collision {
    pub polyhedra: Vec<Polyhedron>,
    /// Present when the file carries (or the export requested) the grid.
    pub grid: Option<LookupGrid>,
}

impl Collision {
    /// Rebuilds the lookup grid from the polyhedron footprints. Footprint
    /// derivation is independent per polyhedron and runs in parallel;
    /// the order-preserving collect keeps the result deterministic.
    pub fn build_grid(&mut self, cell_size: f32) -> Result<(), EncodeError> {
        let footprints: Vec<Rect> = self
            .polyhedra
            .par_iter()
            .map(|poly| poly.footprint())
            .collect();
        self.grid = Some(lookup::build_grid(&footprints, cell_size)?);
        Ok(())
    }
}

/// Surface word + plane count + planes.
const POLYHEDRON_RECORD_MIN: usize = 4 + 4 + MIN_PLANES * 16;

pub fn from_bytes(bytes: &[u8]) -> Result<Collision, DecodeError> {
    let mut r = BinaryReader::new(bytes);
    let count = r.read_count(POLYHEDRON_RECORD_MIN)? as usize;
    let polyhedra = r.read_array(count, |r| {
        let (material, flags) = unpack_surface(r.read_u32()?);
        let plane_count = r.read_u32()?;
        if !(MIN_PLANES as u32..=MAX_PLANES as u32).contains(&plane_count) {
            return Err(DecodeError::PlaneCount { count: plane_count });
        }
        let planes = r.read_array(plane_count as usize, |r| {
            Ok(Plane {
                normal: r.read_vector3()?,
                distance: r.read_f32()?,
            })
        })?;
        Ok(Polyhedron {
            material,
            flags,
            planes,
        })
    })?;

    // The grid section is optional and has no presence flag; any bytes
    // after the polyhedron list must be the grid.
    let grid = if r.remaining() > 0 {
        Some(read_grid(&mut r)?)
    } else {
        None
    };
    r.expect_end()?;

    Ok(Collision { polyhedra, grid })
}

pub fn to_bytes(collision: &Collision) -> Result<Vec<u8>, EncodeError> {
    let mut w = BinaryWriter::new();
    w.write_count("polyhedron count", collision.polyhedra.len())?;
    for (ordinal, poly) in collision.polyhedra.iter().enumerate() {
        if poly.planes.len() < MIN_PLANES || poly.planes.len() > MAX_PLANES {
            return Err(EncodeError::ValueOutOfRange {
                field: "plane count",
                value: poly.planes.len() as i64,
            }
            .at_record(ordinal));
        }
        w.write_u32(pack_surface(poly.material, poly.flags));
        w.write_count("plane count", poly.planes.len())?;
        for plane in &poly.planes {
            w.write_vector3(&plane.normal);
            w.write_f32(plane.distance);
        }
    }
    if let Some(grid) = &collision.grid {
        write_grid(&mut w, grid, collision.polyhedra.len())?;
    }
    Ok(w.into_bytes())
}

fn read_grid(r: &mut BinaryReader) -> Result<LookupGrid, DecodeError> {
    let origin_x = r.read_f32()?;
    let origin_z = r.read_f32()?;
    let cols = r.read_u32()?;
    let rows = r.read_u32()?;
    let cell_size = r.read_f32()?;
    let cell_count = cols
        .checked_mul(rows)
        .ok_or(DecodeError::CountOverflow {
            offset: r.position(),
            count: cols,
        })? as usize;
    if cell_count * 4 > r.remaining() {
        return Err(DecodeError::CountOverflow {
            offset: r.position(),
            count: cell_count as u32,
        });
    }
    let cells = r.read_array(cell_count, |r| {
        let len = r.read_count(4)? as usize;
        r.read_array(len, |r| r.read_u32())
    })?;
    Ok(LookupGrid {
        origin_x,
        origin_z,
        cols,
        rows,
        cell_size,
        cells,
    })
}

fn write_grid(
    w: &mut BinaryWriter,
    grid: &LookupGrid,
    polyhedron_count: usize,
) -> Result<(), EncodeError> {
    w.write_f32(grid.origin_x);
    w.write_f32(grid.origin_z);
    w.write_u32(grid.cols);
    w.write_u32(grid.rows);
    w.write_f32(grid.cell_size);
    for (ordinal, cell) in grid.cells.iter().enumerate() {
        w.write_count("cell list length", cell.len())?;
        for &index in cell {
            if index as usize >= polyhedron_count {
                return Err(EncodeError::IndexOutOfRange {
                    index: index as i64,
                    limit: polyhedron_count,
                }
                .at_record(ordinal));
            }
            w.write_u32(index);
        }
    }
    Ok(())
}
