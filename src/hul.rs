//! Hull model and .hul driver: convex vertex hulls and sphere hulls used
//! for object collision.
//!
//! The hull face planes are derived data. The editor only supplies the
//! vertex cloud; `ConvexHull::generate_faces` reproduces the bounding
//! plane set on export.

use serde::{Deserialize, Serialize};

use crate::binary::{BinaryReader, BinaryWriter};
use crate::error::{DecodeError, EncodeError};
use crate::geom::{Plane, Vector3};

const FACE_EPSILON: f32 = 1e-3;

/// Convex hull: vertex set plus generated bounding planes.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ConvexHull {
    pub material: u8,
    pub vertices: Vec<Vector3>,
    /// Outward bounding planes; empty until generated or decoded.
    pub faces: Vec<Plane>,
}

/// Sphere hull: cheap collision proxy.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct HullSphere {
    pub material: u8,
    pub center: Vector3,
    pub radius: f32,
}

impl ConvexHull {
    /// Derives the outward face planes of the vertex cloud: every vertex
    /// triple whose plane keeps all other vertices on one side becomes a
    /// face, oriented outward. Duplicates from coplanar triples are
    /// merged. Deterministic in vertex order.
    pub fn generate_faces(&mut self) -> Result<(), EncodeError> {
        let pts = &self.vertices;
        if pts.len() < 4 {
            return Err(EncodeError::DegenerateGeometry {
                what: "convex hull vertex set",
            });
        }
        let mut faces: Vec<Plane> = Vec::new();
        for i in 0..pts.len() {
            for j in i + 1..pts.len() {
                for k in j + 1..pts.len() {
                    let Some(plane) = Plane::from_points(&pts[i], &pts[j], &pts[k]) else {
                        continue;
                    };
                    let mut above = false;
                    let mut below = false;
                    for p in pts {
                        let d = plane.signed_distance(p);
                        above |= d > FACE_EPSILON;
                        below |= d < -FACE_EPSILON;
                        if above && below {
                            break;
                        }
                    }
                    let face = match (above, below) {
                        (false, true) | (false, false) => plane,
                        (true, false) => plane.flipped(),
                        (true, true) => continue,
                    };
                    if !faces.iter().any(|f| {
                        f.normal.dot(&face.normal) > 1.0 - FACE_EPSILON
                            && (f.distance - face.distance).abs() < FACE_EPSILON
                    }) {
                        faces.push(face);
                    }
                }
            }
        }
        if faces.is_empty() {
            return Err(EncodeError::DegenerateGeometry {
                what: "convex hull vertex set",
            });
        }
        self.faces = faces;
        Ok(())
    }
}

/// In-memory .hul contents.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Hull {
    pub convex: Vec<ConvexHull>,
    pub spheres: Vec<HullSphere>,
}

pub fn from_bytes(bytes: &[u8]) -> Result<Hull, DecodeError> {
    let mut r = BinaryReader::new(bytes);
    let hull_count = r.read_count(12)? as usize;
    let convex = r.read_array(hull_count, |r| {
        let material = (r.read_u32()? & 0xFF) as u8;
        let vertex_count = r.read_count(12)? as usize;
        let vertices = r.read_array(vertex_count, |r| r.read_vector3())?;
        let face_count = r.read_count(16)? as usize;
        let faces = r.read_array(face_count, |r| {
            Ok(Plane {
                normal: r.read_vector3()?,
                distance: r.read_f32()?,
            })
        })?;
        Ok(ConvexHull {
            material,
            vertices,
            faces,
        })
    })?;
    let sphere_count = r.read_count(4 + 16)? as usize;
    let spheres = r.read_array(sphere_count, |r| {
        Ok(HullSphere {
            material: (r.read_u32()? & 0xFF) as u8,
            center: r.read_vector3()?,
            radius: r.read_f32()?,
        })
    })?;
    r.expect_end()?;
    Ok(Hull { convex, spheres })
}

pub fn to_bytes(hull: &Hull) -> Result<Vec<u8>, EncodeError> {
    let mut w = BinaryWriter::new();
    w.write_count("hull count", hull.convex.len())?;
    for (ordinal, convex) in hull.convex.iter().enumerate() {
        if convex.faces.is_empty() {
            return Err(EncodeError::DegenerateGeometry {
                what: "convex hull without faces",
            }
            .at_record(ordinal));
        }
        w.write_u32(convex.material as u32);
        w.write_count("hull vertex count", convex.vertices.len())?;
        for v in &convex.vertices {
            w.write_vector3(v);
        }
        w.write_count("hull face count", convex.faces.len())?;
        for f in &convex.faces {
            w.write_vector3(&f.normal);
            w.write_f32(f.distance);
        }
    }
    w.write_count("sphere count", hull.spheres.len())?;
    for sphere in &hull.spheres {
        w.write_u32(sphere.material as u32);
        w.write_vector3(&sphere.center);
        w.write_f32(sphere.radius);
    }
    Ok(w.into_bytes())
}
