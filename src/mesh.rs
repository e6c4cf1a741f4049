use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::EncodeError;
use crate::flags::PolygonFlags;
use crate::geom::{BoundingBox, Color, Sphere, Vector2, Vector3};

/// Highest legal texture page; -1 means untextured.
pub const TEXTURE_PAGE_MAX: i16 = 9;

/// One mesh vertex as stored on disk.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct Vertex {
    pub position: Vector3,
    pub normal: Vector3,
    pub color: Color,
}

/// One drawable polygon: three or four vertex indices into the owning mesh.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Polygon {
    /// Fourth index is -1 for triangles.
    pub indices: [i16; 4],
    pub material: i16,
    /// Texture page, -1..=TEXTURE_PAGE_MAX.
    pub texture: i16,
    pub flags: PolygonFlags,
}

impl Default for Polygon {
    fn default() -> Self {
        Polygon {
            indices: [0, 0, 0, -1],
            material: 0,
            texture: -1,
            flags: PolygonFlags::empty(),
        }
    }
}

impl Polygon {
    pub fn is_quad(&self) -> bool {
        self.indices[3] >= 0
    }

    pub fn corner_count(&self) -> usize {
        if self.is_quad() {
            4
        } else {
            3
        }
    }

    /// The used vertex indices, 3 or 4 of them.
    pub fn used_indices(&self) -> &[i16] {
        &self.indices[..self.corner_count()]
    }
}

/// A named bag of vertices, polygons and per-corner UVs: the unit of
/// .prm files and the element of .w and .fin files.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Mesh {
    pub name: String,
    pub vertices: Vec<Vertex>,
    pub polygons: Vec<Polygon>,
    /// Four UVs per polygon, parallel to `polygons` (unused corners are
    /// written as zero).
    pub uvs: Vec<Vector2>,
}

impl Mesh {
    /// Checks the cross-reference invariants that must hold before the
    /// mesh can be written: every polygon index inside the vertex list,
    /// the UV list parallel to the polygon list, texture pages in range.
    pub fn validate(&self) -> Result<(), EncodeError> {
        if self.uvs.len() != self.polygons.len() * 4 {
            return Err(EncodeError::ValueOutOfRange {
                field: "uv count",
                value: self.uvs.len() as i64,
            });
        }
        for (ordinal, poly) in self.polygons.iter().enumerate() {
            for &index in poly.used_indices() {
                if index < 0 || index as usize >= self.vertices.len() {
                    return Err(EncodeError::IndexOutOfRange {
                        index: index as i64,
                        limit: self.vertices.len(),
                    }
                    .at_record(ordinal));
                }
            }
            if poly.texture < -1 || poly.texture > TEXTURE_PAGE_MAX {
                return Err(EncodeError::ValueOutOfRange {
                    field: "texture page",
                    value: poly.texture as i64,
                }
                .at_record(ordinal));
            }
        }
        Ok(())
    }

    /// Derived axis-aligned bounds over all vertices.
    pub fn bounding_box(&self) -> BoundingBox {
        self.vertices
            .par_iter()
            .fold(BoundingBox::empty, |mut bbox, v| {
                bbox.expand_point(&v.position);
                bbox
            })
            .reduce(BoundingBox::empty, |a, b| a.union(&b))
    }

    /// Derived bounding sphere (box center, radius to farthest vertex).
    pub fn bounding_sphere(&self) -> Sphere {
        Sphere::around(self.vertices.iter().map(|v| &v.position))
    }
}

/// Flat one-quad floor mesh shared by driver tests.
#[cfg(test)]
pub(crate) fn quad_mesh() -> Mesh {
    let positions = [
        (0.0, 0.0, 0.0),
        (100.0, 0.0, 0.0),
        (100.0, 0.0, 100.0),
        (0.0, 0.0, 100.0),
    ];
    Mesh {
        name: "floor".to_string(),
        vertices: positions
            .iter()
            .map(|&(x, y, z)| Vertex {
                position: Vector3::new(x, y, z),
                normal: Vector3::new(0.0, 1.0, 0.0),
                color: Color::WHITE,
            })
            .collect(),
        polygons: vec![Polygon {
            indices: [0, 1, 2, 3],
            material: 2,
            texture: 0,
            flags: PolygonFlags::DOUBLE_SIDED,
        }],
        uvs: vec![
            Vector2 { u: 0.0, v: 0.0 },
            Vector2 { u: 1.0, v: 0.0 },
            Vector2 { u: 1.0, v: 1.0 },
            Vector2 { u: 0.0, v: 1.0 },
        ],
    }
}
