//! World container and .w driver: level geometry, the BigCube coarse
//! culling hierarchy, and the texture-animation table.
//!
//! BigCubes are derived data. The legacy files always carry exactly one
//! cube spanning the whole level, and consumers are not known to tolerate
//! anything else, so the single-cube union is the default policy; the
//! `CubePartition` trait is the seam for a stricter subdivision should a
//! consumer ever need one.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::binary::{BinaryReader, BinaryWriter};
use crate::error::{DecodeError, EncodeError};
use crate::geom::BoundingBox;
use crate::mesh::Mesh;
use crate::prm;
use crate::texanim::{self, TexAnimation};

/// One coarse culling volume: a box and the meshes it contains.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BigCube {
    pub bounds: BoundingBox,
    pub mesh_indices: Vec<u32>,
}

/// Strategy for partitioning world meshes into BigCubes.
///
/// Any implementation must be complete (every mesh index appears in some
/// cube) and deterministic (same box order, same output).
pub trait CubePartition {
    fn partition(&self, boxes: &[BoundingBox]) -> Vec<BigCube>;
}

/// Format-compatible default: one cube, the union of every mesh box,
/// listing every mesh.
pub struct SingleCube;

impl CubePartition for SingleCube {
    fn partition(&self, boxes: &[BoundingBox]) -> Vec<BigCube> {
        let bounds = boxes
            .iter()
            .fold(BoundingBox::empty(), |acc, b| acc.union(b));
        vec![BigCube {
            bounds,
            mesh_indices: (0..boxes.len() as u32).collect(),
        }]
    }
}

/// In-memory .w contents.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct World {
    pub meshes: Vec<Mesh>,
    pub bigcubes: Vec<BigCube>,
    pub animations: Vec<TexAnimation>,
}

impl World {
    /// Rebuilds the BigCube list from the current meshes with the given
    /// strategy. Called once per export, before serialization.
    pub fn generate_bigcubes<P: CubePartition>(&mut self, strategy: &P) {
        let boxes: Vec<BoundingBox> = self.meshes.iter().map(|m| m.bounding_box()).collect();
        self.bigcubes = strategy.partition(&boxes);
        debug!(
            "bigcubes: {} cube(s) over {} meshes",
            self.bigcubes.len(),
            self.meshes.len()
        );
    }

    /// Completeness invariant: the cubes together reference every mesh,
    /// and nothing outside the mesh list.
    fn validate_bigcubes(&self) -> Result<(), EncodeError> {
        let mut seen = vec![false; self.meshes.len()];
        for cube in &self.bigcubes {
            for &index in &cube.mesh_indices {
                let slot = seen.get_mut(index as usize).ok_or(
                    EncodeError::IndexOutOfRange {
                        index: index as i64,
                        limit: self.meshes.len(),
                    },
                )?;
                *slot = true;
            }
        }
        if let Some(missing) = seen.iter().position(|covered| !covered) {
            return Err(EncodeError::IndexOutOfRange {
                index: missing as i64,
                limit: self.meshes.len(),
            });
        }
        Ok(())
    }
}

pub fn from_bytes(bytes: &[u8]) -> Result<World, DecodeError> {
    let mut r = BinaryReader::new(bytes);
    let mesh_count = r.read_count(8)? as usize;
    let meshes = r.read_array(mesh_count, prm::read_mesh)?;
    let cube_count = r.read_count(6 * 4 + 4)? as usize;
    let bigcubes = r.read_array(cube_count, |r| {
        let min = r.read_vector3()?;
        let max = r.read_vector3()?;
        let index_count = r.read_count(4)? as usize;
        let mesh_indices = r.read_array(index_count, |r| r.read_u32())?;
        Ok(BigCube {
            bounds: BoundingBox { min, max },
            mesh_indices,
        })
    })?;
    let animation_count = r.read_count(4)? as usize;
    let animations = r.read_array(animation_count, texanim::read_animation)?;
    r.expect_end()?;
    Ok(World {
        meshes,
        bigcubes,
        animations,
    })
}

pub fn to_bytes(world: &World) -> Result<Vec<u8>, EncodeError> {
    world.validate_bigcubes()?;

    let mut w = BinaryWriter::new();
    w.write_count("mesh count", world.meshes.len())?;
    for (ordinal, mesh) in world.meshes.iter().enumerate() {
        prm::write_mesh(&mut w, mesh).map_err(|e| e.at_record(ordinal))?;
    }
    w.write_count("bigcube count", world.bigcubes.len())?;
    for cube in &world.bigcubes {
        w.write_vector3(&cube.bounds.min);
        w.write_vector3(&cube.bounds.max);
        w.write_count("bigcube mesh count", cube.mesh_indices.len())?;
        for &index in &cube.mesh_indices {
            w.write_u32(index);
        }
    }
    w.write_count("animation count", world.animations.len())?;
    for (ordinal, anim) in world.animations.iter().enumerate() {
        texanim::write_animation(&mut w, anim).map_err(|e| e.at_record(ordinal))?;
    }
    Ok(w.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Vector3;
    use crate::mesh::quad_mesh;

    fn two_mesh_world() -> World {
        let mut a = quad_mesh();
        a.name = String::new();
        let mut b = a.clone();
        for v in &mut b.vertices {
            v.position = v.position.add(&Vector3::new(500.0, 10.0, 0.0));
        }
        let mut anim = TexAnimation::default();
        anim.grid_fill(2, 2, 8, 1, 0.05).unwrap();
        let mut world = World {
            meshes: vec![a, b],
            bigcubes: Vec::new(),
            animations: vec![anim],
        };
        world.generate_bigcubes(&SingleCube);
        world
    }

    #[test]
    fn single_cube_covers_everything() {
        let world = two_mesh_world();
        assert_eq!(world.bigcubes.len(), 1);
        let cube = &world.bigcubes[0];
        assert_eq!(cube.mesh_indices, vec![0, 1]);
        assert_eq!(cube.bounds.min, Vector3::new(0.0, 0.0, 0.0));
        assert_eq!(cube.bounds.max, Vector3::new(600.0, 10.0, 100.0));
    }

    #[test]
    fn round_trip() {
        let world = two_mesh_world();
        let bytes = to_bytes(&world).unwrap();
        assert_eq!(from_bytes(&bytes).unwrap(), world);
    }

    #[test]
    fn incomplete_bigcubes_are_rejected() {
        let mut world = two_mesh_world();
        world.bigcubes[0].mesh_indices = vec![0];
        let err = to_bytes(&world).unwrap_err();
        assert_eq!(err, EncodeError::IndexOutOfRange { index: 1, limit: 2 });
    }

    #[test]
    fn dangling_bigcube_index_is_rejected() {
        let mut world = two_mesh_world();
        world.bigcubes[0].mesh_indices.push(9);
        let err = to_bytes(&world).unwrap_err();
        assert_eq!(err, EncodeError::IndexOutOfRange { index: 9, limit: 2 });
    }

    #[test]
    fn empty_world_round_trips() {
        let mut world = World::default();
        world.generate_bigcubes(&SingleCube);
        let bytes = to_bytes(&world).unwrap();
        let back = from_bytes(&bytes).unwrap();
        assert_eq!(back.meshes.len(), 0);
        assert_eq!(back.bigcubes.len(), 1);
    }
}
