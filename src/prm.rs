//! .prm driver: a single drawable mesh.
//!
//! The same blob is embedded per-mesh in .w files and per-instance in .fin
//! files, so the record readers/writers are shared through
//! [`read_mesh`] / [`write_mesh`].

use crate::binary::{BinaryReader, BinaryWriter};
use crate::error::{DecodeError, EncodeError};
use crate::flags::PolygonFlags;
use crate::mesh::{Mesh, Polygon, Vertex};

/// Bytes of the smallest polygon record, used to sanity-check counts.
const POLYGON_RECORD_SIZE: usize = 4 * 2 + 2 + 2 + 2;
/// Bytes of one vertex record.
const VERTEX_RECORD_SIZE: usize = 12 + 12 + 4;

/// Reads one mesh blob (counts, polygons, UVs, vertices) at the reader's
/// current position. The mesh name is not part of the format.
pub fn read_mesh(r: &mut BinaryReader) -> Result<Mesh, DecodeError> {
    let polygon_count = r.read_count(POLYGON_RECORD_SIZE)? as usize;
    let vertex_count = r.read_count(VERTEX_RECORD_SIZE)? as usize;

    let polygons = r.read_array(polygon_count, |r| {
        let indices = [r.read_i16()?, r.read_i16()?, r.read_i16()?, r.read_i16()?];
        Ok(Polygon {
            indices,
            material: r.read_i16()?,
            texture: r.read_i16()?,
            flags: PolygonFlags::from_bits_truncate(r.read_u16()?),
        })
    })?;
    let uvs = r.read_array(polygon_count * 4, |r| r.read_vector2())?;
    let vertices = r.read_array(vertex_count, |r| {
        Ok(Vertex {
            position: r.read_vector3()?,
            normal: r.read_vector3()?,
            color: r.read_color(true)?,
        })
    })?;

    Ok(Mesh {
        name: String::new(),
        vertices,
        polygons,
        uvs,
    })
}

/// Writes one mesh blob. Validates cross-references first so that a bad
/// index is reported instead of written.
pub fn write_mesh(w: &mut BinaryWriter, mesh: &Mesh) -> Result<(), EncodeError> {
    mesh.validate()?;

    w.write_count("polygon count", mesh.polygons.len())?;
    w.write_count("vertex count", mesh.vertices.len())?;
    for poly in &mesh.polygons {
        for &index in &poly.indices {
            w.write_i16(index);
        }
        w.write_i16(poly.material);
        w.write_i16(poly.texture);
        w.write_u16(poly.flags.bits());
    }
    for uv in &mesh.uvs {
        w.write_vector2(uv);
    }
    for vertex in &mesh.vertices {
        w.write_vector3(&vertex.position);
        w.write_vector3(&vertex.normal);
        w.write_color(&vertex.color, true);
    }
    Ok(())
}

/// Decodes a complete .prm file.
pub fn from_bytes(bytes: &[u8]) -> Result<Mesh, DecodeError> {
    let mut r = BinaryReader::new(bytes);
    let mesh = read_mesh(&mut r)?;
    r.expect_end()?;
    Ok(mesh)
}

/// Encodes a complete .prm file.
pub fn to_bytes(mesh: &Mesh) -> Result<Vec<u8>, EncodeError> {
    let mut w = BinaryWriter::new();
    write_mesh(&mut w, mesh)?;
    Ok(w.into_bytes())
}
