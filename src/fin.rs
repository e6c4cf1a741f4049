//! .fin driver: placed mesh instances.
//!
//! Each instance is a placement header (name, transform, LOD/priority,
//! tint and environment colors) followed by a mesh blob in the .prm
//! layout.

use serde::{Deserialize, Serialize};

use crate::binary::{BinaryReader, BinaryWriter};
use crate::error::{DecodeError, EncodeError};
use crate::geom::{Color, Matrix4, Vector3};
use crate::mesh::Mesh;
use crate::prm;

/// Fixed width of the instance name field.
pub const NAME_LEN: usize = 16;

const FLAG_PRIORITY: u16 = 0x0001;
const FLAG_ENV: u16 = 0x0002;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Instance {
    pub name: String,
    pub position: Vector3,
    pub rotation: Matrix4,
    pub lod_bias: i16,
    /// Drawn before regular world geometry when set.
    pub priority: bool,
    pub color: Color,
    /// Environment-map reflection tint, honored only when `env` is set.
    pub env: bool,
    pub env_color: Color,
    pub mesh: Mesh,
}

impl Default for Instance {
    fn default() -> Self {
        Instance {
            name: String::new(),
            position: Vector3::ZERO,
            rotation: Matrix4::IDENTITY,
            lod_bias: 0,
            priority: false,
            color: Color::WHITE,
            env: false,
            env_color: Color::WHITE,
            mesh: Mesh::default(),
        }
    }
}

/// In-memory .fin contents.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Fin {
    pub instances: Vec<Instance>,
}

/// Name + position + matrix + lod/flags + two colors + mesh counts.
const INSTANCE_RECORD_MIN: usize = NAME_LEN + 12 + 64 + 2 + 2 + 4 + 4 + 8;

pub fn from_bytes(bytes: &[u8]) -> Result<Fin, DecodeError> {
    let mut r = BinaryReader::new(bytes);
    let count = r.read_count(INSTANCE_RECORD_MIN)? as usize;
    let instances = r.read_array(count, |r| {
        let name = r.read_fixed_string(NAME_LEN)?;
        let position = r.read_vector3()?;
        let rotation = r.read_matrix4()?;
        let lod_bias = r.read_i16()?;
        let flags = r.read_u16()?;
        let color = r.read_color(true)?;
        let env_color = r.read_color(true)?;
        let mesh = prm::read_mesh(r)?;
        Ok(Instance {
            name,
            position,
            rotation,
            lod_bias,
            priority: flags & FLAG_PRIORITY != 0,
            color,
            env: flags & FLAG_ENV != 0,
            env_color,
            mesh,
        })
    })?;
    r.expect_end()?;
    Ok(Fin { instances })
}

pub fn to_bytes(fin: &Fin) -> Result<Vec<u8>, EncodeError> {
    let mut w = BinaryWriter::new();
    w.write_count("instance count", fin.instances.len())?;
    for (ordinal, inst) in fin.instances.iter().enumerate() {
        write_instance(&mut w, inst).map_err(|e| e.at_record(ordinal))?;
    }
    Ok(w.into_bytes())
}

fn write_instance(w: &mut BinaryWriter, inst: &Instance) -> Result<(), EncodeError> {
    w.write_fixed_string(&inst.name, NAME_LEN)?;
    w.write_vector3(&inst.position);
    w.write_matrix4(&inst.rotation);
    w.write_i16(inst.lod_bias);
    let mut flags = 0u16;
    if inst.priority {
        flags |= FLAG_PRIORITY;
    }
    if inst.env {
        flags |= FLAG_ENV;
    }
    w.write_u16(flags);
    w.write_color(&inst.color, true);
    w.write_color(&inst.env_color, true);
    prm::write_mesh(w, &inst.mesh)
}
