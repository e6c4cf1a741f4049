//! .taz driver: track zones, the ordered regions lap logic runs through.

use serde::{Deserialize, Serialize};

use crate::binary::{BinaryReader, BinaryWriter};
use crate::error::{DecodeError, EncodeError};
use crate::geom::{Matrix4, Vector3};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct TrackZone {
    pub position: Vector3,
    pub rotation: Matrix4,
    /// Half-extents along the zone's local axes.
    pub extents: Vector3,
}

impl Default for TrackZone {
    fn default() -> Self {
        TrackZone {
            position: Vector3::ZERO,
            rotation: Matrix4::IDENTITY,
            extents: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Taz {
    pub zones: Vec<TrackZone>,
}

const RECORD_SIZE: usize = 12 + 64 + 12;

pub fn from_bytes(bytes: &[u8]) -> Result<Taz, DecodeError> {
    let mut r = BinaryReader::new(bytes);
    let count = r.read_count(RECORD_SIZE)? as usize;
    let zones = r.read_array(count, |r| {
        Ok(TrackZone {
            position: r.read_vector3()?,
            rotation: r.read_matrix4()?,
            extents: r.read_vector3()?,
        })
    })?;
    r.expect_end()?;
    Ok(Taz { zones })
}

pub fn to_bytes(taz: &Taz) -> Result<Vec<u8>, EncodeError> {
    let mut w = BinaryWriter::new();
    w.write_count("zone count", taz.zones.len())?;
    for zone in &taz.zones {
        w.write_vector3(&zone.position);
        w.write_matrix4(&zone.rotation);
        w.write_vector3(&zone.extents);
    }
    Ok(w.into_bytes())
}
