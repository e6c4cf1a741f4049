//! .rim driver: mirror planes pairing reflected geometry.

use serde::{Deserialize, Serialize};

use crate::binary::{BinaryReader, BinaryWriter};
use crate::error::{DecodeError, EncodeError};
use crate::geom::Plane;

/// Fixed width of the reference tag field.
pub const TAG_LEN: usize = 32;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct MirrorPlane {
    pub plane: Plane,
    /// Object name used to pair the mirrored geometry.
    pub tag: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Rim {
    pub planes: Vec<MirrorPlane>,
}

const RECORD_SIZE: usize = 16 + TAG_LEN;

pub fn from_bytes(bytes: &[u8]) -> Result<Rim, DecodeError> {
    let mut r = BinaryReader::new(bytes);
    let count = r.read_count(RECORD_SIZE)? as usize;
    let planes = r.read_array(count, |r| {
        Ok(MirrorPlane {
            plane: Plane {
                normal: r.read_vector3()?,
                distance: r.read_f32()?,
            },
            tag: r.read_fixed_string(TAG_LEN)?,
        })
    })?;
    r.expect_end()?;
    Ok(Rim { planes })
}

pub fn to_bytes(rim: &Rim) -> Result<Vec<u8>, EncodeError> {
    let mut w = BinaryWriter::new();
    w.write_count("mirror plane count", rim.planes.len())?;
    for (ordinal, mirror) in rim.planes.iter().enumerate() {
        w.write_vector3(&mirror.plane.normal);
        w.write_f32(mirror.plane.distance);
        w.write_fixed_string(&mirror.tag, TAG_LEN)
            .map_err(|e| e.at_record(ordinal))?;
    }
    Ok(w.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Vector3;

    #[test]
    fn round_trip() {
        let rim = Rim {
            planes: vec![MirrorPlane {
                plane: Plane {
                    normal: Vector3::new(0.0, 1.0, 0.0),
                    distance: -25.0,
                },
                tag: "lobby_floor".to_string(),
            }],
        };
        let bytes = to_bytes(&rim).unwrap();
        assert_eq!(bytes.len(), 4 + RECORD_SIZE);
        assert_eq!(from_bytes(&bytes).unwrap(), rim);
    }

    #[test]
    fn overlong_tag_is_rejected() {
        let rim = Rim {
            planes: vec![MirrorPlane {
                plane: Plane::default(),
                tag: "a".repeat(TAG_LEN + 1),
            }],
        };
        let err = to_bytes(&rim).unwrap_err();
        match err {
            EncodeError::Record { ordinal, source } => {
                assert_eq!(ordinal, 0);
                assert!(matches!(*source, EncodeError::FieldTooLong { .. }));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
