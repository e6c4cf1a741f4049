//! CSV texture-animation sheet: the human-editable round-trip format.
//!
//! One row per (slot, frame) in slot-major order. Slots and frame indices
//! are explicit columns so a sheet survives row reordering in external
//! editors; import rebuilds positional order from the columns.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::error::{DecodeError, EncodeError};
use crate::geom::Vector2;
use crate::texanim::{Frame, TexAnimation};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
struct SheetRow {
    slot: u32,
    frame: u32,
    u0: f32,
    v0: f32,
    u1: f32,
    v1: f32,
    u2: f32,
    v2: f32,
    u3: f32,
    v3: f32,
    texture: i32,
    delay: f32,
}

impl SheetRow {
    fn from_frame(slot: usize, frame_index: usize, frame: &Frame) -> Self {
        SheetRow {
            slot: slot as u32,
            frame: frame_index as u32,
            u0: frame.uv[0].u,
            v0: frame.uv[0].v,
            u1: frame.uv[1].u,
            v1: frame.uv[1].v,
            u2: frame.uv[2].u,
            v2: frame.uv[2].v,
            u3: frame.uv[3].u,
            v3: frame.uv[3].v,
            texture: frame.texture,
            delay: frame.delay,
        }
    }

    fn into_frame(self) -> Frame {
        Frame {
            uv: [
                Vector2 {
                    u: self.u0,
                    v: self.v0,
                },
                Vector2 {
                    u: self.u1,
                    v: self.v1,
                },
                Vector2 {
                    u: self.u2,
                    v: self.v2,
                },
                Vector2 {
                    u: self.u3,
                    v: self.v3,
                },
            ],
            texture: self.texture,
            delay: self.delay,
        }
    }
}

/// Writes all slots to a CSV sheet.
pub fn to_bytes(animations: &[TexAnimation]) -> Result<Vec<u8>, EncodeError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for (slot, anim) in animations.iter().enumerate() {
        for (frame_index, frame) in anim.frames.iter().enumerate() {
            writer
                .serialize(SheetRow::from_frame(slot, frame_index, frame))
                .map_err(|e| EncodeError::Sheet {
                    reason: e.to_string(),
                })?;
        }
    }
    writer
        .into_inner()
        .map_err(|e| EncodeError::Sheet {
            reason: e.to_string(),
        })
}

/// Reads a CSV sheet back into positional slots. Slots absent from the
/// sheet come back empty; frames land at their recorded index.
pub fn from_bytes(bytes: &[u8]) -> Result<Vec<TexAnimation>, DecodeError> {
    let mut reader = csv::Reader::from_reader(bytes);
    let mut slots: HashMap<u32, Vec<(u32, Frame)>> = HashMap::new();
    let mut max_slot = None;
    for (row_index, row) in reader.deserialize::<SheetRow>().enumerate() {
        let row = row.map_err(|e| DecodeError::SheetRow {
            row: row_index,
            reason: e.to_string(),
        })?;
        max_slot = Some(max_slot.map_or(row.slot, |m: u32| m.max(row.slot)));
        slots
            .entry(row.slot)
            .or_default()
            .push((row.frame, row.into_frame()));
    }

    let Some(max_slot) = max_slot else {
        return Ok(Vec::new());
    };
    let mut animations = vec![TexAnimation::default(); max_slot as usize + 1];
    for (slot, mut frames) in slots {
        frames.sort_by_key(|(index, _)| *index);
        let anim = &mut animations[slot as usize];
        for (index, frame) in frames {
            let index = index as usize;
            if anim.frames.len() <= index {
                anim.frames.resize(index + 1, Frame::default());
            }
            anim.frames[index] = frame;
        }
    }
    Ok(animations)
}
