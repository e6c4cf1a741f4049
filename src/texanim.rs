//! Texture-animation model: ordered slots of ordered frames, each frame a
//! UV quad plus texture page and delay.
//!
//! Slot index is positional at the file boundary (.w animation table and
//! the CSV sheet). The two editing operations, the linear transform and
//! the grid fill, are the generators the original tooling exposed; the
//! transform deliberately chains each frame off the previous one, so the
//! drift accumulates across the range.

use serde::{Deserialize, Serialize};

use crate::binary::{BinaryReader, BinaryWriter};
use crate::error::{DecodeError, EncodeError};
use crate::geom::Vector2;

/// Default per-slot frame capacity used by the editor.
pub const DEFAULT_MAX_FRAMES: usize = 256;

/// One timeline step.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    /// Four UV corners in polygon-corner order.
    pub uv: [Vector2; 4],
    /// Texture page, -1 for none.
    pub texture: i32,
    /// Seconds to hold this frame, never negative.
    pub delay: f32,
}

impl Default for Frame {
    fn default() -> Self {
        Frame {
            uv: [Vector2::default(); 4],
            texture: -1,
            delay: 0.0,
        }
    }
}

/// One animated texture channel (a slot).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct TexAnimation {
    pub frames: Vec<Frame>,
}

impl TexAnimation {
    pub fn with_frames(count: usize) -> Self {
        TexAnimation {
            frames: vec![Frame::default(); count],
        }
    }

    /// Frame invariants: delay non-negative, texture -1 or a legal page.
    pub fn validate(&self, max_texture_pages: i32) -> Result<(), EncodeError> {
        for (ordinal, frame) in self.frames.iter().enumerate() {
            if frame.delay < 0.0 || !frame.delay.is_finite() {
                return Err(EncodeError::ValueOutOfRange {
                    field: "frame delay",
                    value: frame.delay as i64,
                }
                .at_record(ordinal));
            }
            if frame.texture < -1 || frame.texture >= max_texture_pages {
                return Err(EncodeError::ValueOutOfRange {
                    field: "frame texture",
                    value: frame.texture as i64,
                }
                .at_record(ordinal));
            }
        }
        Ok(())
    }

    /// Linear transform over the inclusive frame range `start..=end`:
    /// each frame's UVs become the *previous* frame's UVs plus
    /// `delta * t`, wrapped into 0..1, with `t = offset / (span - 1)`
    /// (1 for a single-frame span). The first frame of the range is left
    /// in place (`t = 0`), and the drift accumulates frame over frame.
    pub fn transform(
        &mut self,
        start: usize,
        end: usize,
        delta_u: f32,
        delta_v: f32,
    ) -> Result<(), EncodeError> {
        if start > end || end >= self.frames.len() {
            return Err(EncodeError::IndexOutOfRange {
                index: end as i64,
                limit: self.frames.len(),
            });
        }
        let span = end - start + 1;
        for offset in 0..span {
            let t = if span > 1 {
                offset as f32 / (span - 1) as f32
            } else {
                1.0
            };
            let base = if offset == 0 { start } else { start + offset - 1 };
            for corner in 0..4 {
                let prev = self.frames[base].uv[corner];
                self.frames[start + offset].uv[corner] = Vector2 {
                    u: (prev.u + delta_u * t).rem_euclid(1.0),
                    v: (prev.v + delta_v * t).rem_euclid(1.0),
                };
            }
        }
        Ok(())
    }

    /// Fills the slot with one frame per cell of a `grid_x` x `grid_y`
    /// sheet, row-major, each frame's quad being the cell rectangle.
    pub fn grid_fill(
        &mut self,
        grid_x: usize,
        grid_y: usize,
        max_frames: usize,
        texture: i32,
        delay: f32,
    ) -> Result<(), EncodeError> {
        let requested = grid_x * grid_y;
        if requested > max_frames {
            return Err(EncodeError::FrameCountExceeded {
                requested,
                max: max_frames,
            });
        }
        self.frames.resize(requested, Frame::default());
        let (fx, fy) = (grid_x as f32, grid_y as f32);
        let mut i = 0;
        for y in 0..grid_y {
            for x in 0..grid_x {
                let (x0, y0) = (x as f32 / fx, y as f32 / fy);
                let (x1, y1) = ((x + 1) as f32 / fx, (y + 1) as f32 / fy);
                self.frames[i] = Frame {
                    uv: [
                        Vector2 { u: x0, v: y0 },
                        Vector2 { u: x1, v: y0 },
                        Vector2 { u: x1, v: y1 },
                        Vector2 { u: x0, v: y1 },
                    ],
                    texture,
                    delay,
                };
                i += 1;
            }
        }
        Ok(())
    }
}

/// Reads one animation slot record (frame count + frames) as embedded in
/// the .w animation table.
pub fn read_animation(r: &mut BinaryReader) -> Result<TexAnimation, DecodeError> {
    let frame_count = r.read_count(4 * 8 + 4 + 4)? as usize;
    let frames = r.read_array(frame_count, |r| {
        let uv = [
            r.read_vector2()?,
            r.read_vector2()?,
            r.read_vector2()?,
            r.read_vector2()?,
        ];
        Ok(Frame {
            uv,
            texture: r.read_i32()?,
            delay: r.read_f32()?,
        })
    })?;
    Ok(TexAnimation { frames })
}

/// Writes one animation slot record.
pub fn write_animation(w: &mut BinaryWriter, anim: &TexAnimation) -> Result<(), EncodeError> {
    w.write_count("frame count", anim.frames.len())?;
    for frame in &anim.frames {
        for uv in &frame.uv {
            w.write_vector2(uv);
        }
        w.write_i32(frame.texture);
        w.write_f32(frame.delay);
    }
    Ok(())
}
