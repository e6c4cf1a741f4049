//! Bit-packed polygon and collision flags.
//!
//! The drawable (.prm/.w/.fin) and collision (.ncp) namespaces reuse the
//! same OR'd-constant mechanism on disk but are disjoint sets; keeping them
//! as separate types makes it impossible to write one into the other's
//! field. Bit positions are fixed by the file format and must not change.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Per-polygon render flags, the u16 field of a .prm polygon record.
    #[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PolygonFlags: u16 {
        /// Visible from both sides.
        const DOUBLE_SIDED = 0x0002;
        const TRANSLUCENT  = 0x0004;
        /// Reflected in mirror planes.
        const MIRROR       = 0x0080;
        /// Additive blending instead of alpha.
        const ADDITIVE     = 0x0100;
        /// UVs driven by a texture-animation slot.
        const ANIMATED     = 0x0200;
        const NO_ENV       = 0x0400;
        const ENV          = 0x0800;
        const CLOTH        = 0x1000;
        /// Not exported to the renderer at all.
        const SKIP         = 0x2000;
    }
}

bitflags! {
    /// Per-polyhedron collision flags, the low byte of the .ncp surface word.
    #[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct CollisionFlags: u8 {
        /// Collidable from both sides of the face plane.
        const DOUBLE_SIDED = 0x02;
        const OBJECT_ONLY  = 0x04;
        const CAMERA_ONLY  = 0x08;
        const NO_SKID      = 0x20;
        const OIL          = 0x40;
        const NO_COLLISION = 0x80;
    }
}

/// Packs a material id and the collision flag byte into the on-disk
/// surface word: flags in bits 0..8, material in bits 8..16.
pub fn pack_surface(material: u8, flags: CollisionFlags) -> u32 {
    u32::from(flags.bits()) | (u32::from(material) << 8)
}

/// Inverse of [`pack_surface`]. Unknown flag bits are dropped.
pub fn unpack_surface(word: u32) -> (u8, CollisionFlags) {
    let material = ((word >> 8) & 0xFF) as u8;
    let flags = CollisionFlags::from_bits_truncate((word & 0xFF) as u8);
    (material, flags)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polygon_bits_are_stable() {
        assert_eq!(PolygonFlags::DOUBLE_SIDED.bits(), 0x0002);
        assert_eq!(PolygonFlags::MIRROR.bits(), 0x0080);
        assert_eq!(PolygonFlags::SKIP.bits(), 0x2000);
        let combo = PolygonFlags::TRANSLUCENT | PolygonFlags::ANIMATED;
        assert_eq!(combo.bits(), 0x0204);
    }

    #[test]
    fn surface_word_round_trip() {
        let flags = CollisionFlags::OIL | CollisionFlags::NO_SKID;
        let word = pack_surface(17, flags);
        assert_eq!(word, 0x1160);
        assert_eq!(unpack_surface(word), (17, flags));
    }

    #[test]
    fn unknown_surface_bits_are_dropped() {
        let (material, flags) = unpack_surface(0x0001_0393);
        assert_eq!(material, 3);
        assert_eq!(flags, CollisionFlags::NO_COLLISION | CollisionFlags::DOUBLE_SIDED);
    }
}
