//! Thin dispatch layer: one decode and one encode entry point over every
//! supported format, keyed by a format tag. The CLI and embedding code go
//! through here; the per-format drivers stay byte-level.

use serde::{Deserialize, Serialize};

use crate::error::{DecodeError, EncodeError};
use crate::fin::Fin;
use crate::hul::Hull;
use crate::mesh::Mesh;
use crate::ncp::Collision;
use crate::rim::Rim;
use crate::scene::ExportOptions;
use crate::taz::Taz;
use crate::texanim::TexAnimation;
use crate::w::{SingleCube, World};
use crate::{fin, hul, ncp, prm, rim, ta_csv, taz, w};

/// Supported file formats.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Prm,
    Ncp,
    Hul,
    Fin,
    W,
    Rim,
    Taz,
    TaCsv,
}

impl Format {
    /// Maps a file extension (case-insensitive, no dot) to its format.
    pub fn from_extension(ext: &str) -> Option<Format> {
        match ext.to_ascii_lowercase().as_str() {
            "prm" | "m" => Some(Format::Prm),
            "ncp" => Some(Format::Ncp),
            "hul" => Some(Format::Hul),
            "fin" => Some(Format::Fin),
            "w" => Some(Format::W),
            "rim" => Some(Format::Rim),
            "taz" => Some(Format::Taz),
            "csv" => Some(Format::TaCsv),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Format::Prm => "prm",
            Format::Ncp => "ncp",
            Format::Hul => "hul",
            Format::Fin => "fin",
            Format::W => "w",
            Format::Rim => "rim",
            Format::Taz => "taz",
            Format::TaCsv => "ta-csv",
        }
    }
}

/// Decoded contents of any supported file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum Container {
    Mesh(Mesh),
    Collision(Collision),
    Hull(Hull),
    Instances(Fin),
    World(World),
    MirrorPlanes(Rim),
    TrackZones(Taz),
    Animations(Vec<TexAnimation>),
}

impl Container {
    pub fn kind(&self) -> &'static str {
        match self {
            Container::Mesh(_) => "mesh",
            Container::Collision(_) => "collision",
            Container::Hull(_) => "hull",
            Container::Instances(_) => "instances",
            Container::World(_) => "world",
            Container::MirrorPlanes(_) => "mirror planes",
            Container::TrackZones(_) => "track zones",
            Container::Animations(_) => "animations",
        }
    }
}

/// Decodes one complete file image into its container.
pub fn decode(format: Format, bytes: &[u8]) -> Result<Container, DecodeError> {
    Ok(match format {
        Format::Prm => Container::Mesh(prm::from_bytes(bytes)?),
        Format::Ncp => Container::Collision(ncp::from_bytes(bytes)?),
        Format::Hul => Container::Hull(hul::from_bytes(bytes)?),
        Format::Fin => Container::Instances(fin::from_bytes(bytes)?),
        Format::W => Container::World(w::from_bytes(bytes)?),
        Format::Rim => Container::MirrorPlanes(rim::from_bytes(bytes)?),
        Format::Taz => Container::TrackZones(taz::from_bytes(bytes)?),
        Format::TaCsv => Container::Animations(ta_csv::from_bytes(bytes)?),
    })
}

/// Encodes a container as one complete file image. Derived structures are
/// rebuilt here, never trusted from the container: a world gets fresh
/// BigCubes, a collision set gets a fresh lookup grid (or none, per the
/// options).
pub fn encode(
    format: Format,
    container: &Container,
    options: &ExportOptions,
) -> Result<Vec<u8>, EncodeError> {
    match (format, container) {
        (Format::Prm, Container::Mesh(mesh)) => prm::to_bytes(mesh),
        (Format::Ncp, Container::Collision(collision)) => {
            let mut collision = collision.clone();
            if options.export_collision_grid {
                collision.build_grid(options.collision_cell_size)?;
            } else {
                collision.grid = None;
            }
            ncp::to_bytes(&collision)
        }
        (Format::Hul, Container::Hull(hull)) => hul::to_bytes(hull),
        (Format::Fin, Container::Instances(fin)) => fin::to_bytes(fin),
        (Format::W, Container::World(world)) => {
            let mut world = world.clone();
            world.generate_bigcubes(&SingleCube);
            w::to_bytes(&world)
        }
        (Format::Rim, Container::MirrorPlanes(rim)) => rim::to_bytes(rim),
        (Format::Taz, Container::TrackZones(taz)) => taz::to_bytes(taz),
        (Format::TaCsv, Container::Animations(animations)) => ta_csv::to_bytes(animations),
        (format, container) => Err(EncodeError::ContainerMismatch {
            format: format.name(),
            container: container.kind(),
        }),
    }
}
