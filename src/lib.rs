//! Codec and geometry-preparation toolkit for the classic racing-game
//! track formats: meshes (.prm), instanced meshes (.fin), collision
//! polyhedra with their lookup grid (.ncp), convex and sphere hulls
//! (.hul), worlds with BigCubes and texture animations (.w), mirror
//! planes (.rim), track zones (.taz) and the CSV animation sheet.
//!
//! All binary formats are packed little-endian; decode and encode are
//! exact inverses over well-formed files. Derived structures (the
//! collision lookup grid, the BigCube list, hull face planes) are
//! rebuilt at export time rather than trusted from input.

pub mod api;
pub mod binary;
pub mod error;
pub mod fin;
pub mod flags;
pub mod geom;
pub mod hul;
pub mod lookup;
pub mod mesh;
pub mod ncp;
pub mod prm;
pub mod rim;
pub mod scene;
pub mod ta_csv;
pub mod taz;
pub mod texanim;
pub mod w;

pub use api::{decode, encode, Container, Format};
pub use error::{DecodeError, EncodeError, ExportIssue, IssueLog};
pub use scene::{ExportOptions, ObjectData, SceneObject, SceneSnapshot};
