//! Scene snapshot: the immutable value the editor hands the export
//! pipeline, replacing any notion of a live scene graph.
//!
//! Every editor object arrives as one [`SceneObject`] with an explicit
//! kind tag; the old per-object property-bag flags ("is_instance",
//! "is_hull_convex", ...) become variants of [`ObjectData`]. Conversion
//! failures are collected per object and the pipeline keeps going, so a
//! single bad mesh never aborts a whole world export.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::IssueLog;
use crate::fin::{Fin, Instance};
use crate::flags::CollisionFlags;
use crate::geom::{BoundingBox, Matrix4, Vector3};
use crate::hul::{ConvexHull, Hull, HullSphere};
use crate::lookup::DEFAULT_CELL_SIZE;
use crate::mesh::Mesh;
use crate::ncp::{Collision, Polyhedron};
use crate::rim::{MirrorPlane, Rim};
use crate::taz::{TrackZone, Taz};
use crate::texanim::{TexAnimation, DEFAULT_MAX_FRAMES};
use crate::w::{SingleCube, World};

/// Global export options, fixed before conversion begins.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ExportOptions {
    pub apply_scale: bool,
    pub apply_rotation: bool,
    pub apply_translation: bool,
    /// Editor-side hint: n-gons are split before the snapshot is built.
    pub triangulate_ngons: bool,
    /// Take texture pages from the polygon records instead of material
    /// slot lookup (editor-side concern, carried through the options).
    pub use_texture_number: bool,
    pub collision_cell_size: f32,
    pub export_collision_grid: bool,
    pub max_slots: usize,
    pub max_frames: usize,
    pub max_texture_pages: i32,
}

impl Default for ExportOptions {
    fn default() -> Self {
        ExportOptions {
            apply_scale: true,
            apply_rotation: true,
            apply_translation: true,
            triangulate_ngons: true,
            use_texture_number: false,
            collision_cell_size: DEFAULT_CELL_SIZE,
            export_collision_grid: true,
            max_slots: 10,
            max_frames: DEFAULT_MAX_FRAMES,
            max_texture_pages: 10,
        }
    }
}

/// What one scene object is, selected by kind rather than by a pile of
/// independent booleans.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum ObjectData {
    Mesh(Mesh),
    Instance(Instance),
    /// Mesh used for collision only; one flag set for all its polygons.
    CollisionOnly { mesh: Mesh, flags: CollisionFlags },
    MirrorPlane(MirrorPlane),
    HullSphere(HullSphere),
    HullConvex(ConvexHull),
    TrackZone(TrackZone),
    /// Editor visualization helper, never exported.
    BigCubeMarker(BoundingBox),
}

/// Decomposed world transform; the apply-* options toggle each part.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub translation: Vector3,
    /// Pure rotation part of the world matrix.
    pub rotation: Matrix4,
    pub scale: Vector3,
}

impl Default for Placement {
    fn default() -> Self {
        Placement {
            translation: Vector3::ZERO,
            rotation: Matrix4::IDENTITY,
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub name: String,
    pub placement: Placement,
    /// World-space bounds as reported by the editor.
    pub bounds: BoundingBox,
    pub data: ObjectData,
}

/// The complete input of one export operation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct SceneSnapshot {
    pub objects: Vec<SceneObject>,
    pub animations: Vec<TexAnimation>,
    pub options: ExportOptions,
}

fn rotate(m: &Matrix4, v: &Vector3) -> Vector3 {
    Vector3::new(
        m.rows[0][0] * v.x + m.rows[0][1] * v.y + m.rows[0][2] * v.z,
        m.rows[1][0] * v.x + m.rows[1][1] * v.y + m.rows[1][2] * v.z,
        m.rows[2][0] * v.x + m.rows[2][1] * v.y + m.rows[2][2] * v.z,
    )
}

/// Bakes the placement into mesh vertices according to the apply-*
/// options. Normals see rotation only.
fn bake_mesh(mesh: &Mesh, placement: &Placement, options: &ExportOptions) -> Mesh {
    let mut out = mesh.clone();
    for vertex in &mut out.vertices {
        let mut p = vertex.position;
        if options.apply_scale {
            p = Vector3::new(
                p.x * placement.scale.x,
                p.y * placement.scale.y,
                p.z * placement.scale.z,
            );
        }
        if options.apply_rotation {
            p = rotate(&placement.rotation, &p);
            vertex.normal = rotate(&placement.rotation, &vertex.normal);
        }
        if options.apply_translation {
            p = p.add(&placement.translation);
        }
        vertex.position = p;
    }
    out
}

/// Converts the snapshot's world geometry into a .w container. Bad
/// objects are recorded and skipped. BigCubes are generated last.
pub fn export_world(snapshot: &SceneSnapshot) -> (World, IssueLog) {
    let mut world = World::default();
    let mut log = IssueLog::new();

    for object in &snapshot.objects {
        let ObjectData::Mesh(mesh) = &object.data else {
            continue;
        };
        let baked = bake_mesh(mesh, &object.placement, &snapshot.options);
        match baked.validate() {
            Ok(()) => world.meshes.push(baked),
            Err(err) => {
                warn!("world export: skipping {}: {err}", object.name);
                log.record(&object.name, err);
            }
        }
    }

    for (slot, anim) in snapshot
        .animations
        .iter()
        .take(snapshot.options.max_slots)
        .enumerate()
    {
        match anim.validate(snapshot.options.max_texture_pages) {
            Ok(()) => world.animations.push(anim.clone()),
            Err(err) => {
                warn!("world export: clearing animation slot {slot}: {err}");
                log.record(&format!("animation slot {slot}"), err);
                world.animations.push(TexAnimation::default());
            }
        }
    }

    world.generate_bigcubes(&SingleCube);
    debug!(
        "world export: {} meshes, {} issues",
        world.meshes.len(),
        log.len()
    );
    (world, log)
}

/// Converts collision geometry (dedicated collision meshes plus regular
/// world meshes) into an .ncp container, building the lookup grid when
/// the options ask for it.
pub fn export_collision(snapshot: &SceneSnapshot) -> (Collision, IssueLog) {
    let mut collision = Collision::default();
    let mut log = IssueLog::new();

    for object in &snapshot.objects {
        let (mesh, flags) = match &object.data {
            ObjectData::Mesh(mesh) => (mesh, CollisionFlags::empty()),
            ObjectData::CollisionOnly { mesh, flags } => (mesh, *flags),
            _ => continue,
        };
        let baked = bake_mesh(mesh, &object.placement, &snapshot.options);
        if let Err(err) = baked.validate() {
            log.record(&object.name, err);
            continue;
        }
        for (ordinal, poly) in baked.polygons.iter().enumerate() {
            let material = poly.material.clamp(0, u8::MAX as i16) as u8;
            match Polyhedron::from_polygon(&baked, poly, material, flags) {
                Ok(polyhedron) => collision.polyhedra.push(polyhedron),
                Err(err) => log.record(&object.name, err.at_record(ordinal)),
            }
        }
    }

    if snapshot.options.export_collision_grid {
        if let Err(err) = collision.build_grid(snapshot.options.collision_cell_size) {
            log.record("collision grid", err);
        }
    }
    (collision, log)
}

/// Collects instance objects into a .fin container. An instance whose
/// embedded mesh fails validation is recorded and skipped.
pub fn export_instances(snapshot: &SceneSnapshot) -> (Fin, IssueLog) {
    let mut fin = Fin::default();
    let mut log = IssueLog::new();

    for object in &snapshot.objects {
        let ObjectData::Instance(instance) = &object.data else {
            continue;
        };
        match instance.mesh.validate() {
            Ok(()) => fin.instances.push(instance.clone()),
            Err(err) => {
                warn!("instance export: skipping {}: {err}", object.name);
                log.record(&object.name, err);
            }
        }
    }
    (fin, log)
}

/// Collects hull objects into a .hul container, generating faces for
/// convex hulls that arrive as bare vertex clouds.
pub fn export_hull(snapshot: &SceneSnapshot) -> (Hull, IssueLog) {
    let mut hull = Hull::default();
    let mut log = IssueLog::new();

    for object in &snapshot.objects {
        match &object.data {
            ObjectData::HullConvex(convex) => {
                let mut convex = convex.clone();
                if convex.vertices.is_empty() && !convex.faces.is_empty() {
                    hull.convex.push(convex);
                    continue;
                }
                match convex.generate_faces() {
                    Ok(()) => hull.convex.push(convex),
                    Err(err) => log.record(&object.name, err),
                }
            }
            ObjectData::HullSphere(sphere) => hull.spheres.push(*sphere),
            _ => {}
        }
    }
    (hull, log)
}

/// Collects mirror planes into a .rim container.
pub fn export_mirror_planes(snapshot: &SceneSnapshot) -> Rim {
    Rim {
        planes: snapshot
            .objects
            .iter()
            .filter_map(|o| match &o.data {
                ObjectData::MirrorPlane(plane) => Some(plane.clone()),
                _ => None,
            })
            .collect(),
    }
}

/// Collects track zones into a .taz container.
pub fn export_track_zones(snapshot: &SceneSnapshot) -> Taz {
    Taz {
        zones: snapshot
            .objects
            .iter()
            .filter_map(|o| match &o.data {
                ObjectData::TrackZone(zone) => Some(*zone),
                _ => None,
            })
            .collect(),
    }
}
