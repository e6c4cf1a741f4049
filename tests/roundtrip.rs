//! End-to-end tests through the public API: scene export, encode to
//! bytes, decode back, and compare.

use rvkit::fin::Instance;
use rvkit::flags::{CollisionFlags, PolygonFlags};
use rvkit::geom::{Color, Plane, Vector2, Vector3};
use rvkit::hul::{ConvexHull, HullSphere};
use rvkit::mesh::{Mesh, Polygon, Vertex};
use rvkit::rim::MirrorPlane;
use rvkit::scene::{self, ObjectData, Placement, SceneObject, SceneSnapshot};
use rvkit::taz::TrackZone;
use rvkit::texanim::TexAnimation;
use rvkit::{decode, encode, Container, ExportOptions, Format};

fn floor_mesh(size: f32) -> Mesh {
    let positions = [
        (0.0, 0.0, 0.0),
        (size, 0.0, 0.0),
        (size, 0.0, size),
        (0.0, 0.0, size),
    ];
    Mesh {
        name: String::new(),
        vertices: positions
            .iter()
            .map(|&(x, y, z)| Vertex {
                position: Vector3::new(x, y, z),
                normal: Vector3::new(0.0, 1.0, 0.0),
                color: Color::WHITE,
            })
            .collect(),
        polygons: vec![Polygon {
            indices: [0, 1, 2, 3],
            material: 4,
            texture: 1,
            flags: PolygonFlags::DOUBLE_SIDED,
        }],
        uvs: vec![
            Vector2 { u: 0.0, v: 0.0 },
            Vector2 { u: 1.0, v: 0.0 },
            Vector2 { u: 1.0, v: 1.0 },
            Vector2 { u: 0.0, v: 1.0 },
        ],
    }
}

fn object(name: &str, data: ObjectData) -> SceneObject {
    SceneObject {
        name: name.to_string(),
        placement: Placement::default(),
        bounds: rvkit::geom::BoundingBox::empty(),
        data,
    }
}

fn track_snapshot() -> SceneSnapshot {
    let mut anim = TexAnimation::default();
    anim.grid_fill(2, 2, 64, 3, 0.1).unwrap();
    SceneSnapshot {
        objects: vec![
            object("floor", ObjectData::Mesh(floor_mesh(2000.0))),
            object(
                "wall",
                ObjectData::CollisionOnly {
                    mesh: floor_mesh(500.0),
                    flags: CollisionFlags::DOUBLE_SIDED | CollisionFlags::NO_SKID,
                },
            ),
            object(
                "mirror",
                ObjectData::MirrorPlane(MirrorPlane {
                    plane: Plane {
                        normal: Vector3::new(0.0, 1.0, 0.0),
                        distance: 0.0,
                    },
                    tag: "floor".to_string(),
                }),
            ),
            object("zone0", ObjectData::TrackZone(TrackZone::default())),
        ],
        animations: vec![anim],
        options: ExportOptions::default(),
    }
}

#[test]
fn world_export_and_round_trip() {
    let snapshot = track_snapshot();
    let (world, log) = scene::export_world(&snapshot);
    assert!(log.is_empty(), "unexpected issues: {:?}", log.issues());
    assert_eq!(world.meshes.len(), 1);
    assert_eq!(world.animations.len(), 1);

    let bytes = encode(
        Format::W,
        &Container::World(world.clone()),
        &snapshot.options,
    )
    .unwrap();
    match decode(Format::W, &bytes).unwrap() {
        Container::World(back) => assert_eq!(back, world),
        other => panic!("unexpected container {}", other.kind()),
    }
}

#[test]
fn collision_export_and_round_trip() {
    let snapshot = track_snapshot();
    let (collision, log) = scene::export_collision(&snapshot);
    assert!(log.is_empty(), "unexpected issues: {:?}", log.issues());
    // The world floor and the dedicated collision wall both contribute.
    assert_eq!(collision.polyhedra.len(), 2);
    let grid = collision.grid.as_ref().unwrap();
    // 2000-unit floor at the default 1024 cell size.
    assert_eq!((grid.cols, grid.rows), (2, 2));

    let bytes = encode(
        Format::Ncp,
        &Container::Collision(collision.clone()),
        &snapshot.options,
    )
    .unwrap();
    match decode(Format::Ncp, &bytes).unwrap() {
        Container::Collision(back) => assert_eq!(back, collision),
        other => panic!("unexpected container {}", other.kind()),
    }
}

#[test]
fn hull_export_and_round_trip() {
    let mut vertices = Vec::new();
    for &x in &[-10.0, 10.0] {
        for &y in &[0.0, 5.0] {
            for &z in &[-20.0, 20.0] {
                vertices.push(Vector3::new(x, y, z));
            }
        }
    }
    let snapshot = SceneSnapshot {
        objects: vec![
            object(
                "body",
                ObjectData::HullConvex(ConvexHull {
                    material: 1,
                    vertices,
                    faces: Vec::new(),
                }),
            ),
            object(
                "wheel",
                ObjectData::HullSphere(HullSphere {
                    material: 1,
                    center: Vector3::new(0.0, 2.0, -15.0),
                    radius: 4.0,
                }),
            ),
        ],
        animations: Vec::new(),
        options: ExportOptions::default(),
    };
    let (hull, log) = scene::export_hull(&snapshot);
    assert!(log.is_empty(), "unexpected issues: {:?}", log.issues());
    assert_eq!(hull.convex[0].faces.len(), 6);
    assert_eq!(hull.spheres.len(), 1);

    let bytes = encode(
        Format::Hul,
        &Container::Hull(hull.clone()),
        &snapshot.options,
    )
    .unwrap();
    match decode(Format::Hul, &bytes).unwrap() {
        Container::Hull(back) => assert_eq!(back, hull),
        other => panic!("unexpected container {}", other.kind()),
    }
}

#[test]
fn instance_export_and_round_trip() {
    let snapshot = SceneSnapshot {
        objects: vec![object(
            "barrel",
            ObjectData::Instance(Instance {
                name: "barrel".to_string(),
                position: Vector3::new(120.0, 0.0, -40.0),
                lod_bias: 1,
                mesh: floor_mesh(50.0),
                ..Instance::default()
            }),
        )],
        animations: Vec::new(),
        options: ExportOptions::default(),
    };
    let (fin, log) = scene::export_instances(&snapshot);
    assert!(log.is_empty(), "unexpected issues: {:?}", log.issues());
    assert_eq!(fin.instances.len(), 1);

    let bytes = encode(
        Format::Fin,
        &Container::Instances(fin.clone()),
        &snapshot.options,
    )
    .unwrap();
    assert_eq!(
        decode(Format::Fin, &bytes).unwrap(),
        Container::Instances(fin)
    );
}

#[test]
fn ancillary_formats_round_trip() {
    let snapshot = track_snapshot();

    let rim = scene::export_mirror_planes(&snapshot);
    let bytes = encode(
        Format::Rim,
        &Container::MirrorPlanes(rim.clone()),
        &snapshot.options,
    )
    .unwrap();
    assert_eq!(
        decode(Format::Rim, &bytes).unwrap(),
        Container::MirrorPlanes(rim)
    );

    let taz = scene::export_track_zones(&snapshot);
    let bytes = encode(
        Format::Taz,
        &Container::TrackZones(taz.clone()),
        &snapshot.options,
    )
    .unwrap();
    assert_eq!(
        decode(Format::Taz, &bytes).unwrap(),
        Container::TrackZones(taz)
    );
}

#[test]
fn animation_sheet_round_trip_through_api() {
    let snapshot = track_snapshot();
    let bytes = encode(
        Format::TaCsv,
        &Container::Animations(snapshot.animations.clone()),
        &snapshot.options,
    )
    .unwrap();
    assert_eq!(
        decode(Format::TaCsv, &bytes).unwrap(),
        Container::Animations(snapshot.animations)
    );
}

#[test]
fn prm_round_trip_through_api() {
    let mesh = floor_mesh(100.0);
    let bytes = encode(
        Format::Prm,
        &Container::Mesh(mesh.clone()),
        &ExportOptions::default(),
    )
    .unwrap();
    assert_eq!(decode(Format::Prm, &bytes).unwrap(), Container::Mesh(mesh));
}

#[test]
fn truncated_input_is_rejected_for_every_binary_format() {
    let mesh = floor_mesh(100.0);
    let options = ExportOptions::default();
    let images = vec![
        (
            Format::Prm,
            encode(Format::Prm, &Container::Mesh(mesh), &options).unwrap(),
        ),
        (
            Format::Rim,
            encode(
                Format::Rim,
                &Container::MirrorPlanes(scene::export_mirror_planes(&track_snapshot())),
                &options,
            )
            .unwrap(),
        ),
        (
            Format::Taz,
            encode(
                Format::Taz,
                &Container::TrackZones(scene::export_track_zones(&track_snapshot())),
                &options,
            )
            .unwrap(),
        ),
    ];
    for (format, bytes) in images {
        assert!(
            decode(format, &bytes[..bytes.len() - 1]).is_err(),
            "{} accepted truncated input",
            format.name()
        );
    }
}
