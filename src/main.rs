use std::env;
use std::error::Error;
use std::fs;
use std::path::Path;
use std::process;

use log::info;

use rvkit::{decode, Container, Format};

fn summarize(container: &Container) -> serde_json::Value {
    match container {
        Container::Mesh(mesh) => serde_json::json!({
            "kind": "mesh",
            "vertices": mesh.vertices.len(),
            "polygons": mesh.polygons.len(),
        }),
        Container::Collision(collision) => serde_json::json!({
            "kind": "collision",
            "polyhedra": collision.polyhedra.len(),
            "grid": collision.grid.as_ref().map(|g| {
                serde_json::json!({
                    "cols": g.cols,
                    "rows": g.rows,
                    "cell_size": g.cell_size,
                })
            }),
        }),
        Container::Hull(hull) => serde_json::json!({
            "kind": "hull",
            "convex": hull.convex.len(),
            "spheres": hull.spheres.len(),
        }),
        Container::Instances(fin) => serde_json::json!({
            "kind": "instances",
            "instances": fin.instances.len(),
            "names": fin.instances.iter().map(|i| i.name.as_str()).collect::<Vec<_>>(),
        }),
        Container::World(world) => serde_json::json!({
            "kind": "world",
            "meshes": world.meshes.len(),
            "bigcubes": world.bigcubes.len(),
            "animations": world.animations.len(),
        }),
        Container::MirrorPlanes(rim) => serde_json::json!({
            "kind": "mirror planes",
            "planes": rim.planes.len(),
        }),
        Container::TrackZones(taz) => serde_json::json!({
            "kind": "track zones",
            "zones": taz.zones.len(),
        }),
        Container::Animations(slots) => serde_json::json!({
            "kind": "animations",
            "slots": slots.len(),
            "frames": slots.iter().map(|s| s.frames.len()).collect::<Vec<_>>(),
        }),
    }
}

fn run(path: &Path) -> Result<(), Box<dyn Error>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .ok_or("file has no extension")?;
    let format = Format::from_extension(ext)
        .ok_or_else(|| format!("unsupported extension {ext:?}"))?;
    let bytes = fs::read(path)?;
    info!("{}: {} bytes, format {}", path.display(), bytes.len(), format.name());

    let container = decode(format, &bytes)?;
    println!("{}", serde_json::to_string_pretty(&summarize(&container))?);
    Ok(())
}

fn main() {
    env_logger::init();
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("usage: rvkit <file.{{prm,ncp,hul,fin,w,rim,taz,csv}}>");
        process::exit(2);
    }
    if let Err(err) = run(Path::new(&args[1])) {
        eprintln!("{}: {err}", args[1]);
        process::exit(1);
    }
}
