//! The scene description document
//!
//! A JSON document naming the materials table, the world geometry, the
//! detector blocks, the sources, and the DAQ stage lines. The legacy
//! NFF-style grammar is intentionally not supported; this document is the
//! one way a scene reaches the simulator.

// crate modules
use crate::config::{find_file, Config};
use crate::error::{Error, Result};

// standard library
use std::fs::File;
use std::io::BufReader;

// external crates
use gray_physics::{load_materials, material_index, Isotope};
use gray_scene::SceneDescription;
use gray_sources::{Source, SourceShape, VectorShape, VoxelGrid};
use gray_vrmath::{ref_axis_plus_trans_to_map, Vec3};
use log::info;
use serde::Deserialize;

/// Top-level scene document
#[derive(Debug, Deserialize)]
struct SceneFile {
    /// Materials table file, resolved via the include path
    materials: String,
    /// Isotope table file, resolved via the include path
    #[serde(default)]
    isotopes: Option<String>,
    /// Material filling space outside all geometry
    default_material: String,
    #[serde(default)]
    primitives: Vec<PrimitiveDef>,
    #[serde(default)]
    detectors: Vec<DetectorBlockDef>,
    #[serde(default)]
    sources: Vec<SourceDef>,
    /// One DAQ stage description per line
    #[serde(default)]
    daq: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum PrimitiveDef {
    Sphere {
        center: [f64; 3],
        radius: f64,
        material: String,
    },
    Box {
        center: [f64; 3],
        size: [f64; 3],
        material: String,
    },
    Triangle {
        v0: [f64; 3],
        v1: [f64; 3],
        v2: [f64; 3],
        material: String,
    },
}

/// A rectangular block of detector crystals
///
/// Crystals are laid out on a regular grid in the block's local frame,
/// oriented along `axis`, and every crystal becomes one detector id.
#[derive(Debug, Deserialize)]
struct DetectorBlockDef {
    center: [f64; 3],
    #[serde(default = "default_axis")]
    axis: [f64; 3],
    crystal_size: [f64; 3],
    counts: [i32; 3],
    #[serde(default)]
    pitch: Option<[f64; 3]>,
    material: String,
}

fn default_axis() -> [f64; 3] {
    [0.0, 0.0, 1.0]
}

#[derive(Debug, Deserialize)]
struct SourceDef {
    #[serde(flatten)]
    shape: ShapeDef,
    /// Microcuries; negative carves activity out of positive sources
    activity: f64,
    isotope: String,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ShapeDef {
    Point { position: [f64; 3] },
    Sphere { center: [f64; 3], radius: f64 },
    Cylinder { center: [f64; 3], radius: f64, axis: [f64; 3] },
    AnnulusCylinder { center: [f64; 3], radius: f64, axis: [f64; 3] },
    EllipticCylinder { center: [f64; 3], radius1: f64, radius2: f64, axis: [f64; 3] },
    AnnulusEllipticCylinder { center: [f64; 3], radius1: f64, radius2: f64, axis: [f64; 3] },
    Rect { center: [f64; 3], size: [f64; 3], orientation: [f64; 3] },
    Ellipsoid { center: [f64; 3], radius1: f64, radius2: f64, radius3: f64, axis: [f64; 3] },
    Voxel { file: String, position: [f64; 3], scale: [f64; 3] },
    Vector { triangles: Vec<[[f64; 3]; 3]> },
    BeamPoint { position: [f64; 3], axis: [f64; 3], angle_deg: f64, energy: f64 },
}

fn vec3(value: [f64; 3]) -> Vec3 {
    Vec3::new(value[0], value[1], value[2])
}

/// Load a scene document into the world, the sources, and the DAQ lines
pub fn load_scene_file(
    config: &Config,
) -> Result<(SceneDescription, gray_sources::SourceList, Vec<String>)> {
    let path = find_file(&config.scene_path)?;
    let document: SceneFile = serde_json::from_reader(BufReader::new(File::open(&path)?))?;
    info!("loading scene from {}", path.display());

    let materials_path = match &config.materials_path {
        Some(path) => path.clone(),
        None => find_file(&document.materials)?,
    };
    let materials = load_materials(&materials_path)?;

    let mut sources = gray_sources::SourceList::new();
    sources.set_start_time(config.start_time);
    sources.set_simulation_time(config.time);
    sources.set_simulate_isotope_half_life(config.simulate_isotope_half_life);
    match (&config.isotopes_path, &document.isotopes) {
        (Some(path), _) => sources.load_isotopes(path)?,
        (None, Some(name)) => sources.load_isotopes(find_file(name)?)?,
        (None, None) => {}
    }

    let mut scene = SceneDescription::new();
    let default_material = material_index(&materials, &document.default_material)?;
    scene.set_default_material(default_material);

    for primitive in &document.primitives {
        add_primitive(&mut scene, &materials, primitive)?;
    }
    for (block_number, block) in document.detectors.iter().enumerate() {
        add_detector_block(&mut scene, &materials, block, block_number as i32)?;
    }

    for source in document.sources {
        let (shape, isotope) = build_shape(&source, &sources)?;
        let built = Source::new(shape, source.activity, isotope)?
            .with_material(default_material);
        sources.add_source(built);
    }

    scene.set_materials(materials);
    scene.build_tree(8.0)?;
    Ok((scene, sources, document.daq))
}

fn add_primitive(
    scene: &mut SceneDescription,
    materials: &[gray_physics::GammaMaterial],
    primitive: &PrimitiveDef,
) -> Result<()> {
    match primitive {
        PrimitiveDef::Sphere {
            center,
            radius,
            material,
        } => {
            let material_id = material_index(materials, material)?;
            scene.add_sphere(vec3(*center), *radius, material_id, -1);
        }
        PrimitiveDef::Box {
            center,
            size,
            material,
        } => {
            let material_id = material_index(materials, material)?;
            scene.add_box(vec3(*center), vec3(*size), material_id, -1);
        }
        PrimitiveDef::Triangle {
            v0,
            v1,
            v2,
            material,
        } => {
            let material_id = material_index(materials, material)?;
            scene.add_triangle(vec3(*v0), vec3(*v1), vec3(*v2), material_id, -1);
        }
    }
    Ok(())
}

/// Lay a block's crystals out on its grid and register each as a detector
fn add_detector_block(
    scene: &mut SceneDescription,
    materials: &[gray_physics::GammaMaterial],
    block: &DetectorBlockDef,
    block_number: i32,
) -> Result<()> {
    let material_id = material_index(materials, &block.material)?;
    let crystal_size = vec3(block.crystal_size);
    let pitch = block.pitch.map(vec3).unwrap_or(crystal_size);
    let axis = vec3(block.axis).normalize();
    let center = vec3(block.center);
    let map = ref_axis_plus_trans_to_map(&axis, &center);

    for x in 0..block.counts[0] {
        for y in 0..block.counts[1] {
            for z in 0..block.counts[2] {
                let local = Vec3::new(
                    (f64::from(x) - f64::from(block.counts[0] - 1) / 2.0) * pitch.x,
                    (f64::from(y) - f64::from(block.counts[1] - 1) / 2.0) * pitch.y,
                    (f64::from(z) - f64::from(block.counts[2] - 1) / 2.0) * pitch.z,
                );
                let position = map.transform(&local);
                let detector_id = scene.detectors_mut().add_detector(
                    position,
                    crystal_size,
                    map,
                    [x, y, z],
                    block_number,
                );
                scene.add_box(position, crystal_size, material_id, detector_id);
            }
        }
    }
    Ok(())
}

fn build_shape(
    source: &SourceDef,
    sources: &gray_sources::SourceList,
) -> Result<(SourceShape, Isotope)> {
    let shape = match &source.shape {
        ShapeDef::Point { position } => SourceShape::Point {
            position: vec3(*position),
        },
        ShapeDef::Sphere { center, radius } => SourceShape::Sphere {
            center: vec3(*center),
            radius: *radius,
        },
        ShapeDef::Cylinder {
            center,
            radius,
            axis,
        } => SourceShape::cylinder(vec3(*center), *radius, vec3(*axis)),
        ShapeDef::AnnulusCylinder {
            center,
            radius,
            axis,
        } => SourceShape::annulus_cylinder(vec3(*center), *radius, vec3(*axis)),
        ShapeDef::EllipticCylinder {
            center,
            radius1,
            radius2,
            axis,
        } => SourceShape::elliptic_cylinder(vec3(*center), *radius1, *radius2, vec3(*axis)),
        ShapeDef::AnnulusEllipticCylinder {
            center,
            radius1,
            radius2,
            axis,
        } => {
            SourceShape::annulus_elliptic_cylinder(vec3(*center), *radius1, *radius2, vec3(*axis))
        }
        ShapeDef::Rect {
            center,
            size,
            orientation,
        } => SourceShape::rect(vec3(*center), vec3(*size), vec3(*orientation)),
        ShapeDef::Ellipsoid {
            center,
            radius1,
            radius2,
            radius3,
            axis,
        } => SourceShape::ellipsoid(vec3(*center), *radius1, *radius2, *radius3, vec3(*axis)),
        ShapeDef::Voxel {
            file,
            position,
            scale,
        } => SourceShape::Voxel(VoxelGrid::load(
            find_file(file)?,
            vec3(*position),
            vec3(*scale),
        )?),
        ShapeDef::Vector { triangles } => {
            let triangles: Vec<[Vec3; 3]> = triangles
                .iter()
                .map(|t| [vec3(t[0]), vec3(t[1]), vec3(t[2])])
                .collect();
            SourceShape::Vector(VectorShape::from_triangles(&triangles)?)
        }
        ShapeDef::BeamPoint {
            position,
            axis,
            angle_deg,
            energy,
        } => {
            let shape = SourceShape::BeamPoint {
                position: vec3(*position),
            };
            let isotope = Isotope::beam(vec3(*axis), *angle_deg, *energy);
            return Ok((shape, isotope));
        }
    };
    let isotope = sources.isotope(&source.isotope).map_err(Error::Sources)?;
    Ok((shape, isotope))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gray_output::WriteFlags;
    use std::io::Write;
    use std::path::PathBuf;

    const MATERIALS: &str = r#"{
        "air": {
            "density": 0.0012,
            "energy": [0.01, 0.1, 1.0],
            "matten_comp": [0.0001, 0.0002, 0.0001],
            "matten_phot": [0.005, 0.0001, 0.0],
            "matten_rayl": [0.0001, 0.0, 0.0],
            "x": [0.0, 10.0, 100.0],
            "form_factor": [7.0, 1.0, 0.01],
            "scattering_func": [0.0, 6.0, 7.0]
        },
        "lso": {
            "density": 7.4,
            "energy": [0.01, 0.1, 1.0],
            "matten_comp": [0.2, 0.6, 0.3],
            "matten_phot": [30.0, 2.0, 0.01],
            "matten_rayl": [0.5, 0.01, 0.001],
            "x": [0.0, 10.0, 100.0],
            "form_factor": [30.0, 3.0, 0.1],
            "scattering_func": [0.0, 20.0, 30.0]
        }
    }"#;

    fn write_temp(tag: &str, content: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("gray_scenefile_{tag}_{}.json", std::process::id()));
        let mut file = File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_a_complete_document() {
        let materials_path = write_temp("materials", MATERIALS);
        let scene_json = format!(
            r#"{{
                "materials": "{}",
                "default_material": "air",
                "primitives": [
                    {{"type": "sphere", "center": [0, 0, 0], "radius": 5.0, "material": "air"}}
                ],
                "detectors": [
                    {{"center": [0, 0, 10], "crystal_size": [0.3, 0.3, 2.0],
                      "counts": [2, 2, 1], "material": "lso"}}
                ],
                "sources": [
                    {{"type": "sphere", "center": [0, 0, 0], "radius": 1.0,
                      "activity": 5.0, "isotope": "backback"}},
                    {{"type": "cylinder", "center": [0, 0, 0], "radius": 0.2,
                      "axis": [0, 0, 1.0], "activity": -1.0, "isotope": "backback"}}
                ],
                "daq": ["blur energy 0.13", "sort 500e-9", "coinc window 10e-9"]
            }}"#,
            materials_path.display()
        );
        let scene_path = write_temp("scene", &scene_json);

        let config = Config {
            scene_path: scene_path.clone(),
            singles_path: Some(PathBuf::from("unused")),
            flags: WriteFlags::all(),
            ..Default::default()
        };
        let (scene, sources, daq_lines) = load_scene_file(&config).unwrap();
        std::fs::remove_file(&materials_path).ok();
        std::fs::remove_file(&scene_path).ok();

        // 4 crystals of 12 triangles each plus the phantom sphere
        assert_eq!(scene.detectors().len(), 4);
        assert_eq!(scene.primitives().len(), 4 * 12 + 1);
        assert_eq!(sources.sources().len(), 1);
        assert_eq!(daq_lines.len(), 3);
        assert_eq!(scene.default_material(), 0);
    }
}
