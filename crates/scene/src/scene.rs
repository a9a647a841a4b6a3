//! The immutable traced world

// crate modules
use crate::detector::DetectorArray;
use crate::error::{Error, Result};
use crate::kdtree::IntersectKdTree;
use crate::primitive::{Hit, Primitive, Shape};

// external crates
use gray_physics::GammaMaterial;
use gray_vrmath::{Aabb, Vec3};
use log::info;

/// Primitives, materials, and detectors of one scene
///
/// Mutable only while it is being assembled; [build_tree](Self::build_tree)
/// freezes it for tracing. After that the description is shared by
/// reference across simulation ranks.
#[derive(Debug, Clone, Default)]
pub struct SceneDescription {
    primitives: Vec<Primitive>,
    materials: Vec<GammaMaterial>,
    detectors: DetectorArray,
    tree: Option<IntersectKdTree>,
    default_material: i32,
}

impl SceneDescription {
    pub fn new() -> Self {
        Self::default()
    }

    /// Material table the primitives index into
    pub fn set_materials(&mut self, materials: Vec<GammaMaterial>) {
        self.materials = materials;
    }

    /// Material the world outside all geometry is filled with
    pub fn set_default_material(&mut self, material_id: i32) {
        self.default_material = material_id;
    }

    pub fn default_material(&self) -> i32 {
        self.default_material
    }

    pub fn material(&self, material_id: i32) -> Result<&GammaMaterial> {
        self.materials
            .get(usize::try_from(material_id).map_err(|_| Error::UnknownMaterial(material_id))?)
            .ok_or(Error::UnknownMaterial(material_id))
    }

    pub fn materials(&self) -> &[GammaMaterial] {
        &self.materials
    }

    pub fn detectors(&self) -> &DetectorArray {
        &self.detectors
    }

    pub fn detectors_mut(&mut self) -> &mut DetectorArray {
        &mut self.detectors
    }

    pub fn add_triangle(&mut self, v0: Vec3, v1: Vec3, v2: Vec3, material_id: i32, detector_id: i32) {
        self.primitives.push(Primitive {
            shape: Shape::Triangle { v0, v1, v2 },
            material_id,
            detector_id,
        });
    }

    pub fn add_sphere(&mut self, center: Vec3, radius: f64, material_id: i32, detector_id: i32) {
        self.primitives.push(Primitive {
            shape: Shape::Sphere { center, radius },
            material_id,
            detector_id,
        });
    }

    /// Axis-aligned box as twelve triangles, wound outward
    ///
    /// Detector crystals and simple phantoms are all boxes at heart, so this
    /// is the one composite builder the loaders need.
    pub fn add_box(&mut self, center: Vec3, size: Vec3, material_id: i32, detector_id: i32) {
        let half = size * 0.5;
        let corner = |sx: f64, sy: f64, sz: f64| {
            center + Vec3::new(half.x * sx, half.y * sy, half.z * sz)
        };
        // the eight corners, bit i selecting the sign of axis i
        let corners: Vec<Vec3> = (0..8)
            .map(|bits: i32| {
                corner(
                    if bits & 1 != 0 { 1.0 } else { -1.0 },
                    if bits & 2 != 0 { 1.0 } else { -1.0 },
                    if bits & 4 != 0 { 1.0 } else { -1.0 },
                )
            })
            .collect();
        // two triangles per face, CCW seen from outside
        const FACES: [[usize; 4]; 6] = [
            [1, 3, 7, 5], // +x
            [0, 4, 6, 2], // -x
            [2, 6, 7, 3], // +y
            [0, 1, 5, 4], // -y
            [4, 5, 7, 6], // +z
            [0, 2, 3, 1], // -z
        ];
        for face in FACES {
            self.add_triangle(
                corners[face[0]],
                corners[face[1]],
                corners[face[2]],
                material_id,
                detector_id,
            );
            self.add_triangle(
                corners[face[0]],
                corners[face[2]],
                corners[face[3]],
                material_id,
                detector_id,
            );
        }
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    /// Scene extents, available once the tree is built
    pub fn extents(&self) -> Aabb {
        self.tree
            .as_ref()
            .map(|tree| tree.bounds())
            .unwrap_or_default()
    }

    /// Freeze the scene and build the acceleration tree
    pub fn build_tree(&mut self, object_cost: f64) -> Result<()> {
        let tree = IntersectKdTree::build_with_cost(&self.primitives, object_cost)?;
        info!(
            "scene frozen: {} primitives, {} detectors, {} materials",
            self.primitives.len(),
            self.detectors.len(),
            self.materials.len()
        );
        self.tree = Some(tree);
        Ok(())
    }

    /// Nearest surface hit along `dir`, skipping the primitive `avoid_id`
    pub fn seek_intersection(
        &self,
        origin: &Vec3,
        dir: &Vec3,
        avoid_id: Option<u32>,
    ) -> Option<Hit> {
        self.tree
            .as_ref()
            .and_then(|tree| tree.seek_intersection(&self.primitives, origin, dir, avoid_id))
    }
}
