//! Closed-surface sources

// crate modules
use crate::error::Result;

// external crates
use gray_random::GrayRng;
use gray_scene::SceneDescription;
use gray_vrmath::Vec3;

/// Uniform activity inside an arbitrary closed triangle surface
///
/// Owns a private scene so containment queries never touch the main world:
/// a ray cast from a point inside the closed surface meets it from behind.
/// Sampling is rejection over the surface's bounding box.
#[derive(Debug, Clone)]
pub struct VectorShape {
    scene: SceneDescription,
    size: Vec3,
    center: Vec3,
}

impl VectorShape {
    /// Build from the triangles of a closed, outward-wound surface
    pub fn from_triangles(triangles: &[[Vec3; 3]]) -> Result<Self> {
        let mut scene = SceneDescription::new();
        for triangle in triangles {
            scene.add_triangle(triangle[0], triangle[1], triangle[2], 0, -1);
        }
        scene.build_tree(8.0)?;
        let extents = scene.extents();
        Ok(Self {
            size: extents.extent(),
            center: extents.center(),
            scene,
        })
    }

    pub fn is_finite(&self) -> bool {
        self.size.iter().all(|v| v.is_finite()) && self.center.iter().all(|v| v.is_finite())
    }

    /// Rejection-sample the enclosed volume
    pub fn sample(&self, rng: &mut GrayRng) -> Vec3 {
        loop {
            let pos = self.center + rng.uniform_rectangle(&self.size);
            if self.inside(&pos) {
                return pos;
            }
        }
    }

    /// Odd-crossing containment: the nearest surface seen from inside is
    /// back-facing
    pub fn inside(&self, pos: &Vec3) -> bool {
        if !self.scene.extents().contains(pos) {
            return false;
        }
        // fixed probe direction, chosen off every axis so shared triangle
        // edges are not grazed
        let probe = Vec3::new(0.531, 0.687, 0.496).normalize();
        match self.scene.seek_intersection(pos, &probe, None) {
            Some(hit) => hit.point.is_back_facing(),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Closed unit-ish box surface around the origin
    fn boxed_surface() -> VectorShape {
        let mut scene = SceneDescription::new();
        scene.add_box(Vec3::zeros(), Vec3::repeat(2.0), 0, -1);
        let triangles: Vec<[Vec3; 3]> = scene
            .primitives()
            .iter()
            .map(|primitive| match primitive.shape {
                gray_scene::Shape::Triangle { v0, v1, v2 } => [v0, v1, v2],
                _ => unreachable!(),
            })
            .collect();
        VectorShape::from_triangles(&triangles).unwrap()
    }

    #[test]
    fn classifies_inside_and_outside() {
        let shape = boxed_surface();
        assert!(shape.inside(&Vec3::zeros()));
        assert!(shape.inside(&Vec3::new(0.9, 0.9, 0.9)));
        assert!(!shape.inside(&Vec3::new(1.5, 0.0, 0.0)));
        assert!(!shape.inside(&Vec3::new(5.0, 5.0, 5.0)));
    }

    #[test]
    fn samples_fall_inside_the_surface() {
        let shape = boxed_surface();
        let mut rng = GrayRng::from_seed(31);
        for _ in 0..200 {
            let pos = shape.sample(&mut rng);
            assert!(pos.x.abs() <= 1.0 && pos.y.abs() <= 1.0 && pos.z.abs() <= 1.0);
        }
    }
}
