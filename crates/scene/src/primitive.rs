//! Visible primitives and ray-hit records

// external crates
use gray_vrmath::{Aabb, Vec3};

/// Where a ray met a surface
///
/// `front_facing` classifies the crossing against the surface orientation:
/// a front-face hit means the ray is entering the solid the surface bounds,
/// a back-face hit that it is leaving. The transport engine turns these into
/// material-stack pushes and pops.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisiblePoint {
    pub position: Vec3,
    pub normal: Vec3,
    pub front_facing: bool,
    pub material_id: i32,
    /// Detector this surface belongs to, -1 for phantom geometry
    pub detector_id: i32,
}

impl VisiblePoint {
    pub fn is_front_facing(&self) -> bool {
        self.front_facing
    }

    pub fn is_back_facing(&self) -> bool {
        !self.front_facing
    }
}

/// Nearest intersection returned by a scene query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub distance: f64,
    pub point: VisiblePoint,
    pub object_id: u32,
}

/// Geometric shape of a primitive
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// Counter-clockwise winding seen from outside the solid
    Triangle { v0: Vec3, v1: Vec3, v2: Vec3 },
    Sphere { center: Vec3, radius: f64 },
}

/// A visible primitive: a shape tagged with material and detector ids
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Primitive {
    pub shape: Shape,
    pub material_id: i32,
    /// -1 for phantom geometry
    pub detector_id: i32,
}

impl Primitive {
    pub fn bounds(&self) -> Aabb {
        match self.shape {
            Shape::Triangle { v0, v1, v2 } => Aabb::from_points([&v0, &v1, &v2]),
            Shape::Sphere { center, radius } => Aabb::new(
                center - Vec3::repeat(radius),
                center + Vec3::repeat(radius),
            ),
        }
    }

    /// Distance, outward normal, and facing of the nearest hit beyond
    /// `min_dist`
    pub fn intersect(&self, origin: &Vec3, dir: &Vec3, min_dist: f64) -> Option<(f64, Vec3, bool)> {
        match self.shape {
            Shape::Triangle { v0, v1, v2 } => {
                intersect_triangle(origin, dir, &v0, &v1, &v2, min_dist)
            }
            Shape::Sphere { center, radius } => {
                intersect_sphere(origin, dir, &center, radius, min_dist)
            }
        }
    }
}

/// Moller-Trumbore, both windings reported with their facing
fn intersect_triangle(
    origin: &Vec3,
    dir: &Vec3,
    v0: &Vec3,
    v1: &Vec3,
    v2: &Vec3,
    min_dist: f64,
) -> Option<(f64, Vec3, bool)> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let pvec = dir.cross(&edge2);
    let det = edge1.dot(&pvec);
    if det.abs() < 1e-12 {
        return None;
    }
    let inv_det = 1.0 / det;
    let tvec = origin - v0;
    let u = tvec.dot(&pvec) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let qvec = tvec.cross(&edge1);
    let v = dir.dot(&qvec) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    let distance = edge2.dot(&qvec) * inv_det;
    if distance <= min_dist {
        return None;
    }
    let normal = edge1.cross(&edge2).normalize();
    // entering when travelling against the outward normal
    let front_facing = dir.dot(&normal) < 0.0;
    Some((distance, normal, front_facing))
}

fn intersect_sphere(
    origin: &Vec3,
    dir: &Vec3,
    center: &Vec3,
    radius: f64,
    min_dist: f64,
) -> Option<(f64, Vec3, bool)> {
    let oc = origin - center;
    let b = oc.dot(dir);
    let c = oc.dot(&oc) - radius * radius;
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    let sqrt_d = discriminant.sqrt();
    let distance = if -b - sqrt_d > min_dist {
        -b - sqrt_d
    } else if -b + sqrt_d > min_dist {
        -b + sqrt_d
    } else {
        return None;
    };
    let normal = (origin + dir * distance - center).normalize();
    let front_facing = dir.dot(&normal) < 0.0;
    Some((distance, normal, front_facing))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phantom(shape: Shape) -> Primitive {
        Primitive {
            shape,
            material_id: 0,
            detector_id: -1,
        }
    }

    #[test]
    fn triangle_front_and_back_hits() {
        let triangle = phantom(Shape::Triangle {
            v0: Vec3::new(-1.0, -1.0, 0.0),
            v1: Vec3::new(1.0, -1.0, 0.0),
            v2: Vec3::new(0.0, 1.0, 0.0),
        });
        // the winding gives an outward normal along +z
        let (dist, _, front) = triangle
            .intersect(&Vec3::new(0.0, 0.0, 2.0), &Vec3::new(0.0, 0.0, -1.0), 0.0)
            .unwrap();
        assert!((dist - 2.0).abs() < 1e-12);
        assert!(front);

        let (_, _, front) = triangle
            .intersect(&Vec3::new(0.0, 0.0, -2.0), &Vec3::new(0.0, 0.0, 1.0), 0.0)
            .unwrap();
        assert!(!front);
    }

    #[test]
    fn sphere_hits_from_outside_and_inside() {
        let sphere = phantom(Shape::Sphere {
            center: Vec3::zeros(),
            radius: 1.0,
        });
        let (dist, _, front) = sphere
            .intersect(&Vec3::new(0.0, 0.0, -3.0), &Vec3::new(0.0, 0.0, 1.0), 0.0)
            .unwrap();
        assert!((dist - 2.0).abs() < 1e-12);
        assert!(front);

        let (dist, _, front) = sphere
            .intersect(&Vec3::zeros(), &Vec3::new(0.0, 0.0, 1.0), 0.0)
            .unwrap();
        assert!((dist - 1.0).abs() < 1e-12);
        assert!(!front);
    }

    #[test]
    fn miss_returns_none() {
        let sphere = phantom(Shape::Sphere {
            center: Vec3::zeros(),
            radius: 0.5,
        });
        assert!(sphere
            .intersect(&Vec3::new(2.0, 0.0, -3.0), &Vec3::new(0.0, 0.0, 1.0), 0.0)
            .is_none());
    }
}
