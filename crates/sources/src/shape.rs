//! Source shapes: position sampling and containment

// crate modules
use crate::vector::VectorShape;
use crate::voxel::VoxelGrid;

// external crates
use gray_random::GrayRng;
use gray_vrmath::{ref_axis_plus_trans_to_map, RigidMap, Vec3};

/// The emission volume of a source
///
/// Every shape can sample a decay position and answer whether a point lies
/// inside it. The containment test is what negative sources use to carve
/// activity out of positive ones, so it has to agree with the sampler:
/// positions drawn from a positive, non-annulus shape always test inside it.
#[derive(Debug, Clone)]
pub enum SourceShape {
    Point {
        position: Vec3,
    },
    Sphere {
        center: Vec3,
        radius: f64,
    },
    Cylinder {
        center: Vec3,
        radius: f64,
        length: f64,
        local_to_global: RigidMap,
        global_to_local: RigidMap,
    },
    /// Zero-thickness shell of a cylinder. Containment covers the whole
    /// enclosed cylinder, as the legacy shapes did.
    AnnulusCylinder {
        center: Vec3,
        radius: f64,
        length: f64,
        local_to_global: RigidMap,
        global_to_local: RigidMap,
    },
    EllipticCylinder {
        center: Vec3,
        radius1: f64,
        radius2: f64,
        length: f64,
        local_to_global: RigidMap,
        global_to_local: RigidMap,
    },
    /// Shell of an elliptic cylinder; containment covers the enclosed volume
    AnnulusEllipticCylinder {
        center: Vec3,
        radius1: f64,
        radius2: f64,
        length: f64,
        local_to_global: RigidMap,
        global_to_local: RigidMap,
    },
    Rect {
        center: Vec3,
        size: Vec3,
        local_to_global: RigidMap,
        global_to_local: RigidMap,
    },
    Ellipsoid {
        center: Vec3,
        radius1: f64,
        radius2: f64,
        radius3: f64,
        local_to_global: RigidMap,
        global_to_local: RigidMap,
    },
    /// Activity distributed over a voxel grid
    Voxel(VoxelGrid),
    /// Uniform activity inside an arbitrary closed surface
    Vector(VectorShape),
    /// Point emitter for beam isotopes; never contains anything
    BeamPoint {
        position: Vec3,
    },
}

impl SourceShape {
    /// Cylinder from a centre, radius, and axis vector whose length is the
    /// cylinder length
    pub fn cylinder(center: Vec3, radius: f64, axis: Vec3) -> Self {
        let (length, local_to_global, global_to_local) = axis_frames(&axis, &center);
        Self::Cylinder {
            center,
            radius,
            length,
            local_to_global,
            global_to_local,
        }
    }

    pub fn annulus_cylinder(center: Vec3, radius: f64, axis: Vec3) -> Self {
        let (length, local_to_global, global_to_local) = axis_frames(&axis, &center);
        Self::AnnulusCylinder {
            center,
            radius,
            length,
            local_to_global,
            global_to_local,
        }
    }

    pub fn elliptic_cylinder(center: Vec3, radius1: f64, radius2: f64, axis: Vec3) -> Self {
        let (length, local_to_global, global_to_local) = axis_frames(&axis, &center);
        Self::EllipticCylinder {
            center,
            radius1,
            radius2,
            length,
            local_to_global,
            global_to_local,
        }
    }

    pub fn annulus_elliptic_cylinder(center: Vec3, radius1: f64, radius2: f64, axis: Vec3) -> Self {
        let (length, local_to_global, global_to_local) = axis_frames(&axis, &center);
        Self::AnnulusEllipticCylinder {
            center,
            radius1,
            radius2,
            length,
            local_to_global,
            global_to_local,
        }
    }

    pub fn rect(center: Vec3, size: Vec3, orientation: Vec3) -> Self {
        let local_to_global = ref_axis_plus_trans_to_map(&orientation.normalize(), &center);
        Self::Rect {
            center,
            size,
            global_to_local: local_to_global.inverse(),
            local_to_global,
        }
    }

    pub fn ellipsoid(center: Vec3, radius1: f64, radius2: f64, radius3: f64, axis: Vec3) -> Self {
        let local_to_global = ref_axis_plus_trans_to_map(&axis.normalize(), &center);
        Self::Ellipsoid {
            center,
            radius1,
            radius2,
            radius3,
            global_to_local: local_to_global.inverse(),
            local_to_global,
        }
    }

    /// Whether every dimension of the shape is finite
    pub fn is_finite(&self) -> bool {
        match self {
            Self::Point { position } | Self::BeamPoint { position } => {
                position.iter().all(|v| v.is_finite())
            }
            Self::Sphere { center, radius } => {
                center.iter().all(|v| v.is_finite()) && radius.is_finite()
            }
            Self::Cylinder { radius, length, .. } | Self::AnnulusCylinder { radius, length, .. } => {
                radius.is_finite() && length.is_finite()
            }
            Self::EllipticCylinder {
                radius1,
                radius2,
                length,
                ..
            }
            | Self::AnnulusEllipticCylinder {
                radius1,
                radius2,
                length,
                ..
            } => radius1.is_finite() && radius2.is_finite() && length.is_finite(),
            Self::Rect { size, .. } => size.iter().all(|v| v.is_finite()),
            Self::Ellipsoid {
                radius1,
                radius2,
                radius3,
                ..
            } => radius1.is_finite() && radius2.is_finite() && radius3.is_finite(),
            Self::Voxel(grid) => grid.is_finite(),
            Self::Vector(vector) => vector.is_finite(),
        }
    }

    /// Sample one decay position
    pub fn decay_position(&self, rng: &mut GrayRng) -> Vec3 {
        match self {
            Self::Point { position } | Self::BeamPoint { position } => *position,
            Self::Sphere { center, radius } => rng.uniform_sphere_filled() * *radius + center,
            Self::Cylinder {
                radius,
                length,
                local_to_global,
                ..
            } => local_to_global * rng.uniform_cylinder(*length, *radius),
            Self::AnnulusCylinder {
                radius,
                length,
                local_to_global,
                ..
            } => local_to_global * rng.uniform_annulus_cylinder(*length, *radius),
            Self::EllipticCylinder {
                radius1,
                radius2,
                length,
                local_to_global,
                ..
            } => {
                let mut local = sample_ellipse(rng, *radius1, *radius2);
                local.z = length * (rng.uniform() - 0.5);
                local_to_global * local
            }
            Self::AnnulusEllipticCylinder {
                radius1,
                radius2,
                length,
                local_to_global,
                ..
            } => {
                let phi = std::f64::consts::TAU * rng.uniform();
                let local = Vec3::new(
                    radius1 * phi.cos(),
                    radius2 * phi.sin(),
                    length * (rng.uniform() - 0.5),
                );
                local_to_global * local
            }
            Self::Rect {
                size,
                local_to_global,
                ..
            } => local_to_global * rng.uniform_rectangle(size),
            Self::Ellipsoid {
                radius1,
                radius2,
                radius3,
                local_to_global,
                ..
            } => {
                let local = loop {
                    let candidate = Vec3::new(
                        (1.0 - 2.0 * rng.uniform()) * radius1,
                        (1.0 - 2.0 * rng.uniform()) * radius2,
                        (1.0 - 2.0 * rng.uniform()) * radius3,
                    );
                    let r1 = candidate.x / radius1;
                    let r2 = candidate.y / radius2;
                    let r3 = candidate.z / radius3;
                    if r1 * r1 + r2 * r2 + r3 * r3 <= 1.0 {
                        break candidate;
                    }
                };
                local_to_global * local
            }
            Self::Voxel(grid) => grid.sample(rng),
            Self::Vector(vector) => vector.sample(rng),
        }
    }

    /// Whether `pos` lies inside the shape
    pub fn inside(&self, pos: &Vec3) -> bool {
        match self {
            Self::Point { position } => pos == position,
            Self::BeamPoint { .. } => false,
            Self::Sphere { center, radius } => (pos - center).norm() < *radius,
            Self::Cylinder {
                radius,
                length,
                global_to_local,
                ..
            }
            | Self::AnnulusCylinder {
                radius,
                length,
                global_to_local,
                ..
            } => {
                let local = global_to_local * *pos;
                local.x * local.x + local.y * local.y <= radius * radius
                    && local.z.abs() <= length / 2.0
            }
            Self::EllipticCylinder {
                radius1,
                radius2,
                length,
                global_to_local,
                ..
            }
            | Self::AnnulusEllipticCylinder {
                radius1,
                radius2,
                length,
                global_to_local,
                ..
            } => {
                let local = global_to_local * *pos;
                let r1 = local.x / radius1;
                let r2 = local.y / radius2;
                r1 * r1 + r2 * r2 <= 1.0 && local.z.abs() <= length / 2.0
            }
            Self::Rect {
                size,
                global_to_local,
                ..
            } => {
                let local = global_to_local * *pos;
                local.x.abs() <= size.x / 2.0
                    && local.y.abs() <= size.y / 2.0
                    && local.z.abs() <= size.z / 2.0
            }
            Self::Ellipsoid {
                radius1,
                radius2,
                radius3,
                global_to_local,
                ..
            } => {
                let local = global_to_local * *pos;
                let r1 = local.x / radius1;
                let r2 = local.y / radius2;
                let r3 = local.z / radius3;
                r1 * r1 + r2 * r2 + r3 * r3 < 1.0
            }
            Self::Voxel(grid) => grid.inside(pos),
            Self::Vector(vector) => vector.inside(pos),
        }
    }
}

/// Rejection-sample the interior of an ellipse in the local xy plane
fn sample_ellipse(rng: &mut GrayRng, radius1: f64, radius2: f64) -> Vec3 {
    loop {
        let x = (1.0 - 2.0 * rng.uniform()) * radius1;
        let y = (1.0 - 2.0 * rng.uniform()) * radius2;
        let r1 = x / radius1;
        let r2 = y / radius2;
        if r1 * r1 + r2 * r2 <= 1.0 {
            return Vec3::new(x, y, 0.0);
        }
    }
}

fn axis_frames(axis: &Vec3, center: &Vec3) -> (f64, RigidMap, RigidMap) {
    let length = axis.norm();
    let local_to_global = ref_axis_plus_trans_to_map(&(axis / length), center);
    let global_to_local = local_to_global.inverse();
    (length, local_to_global, global_to_local)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn point_decay_is_deterministic() {
        let mut rng = GrayRng::from_seed(1);
        let position = Vec3::new(1.0, -2.0, 3.0);
        let shape = SourceShape::Point { position };
        assert_eq!(shape.decay_position(&mut rng), position);
        assert!(shape.inside(&position));
    }

    #[rstest]
    #[case(0.999999, true)]
    #[case(1.000001, false)]
    fn cylinder_radial_boundary(#[case] r: f64, #[case] expected: bool) {
        let shape = SourceShape::cylinder(Vec3::zeros(), 1.0, Vec3::new(0.0, 0.0, 3.0));
        assert_eq!(shape.inside(&Vec3::new(r, 0.0, 0.0)), expected);
    }

    #[rstest]
    #[case(1.499999, true)]
    #[case(1.500001, false)]
    fn cylinder_axial_boundary(#[case] z: f64, #[case] expected: bool) {
        let shape = SourceShape::cylinder(Vec3::zeros(), 1.0, Vec3::new(0.0, 0.0, 3.0));
        assert_eq!(shape.inside(&Vec3::new(0.0, 0.0, z)), expected);
        assert_eq!(shape.inside(&Vec3::new(0.0, 0.0, -z)), expected);
    }

    #[test]
    fn sampled_positions_are_inside_positive_shapes() {
        let mut rng = GrayRng::from_seed(42);
        let axis = Vec3::new(1.0, 1.0, 0.5);
        let shapes = vec![
            SourceShape::Sphere {
                center: Vec3::new(1.0, 0.0, 0.0),
                radius: 0.7,
            },
            SourceShape::cylinder(Vec3::new(0.0, 1.0, 0.0), 0.5, axis),
            SourceShape::elliptic_cylinder(Vec3::zeros(), 0.5, 0.9, axis),
            SourceShape::rect(Vec3::new(0.0, 0.0, 2.0), Vec3::new(1.0, 2.0, 0.5), axis),
            SourceShape::ellipsoid(Vec3::zeros(), 0.4, 0.6, 0.8, axis),
        ];
        for shape in &shapes {
            for _ in 0..200 {
                let pos = shape.decay_position(&mut rng);
                assert!(shape.inside(&pos), "{shape:?} produced {pos:?} outside");
            }
        }
    }

    #[test]
    fn annulus_contains_the_enclosed_cylinder() {
        let shape = SourceShape::annulus_cylinder(Vec3::zeros(), 1.0, Vec3::new(0.0, 0.0, 2.0));
        // points well inside the enclosed volume, not on the shell
        assert!(shape.inside(&Vec3::new(0.2, 0.0, 0.0)));
        assert!(!shape.inside(&Vec3::new(1.1, 0.0, 0.0)));

        let mut rng = GrayRng::from_seed(9);
        for _ in 0..100 {
            let pos = shape.decay_position(&mut rng);
            assert!((pos.x.hypot(pos.y) - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn rotated_cylinder_boundary_follows_the_axis() {
        let shape = SourceShape::cylinder(Vec3::zeros(), 0.25, Vec3::new(2.0, 0.0, 0.0));
        assert!(shape.inside(&Vec3::new(0.99, 0.0, 0.0)));
        assert!(!shape.inside(&Vec3::new(1.01, 0.0, 0.0)));
        assert!(!shape.inside(&Vec3::new(0.0, 0.3, 0.0)));
    }
}
