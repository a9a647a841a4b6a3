//! Rigid transforms with exact inverses

// crate modules
use crate::Vec3;

// external crates
use nalgebra::Matrix3;

/// A rigid affine transform (rotation followed by translation)
///
/// The rotation part is always orthonormal by construction, so the inverse
/// is a cheap transpose rather than a general matrix inversion. Applying a
/// map and then its inverse reproduces the input to machine precision,
/// which the transport code relies on when hopping between the local frames
/// of sources and detectors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidMap {
    pub rotation: Matrix3<f64>,
    pub translation: Vec3,
}

impl RigidMap {
    /// The identity transform
    pub fn identity() -> Self {
        Self {
            rotation: Matrix3::identity(),
            translation: Vec3::zeros(),
        }
    }

    /// Pure rotation with no translation
    pub fn from_rotation(rotation: Matrix3<f64>) -> Self {
        Self {
            rotation,
            translation: Vec3::zeros(),
        }
    }

    /// Transform a point (rotation then translation)
    pub fn transform(&self, point: &Vec3) -> Vec3 {
        self.rotation * point + self.translation
    }

    /// Rotate a direction, ignoring the translation part
    pub fn rotate(&self, direction: &Vec3) -> Vec3 {
        self.rotation * direction
    }

    /// The inverse transform
    ///
    /// Orthonormal rotation means transpose is the exact inverse.
    pub fn inverse(&self) -> Self {
        let rotation = self.rotation.transpose();
        Self {
            rotation,
            translation: -(rotation * self.translation),
        }
    }
}

impl Default for RigidMap {
    fn default() -> Self {
        Self::identity()
    }
}

impl std::ops::Mul<Vec3> for &RigidMap {
    type Output = Vec3;

    fn mul(self, point: Vec3) -> Vec3 {
        self.transform(&point)
    }
}

impl std::ops::Mul<Vec3> for RigidMap {
    type Output = Vec3;

    fn mul(self, point: Vec3) -> Vec3 {
        self.transform(&point)
    }
}

/// Rotation mapping the z-axis onto `axis`
///
/// `axis` must be a unit vector. The remaining two basis vectors are chosen
/// deterministically so repeated calls with the same axis produce the same
/// frame.
pub fn ref_vec_to_map(axis: &Vec3) -> RigidMap {
    // pick the world axis least aligned with the reference to stay away from
    // the degenerate cross product
    let helper = if axis.x.abs() < 0.5 {
        Vec3::x()
    } else {
        Vec3::y()
    };
    let e1 = helper.cross(axis).normalize();
    let e2 = axis.cross(&e1);
    RigidMap::from_rotation(Matrix3::from_columns(&[e1, e2, *axis]))
}

/// Rotation mapping the z-axis onto `axis`, then translating by `offset`
pub fn ref_axis_plus_trans_to_map(axis: &Vec3, offset: &Vec3) -> RigidMap {
    let mut map = ref_vec_to_map(axis);
    map.translation = *offset;
    map
}
